// Port configuration
pub const DEFAULT_PORT: u16 = 3001;

// Page loads whose state is kept; the oldest is dropped first
pub const MAX_PAGE_SESSIONS: usize = 64;

// Remote gallery description (year -> location -> images)
pub const GALLERY_JSON_URL: &str =
    "https://gist.githubusercontent.com/luffytaroOnePiece/084d6afb96a512e7bcee9bb99db06db2/raw/srikar.json";

// Filter animation
pub const FADE_OUT_DELAY_MS: u64 = 400;

// Column slider: used when a control leaves min/max unspecified
pub const SLIDER_DEFAULT_MIN: u32 = 1;
pub const SLIDER_DEFAULT_MAX: u32 = 5;
pub const DEFAULT_COLUMN_COUNT: u32 = 3;

// Map defaults (India)
pub const MAP_DEFAULT_CENTER: (f64, f64) = (20.5937, 78.9629);
pub const MAP_DEFAULT_ZOOM: u8 = 5;
pub const MAP_FIT_PADDING: (u32, u32) = (50, 50);

// Base layer tile sources
pub const SATELLITE_TILE_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";
pub const SATELLITE_ATTRIBUTION: &str = "Tiles &copy; Esri &mdash; Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community";
pub const SATELLITE_MAX_ZOOM: u8 = 19;

pub const NORMAL_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const NORMAL_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

pub const TERRAIN_TILE_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Topo_Map/MapServer/tile/{z}/{y}/{x}";
pub const TERRAIN_ATTRIBUTION: &str = "Tiles &copy; Esri &mdash; Esri, DeLorme, NAVTEQ, TomTom, Intermap, iPC, USGS, FAO, NPS, NRCAN, GeoBase, Kadaster NL, Ordnance Survey, Esri Japan, METI, Esri China (Hong Kong), and the GIS User Community";

// Marker tooltip styling
pub const MARKER_LABEL_CLASS: &str = "map-label";

// Hero background overlay
pub const HERO_GRADIENT: &str = "linear-gradient(rgba(0,0,0,0.5), rgba(0,0,0,0.5))";
