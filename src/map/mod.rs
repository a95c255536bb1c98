pub mod controller;
pub mod coords;
pub mod layers;
pub mod leaflet;
pub mod lists;
pub mod provider;

pub use controller::MapController;
pub use coords::{parse_coordinates, LatLng};
pub use layers::BaseLayer;
pub use leaflet::LeafletMap;
pub use lists::{ListKind, LocationEntry, LocationLists};
pub use provider::{MapProvider, MarkerSpec, Tooltip, TooltipDirection};
