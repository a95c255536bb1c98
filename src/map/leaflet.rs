//! Leaflet-backed map provider.
//!
//! Every call is recorded as a JavaScript statement against the page's
//! Leaflet globals. The server ships pending statements to the browser after
//! each map interaction and rebuilds the whole script when the page loads.

use std::collections::BTreeSet;

use super::coords::LatLng;
use super::layers::BaseLayer;
use super::provider::{MapProvider, MarkerSpec};

const MAP_VAR: &str = "window.pgMap";
const LAYERS_VAR: &str = "window.pgLayers";
const MARKERS_VAR: &str = "window.pgMarkers";

/// JSON string literal, which doubles as a safe JS string literal inside a
/// `<script>` block.
fn js_str(s: &str) -> String {
    serde_json::to_string(s)
        .map(|lit| lit.replace("</", "<\\/"))
        .unwrap_or_else(|_| "\"\"".to_string())
}

#[derive(Debug, Default)]
pub struct LeafletMap {
    view: Option<(LatLng, u8, bool)>,
    attached: BTreeSet<&'static str>,
    markers: Vec<MarkerSpec>,
    bounds: Option<(Vec<LatLng>, (u32, u32))>,
    pending: Vec<String>,
}

impl LeafletMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached_layers(&self) -> Vec<BaseLayer> {
        BaseLayer::ALL.into_iter().filter(|l| self.attached.contains(l.name())).collect()
    }

    pub fn markers(&self) -> &[MarkerSpec] {
        &self.markers
    }

    pub fn last_bounds(&self) -> Option<&[LatLng]> {
        self.bounds.as_ref().map(|(points, _)| points.as_slice())
    }

    /// Statements recorded since the last call.
    pub fn take_pending(&mut self) -> String {
        std::mem::take(&mut self.pending).join("\n")
    }

    /// A script that rebuilds the current map state from nothing.
    pub fn full_script(&self) -> String {
        let Some((center, zoom, attribution)) = self.view else {
            return String::new();
        };

        let mut lines = init_statements(center, zoom, attribution);
        for layer in self.attached_layers() {
            lines.push(attach_statement(layer));
        }
        for marker in &self.markers {
            lines.push(marker_statement(marker));
        }
        if let Some((points, padding)) = &self.bounds {
            lines.push(fit_statement(points, *padding));
        }
        lines.join("\n")
    }

    fn record(&mut self, statement: String) {
        self.pending.push(statement);
    }
}

fn init_statements(center: LatLng, zoom: u8, attribution: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "{MAP_VAR} = L.map('map', {{ attributionControl: {attribution} }}).setView([{}, {}], {zoom});",
        center.lat, center.lng
    )];

    let layers: Vec<String> = BaseLayer::ALL
        .iter()
        .map(|layer| {
            let mut options = format!("attribution: {}", js_str(layer.attribution()));
            if let Some(max_zoom) = layer.max_zoom() {
                options.push_str(&format!(", maxZoom: {max_zoom}"));
            }
            format!("{}: L.tileLayer({}, {{ {} }})", layer.name(), js_str(layer.tile_url()), options)
        })
        .collect();
    lines.push(format!("{LAYERS_VAR} = {{ {} }};", layers.join(", ")));
    lines.push(format!("{MARKERS_VAR} = L.layerGroup().addTo({MAP_VAR});"));
    lines
}

fn attach_statement(layer: BaseLayer) -> String {
    format!("{LAYERS_VAR}.{}.addTo({MAP_VAR});", layer.name())
}

fn marker_statement(marker: &MarkerSpec) -> String {
    format!(
        "{MARKERS_VAR}.addLayer(L.marker([{}, {}]).bindPopup({}).bindTooltip({}, {{ permanent: {}, direction: '{}', className: {} }}));",
        marker.position.lat,
        marker.position.lng,
        js_str(&marker.popup_html),
        js_str(&marker.tooltip.text),
        marker.tooltip.permanent,
        marker.tooltip.direction.as_str(),
        js_str(&marker.tooltip.class_name),
    )
}

fn fit_statement(points: &[LatLng], padding: (u32, u32)) -> String {
    let coords: Vec<String> = points.iter().map(|p| format!("[{}, {}]", p.lat, p.lng)).collect();
    format!(
        "{MAP_VAR}.fitBounds([{}], {{ padding: [{}, {}] }});",
        coords.join(", "),
        padding.0,
        padding.1
    )
}

impl MapProvider for LeafletMap {
    fn init(&mut self, center: LatLng, zoom: u8, attribution_control: bool) {
        self.view = Some((center, zoom, attribution_control));
        self.attached.clear();
        self.markers.clear();
        self.bounds = None;
        for statement in init_statements(center, zoom, attribution_control) {
            self.record(statement);
        }
    }

    fn attach_base_layer(&mut self, layer: BaseLayer) {
        if self.attached.insert(layer.name()) {
            self.record(attach_statement(layer));
        }
    }

    fn detach_base_layer(&mut self, layer: BaseLayer) {
        self.attached.remove(layer.name());
        self.record(format!("{MAP_VAR}.removeLayer({LAYERS_VAR}.{});", layer.name()));
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
        self.record(format!("{MARKERS_VAR}.clearLayers();"));
    }

    fn add_marker(&mut self, marker: &MarkerSpec) {
        self.markers.push(marker.clone());
        self.record(marker_statement(marker));
    }

    fn fit_bounds(&mut self, points: &[LatLng], padding: (u32, u32)) {
        self.bounds = Some((points.to_vec(), padding));
        self.record(fit_statement(points, padding));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::provider::{Tooltip, TooltipDirection};

    fn marker() -> MarkerSpec {
        MarkerSpec {
            position: LatLng::new(13.6807, 79.3509),
            popup_html: "<b>Tirupati</b><br>13.6807° N, 79.3509° E".into(),
            tooltip: Tooltip {
                text: "Tirupati \"Temple\"".into(),
                permanent: true,
                direction: TooltipDirection::Bottom,
                class_name: "map-label".into(),
            },
        }
    }

    #[test]
    fn test_pending_statements_are_drained() {
        let mut map = LeafletMap::new();
        map.init(LatLng::new(20.5937, 78.9629), 5, false);
        map.attach_base_layer(BaseLayer::Satellite);

        let script = map.take_pending();
        assert!(script.contains("L.map('map', { attributionControl: false }).setView([20.5937, 78.9629], 5);"));
        assert!(script.contains("window.pgLayers.satellite.addTo(window.pgMap);"));
        assert!(script.contains("maxZoom: 19"));
        assert!(map.take_pending().is_empty());
    }

    #[test]
    fn test_marker_strings_are_escaped() {
        let mut map = LeafletMap::new();
        map.init(LatLng::new(0.0, 0.0), 3, false);
        map.add_marker(&marker());
        let script = map.take_pending();
        assert!(script.contains(r#""Tirupati \"Temple\"""#));
        assert!(script.contains("direction: 'bottom'"));
    }

    #[test]
    fn test_full_script_reflects_current_state() {
        let mut map = LeafletMap::new();
        assert!(map.full_script().is_empty());

        map.init(LatLng::new(0.0, 0.0), 3, false);
        map.attach_base_layer(BaseLayer::Satellite);
        map.detach_base_layer(BaseLayer::Satellite);
        map.attach_base_layer(BaseLayer::Terrain);
        map.add_marker(&marker());
        map.fit_bounds(&[LatLng::new(1.0, 2.0)], (50, 50));

        let script = map.full_script();
        assert!(!script.contains("pgLayers.satellite.addTo"));
        assert!(script.contains("pgLayers.terrain.addTo"));
        assert!(script.contains("fitBounds([[1, 2]], { padding: [50, 50] });"));
        assert_eq!(map.attached_layers(), vec![BaseLayer::Terrain]);
    }
}
