use super::coords::{parse_coordinates, LatLng};
use super::layers::BaseLayer;
use super::lists::{ListKind, LocationEntry, LocationLists};
use super::provider::{MapProvider, MarkerSpec, Tooltip, TooltipDirection};
use crate::constants::*;
use crate::error::{GalleryError, Result};

/// Drives the map: base layer switching and marker lists.
pub struct MapController<P: MapProvider> {
    provider: P,
    lists: LocationLists,
    active_layer: BaseLayer,
    active_list: ListKind,
    placed: usize,
}

impl<P: MapProvider> MapController<P> {
    /// Set up the default view with the satellite layer and the original list.
    pub fn new(mut provider: P, lists: LocationLists) -> Self {
        let (lat, lng) = MAP_DEFAULT_CENTER;
        provider.init(LatLng::new(lat, lng), MAP_DEFAULT_ZOOM, false);
        provider.attach_base_layer(BaseLayer::Satellite);

        let mut controller = Self {
            provider,
            lists,
            active_layer: BaseLayer::Satellite,
            active_list: ListKind::Original,
            placed: 0,
        };
        if let Err(e) = controller.load_markers(ListKind::Original) {
            tracing::error!(error = %e, "initial marker load failed");
        }
        controller
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn active_layer(&self) -> BaseLayer {
        self.active_layer
    }

    pub fn active_list(&self) -> ListKind {
        self.active_list
    }

    pub fn placed_markers(&self) -> usize {
        self.placed
    }

    /// Switch base layer by its button name. Unknown names leave the map as is.
    pub fn set_view(&mut self, name: &str) -> Result<BaseLayer> {
        let layer: BaseLayer = name.parse()?;
        for other in BaseLayer::ALL {
            self.provider.detach_base_layer(other);
        }
        self.provider.attach_base_layer(layer);
        self.active_layer = layer;
        Ok(layer)
    }

    /// Rebuild the marker group from one list. Returns how many markers were placed.
    pub fn load_markers(&mut self, kind: ListKind) -> Result<usize> {
        self.provider.clear_markers();
        self.active_list = kind;
        self.placed = 0;

        let Some(entries) = self.lists.get(kind) else {
            let id = kind.container_id();
            tracing::error!("Location list not found: {}", id);
            return Err(GalleryError::ListNotFound(id.to_string()));
        };

        let markers: Vec<MarkerSpec> = entries.iter().filter_map(marker_for).collect();
        for marker in &markers {
            self.provider.add_marker(marker);
        }

        let points: Vec<LatLng> = markers.iter().map(|m| m.position).collect();
        if !points.is_empty() {
            self.provider.fit_bounds(&points, MAP_FIT_PADDING);
        }

        self.placed = markers.len();
        tracing::info!(list = kind.name(), placed = self.placed, skipped = entries.len() - self.placed, "markers loaded");
        Ok(self.placed)
    }
}

fn marker_for(entry: &LocationEntry) -> Option<MarkerSpec> {
    let text = entry.coordinates.trim();
    match parse_coordinates(text) {
        Ok(position) => Some(MarkerSpec {
            position,
            popup_html: format!("<b>{}</b><br>{}", entry.name, text),
            tooltip: Tooltip {
                text: entry.name.clone(),
                permanent: true,
                direction: TooltipDirection::Bottom,
                class_name: MARKER_LABEL_CLASS.to_string(),
            },
        }),
        Err(e) => {
            tracing::debug!(name = %entry.name, error = %e, "skipping location");
            None
        }
    }
}
