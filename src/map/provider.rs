use super::coords::LatLng;
use super::layers::BaseLayer;

/// Tooltip placement relative to the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipDirection {
    Top,
    Bottom,
}

impl TooltipDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TooltipDirection::Top => "top",
            TooltipDirection::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub text: String,
    pub permanent: bool,
    pub direction: TooltipDirection,
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub popup_html: String,
    pub tooltip: Tooltip,
}

/// What the map controller needs from a mapping library.
pub trait MapProvider: Send {
    fn init(&mut self, center: LatLng, zoom: u8, attribution_control: bool);
    fn attach_base_layer(&mut self, layer: BaseLayer);
    fn detach_base_layer(&mut self, layer: BaseLayer);
    /// Empty the marker group.
    fn clear_markers(&mut self);
    fn add_marker(&mut self, marker: &MarkerSpec);
    fn fit_bounds(&mut self, points: &[LatLng], padding: (u32, u32));
}
