//! Three-facet gallery filter.
//!
//! Orientation is applied the moment it is picked. Location and year are
//! staged and only take effect when the filters are applied explicitly.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::error::GalleryError;
use crate::gallery::{GalleryItem, ItemFacets, Orientation, Visibility};

/// One filter dimension: either everything, or exactly one value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Facet<T> {
    All,
    Only(T),
}

impl<T> Default for Facet<T> {
    fn default() -> Self {
        Facet::All
    }
}

impl<T: PartialEq> Facet<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Facet::All => true,
            Facet::Only(selected) => selected == value,
        }
    }
}

impl Facet<String> {
    /// `"all"` is the reserved wildcard, anything else selects that value.
    pub fn parse(value: &str) -> Self {
        if value == "all" {
            Facet::All
        } else {
            Facet::Only(value.to_string())
        }
    }

    fn matches_str(&self, value: &str) -> bool {
        match self {
            Facet::All => true,
            Facet::Only(selected) => selected == value,
        }
    }

    pub fn as_value(&self) -> &str {
        match self {
            Facet::All => "all",
            Facet::Only(v) => v,
        }
    }
}

impl FromStr for Facet<Orientation> {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Facet::All)
        } else {
            s.parse().map(Facet::Only)
        }
    }
}

impl Facet<Orientation> {
    pub fn as_value(&self) -> &'static str {
        match self {
            Facet::All => "all",
            Facet::Only(o) => o.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub orientation: Facet<Orientation>,
    pub location: Facet<String>,
    pub year: Facet<String>,
}

impl FilterState {
    /// Visible iff every facet matches; `All` always matches.
    pub fn matches(&self, item: &ItemFacets<'_>) -> bool {
        self.orientation.matches(&item.orientation)
            && self.location.matches_str(item.location)
            && self.year.matches_str(item.year)
    }
}

/// Serializable view of the filter selections for the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterSnapshot {
    pub orientation: String,
    pub location: String,
    pub year: String,
    pub pending_location: String,
    pub pending_year: String,
    pub location_label: String,
    pub year_label: String,
}

/// A visibility change produced by applying filters or advancing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemTransition {
    pub id: usize,
    pub from: Visibility,
    pub to: Visibility,
}

/// Recompute visibility for every item against `state`.
///
/// Pure with respect to the filter: running it twice with the same state
/// leaves the same visible set.
pub fn apply_filters(
    items: &mut [GalleryItem],
    state: &FilterState,
    now: Instant,
    fade_delay: Duration,
) -> Vec<ItemTransition> {
    let mut transitions = Vec::new();

    for item in items.iter_mut() {
        let from = item.visibility;
        let to = if state.matches(&item.facets()) {
            match from {
                Visibility::Hidden => Visibility::FadingIn,
                // Re-matched mid-fade: cancel the pending hide
                Visibility::FadingOut { .. } => Visibility::Visible,
                other => other,
            }
        } else {
            match from {
                Visibility::Visible | Visibility::FadingIn => Visibility::FadingOut { hide_at: now + fade_delay },
                other => other,
            }
        };

        if to != from {
            item.visibility = to;
            transitions.push(ItemTransition { id: item.id, from, to });
        }
    }

    transitions
}

/// Finish fade-outs whose delay has elapsed.
pub fn complete_fades(items: &mut [GalleryItem], now: Instant) -> Vec<ItemTransition> {
    let mut transitions = Vec::new();
    for item in items.iter_mut() {
        if let Visibility::FadingOut { hide_at } = item.visibility {
            if hide_at <= now {
                transitions.push(ItemTransition { id: item.id, from: item.visibility, to: Visibility::Hidden });
                item.visibility = Visibility::Hidden;
            }
        }
    }
    transitions
}

/// Next animation frame: unhidden items become fully visible.
pub fn animation_frame(items: &mut [GalleryItem]) -> Vec<ItemTransition> {
    let mut transitions = Vec::new();
    for item in items.iter_mut() {
        if item.visibility == Visibility::FadingIn {
            transitions.push(ItemTransition { id: item.id, from: Visibility::FadingIn, to: Visibility::Visible });
            item.visibility = Visibility::Visible;
        }
    }
    transitions
}

pub struct FilterController {
    applied: FilterState,
    pending_location: Facet<String>,
    pending_year: Facet<String>,
    fade_delay: Duration,
}

impl FilterController {
    pub fn new(fade_delay: Duration) -> Self {
        Self {
            applied: FilterState::default(),
            pending_location: Facet::All,
            pending_year: Facet::All,
            fade_delay,
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.applied
    }

    pub fn fade_delay(&self) -> Duration {
        self.fade_delay
    }

    /// Orientation buttons are instant toggles.
    pub fn select_orientation(
        &mut self,
        orientation: Facet<Orientation>,
        items: &mut [GalleryItem],
        now: Instant,
    ) -> Vec<ItemTransition> {
        tracing::info!(orientation = orientation.as_value(), "Orientation selected");
        self.applied.orientation = orientation;
        self.run(items, now)
    }

    /// Stage a location; nothing changes on screen until `apply`.
    pub fn select_location(&mut self, location: &str) {
        self.pending_location = Facet::parse(location);
    }

    pub fn select_year(&mut self, year: &str) {
        tracing::info!(year, "Year selected");
        self.pending_year = Facet::parse(year);
    }

    /// Commit staged location and year, then filter.
    pub fn apply(&mut self, items: &mut [GalleryItem], now: Instant) -> Vec<ItemTransition> {
        self.applied.location = self.pending_location.clone();
        self.applied.year = self.pending_year.clone();
        self.run(items, now)
    }

    fn run(&self, items: &mut [GalleryItem], now: Instant) -> Vec<ItemTransition> {
        tracing::info!(
            orientation = self.applied.orientation.as_value(),
            location = self.applied.location.as_value(),
            year = self.applied.year.as_value(),
            "Applying filters"
        );
        apply_filters(items, &self.applied, now, self.fade_delay)
    }

    /// Dropdown button text, shared by the desktop and mobile buttons.
    pub fn location_label(&self) -> String {
        match &self.pending_location {
            Facet::All => "All Locations".to_string(),
            Facet::Only(loc) => loc.clone(),
        }
    }

    pub fn year_label(&self) -> String {
        match &self.pending_year {
            Facet::All => "All Years".to_string(),
            Facet::Only(yr) => yr.clone(),
        }
    }

    pub fn is_active_orientation(&self, value: &str) -> bool {
        self.applied.orientation.as_value() == value
    }

    pub fn is_active_location(&self, value: &str) -> bool {
        self.pending_location.as_value() == value
    }

    pub fn is_active_year(&self, value: &str) -> bool {
        self.pending_year.as_value() == value
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            orientation: self.applied.orientation.as_value().to_string(),
            location: self.applied.location.as_value().to_string(),
            year: self.applied.year.as_value().to_string(),
            pending_location: self.pending_location.as_value().to_string(),
            pending_year: self.pending_year.as_value().to_string(),
            location_label: self.location_label(),
            year_label: self.year_label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::{ImageRecord, ImageSize};

    const DELAY: Duration = Duration::from_millis(400);

    fn item(id: usize, location: &str, year: &str, width: u32, height: u32) -> GalleryItem {
        let record = ImageRecord {
            image_link: format!("{id}.jpg"),
            season: "Winter".into(),
            shot_on: "Pixel".into(),
            location: location.into(),
            year: year.into(),
        };
        let mut item = GalleryItem::new(id, record, ImageSize { width, height });
        item.visibility = Visibility::Visible;
        item
    }

    fn sample() -> Vec<GalleryItem> {
        vec![
            item(0, "Goa", "2022", 1200, 800),
            item(1, "Goa", "2023", 800, 1200),
            item(2, "Ooty", "2023", 1200, 800),
            item(3, "Hampi", "2021", 800, 1200),
        ]
    }

    fn shown(items: &[GalleryItem]) -> Vec<usize> {
        items.iter().filter(|i| i.visibility.is_shown()).map(|i| i.id).collect()
    }

    fn every_state() -> Vec<FilterState> {
        let orientations = [Facet::All, Facet::Only(Orientation::Horizontal), Facet::Only(Orientation::Vertical)];
        let locations = ["all", "Goa", "Ooty", "Hampi", "Nowhere"];
        let years = ["all", "2021", "2022", "2023"];
        let mut states = Vec::new();
        for o in &orientations {
            for l in locations {
                for y in years {
                    states.push(FilterState {
                        orientation: o.clone(),
                        location: Facet::parse(l),
                        year: Facet::parse(y),
                    });
                }
            }
        }
        states
    }

    #[test]
    fn test_visible_iff_all_facets_match() {
        let now = Instant::now();
        for state in every_state() {
            let mut items = sample();
            apply_filters(&mut items, &state, now, DELAY);
            for it in &items {
                let expected = state.orientation.matches(&it.orientation)
                    && (state.location == Facet::All || state.location.as_value() == it.record.location)
                    && (state.year == Facet::All || state.year.as_value() == it.record.year);
                assert_eq!(it.visibility.is_shown(), expected, "state {state:?}, item {}", it.id);
            }
        }
    }

    #[test]
    fn test_apply_is_idempotent() {
        let now = Instant::now();
        for state in every_state() {
            let mut once = sample();
            apply_filters(&mut once, &state, now, DELAY);
            let first = shown(&once);

            let second_transitions = apply_filters(&mut once, &state, now, DELAY);
            assert_eq!(shown(&once), first);
            assert!(second_transitions.is_empty());
        }
    }

    #[test]
    fn test_fade_out_then_hidden_after_delay() {
        let now = Instant::now();
        let mut items = sample();
        let state = FilterState { location: Facet::parse("Goa"), ..Default::default() };

        apply_filters(&mut items, &state, now, DELAY);
        assert!(matches!(items[2].visibility, Visibility::FadingOut { .. }));

        assert!(complete_fades(&mut items, now + Duration::from_millis(399)).is_empty());
        let done = complete_fades(&mut items, now + DELAY);
        assert_eq!(done.len(), 2);
        assert_eq!(items[2].visibility, Visibility::Hidden);
        assert_eq!(items[3].visibility, Visibility::Hidden);
    }

    #[test]
    fn test_hidden_item_fades_back_in_on_next_frame() {
        let now = Instant::now();
        let mut items = sample();
        let goa = FilterState { location: Facet::parse("Goa"), ..Default::default() };
        apply_filters(&mut items, &goa, now, DELAY);
        complete_fades(&mut items, now + DELAY);

        apply_filters(&mut items, &FilterState::default(), now + DELAY, DELAY);
        assert_eq!(items[2].visibility, Visibility::FadingIn);

        let frame = animation_frame(&mut items);
        assert_eq!(frame.len(), 2);
        assert!(items.iter().all(|i| i.visibility == Visibility::Visible));
    }

    #[test]
    fn test_rematch_during_fade_cancels_hide() {
        let now = Instant::now();
        let mut items = sample();
        apply_filters(&mut items, &FilterState { year: Facet::parse("2023"), ..Default::default() }, now, DELAY);
        assert!(matches!(items[0].visibility, Visibility::FadingOut { .. }));

        apply_filters(&mut items, &FilterState::default(), now + Duration::from_millis(100), DELAY);
        assert_eq!(items[0].visibility, Visibility::Visible);
        assert!(complete_fades(&mut items, now + DELAY).is_empty());
    }

    #[test]
    fn test_location_and_year_wait_for_apply() {
        let now = Instant::now();
        let mut items = sample();
        let mut controller = FilterController::new(DELAY);

        controller.select_location("Ooty");
        controller.select_year("2023");
        assert_eq!(controller.location_label(), "Ooty");
        assert_eq!(controller.year_label(), "2023");
        assert_eq!(controller.state(), &FilterState::default());
        assert_eq!(shown(&items), vec![0, 1, 2, 3]);

        controller.apply(&mut items, now);
        assert_eq!(shown(&items), vec![2]);
        assert!(controller.is_active_location("Ooty"));
    }

    #[test]
    fn test_orientation_applies_immediately() {
        let now = Instant::now();
        let mut items = sample();
        let mut controller = FilterController::new(DELAY);

        controller.select_location("Goa");
        let changed = controller.select_orientation(Facet::Only(Orientation::Vertical), &mut items, now);
        assert_eq!(changed.len(), 2);
        // the staged location is not committed by an orientation toggle
        assert_eq!(shown(&items), vec![1, 3]);
        assert!(controller.is_active_orientation("vertical"));
    }

    #[test]
    fn test_all_labels() {
        let mut controller = FilterController::new(DELAY);
        controller.select_location("Goa");
        controller.select_location("all");
        assert_eq!(controller.location_label(), "All Locations");
        assert_eq!(controller.year_label(), "All Years");
        assert_eq!(controller.snapshot().pending_location, "all");
    }

    #[test]
    fn test_orientation_facet_parsing() {
        assert_eq!("all".parse::<Facet<Orientation>>().unwrap(), Facet::All);
        assert_eq!(
            "vertical".parse::<Facet<Orientation>>().unwrap(),
            Facet::Only(Orientation::Vertical)
        );
        assert!("diagonal".parse::<Facet<Orientation>>().is_err());
    }
}
