//! The page controller: one owner for every feature handler on the page.
//!
//! UI events and gallery load progress both come in here. Each feature is
//! only wired when the page provides its anchor elements.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::error::{GalleryError, Result};
use crate::filter::{self, FilterController, FilterSnapshot, ItemTransition};
use crate::gallery::{FilterMenus, GalleryItem, HeroBackground, LoadEvent, Orientation, Visibility};
use crate::lightbox::{CloseTrigger, Lightbox, LightboxView};
use crate::map::{ListKind, MapController, MapProvider, LocationLists};
use crate::page::{ControlView, PageAnchors, NAV_PANEL_ID};
use crate::panel::{self, CollapsiblePanel};
use crate::settings::Settings;
use crate::slider::{ColumnLayout, SliderBinding, SliderState};

/// Everything the page can report.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    ItemClicked { id: usize },
    LightboxClose,
    LightboxOverlay { on_image: bool },
    KeyDown { key: String },
    SliderInput { view: ControlView, value: u32 },
    Orientation { value: String },
    Location { value: String },
    Year { value: String },
    /// `panel_shown` is the nav panel's state as the page sees it right now
    Apply {
        view: ControlView,
        #[serde(default)]
        panel_shown: Option<bool>,
    },
    /// Fade-out timers may have expired
    Tick,
    AnimationFrame,
    MapView { value: String },
    MapList { value: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemClasses {
    pub id: usize,
    pub classes: &'static str,
}

/// What the page has to change after an event.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUpdate {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemClasses>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterSnapshot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sliders: Vec<SliderState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
    /// `Some(None)` closes the lightbox, `None` leaves it alone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lightbox: Option<Option<LightboxView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_list: Option<String>,
    /// JavaScript to run on the page (map commands, panel collapse)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Ask for a tick after this many milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_ms: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub next_frame: bool,
}

impl PageUpdate {
    fn with_transitions(transitions: &[ItemTransition], fade_delay: Duration) -> Self {
        let mut update = PageUpdate {
            items: transitions.iter().map(|t| ItemClasses { id: t.id, classes: t.to.classes() }).collect(),
            ..Default::default()
        };
        if transitions.iter().any(|t| matches!(t.to, Visibility::FadingOut { .. })) {
            update.follow_up_ms = Some(fade_delay.as_millis() as u64);
        }
        update.next_frame = transitions.iter().any(|t| t.to == Visibility::FadingIn);
        update
    }
}

/// Result of feeding one gallery load event into the page.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    MenusAdded(FilterMenus),
    ItemAdded(usize),
    HeroSet(HeroBackground),
    Failed(String),
    Finished { loaded: usize, failed: usize },
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadStatus {
    Loading,
    Ready { loaded: usize, failed: usize },
    Failed { message: String },
}

pub struct PageController<P: MapProvider> {
    anchors: PageAnchors,
    items: Vec<GalleryItem>,
    menus: FilterMenus,
    filters: FilterController,
    lightbox: Option<Lightbox>,
    columns: ColumnLayout,
    sliders: Vec<SliderBinding>,
    nav_panel: Option<Box<dyn CollapsiblePanel>>,
    map: Option<MapController<P>>,
    hero: Option<HeroBackground>,
    status: LoadStatus,
}

impl<P: MapProvider> PageController<P> {
    pub fn new(anchors: PageAnchors, settings: &Settings, provider: P, lists: LocationLists) -> Self {
        let columns = ColumnLayout::new(settings.column_count, settings.slider_min, settings.slider_max);
        let sliders = ControlView::ALL
            .into_iter()
            .filter(|view| anchors.slider(*view))
            .map(|view| columns.bind(view))
            .collect();

        let lightbox = anchors.lightbox.then(Lightbox::new);
        let nav_panel = anchors
            .nav_panel
            .then(|| panel::nav_panel(NAV_PANEL_ID, settings.bootstrap, false));
        let map = anchors.map.then(|| MapController::new(provider, lists));

        Self {
            anchors,
            items: Vec::new(),
            menus: FilterMenus::default(),
            filters: FilterController::new(Duration::from_millis(settings.fade_delay_ms)),
            lightbox,
            columns,
            sliders,
            nav_panel,
            map,
            hero: None,
            status: LoadStatus::Loading,
        }
    }

    pub fn anchors(&self) -> &PageAnchors {
        &self.anchors
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn item(&self, id: usize) -> Option<&GalleryItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn menus(&self) -> &FilterMenus {
        &self.menus
    }

    pub fn filters(&self) -> &FilterController {
        &self.filters
    }

    pub fn lightbox(&self) -> Option<&Lightbox> {
        self.lightbox.as_ref()
    }

    pub fn columns(&self) -> u32 {
        self.columns.columns()
    }

    pub fn column_style(&self) -> String {
        self.columns.css_variable()
    }

    pub fn slider_states(&self) -> Vec<SliderState> {
        self.sliders.iter().map(SliderBinding::state).collect()
    }

    pub fn map(&self) -> Option<&MapController<P>> {
        self.map.as_ref()
    }

    pub fn map_mut(&mut self) -> Option<&mut MapController<P>> {
        self.map.as_mut()
    }

    pub fn hero(&self) -> Option<&HeroBackground> {
        self.hero.as_ref()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Apply one step of the gallery load to the page.
    pub fn on_load_event(&mut self, event: LoadEvent) -> LoadOutcome {
        match event {
            LoadEvent::MenusReady(menus) => {
                if !(self.anchors.location_menus || self.anchors.year_menus) {
                    return LoadOutcome::Ignored;
                }
                self.menus = menus.clone();
                LoadOutcome::MenusAdded(menus)
            }
            LoadEvent::ImageLoaded { record, size } => {
                if !self.anchors.gallery {
                    return LoadOutcome::Ignored;
                }
                let id = self.items.len();
                self.items.push(GalleryItem::new(id, record, size));
                LoadOutcome::ItemAdded(id)
            }
            // Failed images never get an entry
            LoadEvent::ImageFailed { .. } => LoadOutcome::Ignored,
            LoadEvent::HeroReady(record) => {
                if !self.anchors.hero {
                    return LoadOutcome::Ignored;
                }
                let hero = HeroBackground { image_link: record.image_link };
                self.hero = Some(hero.clone());
                LoadOutcome::HeroSet(hero)
            }
            LoadEvent::Failed(message) => {
                self.status = LoadStatus::Failed { message: message.clone() };
                LoadOutcome::Failed(message)
            }
            LoadEvent::Finished { loaded, failed } => {
                self.status = LoadStatus::Ready { loaded, failed };
                LoadOutcome::Finished { loaded, failed }
            }
        }
    }

    pub fn handle(&mut self, event: UiEvent, now: Instant) -> Result<PageUpdate> {
        let fade_delay = self.filters.fade_delay();

        match event {
            UiEvent::ItemClicked { id } => {
                let item = self.items.iter().find(|i| i.id == id).ok_or(GalleryError::UnknownItem(id))?;
                let lightbox = self.lightbox.as_mut().ok_or(GalleryError::MissingAnchor("lightbox"))?;
                lightbox.open(item);
                Ok(PageUpdate { lightbox: Some(lightbox.current().cloned()), ..Default::default() })
            }
            UiEvent::LightboxClose => {
                if !self.anchors.lightbox_close {
                    return Err(GalleryError::MissingAnchor("lightbox-close"));
                }
                self.close_lightbox(|lb| lb.close(CloseTrigger::CloseButton))
            }
            UiEvent::LightboxOverlay { on_image } => self.close_lightbox(|lb| lb.click_overlay(on_image)),
            UiEvent::KeyDown { key } => self.close_lightbox(|lb| lb.key_down(&key)),
            UiEvent::SliderInput { view, value } => {
                if !self.anchors.slider(view) {
                    return Err(GalleryError::MissingAnchor("column slider"));
                }
                let columns = self.columns.set(value);
                Ok(PageUpdate {
                    sliders: self.slider_states(),
                    columns: self.anchors.gallery.then_some(columns),
                    ..Default::default()
                })
            }
            UiEvent::Orientation { value } => {
                let orientation: filter::Facet<Orientation> = value.parse()?;
                let transitions = self.filters.select_orientation(orientation, &mut self.items, now);
                Ok(self.filter_update(&transitions, fade_delay))
            }
            UiEvent::Location { value } => {
                if !self.anchors.location_menus {
                    return Err(GalleryError::MissingAnchor("location menu"));
                }
                self.filters.select_location(&value);
                Ok(PageUpdate { filters: Some(self.filters.snapshot()), ..Default::default() })
            }
            UiEvent::Year { value } => {
                if !self.anchors.year_menus {
                    return Err(GalleryError::MissingAnchor("year menu"));
                }
                self.filters.select_year(&value);
                Ok(PageUpdate { filters: Some(self.filters.snapshot()), ..Default::default() })
            }
            UiEvent::Apply { view, panel_shown } => {
                if !self.anchors.apply_button(view) {
                    return Err(GalleryError::MissingAnchor("apply button"));
                }
                tracing::info!("Apply button clicked ({:?})", view);
                let transitions = self.filters.apply(&mut self.items, now);
                let mut update = self.filter_update(&transitions, fade_delay);
                if view == ControlView::Mobile {
                    if let Some(panel) = self.nav_panel.as_mut() {
                        if let Some(shown) = panel_shown {
                            panel.set_shown(shown);
                        }
                        update.script = panel::auto_close(panel.as_mut());
                    }
                }
                Ok(update)
            }
            UiEvent::Tick => {
                let transitions = filter::complete_fades(&mut self.items, now);
                Ok(PageUpdate::with_transitions(&transitions, fade_delay))
            }
            UiEvent::AnimationFrame => {
                let transitions = filter::animation_frame(&mut self.items);
                Ok(PageUpdate::with_transitions(&transitions, fade_delay))
            }
            UiEvent::MapView { value } => {
                let map = self.map.as_mut().ok_or(GalleryError::MissingAnchor("map"))?;
                let layer = map.set_view(&value)?;
                Ok(PageUpdate { map_view: Some(layer.name().to_string()), ..Default::default() })
            }
            UiEvent::MapList { value } => {
                let map = self.map.as_mut().ok_or(GalleryError::MissingAnchor("map"))?;
                let kind = ListKind::from_name(&value);
                // A missing list is logged by the controller; the cleared map still goes out
                if let Err(e) = map.load_markers(kind) {
                    tracing::debug!(error = %e, "marker list unavailable");
                }
                Ok(PageUpdate { map_list: Some(kind.name().to_string()), ..Default::default() })
            }
        }
    }

    fn close_lightbox(&mut self, close: impl FnOnce(&mut Lightbox) -> bool) -> Result<PageUpdate> {
        let lightbox = self.lightbox.as_mut().ok_or(GalleryError::MissingAnchor("lightbox"))?;
        let mut update = PageUpdate::default();
        if close(lightbox) {
            update.lightbox = Some(None);
        }
        Ok(update)
    }

    fn filter_update(&self, transitions: &[ItemTransition], fade_delay: Duration) -> PageUpdate {
        PageUpdate {
            filters: Some(self.filters.snapshot()),
            ..PageUpdate::with_transitions(transitions, fade_delay)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::{ImageRecord, ImageSize};
    use crate::map::{LeafletMap, LocationEntry};
    use crate::panel::ClassTogglePanel;

    fn record(link: &str, location: &str, year: &str) -> ImageRecord {
        ImageRecord {
            image_link: link.into(),
            season: "Winter".into(),
            shot_on: "Pixel".into(),
            location: location.into(),
            year: year.into(),
        }
    }

    fn lists() -> LocationLists {
        LocationLists {
            original: Some(vec![LocationEntry { name: "Goa".into(), coordinates: "15.2993° N, 74.1240° E".into() }]),
            detailed: None,
        }
    }

    fn page_with(anchors: PageAnchors) -> PageController<LeafletMap> {
        let mut page = PageController::new(anchors, &Settings::default(), LeafletMap::new(), lists());
        page.on_load_event(LoadEvent::MenusReady(FilterMenus::new(
            ["Goa", "Ooty"].map(String::from),
            ["2022", "2023"].map(String::from),
        )));
        for (link, loc, year, w, h) in [
            ("a.jpg", "Goa", "2022", 1200, 800),
            ("b.jpg", "Ooty", "2023", 800, 1200),
            ("c.jpg", "Goa", "2023", 1200, 800),
        ] {
            page.on_load_event(LoadEvent::ImageLoaded { record: record(link, loc, year), size: ImageSize { width: w, height: h } });
        }
        page.handle(UiEvent::AnimationFrame, Instant::now()).unwrap();
        page
    }

    fn page() -> PageController<LeafletMap> {
        page_with(PageAnchors::all())
    }

    fn shown(page: &PageController<LeafletMap>) -> Vec<usize> {
        page.items().iter().filter(|i| i.visibility.is_shown()).map(|i| i.id).collect()
    }

    #[test]
    fn test_failed_image_leaves_no_item() {
        let mut page = page();
        let outcome = page.on_load_event(LoadEvent::ImageFailed { url: "x.jpg".into(), reason: "404".into() });
        assert!(matches!(outcome, LoadOutcome::Ignored));
        assert_eq!(page.items().len(), 3);
    }

    #[test]
    fn test_item_click_opens_lightbox_and_escape_closes() {
        let mut page = page();
        let update = page.handle(UiEvent::ItemClicked { id: 1 }, Instant::now()).unwrap();
        let view = update.lightbox.unwrap().unwrap();
        assert_eq!(view.image_link, "b.jpg");

        let update = page.handle(UiEvent::KeyDown { key: "Escape".into() }, Instant::now()).unwrap();
        assert!(matches!(update.lightbox, Some(None)));

        // already closed: no-op
        let update = page.handle(UiEvent::LightboxClose, Instant::now()).unwrap();
        assert!(update.lightbox.is_none());
    }

    fn apply_mobile(panel_shown: bool) -> UiEvent {
        UiEvent::Apply { view: ControlView::Mobile, panel_shown: Some(panel_shown) }
    }

    #[test]
    fn test_location_waits_for_apply_and_mobile_apply_collapses_nav() {
        let mut page = page();
        let now = Instant::now();

        page.handle(UiEvent::Location { value: "Goa".into() }, now).unwrap();
        assert_eq!(shown(&page), vec![0, 1, 2]);

        let update = page.handle(apply_mobile(true), now).unwrap();
        assert_eq!(shown(&page), vec![0, 2]);
        assert_eq!(update.follow_up_ms, Some(400));
        assert!(update.script.unwrap().contains("bootstrap.Collapse"));

        let update = page.handle(UiEvent::Tick, now + Duration::from_millis(400)).unwrap();
        assert_eq!(update.items.len(), 1);
        assert_eq!(update.items[0].classes, "image-container hidden");
    }

    #[test]
    fn test_every_mobile_apply_collapses_a_reopened_nav() {
        let mut page = page();
        let now = Instant::now();

        assert!(page.handle(apply_mobile(true), now).unwrap().script.is_some());
        // collapsed on the page, nothing to do
        assert!(page.handle(apply_mobile(false), now).unwrap().script.is_none());
        // user opened the hamburger menu again
        assert!(page.handle(apply_mobile(true), now).unwrap().script.is_some());
        assert!(page.handle(apply_mobile(true), now).unwrap().script.is_some());
    }

    #[test]
    fn test_desktop_apply_leaves_nav_alone() {
        let mut page = page();
        let update = page
            .handle(UiEvent::Apply { view: ControlView::Desktop, panel_shown: Some(true) }, Instant::now())
            .unwrap();
        assert!(update.script.is_none());
    }

    #[test]
    fn test_orientation_is_instant() {
        let mut page = page();
        let update = page
            .handle(UiEvent::Orientation { value: "vertical".into() }, Instant::now())
            .unwrap();
        assert_eq!(shown(&page), vec![1]);
        assert_eq!(update.filters.unwrap().orientation, "vertical");
        assert!(page.handle(UiEvent::Orientation { value: "sideways".into() }, Instant::now()).is_err());
    }

    #[test]
    fn test_slider_updates_both_controls() {
        let mut page = page();
        let update = page
            .handle(UiEvent::SliderInput { view: ControlView::Mobile, value: 5 }, Instant::now())
            .unwrap();
        assert_eq!(update.columns, Some(5));
        assert_eq!(update.sliders.len(), 2);
        assert!(update.sliders.iter().all(|s| s.value == 5 && s.fill_percent == 100.0));
    }

    #[test]
    fn test_missing_anchor_disables_only_that_feature() {
        let anchors = PageAnchors { slider_desktop: false, lightbox: false, map: false, ..PageAnchors::all() };
        let mut page = page_with(anchors);
        let now = Instant::now();

        assert!(matches!(
            page.handle(UiEvent::SliderInput { view: ControlView::Desktop, value: 2 }, now),
            Err(GalleryError::MissingAnchor(_))
        ));
        assert!(page.handle(UiEvent::ItemClicked { id: 0 }, now).is_err());
        assert!(page.handle(UiEvent::MapView { value: "terrain".into() }, now).is_err());

        let update = page.handle(UiEvent::SliderInput { view: ControlView::Mobile, value: 2 }, now).unwrap();
        assert_eq!(update.sliders.len(), 1);
        assert!(page.handle(UiEvent::Orientation { value: "horizontal".into() }, now).is_ok());
    }

    #[test]
    fn test_map_events() {
        let mut page = page();
        let now = Instant::now();
        let update = page.handle(UiEvent::MapView { value: "terrain".into() }, now).unwrap();
        assert_eq!(update.map_view.as_deref(), Some("terrain"));

        let update = page.handle(UiEvent::MapList { value: "detailed".into() }, now).unwrap();
        assert_eq!(update.map_list.as_deref(), Some("detailed"));
        assert_eq!(page.map().unwrap().placed_markers(), 0);
    }

    #[test]
    fn test_fallback_panel_when_framework_missing() {
        let mut panel = ClassTogglePanel::new(NAV_PANEL_ID, true);
        assert!(panel::auto_close(&mut panel).is_some());
    }

    #[test]
    fn test_ui_event_json_shape() {
        let event: UiEvent = serde_json::from_str(r#"{"type": "slider_input", "view": "desktop", "value": 2}"#).unwrap();
        assert!(matches!(event, UiEvent::SliderInput { view: ControlView::Desktop, value: 2 }));

        let event: UiEvent = serde_json::from_str(r#"{"type": "apply", "view": "mobile"}"#).unwrap();
        assert!(matches!(event, UiEvent::Apply { view: ControlView::Mobile, panel_shown: None }));
    }
}
