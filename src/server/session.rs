//! State of one loaded page: its controller plus the gallery events it has
//! been sent so far.

use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, mpsc};

use crate::controller::{LoadOutcome, PageController};
use crate::gallery::{GalleryLoader, LoadEvent};
use crate::html_template::{render_item, render_menu_entries};
use crate::map::LeafletMap;
use super::events::GalleryEvent;

pub type SharedSession = Arc<Mutex<PageSession>>;

pub struct PageSession {
    pub page: PageController<LeafletMap>,
    history: Vec<GalleryEvent>,
    events: broadcast::Sender<GalleryEvent>,
}

impl PageSession {
    pub fn new(mut page: PageController<LeafletMap>) -> Self {
        // The page renders the full map script; only later commands are shipped as updates
        if let Some(map) = page.map_mut() {
            map.provider_mut().take_pending();
        }
        let (events, _) = broadcast::channel(256);
        Self { page, history: Vec::new(), events }
    }

    /// Keep the event for subscribers that connect later and pass it to live ones.
    pub fn publish(&mut self, event: GalleryEvent) {
        self.history.push(event.clone());
        // No receivers just means the event stream is not open yet
        let _ = self.events.send(event);
    }

    /// Everything published so far, plus a receiver for what comes next.
    pub fn subscribe(&self) -> (Vec<GalleryEvent>, broadcast::Receiver<GalleryEvent>) {
        (self.history.clone(), self.events.subscribe())
    }

    /// Feed one load event into the page and publish what the browser has to add.
    pub fn apply_load_event(&mut self, event: LoadEvent) {
        let outgoing = match self.page.on_load_event(event) {
            LoadOutcome::ItemAdded(id) => self.page.item(id).map(|item| GalleryEvent::image_loaded(id, render_item(item))),
            LoadOutcome::MenusAdded(menus) => {
                Some(GalleryEvent::menus_ready(render_menu_entries(&menus, Some(self.page.filters()))))
            }
            LoadOutcome::HeroSet(hero) => Some(GalleryEvent::hero_ready(hero.style())),
            LoadOutcome::Failed(message) => Some(GalleryEvent::error(message)),
            LoadOutcome::Finished { loaded, failed } => Some(GalleryEvent::finished(loaded, failed)),
            LoadOutcome::Ignored => None,
        };

        if let Some(event) = outgoing {
            self.publish(event);
        }
    }
}

/// Drive a gallery load to completion, applying every step to the page.
pub async fn run_gallery_load(session: SharedSession, loader: GalleryLoader) {
    let (tx, mut rx) = mpsc::channel(64);
    let load = tokio::spawn(async move { loader.load(tx).await });

    while let Some(event) = rx.recv().await {
        match session.lock() {
            Ok(mut session) => session.apply_load_event(event),
            Err(_) => {
                tracing::error!("page session poisoned, stopping gallery load");
                break;
            }
        }
    }
    drop(rx);

    if let Err(e) = load.await {
        tracing::error!(error = %e, "gallery load task panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::{FilterMenus, ImageRecord, ImageSize};
    use crate::map::LocationLists;
    use crate::page::PageAnchors;
    use crate::settings::Settings;

    fn session() -> PageSession {
        let page = PageController::new(PageAnchors::all(), &Settings::default(), LeafletMap::new(), LocationLists::default());
        PageSession::new(page)
    }

    fn loaded(link: &str) -> LoadEvent {
        LoadEvent::ImageLoaded {
            record: ImageRecord {
                image_link: link.into(),
                season: "Winter".into(),
                shot_on: "Pixel 6".into(),
                location: "Goa".into(),
                year: "2022".into(),
            },
            size: ImageSize { width: 1200, height: 800 },
        }
    }

    #[test]
    fn test_late_subscriber_gets_backlog_then_live_events() {
        let mut session = session();
        session.apply_load_event(LoadEvent::MenusReady(FilterMenus::new(["Goa".to_string()], ["2022".to_string()])));
        session.apply_load_event(loaded("https://img/a.jpg"));

        let (backlog, mut rx) = session.subscribe();
        let kinds: Vec<_> = backlog.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(kinds, ["menus_ready", "image_loaded"]);

        session.apply_load_event(loaded("https://img/b.jpg"));
        session.apply_load_event(LoadEvent::Finished { loaded: 2, failed: 0 });

        assert_eq!(rx.try_recv().unwrap().event_type, "image_loaded");
        assert_eq!(rx.try_recv().unwrap().event_type, "gallery_finished");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_failed_image_publishes_nothing() {
        let mut session = session();
        session.apply_load_event(LoadEvent::ImageFailed { url: "https://img/x.jpg".into(), reason: "404".into() });
        assert!(session.subscribe().0.is_empty());
    }

    #[test]
    fn test_map_commands_from_init_are_not_shipped_again() {
        let mut session = session();
        let map = session.page.map_mut().unwrap();
        assert!(map.provider_mut().take_pending().is_empty());
    }
}
