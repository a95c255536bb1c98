use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use crate::constants::MAX_PAGE_SESSIONS;
use crate::controller::PageController;
use crate::gallery::{GalleryLoader, GallerySource, ImageProbe};
use crate::map::{LeafletMap, LocationLists};
use crate::page::PageAnchors;
use crate::settings::Settings;
use super::session::{run_gallery_load, PageSession, SharedSession};

// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    sessions: Arc<Mutex<BTreeMap<u64, SharedSession>>>,
    next_session: Arc<AtomicU64>,
    pub anchors: PageAnchors,
    pub lists: Arc<LocationLists>,
    pub settings: Arc<Mutex<Settings>>,
    source: Arc<dyn GallerySource>,
    probe: Arc<dyn ImageProbe>,
}

impl AppState {
    pub fn new(
        anchors: PageAnchors,
        lists: LocationLists,
        settings: Settings,
        source: Arc<dyn GallerySource>,
        probe: Arc<dyn ImageProbe>,
    ) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(BTreeMap::new())),
            next_session: Arc::new(AtomicU64::new(1)),
            anchors,
            lists: Arc::new(lists),
            settings: Arc::new(Mutex::new(settings)),
            source,
            probe,
        }
    }

    /// Fresh page state for one page load. The gallery is fetched for it in
    /// the background; the returned handle finishes with that load.
    pub fn open_session(&self) -> Result<(u64, SharedSession, JoinHandle<()>)> {
        let settings = self.settings.lock().map_err(|_| anyhow!("settings lock poisoned"))?.clone();
        let page = PageController::new(self.anchors.clone(), &settings, LeafletMap::new(), (*self.lists).clone());
        let session = Arc::new(Mutex::new(PageSession::new(page)));
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);

        {
            let mut sessions = self.sessions.lock().map_err(|_| anyhow!("session table poisoned"))?;
            while sessions.len() >= MAX_PAGE_SESSIONS {
                if let Some((old, _)) = sessions.pop_first() {
                    tracing::debug!(session = old, "dropping oldest page session");
                }
            }
            sessions.insert(id, Arc::clone(&session));
        }

        let loader = GalleryLoader::new(Arc::clone(&self.source), Arc::clone(&self.probe));
        let load = tokio::spawn(run_gallery_load(Arc::clone(&session), loader));
        tracing::info!(session = id, "page opened, loading gallery");
        Ok((id, session, load))
    }

    pub fn session(&self, id: u64) -> Option<SharedSession> {
        self.sessions.lock().ok()?.get(&id).cloned()
    }
}
