use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use rand::seq::SliceRandom;
use rand::Rng;
use std::io::Cursor;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::item::ImageSize;
use super::menu::FilterMenus;
use super::model::{GalleryDocument, ImageRecord};
use crate::error::{GalleryError, Result};

/// Where the gallery JSON comes from.
#[async_trait]
pub trait GallerySource: Send + Sync {
    async fn fetch(&self) -> Result<String>;
}

/// Resolves an image URL to its decoded pixel size.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<ImageSize>;
}

/// Single GET to a fixed URL. No retry, no custom timeout.
pub struct HttpGallerySource {
    client: reqwest::Client,
    url: String,
}

impl HttpGallerySource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl GallerySource for HttpGallerySource {
    async fn fetch(&self) -> Result<String> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Downloads the image and reads its dimensions from the header.
pub struct HttpImageProbe {
    client: reqwest::Client,
}

impl HttpImageProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn probe(&self, url: &str) -> Result<ImageSize> {
        let load_error = |reason: String| GalleryError::ImageLoad { url: url.to_string(), reason };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| load_error(e.to_string()))?;
        let bytes = response.bytes().await.map_err(|e| load_error(e.to_string()))?;

        // Header-only read, the pixels themselves are never decoded here
        let (width, height) = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| load_error(e.to_string()))?
            .into_dimensions()
            .map_err(|e| load_error(e.to_string()))?;

        Ok(ImageSize { width, height })
    }
}

/// Progress of one gallery load, in the order things happen.
#[derive(Debug, Clone)]
pub enum LoadEvent {
    /// Dropdown entries are known; sent before any image finishes
    MenusReady(FilterMenus),
    ImageLoaded { record: ImageRecord, size: ImageSize },
    ImageFailed { url: String, reason: String },
    /// The randomly chosen hero image finished preloading
    HeroReady(ImageRecord),
    /// Fetch or parse failed; nothing else follows
    Failed(String),
    Finished { loaded: usize, failed: usize },
}

pub fn pick_hero<'a, R: Rng + ?Sized>(records: &'a [ImageRecord], rng: &mut R) -> Option<&'a ImageRecord> {
    records.choose(rng)
}

enum Job {
    Item(ImageRecord),
    Hero(ImageRecord),
}

pub struct GalleryLoader {
    source: Arc<dyn GallerySource>,
    probe: Arc<dyn ImageProbe>,
}

impl GalleryLoader {
    pub fn new(source: Arc<dyn GallerySource>, probe: Arc<dyn ImageProbe>) -> Self {
        Self { source, probe }
    }

    /// Fetch, flatten and probe every image, streaming progress into `events`.
    ///
    /// Images are probed concurrently and reported in completion order, so two
    /// runs may order the gallery differently. A closed receiver just stops
    /// the reporting; nothing here returns an error to the caller.
    pub async fn load(&self, events: mpsc::Sender<LoadEvent>) {
        let document = match self.fetch_document().await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(error = %e, "Error loading gallery");
                let _ = events.send(LoadEvent::Failed(e.to_string())).await;
                return;
            }
        };

        let flat = document.flatten();
        tracing::info!("Found {} images to load.", flat.records.len());

        if events.send(LoadEvent::MenusReady(FilterMenus::from_flattened(&flat))).await.is_err() {
            return;
        }

        let hero = pick_hero(&flat.records, &mut rand::thread_rng()).cloned();

        let mut pending: FuturesUnordered<_> = flat
            .records
            .into_iter()
            .map(Job::Item)
            .chain(hero.map(Job::Hero))
            .map(|job| {
                let probe = Arc::clone(&self.probe);
                async move {
                    let url = match &job {
                        Job::Item(r) | Job::Hero(r) => r.image_link.clone(),
                    };
                    let result = probe.probe(&url).await;
                    (job, result)
                }
            })
            .collect();

        let mut loaded = 0usize;
        let mut failed = 0usize;

        while let Some((job, result)) = pending.next().await {
            let event = match (job, result) {
                (Job::Item(record), Ok(size)) => {
                    tracing::debug!(url = %record.image_link, "Image loaded");
                    loaded += 1;
                    LoadEvent::ImageLoaded { record, size }
                }
                (Job::Item(record), Err(e)) => {
                    tracing::error!(url = %record.image_link, error = %e, "Failed to load image");
                    failed += 1;
                    LoadEvent::ImageFailed { url: record.image_link, reason: e.to_string() }
                }
                (Job::Hero(record), Ok(_)) => LoadEvent::HeroReady(record),
                (Job::Hero(record), Err(e)) => {
                    tracing::warn!(url = %record.image_link, error = %e, "hero image did not preload");
                    continue;
                }
            };

            if events.send(event).await.is_err() {
                return;
            }
        }

        tracing::info!(loaded, failed, "gallery load finished");
        let _ = events.send(LoadEvent::Finished { loaded, failed }).await;
    }

    async fn fetch_document(&self) -> Result<GalleryDocument> {
        let text = self.source.fetch().await?;
        let document = GalleryDocument::from_json(&text)?;
        tracing::debug!("JSON data fetched ({} bytes)", text.len());
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    struct StaticSource(std::result::Result<String, String>);

    #[async_trait]
    impl GallerySource for StaticSource {
        async fn fetch(&self) -> Result<String> {
            match &self.0 {
                Ok(body) => Ok(body.clone()),
                Err(_) => Err(GalleryError::UnexpectedShape),
            }
        }
    }

    /// Known URLs resolve to a size, anything else behaves like a 404.
    struct FakeProbe(HashMap<String, ImageSize>);

    #[async_trait]
    impl ImageProbe for FakeProbe {
        async fn probe(&self, url: &str) -> Result<ImageSize> {
            self.0.get(url).copied().ok_or_else(|| GalleryError::ImageLoad {
                url: url.to_string(),
                reason: "404 Not Found".to_string(),
            })
        }
    }

    const PAYLOAD: &str = r#"{
        "2022": { "Goa": [ { "imageLink": "ok-1.jpg", "season": "Winter", "shotOn": "Pixel" },
                           { "imageLink": "missing.jpg", "season": "Winter", "shotOn": "Pixel" } ] },
        "2023": { "Ooty": [ { "imageLink": "ok-2.jpg", "season": "Summer", "shotOn": "Pixel" } ] }
    }"#;

    fn probe() -> FakeProbe {
        FakeProbe(HashMap::from([
            ("ok-1.jpg".to_string(), ImageSize { width: 1200, height: 800 }),
            ("ok-2.jpg".to_string(), ImageSize { width: 800, height: 1200 }),
        ]))
    }

    async fn collect(loader: GalleryLoader) -> Vec<LoadEvent> {
        let (tx, mut rx) = mpsc::channel(64);
        loader.load(tx).await;
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_failed_image_gets_no_entry() {
        let loader = GalleryLoader::new(
            Arc::new(StaticSource(Ok(PAYLOAD.to_string()))),
            Arc::new(probe()),
        );
        let events = collect(loader).await;

        let loaded: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                LoadEvent::ImageLoaded { record, .. } => Some(record.image_link.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains(&"ok-1.jpg"));
        assert!(loaded.contains(&"ok-2.jpg"));
        assert!(!loaded.contains(&"missing.jpg"));

        assert!(matches!(events.first(), Some(LoadEvent::MenusReady(_))));
        assert!(matches!(events.last(), Some(LoadEvent::Finished { loaded: 2, failed: 1 })));
    }

    #[tokio::test]
    async fn test_menus_published_with_sorted_years() {
        let loader = GalleryLoader::new(
            Arc::new(StaticSource(Ok(PAYLOAD.to_string()))),
            Arc::new(probe()),
        );
        let events = collect(loader).await;
        let Some(LoadEvent::MenusReady(menus)) = events.first() else {
            panic!("menus must come first");
        };
        let years: Vec<&str> = menus.years.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(years, vec!["2023", "2022"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_halts_population() {
        let loader = GalleryLoader::new(
            Arc::new(StaticSource(Err("offline".to_string()))),
            Arc::new(probe()),
        );
        let events = collect(loader).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], LoadEvent::Failed(_)));
    }

    #[tokio::test]
    async fn test_unparseable_payload_halts_population() {
        let loader = GalleryLoader::new(
            Arc::new(StaticSource(Ok("<html>rate limited</html>".to_string()))),
            Arc::new(probe()),
        );
        let events = collect(loader).await;
        assert!(matches!(events.as_slice(), [LoadEvent::Failed(_)]));
    }

    #[test]
    fn test_pick_hero_is_one_of_the_records() {
        let records: Vec<ImageRecord> = (0..5)
            .map(|i| ImageRecord {
                image_link: format!("{i}.jpg"),
                season: String::new(),
                shot_on: String::new(),
                location: "Goa".into(),
                year: "2022".into(),
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        let hero = pick_hero(&records, &mut rng).unwrap();
        assert!(records.contains(hero));
        assert!(pick_hero(&[], &mut rng).is_none());
    }
}
