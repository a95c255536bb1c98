use serde::Serialize;

use crate::gallery::GalleryItem;

/// What the user interacted with to close the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    CloseButton,
    Backdrop,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightboxView {
    pub item_id: usize,
    pub image_link: String,
    pub caption: String,
}

/// Full-view overlay for a clicked gallery item. Binary show/hide.
#[derive(Debug, Default)]
pub struct Lightbox {
    current: Option<LightboxView>,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&LightboxView> {
        self.current.as_ref()
    }

    pub fn open(&mut self, item: &GalleryItem) {
        self.current = Some(LightboxView {
            item_id: item.id,
            image_link: item.record.image_link.clone(),
            caption: item.record.caption(),
        });
    }

    /// Returns whether anything changed. Closing a closed lightbox is a no-op.
    pub fn close(&mut self, trigger: CloseTrigger) -> bool {
        let was_open = self.current.take().is_some();
        if was_open {
            tracing::debug!(?trigger, "lightbox closed");
        }
        was_open
    }

    /// Clicks on the overlay close it only when they land outside the image.
    pub fn click_overlay(&mut self, on_image: bool) -> bool {
        if on_image {
            return false;
        }
        self.close(CloseTrigger::Backdrop)
    }

    pub fn key_down(&mut self, key: &str) -> bool {
        key == "Escape" && self.close(CloseTrigger::Escape)
    }
}
