pub mod item;
pub mod loader;
pub mod menu;
pub mod model;

pub use item::{GalleryItem, ImageSize, ItemFacets, ItemView, Orientation, Visibility};
pub use loader::{GalleryLoader, GallerySource, HttpGallerySource, HttpImageProbe, ImageProbe, LoadEvent};
pub use menu::{FilterMenus, MenuEntry};
pub use model::{Flattened, GalleryDocument, ImageRecord};

use serde::Serialize;

use crate::constants::HERO_GRADIENT;

/// Hero section background, set only once its image has preloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroBackground {
    pub image_link: String,
}

impl HeroBackground {
    /// Inline style for the hero section.
    pub fn style(&self) -> String {
        format!(
            "background-image: {}, url('{}'); background-size: cover; background-position: center; background-repeat: no-repeat;",
            HERO_GRADIENT,
            self.image_link.replace('\'', "%27")
        )
    }
}
