use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use super::model::ImageRecord;
use crate::error::GalleryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Vertical only when strictly taller than wide; squares count as horizontal.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if height > width {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" => Ok(Orientation::Horizontal),
            "vertical" => Ok(Orientation::Vertical),
            other => Err(GalleryError::UnknownOrientation(other.to_string())),
        }
    }
}

/// Measured pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Display state of a rendered item. Mirrors the fade-out / hidden class pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    /// Fading out, becomes `Hidden` once `hide_at` passes
    FadingOut { hide_at: Instant },
    Hidden,
    /// Unhidden but still transparent until the next animation frame
    FadingIn,
}

impl Visibility {
    /// Whether the item belongs to the visible set.
    pub fn is_shown(self) -> bool {
        matches!(self, Visibility::Visible | Visibility::FadingIn)
    }

    /// CSS classes the page should carry for this state.
    pub fn classes(self) -> &'static str {
        match self {
            Visibility::Visible => "image-container",
            Visibility::FadingOut { .. } | Visibility::FadingIn => "image-container fade-out",
            Visibility::Hidden => "image-container hidden",
        }
    }
}

/// The three facet values an item is filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemFacets<'a> {
    pub orientation: Orientation,
    pub location: &'a str,
    pub year: &'a str,
}

/// A gallery entry that exists only because its image loaded.
#[derive(Debug, Clone)]
pub struct GalleryItem {
    pub id: usize,
    pub record: ImageRecord,
    pub orientation: Orientation,
    pub visibility: Visibility,
}

impl GalleryItem {
    /// New items start transparent and fade in on the next frame.
    pub fn new(id: usize, record: ImageRecord, size: ImageSize) -> Self {
        Self {
            id,
            orientation: Orientation::from_dimensions(size.width, size.height),
            record,
            visibility: Visibility::FadingIn,
        }
    }

    pub fn facets(&self) -> ItemFacets<'_> {
        ItemFacets {
            orientation: self.orientation,
            location: &self.record.location,
            year: &self.record.year,
        }
    }
}

/// Serializable snapshot of an item for the JSON API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: usize,
    pub image_link: String,
    pub location: String,
    pub year: String,
    pub season: String,
    pub shot_on: String,
    pub orientation: Orientation,
    pub shown: bool,
    pub classes: &'static str,
}

impl From<&GalleryItem> for ItemView {
    fn from(item: &GalleryItem) -> Self {
        Self {
            id: item.id,
            image_link: item.record.image_link.clone(),
            location: item.record.location.clone(),
            year: item.record.year.clone(),
            season: item.record.season.clone(),
            shot_on: item.record.shot_on.clone(),
            orientation: item.orientation,
            shown: item.visibility.is_shown(),
            classes: item.visibility.classes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_dimensions() {
        assert_eq!(Orientation::from_dimensions(800, 1200), Orientation::Vertical);
        assert_eq!(Orientation::from_dimensions(1200, 800), Orientation::Horizontal);
        assert_eq!(Orientation::from_dimensions(500, 500), Orientation::Horizontal);
    }

    #[test]
    fn test_new_item_fades_in() {
        let record = ImageRecord {
            image_link: "a.jpg".into(),
            season: "Winter".into(),
            shot_on: "Pixel".into(),
            location: "Goa".into(),
            year: "2022".into(),
        };
        let item = GalleryItem::new(7, record, ImageSize { width: 3, height: 4 });
        assert_eq!(item.visibility, Visibility::FadingIn);
        assert!(item.visibility.is_shown());
        assert_eq!(item.facets().orientation, Orientation::Vertical);
        assert_eq!(item.facets().location, "Goa");
    }
}
