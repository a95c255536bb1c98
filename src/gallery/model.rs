use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

use crate::error::{GalleryError, Result};

/// One image entry as it appears in the remote JSON, before flattening.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialImage {
    pub image_link: String,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub shot_on: String,
}

/// A flattened image entry annotated with the year and location it was filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub image_link: String,
    pub season: String,
    pub shot_on: String,
    pub location: String,
    pub year: String,
}

impl ImageRecord {
    /// Text shown on the item overlay and in the lightbox caption.
    pub fn caption(&self) -> String {
        format!("{}\n{} • {}", self.location, self.season, self.shot_on)
    }

    pub fn alt_text(&self) -> String {
        format!("{} - {}", self.location, self.season)
    }
}

/// The parsed `{ year: { location: [image, ...] } }` document.
#[derive(Debug, Clone)]
pub struct GalleryDocument {
    years: Map<String, Value>,
}

/// Output of flattening: the records plus every observed year and location.
#[derive(Debug, Clone, Default)]
pub struct Flattened {
    pub records: Vec<ImageRecord>,
    /// First-seen order, deduplicated
    pub locations: Vec<String>,
    /// Descending order, deduplicated
    pub years: Vec<String>,
}

impl GalleryDocument {
    pub fn from_json(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(years) => Ok(Self { years }),
            _ => Err(GalleryError::UnexpectedShape),
        }
    }

    /// Flatten year -> location -> images into one list.
    ///
    /// Years are walked newest first, locations in the order the source
    /// document lists them. Location values that are not arrays are skipped,
    /// as are entries that lack an `imageLink`.
    pub fn flatten(&self) -> Flattened {
        let mut out = Flattened::default();

        let mut year_keys: Vec<&String> = self.years.keys().collect();
        year_keys.sort_by(|a, b| compare_years_desc(a, b));

        for year in year_keys {
            push_unique(&mut out.years, year);

            let Some(locations) = self.years.get(year).and_then(Value::as_object) else {
                continue;
            };

            for (location, images) in locations {
                let Some(images) = images.as_array() else {
                    continue;
                };
                push_unique(&mut out.locations, location);

                for image in images {
                    match PartialImage::deserialize(image) {
                        Ok(partial) => out.records.push(ImageRecord {
                            image_link: partial.image_link,
                            season: partial.season,
                            shot_on: partial.shot_on,
                            location: location.clone(),
                            year: year.clone(),
                        }),
                        Err(e) => {
                            tracing::warn!(%year, %location, error = %e, "skipping malformed image entry");
                        }
                    }
                }
            }
        }

        sort_years_desc(&mut out.years);
        out
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Newest first. Numeric keys compare as numbers, anything else falls back to
/// reverse lexicographic order.
pub fn compare_years_desc(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => y.cmp(&x),
        _ => b.cmp(a),
    }
}

pub fn sort_years_desc(years: &mut [String]) {
    years.sort_by(|a, b| compare_years_desc(a, b));
}
