//! Error types for the gallery library.

use thiserror::Error;

/// Errors raised by the gallery, filter and map handlers.
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Failed to fetch gallery: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Failed to parse gallery JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Gallery JSON is not an object of years")]
    UnexpectedShape,

    #[error("Failed to load image {url}: {reason}")]
    ImageLoad { url: String, reason: String },

    #[error("Invalid coordinates: {0}")]
    Coordinates(String),

    #[error("Unknown map view: {0}")]
    UnknownView(String),

    #[error("Unknown orientation filter: {0}")]
    UnknownOrientation(String),

    #[error("Location list not found: {0}")]
    ListNotFound(String),

    #[error("Feature disabled, page anchor missing: {0}")]
    MissingAnchor(&'static str),

    #[error("No gallery item with id {0}")]
    UnknownItem(usize),
}

/// Result type alias for gallery operations.
pub type Result<T> = std::result::Result<T, GalleryError>;
