//! Pixel Alchemy photo gallery: a filterable image grid, lightbox, column
//! slider and location map, driven from a Rust page controller.

pub mod assets;
pub mod constants;
pub mod controller;
pub mod error;
pub mod filter;
pub mod gallery;
pub mod guards;
pub mod html_template;
pub mod lightbox;
pub mod map;
pub mod page;
pub mod panel;
pub mod server;
pub mod settings;
pub mod slider;

pub use controller::{PageController, PageUpdate, UiEvent};
pub use error::{GalleryError, Result};
