use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::*;
use crate::error::GalleryError;

/// Tile sources offered by the map view buttons. Exactly one is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseLayer {
    Satellite,
    Normal,
    Terrain,
}

impl BaseLayer {
    pub const ALL: [BaseLayer; 3] = [BaseLayer::Satellite, BaseLayer::Normal, BaseLayer::Terrain];

    pub fn name(self) -> &'static str {
        match self {
            BaseLayer::Satellite => "satellite",
            BaseLayer::Normal => "normal",
            BaseLayer::Terrain => "terrain",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BaseLayer::Satellite => "Satellite",
            BaseLayer::Normal => "Street",
            BaseLayer::Terrain => "Terrain",
        }
    }

    pub fn tile_url(self) -> &'static str {
        match self {
            BaseLayer::Satellite => SATELLITE_TILE_URL,
            BaseLayer::Normal => NORMAL_TILE_URL,
            BaseLayer::Terrain => TERRAIN_TILE_URL,
        }
    }

    pub fn attribution(self) -> &'static str {
        match self {
            BaseLayer::Satellite => SATELLITE_ATTRIBUTION,
            BaseLayer::Normal => NORMAL_ATTRIBUTION,
            BaseLayer::Terrain => TERRAIN_ATTRIBUTION,
        }
    }

    pub fn max_zoom(self) -> Option<u8> {
        match self {
            BaseLayer::Satellite => Some(SATELLITE_MAX_ZOOM),
            _ => None,
        }
    }
}

impl Default for BaseLayer {
    fn default() -> Self {
        BaseLayer::Satellite
    }
}

impl FromStr for BaseLayer {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "satellite" => Ok(BaseLayer::Satellite),
            "normal" => Ok(BaseLayer::Normal),
            "terrain" => Ok(BaseLayer::Terrain),
            other => Err(GalleryError::UnknownView(other.to_string())),
        }
    }
}
