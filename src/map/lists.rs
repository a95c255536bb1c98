use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::assets::Asset;

/// The two location lists the map can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Original,
    Detailed,
}

impl ListKind {
    /// Anything that is not "detailed" means the original list.
    pub fn from_name(name: &str) -> Self {
        if name == "detailed" {
            ListKind::Detailed
        } else {
            ListKind::Original
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ListKind::Original => "original",
            ListKind::Detailed => "detailed",
        }
    }

    /// Id of the list container on the page.
    pub fn container_id(self) -> &'static str {
        match self {
            ListKind::Original => "original-locations",
            ListKind::Detailed => "detailed-locations",
        }
    }
}

/// One `.location-item`: a display name plus free-text coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub name: String,
    pub coordinates: String,
}

/// Static location lists. A list that is `None` has no container on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationLists {
    #[serde(default)]
    pub original: Option<Vec<LocationEntry>>,
    #[serde(default)]
    pub detailed: Option<Vec<LocationEntry>>,
}

impl LocationLists {
    pub fn get(&self, kind: ListKind) -> Option<&[LocationEntry]> {
        match kind {
            ListKind::Original => self.original.as_deref(),
            ListKind::Detailed => self.detailed.as_deref(),
        }
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("Failed to parse location lists")
    }

    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read location lists from {}", path.display()))?;
        Self::from_json(&text)
    }

    /// Lists bundled with the binary.
    pub fn embedded() -> anyhow::Result<Self> {
        let file = Asset::get("locations.json").context("locations.json is not embedded")?;
        let text = std::str::from_utf8(&file.data).context("locations.json is not UTF-8")?;
        Self::from_json(text)
    }

    /// Configured file when given, otherwise the bundled lists.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load_file(Path::new(path)),
            None => Self::embedded(),
        }
    }
}
