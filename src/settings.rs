use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::constants::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub port: u16,
    pub gallery_url: String,
    pub column_count: u32,
    pub slider_min: u32,
    pub slider_max: u32,
    pub fade_delay_ms: u64,
    #[serde(default)]
    pub locations_file: Option<String>,
    /// Whether the page ships the Bootstrap collapse component
    #[serde(default = "default_true")]
    pub bootstrap: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            gallery_url: GALLERY_JSON_URL.to_string(),
            column_count: DEFAULT_COLUMN_COUNT,
            slider_min: SLIDER_DEFAULT_MIN,
            slider_max: SLIDER_DEFAULT_MAX,
            fade_delay_ms: FADE_OUT_DELAY_MS,
            locations_file: None,
            bootstrap: true,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut settings = Settings::default();
        if !config_path.exists() {
            return Ok(settings);
        }

        let file = File::open(config_path).context("Failed to open config file")?;
        let reader = BufReader::new(file);
        let mut config_map = HashMap::new();

        for line in reader.lines() {
            let line = line.context("Failed to read line from config")?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                config_map.insert(key.trim().to_string(), value.trim().trim_matches('"').to_string());
            }
        }

        if let Some(url) = config_map.get("gallery_url") {
            settings.gallery_url = url.clone();
        }
        if let Some(path) = config_map.get("locations_file") {
            if !path.is_empty() {
                settings.locations_file = Some(path.clone());
            }
        }
        if let Some(port) = config_map.get("port").and_then(|v| v.parse::<u16>().ok()) {
            settings.port = port;
        }
        if let Some(count) = config_map.get("column_count").and_then(|v| v.parse::<u32>().ok()) {
            settings.column_count = count;
        }
        if let Some(min) = config_map.get("slider_min").and_then(|v| v.parse::<u32>().ok()) {
            settings.slider_min = min;
        }
        if let Some(max) = config_map.get("slider_max").and_then(|v| v.parse::<u32>().ok()) {
            settings.slider_max = max;
        }
        if let Some(delay) = config_map.get("fade_delay_ms").and_then(|v| v.parse::<u64>().ok()) {
            settings.fade_delay_ms = delay;
        }
        if let Some(bootstrap) = config_map.get("bootstrap").and_then(|v| v.parse::<bool>().ok()) {
            settings.bootstrap = bootstrap;
        }

        // A degenerate range would make the fill percentage divide by zero
        if settings.slider_max <= settings.slider_min {
            tracing::warn!(
                min = settings.slider_min,
                max = settings.slider_max,
                "invalid slider range in config, using defaults"
            );
            settings.slider_min = SLIDER_DEFAULT_MIN;
            settings.slider_max = SLIDER_DEFAULT_MAX;
        }

        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Creating config directory")?;
        }

        let mut content = String::new();
        content.push_str("# Pixel Gallery Configuration File\n");
        content.push_str(&format!("port = {}\n", self.port));
        content.push_str(&format!("gallery_url = \"{}\"\n", self.gallery_url));
        content.push_str(&format!("column_count = {}\n", self.column_count));
        content.push_str(&format!("slider_min = {}\n", self.slider_min));
        content.push_str(&format!("slider_max = {}\n", self.slider_max));
        content.push_str(&format!("fade_delay_ms = {}\n", self.fade_delay_ms));
        if let Some(ref locations_file) = self.locations_file {
            content.push_str(&format!("locations_file = \"{}\"\n", locations_file));
        }
        content.push_str(&format!("bootstrap = {}\n", self.bootstrap));

        std::fs::write(config_path, content).context("Failed to write to config file")?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let mut path = std::env::current_exe()
            .unwrap_or_default()
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        if path.ends_with("target/debug") || path.ends_with("target/release") {
            path.pop();
            path.pop();
        }
        path.push("pixel_gallery.ini");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel_gallery.ini");

        let settings = Settings {
            port: 8080,
            column_count: 4,
            locations_file: Some("/srv/locations.json".to_string()),
            bootstrap: false,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_comments_and_garbage_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel_gallery.ini");
        std::fs::write(&path, "# comment\n\nport = not-a-number\nfade_delay_ms = 250\n").unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.port, DEFAULT_PORT);
        assert_eq!(loaded.fade_delay_ms, 250);
    }

    #[test]
    fn test_inverted_slider_range_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel_gallery.ini");
        std::fs::write(&path, "slider_min = 6\nslider_max = 2\n").unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!((loaded.slider_min, loaded.slider_max), (SLIDER_DEFAULT_MIN, SLIDER_DEFAULT_MAX));
    }
}
