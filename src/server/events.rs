use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// SSE Event types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryEvent {
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub data: GalleryEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GalleryEventData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<usize>,
    /// Markup for a new item, or menu markup keyed by menu element id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GalleryEvent {
    pub fn new(event_type: &str, data: GalleryEventData) -> Self {
        Self { event_type: event_type.to_string(), timestamp: Utc::now(), data }
    }

    pub fn image_loaded(id: usize, html: String) -> Self {
        Self::new("image_loaded", GalleryEventData {
            id: Some(id),
            html: Some(serde_json::Value::String(html)),
            ..Default::default()
        })
    }

    pub fn menus_ready(menus: BTreeMap<String, String>) -> Self {
        let html = menus.into_iter().map(|(k, v)| (k, serde_json::Value::String(v))).collect();
        Self::new("menus_ready", GalleryEventData {
            html: Some(serde_json::Value::Object(html)),
            ..Default::default()
        })
    }

    pub fn hero_ready(style: String) -> Self {
        Self::new("hero_ready", GalleryEventData { style: Some(style), ..Default::default() })
    }

    pub fn error(message: String) -> Self {
        Self::new("gallery_error", GalleryEventData { message: Some(message), ..Default::default() })
    }

    pub fn finished(loaded: usize, failed: usize) -> Self {
        Self::new("gallery_finished", GalleryEventData {
            loaded: Some(loaded),
            failed: Some(failed),
            ..Default::default()
        })
    }

    pub fn heartbeat() -> Self {
        Self::new("heartbeat", GalleryEventData {
            message: Some("SSE connection alive".to_string()),
            ..Default::default()
        })
    }
}
