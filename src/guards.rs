//! Keeps casual visitors from saving gallery images.
//!
//! Cancelling a DOM event has to happen synchronously in the browser, so the
//! page only receives the rules as part of its config.

use serde::Serialize;

/// Document-level events that are cancelled when they target an image.
pub const SUPPRESSED_EVENTS: [&str; 2] = ["contextmenu", "dragstart"];

/// Tag name, as the DOM reports it, of the elements being protected.
pub const GUARDED_TAG: &str = "IMG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardRules {
    pub suppressed_events: Vec<&'static str>,
    pub guarded_tag: &'static str,
}

impl Default for GuardRules {
    fn default() -> Self {
        Self { suppressed_events: SUPPRESSED_EVENTS.to_vec(), guarded_tag: GUARDED_TAG }
    }
}
