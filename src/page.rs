//! Elements the page must provide. A feature whose anchor is missing stays
//! switched off; the rest of the page keeps working.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which of the two redundant control sets a widget belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlView {
    Desktop,
    Mobile,
}

impl ControlView {
    pub const ALL: [ControlView; 2] = [ControlView::Desktop, ControlView::Mobile];

    /// Suffix used by element ids (`locationMenuDesktop`, ...).
    pub fn id_suffix(self) -> &'static str {
        match self {
            ControlView::Desktop => "Desktop",
            ControlView::Mobile => "Mobile",
        }
    }
}

pub const NAV_PANEL_ID: &str = "navbarNav";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAnchors {
    pub lightbox: bool,
    pub lightbox_close: bool,
    pub gallery: bool,
    pub hero: bool,
    pub slider_desktop: bool,
    pub slider_mobile: bool,
    pub location_menus: bool,
    pub year_menus: bool,
    pub apply_desktop: bool,
    pub apply_mobile: bool,
    pub nav_panel: bool,
    pub map: bool,
}

impl PageAnchors {
    pub fn all() -> Self {
        Self {
            lightbox: true,
            lightbox_close: true,
            gallery: true,
            hero: true,
            slider_desktop: true,
            slider_mobile: true,
            location_menus: true,
            year_menus: true,
            apply_desktop: true,
            apply_mobile: true,
            nav_panel: true,
            map: true,
        }
    }

    /// Scan page markup for the ids and classes the features hook into.
    ///
    /// The binary feeds this the shell it serves itself, which carries every
    /// anchor, so there all features end up wired. Markup without some of the
    /// elements (a trimmed template, an embedding page) switches the matching
    /// features off.
    pub fn detect(html: &str) -> Self {
        let ids = attribute_tokens(html, "id");
        let classes = attribute_tokens(html, "class");
        let id = |name: &str| ids.contains(name);

        let anchors = Self {
            lightbox: id("lightbox"),
            lightbox_close: classes.contains("lightbox-close"),
            gallery: classes.contains("gallery"),
            hero: classes.contains("hero-section"),
            slider_desktop: id("columnSliderDesktop"),
            slider_mobile: id("columnSliderMobile"),
            location_menus: id("locationMenuDesktop") || id("locationMenuMobile"),
            year_menus: id("yearMenuDesktop") || id("yearMenuMobile"),
            apply_desktop: id("applyFiltersDesktop"),
            apply_mobile: id("applyFiltersMobile"),
            nav_panel: id(NAV_PANEL_ID),
            map: id("map"),
        };

        if anchors != Self::all() {
            tracing::warn!(?anchors, "page is missing anchors, some features are disabled");
        }
        anchors
    }

    pub fn slider(&self, view: ControlView) -> bool {
        match view {
            ControlView::Desktop => self.slider_desktop,
            ControlView::Mobile => self.slider_mobile,
        }
    }

    pub fn apply_button(&self, view: ControlView) -> bool {
        match view {
            ControlView::Desktop => self.apply_desktop,
            ControlView::Mobile => self.apply_mobile,
        }
    }
}

impl Default for PageAnchors {
    fn default() -> Self {
        Self::all()
    }
}

/// Every whitespace-separated token found in `attr="..."` values.
fn attribute_tokens(html: &str, attr: &str) -> HashSet<String> {
    let needle = format!(" {}=\"", attr);
    let mut tokens = HashSet::new();
    let mut rest = html;

    while let Some(start) = rest.find(&needle) {
        rest = &rest[start + needle.len()..];
        let Some(end) = rest.find('"') else {
            break;
        };
        tokens.extend(rest[..end].split_whitespace().map(str::to_string));
        rest = &rest[end..];
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_full_page() {
        let html = crate::html_template::page_shell_for_detection();
        assert_eq!(PageAnchors::detect(&html), PageAnchors::all());
    }

    #[test]
    fn test_missing_anchor_disables_only_that_feature() {
        let html = r#"<div class="container gallery" id="gallery-root"></div>
            <input type="range" id="columnSliderMobile" min="1" max="5">
            <div id="map"></div>"#;
        let anchors = PageAnchors::detect(html);
        assert!(anchors.gallery);
        assert!(anchors.map);
        assert!(anchors.slider(ControlView::Mobile));
        assert!(!anchors.slider(ControlView::Desktop));
        assert!(!anchors.lightbox);
        assert!(!anchors.apply_button(ControlView::Desktop));
    }

    #[test]
    fn test_attribute_tokens_split_classes() {
        let tokens = attribute_tokens(r#"<a class="dropdown-item active" href="x">"#, "class");
        assert!(tokens.contains("dropdown-item"));
        assert!(tokens.contains("active"));
    }
}
