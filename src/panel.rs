//! Mobile navigation panel that collapses after filters are applied.

use std::collections::BTreeSet;

/// Something that can be shown and collapsed.
pub trait CollapsiblePanel: Send + Sync {
    fn is_shown(&self) -> bool;
    /// Take over the state the page reports; the user can toggle the panel freely.
    fn set_shown(&mut self, shown: bool);
    fn hide(&mut self);
    /// JS statement that performs the same hide on the page
    fn hide_script(&self) -> String;
}

/// Bootstrap's Collapse component: reuse the instance or create one, then hide.
#[derive(Debug)]
pub struct BootstrapCollapse {
    element_id: String,
    shown: bool,
    has_instance: bool,
}

impl BootstrapCollapse {
    pub fn new(element_id: impl Into<String>, shown: bool) -> Self {
        Self { element_id: element_id.into(), shown, has_instance: false }
    }

    pub fn has_instance(&self) -> bool {
        self.has_instance
    }
}

impl CollapsiblePanel for BootstrapCollapse {
    fn is_shown(&self) -> bool {
        self.shown
    }

    fn set_shown(&mut self, shown: bool) {
        self.shown = shown;
    }

    fn hide(&mut self) {
        self.has_instance = true;
        self.shown = false;
    }

    fn hide_script(&self) -> String {
        format!(
            "(function(){{var el=document.getElementById('{id}');(bootstrap.Collapse.getInstance(el)||new bootstrap.Collapse(el)).hide();}})();",
            id = self.element_id
        )
    }
}

/// Fallback when the framework is missing: drop the `show` class by hand.
#[derive(Debug)]
pub struct ClassTogglePanel {
    element_id: String,
    classes: BTreeSet<String>,
}

impl ClassTogglePanel {
    pub fn new(element_id: impl Into<String>, shown: bool) -> Self {
        let mut classes = BTreeSet::from(["collapse".to_string(), "navbar-collapse".to_string()]);
        if shown {
            classes.insert("show".to_string());
        }
        Self { element_id: element_id.into(), classes }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }
}

impl CollapsiblePanel for ClassTogglePanel {
    fn is_shown(&self) -> bool {
        self.classes.contains("show")
    }

    fn set_shown(&mut self, shown: bool) {
        if shown {
            self.classes.insert("show".to_string());
        } else {
            self.classes.remove("show");
        }
    }

    fn hide(&mut self) {
        self.classes.remove("show");
    }

    fn hide_script(&self) -> String {
        format!("document.getElementById('{}').classList.remove('show');", self.element_id)
    }
}

/// Pick the framework panel when available, the class toggle otherwise.
pub fn nav_panel(element_id: &str, bootstrap_available: bool, shown: bool) -> Box<dyn CollapsiblePanel> {
    if bootstrap_available {
        Box::new(BootstrapCollapse::new(element_id, shown))
    } else {
        Box::new(ClassTogglePanel::new(element_id, shown))
    }
}

/// Collapse the panel if it is open. Returns the page script to run, if any.
pub fn auto_close(panel: &mut dyn CollapsiblePanel) -> Option<String> {
    if !panel.is_shown() {
        return None;
    }
    panel.hide();
    Some(panel.hide_script())
}
