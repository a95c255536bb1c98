//! Gallery column count, shared by the desktop and mobile range controls.
//!
//! The count lives in one `watch` channel. Each control is a binding that
//! observes it, so moving either control updates the other without any
//! manual syncing.

use serde::Serialize;
use tokio::sync::watch;

use crate::page::ControlView;

/// Fill of the slider track, `(value - min) / (max - min) * 100`.
pub fn fill_percentage(value: u32, min: u32, max: u32) -> f64 {
    if max <= min {
        return 0.0;
    }
    (value as f64 - min as f64) / (max as f64 - min as f64) * 100.0
}

pub struct ColumnLayout {
    tx: watch::Sender<u32>,
    min: u32,
    max: u32,
}

impl ColumnLayout {
    pub fn new(initial: u32, min: u32, max: u32) -> Self {
        let (tx, _rx) = watch::channel(initial.clamp(min, max));
        Self { tx, min, max }
    }

    pub fn columns(&self) -> u32 {
        *self.tx.borrow()
    }

    /// Set from either control. Out-of-range input is clamped like the
    /// native range input would.
    pub fn set(&self, value: u32) -> u32 {
        let clamped = value.clamp(self.min, self.max);
        self.tx.send_replace(clamped);
        tracing::debug!(columns = clamped, "column count updated");
        clamped
    }

    pub fn bind(&self, view: ControlView) -> SliderBinding {
        SliderBinding { view, rx: self.tx.subscribe(), min: self.min, max: self.max }
    }

    /// CSS custom property applied to the gallery container.
    pub fn css_variable(&self) -> String {
        format!("--column-count: {}", self.columns())
    }
}

/// One range control observing the shared column count.
pub struct SliderBinding {
    view: ControlView,
    rx: watch::Receiver<u32>,
    min: u32,
    max: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderState {
    pub view: ControlView,
    pub value: u32,
    pub label: String,
    pub min: u32,
    pub max: u32,
    pub fill_percent: f64,
    pub background_size: String,
}

impl SliderBinding {
    pub fn view(&self) -> ControlView {
        self.view
    }

    pub fn value(&self) -> u32 {
        *self.rx.borrow()
    }

    pub fn fill_percentage(&self) -> f64 {
        fill_percentage(self.value(), self.min, self.max)
    }

    pub fn state(&self) -> SliderState {
        let value = self.value();
        let fill = fill_percentage(value, self.min, self.max);
        SliderState {
            view: self.view,
            value,
            label: value.to_string(),
            min: self.min,
            max: self.max,
            fill_percent: fill,
            background_size: format!("{}% 100%", fill),
        }
    }

    /// Wait until the shared count changes. Errors once the layout is dropped.
    pub async fn changed(&mut self) -> Result<u32, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(*self.rx.borrow_and_update())
    }
}
