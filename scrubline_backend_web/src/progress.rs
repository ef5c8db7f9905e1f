// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Proportional progress bar.

use alloc::format;
use alloc::string::String;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

use scrubline_core::progress::ProgressIndicator;

const TRACK_CSS: &str = "position:absolute;left:0;right:0;bottom:0;height:3px;\
                         background:rgba(255,255,255,0.15);pointer-events:none;";
const FILL_CSS: &str = "height:100%;width:0%;background:#fff;";

/// A track element with a fill whose width follows a [`ProgressIndicator`].
#[derive(Debug)]
pub struct ProgressBar {
    track: HtmlElement,
    fill: HtmlElement,
    shown: Option<ProgressIndicator>,
}

impl ProgressBar {
    /// Creates the bar and appends it to `parent`.
    pub fn mount(document: &Document, parent: &HtmlElement) -> Result<Self, JsValue> {
        let track: HtmlElement = document.create_element("div")?.dyn_into()?;
        track.style().set_css_text(TRACK_CSS);
        track.set_attribute("role", "progressbar")?;
        track.set_attribute("aria-valuemin", "0")?;
        track.set_attribute("aria-valuemax", "100")?;
        let fill: HtmlElement = document.create_element("div")?.dyn_into()?;
        fill.style().set_css_text(FILL_CSS);
        track.append_child(&fill)?;
        parent.append_child(&track)?;
        Ok(Self {
            track,
            fill,
            shown: None,
        })
    }

    /// Updates the fill. Unchanged values touch no styles.
    pub fn show(&mut self, progress: ProgressIndicator) {
        if self.shown == Some(progress) {
            return;
        }
        self.shown = Some(progress);
        let _ = self.fill.style().set_property("width", &fill_width(progress));
        let _ = self
            .track
            .set_attribute("aria-valuenow", &format!("{:.0}", progress.percent()));
    }

    /// Removes the bar from the page.
    pub fn remove(self) {
        self.track.remove();
    }
}

fn fill_width(progress: ProgressIndicator) -> String {
    format!("{:.2}%", progress.percent())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_width_is_a_percentage() {
        assert_eq!(fill_width(ProgressIndicator::from_fraction(0.5)), "50.00%");
        assert_eq!(fill_width(ProgressIndicator::from_fraction(2.0)), "100.00%");
        assert_eq!(fill_width(ProgressIndicator::default()), "0.00%");
    }
}
