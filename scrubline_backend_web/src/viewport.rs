// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window geometry reads.

use web_sys::Window;

use scrubline_core::sampler::ScrollMetrics;

/// Reads the document's scroll geometry.
///
/// Returns `None` when the window has no document or reports non-numeric
/// sizes, which happens for detached frames.
#[must_use]
pub fn scroll_metrics(window: &Window) -> Option<ScrollMetrics> {
    let root = window.document()?.document_element()?;
    Some(ScrollMetrics {
        scroll_top: window.scroll_y().ok()?,
        scroll_height: f64::from(root.scroll_height()),
        viewport_height: window.inner_height().ok()?.as_f64()?,
    })
}

/// Reads the viewport size in CSS pixels.
#[must_use]
pub fn viewport_size(window: &Window) -> Option<(u32, u32)> {
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some((css_px(width), css_px(height)))
}

fn css_px(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "viewport sizes are far below u32::MAX"
    )]
    let px = value.round() as u32;
    px
}
