// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only progress for on-screen indicators.

use crate::config::MappingMode;
use crate::media::MediaHost;
use crate::timeline::TimelineController;

/// A snapshot of how far through the timeline a surface is.
///
/// In direct mode this is the latest scroll progress. In smoothed mode it
/// follows the displayed position, so a progress bar eases along with the
/// picture instead of jumping ahead of it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProgressIndicator {
    fraction: f64,
}

impl ProgressIndicator {
    /// Reads the current progress of `controller`.
    #[must_use]
    pub fn read<H: MediaHost>(controller: &TimelineController<H>) -> Self {
        let smoothed = match controller.config().mode {
            MappingMode::Smoothed { .. } => controller.duration().and_then(|duration| {
                (duration > 0.0).then(|| controller.timeline().smoothed_position / duration)
            }),
            MappingMode::Direct { .. } => None,
        };
        let fraction = smoothed
            .or_else(|| controller.last_progress())
            .unwrap_or(0.0);
        Self::from_fraction(fraction)
    }

    /// Creates an indicator from a raw fraction, clamped to `[0, 1]`.
    #[must_use]
    pub fn from_fraction(fraction: f64) -> Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        Self { fraction }
    }

    /// Progress in `[0, 1]`.
    #[must_use]
    pub const fn fraction(self) -> f64 {
        self.fraction
    }

    /// Progress in `[0, 100]`, for a proportional fill.
    #[must_use]
    pub fn percent(self) -> f64 {
        self.fraction * 100.0
    }
}
