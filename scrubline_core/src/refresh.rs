// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display refresh-rate estimation.
//!
//! Web hosts expose no refresh interval, so [`RefreshRateEstimator`] counts
//! animation-frame callbacks over a short window after activation and reports
//! a single estimate. The estimate is diagnostic only; nothing in the
//! timeline mapping depends on it.

use crate::time::{Duration, HostTime};

/// A one-off refresh rate measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefreshEstimate {
    /// Estimated refresh rate in Hz.
    pub hz: f64,
    /// Frame callbacks counted after the first one.
    pub frames: u32,
    /// Time covered by the counted frames.
    pub elapsed: Duration,
}

/// Counts frames for a fixed window and reports once.
#[derive(Clone, Debug)]
pub struct RefreshRateEstimator {
    window: Duration,
    started: Option<HostTime>,
    frames: u32,
    done: bool,
}

impl RefreshRateEstimator {
    /// Default measurement window.
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

    /// Creates an estimator measuring over `window`.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            started: None,
            frames: 0,
            done: false,
        }
    }

    /// Feeds one animation-frame timestamp.
    ///
    /// The first frame anchors the window. Returns the estimate on the first
    /// frame at or past the end of the window; every later call returns
    /// `None`.
    pub fn on_frame(&mut self, now: HostTime) -> Option<RefreshEstimate> {
        if self.done {
            return None;
        }
        let Some(start) = self.started else {
            self.started = Some(now);
            return None;
        };
        self.frames = self.frames.saturating_add(1);
        let elapsed = now.saturating_duration_since(start);
        if elapsed < self.window || elapsed == Duration::ZERO {
            return None;
        }
        self.done = true;
        Some(RefreshEstimate {
            hz: f64::from(self.frames) / elapsed.as_secs_f64(),
            frames: self.frames,
            elapsed,
        })
    }

    /// Returns `true` while more frames are wanted.
    #[must_use]
    pub const fn wants_frames(&self) -> bool {
        !self.done
    }
}

impl Default for RefreshRateEstimator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}
