// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll sampling and rate limiting.
//!
//! Scroll events can fire many times per frame during a fast flick. The
//! [`ScrollSampler`] coalesces them: a scroll event only marks a sample as
//! pending and asks the host for one animation frame; the frame callback then
//! reads the scroll surface once and emits a single [`ScrollSample`].
//!
//! ```text
//!   scroll ─► on_scroll() ─► (first pending?) ─► host schedules rAF
//!   scroll ─► on_scroll() ─► already scheduled, nothing to do
//!   rAF    ─► on_frame(now, metrics) ─► Emit | Defer | Skip
//! ```
//!
//! On very high refresh-rate displays a minimum inter-sample interval bounds
//! the work further: a frame that arrives too soon answers
//! [`SampleDecision::Defer`], and the host schedules one more frame so the
//! final resting position is never lost.

use crate::time::{Duration, HostTime};

/// Raw scroll surface geometry, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    /// Current vertical scroll offset.
    pub scroll_top: f64,
    /// Total scrollable document height.
    pub scroll_height: f64,
    /// Visible viewport height.
    pub viewport_height: f64,
}

/// Normalized scroll progress, or `None` when the document cannot scroll.
///
/// `progress = clamp(scroll_top / (scroll_height - viewport_height), 0, 1)`.
/// A document no taller than its viewport has no defined progress; callers
/// must leave the media where it is rather than treat that as zero.
#[must_use]
pub fn progress_of(metrics: &ScrollMetrics) -> Option<f64> {
    let range = metrics.scroll_height - metrics.viewport_height;
    if !range.is_finite() || range <= 0.0 || !metrics.scroll_top.is_finite() {
        return None;
    }
    Some((metrics.scroll_top / range).clamp(0.0, 1.0))
}

/// One normalized scroll observation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollSample {
    /// Scroll progress in `[0, 1]`.
    pub progress: f64,
    /// Host time of the frame that produced the sample.
    pub timestamp: HostTime,
}

/// What a frame callback should do with the pending scroll state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SampleDecision {
    /// Forward this sample.
    Emit(ScrollSample),
    /// Too soon after the previous sample; schedule another frame.
    Defer,
    /// Nothing to deliver.
    Skip,
}

/// Coalesces scroll events into at most one sample per frame.
#[derive(Clone, Debug)]
pub struct ScrollSampler {
    min_interval: Duration,
    pending: bool,
    frame_requested: bool,
    last_emit: Option<HostTime>,
    subscribed: bool,
}

impl ScrollSampler {
    /// Default minimum spacing between samples.
    pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(8);

    /// Creates a subscribed sampler with the given minimum sample spacing.
    #[must_use]
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            pending: false,
            frame_requested: false,
            last_emit: None,
            subscribed: true,
        }
    }

    /// Records a scroll event.
    ///
    /// Returns `true` when the host must schedule an animation frame; at
    /// most one frame is outstanding at a time.
    pub fn on_scroll(&mut self) -> bool {
        if !self.subscribed {
            return false;
        }
        self.pending = true;
        if self.frame_requested {
            return false;
        }
        self.frame_requested = true;
        true
    }

    /// Handles the scheduled animation frame.
    pub fn on_frame(&mut self, now: HostTime, metrics: &ScrollMetrics) -> SampleDecision {
        self.frame_requested = false;
        if !self.subscribed || !self.pending {
            return SampleDecision::Skip;
        }
        if let Some(last) = self.last_emit
            && now.saturating_duration_since(last) < self.min_interval
        {
            self.frame_requested = true;
            return SampleDecision::Defer;
        }
        self.pending = false;
        match progress_of(metrics) {
            Some(progress) => {
                self.last_emit = Some(now);
                SampleDecision::Emit(ScrollSample {
                    progress,
                    timestamp: now,
                })
            }
            None => SampleDecision::Skip,
        }
    }

    /// Returns `true` while a frame has been requested and not yet handled.
    #[must_use]
    pub const fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    /// Returns `false` after [`unsubscribe`](Self::unsubscribe).
    #[must_use]
    pub const fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Stops sampling. Pending state is dropped synchronously and every later
    /// call is a no-op.
    pub fn unsubscribe(&mut self) {
        self.subscribed = false;
        self.pending = false;
        self.frame_requested = false;
    }
}

impl Default for ScrollSampler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_INTERVAL)
    }
}
