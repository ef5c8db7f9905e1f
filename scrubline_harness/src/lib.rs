// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated hosts and scrub-quality metrics for scrubline.
//!
//! - [`sim::SimHost`] stands in for the browser's `<video>` elements with
//!   scripted load outcomes and a full write log.
//! - [`scenario::Scenario`] drives a controller with a manual frame clock and
//!   a scripted scroll position, wiring the sampler, profile tracker and
//!   refresh estimator the same way the web backend does.
//! - [`ScrubTracker`] grades how closely the displayed frame follows scroll.

#![no_std]

extern crate alloc;

pub mod scenario;
pub mod sim;

use alloc::string::String;

/// Per-frame metrics sample fed into [`ScrubTracker::observe`].
#[derive(Clone, Copy, Debug)]
pub struct ScrubSample {
    /// Position implied by scroll, in seconds.
    pub target_s: f64,
    /// Position currently shown, in seconds.
    pub displayed_s: f64,
    /// Position writes issued during this frame.
    pub seeks: u32,
    /// Frame delta in milliseconds.
    pub frame_delta_ms: f64,
}

/// Letter grade for scrub quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrubGrade {
    /// Picture tracks scroll within a couple of frames.
    A,
    /// Noticeable but smooth lag.
    B,
    /// Sluggish.
    C,
    /// Detached from scroll, or redundant writes.
    D,
}

impl ScrubGrade {
    /// Returns a short label for HUD rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Aggregated report returned by [`ScrubTracker::observe`].
#[derive(Clone, Copy, Debug)]
pub struct ScrubReport {
    /// Current grade.
    pub grade: ScrubGrade,
    /// Current frame's absolute lag between target and display, in ms of
    /// media time.
    pub lag_ms: f64,
    /// Total frames observed.
    pub total_frames: u64,
    /// Total position writes observed.
    pub total_seeks: u64,
    /// Frames that issued more than one write.
    pub redundant_frames: u64,
}

/// Rolling scrub tracker with fixed-size lag history.
#[derive(Debug)]
pub struct ScrubTracker<const N: usize> {
    lags_ms: [f64; N],
    cursor: usize,
    total_frames: u64,
    total_seeks: u64,
    redundant_frames: u64,
}

impl<const N: usize> Default for ScrubTracker<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ScrubTracker<N> {
    /// Creates an empty tracker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lags_ms: [0.0; N],
            cursor: 0,
            total_frames: 0,
            total_seeks: 0,
            redundant_frames: 0,
        }
    }

    /// Observes one frame and returns an updated report.
    #[must_use]
    pub fn observe(&mut self, sample: ScrubSample) -> ScrubReport {
        let lag_ms = (sample.target_s - sample.displayed_s).abs() * 1000.0;
        self.total_frames = self.total_frames.saturating_add(1);
        self.total_seeks = self.total_seeks.saturating_add(u64::from(sample.seeks));
        if sample.seeks > 1 {
            self.redundant_frames = self.redundant_frames.saturating_add(1);
        }
        if N > 0 {
            self.lags_ms[self.cursor % N] = lag_ms;
            self.cursor = (self.cursor + 1) % N;
        }

        ScrubReport {
            grade: grade_for(lag_ms, sample.frame_delta_ms, self.redundant_frames),
            lag_ms,
            total_frames: self.total_frames,
            total_seeks: self.total_seeks,
            redundant_frames: self.redundant_frames,
        }
    }

    /// Returns the ring-buffer lags oldest→newest.
    #[must_use]
    pub fn lags(&self) -> [f64; N] {
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.lags_ms[(self.cursor + i) % N];
        }
        out
    }

    /// Returns an ASCII sparkline over [`lags`](Self::lags).
    #[must_use]
    pub fn sparkline_ascii(&self, max_ms: f64) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        let mut out = String::with_capacity(N);
        for lag in self.lags() {
            let t = if max_ms > 0.0 {
                lag.clamp(0.0, max_ms) / max_ms
            } else {
                0.0
            };
            #[expect(
                clippy::cast_possible_truncation,
                reason = "index is clamped to ASCII level count"
            )]
            let level = (t * (LEVELS.len() as f64 - 1.0) + 0.5) as usize;
            out.push(LEVELS[level] as char);
        }
        out
    }
}

/// Lag is measured in media time; a frame's worth of media at the current
/// frame rate is the natural unit.
fn grade_for(lag_ms: f64, frame_delta_ms: f64, redundant_frames: u64) -> ScrubGrade {
    if redundant_frames > 0 {
        return ScrubGrade::D;
    }
    let frame = if frame_delta_ms > 0.0 {
        frame_delta_ms
    } else {
        16.67
    };
    if lag_ms <= 2.0 * frame {
        ScrubGrade::A
    } else if lag_ms <= 6.0 * frame {
        ScrubGrade::B
    } else if lag_ms <= 15.0 * frame {
        ScrubGrade::C
    } else {
        ScrubGrade::D
    }
}
