// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace sink that logs to the browser console.

use alloc::format;
use alloc::string::String;

use wasm_bindgen::JsValue;

use scrubline_core::trace::{
    AnimationEvent, CandidateFailedEvent, CandidateOpenEvent, MediaReadyEvent, ProfileChangeEvent,
    RefreshEstimateEvent, SampleEvent, SeekEvent, StateChangeEvent, TraceSink,
};

fn console_log(line: &str) {
    web_sys::console::log_1(&JsValue::from_str(line));
}

/// Writes lifecycle trace events as console lines.
///
/// Per-frame events (samples, seeks and smoothing start/stop) are dropped
/// unless the sink is [`verbose`](Self::verbose).
pub struct ConsoleSink<F: FnMut(&str) = fn(&str)> {
    write: F,
    label: &'static str,
    verbose: bool,
}

impl<F: FnMut(&str)> core::fmt::Debug for ConsoleSink<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("label", &self.label)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl ConsoleSink {
    /// Creates a sink writing to `console.log`, each line prefixed by `label`.
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self::with_writer(label, console_log)
    }
}

impl<F: FnMut(&str)> ConsoleSink<F> {
    /// Creates a sink writing through `write`.
    pub fn with_writer(label: &'static str, write: F) -> Self {
        Self {
            write,
            label,
            verbose: false,
        }
    }

    /// Also logs per-frame events.
    #[must_use]
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    fn emit(&mut self, body: String) {
        let line = format!("[scrubline:{}] {body}", self.label);
        (self.write)(&line);
    }
}

impl<F: FnMut(&str)> TraceSink for ConsoleSink<F> {
    fn on_profile_change(&mut self, e: &ProfileChangeEvent) {
        self.emit(format!("viewport {}x{} -> {}", e.width, e.height, e.class));
    }

    fn on_state_change(&mut self, e: &StateChangeEvent) {
        self.emit(format!("{} -> {}", e.from, e.to));
    }

    fn on_candidate_open(&mut self, e: &CandidateOpenEvent) {
        self.emit(format!(
            "load #{} {} ({}, candidate {})",
            e.load.0,
            e.reference,
            e.role.as_str(),
            e.index
        ));
    }

    fn on_candidate_failed(&mut self, e: &CandidateFailedEvent) {
        self.emit(format!("load #{} failed: {}", e.load.0, e.error));
    }

    fn on_media_ready(&mut self, e: &MediaReadyEvent) {
        self.emit(format!("load #{} ready, {:.2}s", e.load.0, e.duration));
    }

    fn on_sample(&mut self, e: &SampleEvent) {
        if self.verbose {
            let applied = if e.applied { "" } else { " (held)" };
            self.emit(format!("progress {:.4}{applied}", e.progress));
        }
    }

    fn on_seek(&mut self, e: &SeekEvent) {
        if self.verbose {
            self.emit(format!("seek {:.3}s ({:?})", e.position, e.reason));
        }
    }

    fn on_animation(&mut self, e: &AnimationEvent) {
        if self.verbose {
            let what = if e.running { "start" } else { "stop" };
            self.emit(format!("smoothing {what}"));
        }
    }

    fn on_refresh_estimate(&mut self, e: &RefreshEstimateEvent) {
        self.emit(format!(
            "display ~{:.0}Hz ({} frames)",
            e.estimate.hz, e.estimate.frames
        ));
    }
}
