// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in milliseconds of host time.

use std::io::Write;

use scrubline_core::time::HostTime;
use scrubline_core::trace::{
    AnimationEvent, CandidateFailedEvent, CandidateOpenEvent, MediaReadyEvent, ProfileChangeEvent,
    RefreshEstimateEvent, SampleEvent, SeekEvent, SeekReason, StateChangeEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    label: &'static str,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            label: "",
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer, label: "" }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer, label: "" }
    }

    /// Prefixes every line with `label`, to tell several surfaces apart.
    #[must_use]
    pub fn labeled(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line(&mut self, at: HostTime, tag: &str, body: std::fmt::Arguments<'_>) {
        let sep = if self.label.is_empty() { "" } else { " " };
        let _ = writeln!(
            self.writer,
            "{}{sep}[{tag}] {:.3}ms {body}",
            self.label,
            at.as_millis_f64(),
        );
    }
}

fn reason_name(reason: SeekReason) -> &'static str {
    match reason {
        SeekReason::Direct => "direct",
        SeekReason::Smoothed => "smoothed",
        SeekReason::Freeze => "freeze",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_profile_change(&mut self, e: &ProfileChangeEvent) {
        self.line(
            e.at,
            "profile",
            format_args!("{}x{} class={}", e.width, e.height, e.class),
        );
    }

    fn on_state_change(&mut self, e: &StateChangeEvent) {
        self.line(e.at, "state", format_args!("{} -> {}", e.from, e.to));
    }

    fn on_candidate_open(&mut self, e: &CandidateOpenEvent) {
        self.line(
            e.at,
            "open",
            format_args!(
                "load={} #{} {} ({})",
                e.load.0,
                e.index,
                e.reference,
                e.role.as_str()
            ),
        );
    }

    fn on_candidate_failed(&mut self, e: &CandidateFailedEvent) {
        self.line(
            e.at,
            "failed",
            format_args!("load={} #{} {}", e.load.0, e.index, e.error),
        );
    }

    fn on_media_ready(&mut self, e: &MediaReadyEvent) {
        self.line(
            e.at,
            "ready",
            format_args!("load={} duration={:.3}s", e.load.0, e.duration),
        );
    }

    fn on_sample(&mut self, e: &SampleEvent) {
        let applied = if e.applied { "applied" } else { "pending" };
        self.line(
            e.at,
            "sample",
            format_args!("progress={:.4} {applied}", e.progress),
        );
    }

    fn on_seek(&mut self, e: &SeekEvent) {
        self.line(
            e.at,
            "seek",
            format_args!(
                "load={} position={:.3}s {}",
                e.load.0,
                e.position,
                reason_name(e.reason)
            ),
        );
    }

    fn on_animation(&mut self, e: &AnimationEvent) {
        let what = if e.running { "start" } else { "stop" };
        self.line(e.at, "animate", format_args!("{what}"));
    }

    fn on_refresh_estimate(&mut self, e: &RefreshEstimateEvent) {
        self.line(
            e.at,
            "refresh",
            format_args!(
                "{:.1}Hz ({} frames in {:.1}ms)",
                e.estimate.hz,
                e.estimate.frames,
                e.estimate.elapsed.as_millis_f64()
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrubline_core::media::LoadId;
    use scrubline_core::timeline::ControllerState;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_seek() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_seek(&SeekEvent {
            at: HostTime(16_500),
            load: LoadId(2),
            position: 2.5,
            reason: SeekReason::Direct,
        });
        let out = output(sink);
        assert!(out.starts_with("[seek] 16.500ms"), "got: {out}");
        assert!(out.contains("position=2.500s direct"), "got: {out}");
    }

    #[test]
    fn labels_prefix_lines() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).labeled("hero");
        sink.on_state_change(&StateChangeEvent {
            at: HostTime(0),
            from: ControllerState::Loading,
            to: ControllerState::Active,
        });
        let out = output(sink);
        assert_eq!(out, "hero [state] 0.000ms loading -> active\n");
    }
}
