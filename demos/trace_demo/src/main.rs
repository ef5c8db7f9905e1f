// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated scrub session that exercises the tracing and diagnostics
//! pipeline.
//!
//! Drives the secondary preset through a failed primary, a fallback, a scroll
//! down and back up, and a resize across the compact breakpoint. Events go to
//! both a [`PrettyPrintSink`] on stdout and a [`RecorderSink`], and the
//! recording is exported as a Chrome trace.

use std::fs::File;
use std::io::{BufWriter, Write};

use scrubline_core::config::{ConfigError, TimelineConfig};
use scrubline_core::source::AssetTable;
use scrubline_core::trace::{
    AnimationEvent, CandidateFailedEvent, CandidateOpenEvent, MediaReadyEvent, ProfileChangeEvent,
    RefreshEstimateEvent, SampleEvent, SeekEvent, StateChangeEvent, TraceSink, Tracer,
};
use scrubline_harness::scenario::Scenario;
use scrubline_harness::sim::{LoadOutcome, SimHost};

use scrubline_debug::pretty::PrettyPrintSink;
use scrubline_debug::recorder::RecorderSink;

const MAX_FRAMES: u32 = 240;

/// Forwards every event to a pretty printer and a recorder.
struct Tee<W: Write> {
    pretty: PrettyPrintSink<W>,
    recorder: RecorderSink,
}

macro_rules! tee {
    ($($method:ident($ty:ty)),* $(,)?) => {
        impl<W: Write> TraceSink for Tee<W> {
            $(
                fn $method(&mut self, e: &$ty) {
                    self.pretty.$method(e);
                    self.recorder.$method(e);
                }
            )*
        }
    };
}

tee!(
    on_profile_change(ProfileChangeEvent),
    on_state_change(StateChangeEvent),
    on_candidate_open(CandidateOpenEvent),
    on_candidate_failed(CandidateFailedEvent),
    on_media_ready(MediaReadyEvent),
    on_sample(SampleEvent),
    on_seek(SeekEvent),
    on_animation(AnimationEvent),
    on_refresh_estimate(RefreshEstimateEvent),
);

/// Runs the scripted session and returns the number of position writes.
fn simulate(sink: &mut dyn TraceSink) -> Result<usize, ConfigError> {
    let host = SimHost::new(12.0).with_outcome(AssetTable::SECONDARY.standard, LoadOutcome::Fail);
    let mut s = Scenario::new(TimelineConfig::secondary(), host)?.with_tracer(Tracer::new(sink));

    // The page is already part-way down when the view mounts.
    s.resize(1440, 900);
    s.scroll_progress(0.3);
    s.step();
    s.deliver_reports();

    for progress in [0.35, 0.5, 0.8, 1.0, 0.6, 0.0] {
        s.scroll_progress(progress);
        s.run_until_idle(MAX_FRAMES);
    }

    s.scroll_progress(0.4);
    s.resize(390, 844);
    s.deliver_reports();
    s.run_until_idle(MAX_FRAMES);
    // Long enough for the refresh estimate to report.
    s.run_frames(70);

    s.teardown();
    Ok(s.host().seek_count())
}

fn main() {
    let mut tee = Tee {
        pretty: PrettyPrintSink::with_writer(std::io::stdout()).labeled("section"),
        recorder: RecorderSink::new(),
    };
    let writes = simulate(&mut tee).expect("secondary preset is valid");

    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    scrubline_debug::chrome::export(tee.recorder.as_bytes(), 1, &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({writes} position writes)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrubline_debug::recorder::{RecordedEvent, decode};
    use serde_json::Value;

    fn recorded() -> (Tee<Vec<u8>>, usize) {
        let mut tee = Tee {
            pretty: PrettyPrintSink::with_writer(Vec::new()),
            recorder: RecorderSink::new(),
        };
        let writes = simulate(&mut tee).unwrap();
        (tee, writes)
    }

    #[test]
    fn session_records_fallback_and_teardown() {
        let (tee, writes) = recorded();
        assert!(writes > 0);
        let events: Vec<RecordedEvent> = decode(tee.recorder.as_bytes()).collect();

        let failed = events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::CandidateFailed { .. }))
            .count();
        assert_eq!(failed, 1);
        let refresh = events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::RefreshEstimate(_)))
            .count();
        assert_eq!(refresh, 1);
        assert!(
            events.windows(2).all(|w| w[0].at() <= w[1].at()),
            "events out of order"
        );

        let text = String::from_utf8(tee.pretty.into_inner()).unwrap();
        assert!(text.contains("[seek]"), "{text}");
        assert!(text.contains("disposed"), "{text}");
    }

    #[test]
    fn session_exports_chrome_trace() {
        let (tee, _) = recorded();
        let mut out = Vec::new();
        scrubline_debug::chrome::export(tee.recorder.as_bytes(), 7, &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();

        assert!(parsed.iter().all(|e| e["pid"] == 7));
        let failed_slice = parsed
            .iter()
            .find(|e| e["ph"] == "E" && e["args"]["failed"] == "asset_load")
            .expect("failed load slice");
        assert_eq!(failed_slice["name"], AssetTable::SECONDARY.standard);
        assert!(parsed.iter().any(|e| e["name"] == "Smoothing"));
        assert!(parsed.iter().any(|e| e["name"] == "position"));
    }
}
