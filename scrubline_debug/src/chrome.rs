// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Candidate loads become duration slices (open to ready or failure), the
//! smoothing loop becomes a slice per run, and scroll progress and media
//! position are exported as counters so they plot as curves.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use scrubline_core::time::HostTime;

use crate::recorder::{RecordedEvent, RecordedFailure, decode};

const TID_LOAD: u32 = 0;
const TID_TIMELINE: u32 = 1;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// `pid` distinguishes surfaces when several recordings are merged.
pub fn export(bytes: &[u8], pid: u32, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut open_load: Option<String> = None;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::ProfileChange(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "ProfileChange",
                    "cat": "Profile",
                    "ts": us(e.at),
                    "pid": pid,
                    "tid": TID_LOAD,
                    "s": "p",
                    "args": {
                        "width": e.width,
                        "height": e.height,
                        "class": e.class.as_str(),
                    }
                }));
            }
            RecordedEvent::StateChange(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("State: {}", e.to),
                    "cat": "Controller",
                    "ts": us(e.at),
                    "pid": pid,
                    "tid": TID_LOAD,
                    "s": "t",
                    "args": {
                        "from": e.from.as_str(),
                        "to": e.to.as_str(),
                    }
                }));
            }
            RecordedEvent::CandidateOpen {
                at,
                load,
                index,
                role,
                reference,
            } => {
                events.push(json!({
                    "ph": "B",
                    "name": &reference,
                    "cat": "Load",
                    "ts": us(at),
                    "pid": pid,
                    "tid": TID_LOAD,
                    "args": {
                        "load": load.0,
                        "index": index,
                        "role": role.as_str(),
                    }
                }));
                open_load = Some(reference);
            }
            RecordedEvent::CandidateFailed {
                at,
                load,
                failure,
                reference,
                ..
            } => {
                let (kind, duration) = match failure {
                    RecordedFailure::AssetLoad => ("asset_load", None),
                    RecordedFailure::InvalidDuration(d) => ("invalid_duration", Some(d)),
                };
                if open_load.take().is_some() {
                    events.push(json!({
                        "ph": "E",
                        "name": reference,
                        "cat": "Load",
                        "ts": us(at),
                        "pid": pid,
                        "tid": TID_LOAD,
                        "args": {
                            "load": load.0,
                            "failed": kind,
                            // Non-finite floats serialize as null.
                            "duration": duration,
                        }
                    }));
                }
            }
            RecordedEvent::MediaReady(e) => {
                if let Some(reference) = open_load.take() {
                    events.push(json!({
                        "ph": "E",
                        "name": reference,
                        "cat": "Load",
                        "ts": us(e.at),
                        "pid": pid,
                        "tid": TID_LOAD,
                        "args": {
                            "load": e.load.0,
                            "duration": e.duration,
                        }
                    }));
                }
            }
            RecordedEvent::Sample(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "progress",
                    "ts": us(e.at),
                    "pid": pid,
                    "args": { "progress": e.progress }
                }));
            }
            RecordedEvent::Seek(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "position",
                    "ts": us(e.at),
                    "pid": pid,
                    "args": { "seconds": e.position }
                }));
            }
            RecordedEvent::Animation(e) => {
                let ph = if e.running { "B" } else { "E" };
                events.push(json!({
                    "ph": ph,
                    "name": "Smoothing",
                    "cat": "Timeline",
                    "ts": us(e.at),
                    "pid": pid,
                    "tid": TID_TIMELINE,
                }));
            }
            RecordedEvent::RefreshEstimate(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "RefreshEstimate",
                    "cat": "Timeline",
                    "ts": us(e.at),
                    "pid": pid,
                    "tid": TID_TIMELINE,
                    "s": "p",
                    "args": {
                        "hz": e.estimate.hz,
                        "frames": e.estimate.frames,
                        "elapsed_ms": e.estimate.elapsed.as_millis_f64(),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn us(t: HostTime) -> u64 {
    t.ticks()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use scrubline_core::media::{LoadId, MediaError};
    use scrubline_core::source::SourceRole;
    use scrubline_core::trace::{
        AnimationEvent, CandidateFailedEvent, CandidateOpenEvent, MediaReadyEvent, SeekEvent,
        SeekReason, TraceSink,
    };

    fn open(rec: &mut RecorderSink, at: u64, load: u32, reference: &'static str) {
        rec.on_candidate_open(&CandidateOpenEvent {
            at: HostTime(at),
            load: LoadId(load),
            index: 0,
            role: SourceRole::Primary,
            reference,
        });
    }

    fn parse(rec: &RecorderSink) -> Vec<Value> {
        let mut out = Vec::new();
        export(rec.as_bytes(), 1, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn load_becomes_a_slice() {
        let mut rec = RecorderSink::new();
        open(&mut rec, 1_000, 1, "/a.mp4");
        rec.on_media_ready(&MediaReadyEvent {
            at: HostTime(41_000),
            load: LoadId(1),
            duration: 12.0,
        });
        rec.on_seek(&SeekEvent {
            at: HostTime(50_000),
            load: LoadId(1),
            position: 3.0,
            reason: SeekReason::Direct,
        });

        let parsed = parse(&rec);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "/a.mp4");
        assert_eq!(parsed[1]["ph"], "E");
        assert_eq!(parsed[1]["ts"], 41_000);
        assert_eq!(parsed[2]["ph"], "C");
        assert_eq!(parsed[2]["args"]["seconds"], 3.0);
    }

    #[test]
    fn failed_load_closes_slice() {
        let mut rec = RecorderSink::new();
        open(&mut rec, 0, 1, "/a.mp4");
        rec.on_candidate_failed(&CandidateFailedEvent {
            at: HostTime(5),
            load: LoadId(1),
            index: 0,
            error: MediaError::AssetLoad { reference: "/a.mp4" },
        });
        // A stray failure with no open slice adds nothing.
        rec.on_candidate_failed(&CandidateFailedEvent {
            at: HostTime(6),
            load: LoadId(1),
            index: 0,
            error: MediaError::AssetLoad { reference: "/a.mp4" },
        });
        rec.on_animation(&AnimationEvent {
            at: HostTime(7),
            running: true,
        });

        let parsed = parse(&rec);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1]["ph"], "E");
        assert_eq!(parsed[1]["args"]["failed"], "asset_load");
        assert_eq!(parsed[2]["name"], "Smoothing");
        assert_eq!(parsed[2]["tid"], TID_TIMELINE);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], 0, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
