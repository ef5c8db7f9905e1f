// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records: a one-byte tag followed by the event
//! fields. Floats are stored as their IEEE-754 bits and media references as
//! `u32`-length-prefixed UTF-8. [`decode`] reads them back as an iterator of
//! [`RecordedEvent`].

use scrubline_core::media::{LoadId, MediaError};
use scrubline_core::profile::ScreenClass;
use scrubline_core::refresh::RefreshEstimate;
use scrubline_core::source::SourceRole;
use scrubline_core::time::{Duration, HostTime};
use scrubline_core::timeline::ControllerState;
use scrubline_core::trace::{
    AnimationEvent, CandidateFailedEvent, CandidateOpenEvent, MediaReadyEvent, ProfileChangeEvent,
    RefreshEstimateEvent, SampleEvent, SeekEvent, SeekReason, StateChangeEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PROFILE_CHANGE: u8 = 1;
const TAG_STATE_CHANGE: u8 = 2;
const TAG_CANDIDATE_OPEN: u8 = 3;
const TAG_CANDIDATE_FAILED: u8 = 4;
const TAG_MEDIA_READY: u8 = 5;
const TAG_SAMPLE: u8 = 6;
const TAG_SEEK: u8 = 7;
const TAG_ANIMATION: u8 = 8;
const TAG_REFRESH_ESTIMATE: u8 = 9;

const FAILURE_ASSET_LOAD: u8 = 0;
const FAILURE_INVALID_DURATION: u8 = 1;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_time(&mut self, t: HostTime) {
        self.write_u64(t.ticks());
    }

    fn write_str(&mut self, s: &str) {
        let len = u32::try_from(s.len()).unwrap_or(u32::MAX);
        self.write_u32(len);
        self.buf.extend_from_slice(&s.as_bytes()[..len as usize]);
    }

    fn write_class(&mut self, c: ScreenClass) {
        self.write_u8(match c {
            ScreenClass::Compact => 0,
            ScreenClass::Standard => 1,
            ScreenClass::HighRes => 2,
        });
    }

    fn write_state(&mut self, s: ControllerState) {
        self.write_u8(match s {
            ControllerState::Idle => 0,
            ControllerState::Loading => 1,
            ControllerState::Active => 2,
            ControllerState::Failed => 3,
            ControllerState::Unavailable => 4,
            ControllerState::Disposed => 5,
        });
    }

    fn write_role(&mut self, r: SourceRole) {
        self.write_u8(match r {
            SourceRole::Primary => 0,
            SourceRole::Fallback => 1,
        });
    }

    fn write_reason(&mut self, r: SeekReason) {
        self.write_u8(match r {
            SeekReason::Direct => 0,
            SeekReason::Smoothed => 1,
            SeekReason::Freeze => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_profile_change(&mut self, e: &ProfileChangeEvent) {
        self.write_u8(TAG_PROFILE_CHANGE);
        self.write_time(e.at);
        self.write_u32(e.width);
        self.write_u32(e.height);
        self.write_class(e.class);
    }

    fn on_state_change(&mut self, e: &StateChangeEvent) {
        self.write_u8(TAG_STATE_CHANGE);
        self.write_time(e.at);
        self.write_state(e.from);
        self.write_state(e.to);
    }

    fn on_candidate_open(&mut self, e: &CandidateOpenEvent) {
        self.write_u8(TAG_CANDIDATE_OPEN);
        self.write_time(e.at);
        self.write_u32(e.load.0);
        self.write_u32(e.index);
        self.write_role(e.role);
        self.write_str(e.reference);
    }

    fn on_candidate_failed(&mut self, e: &CandidateFailedEvent) {
        self.write_u8(TAG_CANDIDATE_FAILED);
        self.write_time(e.at);
        self.write_u32(e.load.0);
        self.write_u32(e.index);
        match e.error {
            MediaError::AssetLoad { reference } => {
                self.write_u8(FAILURE_ASSET_LOAD);
                self.write_f64(0.0);
                self.write_str(reference);
            }
            MediaError::InvalidDuration {
                reference,
                duration,
            } => {
                self.write_u8(FAILURE_INVALID_DURATION);
                self.write_f64(duration);
                self.write_str(reference);
            }
        }
    }

    fn on_media_ready(&mut self, e: &MediaReadyEvent) {
        self.write_u8(TAG_MEDIA_READY);
        self.write_time(e.at);
        self.write_u32(e.load.0);
        self.write_f64(e.duration);
    }

    fn on_sample(&mut self, e: &SampleEvent) {
        self.write_u8(TAG_SAMPLE);
        self.write_time(e.at);
        self.write_f64(e.progress);
        self.write_u8(u8::from(e.applied));
    }

    fn on_seek(&mut self, e: &SeekEvent) {
        self.write_u8(TAG_SEEK);
        self.write_time(e.at);
        self.write_u32(e.load.0);
        self.write_f64(e.position);
        self.write_reason(e.reason);
    }

    fn on_animation(&mut self, e: &AnimationEvent) {
        self.write_u8(TAG_ANIMATION);
        self.write_time(e.at);
        self.write_u8(u8::from(e.running));
    }

    fn on_refresh_estimate(&mut self, e: &RefreshEstimateEvent) {
        self.write_u8(TAG_REFRESH_ESTIMATE);
        self.write_time(e.at);
        self.write_f64(e.estimate.hz);
        self.write_u32(e.estimate.frames);
        self.write_u64(e.estimate.elapsed.ticks());
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Why a recorded candidate failed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordedFailure {
    /// The asset could not be fetched or decoded.
    AssetLoad,
    /// The asset reported an unusable duration.
    InvalidDuration(f64),
}

/// A decoded event from a binary recording.
///
/// Events that carry a media reference own it as a `String`; the rest reuse
/// the trace event types directly.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`ProfileChangeEvent`].
    ProfileChange(ProfileChangeEvent),
    /// A [`StateChangeEvent`].
    StateChange(StateChangeEvent),
    /// A [`CandidateOpenEvent`].
    CandidateOpen {
        /// Host time of the open call.
        at: HostTime,
        /// Load id of the attempt.
        load: LoadId,
        /// Position in the candidate list.
        index: u32,
        /// Candidate role.
        role: SourceRole,
        /// Media reference.
        reference: String,
    },
    /// A [`CandidateFailedEvent`].
    CandidateFailed {
        /// Host time of the failure report.
        at: HostTime,
        /// Load id of the attempt.
        load: LoadId,
        /// Position in the candidate list.
        index: u32,
        /// Failure kind.
        failure: RecordedFailure,
        /// Media reference.
        reference: String,
    },
    /// A [`MediaReadyEvent`].
    MediaReady(MediaReadyEvent),
    /// A [`SampleEvent`].
    Sample(SampleEvent),
    /// A [`SeekEvent`].
    Seek(SeekEvent),
    /// An [`AnimationEvent`].
    Animation(AnimationEvent),
    /// A [`RefreshEstimateEvent`].
    RefreshEstimate(RefreshEstimateEvent),
}

impl RecordedEvent {
    /// Returns the host time of the event.
    #[must_use]
    pub fn at(&self) -> HostTime {
        match self {
            Self::ProfileChange(e) => e.at,
            Self::StateChange(e) => e.at,
            Self::CandidateOpen { at, .. } | Self::CandidateFailed { at, .. } => *at,
            Self::MediaReady(e) => e.at,
            Self::Sample(e) => e.at,
            Self::Seek(e) => e.at,
            Self::Animation(e) => e.at,
            Self::RefreshEstimate(e) => e.at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
///
/// Stops at the first unknown tag or truncated record.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take(&mut self, n: usize) -> Option<&[u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.take(4)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.take(8)?.try_into().ok()?))
    }

    fn read_f64(&mut self) -> Option<f64> {
        Some(f64::from_bits(self.read_u64()?))
    }

    fn read_time(&mut self) -> Option<HostTime> {
        Some(HostTime(self.read_u64()?))
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_string(&mut self) -> Option<String> {
        let len = usize::try_from(self.read_u32()?).ok()?;
        let bytes = self.take(len)?;
        Some(String::from_utf8_lossy(bytes).into_owned())
    }

    fn read_class(&mut self) -> Option<ScreenClass> {
        Some(match self.read_u8()? {
            0 => ScreenClass::Compact,
            1 => ScreenClass::Standard,
            _ => ScreenClass::HighRes,
        })
    }

    fn read_state(&mut self) -> Option<ControllerState> {
        Some(match self.read_u8()? {
            0 => ControllerState::Idle,
            1 => ControllerState::Loading,
            2 => ControllerState::Active,
            3 => ControllerState::Failed,
            4 => ControllerState::Unavailable,
            _ => ControllerState::Disposed,
        })
    }

    fn read_role(&mut self) -> Option<SourceRole> {
        Some(match self.read_u8()? {
            0 => SourceRole::Primary,
            _ => SourceRole::Fallback,
        })
    }

    fn read_reason(&mut self) -> Option<SeekReason> {
        Some(match self.read_u8()? {
            0 => SeekReason::Direct,
            1 => SeekReason::Smoothed,
            _ => SeekReason::Freeze,
        })
    }

    fn decode_profile_change(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ProfileChange(ProfileChangeEvent {
            at: self.read_time()?,
            width: self.read_u32()?,
            height: self.read_u32()?,
            class: self.read_class()?,
        }))
    }

    fn decode_state_change(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::StateChange(StateChangeEvent {
            at: self.read_time()?,
            from: self.read_state()?,
            to: self.read_state()?,
        }))
    }

    fn decode_candidate_open(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CandidateOpen {
            at: self.read_time()?,
            load: LoadId(self.read_u32()?),
            index: self.read_u32()?,
            role: self.read_role()?,
            reference: self.read_string()?,
        })
    }

    fn decode_candidate_failed(&mut self) -> Option<RecordedEvent> {
        let at = self.read_time()?;
        let load = LoadId(self.read_u32()?);
        let index = self.read_u32()?;
        let kind = self.read_u8()?;
        let duration = self.read_f64()?;
        let failure = match kind {
            FAILURE_INVALID_DURATION => RecordedFailure::InvalidDuration(duration),
            _ => RecordedFailure::AssetLoad,
        };
        Some(RecordedEvent::CandidateFailed {
            at,
            load,
            index,
            failure,
            reference: self.read_string()?,
        })
    }

    fn decode_media_ready(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::MediaReady(MediaReadyEvent {
            at: self.read_time()?,
            load: LoadId(self.read_u32()?),
            duration: self.read_f64()?,
        }))
    }

    fn decode_sample(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Sample(SampleEvent {
            at: self.read_time()?,
            progress: self.read_f64()?,
            applied: self.read_bool()?,
        }))
    }

    fn decode_seek(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Seek(SeekEvent {
            at: self.read_time()?,
            load: LoadId(self.read_u32()?),
            position: self.read_f64()?,
            reason: self.read_reason()?,
        }))
    }

    fn decode_animation(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Animation(AnimationEvent {
            at: self.read_time()?,
            running: self.read_bool()?,
        }))
    }

    fn decode_refresh_estimate(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::RefreshEstimate(RefreshEstimateEvent {
            at: self.read_time()?,
            estimate: RefreshEstimate {
                hz: self.read_f64()?,
                frames: self.read_u32()?,
                elapsed: Duration(self.read_u64()?),
            },
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_PROFILE_CHANGE => self.decode_profile_change(),
            TAG_STATE_CHANGE => self.decode_state_change(),
            TAG_CANDIDATE_OPEN => self.decode_candidate_open(),
            TAG_CANDIDATE_FAILED => self.decode_candidate_failed(),
            TAG_MEDIA_READY => self.decode_media_ready(),
            TAG_SAMPLE => self.decode_sample(),
            TAG_SEEK => self.decode_seek(),
            TAG_ANIMATION => self.decode_animation(),
            TAG_REFRESH_ESTIMATE => self.decode_refresh_estimate(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
