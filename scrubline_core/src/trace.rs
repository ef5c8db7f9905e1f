// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the timeline controller.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! controller calls at each transition: profile changes, candidate attempts,
//! readiness, samples, seeks and animation start/stop. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::media::{LoadId, MediaError};
use crate::profile::ScreenClass;
use crate::refresh::RefreshEstimate;
use crate::source::SourceRole;
use crate::time::HostTime;
use crate::timeline::ControllerState;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why the controller wrote a media position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeekReason {
    /// Direct mapping from a scroll sample.
    Direct,
    /// One step of the smoothed animation loop.
    Smoothed,
    /// Top-of-page pin to the first frame.
    Freeze,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the viewport class changes.
#[derive(Clone, Copy, Debug)]
pub struct ProfileChangeEvent {
    /// Host time of the change.
    pub at: HostTime,
    /// Viewport width.
    pub width: u32,
    /// Viewport height.
    pub height: u32,
    /// New class.
    pub class: ScreenClass,
}

/// Emitted on every controller state transition.
#[derive(Clone, Copy, Debug)]
pub struct StateChangeEvent {
    /// Host time of the transition.
    pub at: HostTime,
    /// Previous state.
    pub from: ControllerState,
    /// New state.
    pub to: ControllerState,
}

/// Emitted when a candidate is opened.
#[derive(Clone, Copy, Debug)]
pub struct CandidateOpenEvent {
    /// Host time of the open call.
    pub at: HostTime,
    /// Load id assigned to the attempt.
    pub load: LoadId,
    /// Position of the candidate in its list.
    pub index: u32,
    /// Candidate role.
    pub role: SourceRole,
    /// Media reference.
    pub reference: &'static str,
}

/// Emitted when a candidate fails to load or play.
#[derive(Clone, Copy, Debug)]
pub struct CandidateFailedEvent {
    /// Host time of the failure report.
    pub at: HostTime,
    /// Load id of the failed attempt.
    pub load: LoadId,
    /// Position of the candidate in its list.
    pub index: u32,
    /// The failure.
    pub error: MediaError,
}

/// Emitted when a handle becomes ready.
#[derive(Clone, Copy, Debug)]
pub struct MediaReadyEvent {
    /// Host time of the metadata report.
    pub at: HostTime,
    /// Load id of the ready attempt.
    pub load: LoadId,
    /// Intrinsic duration in seconds.
    pub duration: f64,
}

/// Emitted for every scroll sample the controller receives.
#[derive(Clone, Copy, Debug)]
pub struct SampleEvent {
    /// Sample timestamp.
    pub at: HostTime,
    /// Normalized progress.
    pub progress: f64,
    /// Whether the sample was mapped immediately (`false` while loading).
    pub applied: bool,
}

/// Emitted for every position write.
#[derive(Clone, Copy, Debug)]
pub struct SeekEvent {
    /// Host time of the write.
    pub at: HostTime,
    /// Load id of the handle written to.
    pub load: LoadId,
    /// Position written, in seconds.
    pub position: f64,
    /// Why the write happened.
    pub reason: SeekReason,
}

/// Emitted when the smoothing loop starts or stops.
#[derive(Clone, Copy, Debug)]
pub struct AnimationEvent {
    /// Host time of the change.
    pub at: HostTime,
    /// `true` when the loop starts.
    pub running: bool,
}

/// Emitted once when the refresh estimate is known.
#[derive(Clone, Copy, Debug)]
pub struct RefreshEstimateEvent {
    /// Host time of the report.
    pub at: HostTime,
    /// The estimate.
    pub estimate: RefreshEstimate,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the controller.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when the viewport class changes.
    fn on_profile_change(&mut self, e: &ProfileChangeEvent) {
        _ = e;
    }

    /// Called on every controller state transition.
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        _ = e;
    }

    /// Called when a candidate is opened.
    fn on_candidate_open(&mut self, e: &CandidateOpenEvent) {
        _ = e;
    }

    /// Called when a candidate fails.
    fn on_candidate_failed(&mut self, e: &CandidateFailedEvent) {
        _ = e;
    }

    /// Called when a handle becomes ready.
    fn on_media_ready(&mut self, e: &MediaReadyEvent) {
        _ = e;
    }

    /// Called for each received scroll sample.
    fn on_sample(&mut self, e: &SampleEvent) {
        _ = e;
    }

    /// Called for each position write.
    fn on_seek(&mut self, e: &SeekEvent) {
        _ = e;
    }

    /// Called when the smoothing loop starts or stops.
    fn on_animation(&mut self, e: &AnimationEvent) {
        _ = e;
    }

    /// Called once with the refresh estimate.
    fn on_refresh_estimate(&mut self, e: &RefreshEstimateEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$doc:meta])* $name:ident => $method:ident($ty:ty)) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$ty) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    dispatch!(
        /// Emits a [`ProfileChangeEvent`].
        profile_change => on_profile_change(ProfileChangeEvent)
    );
    dispatch!(
        /// Emits a [`StateChangeEvent`].
        state_change => on_state_change(StateChangeEvent)
    );
    dispatch!(
        /// Emits a [`CandidateOpenEvent`].
        candidate_open => on_candidate_open(CandidateOpenEvent)
    );
    dispatch!(
        /// Emits a [`CandidateFailedEvent`].
        candidate_failed => on_candidate_failed(CandidateFailedEvent)
    );
    dispatch!(
        /// Emits a [`MediaReadyEvent`].
        media_ready => on_media_ready(MediaReadyEvent)
    );
    dispatch!(
        /// Emits a [`SampleEvent`].
        sample => on_sample(SampleEvent)
    );
    dispatch!(
        /// Emits a [`SeekEvent`].
        seek => on_seek(SeekEvent)
    );
    dispatch!(
        /// Emits an [`AnimationEvent`].
        animation => on_animation(AnimationEvent)
    );
    dispatch!(
        /// Emits a [`RefreshEstimateEvent`].
        refresh_estimate => on_refresh_estimate(RefreshEstimateEvent)
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
