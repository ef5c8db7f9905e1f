// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scroll-to-media timeline state machine.
//!
//! [`TimelineController`] owns one surface's media: it picks candidates for
//! the current screen profile, opens them one at a time through a
//! [`MediaHost`], falls back on failure, and once a handle is ready maps
//! normalized scroll progress onto the media duration.
//!
//! ```text
//!   Idle ──set_profile──► Loading ──ready──► Active
//!                          ▲   │              │
//!                          │   └─error─► Failed ◄─error─┘
//!                          │               │
//!                          └──next cand.───┤
//!                                          └─exhausted─► Unavailable
//!
//!   any ──dispose──► Disposed
//! ```
//!
//! `Failed` is transient: it is reported and immediately followed by
//! `Loading` for the next candidate or `Unavailable`. A screen class change
//! restarts from `Idle` in every state but `Disposed`.
//!
//! # Mapping
//!
//! In [`MappingMode::Direct`] each sample seeks straight to
//! `progress * duration` when that differs from the current position by more
//! than the threshold. In [`MappingMode::Smoothed`] samples only move the
//! target; the host runs an animation loop while [`FrameRequest::Animate`]
//! is returned and calls [`on_frame`](TimelineController::on_frame) each
//! frame until the loop converges and reports [`FrameRequest::Idle`].
//!
//! In both modes a progress at or below `top_snap` pins the media to exactly
//! `0.0`. The controller never starts playback.

use core::fmt;

use crate::config::{ConfigError, MappingMode, TimelineConfig};
use crate::media::{LoadId, MediaError, MediaHandle, MediaHost, ReadyState};
use crate::profile::{ScreenClass, ScreenProfile};
use crate::sampler::ScrollSample;
use crate::source::{CandidateCursor, SourceCandidate, select_sources};
use crate::time::HostTime;
use crate::trace::{
    AnimationEvent, CandidateFailedEvent, CandidateOpenEvent, MediaReadyEvent,
    ProfileChangeEvent, SampleEvent, SeekEvent, SeekReason, StateChangeEvent, Tracer,
};

/// Lifecycle state of a [`TimelineController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControllerState {
    /// No profile yet.
    Idle,
    /// A candidate is loading.
    Loading,
    /// Media ready; scroll drives the position.
    Active,
    /// The current candidate failed (transient).
    Failed,
    /// Every candidate for the current profile failed.
    Unavailable,
    /// Torn down; no further side effects.
    Disposed,
}

impl ControllerState {
    /// Returns a short label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Active => "active",
            Self::Failed => "failed",
            Self::Unavailable => "unavailable",
            Self::Disposed => "disposed",
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the host's animation loop should be running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameRequest {
    /// No per-frame work; the loop may stop.
    Idle,
    /// Keep (or start) calling [`TimelineController::on_frame`].
    Animate,
}

/// Target and displayed media positions, in seconds.
///
/// `is_animating` is `true` iff `|target_position - smoothed_position|`
/// exceeds the configured epsilon.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimelineState {
    /// Position implied by the latest sample.
    pub target_position: f64,
    /// Position currently shown.
    pub smoothed_position: f64,
    /// Whether the smoothing loop is running.
    pub is_animating: bool,
}

/// Drives one media surface from scroll progress.
pub struct TimelineController<H: MediaHost> {
    config: TimelineConfig,
    host: H,
    state: ControllerState,
    class: Option<ScreenClass>,
    profile: Option<ScreenProfile>,
    cursor: CandidateCursor,
    current: Option<(usize, SourceCandidate)>,
    handle: Option<MediaHandle<H::Transport>>,
    next_load: LoadId,
    timeline: TimelineState,
    pinned_at_start: bool,
    last_progress: Option<f64>,
    pending_progress: Option<f64>,
}

impl<H: MediaHost> fmt::Debug for TimelineController<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineController")
            .field("state", &self.state)
            .field("class", &self.class)
            .field("current", &self.current)
            .field("handle", &self.handle)
            .field("timeline", &self.timeline)
            .field("last_progress", &self.last_progress)
            .finish_non_exhaustive()
    }
}

impl<H: MediaHost> TimelineController<H> {
    /// Creates an idle controller.
    pub fn new(config: TimelineConfig, host: H) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            host,
            state: ControllerState::Idle,
            class: None,
            profile: None,
            cursor: CandidateCursor::default(),
            current: None,
            handle: None,
            next_load: LoadId(1),
            timeline: TimelineState::default(),
            pinned_at_start: false,
            last_progress: None,
            pending_progress: None,
        })
    }

    // -- accessors --------------------------------------------------------

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ControllerState {
        self.state
    }

    /// Returns the position bookkeeping.
    #[must_use]
    pub const fn timeline(&self) -> TimelineState {
        self.timeline
    }

    /// Returns the most recent profile that triggered source selection.
    #[must_use]
    pub const fn profile(&self) -> Option<ScreenProfile> {
        self.profile
    }

    /// Returns the candidate currently loading or playing.
    #[must_use]
    pub fn current_candidate(&self) -> Option<SourceCandidate> {
        self.current.map(|(_, c)| c)
    }

    /// Returns the active load id, if a handle exists.
    #[must_use]
    pub fn current_load(&self) -> Option<LoadId> {
        self.handle.as_ref().map(MediaHandle::load_id)
    }

    /// Returns the media duration once ready.
    #[must_use]
    pub fn duration(&self) -> Option<f64> {
        self.handle.as_ref().and_then(MediaHandle::duration)
    }

    /// Returns the last position written to the media, once ready.
    #[must_use]
    pub fn position(&self) -> Option<f64> {
        let handle = self.handle.as_ref()?;
        (handle.ready_state() == ReadyState::Ready).then(|| handle.position())
    }

    /// Returns the progress of the latest scroll sample.
    #[must_use]
    pub const fn last_progress(&self) -> Option<f64> {
        self.last_progress
    }

    /// Returns the media host.
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Returns the media host mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // -- inputs -----------------------------------------------------------

    /// Applies a viewport profile.
    ///
    /// Only the first profile and later class changes have an effect: the
    /// current handle is disposed, candidates are re-selected and the first
    /// one is opened.
    pub fn set_profile(&mut self, now: HostTime, profile: ScreenProfile, tracer: &mut Tracer<'_>) {
        if self.state == ControllerState::Disposed {
            return;
        }
        let class = profile.class();
        if self.class == Some(class) {
            return;
        }
        tracer.profile_change(&ProfileChangeEvent {
            at: now,
            width: profile.width,
            height: profile.height,
            class,
        });
        self.class = Some(class);
        self.profile = Some(profile);
        self.release_handle(now, tracer);
        self.set_state(now, ControllerState::Idle, tracer);
        self.cursor = CandidateCursor::new(select_sources(&profile, &self.config.assets));
        self.open_next(now, tracer);
    }

    /// Applies the host's metadata report for `load`.
    ///
    /// Reports for any load other than the one in flight are ignored.
    pub fn on_media_ready(
        &mut self,
        now: HostTime,
        load: LoadId,
        duration: f64,
        tracer: &mut Tracer<'_>,
    ) -> FrameRequest {
        if self.state != ControllerState::Loading {
            return FrameRequest::Idle;
        }
        let Some(handle) = self.handle.as_mut().filter(|h| h.load_id() == load) else {
            return FrameRequest::Idle;
        };
        match handle.mark_ready(duration) {
            Ok(Some(duration)) => {
                tracer.media_ready(&MediaReadyEvent {
                    at: now,
                    load,
                    duration,
                });
                self.timeline = TimelineState::default();
                self.pinned_at_start = false;
                self.set_state(now, ControllerState::Active, tracer);
                match self.pending_progress.take() {
                    Some(progress) => {
                        // A fresh handle jumps straight to where the page
                        // already is; smoothing only follows scroll.
                        self.timeline.smoothed_position = progress * duration;
                        self.apply_progress(now, progress, tracer)
                    }
                    None => FrameRequest::Idle,
                }
            }
            Ok(None) => FrameRequest::Idle,
            Err(error) => {
                self.fail_current(now, error, tracer);
                FrameRequest::Idle
            }
        }
    }

    /// Applies the host's error report for `load`.
    ///
    /// Advances to the next candidate, or to `Unavailable` when none remain.
    pub fn on_media_error(&mut self, now: HostTime, load: LoadId, tracer: &mut Tracer<'_>) {
        if !matches!(
            self.state,
            ControllerState::Loading | ControllerState::Active
        ) {
            return;
        }
        let Some(handle) = self.handle.as_mut().filter(|h| h.load_id() == load) else {
            return;
        };
        if let Some(error) = handle.mark_failed() {
            self.fail_current(now, error, tracer);
        }
    }

    /// Applies one scroll sample. Latest sample wins; nothing is queued.
    pub fn on_sample(&mut self, sample: ScrollSample, tracer: &mut Tracer<'_>) -> FrameRequest {
        if self.state == ControllerState::Disposed {
            return FrameRequest::Idle;
        }
        let progress = sample.progress.clamp(0.0, 1.0);
        if progress.is_nan() {
            return FrameRequest::Idle;
        }
        self.last_progress = Some(progress);
        let applied = self.state == ControllerState::Active;
        tracer.sample(&SampleEvent {
            at: sample.timestamp,
            progress,
            applied,
        });
        if applied {
            self.apply_progress(sample.timestamp, progress, tracer)
        } else {
            if self.state != ControllerState::Unavailable {
                self.pending_progress = Some(progress);
            }
            FrameRequest::Idle
        }
    }

    /// Advances the smoothing loop by one frame.
    pub fn on_frame(&mut self, now: HostTime, tracer: &mut Tracer<'_>) -> FrameRequest {
        if !self.timeline.is_animating {
            return FrameRequest::Idle;
        }
        let alpha = match self.config.mode {
            MappingMode::Smoothed { alpha } if self.state == ControllerState::Active => alpha,
            _ => {
                self.stop_animation(now, tracer);
                return FrameRequest::Idle;
            }
        };
        let Some(handle) = self.handle.as_mut() else {
            self.stop_animation(now, tracer);
            return FrameRequest::Idle;
        };
        let target = self.timeline.target_position;
        let mut smoothed = self.timeline.smoothed_position;
        smoothed += (target - smoothed) * alpha;

        let written = if (target - smoothed).abs() <= self.config.epsilon {
            smoothed = target;
            if handle.position() == target {
                None
            } else {
                handle.seek_exact(target)
            }
        } else {
            handle.seek_to(smoothed)
        };
        if let Some(position) = written {
            tracer.seek(&SeekEvent {
                at: now,
                load: handle.load_id(),
                position,
                reason: SeekReason::Smoothed,
            });
            self.pinned_at_start = false;
        }
        self.timeline.smoothed_position = smoothed;
        if smoothed == target {
            self.stop_animation(now, tracer);
            FrameRequest::Idle
        } else {
            FrameRequest::Animate
        }
    }

    /// Tears the controller down. Idempotent; afterwards every input is
    /// ignored.
    pub fn dispose(&mut self, now: HostTime, tracer: &mut Tracer<'_>) {
        if self.state == ControllerState::Disposed {
            return;
        }
        self.release_handle(now, tracer);
        self.cursor = CandidateCursor::default();
        self.pending_progress = None;
        self.set_state(now, ControllerState::Disposed, tracer);
    }

    // -- internals --------------------------------------------------------

    fn set_state(&mut self, now: HostTime, to: ControllerState, tracer: &mut Tracer<'_>) {
        if self.state == to {
            return;
        }
        tracer.state_change(&StateChangeEvent {
            at: now,
            from: self.state,
            to,
        });
        self.state = to;
    }

    fn open_next(&mut self, now: HostTime, tracer: &mut Tracer<'_>) {
        let Some((index, candidate)) = self.cursor.advance() else {
            self.current = None;
            self.set_state(now, ControllerState::Unavailable, tracer);
            return;
        };
        let load = self.next_load;
        self.next_load = load.next();
        self.handle = Some(MediaHandle::open(
            &mut self.host,
            candidate.reference,
            load,
            self.config.epsilon,
        ));
        self.current = Some((index, candidate));
        self.pending_progress = self.last_progress;
        tracer.candidate_open(&CandidateOpenEvent {
            at: now,
            load,
            index: index_u32(index),
            role: candidate.role,
            reference: candidate.reference,
        });
        self.set_state(now, ControllerState::Loading, tracer);
    }

    fn fail_current(&mut self, now: HostTime, error: MediaError, tracer: &mut Tracer<'_>) {
        let load = self.current_load().unwrap_or_default();
        let index = self.current.map_or(0, |(i, _)| i);
        tracer.candidate_failed(&CandidateFailedEvent {
            at: now,
            load,
            index: index_u32(index),
            error,
        });
        self.release_handle(now, tracer);
        self.set_state(now, ControllerState::Failed, tracer);
        self.open_next(now, tracer);
    }

    fn release_handle(&mut self, now: HostTime, tracer: &mut Tracer<'_>) {
        if let Some(mut handle) = self.handle.take() {
            handle.dispose();
        }
        self.current = None;
        self.stop_animation(now, tracer);
    }

    fn stop_animation(&mut self, now: HostTime, tracer: &mut Tracer<'_>) {
        if self.timeline.is_animating {
            self.timeline.is_animating = false;
            tracer.animation(&AnimationEvent {
                at: now,
                running: false,
            });
        }
    }

    fn apply_progress(
        &mut self,
        now: HostTime,
        progress: f64,
        tracer: &mut Tracer<'_>,
    ) -> FrameRequest {
        let Some(handle) = self.handle.as_mut() else {
            return FrameRequest::Idle;
        };
        let Some(duration) = handle.duration() else {
            return FrameRequest::Idle;
        };
        let load = handle.load_id();

        if progress <= self.config.top_snap {
            self.timeline.target_position = 0.0;
            self.timeline.smoothed_position = 0.0;
            let pin = !self.pinned_at_start;
            if pin && let Some(position) = handle.seek_exact(0.0) {
                tracer.seek(&SeekEvent {
                    at: now,
                    load,
                    position,
                    reason: SeekReason::Freeze,
                });
            }
            self.pinned_at_start = true;
            self.stop_animation(now, tracer);
            return FrameRequest::Idle;
        }

        let target = progress * duration;
        self.timeline.target_position = target;
        match self.config.mode {
            MappingMode::Direct { threshold } => {
                self.timeline.smoothed_position = target;
                if (target - handle.position()).abs() > threshold
                    && let Some(position) = handle.seek_to(target)
                {
                    tracer.seek(&SeekEvent {
                        at: now,
                        load,
                        position,
                        reason: SeekReason::Direct,
                    });
                    self.pinned_at_start = false;
                }
                FrameRequest::Idle
            }
            MappingMode::Smoothed { .. } => {
                if (target - self.timeline.smoothed_position).abs() <= self.config.epsilon {
                    self.timeline.smoothed_position = target;
                    if handle.position() != target
                        && let Some(position) = handle.seek_exact(target)
                    {
                        tracer.seek(&SeekEvent {
                            at: now,
                            load,
                            position,
                            reason: SeekReason::Smoothed,
                        });
                        self.pinned_at_start = false;
                    }
                    self.stop_animation(now, tracer);
                    return FrameRequest::Idle;
                }
                if !self.timeline.is_animating {
                    self.timeline.is_animating = true;
                    tracer.animation(&AnimationEvent {
                        at: now,
                        running: true,
                    });
                }
                FrameRequest::Animate
            }
        }
    }
}

fn index_u32(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::tests::{MockHost, Op};
    use crate::profile::classify;
    use crate::source::AssetTable;
    use alloc::vec::Vec;

    const TABLE: AssetTable = AssetTable {
        vertical: "/v.mp4",
        standard: "/s.mp4",
        high_res: "/h.mp4",
        alternate: "/a.webm",
    };

    fn controller(config: TimelineConfig) -> TimelineController<MockHost> {
        TimelineController::new(config.with_assets(TABLE), MockHost::default()).unwrap()
    }

    fn sample(progress: f64, ms: u64) -> ScrollSample {
        ScrollSample {
            progress,
            timestamp: HostTime(ms * 1000),
        }
    }

    /// Brings a controller to `Active` with the given duration.
    fn active(config: TimelineConfig, duration: f64) -> TimelineController<MockHost> {
        let mut c = controller(config);
        let mut t = Tracer::none();
        c.set_profile(HostTime(0), classify(1440, 900), &mut t);
        let load = c.current_load().unwrap();
        c.on_media_ready(HostTime(0), load, duration, &mut t);
        assert_eq!(c.state(), ControllerState::Active);
        c
    }

    fn smoothed() -> TimelineConfig {
        TimelineConfig::full_bleed().with_mode(MappingMode::Smoothed { alpha: 0.15 })
    }

    #[test]
    fn starts_idle_and_loads_primary() {
        let mut c = controller(TimelineConfig::full_bleed());
        assert_eq!(c.state(), ControllerState::Idle);
        c.set_profile(HostTime(0), classify(1440, 900), &mut Tracer::none());
        assert_eq!(c.state(), ControllerState::Loading);
        assert_eq!(c.host().opened(), ["/s.mp4"]);
        assert_eq!(c.duration(), None);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = TimelineConfig::full_bleed().with_epsilon(-1.0);
        assert!(TimelineController::new(config, MockHost::default()).is_err());
    }

    #[test]
    fn direct_mode_scenario() {
        let mut c = active(TimelineConfig::full_bleed(), 10.0);
        let mut t = Tracer::none();
        for (i, p) in [0.0, 0.25, 0.5, 1.0].into_iter().enumerate() {
            c.on_sample(sample(p, 16 * i as u64), &mut t);
        }
        assert_eq!(c.host().seeks(), [0.0, 2.5, 5.0, 10.0]);
    }

    #[test]
    fn direct_mode_skips_sub_threshold_changes() {
        let mut c = active(TimelineConfig::full_bleed(), 10.0);
        let mut t = Tracer::none();
        c.on_sample(sample(0.5, 0), &mut t);
        // 0.003 * 10 = 0.03s < 0.05s threshold.
        c.on_sample(sample(0.503, 16), &mut t);
        c.on_sample(sample(0.51, 32), &mut t);
        assert_eq!(c.host().seeks(), [5.0, 5.1]);
    }

    #[test]
    fn repeated_progress_seeks_at_most_once() {
        for config in [TimelineConfig::full_bleed(), smoothed()] {
            let mut c = active(config, 10.0);
            let mut t = Tracer::none();
            for i in 0..20 {
                c.on_sample(sample(0.4, i), &mut t);
            }
            if matches!(config.mode, MappingMode::Direct { .. }) {
                assert_eq!(c.host().seeks().len(), 1);
            }
            for i in 0..20 {
                c.on_sample(sample(0.0, 100 + i), &mut t);
            }
            let freezes = c.host().seeks().iter().filter(|p| **p == 0.0).count();
            assert_eq!(freezes, 1);
        }
    }

    #[test]
    fn top_of_page_freezes_exactly_at_zero() {
        let mut c = active(TimelineConfig::full_bleed(), 10.0);
        let mut t = Tracer::none();
        c.on_sample(sample(0.7, 0), &mut t);
        // Jitter near the top.
        c.on_sample(sample(0.0004, 16), &mut t);
        assert_eq!(c.position(), Some(0.0));
        assert_eq!(c.host().seeks().last(), Some(&0.0));

        // Same from a tiny non-zero position that the epsilon dedupe would
        // otherwise keep.
        let mut c = active(TimelineConfig::full_bleed(), 10.0);
        c.on_sample(sample(0.0065, 0), &mut t);
        c.on_sample(sample(0.0, 16), &mut t);
        assert_eq!(c.position(), Some(0.0));
    }

    #[test]
    fn smoothed_mode_freezes_immediately() {
        let mut c = active(smoothed(), 10.0);
        let mut t = Tracer::none();
        assert_eq!(c.on_sample(sample(0.8, 0), &mut t), FrameRequest::Animate);
        for i in 0..5 {
            c.on_frame(HostTime(i * 16_000), &mut t);
        }
        assert_eq!(c.on_sample(sample(0.0, 100), &mut t), FrameRequest::Idle);
        assert_eq!(c.position(), Some(0.0));
        assert!(!c.timeline().is_animating);
        assert_eq!(c.on_frame(HostTime(200_000), &mut t), FrameRequest::Idle);
    }

    #[test]
    fn direct_mapping_is_monotonic() {
        let mut previous = -1.0;
        let config = TimelineConfig::full_bleed().with_mode(MappingMode::Direct { threshold: 0.0 });
        let mut c = active(config, 7.5);
        let mut t = Tracer::none();
        for i in 1..=100_u32 {
            c.on_sample(sample(f64::from(i) / 100.0, u64::from(i)), &mut t);
            let target = c.timeline().target_position;
            assert!(target >= previous, "{target} < {previous}");
            previous = target;
        }
        assert!((previous - 7.5).abs() < 1e-12);
    }

    #[test]
    fn smoothed_converges_and_stops() {
        let mut c = active(smoothed(), 10.0);
        let mut t = Tracer::none();
        assert_eq!(c.on_sample(sample(0.6, 0), &mut t), FrameRequest::Animate);
        assert!(c.timeline().is_animating);

        let mut gap = (c.timeline().target_position - c.timeline().smoothed_position).abs();
        let mut ticks = 0;
        loop {
            ticks += 1;
            let request = c.on_frame(HostTime(ticks * 16_000), &mut t);
            let state = c.timeline();
            let next_gap = (state.target_position - state.smoothed_position).abs();
            if request == FrameRequest::Idle {
                assert_eq!(state.smoothed_position, state.target_position);
                assert!(!state.is_animating);
                break;
            }
            assert!(next_gap < gap, "gap did not shrink: {next_gap} >= {gap}");
            assert!(next_gap > c.config().epsilon);
            gap = next_gap;
            assert!(ticks < 1000, "animation never converged");
        }
        assert_eq!(c.position(), Some(6.0));
        // Loop is released; further frames do nothing.
        let writes = c.host().seeks().len();
        assert_eq!(c.on_frame(HostTime(99_000_000), &mut t), FrameRequest::Idle);
        assert_eq!(c.host().seeks().len(), writes);
    }

    #[test]
    fn smoothed_retargets_while_animating() {
        let mut c = active(smoothed(), 10.0);
        let mut t = Tracer::none();
        c.on_sample(sample(0.2, 0), &mut t);
        c.on_frame(HostTime(16_000), &mut t);
        assert_eq!(c.on_sample(sample(0.9, 20), &mut t), FrameRequest::Animate);
        assert!((c.timeline().target_position - 9.0).abs() < 1e-12);
        let mut i = 2;
        while c.on_frame(HostTime(i * 16_000), &mut t) == FrameRequest::Animate {
            i += 1;
        }
        assert_eq!(c.position(), Some(9.0));
        // Seeks were monotonically increasing toward the new target.
        let seeks = c.host().seeks();
        assert!(seeks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn smoothed_retarget_within_epsilon_settles() {
        let mut c = active(smoothed(), 10.0);
        let mut t = Tracer::none();
        c.on_sample(sample(0.5, 0), &mut t);
        for i in 1..=3 {
            assert_eq!(c.on_frame(HostTime(i * 16_000), &mut t), FrameRequest::Animate);
        }
        let smoothed_at = c.timeline().smoothed_position;
        let request = c.on_sample(sample((smoothed_at + 0.005) / 10.0, 60), &mut t);

        assert_eq!(request, FrameRequest::Idle);
        let state = c.timeline();
        assert!(!state.is_animating);
        assert_eq!(state.smoothed_position, state.target_position);
        assert_eq!(c.position(), Some(state.target_position));
        assert_eq!(c.on_frame(HostTime(80_000), &mut t), FrameRequest::Idle);
    }

    #[test]
    fn smoothed_replay_on_ready_jumps_to_target() {
        let mut c = active(smoothed(), 10.0);
        let mut t = Tracer::none();
        c.on_sample(sample(0.9, 0), &mut t);
        while c.on_frame(HostTime(16_000), &mut t) == FrameRequest::Animate {}
        assert_eq!(c.position(), Some(9.0));

        let load = c.current_load().unwrap();
        c.on_media_error(HostTime(1), load, &mut t);
        let fallback = c.current_load().unwrap();
        let request = c.on_media_ready(HostTime(2), fallback, 10.0, &mut t);

        assert_eq!(request, FrameRequest::Idle);
        assert_eq!(c.position(), Some(9.0));
        assert!(!c.timeline().is_animating);
        assert_eq!(c.timeline().smoothed_position, 9.0);
    }

    #[test]
    fn fallback_progression() {
        let mut c = controller(TimelineConfig::full_bleed());
        let mut t = Tracer::none();
        c.set_profile(HostTime(0), classify(1440, 900), &mut t);
        let first = c.current_load().unwrap();
        c.on_media_error(HostTime(5), first, &mut t);
        assert_eq!(c.state(), ControllerState::Loading);
        assert_eq!(c.host().opened(), ["/s.mp4", "/a.webm"]);

        // A repeated report for A changes nothing.
        c.on_media_error(HostTime(6), first, &mut t);
        assert_eq!(c.host().opened(), ["/s.mp4", "/a.webm"]);

        let second = c.current_load().unwrap();
        assert_ne!(first, second);
        c.on_media_ready(HostTime(10), second, 4.0, &mut t);
        assert_eq!(c.state(), ControllerState::Active);
        assert_eq!(c.current_candidate().map(|c| c.reference), Some("/a.webm"));
    }

    #[test]
    fn exhausted_candidates_become_unavailable() {
        let mut c = controller(TimelineConfig::full_bleed());
        let mut t = Tracer::none();
        c.set_profile(HostTime(0), classify(500, 900), &mut t);
        let a = c.current_load().unwrap();
        c.on_media_error(HostTime(1), a, &mut t);
        let b = c.current_load().unwrap();
        // An unusable duration counts as a failure.
        c.on_media_ready(HostTime(2), b, f64::NAN, &mut t);
        assert_eq!(c.state(), ControllerState::Unavailable);
        assert_eq!(c.current_load(), None);
        assert_eq!(c.host().opened(), ["/v.mp4", "/s.mp4"]);

        // Samples are harmless; nothing is retried.
        c.on_sample(sample(0.5, 3), &mut t);
        assert_eq!(c.host().opened().len(), 2);
        assert!(c.host().seeks().is_empty());
    }

    #[test]
    fn class_change_restarts_from_unavailable() {
        let mut c = controller(TimelineConfig::full_bleed());
        let mut t = Tracer::none();
        c.set_profile(HostTime(0), classify(500, 900), &mut t);
        for _ in 0..2 {
            let load = c.current_load().unwrap();
            c.on_media_error(HostTime(1), load, &mut t);
        }
        assert_eq!(c.state(), ControllerState::Unavailable);

        // Same class: ignored.
        c.set_profile(HostTime(2), classify(600, 900), &mut t);
        assert_eq!(c.state(), ControllerState::Unavailable);

        c.set_profile(HostTime(3), classify(3000, 1600), &mut t);
        assert_eq!(c.state(), ControllerState::Loading);
        assert_eq!(c.host().opened(), ["/v.mp4", "/s.mp4", "/h.mp4"]);
    }

    #[test]
    fn class_change_replaces_active_handle() {
        let mut c = active(TimelineConfig::full_bleed(), 10.0);
        let mut t = Tracer::none();
        c.on_sample(sample(0.3, 0), &mut t);
        let old = c.current_load().unwrap();
        c.set_profile(HostTime(1), classify(400, 800), &mut t);
        assert_eq!(c.state(), ControllerState::Loading);
        assert_eq!(c.host().count(&Op::Release), 1);

        // Late report for the old handle is dropped.
        c.on_media_ready(HostTime(2), old, 10.0, &mut t);
        assert_eq!(c.state(), ControllerState::Loading);

        // The last progress is replayed on the new handle.
        let new = c.current_load().unwrap();
        c.on_media_ready(HostTime(3), new, 20.0, &mut t);
        assert_eq!(c.position(), Some(6.0));
    }

    #[test]
    fn samples_while_loading_apply_on_ready() {
        let mut c = controller(TimelineConfig::full_bleed());
        let mut t = Tracer::none();
        c.set_profile(HostTime(0), classify(1440, 900), &mut t);
        c.on_sample(sample(0.1, 0), &mut t);
        c.on_sample(sample(0.4, 16), &mut t);
        assert!(c.host().seeks().is_empty());
        let load = c.current_load().unwrap();
        c.on_media_ready(HostTime(20), load, 10.0, &mut t);
        assert_eq!(c.host().seeks(), [4.0]);
        assert_eq!(c.last_progress(), Some(0.4));
    }

    #[test]
    fn error_while_active_falls_back() {
        let mut c = active(TimelineConfig::full_bleed(), 10.0);
        let mut t = Tracer::none();
        c.on_sample(sample(0.5, 0), &mut t);
        let load = c.current_load().unwrap();
        c.on_media_error(HostTime(1), load, &mut t);
        assert_eq!(c.state(), ControllerState::Loading);
        assert_eq!(c.current_candidate().map(|c| c.reference), Some("/a.webm"));
    }

    #[test]
    fn ready_pauses_and_never_plays() {
        let c = active(TimelineConfig::full_bleed(), 10.0);
        assert_eq!(c.host().count(&Op::Pause), 1);
    }

    #[test]
    fn dispose_silences_everything() {
        let mut c = controller(smoothed());
        let mut t = Tracer::none();
        c.set_profile(HostTime(0), classify(1440, 900), &mut t);
        let load = c.current_load().unwrap();
        c.dispose(HostTime(1), &mut t);
        c.dispose(HostTime(2), &mut t);
        assert_eq!(c.state(), ControllerState::Disposed);

        let before: Vec<Op> = c.host().ops.borrow().clone();
        assert_eq!(c.on_media_ready(HostTime(3), load, 10.0, &mut t), FrameRequest::Idle);
        assert_eq!(c.on_sample(sample(0.5, 4), &mut t), FrameRequest::Idle);
        assert_eq!(c.on_frame(HostTime(5), &mut t), FrameRequest::Idle);
        c.on_media_error(HostTime(6), load, &mut t);
        c.set_profile(HostTime(7), classify(300, 600), &mut t);
        assert_eq!(*c.host().ops.borrow(), before);
        assert!(c.host().seeks().is_empty());
    }

    #[test]
    fn dispose_mid_animation_stops_loop() {
        let mut c = active(smoothed(), 10.0);
        let mut t = Tracer::none();
        c.on_sample(sample(0.9, 0), &mut t);
        c.on_frame(HostTime(16_000), &mut t);
        let writes = c.host().seeks().len();
        c.dispose(HostTime(20_000), &mut t);
        assert!(!c.timeline().is_animating);
        assert_eq!(c.on_frame(HostTime(32_000), &mut t), FrameRequest::Idle);
        assert_eq!(c.host().seeks().len(), writes);
    }
}
