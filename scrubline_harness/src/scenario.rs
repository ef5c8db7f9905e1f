// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted end-to-end runs against a [`SimHost`].
//!
//! A [`Scenario`] owns one controller and plays the role of the page: it
//! feeds viewport sizes through a [`ProfileTracker`], scroll events through a
//! [`ScrollSampler`], and advances a manual frame clock. Each
//! [`step`](Scenario::step) is one animation frame.

use scrubline_core::config::{ConfigError, TimelineConfig};
use scrubline_core::media::LoadId;
use scrubline_core::profile::ProfileTracker;
use scrubline_core::refresh::RefreshRateEstimator;
use scrubline_core::sampler::{SampleDecision, ScrollMetrics, ScrollSampler};
use scrubline_core::time::{Duration, HostTime};
use scrubline_core::timeline::{FrameRequest, TimelineController};
use scrubline_core::trace::{RefreshEstimateEvent, Tracer};

use crate::sim::{Report, SimHost};
use crate::{ScrubReport, ScrubSample, ScrubTracker};

/// Frames of lag history kept by a scenario.
pub const HISTORY: usize = 32;

/// One simulated page with a single scrubbed surface.
#[derive(Debug)]
pub struct Scenario<'a> {
    controller: TimelineController<SimHost>,
    host: SimHost,
    profiles: ProfileTracker,
    sampler: ScrollSampler,
    refresh: RefreshRateEstimator,
    tracker: ScrubTracker<HISTORY>,
    tracer: Tracer<'a>,
    now: HostTime,
    frame_interval: Duration,
    metrics: ScrollMetrics,
    animating: bool,
    last_report: Option<ScrubReport>,
}

impl<'a> Scenario<'a> {
    /// Creates a scenario for a 1440×900 viewport over a 3600 px page.
    ///
    /// No viewport is applied until [`resize`](Self::resize) is called.
    pub fn new(config: TimelineConfig, host: SimHost) -> Result<Self, ConfigError> {
        let controller = TimelineController::new(config, host.clone())?;
        Ok(Self {
            controller,
            host,
            profiles: ProfileTracker::new(config.thresholds),
            sampler: ScrollSampler::new(config.min_sample_interval),
            refresh: RefreshRateEstimator::default(),
            tracker: ScrubTracker::new(),
            tracer: Tracer::none(),
            now: HostTime(0),
            frame_interval: Duration(16_667),
            metrics: ScrollMetrics {
                scroll_top: 0.0,
                scroll_height: 3600.0,
                viewport_height: 900.0,
            },
            animating: false,
            last_report: None,
        })
    }

    /// Routes trace events to `tracer`.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Tracer<'a>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Sets the display frame interval.
    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Sets the page and viewport heights.
    #[must_use]
    pub fn with_page(mut self, scroll_height: f64, viewport_height: f64) -> Self {
        self.metrics.scroll_height = scroll_height;
        self.metrics.viewport_height = viewport_height;
        self
    }

    /// The controller under test.
    #[must_use]
    pub fn controller(&self) -> &TimelineController<SimHost> {
        &self.controller
    }

    /// The shared host log.
    #[must_use]
    pub fn host(&self) -> &SimHost {
        &self.host
    }

    /// Current frame time.
    #[must_use]
    pub const fn now(&self) -> HostTime {
        self.now
    }

    /// The most recent scrub report, once a frame ran with media active.
    #[must_use]
    pub const fn report(&self) -> Option<ScrubReport> {
        self.last_report
    }

    /// Whether the smoothing loop is running.
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.animating
    }

    /// Whether no frame work is pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.animating && !self.sampler.frame_requested()
    }

    /// Applies a viewport size, as a resize listener would.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.metrics.viewport_height = f64::from(height);
        if let Some(profile) = self.profiles.observe(width, height) {
            self.controller
                .set_profile(self.now, profile, &mut self.tracer);
            self.animating = false;
        }
    }

    /// Forwards every queued load report to the controller.
    pub fn deliver_reports(&mut self) {
        // Reports may open further candidates, which queue more reports.
        loop {
            let reports = self.host.take_reports();
            if reports.is_empty() {
                return;
            }
            for report in reports {
                self.deliver(report);
            }
        }
    }

    /// Forwards exactly one report, even a stale one.
    pub fn deliver(&mut self, report: Report) {
        match report {
            Report::Ready(load, duration) => {
                let request =
                    self.controller
                        .on_media_ready(self.now, load, duration, &mut self.tracer);
                self.request(request);
            }
            Report::Error(load) => {
                self.controller
                    .on_media_error(self.now, load, &mut self.tracer);
            }
        }
    }

    /// The load currently in flight or playing.
    #[must_use]
    pub fn current_load(&self) -> Option<LoadId> {
        self.controller.current_load()
    }

    /// Moves the page to `scroll_top` pixels and fires a scroll event.
    pub fn scroll_to(&mut self, scroll_top: f64) {
        self.metrics.scroll_top = scroll_top;
        let _ = self.sampler.on_scroll();
    }

    /// Moves the page to a normalized position and fires a scroll event.
    pub fn scroll_progress(&mut self, progress: f64) {
        let range = self.metrics.scroll_height - self.metrics.viewport_height;
        self.scroll_to(progress * range);
    }

    /// Runs one animation frame.
    pub fn step(&mut self) {
        self.now = self.now + self.frame_interval;
        let seeks_before = self.host.seek_count();

        if self.refresh.wants_frames()
            && let Some(estimate) = self.refresh.on_frame(self.now)
        {
            self.tracer.refresh_estimate(&RefreshEstimateEvent {
                at: self.now,
                estimate,
            });
        }

        if self.sampler.frame_requested() {
            match self.sampler.on_frame(self.now, &self.metrics) {
                SampleDecision::Emit(sample) => {
                    let request = self.controller.on_sample(sample, &mut self.tracer);
                    self.request(request);
                }
                SampleDecision::Defer | SampleDecision::Skip => {}
            }
        }

        if self.animating {
            let request = self.controller.on_frame(self.now, &mut self.tracer);
            self.animating = request == FrameRequest::Animate;
        }

        if let Some(displayed) = self.controller.position() {
            let seeks = self.host.seek_count() - seeks_before;
            self.last_report = Some(self.tracker.observe(ScrubSample {
                target_s: self.controller.timeline().target_position,
                displayed_s: displayed,
                seeks: u32::try_from(seeks).unwrap_or(u32::MAX),
                frame_delta_ms: self.frame_interval.as_millis_f64(),
            }));
        }
    }

    /// Steps until no frame work is pending or `max_frames` ran. Returns the
    /// number of frames run.
    pub fn run_until_idle(&mut self, max_frames: u32) -> u32 {
        let mut frames = 0;
        while frames < max_frames && !self.is_idle() {
            self.step();
            frames += 1;
        }
        frames
    }

    /// Steps a fixed number of frames.
    pub fn run_frames(&mut self, frames: u32) {
        for _ in 0..frames {
            self.step();
        }
    }

    /// Unmounts: stops sampling and disposes the controller.
    pub fn teardown(&mut self) {
        self.sampler.unsubscribe();
        self.animating = false;
        self.controller.dispose(self.now, &mut self.tracer);
    }

    fn request(&mut self, request: FrameRequest) {
        if request == FrameRequest::Animate {
            self.animating = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScrubGrade;
    use crate::sim::LoadOutcome;
    use alloc::vec::Vec;
    use scrubline_core::config::MappingMode;
    use scrubline_core::source::AssetTable;
    use scrubline_core::timeline::ControllerState;

    const TABLE: AssetTable = AssetTable {
        vertical: "/v.mp4",
        standard: "/s.mp4",
        high_res: "/h.mp4",
        alternate: "/a.webm",
    };

    fn scenario(config: TimelineConfig, host: SimHost) -> Scenario<'static> {
        let mut s = Scenario::new(config.with_assets(TABLE), host).unwrap();
        s.resize(1440, 900);
        s.deliver_reports();
        s
    }

    #[test]
    fn direct_mode_end_to_end() {
        let mut s = scenario(TimelineConfig::full_bleed(), SimHost::new(10.0));
        assert_eq!(s.controller().state(), ControllerState::Active);
        for p in [0.0, 0.25, 0.5, 1.0] {
            s.scroll_progress(p);
            s.step();
        }
        assert_eq!(s.host().seeks(), [0.0, 2.5, 5.0, 10.0]);
        assert_eq!(s.report().map(|r| r.grade), Some(ScrubGrade::A));
        assert_eq!(s.host().pauses(), 1);
    }

    #[test]
    fn flick_is_coalesced_per_frame() {
        let mut s = scenario(TimelineConfig::full_bleed(), SimHost::new(10.0));
        for i in 0..40 {
            s.scroll_to(f64::from(i) * 20.0);
        }
        s.step();
        assert_eq!(s.host().seek_count(), 1);
        assert!(s.is_idle());
        let report = s.report().unwrap();
        assert_eq!(report.redundant_frames, 0);
    }

    #[test]
    fn high_refresh_defers_but_keeps_final_position() {
        let mut s = scenario(TimelineConfig::full_bleed(), SimHost::new(10.0))
            .with_frame_interval(Duration(4_167));
        s.scroll_progress(0.2);
        s.step();
        s.scroll_progress(0.6);
        s.step();
        // 4ms after the last sample: deferred.
        assert_eq!(s.host().seeks(), [2.0]);
        assert!(!s.is_idle());
        s.run_until_idle(10);
        assert_eq!(s.host().seeks(), [2.0, 6.0]);
    }

    #[test]
    fn smoothed_mode_converges_and_releases_loop() {
        let config = TimelineConfig::full_bleed().with_mode(MappingMode::SMOOTHED);
        let mut s = scenario(config, SimHost::new(10.0));
        s.scroll_progress(0.8);
        s.step();
        assert!(s.is_animating());
        let frames = s.run_until_idle(600);
        assert!(frames < 600, "animation never settled");
        assert!(s.is_idle());
        assert_eq!(s.controller().position(), Some(8.0));
        let seeks = s.host().seeks();
        assert!(seeks.windows(2).all(|w| w[0] < w[1]), "{seeks:?}");
        assert_eq!(s.report().map(|r| r.lag_ms), Some(0.0));
    }

    #[test]
    fn top_of_page_pins_first_frame_once() {
        let config = TimelineConfig::secondary();
        let mut s = scenario(config, SimHost::new(10.0));
        s.scroll_progress(0.5);
        s.run_frames(5);
        for _ in 0..5 {
            s.scroll_to(0.0);
            s.step();
        }
        assert_eq!(s.controller().position(), Some(0.0));
        assert!(s.is_idle());
        let zeros = s.host().seeks().iter().filter(|p| **p == 0.0).count();
        assert_eq!(zeros, 1);
    }

    #[test]
    fn primary_failure_falls_back_to_alternate() {
        let host = SimHost::new(6.0).with_outcome("/s.mp4", LoadOutcome::Fail);
        let mut s = scenario(TimelineConfig::full_bleed(), host);
        assert_eq!(s.host().opened(), ["/s.mp4", "/a.webm"]);
        assert_eq!(s.controller().state(), ControllerState::Active);
        s.scroll_progress(0.5);
        s.step();
        assert_eq!(s.host().seeks(), [3.0]);
    }

    #[test]
    fn all_candidates_failing_is_unavailable_and_silent() {
        let host = SimHost::new(6.0)
            .with_outcome("/s.mp4", LoadOutcome::Fail)
            .with_outcome("/a.webm", LoadOutcome::Ready(f64::NAN));
        let mut s = scenario(TimelineConfig::full_bleed(), host);
        assert_eq!(s.controller().state(), ControllerState::Unavailable);
        s.scroll_progress(0.5);
        s.run_frames(3);
        assert!(s.host().seeks().is_empty());
        assert_eq!(s.host().opened().len(), 2);
        assert!(s.report().is_none());
    }

    #[test]
    fn teardown_mid_load_ignores_late_metadata() {
        let host = SimHost::new(6.0).with_outcome("/s.mp4", LoadOutcome::Stall);
        let mut s = scenario(TimelineConfig::full_bleed(), host);
        let load = s.current_load().unwrap();
        s.scroll_progress(0.5);
        s.teardown();
        s.host().inject_ready(load, 6.0);
        s.deliver_reports();
        s.scroll_progress(0.9);
        s.run_frames(3);
        assert!(s.host().seeks().is_empty());
        assert_eq!(s.host().released(), [load]);
        assert_eq!(s.host().late_writes(), 0);
        assert_eq!(s.controller().state(), ControllerState::Disposed);
    }

    #[test]
    fn teardown_mid_animation_stops_writes() {
        let config = TimelineConfig::full_bleed().with_mode(MappingMode::SMOOTHED);
        let mut s = scenario(config, SimHost::new(10.0));
        s.scroll_progress(1.0);
        s.run_frames(3);
        let writes = s.host().seek_count();
        s.teardown();
        s.run_frames(10);
        assert_eq!(s.host().seek_count(), writes);
        assert_eq!(s.host().late_writes(), 0);
    }

    #[test]
    fn resize_across_breakpoint_reselects() {
        let mut s = scenario(TimelineConfig::full_bleed(), SimHost::new(10.0));
        let first = s.current_load().unwrap();
        s.scroll_progress(0.25);
        s.step();
        // Same class: nothing happens.
        s.resize(1300, 800);
        assert_eq!(s.current_load(), Some(first));

        s.resize(390, 844);
        s.deliver_reports();
        assert_eq!(s.host().opened(), ["/s.mp4", "/v.mp4"]);
        assert_eq!(s.host().released(), [first]);
        let second = s.current_load().unwrap();
        // The progress survived the switch.
        assert_eq!(s.host().seeks_for(second), [2.5]);
    }

    #[test]
    fn resize_mid_animation_drops_the_loop() {
        let config = TimelineConfig::full_bleed().with_mode(MappingMode::SMOOTHED);
        let mut s = scenario(config, SimHost::new(10.0));
        s.scroll_progress(0.9);
        s.run_frames(2);
        assert!(s.is_animating());

        s.resize(390, 844);
        assert!(!s.is_animating());
        assert!(!s.controller().timeline().is_animating);
        s.deliver_reports();
        // The new handle starts at the scrolled position, with no sweep.
        let second = s.current_load().unwrap();
        assert_eq!(s.host().seeks_for(second), [9.0]);
        assert!(s.is_idle());
    }

    #[test]
    fn stale_error_for_replaced_load_is_ignored() {
        let mut s = scenario(TimelineConfig::full_bleed(), SimHost::new(10.0));
        let first = s.current_load().unwrap();
        s.resize(3000, 1600);
        s.deliver_reports();
        let opened_before: Vec<_> = s.host().opened();
        s.deliver(Report::Error(first));
        assert_eq!(s.host().opened(), opened_before);
        assert_eq!(s.controller().state(), ControllerState::Active);
    }

    #[test]
    fn mid_playback_error_advances() {
        let mut s = scenario(TimelineConfig::full_bleed(), SimHost::new(10.0));
        let load = s.current_load().unwrap();
        s.host().inject_error(load);
        s.deliver_reports();
        assert_eq!(s.host().opened(), ["/s.mp4", "/a.webm"]);
        assert_eq!(s.controller().state(), ControllerState::Active);
    }

    #[test]
    fn unscrollable_page_leaves_media_alone() {
        let mut s = Scenario::new(
            TimelineConfig::full_bleed().with_assets(TABLE),
            SimHost::new(10.0),
        )
        .unwrap()
        .with_page(900.0, 900.0);
        s.resize(1440, 900);
        s.deliver_reports();
        s.scroll_to(0.0);
        s.run_frames(2);
        assert!(s.host().seeks().is_empty());
    }

    #[test]
    fn refresh_estimate_is_traced_once() {
        use scrubline_core::trace::TraceSink;

        #[derive(Default)]
        struct Estimates(Vec<f64>);
        impl TraceSink for Estimates {
            fn on_refresh_estimate(&mut self, e: &RefreshEstimateEvent) {
                self.0.push(e.estimate.hz);
            }
        }

        let mut sink = Estimates::default();
        {
            let mut s = Scenario::new(TimelineConfig::full_bleed(), SimHost::new(10.0))
                .unwrap()
                .with_tracer(Tracer::new(&mut sink))
                .with_frame_interval(Duration(8_333));
            s.run_frames(300);
        }
        assert_eq!(sink.0.len(), 1);
        assert!((sink.0[0] - 120.0).abs() < 1.0, "{:?}", sink.0);
    }
}
