// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A mounted scroll-scrubbed video surface.
//!
//! [`ScrubView`] wires one [`TimelineController`] to the page: a passive
//! `scroll` listener feeds its [`ScrollSampler`], a `resize` listener feeds
//! its [`ProfileTracker`], and a demand-driven [`RafLoop`] runs sampling,
//! load report delivery, smoothing and the one-shot refresh estimate. All
//! browser callbacks hold only weak references, so dropping the view tears
//! everything down.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::ToString;
use alloc::vec::Vec;
use core::cell::RefCell;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlElement, Window};

use scrubline_core::config::TimelineConfig;
use scrubline_core::profile::ProfileTracker;
use scrubline_core::progress::ProgressIndicator;
use scrubline_core::refresh::RefreshRateEstimator;
use scrubline_core::sampler::{SampleDecision, ScrollMetrics, ScrollSampler};
use scrubline_core::time::HostTime;
use scrubline_core::timeline::{ControllerState, FrameRequest, TimelineController};
use scrubline_core::trace::{RefreshEstimateEvent, TraceSink, Tracer};

use crate::console::ConsoleSink;
use crate::listener::EventListener;
use crate::progress::ProgressBar;
use crate::raf::RafLoop;
use crate::video::{LoadReport, ReportQueue, VideoHost};
use crate::viewport;

const LAYER_CSS: &str = "position:absolute;inset:0;overflow:hidden;pointer-events:none;";

// Metrics that sample as "cannot scroll", used when the window has no
// readable geometry.
const UNSCROLLABLE: ScrollMetrics = ScrollMetrics {
    scroll_top: 0.0,
    scroll_height: 0.0,
    viewport_height: 0.0,
};

/// Optional extras for [`ScrubView::mount_with`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MountOptions {
    /// Adds a [`ProgressBar`] along the bottom edge of the container.
    pub progress_bar: bool,
    /// Logs trace events to the console under this label.
    pub trace_label: Option<&'static str>,
}

impl MountOptions {
    /// Enables the progress bar.
    #[must_use]
    pub const fn with_progress_bar(mut self) -> Self {
        self.progress_bar = true;
        self
    }

    /// Enables console tracing under `label`.
    #[must_use]
    pub const fn with_trace_label(mut self, label: &'static str) -> Self {
        self.trace_label = Some(label);
        self
    }
}

type Shared = Rc<RefCell<Option<ViewState>>>;

/// One scrubbed surface mounted into a container element.
///
/// The container should be a positioning context (`position: relative` or
/// similar); the media layer covers it edge to edge. Drop the view, or call
/// [`unmount`](Self::unmount), to stop sampling, release the media and remove
/// every element the view added.
pub struct ScrubView {
    shared: Shared,
    raf: Rc<RafLoop>,
    listeners: Vec<EventListener>,
}

struct ViewState {
    controller: TimelineController<VideoHost>,
    reports: ReportQueue,
    sampler: ScrollSampler,
    profiles: ProfileTracker,
    refresh: RefreshRateEstimator,
    window: Window,
    container: HtmlElement,
    progress: Option<ProgressBar>,
    sink: Option<Box<dyn TraceSink>>,
    animating: bool,
    fallback_painted: bool,
}

impl ScrubView {
    /// Mounts a surface with no extras.
    pub fn mount(container: &HtmlElement, config: TimelineConfig) -> Result<Self, JsValue> {
        Self::mount_with(container, config, MountOptions::default())
    }

    /// Mounts a surface.
    ///
    /// The initial viewport is applied immediately, so the first candidate
    /// starts loading before this returns.
    pub fn mount_with(
        container: &HtmlElement,
        config: TimelineConfig,
        options: MountOptions,
    ) -> Result<Self, JsValue> {
        config
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let layer: HtmlElement = document.create_element("div")?.dyn_into()?;
        layer.style().set_css_text(LAYER_CSS);

        let shared: Shared = Rc::new(RefCell::new(None));
        let raf = Rc::new(RafLoop::new({
            let weak = Rc::downgrade(&shared);
            move |now| frame(&weak, now)
        }));
        let reports = ReportQueue::new(Rc::downgrade(&raf));
        let host = VideoHost::new(document.clone(), layer.clone(), reports.clone());
        let controller = TimelineController::new(config, host)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        container.append_child(&layer)?;
        let progress = if options.progress_bar {
            match ProgressBar::mount(&document, container) {
                Ok(bar) => Some(bar),
                Err(e) => {
                    layer.remove();
                    return Err(e);
                }
            }
        } else {
            None
        };
        let sink = options
            .trace_label
            .map(|label| Box::new(ConsoleSink::new(label)) as Box<dyn TraceSink>);

        *shared.borrow_mut() = Some(ViewState {
            controller,
            reports,
            sampler: ScrollSampler::new(config.min_sample_interval),
            profiles: ProfileTracker::new(config.thresholds),
            refresh: RefreshRateEstimator::default(),
            window: window.clone(),
            container: container.clone(),
            progress,
            sink,
            animating: false,
            fallback_painted: false,
        });

        let mut view = Self {
            shared,
            raf,
            listeners: Vec::with_capacity(2),
        };
        view.listen(&window, "scroll", |state, _now| state.sampler.on_scroll())?;
        view.listen(&window, "resize", ViewState::resize)?;

        if let Some(state) = view.shared.borrow_mut().as_mut() {
            state.resize(crate::now());
            // Sample wherever the page already is, e.g. after a reload.
            let _ = state.sampler.on_scroll();
        }
        // Also starts the refresh estimate.
        view.raf.start();
        Ok(view)
    }

    /// Current controller state; [`Disposed`](ControllerState::Disposed)
    /// after unmount.
    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.shared
            .try_borrow()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.controller.state()))
            .unwrap_or(ControllerState::Disposed)
    }

    /// Current progress, for custom indicators.
    #[must_use]
    pub fn progress(&self) -> ProgressIndicator {
        self.shared
            .try_borrow()
            .ok()
            .and_then(|s| s.as_ref().map(|s| ProgressIndicator::read(&s.controller)))
            .unwrap_or_default()
    }

    /// Tears the surface down. Equivalent to dropping the view.
    pub fn unmount(self) {}

    /// Registers a window listener that runs `handler` against the state and
    /// wakes the frame loop when it returns `true`.
    fn listen(
        &mut self,
        window: &Window,
        kind: &'static str,
        handler: fn(&mut ViewState, HostTime) -> bool,
    ) -> Result<(), JsValue> {
        let weak = Rc::downgrade(&self.shared);
        let wake = Rc::downgrade(&self.raf);
        let listener = EventListener::new(window, kind, true, move |_| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let wants_frame = shared
                .try_borrow_mut()
                .ok()
                .and_then(|mut s| s.as_mut().map(|s| handler(s, crate::now())))
                .unwrap_or(false);
            if wants_frame && let Some(raf) = wake.upgrade() {
                raf.start();
            }
        })?;
        self.listeners.push(listener);
        Ok(())
    }
}

impl Drop for ScrubView {
    fn drop(&mut self) {
        self.listeners.clear();
        self.raf.stop();
        let state = match self.shared.try_borrow_mut() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(mut state) = state {
            state.teardown(crate::now());
        }
    }
}

impl core::fmt::Debug for ScrubView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrubView")
            .field("state", &self.state())
            .field("raf", &self.raf)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

fn frame(shared: &Weak<RefCell<Option<ViewState>>>, now: HostTime) -> bool {
    let Some(shared) = shared.upgrade() else {
        return false;
    };
    let Ok(mut guard) = shared.try_borrow_mut() else {
        return true;
    };
    match guard.as_mut() {
        Some(state) => state.frame(now),
        None => false,
    }
}

fn tracer(sink: &mut Option<Box<dyn TraceSink>>) -> Tracer<'_> {
    match sink {
        Some(sink) => Tracer::new(sink.as_mut()),
        None => Tracer::none(),
    }
}

impl ViewState {
    /// One animation frame. Returns whether another is wanted.
    fn frame(&mut self, now: HostTime) -> bool {
        let mut tracer = tracer(&mut self.sink);

        for report in self.reports.take() {
            match report {
                LoadReport::Ready(load, duration) => {
                    let request = self
                        .controller
                        .on_media_ready(now, load, duration, &mut tracer);
                    self.animating |= request == FrameRequest::Animate;
                }
                LoadReport::Error(load) => self.controller.on_media_error(now, load, &mut tracer),
            }
        }

        if self.refresh.wants_frames()
            && let Some(estimate) = self.refresh.on_frame(now)
        {
            tracer.refresh_estimate(&RefreshEstimateEvent { at: now, estimate });
        }

        if self.sampler.frame_requested() {
            let metrics = viewport::scroll_metrics(&self.window).unwrap_or(UNSCROLLABLE);
            if let SampleDecision::Emit(sample) = self.sampler.on_frame(now, &metrics) {
                let request = self.controller.on_sample(sample, &mut tracer);
                self.animating |= request == FrameRequest::Animate;
            }
        }

        if self.animating {
            self.animating = self.controller.on_frame(now, &mut tracer) == FrameRequest::Animate;
        }

        if let Some(bar) = &mut self.progress {
            bar.show(ProgressIndicator::read(&self.controller));
        }
        self.paint_fallback();

        self.animating
            || self.sampler.frame_requested()
            || self.refresh.wants_frames()
            || !self.reports.is_empty()
    }

    /// Applies the current viewport. Returns `true` so the new viewport
    /// height is sampled on the next frame.
    fn resize(&mut self, now: HostTime) -> bool {
        if let Some((width, height)) = viewport::viewport_size(&self.window)
            && let Some(profile) = self.profiles.observe(width, height)
        {
            let mut tracer = tracer(&mut self.sink);
            self.controller.set_profile(now, profile, &mut tracer);
            self.animating = false;
        }
        self.paint_fallback();
        self.sampler.on_scroll()
    }

    /// Paints the configured fallback color while no candidate can play.
    fn paint_fallback(&mut self) {
        let unavailable = self.controller.state() == ControllerState::Unavailable;
        if unavailable == self.fallback_painted {
            return;
        }
        self.fallback_painted = unavailable;
        let style = self.container.style();
        let _ = if unavailable {
            style.set_property("background-color", self.controller.config().fallback_color)
        } else {
            style.remove_property("background-color").map(drop)
        };
    }

    fn teardown(&mut self, now: HostTime) {
        self.sampler.unsubscribe();
        self.animating = false;
        let mut tracer = tracer(&mut self.sink);
        self.controller.dispose(now, &mut tracer);
        self.controller.host().layer().remove();
        if let Some(bar) = self.progress.take() {
            bar.remove();
        }
        if self.fallback_painted {
            let _ = self.container.style().remove_property("background-color");
            self.fallback_painted = false;
        }
    }
}
