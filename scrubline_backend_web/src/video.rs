// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `<video>`-backed [`MediaHost`].
//!
//! Each [`open`](MediaHost::open) creates a muted, inline, non-autoplaying
//! `<video>` element inside the view's media layer. Load outcomes are not
//! delivered from inside the element's event handlers: they are queued on a
//! [`ReportQueue`] and the frame loop is woken, so the controller only ever
//! runs from the frame callback and a transport is never released while one
//! of its own handlers is on the stack.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, HtmlVideoElement};

use scrubline_core::media::{LoadId, MediaHost, Transport};

use crate::listener::EventListener;
use crate::raf::RafLoop;

const VIDEO_CSS: &str = "position:absolute;inset:0;width:100%;height:100%;\
                         object-fit:cover;pointer-events:none;";

/// A load outcome reported by a `<video>` element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LoadReport {
    /// `loadedmetadata` fired; the element's duration at that moment.
    Ready(LoadId, f64),
    /// `error` fired, or the element could not be created.
    Error(LoadId),
}

/// Load reports waiting for the next frame.
///
/// Clones share one queue.
#[derive(Clone, Debug)]
pub struct ReportQueue {
    queue: Rc<RefCell<Vec<LoadReport>>>,
    wake: Weak<RafLoop>,
}

impl ReportQueue {
    /// Creates an empty queue that wakes `wake` on every push.
    #[must_use]
    pub fn new(wake: Weak<RafLoop>) -> Self {
        Self {
            queue: Rc::default(),
            wake,
        }
    }

    /// Queues a report and schedules a frame to deliver it.
    pub fn push(&self, report: LoadReport) {
        self.queue.borrow_mut().push(report);
        if let Some(raf) = self.wake.upgrade() {
            raf.start();
        }
    }

    /// Drains queued reports, oldest first.
    pub fn take(&self) -> Vec<LoadReport> {
        core::mem::take(&mut self.queue.borrow_mut())
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

/// Creates `<video>` elements inside a media layer.
#[derive(Debug)]
pub struct VideoHost {
    document: Document,
    layer: HtmlElement,
    reports: ReportQueue,
}

impl VideoHost {
    /// Creates a host that appends its elements to `layer`.
    #[must_use]
    pub fn new(document: Document, layer: HtmlElement, reports: ReportQueue) -> Self {
        Self {
            document,
            layer,
            reports,
        }
    }

    /// The element that receives `<video>` children.
    #[must_use]
    pub fn layer(&self) -> &HtmlElement {
        &self.layer
    }

    fn create(&self, reference: &'static str, load: LoadId) -> Result<VideoTransport, JsValue> {
        let element: HtmlVideoElement = self
            .document
            .create_element("video")?
            .dyn_into()
            .map_err(JsValue::from)?;
        element.set_muted(true);
        element.set_autoplay(false);
        element.set_preload("auto");
        element.set_attribute("playsinline", "")?;
        element.set_attribute("aria-hidden", "true")?;
        element.style().set_css_text(VIDEO_CSS);

        let mut listeners = Vec::with_capacity(2);
        listeners.push({
            let reports = self.reports.clone();
            let video = element.clone();
            EventListener::new(&element, "loadedmetadata", false, move |_| {
                reports.push(LoadReport::Ready(load, video.duration()));
            })?
        });
        listeners.push({
            let reports = self.reports.clone();
            EventListener::new(&element, "error", false, move |_| {
                reports.push(LoadReport::Error(load));
            })?
        });

        // Listeners first: a cached asset may report as soon as `src` is set.
        element.set_src(reference);
        self.layer.append_child(&element)?;

        Ok(VideoTransport {
            element: Some(element),
            listeners,
        })
    }
}

impl MediaHost for VideoHost {
    type Transport = VideoTransport;

    fn open(&mut self, reference: &'static str, load: LoadId) -> VideoTransport {
        match self.create(reference, load) {
            Ok(transport) => transport,
            Err(_) => {
                self.reports.push(LoadReport::Error(load));
                VideoTransport::detached()
            }
        }
    }
}

/// Transport over one `<video>` element.
#[derive(Debug)]
pub struct VideoTransport {
    element: Option<HtmlVideoElement>,
    listeners: Vec<EventListener>,
}

impl VideoTransport {
    fn detached() -> Self {
        Self {
            element: None,
            listeners: Vec::new(),
        }
    }

    /// The element, until released.
    #[must_use]
    pub fn element(&self) -> Option<&HtmlVideoElement> {
        self.element.as_ref()
    }
}

impl Transport for VideoTransport {
    fn set_position(&mut self, secs: f64) {
        if let Some(element) = &self.element {
            element.set_current_time(secs);
        }
    }

    fn pause(&mut self) {
        if let Some(element) = &self.element {
            let _ = element.pause();
        }
    }

    fn release(&mut self) {
        self.listeners.clear();
        if let Some(element) = self.element.take() {
            let _ = element.pause();
            // Dropping `src` and reloading aborts any in-flight fetch.
            let _ = element.remove_attribute("src");
            element.load();
            element.remove();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_drains_in_order() {
        let queue = ReportQueue::new(Weak::new());
        let shared = queue.clone();
        queue.push(LoadReport::Ready(LoadId(1), 4.0));
        shared.push(LoadReport::Error(LoadId(2)));
        assert!(!queue.is_empty());
        assert_eq!(
            queue.take(),
            [LoadReport::Ready(LoadId(1), 4.0), LoadReport::Error(LoadId(2))]
        );
        assert!(shared.is_empty());
    }

    #[test]
    fn detached_transport_ignores_calls() {
        let mut t = VideoTransport::detached();
        t.set_position(1.0);
        t.pause();
        t.release();
        t.release();
        assert!(t.element().is_none());
    }
}
