// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for scrubline.
//!
//! This crate connects a [`TimelineController`] to browser APIs:
//!
//! - [`ScrubView`]: mounts a scrubbed `<video>` surface into a container and
//!   wires scroll, resize and frame callbacks to it
//! - [`VideoHost`]: [`MediaHost`] backed by `<video>` elements
//! - [`RafLoop`]: demand-driven `requestAnimationFrame` frame source
//! - [`ProgressBar`]: proportional fill driven by [`ProgressIndicator`]
//! - [`ConsoleSink`]: [`TraceSink`] that logs to the browser console
//!
//! Only `wasm32` targets can call into the browser; on other targets the
//! crate builds so its pure helpers can be unit tested.
//!
//! [`TimelineController`]: scrubline_core::timeline::TimelineController
//! [`MediaHost`]: scrubline_core::media::MediaHost
//! [`ProgressIndicator`]: scrubline_core::progress::ProgressIndicator
//! [`TraceSink`]: scrubline_core::trace::TraceSink

#![no_std]

extern crate alloc;

mod console;
mod listener;
mod progress;
mod raf;
mod video;
mod view;
mod viewport;

pub use console::ConsoleSink;
pub use listener::EventListener;
pub use progress::ProgressBar;
pub use raf::RafLoop;
pub use video::{LoadReport, ReportQueue, VideoHost, VideoTransport};
pub use view::{MountOptions, ScrubView};
pub use viewport::{scroll_metrics, viewport_size};

use scrubline_core::time::HostTime;

/// Returns the current host time from `performance.now()`, in microsecond
/// ticks.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis(raf::performance_now())
}
