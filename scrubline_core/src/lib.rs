// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-synchronized media timelines.
//!
//! `scrubline_core` turns page-scroll position into deterministic media
//! seeking, so scrolling a page scrubs a background video like a film reel.
//! It is `no_std` compatible (with `alloc`) and knows nothing about the
//! browser: hosts plug in through the [`MediaHost`](media::MediaHost) and
//! [`Transport`](media::Transport) traits and feed the controller scroll
//! samples, frame callbacks and load reports.
//!
//! # Architecture
//!
//! ```text
//!   resize ──► ProfileTracker::observe() ──► TimelineController::set_profile()
//!                                                  │
//!                              select_sources() ◄──┘
//!                                    │
//!                                    ▼
//!                         MediaHost::open() ──► load report (LoadId)
//!                                                  │
//!                 on_media_ready / on_media_error ◄┘
//!
//!   scroll ──► ScrollSampler ──► ScrollSample ──► TimelineController::on_sample()
//!                                                  │
//!                       FrameRequest::Animate ─────┤
//!                                                  ▼
//!   rAF ──────────────────────────────► TimelineController::on_frame()
//!                                                  │
//!                                                  ▼
//!                                    MediaHandle::seek_to() ──► Transport
//! ```
//!
//! **[`profile`]**: viewport classification; reports only on class change.
//!
//! **[`source`]**: asset tables and forward-only candidate lists.
//!
//! **[`media`]**: [`MediaHandle`](media::MediaHandle) load state, clamped and
//! deduplicated seeks, and the host traits.
//!
//! **[`sampler`]**: coalesces scroll events into at most one sample per
//! frame.
//!
//! **[`timeline`]**: the controller state machine with direct and smoothed
//! mapping and fallback across candidates.
//!
//! **[`refresh`]**: one-off display refresh estimate.
//!
//! **[`progress`]**: read-only progress for indicators.
//!
//! **[`config`]**: presets and tunables.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod config;
pub mod media;
pub mod profile;
pub mod progress;
pub mod refresh;
pub mod sampler;
pub mod source;
pub mod time;
pub mod timeline;
pub mod trace;
