// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated media host.
//!
//! [`SimHost`] is cheap to clone; clones share one log, so a test can keep a
//! handle while the controller owns another. Loads complete only when the
//! test drains [`SimHost::take_reports`] and forwards them, which makes
//! stale and late reports easy to stage.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use scrubline_core::media::{LoadId, MediaHost, Transport};

/// How a scripted load completes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LoadOutcome {
    /// Metadata arrives with this duration (may be invalid on purpose).
    Ready(f64),
    /// The load errors.
    Fail,
    /// Nothing is ever reported.
    Stall,
}

/// A load report waiting to be delivered to the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Report {
    /// `loadedmetadata` with a duration.
    Ready(LoadId, f64),
    /// `error`.
    Error(LoadId),
}

#[derive(Debug, Default)]
struct SimState {
    default_duration: f64,
    outcomes: Vec<(&'static str, LoadOutcome)>,
    opened: Vec<(&'static str, LoadId)>,
    seeks: Vec<(LoadId, f64)>,
    pauses: u32,
    released: Vec<LoadId>,
    late_writes: u32,
    reports: Vec<Report>,
}

/// Scripted [`MediaHost`] that records every transport call.
#[derive(Clone, Debug)]
pub struct SimHost {
    state: Rc<RefCell<SimState>>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl SimHost {
    /// Creates a host whose loads succeed with `default_duration` unless
    /// scripted otherwise.
    #[must_use]
    pub fn new(default_duration: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState {
                default_duration,
                ..SimState::default()
            })),
        }
    }

    /// Scripts the outcome for loads of `reference`.
    #[must_use]
    pub fn with_outcome(self, reference: &'static str, outcome: LoadOutcome) -> Self {
        self.state.borrow_mut().outcomes.push((reference, outcome));
        self
    }

    /// Queues an error for `load`, as if the element failed mid-playback.
    pub fn inject_error(&self, load: LoadId) {
        self.state.borrow_mut().reports.push(Report::Error(load));
    }

    /// Queues a metadata report for `load`, regardless of the script.
    pub fn inject_ready(&self, load: LoadId, duration: f64) {
        self.state
            .borrow_mut()
            .reports
            .push(Report::Ready(load, duration));
    }

    /// Drains pending reports in the order they were produced.
    pub fn take_reports(&self) -> Vec<Report> {
        core::mem::take(&mut self.state.borrow_mut().reports)
    }

    /// References opened so far, in order.
    #[must_use]
    pub fn opened(&self) -> Vec<&'static str> {
        self.state.borrow().opened.iter().map(|(r, _)| *r).collect()
    }

    /// Every position written, in order.
    #[must_use]
    pub fn seeks(&self) -> Vec<f64> {
        self.state.borrow().seeks.iter().map(|(_, p)| *p).collect()
    }

    /// Positions written to one load.
    #[must_use]
    pub fn seeks_for(&self, load: LoadId) -> Vec<f64> {
        self.state
            .borrow()
            .seeks
            .iter()
            .filter(|(l, _)| *l == load)
            .map(|(_, p)| *p)
            .collect()
    }

    /// Number of position writes so far.
    #[must_use]
    pub fn seek_count(&self) -> usize {
        self.state.borrow().seeks.len()
    }

    /// Number of pause calls.
    #[must_use]
    pub fn pauses(&self) -> u32 {
        self.state.borrow().pauses
    }

    /// Loads whose transport has been released.
    #[must_use]
    pub fn released(&self) -> Vec<LoadId> {
        self.state.borrow().released.clone()
    }

    /// Calls made on a transport after it was released.
    #[must_use]
    pub fn late_writes(&self) -> u32 {
        self.state.borrow().late_writes
    }

    fn outcome_for(&self, reference: &str) -> LoadOutcome {
        let state = self.state.borrow();
        state
            .outcomes
            .iter()
            .rev()
            .find(|(r, _)| *r == reference)
            .map_or(LoadOutcome::Ready(state.default_duration), |(_, o)| *o)
    }
}

impl MediaHost for SimHost {
    type Transport = SimTransport;

    fn open(&mut self, reference: &'static str, load: LoadId) -> SimTransport {
        let outcome = self.outcome_for(reference);
        let mut state = self.state.borrow_mut();
        state.opened.push((reference, load));
        match outcome {
            LoadOutcome::Ready(duration) => state.reports.push(Report::Ready(load, duration)),
            LoadOutcome::Fail => state.reports.push(Report::Error(load)),
            LoadOutcome::Stall => {}
        }
        SimTransport {
            load,
            released: false,
            state: Rc::clone(&self.state),
        }
    }
}

/// Transport produced by [`SimHost`].
#[derive(Debug)]
pub struct SimTransport {
    load: LoadId,
    released: bool,
    state: Rc<RefCell<SimState>>,
}

impl SimTransport {
    fn after_release(&self) -> bool {
        if self.released {
            self.state.borrow_mut().late_writes += 1;
        }
        self.released
    }
}

impl Transport for SimTransport {
    fn set_position(&mut self, secs: f64) {
        if !self.after_release() {
            self.state.borrow_mut().seeks.push((self.load, secs));
        }
    }

    fn pause(&mut self) {
        if !self.after_release() {
            self.state.borrow_mut().pauses += 1;
        }
    }

    fn release(&mut self) {
        if !self.after_release() {
            self.released = true;
            self.state.borrow_mut().released.push(self.load);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_outcomes_queue_reports() {
        let mut host = SimHost::new(4.0).with_outcome("/bad.mp4", LoadOutcome::Fail);
        let _a = host.open("/good.mp4", LoadId(1));
        let _b = host.open("/bad.mp4", LoadId(2));
        assert_eq!(
            host.take_reports(),
            [Report::Ready(LoadId(1), 4.0), Report::Error(LoadId(2))]
        );
        assert!(host.take_reports().is_empty());
    }

    #[test]
    fn released_transport_counts_late_writes() {
        let mut host = SimHost::default();
        let mut t = host.open("/a.mp4", LoadId(1));
        t.set_position(1.0);
        t.release();
        t.set_position(2.0);
        t.release();
        assert_eq!(host.seeks(), [1.0]);
        assert_eq!(host.released(), [LoadId(1)]);
        assert_eq!(host.late_writes(), 2);
    }
}
