// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Playable media resources.
//!
//! A [`MediaHandle`] wraps one host [`Transport`] (e.g. a `<video>` element)
//! and tracks its load state. Loading is asynchronous on every host, so the
//! host reports completion back through the owner of the handle, tagged with
//! the [`LoadId`] it was opened with. The handle turns those reports into
//! one-shot transitions:
//!
//! ```text
//!   Loading ──mark_ready──► Ready ──seek_to / seek_exact──► Ready
//!      │                      │
//!      └──mark_failed──► Failed ◄──mark_failed──┘
//! ```
//!
//! [`MediaHandle::dispose`] releases the transport; every later report is
//! ignored, which makes a late `loadedmetadata` after teardown a no-op.

use core::fmt;

/// Identifies one open attempt.
///
/// Controllers allocate a fresh id for every [`MediaHost::open`] call. Host
/// callbacks carry the id back so that reports for a superseded or disposed
/// handle can be recognised and dropped.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadId(pub u32);

impl LoadId {
    /// Returns the id that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoadId({})", self.0)
    }
}

/// Host media transport driven by position writes only.
///
/// Implementations must never start playback on their own; the controller
/// moves the picture exclusively through [`set_position`](Self::set_position).
pub trait Transport {
    /// Moves the playback position to `secs` (already clamped to the media
    /// duration).
    fn set_position(&mut self, secs: f64);

    /// Forces the transport into a paused state.
    fn pause(&mut self);

    /// Detaches listeners and frees the underlying resource.
    fn release(&mut self);
}

/// Creates transports for media references.
pub trait MediaHost {
    /// Transport type produced by this host.
    type Transport: Transport;

    /// Begins loading `reference` and returns its transport.
    ///
    /// The host later reports the outcome with the same `load` id, either as
    /// metadata (duration) or as an error.
    fn open(&mut self, reference: &'static str, load: LoadId) -> Self::Transport;
}

/// Load state of a [`MediaHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadyState {
    /// Not opened yet.
    Unloaded,
    /// Load in flight.
    Loading,
    /// Metadata available; seeking allowed.
    Ready,
    /// Load or decode failed.
    Failed,
}

/// Errors surfaced while loading a media candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MediaError {
    /// The host could not fetch or decode the asset.
    AssetLoad {
        /// The failed reference.
        reference: &'static str,
    },
    /// The host reported an unusable duration.
    InvalidDuration {
        /// The offending reference.
        reference: &'static str,
        /// The reported duration.
        duration: f64,
    },
}

impl MediaError {
    /// Returns the reference that failed.
    #[must_use]
    pub const fn reference(&self) -> &'static str {
        match self {
            Self::AssetLoad { reference } | Self::InvalidDuration { reference, .. } => reference,
        }
    }
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssetLoad { reference } => write!(f, "failed to load media asset {reference}"),
            Self::InvalidDuration {
                reference,
                duration,
            } => write!(f, "media asset {reference} reported invalid duration {duration}"),
        }
    }
}

impl core::error::Error for MediaError {}

/// One playable media resource and its load state.
pub struct MediaHandle<T: Transport> {
    reference: &'static str,
    load: LoadId,
    state: ReadyState,
    duration: Option<f64>,
    position: f64,
    epsilon: f64,
    transport: Option<T>,
}

impl<T: Transport> fmt::Debug for MediaHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaHandle")
            .field("reference", &self.reference)
            .field("load", &self.load)
            .field("state", &self.state)
            .field("duration", &self.duration)
            .field("position", &self.position)
            .field("epsilon", &self.epsilon)
            .field("disposed", &self.transport.is_none())
            .finish()
    }
}

impl<T: Transport> MediaHandle<T> {
    /// Opens `reference` on `host` and returns a handle in
    /// [`ReadyState::Loading`].
    ///
    /// `epsilon` is the seek dedupe tolerance in media seconds.
    pub fn open<H>(host: &mut H, reference: &'static str, load: LoadId, epsilon: f64) -> Self
    where
        H: MediaHost<Transport = T>,
    {
        let transport = host.open(reference, load);
        Self {
            reference,
            load,
            state: ReadyState::Loading,
            duration: None,
            position: 0.0,
            epsilon,
            transport: Some(transport),
        }
    }

    /// Returns the media reference.
    #[must_use]
    pub const fn reference(&self) -> &'static str {
        self.reference
    }

    /// Returns the load id this handle was opened with.
    #[must_use]
    pub const fn load_id(&self) -> LoadId {
        self.load
    }

    /// Returns the current load state.
    #[must_use]
    pub const fn ready_state(&self) -> ReadyState {
        self.state
    }

    /// Returns the intrinsic duration in seconds. `Some` iff
    /// [`ReadyState::Ready`].
    #[must_use]
    pub fn duration(&self) -> Option<f64> {
        match self.state {
            ReadyState::Ready => self.duration,
            _ => None,
        }
    }

    /// Returns the last position written to the transport. Only meaningful
    /// when ready.
    #[must_use]
    pub const fn position(&self) -> f64 {
        self.position
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.transport.is_none()
    }

    /// Applies the host's metadata report.
    ///
    /// The first report on a loading handle moves it to
    /// [`ReadyState::Ready`], pauses the transport and returns
    /// `Ok(Some(duration))`. Any later report, or a report after disposal,
    /// returns `Ok(None)`. A negative or non-finite duration fails the
    /// handle instead.
    pub fn mark_ready(&mut self, duration: f64) -> Result<Option<f64>, MediaError> {
        if self.state != ReadyState::Loading {
            return Ok(None);
        }
        let Some(transport) = self.transport.as_mut() else {
            return Ok(None);
        };
        if !duration.is_finite() || duration < 0.0 {
            self.state = ReadyState::Failed;
            return Err(MediaError::InvalidDuration {
                reference: self.reference,
                duration,
            });
        }
        transport.pause();
        self.state = ReadyState::Ready;
        self.duration = Some(duration);
        self.position = 0.0;
        Ok(Some(duration))
    }

    /// Applies the host's error report.
    ///
    /// Returns the error the first time a loading or ready handle fails;
    /// `None` for repeated reports or after disposal.
    pub fn mark_failed(&mut self) -> Option<MediaError> {
        if self.transport.is_none() {
            return None;
        }
        match self.state {
            ReadyState::Loading | ReadyState::Ready => {
                self.state = ReadyState::Failed;
                self.duration = None;
                Some(MediaError::AssetLoad {
                    reference: self.reference,
                })
            }
            ReadyState::Unloaded | ReadyState::Failed => None,
        }
    }

    /// Seeks to `position`, clamped to `[0, duration]`.
    ///
    /// Skips the write when the clamped target is within epsilon of the
    /// current position. Returns the position actually written, or `None`
    /// when nothing was written (not ready, disposed, NaN, or deduped).
    pub fn seek_to(&mut self, position: f64) -> Option<f64> {
        let clamped = self.clamp(position)?;
        if (clamped - self.position).abs() <= self.epsilon {
            return None;
        }
        self.write(clamped)
    }

    /// Seeks to `position` without the epsilon dedupe.
    ///
    /// Used where exactness matters more than decode cost, such as pinning
    /// the first frame.
    pub fn seek_exact(&mut self, position: f64) -> Option<f64> {
        let clamped = self.clamp(position)?;
        self.write(clamped)
    }

    /// Releases the transport. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.release();
        }
    }

    fn clamp(&self, position: f64) -> Option<f64> {
        if self.state != ReadyState::Ready || self.transport.is_none() || position.is_nan() {
            return None;
        }
        let duration = self.duration?;
        Some(position.clamp(0.0, duration))
    }

    fn write(&mut self, position: f64) -> Option<f64> {
        let transport = self.transport.as_mut()?;
        transport.set_position(position);
        self.position = position;
        Some(position)
    }
}

impl<T: Transport> Drop for MediaHandle<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum Op {
        Open(&'static str, LoadId),
        Seek(f64),
        Pause,
        Release,
    }

    #[derive(Clone, Debug, Default)]
    pub(crate) struct MockHost {
        pub(crate) ops: Rc<RefCell<Vec<Op>>>,
    }

    impl MockHost {
        pub(crate) fn seeks(&self) -> Vec<f64> {
            self.ops
                .borrow()
                .iter()
                .filter_map(|op| match op {
                    Op::Seek(p) => Some(*p),
                    _ => None,
                })
                .collect()
        }

        pub(crate) fn opened(&self) -> Vec<&'static str> {
            self.ops
                .borrow()
                .iter()
                .filter_map(|op| match op {
                    Op::Open(r, _) => Some(*r),
                    _ => None,
                })
                .collect()
        }

        pub(crate) fn count(&self, wanted: &Op) -> usize {
            self.ops.borrow().iter().filter(|op| *op == wanted).count()
        }
    }

    #[derive(Debug)]
    pub(crate) struct MockTransport {
        ops: Rc<RefCell<Vec<Op>>>,
    }

    impl Transport for MockTransport {
        fn set_position(&mut self, secs: f64) {
            self.ops.borrow_mut().push(Op::Seek(secs));
        }

        fn pause(&mut self) {
            self.ops.borrow_mut().push(Op::Pause);
        }

        fn release(&mut self) {
            self.ops.borrow_mut().push(Op::Release);
        }
    }

    impl MediaHost for MockHost {
        type Transport = MockTransport;

        fn open(&mut self, reference: &'static str, load: LoadId) -> MockTransport {
            self.ops.borrow_mut().push(Op::Open(reference, load));
            MockTransport {
                ops: Rc::clone(&self.ops),
            }
        }
    }

    fn ready_handle(host: &mut MockHost, duration: f64) -> MediaHandle<MockTransport> {
        let mut handle = MediaHandle::open(host, "/clip.mp4", LoadId(1), 0.01);
        assert_eq!(handle.mark_ready(duration), Ok(Some(duration)));
        handle
    }

    #[test]
    fn open_starts_loading_without_duration() {
        let mut host = MockHost::default();
        let handle = MediaHandle::open(&mut host, "/clip.mp4", LoadId(7), 0.01);
        assert_eq!(handle.ready_state(), ReadyState::Loading);
        assert_eq!(handle.duration(), None);
        assert_eq!(host.opened(), ["/clip.mp4"]);
    }

    #[test]
    fn ready_fires_once_and_pauses() {
        let mut host = MockHost::default();
        let mut handle = ready_handle(&mut host, 10.0);
        assert_eq!(handle.ready_state(), ReadyState::Ready);
        assert_eq!(handle.duration(), Some(10.0));
        assert_eq!(host.count(&Op::Pause), 1);

        assert_eq!(handle.mark_ready(12.0), Ok(None));
        assert_eq!(handle.duration(), Some(10.0));
        assert_eq!(host.count(&Op::Pause), 1);
    }

    #[test]
    fn invalid_duration_fails_the_handle() {
        let mut host = MockHost::default();
        let mut handle = MediaHandle::open(&mut host, "/clip.mp4", LoadId(1), 0.01);
        let err = handle.mark_ready(f64::INFINITY).unwrap_err();
        assert_eq!(err.reference(), "/clip.mp4");
        assert_eq!(handle.ready_state(), ReadyState::Failed);
        assert_eq!(handle.duration(), None);
    }

    #[test]
    fn failure_reports_once() {
        let mut host = MockHost::default();
        let mut handle = MediaHandle::open(&mut host, "/clip.mp4", LoadId(1), 0.01);
        assert_eq!(
            handle.mark_failed(),
            Some(MediaError::AssetLoad {
                reference: "/clip.mp4"
            })
        );
        assert_eq!(handle.mark_failed(), None);
        assert_eq!(handle.mark_ready(3.0), Ok(None));
    }

    #[test]
    fn seek_requires_ready() {
        let mut host = MockHost::default();
        let mut handle = MediaHandle::open(&mut host, "/clip.mp4", LoadId(1), 0.01);
        assert_eq!(handle.seek_to(1.0), None);
        assert!(host.seeks().is_empty());
    }

    #[test]
    fn seek_clamps_and_dedupes() {
        let mut host = MockHost::default();
        let mut handle = ready_handle(&mut host, 10.0);

        assert_eq!(handle.seek_to(12.0), Some(10.0));
        assert_eq!(handle.seek_to(-1.0), Some(0.0));
        assert_eq!(handle.seek_to(0.005), None);
        assert_eq!(handle.seek_to(f64::NAN), None);
        assert_eq!(handle.seek_to(4.0), Some(4.0));
        assert_eq!(host.seeks(), [10.0, 0.0, 4.0]);
        assert!((handle.position() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn seek_exact_skips_dedupe() {
        let mut host = MockHost::default();
        let mut handle = ready_handle(&mut host, 10.0);
        handle.seek_to(0.5);
        handle.seek_exact(0.495);
        assert_eq!(host.seeks(), [0.5, 0.495]);
    }

    #[test]
    fn dispose_is_idempotent_and_silences_reports() {
        let mut host = MockHost::default();
        let mut handle = MediaHandle::open(&mut host, "/clip.mp4", LoadId(1), 0.01);
        handle.dispose();
        handle.dispose();
        assert!(handle.is_disposed());
        assert_eq!(host.count(&Op::Release), 1);

        assert_eq!(handle.mark_ready(5.0), Ok(None));
        assert_eq!(handle.mark_failed(), None);
        assert_eq!(handle.seek_exact(1.0), None);
        assert!(host.seeks().is_empty());
    }

    #[test]
    fn drop_releases_transport() {
        let mut host = MockHost::default();
        drop(MediaHandle::open(&mut host, "/clip.mp4", LoadId(1), 0.01));
        assert_eq!(host.count(&Op::Release), 1);
    }
}
