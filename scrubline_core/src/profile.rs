// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport classification.
//!
//! [`classify`] turns window dimensions into a [`ScreenProfile`]. Hosts call
//! it on every `resize`, but downstream source selection only cares about the
//! coarse [`ScreenClass`]: [`ProfileTracker`] filters resize ticks down to
//! class *changes* so a window drag does not reload media on every pixel.

use core::fmt;

/// Width breakpoints used by [`classify_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProfileThresholds {
    /// Widths strictly below this are compact.
    pub compact_below: u32,
    /// Widths at or above this are high-resolution.
    pub high_res_from: u32,
}

impl ProfileThresholds {
    /// Phone-sized below 768 px, high-resolution from 2560 px.
    pub const DEFAULT: Self = Self {
        compact_below: 768,
        high_res_from: 2560,
    };
}

impl Default for ProfileThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Coarse device class derived from a [`ScreenProfile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScreenClass {
    /// Narrow, usually portrait, viewport.
    Compact,
    /// Ordinary desktop viewport.
    Standard,
    /// Very wide or high-density viewport.
    HighRes,
}

impl ScreenClass {
    /// Returns a short label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Standard => "standard",
            Self::HighRes => "high-res",
        }
    }
}

impl fmt::Display for ScreenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of the current viewport.
///
/// Always recomputed from live dimensions; never cached across resizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScreenProfile {
    /// Viewport width in CSS pixels.
    pub width: u32,
    /// Viewport height in CSS pixels.
    pub height: u32,
    /// Whether the viewport is below the compact breakpoint.
    pub is_compact: bool,
    /// Whether the viewport is at or above the high-resolution breakpoint.
    pub is_high_res: bool,
}

impl ScreenProfile {
    /// Returns the coarse class of this profile.
    #[must_use]
    pub const fn class(&self) -> ScreenClass {
        if self.is_compact {
            ScreenClass::Compact
        } else if self.is_high_res {
            ScreenClass::HighRes
        } else {
            ScreenClass::Standard
        }
    }
}

/// Classifies a viewport using [`ProfileThresholds::DEFAULT`].
#[must_use]
pub const fn classify(width: u32, height: u32) -> ScreenProfile {
    classify_with(ProfileThresholds::DEFAULT, width, height)
}

/// Classifies a viewport using custom breakpoints.
#[must_use]
pub const fn classify_with(thresholds: ProfileThresholds, width: u32, height: u32) -> ScreenProfile {
    let is_compact = width < thresholds.compact_below;
    ScreenProfile {
        width,
        height,
        is_compact,
        is_high_res: !is_compact && width >= thresholds.high_res_from,
    }
}

/// Reports a [`ScreenProfile`] only when its [`ScreenClass`] changes.
#[derive(Clone, Debug, Default)]
pub struct ProfileTracker {
    thresholds: ProfileThresholds,
    last: Option<ScreenClass>,
}

impl ProfileTracker {
    /// Creates a tracker that has not observed any viewport yet.
    #[must_use]
    pub const fn new(thresholds: ProfileThresholds) -> Self {
        Self {
            thresholds,
            last: None,
        }
    }

    /// Classifies the viewport and returns the profile if its class differs
    /// from the previously observed one. The first observation always
    /// reports.
    pub fn observe(&mut self, width: u32, height: u32) -> Option<ScreenProfile> {
        let profile = classify_with(self.thresholds, width, height);
        let class = profile.class();
        if self.last == Some(class) {
            return None;
        }
        self.last = Some(class);
        Some(profile)
    }

    /// Returns the class of the last observed viewport, if any.
    #[must_use]
    pub const fn current(&self) -> Option<ScreenClass> {
        self.last
    }

    /// Forgets the last observation so the next one reports unconditionally.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoints() {
        assert_eq!(classify(767, 1000).class(), ScreenClass::Compact);
        assert_eq!(classify(768, 1000).class(), ScreenClass::Standard);
        assert_eq!(classify(2559, 1440).class(), ScreenClass::Standard);
        assert_eq!(classify(2560, 1440).class(), ScreenClass::HighRes);
    }

    #[test]
    fn profile_carries_dimensions() {
        let p = classify(390, 844);
        assert_eq!((p.width, p.height), (390, 844));
        assert!(p.is_compact);
        assert!(!p.is_high_res);
    }

    #[test]
    fn custom_thresholds() {
        let t = ProfileThresholds {
            compact_below: 1024,
            high_res_from: 1920,
        };
        assert_eq!(classify_with(t, 1000, 700).class(), ScreenClass::Compact);
        assert_eq!(classify_with(t, 1920, 1080).class(), ScreenClass::HighRes);
    }

    #[test]
    fn tracker_reports_only_class_changes() {
        let mut tracker = ProfileTracker::default();
        assert!(tracker.observe(1280, 800).is_some());
        // Same class, different size.
        assert!(tracker.observe(1300, 820).is_none());
        assert!(tracker.observe(1900, 1000).is_none());

        let changed = tracker.observe(600, 900).unwrap();
        assert_eq!(changed.class(), ScreenClass::Compact);
        assert_eq!(tracker.current(), Some(ScreenClass::Compact));

        tracker.reset();
        assert!(tracker.observe(600, 900).is_some());
    }
}
