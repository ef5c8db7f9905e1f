// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controller configuration.
//!
//! A [`TimelineConfig`] is everything that distinguishes one surface from
//! another: how scroll maps to media time, the feel constants, and the asset
//! table. The presets cover the three surfaces a page typically mounts; all
//! values are empirically chosen UI-feel parameters and can be tuned with the
//! `with_*` setters.

use core::fmt;

use crate::profile::ProfileThresholds;
use crate::source::AssetTable;
use crate::time::Duration;

/// How scroll progress drives the media position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MappingMode {
    /// Seek on every sample whose target differs from the current position
    /// by more than `threshold` seconds.
    Direct {
        /// Minimum position change, in seconds, worth a seek.
        threshold: f64,
    },
    /// Ease toward the target every animation frame with first-order
    /// exponential smoothing: `smoothed += (target - smoothed) * alpha`.
    Smoothed {
        /// Smoothing factor in `(0, 1]`. Lower is smoother and slower.
        alpha: f64,
    },
}

impl MappingMode {
    /// Direct mapping with a 50 ms seek threshold.
    pub const DIRECT: Self = Self::Direct { threshold: 0.05 };

    /// Smoothed mapping with `alpha = 0.15`.
    pub const SMOOTHED: Self = Self::Smoothed { alpha: 0.15 };
}

/// Invalid configuration values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// Smoothing factor outside `(0, 1]`.
    AlphaOutOfRange(f64),
    /// Negative or non-finite direct-mode threshold.
    InvalidThreshold(f64),
    /// Non-positive or non-finite convergence tolerance.
    InvalidEpsilon(f64),
    /// Top-of-page snap outside `[0, 1)`.
    TopSnapOutOfRange(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlphaOutOfRange(v) => write!(f, "smoothing alpha {v} is outside (0, 1]"),
            Self::InvalidThreshold(v) => write!(f, "seek threshold {v} must be a finite value >= 0"),
            Self::InvalidEpsilon(v) => write!(f, "epsilon {v} must be a finite value > 0"),
            Self::TopSnapOutOfRange(v) => write!(f, "top snap {v} is outside [0, 1)"),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Configuration for one [`TimelineController`](crate::timeline::TimelineController).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineConfig {
    /// Mapping strategy.
    pub mode: MappingMode,
    /// Tolerance in media seconds: seek dedupe and smoothing convergence.
    pub epsilon: f64,
    /// Progress at or below which the media is pinned to its first frame.
    pub top_snap: f64,
    /// Minimum spacing between scroll samples.
    pub min_sample_interval: Duration,
    /// Viewport breakpoints.
    pub thresholds: ProfileThresholds,
    /// Media assets for this surface.
    pub assets: AssetTable,
    /// CSS color painted when no candidate can be loaded.
    pub fallback_color: &'static str,
}

impl TimelineConfig {
    /// Full-bleed page background: direct seeking, no visual lag.
    #[must_use]
    pub const fn full_bleed() -> Self {
        Self {
            mode: MappingMode::DIRECT,
            epsilon: 0.01,
            top_snap: 0.001,
            min_sample_interval: Duration::from_millis(8),
            thresholds: ProfileThresholds::DEFAULT,
            assets: AssetTable::HERO,
            fallback_color: "#0b0d12",
        }
    }

    /// Secondary page background: heavily smoothed.
    #[must_use]
    pub const fn secondary() -> Self {
        Self {
            mode: MappingMode::Smoothed { alpha: 0.1 },
            assets: AssetTable::SECONDARY,
            fallback_color: "#14171f",
            ..Self::full_bleed()
        }
    }

    /// Small logo accent clip: lightly smoothed.
    #[must_use]
    pub const fn accent() -> Self {
        Self {
            mode: MappingMode::SMOOTHED,
            assets: AssetTable::ACCENT,
            fallback_color: "transparent",
            ..Self::full_bleed()
        }
    }

    /// Replaces the mapping mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: MappingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replaces the convergence tolerance.
    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Replaces the top-of-page snap.
    #[must_use]
    pub const fn with_top_snap(mut self, top_snap: f64) -> Self {
        self.top_snap = top_snap;
        self
    }

    /// Replaces the minimum sample spacing.
    #[must_use]
    pub const fn with_min_sample_interval(mut self, interval: Duration) -> Self {
        self.min_sample_interval = interval;
        self
    }

    /// Replaces the viewport breakpoints.
    #[must_use]
    pub const fn with_thresholds(mut self, thresholds: ProfileThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Replaces the asset table.
    #[must_use]
    pub const fn with_assets(mut self, assets: AssetTable) -> Self {
        self.assets = assets;
        self
    }

    /// Replaces the fallback background color.
    #[must_use]
    pub const fn with_fallback_color(mut self, color: &'static str) -> Self {
        self.fallback_color = color;
        self
    }

    /// Checks that every tunable lies in its valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.mode {
            MappingMode::Direct { threshold } => {
                if !threshold.is_finite() || threshold < 0.0 {
                    return Err(ConfigError::InvalidThreshold(threshold));
                }
            }
            MappingMode::Smoothed { alpha } => {
                if !(alpha > 0.0 && alpha <= 1.0) {
                    return Err(ConfigError::AlphaOutOfRange(alpha));
                }
            }
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(ConfigError::InvalidEpsilon(self.epsilon));
        }
        if !(0.0..1.0).contains(&self.top_snap) {
            return Err(ConfigError::TopSnapOutOfRange(self.top_snap));
        }
        Ok(())
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self::full_bleed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for config in [
            TimelineConfig::full_bleed(),
            TimelineConfig::secondary(),
            TimelineConfig::accent(),
        ] {
            assert_eq!(config.validate(), Ok(()));
        }
    }

    #[test]
    fn presets_differ_in_mode_and_assets() {
        assert_eq!(TimelineConfig::full_bleed().mode, MappingMode::DIRECT);
        assert!(matches!(
            TimelineConfig::accent().mode,
            MappingMode::Smoothed { .. }
        ));
        assert_eq!(TimelineConfig::accent().assets, AssetTable::ACCENT);
        assert_eq!(TimelineConfig::secondary().assets, AssetTable::SECONDARY);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let base = TimelineConfig::full_bleed();
        assert_eq!(
            base.with_mode(MappingMode::Smoothed { alpha: 0.0 }).validate(),
            Err(ConfigError::AlphaOutOfRange(0.0))
        );
        assert_eq!(
            base.with_mode(MappingMode::Direct { threshold: -1.0 })
                .validate(),
            Err(ConfigError::InvalidThreshold(-1.0))
        );
        assert_eq!(
            base.with_epsilon(0.0).validate(),
            Err(ConfigError::InvalidEpsilon(0.0))
        );
        assert_eq!(
            base.with_top_snap(1.0).validate(),
            Err(ConfigError::TopSnapOutOfRange(1.0))
        );
        assert!(matches!(
            base.with_mode(MappingMode::Smoothed { alpha: f64::NAN })
                .validate(),
            Err(ConfigError::AlphaOutOfRange(_))
        ));
    }
}
