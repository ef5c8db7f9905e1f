// Copyright 2026 the Scrubline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Media source selection.
//!
//! Every surface ships a fixed [`AssetTable`] mapping orientation and
//! resolution class to static paths. [`select_sources`] turns a
//! [`ScreenProfile`] into an ordered [`CandidateList`] (primary first,
//! fallback second) and [`CandidateCursor`] walks it strictly forward, so a
//! reference that failed once is never attempted again.

use alloc::vec::Vec;
use core::fmt;

use crate::profile::{ScreenClass, ScreenProfile};

/// Build-time table of media paths for one surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssetTable {
    /// Portrait-orientation asset for compact viewports.
    pub vertical: &'static str,
    /// Landscape asset at standard resolution.
    pub standard: &'static str,
    /// Landscape asset for high-resolution viewports.
    pub high_res: &'static str,
    /// Alternate landscape encoding used as the standard fallback.
    pub alternate: &'static str,
}

impl AssetTable {
    /// Assets for the full-bleed page background.
    pub const HERO: Self = Self {
        vertical: "/videos/hero-vertical.mp4",
        standard: "/videos/hero-1080p.mp4",
        high_res: "/videos/hero-4k.mp4",
        alternate: "/videos/hero-1080p.webm",
    };

    /// Assets for the secondary page background.
    pub const SECONDARY: Self = Self {
        vertical: "/videos/section-vertical.mp4",
        standard: "/videos/section-1080p.mp4",
        high_res: "/videos/section-1440p.mp4",
        alternate: "/videos/section-1080p.webm",
    };

    /// Assets for the small logo accent clip.
    pub const ACCENT: Self = Self {
        vertical: "/videos/logo-square.mp4",
        standard: "/videos/logo-480p.mp4",
        high_res: "/videos/logo-720p.mp4",
        alternate: "/videos/logo-480p.webm",
    };
}

/// Priority role of a [`SourceCandidate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceRole {
    /// Preferred asset for the profile.
    Primary,
    /// Degraded or alternate asset tried after the primary fails.
    Fallback,
}

impl SourceRole {
    /// Returns a short label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
        }
    }
}

/// One media asset to attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceCandidate {
    /// Path or URI of the asset.
    pub reference: &'static str,
    /// Priority role.
    pub role: SourceRole,
}

impl fmt::Display for SourceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reference, self.role.as_str())
    }
}

/// Ordered, immutable list of candidates for one profile.
///
/// Duplicate references are removed at construction so that a fallback
/// identical to the primary is never retried.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateList {
    items: Vec<SourceCandidate>,
}

impl CandidateList {
    /// Builds a list, keeping the first occurrence of each reference.
    #[must_use]
    pub fn new(candidates: impl IntoIterator<Item = SourceCandidate>) -> Self {
        let mut items: Vec<SourceCandidate> = Vec::new();
        for candidate in candidates {
            if items.iter().all(|c| c.reference != candidate.reference) {
                items.push(candidate);
            }
        }
        Self { items }
    }

    /// Returns the number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the candidate at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SourceCandidate> {
        self.items.get(index)
    }

    /// Iterates candidates in priority order.
    pub fn iter(&self) -> core::slice::Iter<'_, SourceCandidate> {
        self.items.iter()
    }
}

/// Maps a profile to its candidates, highest priority first.
///
/// | class    | primary    | fallback    |
/// |----------|------------|-------------|
/// | compact  | `vertical` | `standard`  |
/// | high-res | `high_res` | `standard`  |
/// | standard | `standard` | `alternate` |
#[must_use]
pub fn select_sources(profile: &ScreenProfile, table: &AssetTable) -> CandidateList {
    let (primary, fallback) = match profile.class() {
        ScreenClass::Compact => (table.vertical, table.standard),
        ScreenClass::HighRes => (table.high_res, table.standard),
        ScreenClass::Standard => (table.standard, table.alternate),
    };
    CandidateList::new([
        SourceCandidate {
            reference: primary,
            role: SourceRole::Primary,
        },
        SourceCandidate {
            reference: fallback,
            role: SourceRole::Fallback,
        },
    ])
}

/// Forward-only walk over a [`CandidateList`].
#[derive(Clone, Debug, Default)]
pub struct CandidateCursor {
    list: CandidateList,
    next: usize,
}

impl CandidateCursor {
    /// Starts a walk at the first candidate.
    #[must_use]
    pub fn new(list: CandidateList) -> Self {
        Self { list, next: 0 }
    }

    /// Returns the next untried candidate with its index, or `None` once the
    /// list is exhausted.
    pub fn advance(&mut self) -> Option<(usize, SourceCandidate)> {
        let index = self.next;
        let candidate = *self.list.get(index)?;
        self.next += 1;
        Some((index, candidate))
    }

    /// Returns the number of candidates handed out so far.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.next
    }

    /// Returns the underlying list.
    #[must_use]
    pub fn list(&self) -> &CandidateList {
        &self.list
    }
}
