//! Turns forward/back steps into an absolute position within the current list.
//!
//! The index is a plain running sum that resets to zero when a new collection
//! starts resolving. It is never clamped or wrapped: out-of-range positions are
//! suppressed by the display pipeline instead.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationOffset {
    Forward,
    Back,
}

impl NavigationOffset {
    #[must_use]
    pub const fn delta(self) -> i64 {
        match self {
            Self::Forward => 1,
            Self::Back => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NavigationIndex(i64);

impl NavigationIndex {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Position as a list slot, if it falls inside `[0, len)`.
    #[must_use]
    pub fn slot(self, len: usize) -> Option<usize> {
        usize::try_from(self.0).ok().filter(|slot| *slot < len)
    }

    #[must_use]
    fn step(self, offset: NavigationOffset) -> Self {
        Self(self.0.saturating_add(offset.delta()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationReducer {
    index: NavigationIndex,
}

impl NavigationReducer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn current(&self) -> NavigationIndex {
        self.index
    }

    pub fn reset(&mut self) -> NavigationIndex {
        self.index = NavigationIndex::ZERO;
        self.index
    }

    pub fn apply(&mut self, offset: NavigationOffset) -> NavigationIndex {
        self.index = self.index.step(offset);
        self.index
    }
}
