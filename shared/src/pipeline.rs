//! Bookkeeping for the display pipeline.
//!
//! Every collection selection bumps a [`Generation`]; every in-range index
//! selection hands out a [`ValidationTicket`]. Asynchronous completions carry
//! the token they were started with, and anything that no longer matches the
//! current token is dropped without touching state. Only the latest selection
//! at each level can ever reach the screen.

use serde::{Deserialize, Serialize};

use crate::model::{CollectionId, ImageList};
use crate::navigation::NavigationIndex;
use crate::RetryPolicy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationTicket {
    generation: Generation,
    sequence: u64,
}

impl ValidationTicket {
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.sequence
    }
}

/// A list entry picked for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub ticket: ValidationTicket,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStep {
    /// The failure belongs to superseded work.
    Stale,
    Retry { attempt: u32, delay_ms: u64 },
    Exhausted { attempts: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    Resolving {
        collection: CollectionId,
        attempt: u32,
    },
    Ready {
        collection: CollectionId,
        list: ImageList,
    },
    Failed {
        collection: CollectionId,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DisplayPipeline {
    generation: Generation,
    phase: Phase,
    sequence: u64,
    pending: Option<ValidationTicket>,
}

impl DisplayPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes all work for the previous selection.
    pub fn begin(&mut self, collection: CollectionId) -> Generation {
        self.generation = self.generation.next();
        self.phase = Phase::Resolving {
            collection,
            attempt: 1,
        };
        self.pending = None;
        self.generation
    }

    #[must_use]
    pub fn collection(&self) -> Option<&CollectionId> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Resolving { collection, .. }
            | Phase::Ready { collection, .. }
            | Phase::Failed { collection } => Some(collection),
        }
    }

    #[must_use]
    pub fn list(&self) -> Option<&ImageList> {
        match &self.phase {
            Phase::Ready { list, .. } => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_resolving(&self, generation: Generation) -> bool {
        generation == self.generation && matches!(self.phase, Phase::Resolving { .. })
    }

    #[must_use]
    pub fn is_attempt_current(&self, generation: Generation, attempt: u32) -> bool {
        generation == self.generation
            && matches!(self.phase, Phase::Resolving { attempt: current, .. } if current == attempt)
    }

    /// Returns `false` when the list belongs to a superseded selection.
    pub fn list_ready(&mut self, generation: Generation, list: ImageList) -> bool {
        if !self.is_resolving(generation) {
            return false;
        }
        let Phase::Resolving { collection, .. } = std::mem::take(&mut self.phase) else {
            return false;
        };
        self.phase = Phase::Ready { collection, list };
        true
    }

    /// Picks the entry at `index`; out-of-range indices leave pending work alone.
    pub fn select(&mut self, index: NavigationIndex) -> Option<Candidate> {
        let url = self.list()?.get(index)?.to_string();

        self.sequence = self.sequence.wrapping_add(1);
        let ticket = ValidationTicket {
            generation: self.generation,
            sequence: self.sequence,
        };
        self.pending = Some(ticket);

        Some(Candidate { ticket, url })
    }

    /// Returns `true` when `ticket` is the latest validation and clears it.
    pub fn settle(&mut self, ticket: ValidationTicket) -> bool {
        if self.pending == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn fail(&mut self, generation: Generation, policy: &RetryPolicy) -> FailureStep {
        if generation != self.generation {
            return FailureStep::Stale;
        }

        match &mut self.phase {
            Phase::Resolving { attempt, .. } if *attempt < policy.attempts() => {
                let failed = *attempt;
                *attempt += 1;
                FailureStep::Retry {
                    attempt: *attempt,
                    delay_ms: policy.delay_ms(failed),
                }
            }
            Phase::Resolving { collection, attempt } => {
                let attempts = *attempt;
                let collection = collection.clone();
                self.phase = Phase::Failed { collection };
                self.pending = None;
                FailureStep::Exhausted { attempts }
            }
            _ => FailureStep::Stale,
        }
    }
}
