//! Deduplication types.

use crate::models::{RankedRepository, RepoId, Repository};
use serde::Serialize;

/// Anything that carries a repository identity.
///
/// The seen-repo cache filters and records any sequence of identified items,
/// so both raw and ranked repositories can pass through it.
pub trait Identified {
    /// Returns the identity, or `None` when the item cannot be tracked.
    fn identity(&self) -> Option<&RepoId>;
}

impl Identified for Repository {
    fn identity(&self) -> Option<&RepoId> {
        self.id()
    }
}

impl Identified for RankedRepository {
    fn identity(&self) -> Option<&RepoId> {
        self.id()
    }
}

impl<T: Identified + ?Sized> Identified for &T {
    fn identity(&self) -> Option<&RepoId> {
        (**self).identity()
    }
}

/// Outcome of a cache sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SweepResult {
    /// Entries removed because they aged out or had an unparseable date.
    pub removed: usize,
    /// Entries still inside the retention window.
    pub retained: usize,
    /// Whether the store was written back.
    pub persisted: bool,
}
