//! Dependency tracking between a generator and the objects it reads.
//!
//! Each evaluation starts a fresh list with [`DependencyTracker::begin`],
//! declares every external object it reads, and then asks whether the list
//! differs from the one of the previous evaluation.

use crate::types::{NodeId, Revision};

/// Host capability that remembers which external objects a generator read.
pub trait DependencyTracker {
    /// Starts a new dependency list for the current evaluation.
    fn begin(&mut self);

    /// Records that the current evaluation reads `object` as of `revision`.
    fn declare(&mut self, object: NodeId, revision: Revision);

    /// Compares the current list with the previous evaluation's and makes
    /// it the new reference. Returns `true` if anything changed.
    fn compare_with_previous(&mut self) -> bool;
}

/// Tracker that compares declared objects and their change stamps.
#[derive(Clone, Debug, Default)]
pub struct RevisionTracker {
    previous: Vec<(NodeId, Revision)>,
    current: Vec<(NodeId, Revision)>,
}

impl RevisionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects declared since the last [`DependencyTracker::begin`].
    pub fn declared(&self) -> &[(NodeId, Revision)] {
        &self.current
    }
}

impl DependencyTracker for RevisionTracker {
    fn begin(&mut self) {
        self.current.clear();
    }

    fn declare(&mut self, object: NodeId, revision: Revision) {
        self.current.push((object, revision));
    }

    fn compare_with_previous(&mut self) -> bool {
        let changed = self.current != self.previous;
        self.previous.clone_from(&self.current);
        changed
    }
}
