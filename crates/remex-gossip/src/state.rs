use crate::{GossipKey, GossipRecord};
use std::collections::HashSet;
use tracing::debug;

/// Whether an arriving record is new to this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// First sighting: merge the delta and re-broadcast.
    Fresh,
    /// Seen before: drop without forwarding.
    Duplicate,
}

/// Per-client duplicate suppression for the epidemic broadcast.
///
/// The seen-set only grows for the lifetime of a run; flooding relies on it
/// to terminate, since a record can revisit a node over a different link
/// than the one it originally arrived on.
#[derive(Debug, Default)]
pub struct GossipState {
    seen: HashSet<GossipKey>,
}

impl GossipState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record; `Fresh` exactly once per key.
    pub fn observe(&mut self, record: &GossipRecord) -> Disposition {
        if self.seen.insert(record.key()) {
            Disposition::Fresh
        } else {
            debug!(origin = %record.origin, round = %record.round, "Suppressing duplicate gossip");
            Disposition::Duplicate
        }
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
