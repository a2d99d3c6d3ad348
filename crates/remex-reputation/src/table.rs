use crate::{CounterPair, ReputationDelta};
use remex_types::WorkerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Aggregated reputation a client accumulates across rounds.
///
/// Grows only by additive merge; cumulative counters are never decremented
/// or overwritten wholesale, so averages reflect every delta ever merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReputationTable {
    cumulative: BTreeMap<WorkerId, CounterPair>,
}

impl ReputationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Additively merge one gossip delta.
    pub fn merge(&mut self, delta: &ReputationDelta) {
        for (worker, pair) in delta.iter() {
            let entry = self.cumulative.entry(worker).or_default();
            entry.correct += pair.correct;
            entry.trials += pair.trials;
        }
        debug!(workers = self.cumulative.len(), "Merged reputation delta");
    }

    pub fn get(&self, worker: WorkerId) -> CounterPair {
        self.cumulative.get(&worker).copied().unwrap_or_default()
    }

    /// Average correctness rate; 0 when the worker has no trials.
    pub fn average_score(&self, worker: WorkerId) -> f64 {
        self.get(worker).average()
    }

    /// All known workers ranked by descending average score, ties broken by
    /// worker id ascending so the ranking is deterministic.
    pub fn ranked(&self, workers: &[WorkerId]) -> Vec<WorkerId> {
        let mut ranked: Vec<WorkerId> = workers.to_vec();
        ranked.sort_by(|a, b| {
            self.average_score(*b)
                .partial_cmp(&self.average_score(*a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.cmp(b))
        });
        ranked
    }

    pub fn iter(&self) -> impl Iterator<Item = (WorkerId, CounterPair)> + '_ {
        self.cumulative.iter().map(|(w, c)| (*w, *c))
    }
}
