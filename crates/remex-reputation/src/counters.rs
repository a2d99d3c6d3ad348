use crate::ReputationDelta;
use remex_types::WorkerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Correct/trial tallies for one worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterPair {
    pub correct: u64,
    pub trials: u64,
}

impl CounterPair {
    pub fn average(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.correct as f64 / self.trials as f64
        }
    }
}

/// Per-round tallies a client keeps for the workers it dispatched to.
///
/// Reset at the start of every round; `trials` is credited at dispatch time,
/// `correct` when a reply matches the chunk's majority value.
#[derive(Debug, Clone, Default)]
pub struct LocalCounters {
    counters: BTreeMap<WorkerId, CounterPair>,
}

impl LocalCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_trial(&mut self, worker: WorkerId) {
        self.counters.entry(worker).or_default().trials += 1;
    }

    pub fn record_correct(&mut self, worker: WorkerId) {
        self.counters.entry(worker).or_default().correct += 1;
    }

    pub fn get(&self, worker: WorkerId) -> CounterPair {
        self.counters.get(&worker).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WorkerId, CounterPair)> + '_ {
        self.counters.iter().map(|(w, c)| (*w, *c))
    }

    /// Snapshot the round's tallies as a gossip delta.
    pub fn to_delta(&self) -> ReputationDelta {
        ReputationDelta::from_entries(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_trial_average_is_zero() {
        assert_eq!(CounterPair::default().average(), 0.0);
    }

    #[test]
    fn test_trial_and_correct_accumulate() {
        let mut counters = LocalCounters::new();
        let w = WorkerId(3);
        counters.record_trial(w);
        counters.record_trial(w);
        counters.record_correct(w);
        assert_eq!(counters.get(w), CounterPair { correct: 1, trials: 2 });
        assert_eq!(counters.get(WorkerId(9)), CounterPair::default());
    }
}
