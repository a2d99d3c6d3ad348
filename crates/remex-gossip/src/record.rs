use remex_reputation::ReputationDelta;
use remex_types::{ClientId, RoundId};
use serde::{Deserialize, Serialize};

/// A reputation delta as it travels between clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GossipRecord {
    pub origin: ClientId,
    /// Publication time in seconds; part of the dedup key, so two
    /// structurally identical deltas published at different times are
    /// distinct messages.
    pub timestamp: f64,
    pub round: RoundId,
    pub delta: ReputationDelta,
}

impl GossipRecord {
    pub fn new(origin: ClientId, timestamp: f64, round: RoundId, delta: ReputationDelta) -> Self {
        Self {
            origin,
            timestamp,
            round,
            delta,
        }
    }

    /// Duplicate-suppression key: (timestamp, canonical delta string).
    ///
    /// The timestamp is keyed by bit pattern so equal floats compare
    /// exactly and the key is hashable.
    pub fn key(&self) -> GossipKey {
        GossipKey {
            timestamp_bits: self.timestamp.to_bits(),
            payload: self.delta.encode(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GossipKey {
    pub timestamp_bits: u64,
    pub payload: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use remex_reputation::CounterPair;
    use remex_types::WorkerId;

    fn delta() -> ReputationDelta {
        ReputationDelta::from_entries([(WorkerId(1), CounterPair { correct: 2, trials: 3 })])
    }

    #[test]
    fn test_same_delta_different_times_are_distinct() {
        let a = GossipRecord::new(ClientId(0), 1.0, RoundId(1), delta());
        let b = GossipRecord::new(ClientId(0), 2.0, RoundId(1), delta());
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_key_ignores_origin_and_round() {
        let a = GossipRecord::new(ClientId(0), 1.5, RoundId(1), delta());
        let b = GossipRecord::new(ClientId(7), 1.5, RoundId(2), delta());
        assert_eq!(a.key(), b.key());
    }
}
