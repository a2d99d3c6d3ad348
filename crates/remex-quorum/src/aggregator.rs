use remex_types::{ChunkId, RoundId, WorkerId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// A worker's answer for one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub round: RoundId,
    pub chunk: ChunkId,
    pub worker: WorkerId,
    pub value: i64,
}

/// What recording one reply did to its chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Round id did not match the aggregator's round; dropped silently.
    Stale,
    /// Recorded, threshold not yet reached.
    Pending,
    /// Recorded after the chunk already finalized; no re-trigger.
    Late,
    /// This reply pushed the chunk over its threshold.
    Finalized { majority: i64, correct: Vec<WorkerId> },
}

/// Collects replies for one round and votes each chunk to a majority value.
///
/// A chunk finalizes exactly once, when its reply count reaches the
/// threshold (floor(n/2) + 1). Ties for most-frequent value break toward
/// the smallest value so the vote is deterministic.
pub struct RoundAggregator {
    round: RoundId,
    threshold: usize,
    chunk_count: usize,
    replies: HashMap<ChunkId, Vec<(WorkerId, i64)>>,
    majorities: BTreeMap<ChunkId, i64>,
}

impl RoundAggregator {
    pub fn new(round: RoundId, chunk_count: usize, threshold: usize) -> Self {
        Self {
            round,
            threshold,
            chunk_count,
            replies: HashMap::new(),
            majorities: BTreeMap::new(),
        }
    }

    pub fn round(&self) -> RoundId {
        self.round
    }

    /// Record one reply and finalize its chunk if the threshold is reached.
    pub fn record(&mut self, reply: Reply) -> ChunkOutcome {
        if reply.round != self.round {
            debug!(
                reply_round = %reply.round,
                current_round = %self.round,
                worker = %reply.worker,
                "Dropping stale reply"
            );
            return ChunkOutcome::Stale;
        }

        let already_final = self.majorities.contains_key(&reply.chunk);
        let replies = self.replies.entry(reply.chunk).or_default();
        replies.push((reply.worker, reply.value));

        if already_final {
            return ChunkOutcome::Late;
        }
        if replies.len() < self.threshold {
            return ChunkOutcome::Pending;
        }

        let (majority, correct) = majority_vote(replies);
        self.majorities.insert(reply.chunk, majority);
        debug!(
            chunk = %reply.chunk,
            round = %self.round,
            majority,
            correct = correct.len(),
            total = replies.len(),
            "Chunk reached majority"
        );
        ChunkOutcome::Finalized { majority, correct }
    }

    /// True once every chunk of the round has a finalized majority.
    pub fn is_complete(&self) -> bool {
        self.majorities.len() == self.chunk_count
    }

    /// Finalized majority values in chunk order.
    pub fn majorities(&self) -> Vec<i64> {
        self.majorities.values().copied().collect()
    }
}

/// Majority value among the replies, plus the workers that reported it.
///
/// Highest occurrence count wins; on a tie the smallest value wins.
fn majority_vote(replies: &[(WorkerId, i64)]) -> (i64, Vec<WorkerId>) {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for (_, value) in replies {
        *counts.entry(*value).or_default() += 1;
    }
    // Ties on the count compare the values reversed, so the smaller value
    // ranks higher and wins the max.
    let majority = counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(value, _)| *value)
        .unwrap_or(0);
    let correct = replies
        .iter()
        .filter(|(_, value)| *value == majority)
        .map(|(worker, _)| *worker)
        .collect();
    (majority, correct)
}
