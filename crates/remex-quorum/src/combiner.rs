use crate::{QuorumError, Result, RoundAggregator};
use remex_types::Reduction;
use tracing::info;

/// Fold a completed round's per-chunk majorities into the round result.
///
/// The fold must use the same reduction the workers computed per chunk;
/// for max the round result is the max over chunk majorities.
pub fn combine_round(aggregator: &RoundAggregator, reduction: Reduction) -> Result<i64> {
    if !aggregator.is_complete() {
        return Err(QuorumError::ChunkNotFinalized(format!(
            "round {} still has unfinalized chunks",
            aggregator.round()
        )));
    }
    let majorities = aggregator.majorities();
    if majorities.is_empty() {
        return Err(QuorumError::EmptyRound);
    }
    let result = reduction.combine(&majorities);
    info!(round = %aggregator.round(), result, chunks = majorities.len(), "Round combined");
    Ok(result)
}
