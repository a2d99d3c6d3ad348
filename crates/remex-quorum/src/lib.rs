pub mod aggregator;
pub mod combiner;
pub mod error;
pub mod partition;
pub mod selection;

pub use aggregator::{ChunkOutcome, Reply, RoundAggregator};
pub use combiner::combine_round;
pub use error::{QuorumError, Result};
pub use partition::partition;
pub use selection::WorkerSelector;
