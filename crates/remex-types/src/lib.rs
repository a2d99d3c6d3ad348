pub mod chunk;
pub mod error;
pub mod id;
pub mod reduction;

pub use chunk::Chunk;
pub use error::{RemexError, Result};
pub use id::{ChunkId, ClientId, RoundId, WorkerId};
pub use reduction::Reduction;

/// Protocol parameters shared by every actor in a run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Params {
    /// Length of each round's source array
    pub array_len: usize,
    /// Requested chunk count per round (the partitioner may reduce it)
    pub chunk_count: usize,
    pub num_workers: usize,
    pub num_clients: usize,
    /// Rounds each client runs before going quiescent
    pub rounds: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            array_len: 20,
            chunk_count: 4,
            num_workers: 8,
            num_clients: 3,
            rounds: 2,
        }
    }
}

impl Params {
    /// Workers dispatched per chunk: ceil(n/2) + 1, capped at n.
    pub fn quorum_size(&self) -> usize {
        let q = self.num_workers.div_ceil(2) + 1;
        q.min(self.num_workers)
    }

    /// Replies required before a chunk finalizes: floor(n/2) + 1.
    pub fn reply_threshold(&self) -> usize {
        self.num_workers / 2 + 1
    }

    /// Strict upper bound on the dishonest-set size: floor(n/4).
    pub fn max_dishonest_bound(&self) -> usize {
        self.num_workers / 4
    }

    pub fn worker_ids(&self) -> Vec<WorkerId> {
        (0..self.num_workers as u32).map(WorkerId).collect()
    }
}
