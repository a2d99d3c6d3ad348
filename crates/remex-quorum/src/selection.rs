use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use remex_reputation::ReputationTable;
use remex_types::WorkerId;
use tracing::debug;

/// Chooses the quorum of workers that receives each chunk.
///
/// The first round has no reputation signal, so every chunk gets its own
/// independently shuffled random subset. Once a round has completed, chunks
/// are steered to the workers with the best average scores.
pub struct WorkerSelector {
    workers: Vec<WorkerId>,
    quorum_size: usize,
    rng: StdRng,
}

impl WorkerSelector {
    pub fn new(workers: Vec<WorkerId>, quorum_size: usize, seed: u64) -> Self {
        // Empty-quorum condition: silently cap at the available workers.
        let quorum_size = quorum_size.min(workers.len());
        Self {
            workers,
            quorum_size,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn quorum_size(&self) -> usize {
        self.quorum_size
    }

    /// Quorum for one chunk dispatch.
    ///
    /// `completed_rounds` is the number of rounds this client has already
    /// finished; zero means the uniform-random strategy.
    pub fn select(&mut self, completed_rounds: u64, table: &ReputationTable) -> Vec<WorkerId> {
        let quorum = if completed_rounds == 0 {
            let mut shuffled = self.workers.clone();
            shuffled.shuffle(&mut self.rng);
            shuffled.truncate(self.quorum_size);
            shuffled
        } else {
            let mut ranked = table.ranked(&self.workers);
            ranked.truncate(self.quorum_size);
            ranked
        };
        debug!(
            strategy = if completed_rounds == 0 { "random" } else { "reputation" },
            quorum_size = quorum.len(),
            "Selected chunk quorum"
        );
        quorum
    }
}
