use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use remex_types::{ClientId, Params, RoundId, WorkerId};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::RwLock;
use tracing::debug;

/// Decides which workers behave dishonestly for each (client, round) pair.
///
/// One instance is constructed per run and shared by reference among all
/// worker actors; there is no lazily initialized global. The decision for a
/// key is drawn on first query and memoized for the lifetime of the run,
/// with the decide-and-cache step inside a single write-lock critical
/// section so concurrent first queries observe one consistent set.
pub struct FaultOracle {
    workers: Vec<WorkerId>,
    /// Strict upper bound on the dishonest-set size: floor(n/4).
    bound: usize,
    decided: RwLock<HashMap<(ClientId, RoundId), HashSet<WorkerId>>>,
    rng: Mutex<StdRng>,
}

impl FaultOracle {
    pub fn new(params: &Params, seed: u64) -> Self {
        Self {
            workers: params.worker_ids(),
            bound: params.max_dishonest_bound(),
            decided: RwLock::new(HashMap::new()),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Whether `worker` is dishonest toward `client` in `round`.
    pub async fn is_dishonest(&self, client: ClientId, round: RoundId, worker: WorkerId) -> bool {
        {
            let decided = self.decided.read().await;
            if let Some(set) = decided.get(&(client, round)) {
                return set.contains(&worker);
            }
        }

        let mut decided = self.decided.write().await;
        // Double-check: another task may have decided while we waited.
        let set = decided
            .entry((client, round))
            .or_insert_with(|| self.draw_dishonest_set(client, round));
        set.contains(&worker)
    }

    /// Size of the dishonest set for a key, deciding it if necessary.
    pub async fn dishonest_count(&self, client: ClientId, round: RoundId) -> usize {
        let mut decided = self.decided.write().await;
        decided
            .entry((client, round))
            .or_insert_with(|| self.draw_dishonest_set(client, round))
            .len()
    }

    fn draw_dishonest_set(&self, client: ClientId, round: RoundId) -> HashSet<WorkerId> {
        let mut rng = self.rng.lock().expect("oracle rng poisoned");
        // m uniform in [0, bound - 1]; an empty range means no dishonesty.
        let count = if self.bound == 0 {
            0
        } else {
            rng.gen_range(0..self.bound)
        };
        let mut shuffled = self.workers.clone();
        shuffled.shuffle(&mut *rng);
        let set: HashSet<WorkerId> = shuffled.into_iter().take(count).collect();
        debug!(%client, %round, dishonest = set.len(), bound = self.bound, "Fault decision drawn");
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(num_workers: usize) -> Params {
        Params {
            num_workers,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_decision_is_stable_across_queries() {
        let oracle = FaultOracle::new(&params(20), 3);
        let key = (ClientId(0), RoundId(1));
        let mut first = Vec::new();
        for w in 0..20u32 {
            first.push(oracle.is_dishonest(key.0, key.1, WorkerId(w)).await);
        }
        for _ in 0..3 {
            for w in 0..20u32 {
                let again = oracle.is_dishonest(key.0, key.1, WorkerId(w)).await;
                assert_eq!(again, first[w as usize]);
            }
        }
    }

    #[tokio::test]
    async fn test_dishonest_count_stays_below_quarter() {
        let oracle = FaultOracle::new(&params(21), 9);
        for round in 1..=40u64 {
            for client in 0..3u32 {
                let count = oracle.dishonest_count(ClientId(client), RoundId(round)).await;
                assert!(count < 21 / 4, "count {} for round {}", count, round);
            }
        }
    }

    #[tokio::test]
    async fn test_fewer_than_four_workers_means_no_dishonesty() {
        let oracle = FaultOracle::new(&params(3), 1);
        for round in 1..=10u64 {
            assert_eq!(oracle.dishonest_count(ClientId(0), RoundId(round)).await, 0);
        }
    }

    #[tokio::test]
    async fn test_five_workers_can_never_inject_a_dishonest_worker() {
        // bound = floor(5/4) = 1, so the sampled size is always 0.
        let oracle = FaultOracle::new(&params(5), 123);
        for round in 1..=25u64 {
            assert_eq!(oracle.dishonest_count(ClientId(1), RoundId(round)).await, 0);
        }
    }

    #[tokio::test]
    async fn test_concurrent_first_queries_agree() {
        let oracle = std::sync::Arc::new(FaultOracle::new(&params(16), 5));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let oracle = oracle.clone();
            handles.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                for w in 0..16u32 {
                    seen.push(oracle.is_dishonest(ClientId(2), RoundId(1), WorkerId(w)).await);
                }
                seen
            }));
        }
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        for other in &results[1..] {
            assert_eq!(*other, results[0]);
        }
    }
}
