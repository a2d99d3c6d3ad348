use crate::transport::{ClientHandle, ClientMsg, Dispatch, WorkerHandle, WorkerMsg};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use remex_gossip::{Disposition, GossipRecord, GossipState};
use remex_quorum::{combine_round, partition, ChunkOutcome, RoundAggregator, WorkerSelector};
use remex_reputation::{LocalCounters, ReputationTable};
use remex_types::{Chunk, ClientId, Params, Reduction, RoundId};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

/// What one client observed for one completed round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub client: ClientId,
    pub round: RoundId,
    /// Majority-voted round result.
    pub result: i64,
    /// True reduction over the round's source array.
    pub expected: i64,
    pub chunk_majorities: Vec<i64>,
}

/// A coordinating client actor.
///
/// Progress is driven entirely by message arrival: round starts, worker
/// replies, and peer gossip all land in one mailbox and are handled in
/// order. The actor owns all round bookkeeping; the reputation table is
/// behind a lock only so the driver can snapshot it after shutdown.
pub struct ClientActor {
    id: ClientId,
    params: Params,
    reduction: Reduction,
    workers: Vec<WorkerHandle>,
    peers: Vec<ClientHandle>,
    table: Arc<RwLock<ReputationTable>>,
    selector: WorkerSelector,
    gossip: GossipState,
    rng: StdRng,
    reports: mpsc::UnboundedSender<RoundReport>,

    // Current-round bookkeeping, discarded when the round completes.
    current_round: RoundId,
    completed_rounds: u64,
    source: Vec<i64>,
    chunks: Vec<Chunk>,
    aggregator: Option<RoundAggregator>,
    counters: LocalCounters,
}

impl ClientActor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ClientId,
        params: Params,
        reduction: Reduction,
        workers: Vec<WorkerHandle>,
        peers: Vec<ClientHandle>,
        table: Arc<RwLock<ReputationTable>>,
        seed: u64,
        reports: mpsc::UnboundedSender<RoundReport>,
    ) -> Self {
        let selector = WorkerSelector::new(
            params.worker_ids(),
            params.quorum_size(),
            seed.wrapping_add(1),
        );
        Self {
            id,
            params,
            reduction,
            workers,
            peers,
            table,
            selector,
            gossip: GossipState::new(),
            rng: StdRng::seed_from_u64(seed),
            reports,
            current_round: RoundId(0),
            completed_rounds: 0,
            source: Vec::new(),
            chunks: Vec::new(),
            aggregator: None,
            counters: LocalCounters::new(),
        }
    }

    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<ClientMsg>) {
        while let Some(msg) = rx.recv().await {
            match msg {
                ClientMsg::StartRound => self.start_round().await,
                ClientMsg::Reply(reply) => self.on_reply(reply).await,
                ClientMsg::Gossip { from, record } => self.on_gossip(from, record).await,
                ClientMsg::Shutdown => break,
            }
        }
        debug!(client = %self.id, "Client stopping");
    }

    async fn start_round(&mut self) {
        self.current_round = RoundId(self.completed_rounds + 1);
        self.source = (0..self.params.array_len)
            .map(|_| self.rng.gen_range(1..=100))
            .collect();
        self.chunks = partition(&self.source, self.params.chunk_count);
        self.aggregator = Some(RoundAggregator::new(
            self.current_round,
            self.chunks.len(),
            self.params.reply_threshold(),
        ));
        self.counters = LocalCounters::new();

        info!(
            client = %self.id,
            round = %self.current_round,
            array_len = self.source.len(),
            chunks = self.chunks.len(),
            strategy = if self.completed_rounds == 0 { "random" } else { "reputation" },
            "Starting round"
        );

        let table = self.table.read().await;
        for chunk in self.chunks.clone() {
            let quorum = self.selector.select(self.completed_rounds, &table);
            debug!(
                client = %self.id,
                round = %self.current_round,
                chunk = %chunk.id,
                quorum = ?quorum,
                "Dispatching chunk"
            );
            for worker_id in quorum {
                // Trial credit happens at dispatch time.
                self.counters.record_trial(worker_id);
                let dispatch = Dispatch {
                    client: self.id,
                    round: self.current_round,
                    chunk: chunk.id,
                    values: chunk.values.clone(),
                };
                if let Some(worker) = self.workers.get(worker_id.0 as usize) {
                    if worker.send(WorkerMsg::Dispatch(dispatch)).is_err() {
                        warn!(client = %self.id, worker = %worker_id, "Worker unreachable");
                    }
                }
            }
        }
    }

    async fn on_reply(&mut self, reply: remex_quorum::Reply) {
        let Some(aggregator) = self.aggregator.as_mut() else {
            return;
        };
        match aggregator.record(reply) {
            ChunkOutcome::Stale | ChunkOutcome::Pending | ChunkOutcome::Late => {}
            ChunkOutcome::Finalized { majority, correct } => {
                info!(
                    client = %self.id,
                    round = %self.current_round,
                    chunk = %reply.chunk,
                    majority,
                    agreeing = correct.len(),
                    "Chunk finalized"
                );
                for worker in correct {
                    self.counters.record_correct(worker);
                }
                if self.aggregator.as_ref().is_some_and(|a| a.is_complete()) {
                    self.complete_round().await;
                }
            }
        }
    }

    async fn complete_round(&mut self) {
        let Some(aggregator) = self.aggregator.take() else {
            return;
        };
        let result = match combine_round(&aggregator, self.reduction) {
            Ok(result) => result,
            Err(e) => {
                warn!(client = %self.id, round = %self.current_round, error = %e, "Combine failed");
                return;
            }
        };
        let expected = self.reduction.apply(&self.source);
        info!(
            client = %self.id,
            round = %self.current_round,
            result,
            expected,
            "Round complete"
        );

        self.publish_delta();

        let _ = self.reports.send(RoundReport {
            client: self.id,
            round: self.current_round,
            result,
            expected,
            chunk_majorities: aggregator.majorities(),
        });

        self.completed_rounds += 1;
        if self.completed_rounds < self.params.rounds {
            self.start_round().await;
        } else {
            info!(client = %self.id, rounds = self.completed_rounds, "All rounds complete");
        }
    }

    /// Flood this round's local tallies to every reachable peer.
    fn publish_delta(&mut self) {
        let delta = self.counters.to_delta();
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default() as f64 / 1e9;
        let record = GossipRecord::new(self.id, timestamp, self.current_round, delta);

        // Register our own key first so the echo of this record is dropped
        // when a peer floods it back.
        self.gossip.observe(&record);

        info!(
            client = %self.id,
            round = %self.current_round,
            delta = %record.delta.encode(),
            peers = self.peers.len(),
            "Broadcasting reputation delta"
        );
        for peer in &self.peers {
            let _ = peer.send(ClientMsg::Gossip {
                from: self.id,
                record: record.clone(),
            });
        }
    }

    async fn on_gossip(&mut self, from: ClientId, record: GossipRecord) {
        if self.gossip.observe(&record) == Disposition::Duplicate {
            return;
        }

        info!(
            client = %self.id,
            origin = %record.origin,
            round = %record.round,
            via = %from,
            "Merging gossiped reputation delta"
        );
        {
            let mut table = self.table.write().await;
            table.merge(&record.delta);
        }

        // Re-broadcast excluding the arrival link, not the origin node; the
        // seen-set suppresses any revisit over another link.
        for peer in &self.peers {
            if peer.id != from {
                let _ = peer.send(ClientMsg::Gossip {
                    from: self.id,
                    record: record.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remex_reputation::{CounterPair, ReputationDelta};
    use remex_types::WorkerId;

    fn actor_with_peer() -> (
        ClientActor,
        mpsc::UnboundedReceiver<ClientMsg>,
        Arc<RwLock<ReputationTable>>,
    ) {
        let params = Params::default();
        let table = Arc::new(RwLock::new(ReputationTable::new()));
        let (peer_tx, peer_rx) = mpsc::unbounded_channel();
        let (report_tx, _report_rx) = mpsc::unbounded_channel();
        let actor = ClientActor::new(
            ClientId(0),
            params,
            Reduction::Max,
            Vec::new(),
            vec![ClientHandle::new(ClientId(1), peer_tx)],
            table.clone(),
            42,
            report_tx,
        );
        (actor, peer_rx, table)
    }

    fn record(timestamp: f64) -> GossipRecord {
        GossipRecord::new(
            ClientId(2),
            timestamp,
            RoundId(1),
            ReputationDelta::from_entries([(
                WorkerId(0),
                CounterPair { correct: 1, trials: 2 },
            )]),
        )
    }

    #[tokio::test]
    async fn test_fresh_gossip_merges_and_forwards() {
        let (mut actor, mut peer_rx, table) = actor_with_peer();
        actor.on_gossip(ClientId(2), record(5.0)).await;

        assert_eq!(
            table.read().await.get(WorkerId(0)),
            CounterPair { correct: 1, trials: 2 }
        );
        // Forwarded to the one peer that is not the arrival link.
        assert!(matches!(
            peer_rx.try_recv(),
            Ok(ClientMsg::Gossip { from: ClientId(0), .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_gossip_merges_once_and_never_reforwards() {
        let (mut actor, mut peer_rx, table) = actor_with_peer();
        let rec = record(7.5);
        actor.on_gossip(ClientId(2), rec.clone()).await;
        peer_rx.try_recv().unwrap();

        actor.on_gossip(ClientId(1), rec).await;
        assert_eq!(
            table.read().await.get(WorkerId(0)),
            CounterPair { correct: 1, trials: 2 }
        );
        assert!(peer_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_gossip_is_not_forwarded_back_over_arrival_link() {
        let (mut actor, mut peer_rx, _table) = actor_with_peer();
        // Arrives over the link to our only peer: nothing to forward.
        actor.on_gossip(ClientId(1), record(9.0)).await;
        assert!(peer_rx.try_recv().is_err());
    }
}
