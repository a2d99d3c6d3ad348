use crate::oracle::FaultOracle;
use crate::transport::{ClientHandle, Dispatch, WorkerHandle, WorkerMsg};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use remex_quorum::Reply;
use remex_types::{ClientId, Reduction, WorkerId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A compute worker actor.
///
/// Replies exactly once per received dispatch: the true reduction when
/// honest, a slightly perturbed value when the fault oracle marks it
/// dishonest for the issuing (client, round).
pub struct Worker {
    id: WorkerId,
    reduction: Reduction,
    oracle: Arc<FaultOracle>,
    clients: HashMap<ClientId, ClientHandle>,
    rng: StdRng,
}

impl Worker {
    /// Spawn the worker task and return the handle clients dispatch to.
    pub fn spawn(
        id: WorkerId,
        reduction: Reduction,
        oracle: Arc<FaultOracle>,
        clients: HashMap<ClientId, ClientHandle>,
        seed: u64,
    ) -> WorkerHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Self {
            id,
            reduction,
            oracle,
            clients,
            rng: StdRng::seed_from_u64(seed),
        };
        tokio::spawn(worker.run(rx));
        WorkerHandle::new(id, tx)
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<WorkerMsg>) {
        while let Some(msg) = rx.recv().await {
            match msg {
                WorkerMsg::Dispatch(dispatch) => self.handle_dispatch(dispatch).await,
            }
        }
        debug!(worker = %self.id, "Worker mailbox closed, stopping");
    }

    async fn handle_dispatch(&mut self, dispatch: Dispatch) {
        let true_value = self.reduction.apply(&dispatch.values);
        let dishonest = self
            .oracle
            .is_dishonest(dispatch.client, dispatch.round, self.id)
            .await;

        // Dishonest replies are off by a small margin, not a wild outlier.
        let value = if dishonest {
            true_value - self.rng.gen_range(1..=10)
        } else {
            true_value
        };

        debug!(
            worker = %self.id,
            client = %dispatch.client,
            round = %dispatch.round,
            chunk = %dispatch.chunk,
            value,
            dishonest,
            "Computed chunk reply"
        );

        let reply = Reply {
            round: dispatch.round,
            chunk: dispatch.chunk,
            worker: self.id,
            value,
        };
        match self.clients.get(&dispatch.client) {
            Some(client) => {
                // The issuing client may already have shut down; best effort.
                let _ = client.send(crate::transport::ClientMsg::Reply(reply));
            }
            None => warn!(worker = %self.id, client = %dispatch.client, "Reply to unknown client"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ClientMsg;
    use remex_types::{ChunkId, Params, RoundId};

    #[tokio::test]
    async fn test_honest_worker_replies_with_true_max() {
        // 5 workers: the oracle can never mark anyone dishonest.
        let params = Params {
            num_workers: 5,
            ..Default::default()
        };
        let oracle = Arc::new(FaultOracle::new(&params, 1));
        let (client_tx, mut client_rx) = mpsc::unbounded_channel();
        let clients =
            HashMap::from([(ClientId(0), ClientHandle::new(ClientId(0), client_tx))]);

        let handle = Worker::spawn(WorkerId(2), Reduction::Max, oracle, clients, 9);
        handle
            .send(WorkerMsg::Dispatch(Dispatch {
                client: ClientId(0),
                round: RoundId(1),
                chunk: ChunkId(0),
                values: vec![12, 99, 7],
            }))
            .unwrap();

        match client_rx.recv().await.unwrap() {
            ClientMsg::Reply(reply) => {
                assert_eq!(reply.value, 99);
                assert_eq!(reply.worker, WorkerId(2));
                assert_eq!(reply.round, RoundId(1));
                assert_eq!(reply.chunk, ChunkId(0));
            }
            other => panic!("expected reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_one_reply_per_dispatch() {
        let params = Params {
            num_workers: 5,
            ..Default::default()
        };
        let oracle = Arc::new(FaultOracle::new(&params, 2));
        let (client_tx, mut client_rx) = mpsc::unbounded_channel();
        let clients =
            HashMap::from([(ClientId(1), ClientHandle::new(ClientId(1), client_tx))]);

        let handle = Worker::spawn(WorkerId(0), Reduction::Max, oracle, clients, 3);
        for chunk in 0..3u32 {
            handle
                .send(WorkerMsg::Dispatch(Dispatch {
                    client: ClientId(1),
                    round: RoundId(1),
                    chunk: ChunkId(chunk),
                    values: vec![1, chunk as i64 + 2],
                }))
                .unwrap();
        }
        drop(handle);

        let mut replies = Vec::new();
        while let Some(ClientMsg::Reply(reply)) = client_rx.recv().await {
            replies.push(reply);
        }
        assert_eq!(replies.len(), 3);
    }
}
