use crate::client::{ClientActor, RoundReport};
use crate::oracle::FaultOracle;
use crate::transport::{ClientHandle, ClientMsg};
use crate::worker::Worker;
use remex_reputation::ReputationTable;
use remex_types::{ClientId, Params, Reduction, RemexError, Result, WorkerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tracing::info;

/// Shape of the client-to-client gossip overlay.
///
/// Workers are always reachable from every client; the topology only
/// constrains which peers a client floods reputation deltas to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    #[default]
    Full,
    Ring,
}

impl Topology {
    fn peers_of(&self, client: usize, num_clients: usize) -> Vec<usize> {
        match self {
            Topology::Full => (0..num_clients).filter(|p| *p != client).collect(),
            Topology::Ring => {
                if num_clients < 2 {
                    return Vec::new();
                }
                let next = (client + 1) % num_clients;
                let prev = (client + num_clients - 1) % num_clients;
                if next == prev {
                    vec![next]
                } else {
                    vec![prev, next]
                }
            }
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct SimulationOutcome {
    pub reports: Vec<RoundReport>,
    /// Final aggregated reputation table per client.
    pub tables: Vec<(ClientId, ReputationTable)>,
}

/// Wires up one run: a shared fault oracle, worker actors, client actors,
/// and the gossip overlay, then drives every client through its rounds.
pub struct Simulation {
    params: Params,
    topology: Topology,
    reduction: Reduction,
    seed: u64,
}

impl Simulation {
    pub fn new(params: Params, topology: Topology, reduction: Reduction, seed: u64) -> Self {
        Self {
            params,
            topology,
            reduction,
            seed,
        }
    }

    pub async fn run(&self) -> Result<SimulationOutcome> {
        self.validate()?;
        let params = &self.params;
        info!(
            clients = params.num_clients,
            workers = params.num_workers,
            rounds = params.rounds,
            quorum = params.quorum_size(),
            threshold = params.reply_threshold(),
            topology = ?self.topology,
            "Starting simulation"
        );

        let oracle = Arc::new(FaultOracle::new(params, self.seed));

        // Client mailboxes first; workers need every reply handle.
        let mut client_handles = Vec::new();
        let mut client_rxs = Vec::new();
        for i in 0..params.num_clients {
            let (tx, rx) = mpsc::unbounded_channel();
            client_handles.push(ClientHandle::new(ClientId(i as u32), tx));
            client_rxs.push(rx);
        }
        let reply_handles: HashMap<ClientId, ClientHandle> = client_handles
            .iter()
            .map(|h| (h.id, h.clone()))
            .collect();

        let worker_handles: Vec<_> = (0..params.num_workers)
            .map(|i| {
                Worker::spawn(
                    WorkerId(i as u32),
                    self.reduction,
                    oracle.clone(),
                    reply_handles.clone(),
                    self.seed.wrapping_add(1000 + i as u64),
                )
            })
            .collect();

        let (report_tx, mut report_rx) = mpsc::unbounded_channel();
        let mut tables = Vec::new();
        let mut client_tasks = Vec::new();
        for (i, rx) in client_rxs.into_iter().enumerate() {
            let table = Arc::new(RwLock::new(ReputationTable::new()));
            tables.push(table.clone());
            let peers = self
                .topology
                .peers_of(i, params.num_clients)
                .into_iter()
                .map(|p| client_handles[p].clone())
                .collect();
            let actor = ClientActor::new(
                ClientId(i as u32),
                params.clone(),
                self.reduction,
                worker_handles.clone(),
                peers,
                table,
                self.seed.wrapping_add(2000 + i as u64),
                report_tx.clone(),
            );
            client_tasks.push(tokio::spawn(actor.run(rx)));
        }
        drop(report_tx);

        for handle in &client_handles {
            handle.send(ClientMsg::StartRound)?;
        }

        let expected_reports = params.num_clients * params.rounds as usize;
        let mut reports = Vec::with_capacity(expected_reports);
        while reports.len() < expected_reports {
            match report_rx.recv().await {
                Some(report) => reports.push(report),
                None => {
                    return Err(RemexError::Transport(
                        "clients stopped before all rounds completed".into(),
                    ))
                }
            }
        }

        // Let the final round's gossip flood settle before snapshotting.
        tokio::time::sleep(Duration::from_millis(200)).await;

        for handle in &client_handles {
            let _ = handle.send(ClientMsg::Shutdown);
        }
        for task in client_tasks {
            let _ = task.await;
        }

        reports.sort_by_key(|r| (r.client, r.round));
        let mut snapshots = Vec::new();
        for (i, table) in tables.into_iter().enumerate() {
            snapshots.push((ClientId(i as u32), table.read().await.clone()));
        }

        info!(reports = reports.len(), "Simulation finished");
        Ok(SimulationOutcome {
            reports,
            tables: snapshots,
        })
    }

    fn validate(&self) -> Result<()> {
        let p = &self.params;
        if p.num_workers == 0 {
            return Err(RemexError::InvalidParameter("num_workers must be > 0".into()));
        }
        if p.num_clients == 0 {
            return Err(RemexError::InvalidParameter("num_clients must be > 0".into()));
        }
        if p.array_len < 2 {
            return Err(RemexError::InvalidParameter("array_len must be >= 2".into()));
        }
        if p.chunk_count == 0 {
            return Err(RemexError::InvalidParameter("chunk_count must be > 0".into()));
        }
        if p.rounds == 0 {
            return Err(RemexError::InvalidParameter("rounds must be > 0".into()));
        }
        Ok(())
    }
}
