use remex_gossip::GossipRecord;
use remex_quorum::Reply;
use remex_types::{ChunkId, ClientId, RemexError, Result, RoundId, WorkerId};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// A chunk assignment on its way to a worker.
///
/// The round and chunk ids ride alongside the typed values; nothing is
/// embedded in a string payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    pub client: ClientId,
    pub round: RoundId,
    pub chunk: ChunkId,
    pub values: Vec<i64>,
}

#[derive(Debug, Clone)]
pub enum WorkerMsg {
    Dispatch(Dispatch),
}

#[derive(Debug, Clone)]
pub enum ClientMsg {
    StartRound,
    Reply(Reply),
    /// `from` names the link the record arrived over, which flooding
    /// excludes when re-broadcasting.
    Gossip {
        from: ClientId,
        record: GossipRecord,
    },
    Shutdown,
}

/// Sending side of a worker's mailbox.
///
/// Unbounded channels give the substrate contract the protocol assumes:
/// per sender-receiver ordered, non-lossy, finite-latency delivery.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    pub id: WorkerId,
    tx: mpsc::UnboundedSender<WorkerMsg>,
}

impl WorkerHandle {
    pub fn new(id: WorkerId, tx: mpsc::UnboundedSender<WorkerMsg>) -> Self {
        Self { id, tx }
    }

    pub fn send(&self, msg: WorkerMsg) -> Result<()> {
        self.tx
            .send(msg)
            .map_err(|_| RemexError::Transport(format!("{} mailbox closed", self.id)))
    }
}

/// Sending side of a client's mailbox.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub id: ClientId,
    tx: mpsc::UnboundedSender<ClientMsg>,
}

impl ClientHandle {
    pub fn new(id: ClientId, tx: mpsc::UnboundedSender<ClientMsg>) -> Self {
        Self { id, tx }
    }

    pub fn send(&self, msg: ClientMsg) -> Result<()> {
        self.tx
            .send(msg)
            .map_err(|_| RemexError::Transport(format!("{} mailbox closed", self.id)))
    }
}
