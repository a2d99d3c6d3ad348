use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuorumError {
    #[error("Round has no chunks")]
    EmptyRound,

    #[error("Chunk not finalized: {0}")]
    ChunkNotFinalized(String),

    #[error("No workers available for selection")]
    NoWorkers,
}

pub type Result<T> = std::result::Result<T, QuorumError>;
