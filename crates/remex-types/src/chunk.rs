use crate::ChunkId;
use serde::{Deserialize, Serialize};

/// A contiguous, disjoint slice of a round's source array.
///
/// Immutable once created; the partitioner guarantees at least 2 elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub values: Vec<i64>,
}

impl Chunk {
    pub fn new(id: ChunkId, values: Vec<i64>) -> Self {
        debug_assert!(!values.is_empty());
        Self { id, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
