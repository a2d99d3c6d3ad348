use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a coordinating client.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub u32);

/// Identity of a compute worker.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(pub u32);

/// One execution cycle of a client; ids increase per client, starting at 1.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoundId(pub u64);

/// Index of a chunk within its round.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId(pub u32);

impl RoundId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

macro_rules! impl_display {
    ($ty:ident, $prefix:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    };
}

impl_display!(ClientId, "client-");
impl_display!(WorkerId, "worker-");
impl_display!(RoundId, "round-");
impl_display!(ChunkId, "chunk-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(ClientId(2).to_string(), "client-2");
        assert_eq!(WorkerId(0).to_string(), "worker-0");
        assert_eq!(RoundId(1).to_string(), "round-1");
        assert_eq!(ChunkId(3).to_string(), "chunk-3");
    }

    #[test]
    fn test_round_advance() {
        assert_eq!(RoundId(1).next(), RoundId(2));
    }
}
