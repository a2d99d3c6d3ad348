pub mod counters;
pub mod delta;
pub mod table;

pub use counters::{CounterPair, LocalCounters};
pub use delta::ReputationDelta;
pub use table::ReputationTable;
