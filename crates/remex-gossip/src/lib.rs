pub mod record;
pub mod state;

pub use record::{GossipKey, GossipRecord};
pub use state::{Disposition, GossipState};
