pub mod client;
pub mod oracle;
pub mod simulation;
pub mod transport;
pub mod worker;

pub use client::RoundReport;
pub use oracle::FaultOracle;
pub use simulation::{Simulation, SimulationOutcome, Topology};
pub use transport::{ClientHandle, ClientMsg, Dispatch, WorkerHandle, WorkerMsg};
