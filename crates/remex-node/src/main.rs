use anyhow::Result;
use clap::{Parser, Subcommand};
use remex_engine::{Simulation, SimulationOutcome, Topology};
use remex_types::{Params, Reduction};
use std::path::PathBuf;
use tracing::info;

mod config;
mod logging;

use config::NodeConfig;

#[derive(Parser)]
#[command(name = "remex")]
#[command(about = "Remex - Byzantine-tolerant remote execution with reputation gossip", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the offloading simulation
    Run {
        /// Source array length per round
        #[arg(long)]
        array_len: Option<usize>,

        /// Requested chunks per round
        #[arg(long)]
        chunk_count: Option<usize>,

        /// Number of workers in the pool
        #[arg(long)]
        num_workers: Option<usize>,

        /// Number of coordinating clients
        #[arg(long)]
        num_clients: Option<usize>,

        /// Rounds each client runs
        #[arg(long)]
        rounds: Option<u64>,

        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Client gossip topology
        #[arg(long, value_parser = parse_topology)]
        topology: Option<Topology>,
    },
}

fn parse_topology(s: &str) -> Result<Topology, String> {
    match s {
        "full" => Ok(Topology::Full),
        "ring" => Ok(Topology::Ring),
        other => Err(format!("unknown topology '{}', expected full or ring", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => NodeConfig::load(path)?,
        None => NodeConfig::default(),
    };
    logging::init_logging(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Run {
            array_len,
            chunk_count,
            num_workers,
            num_clients,
            rounds,
            seed,
            topology,
        } => {
            let sim = &mut config.simulation;
            if let Some(v) = array_len {
                sim.array_len = v;
            }
            if let Some(v) = chunk_count {
                sim.chunk_count = v;
            }
            if let Some(v) = num_workers {
                sim.num_workers = v;
            }
            if let Some(v) = num_clients {
                sim.num_clients = v;
            }
            if let Some(v) = rounds {
                sim.rounds = v;
            }
            if let Some(v) = seed {
                sim.seed = v;
            }
            if let Some(v) = topology {
                sim.topology = v;
            }

            let params = Params::from(&config.simulation);
            info!(
                workers = params.num_workers,
                clients = params.num_clients,
                rounds = params.rounds,
                seed = config.simulation.seed,
                "Launching simulation"
            );
            let simulation = Simulation::new(
                params,
                config.simulation.topology,
                Reduction::Max,
                config.simulation.seed,
            );
            let outcome = simulation.run().await?;
            print_outcome(&outcome);
        }
    }

    Ok(())
}

fn print_outcome(outcome: &SimulationOutcome) {
    println!("\nRound results:");
    for report in &outcome.reports {
        let status = if report.result == report.expected {
            "ok"
        } else {
            "MISMATCH"
        };
        println!(
            "  {} {}: result={} expected={} [{}]",
            report.client, report.round, report.result, report.expected, status
        );
    }

    println!("\nAggregated reputation per client:");
    for (client, table) in &outcome.tables {
        let mut line = format!("  {}:", client);
        for (worker, pair) in table.iter() {
            line.push_str(&format!(
                " {}={}/{} ({:.2})",
                worker,
                pair.correct,
                pair.trials,
                pair.average()
            ));
        }
        println!("{}", line);
    }
}
