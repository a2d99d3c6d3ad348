use anyhow::{Context, Result};
use remex_engine::Topology;
use remex_types::Params;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub array_len: usize,
    pub chunk_count: usize,
    pub num_workers: usize,
    pub num_clients: usize,
    pub rounds: u64,
    pub seed: u64,
    pub topology: Topology,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let params = Params::default();
        Self {
            array_len: params.array_len,
            chunk_count: params.chunk_count,
            num_workers: params.num_workers,
            num_clients: params.num_clients,
            rounds: params.rounds,
            seed: 42,
            topology: Topology::Full,
        }
    }
}

impl From<&SimulationConfig> for Params {
    fn from(config: &SimulationConfig) -> Self {
        Params {
            array_len: config.array_len,
            chunk_count: config.chunk_count,
            num_workers: config.num_workers,
            num_clients: config.num_clients,
            rounds: config.rounds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_output: None,
        }
    }
}

impl NodeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}
