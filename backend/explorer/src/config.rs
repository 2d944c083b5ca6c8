//! Application configuration loaded from environment variables.

use std::collections::HashMap;

use alloy_primitives::Address;

use crate::enumerator::IndexBase;
use crate::errors::{ExplorerError, Result};
use crate::projects::parse_address;

/// Scroll Sepolia, the only network the Plaza contracts are deployed on.
pub const DEFAULT_CHAIN_ID: u64 = 534351;

/// One supported network.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    /// EVM JSON-RPC endpoint
    pub rpc_url: String,
    /// PlazaFactory deployment on this chain
    pub factory: Address,
}

/// Chain id → deployment lookup.
#[derive(Debug, Clone, Default)]
pub struct ChainTable {
    chains: HashMap<u64, ChainConfig>,
}

impl ChainTable {
    pub fn new(chains: impl IntoIterator<Item = ChainConfig>) -> Self {
        Self {
            chains: chains.into_iter().map(|c| (c.chain_id, c)).collect(),
        }
    }

    pub fn get(&self, chain_id: u64) -> Result<&ChainConfig> {
        self.chains
            .get(&chain_id)
            .ok_or(ExplorerError::UnsupportedNetwork(chain_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainConfig> {
        self.chains.values()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub chains: ChainTable,
    /// Chain refreshed by the background task
    pub default_chain_id: u64,
    /// Port for the REST API server
    pub api_port: u16,
    /// How often (in seconds) the background view is rebuilt
    pub refresh_interval_secs: u64,
    /// Upper bound on concurrently fetched projects
    pub max_concurrent_projects: usize,
    /// First index of the factory's `allProjects` array
    pub scan_index_base: IndexBase,
    pub rpc_max_attempts: u32,
    pub rpc_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let chain_id: u64 = var("CHAIN_ID", &DEFAULT_CHAIN_ID.to_string())
            .parse()
            .map_err(|_| ExplorerError::Config("Invalid CHAIN_ID".to_string()))?;

        let factory_raw = lookup("FACTORY_ADDRESS").ok_or_else(|| {
            ExplorerError::Config("FACTORY_ADDRESS environment variable is required".to_string())
        })?;
        let factory = parse_address(&factory_raw)
            .map_err(|_| ExplorerError::Config(format!("Invalid FACTORY_ADDRESS: {factory_raw}")))?;

        let chain = ChainConfig {
            chain_id,
            name: var("CHAIN_NAME", "Scroll Sepolia"),
            rpc_url: var("RPC_URL", "https://sepolia-rpc.scroll.io"),
            factory,
        };

        let scan_index_base = match var("SCAN_INDEX_BASE", "0").as_str() {
            "0" => IndexBase::Zero,
            "1" => IndexBase::One,
            other => {
                return Err(ExplorerError::Config(format!(
                    "Invalid SCAN_INDEX_BASE (expected 0 or 1): {other}"
                )))
            }
        };

        Ok(Config {
            chains: ChainTable::new([chain]),
            default_chain_id: chain_id,
            api_port: var("API_PORT", "3001")
                .parse()
                .map_err(|_| ExplorerError::Config("Invalid API_PORT".to_string()))?,
            refresh_interval_secs: var("REFRESH_INTERVAL_SECS", "30")
                .parse()
                .map_err(|_| ExplorerError::Config("Invalid REFRESH_INTERVAL_SECS".to_string()))?,
            max_concurrent_projects: var("MAX_CONCURRENT_PROJECTS", "4")
                .parse::<usize>()
                .map_err(|_| ExplorerError::Config("Invalid MAX_CONCURRENT_PROJECTS".to_string()))?
                .max(1),
            scan_index_base,
            rpc_max_attempts: var("RPC_MAX_ATTEMPTS", "3")
                .parse()
                .map_err(|_| ExplorerError::Config("Invalid RPC_MAX_ATTEMPTS".to_string()))?,
            rpc_timeout_secs: var("RPC_TIMEOUT_SECS", "30")
                .parse()
                .map_err(|_| ExplorerError::Config("Invalid RPC_TIMEOUT_SECS".to_string()))?,
        })
    }
}
