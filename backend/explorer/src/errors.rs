//! Application-wide error types.

use alloy_primitives::U256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// No factory is known for the requested chain.
    #[error("Unsupported network: chain id {0}")]
    UnsupportedNetwork(u64),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("ABI decode error: {0}")]
    Decode(String),

    #[error("Unknown project status: {0}")]
    UnknownStatus(U256),

    #[error("Task failed: {0}")]
    Task(String),
}

impl ExplorerError {
    /// Errors caused by the caller's input rather than the chain.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::NotConnected | Self::InvalidAddress(_) | Self::InvalidInput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
