//! EVM JSON-RPC client for read-only `eth_call` against Plaza contracts.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns a transient error,
//!   a rate-limit response or an HTTP 5xx, up to [`RetryPolicy::max_backoff_ms`].
//! * The number of attempts is bounded; once exhausted the last error is
//!   returned and the fetch cycle fails.
//! * Reverts and malformed requests are never retried.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{ExplorerError, Result};

/// JSON-RPC error codes that will not go away by asking again.
const HARD_ERROR_CODES: [i64; 4] = [3, -32600, -32601, -32602];

/// The seam between the aggregation core and the chain.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Execute a read-only call and return the raw ABI-encoded return data.
    async fn call(&self, to: Address, calldata: Vec<u8>) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

// ─────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────

pub struct RpcClient {
    client: Client,
    rpc_url: String,
    retry: RetryPolicy,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(client: Client, rpc_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            client,
            rpc_url: rpc_url.into(),
            retry,
            next_id: AtomicU64::new(1),
        }
    }

    /// `eth_chainId`: the chain the endpoint actually serves.
    pub async fn chain_id(&self) -> Result<u64> {
        let hex_id: String = self.request("eth_chainId", json!([])).await?;
        let digits = hex_id.trim_start_matches("0x");
        u64::from_str_radix(digits, 16)
            .map_err(|_| ExplorerError::Decode(format!("bad eth_chainId result: {hex_id}")))
    }

    /// `eth_call` at the latest block.
    pub async fn eth_call(&self, to: Address, calldata: &[u8]) -> Result<Vec<u8>> {
        let params = json!([
            {
                "to": format!("0x{}", hex::encode(to.as_slice())),
                "data": format!("0x{}", hex::encode(calldata)),
            },
            "latest"
        ]);
        let raw: String = self.request("eth_call", params).await?;
        hex::decode(raw.trim_start_matches("0x"))
            .map_err(|e| ExplorerError::Decode(format!("eth_call returned bad hex: {e}")))
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let mut backoff = self.retry.initial_backoff_ms;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let last_attempt = attempt >= self.retry.max_attempts.max(1);
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);

            let response = self
                .client
                .post(&self.rpc_url)
                .json(&json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "method": method,
                    "params": params,
                }))
                .send()
                .await;

            let soft_error = match response {
                Err(e) => {
                    if last_attempt {
                        return Err(e.into());
                    }
                    warn!("RPC {method} request failed (attempt {attempt}, retry in {backoff}ms): {e}");
                    e.into()
                }
                Ok(resp)
                    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS
                        || resp.status().is_server_error() =>
                {
                    let status = resp.status();
                    let err = ExplorerError::Rpc {
                        code: i64::from(status.as_u16()),
                        message: format!("HTTP {status}"),
                    };
                    if last_attempt {
                        return Err(err);
                    }
                    warn!("RPC {method} answered HTTP {status} (attempt {attempt}, retry in {backoff}ms)");
                    err
                }
                Ok(resp) => match resp.bytes().await {
                    Err(e) => {
                        if last_attempt {
                            return Err(e.into());
                        }
                        warn!("RPC {method} body read failed (attempt {attempt}, retry in {backoff}ms): {e}");
                        e.into()
                    }
                    Ok(bytes) => {
                        let body: RpcResponse<T> = serde_json::from_slice(&bytes)?;

                        match (body.result, body.error) {
                            (_, Some(err)) if HARD_ERROR_CODES.contains(&err.code) => {
                                return Err(ExplorerError::Rpc {
                                    code: err.code,
                                    message: err.message,
                                });
                            }
                            (_, Some(err)) => {
                                let err = ExplorerError::Rpc {
                                    code: err.code,
                                    message: err.message,
                                };
                                if last_attempt {
                                    return Err(err);
                                }
                                warn!("RPC soft error (attempt {attempt}, retry in {backoff}ms): {err}");
                                err
                            }
                            (Some(result), None) => {
                                debug!("RPC {method} succeeded after {attempt} attempt(s)");
                                return Ok(result);
                            }
                            (None, None) => {
                                return Err(ExplorerError::Rpc {
                                    code: 0,
                                    message: format!("empty result from {method}"),
                                });
                            }
                        }
                    }
                },
            };

            debug!("retrying {method}: {soft_error}");
            tokio::time::sleep(Duration::from_millis(backoff)).await;
            backoff = (backoff * 2).min(self.retry.max_backoff_ms);
        }
    }
}

#[async_trait]
impl ContractReader for RpcClient {
    async fn call(&self, to: Address, calldata: Vec<u8>) -> Result<Vec<u8>> {
        self.eth_call(to, &calldata).await
    }
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
