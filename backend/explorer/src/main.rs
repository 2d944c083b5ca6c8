//! Plaza Project Explorer entry point.
//!
//! Reads PlazaFactory and Plaza project contracts over EVM JSON-RPC, groups
//! projects into upcoming / ongoing / past, and serves the result through a
//! small Axum REST API. A background task keeps a published view of every
//! project fresh.

mod abi;
mod actions;
mod api;
mod builder;
mod classifier;
mod config;
mod enumerator;
mod errors;
mod explorer;
mod fanout;
mod gateway;
mod projects;
mod refresher;
mod rpc;
mod view;

#[cfg(test)]
mod testing;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use explorer::{Explorer, ScanOptions};
use refresher::RefresherState;
use rpc::{ContractReader, RetryPolicy, RpcClient};
use view::ViewStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.rpc_timeout_secs))
        .build()?;
    let retry = RetryPolicy {
        max_attempts: config.rpc_max_attempts,
        ..RetryPolicy::default()
    };

    // ─── One RPC client per supported chain ───────────────
    let mut readers: HashMap<u64, Arc<dyn ContractReader>> = HashMap::new();
    for chain in config.chains.iter() {
        let rpc = RpcClient::new(client.clone(), chain.rpc_url.clone(), retry);
        match rpc.chain_id().await {
            Ok(id) if id == chain.chain_id => {
                info!("Connected to {} (chain {id}) via {}", chain.name, chain.rpc_url)
            }
            Ok(id) => warn!(
                "RPC {} serves chain {id}, expected {} ({})",
                chain.rpc_url, chain.chain_id, chain.name
            ),
            Err(e) => warn!("Could not verify chain id for {}: {e}", chain.rpc_url),
        }
        readers.insert(chain.chain_id, Arc::new(rpc));
    }

    let explorer = Arc::new(Explorer::new(
        config.chains.clone(),
        readers,
        ScanOptions {
            index_base: config.scan_index_base,
            max_concurrent: config.max_concurrent_projects,
        },
    ));

    // ─── Background refresher ─────────────────────────────
    let shutdown = CancellationToken::new();
    let refresher_state = Arc::new(RefresherState {
        explorer: explorer.clone(),
        view: Arc::new(ViewStore::new()),
        chain_id: config.default_chain_id,
        interval: Duration::from_secs(config.refresh_interval_secs),
        shutdown: shutdown.clone(),
        trigger: tokio::sync::Notify::new(),
    });
    let refresher_task = tokio::spawn(refresher::run(refresher_state.clone()));

    // ─── REST API ─────────────────────────────────────────
    let api_state = Arc::new(api::ApiState {
        explorer,
        refresher: refresher_state,
    });

    let app = api::router(api_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    refresher_task.await?;
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
    shutdown.cancel();
}
