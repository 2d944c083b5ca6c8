//! Background task that rebuilds the published all-projects view.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::explorer::{now_unix, Explorer, Scope};
use crate::view::{ViewState, ViewStore};

pub struct RefresherState {
    pub explorer: Arc<Explorer>,
    pub view: Arc<ViewStore>,
    pub chain_id: u64,
    pub interval: Duration,
    pub shutdown: CancellationToken,
    /// Wakes the loop early. Holds at most one pending request.
    pub trigger: Notify,
}

impl RefresherState {
    /// Ask for a cycle as soon as the loop is idle.
    ///
    /// Requests made while a cycle is running collapse into one follow-up
    /// cycle.
    pub fn request_refresh(&self) {
        self.trigger.notify_one();
    }
}

/// Refresh on a fixed interval, or early on request, until shutdown.
pub async fn run(state: Arc<RefresherState>) {
    info!(
        "Refresher starting: chain {} every {}s",
        state.chain_id,
        state.interval.as_secs()
    );

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => break,
            _ = refresh_once(&state) => {}
        }

        tokio::select! {
            _ = state.shutdown.cancelled() => break,
            _ = state.trigger.notified() => info!("Refresh requested"),
            _ = tokio::time::sleep(state.interval) => {}
        }
    }

    info!("Refresher stopped");
}

/// Run one fetch cycle and publish its outcome.
///
/// Only the most recently started cycle is allowed to publish.
pub async fn refresh_once(state: &RefresherState) -> ViewState {
    let token = state.view.begin().await;
    let result = state
        .explorer
        .list_projects(state.chain_id, Scope::All, now_unix())
        .await;
    let outcome = ViewState::from_result(result);

    if !state.view.publish(token, outcome.clone()).await {
        warn!("Refresh cycle {token:?} superseded before it finished");
    }
    outcome
}
