//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::classifier::Bucket;
use crate::errors::{ExplorerError, Result};
use crate::explorer::{now_unix, Explorer, Scope};
use crate::projects::{format_native, funding_percent, parse_address, ProjectDetails, ProjectStatus};
use crate::refresher::RefresherState;
use crate::view::ViewState;

#[derive(Clone)]
pub struct ApiState {
    pub explorer: Arc<Explorer>,
    pub refresher: Arc<RefresherState>,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/view", get(get_view))
        .route("/refresh", post(refresh))
        .route("/chains/:chain_id/projects", get(get_projects))
        .route("/chains/:chain_id/my-projects", get(get_my_projects))
        .route("/chains/:chain_id/projects/:address", get(get_project))
        .route("/chains/:chain_id/transactions", post(prepare_transaction))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MyProjectsQuery {
    pub wallet: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub viewer: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct ParticipationResponse {
    pub viewer: String,
    pub is_owner: bool,
    pub has_contributed: bool,
    pub is_volunteering: bool,
    pub is_blacklisted: bool,
    pub contributed: String,
    pub volunteered_seconds: u64,
}

/// Amounts are decimal wei strings; `*_display` fields are whole units.
#[derive(Serialize)]
pub struct ProjectDetailsResponse {
    pub chain_id: u64,
    pub address: String,
    pub name: String,
    pub description: String,
    pub start_time: u64,
    pub end_time: u64,
    pub status: ProjectStatus,
    pub bucket: Bucket,
    pub owner: String,
    pub latitude: String,
    pub longitude: String,
    pub target_amount: String,
    pub raised_amount: String,
    pub balance: String,
    pub target_display: String,
    pub raised_display: String,
    pub funding_percent: u64,
    pub funding_goal_reached: bool,
    pub participant_count: u64,
    pub volunteer_count: u64,
    pub contributor_count: u64,
    pub volunteered_seconds: u64,
    pub token_name: String,
    pub token_symbol: String,
    pub participation: Option<ParticipationResponse>,
}

impl ProjectDetailsResponse {
    fn new(chain_id: u64, details: ProjectDetails, now: u64) -> Self {
        let bucket = Bucket::of(&details.summary, now);
        let summary = details.summary;
        Self {
            chain_id,
            address: summary.address.to_string(),
            name: summary.name,
            description: summary.description,
            start_time: summary.start_time,
            end_time: summary.end_time,
            status: summary.status,
            bucket,
            owner: details.owner.to_string(),
            latitude: details.latitude.to_string(),
            longitude: details.longitude.to_string(),
            target_amount: details.target_amount.to_string(),
            raised_amount: details.raised_amount.to_string(),
            balance: details.balance.to_string(),
            target_display: format_native(details.target_amount),
            raised_display: format_native(details.raised_amount),
            funding_percent: funding_percent(details.raised_amount, details.target_amount),
            funding_goal_reached: details.funding_goal_reached,
            participant_count: details.participant_count,
            volunteer_count: details.volunteer_count,
            contributor_count: details.contributor_count,
            volunteered_seconds: details.volunteered_seconds,
            token_name: details.token_name,
            token_symbol: details.token_symbol,
            participation: details.participation.map(|p| ParticipationResponse {
                viewer: p.viewer.to_string(),
                is_owner: p.is_owner,
                has_contributed: p.has_contributed,
                is_volunteering: p.is_volunteering,
                is_blacklisted: p.is_blacklisted,
                contributed: p.contributed.to_string(),
                volunteered_seconds: p.volunteered_seconds,
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────
// Status mapping
// ─────────────────────────────────────────────────────────

fn view_response(state: ViewState) -> Response {
    let code = match &state {
        ViewState::UnsupportedNetwork { .. } => StatusCode::BAD_REQUEST,
        ViewState::Failed { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    (code, Json(state)).into_response()
}

fn error_response(err: ExplorerError) -> Response {
    let code = match &err {
        ExplorerError::UnsupportedNetwork(_) => StatusCode::BAD_REQUEST,
        e if e.is_invalid_input() => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    };
    (
        code,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /view?q=`
///
/// The view last published by the background refresher.
pub async fn get_view(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let snapshot = state.refresher.view.snapshot().await;
    view_response(snapshot.filtered(query.q.as_deref()))
}

/// `POST /refresh`
///
/// Wakes the background refresher; the result lands in `GET /view`.
/// Repeated requests during a running cycle share one follow-up cycle.
pub async fn refresh(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    state.refresher.request_refresh();
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "refresh_requested" })),
    )
}

/// `GET /chains/:chain_id/projects?q=`
pub async fn get_projects(
    State(state): State<Arc<ApiState>>,
    Path(chain_id): Path<u64>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let result = state
        .explorer
        .list_projects(chain_id, Scope::All, now_unix())
        .await;
    view_response(ViewState::from_result(result).filtered(query.q.as_deref()))
}

/// `GET /chains/:chain_id/my-projects?wallet=&q=`
///
/// A missing or malformed wallet renders as "not connected".
pub async fn get_my_projects(
    State(state): State<Arc<ApiState>>,
    Path(chain_id): Path<u64>,
    Query(query): Query<MyProjectsQuery>,
) -> Response {
    let result = match creator_scope(query.wallet.as_deref()) {
        Ok(scope) => state.explorer.list_projects(chain_id, scope, now_unix()).await,
        Err(e) => Err(e),
    };
    view_response(ViewState::from_result(result).filtered(query.q.as_deref()))
}

fn creator_scope(wallet: Option<&str>) -> Result<Scope> {
    match wallet.map(str::trim).filter(|w| !w.is_empty()) {
        None => Ok(Scope::Creator(None)),
        Some(raw) => Ok(Scope::Creator(Some(parse_address(raw)?))),
    }
}

/// `GET /chains/:chain_id/projects/:address?viewer=`
pub async fn get_project(
    State(state): State<Arc<ApiState>>,
    Path((chain_id, address)): Path<(u64, String)>,
    Query(query): Query<DetailQuery>,
) -> Response {
    let result = async {
        let project = parse_address(&address)?;
        let viewer = query
            .viewer
            .as_deref()
            .map(parse_address)
            .transpose()?;
        state.explorer.project_details(chain_id, project, viewer).await
    }
    .await;

    match result {
        Ok(details) => (
            StatusCode::OK,
            Json(ProjectDetailsResponse::new(chain_id, details, now_unix())),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Detail fetch for {address} on chain {chain_id} failed: {e}");
            error_response(e)
        }
    }
}

/// `POST /chains/:chain_id/transactions`
///
/// Returns an unsigned call for the wallet to sign.
pub async fn prepare_transaction(
    State(state): State<Arc<ApiState>>,
    Path(chain_id): Path<u64>,
    Json(action): Json<Action>,
) -> Response {
    match state.explorer.prepare(chain_id, &action) {
        Ok(tx) => (StatusCode::OK, Json(tx)).into_response(),
        Err(e) => error_response(e),
    }
}
