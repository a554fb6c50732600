//! Route handler functions for all API endpoints.
//!
//! Handlers only translate HTTP to calls on the dispatcher, the action
//! registry, and the statistics store's read operations.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gantry_core::{format_duration, ActionStats, ExecutionRecord};

use crate::dashboard;
use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

/// Body of `POST /api/actions/{name}`. An empty body means no arguments.
#[derive(Debug, Default, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Return only the newest `limit` records, newest first.
    pub limit: Option<usize>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Number of actions with recorded statistics.
    pub actions_tracked: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionsResponse {
    pub actions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub result: String,
}

/// Aggregates for one action, with derived figures filled in.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionSummary {
    pub name: String,
    pub total_calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    pub success_rate: Option<f64>,
    pub total_duration: String,
    pub average_duration: Option<String>,
    pub last_executed: Option<DateTime<Utc>>,
}

impl ActionSummary {
    pub fn new(name: &str, stats: &ActionStats) -> Self {
        Self {
            name: name.to_string(),
            total_calls: stats.total_calls,
            successful_calls: stats.successful_calls,
            failed_calls: stats.failed_calls(),
            success_rate: stats.success_rate(),
            total_duration: format_duration(stats.total_duration),
            average_duration: stats.average_duration().map(format_duration),
            last_executed: stats.last_executed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub stats: Vec<ActionSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub name: String,
    pub history: Vec<ExecutionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub name: String,
    pub invalidated: bool,
}

// =============================================================================
// Handler functions
// =============================================================================

/// GET /health - liveness and basic counters.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        actions_tracked: state.dispatcher.stats().action_names().len() as u64,
    })
}

/// GET /api/actions - every action the provider can see.
pub async fn list_actions(
    State(state): State<AppState>,
) -> Result<Json<ActionsResponse>, ApiError> {
    let names = state
        .dispatcher
        .registry()
        .list_available()
        .map_err(|e| ApiError::Internal(format!("Failed to list actions: {}", e)))?;
    Ok(Json(ActionsResponse {
        actions: names.into_iter().collect(),
    }))
}

/// POST /api/actions/{name} - run an action through the dispatcher.
pub async fn execute_action(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ExecuteRequest::default()
    } else {
        serde_json::from_slice::<ExecuteRequest>(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?
    };

    match state.dispatcher.dispatch(&name, &request.args).await {
        Ok(result) => Ok(Json(ExecuteResponse { result })),
        Err(e) => {
            tracing::error!(action = %name, error = %e, "Action execution failed");
            Err(e.into())
        }
    }
}

/// GET /api/actions/{name}/info - aggregates for one action.
pub async fn action_info(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ActionSummary>, ApiError> {
    let stats = state
        .dispatcher
        .stats()
        .get_stats(&name)
        .ok_or_else(|| ApiError::NotFound(format!("No statistics for action: {}", name)))?;
    Ok(Json(ActionSummary::new(&name, &stats)))
}

/// GET /api/actions/{name}/history - execution records for one action.
pub async fn action_history(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let store = state.dispatcher.stats();
    let history = match params.limit {
        Some(limit) => store.recent_history(&name, limit),
        None => store.get_history(&name),
    };
    if history.is_empty() && store.get_stats(&name).is_none() {
        return Err(ApiError::NotFound(format!(
            "No history found for action: {}",
            name
        )));
    }
    Ok(Json(HistoryResponse { name, history }))
}

/// POST /api/actions/{name}/reload - drop the cached resolution.
pub async fn reload_action(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<ReloadResponse> {
    let invalidated = state.dispatcher.registry().invalidate(&name);
    Json(ReloadResponse { name, invalidated })
}

/// GET /api/stats - aggregates for every action with recorded executions.
pub async fn all_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state
        .dispatcher
        .stats()
        .get_all_stats()
        .iter()
        .map(|(name, stats)| ActionSummary::new(name, stats))
        .collect();
    Json(StatsResponse { stats })
}

/// GET /ui - server-rendered dashboard.
pub async fn ui(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.dispatcher.stats().snapshot();
    let available = state
        .dispatcher
        .registry()
        .list_available()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to list actions for dashboard");
            Default::default()
        });
    let logs = gantry_core::logfile::tail_lines(&state.config.log_file(), dashboard::LOG_LINES)
        .unwrap_or_else(|e| vec![format!("Error reading logs: {}", e)]);

    Html(dashboard::render(&dashboard::DashboardData {
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
        available: available.into_iter().collect(),
        stats: snapshot.stats,
        history: snapshot.history,
        logs,
    }))
}
