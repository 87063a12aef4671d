use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopBody {
    #[serde(default)]
    pub project_path: Option<String>,
}

/// GET /api/running-agents
pub async fn list_running(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    let runs = app.runs.snapshot().await;
    Ok(Json(json!({
        "success": true,
        "totalCount": runs.len(),
        "runningAgents": runs,
    })))
}

/// POST /api/running-agents/stop: idempotent; `stopped` says whether a run
/// was actually aborted.
pub async fn stop_run(
    State(app): State<AppState>,
    Json(body): Json<StopBody>,
) -> Result<Json<Value>, AppError> {
    let project = match body.project_path.as_deref() {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => return Err(AppError::missing_field("projectPath")),
    };
    let stopped = app.runs.stop(&project).await;
    Ok(Json(json!({ "success": true, "stopped": stopped })))
}
