use automaker_core::migration::LegacyStorage;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBody {
    #[serde(default)]
    pub project_path: Option<String>,
    #[serde(default)]
    pub updates: Option<Value>,
}

impl ProjectBody {
    fn project_path(&self) -> Result<PathBuf, AppError> {
        match self.project_path.as_deref() {
            Some(p) if !p.is_empty() => Ok(PathBuf::from(p)),
            _ => Err(AppError::missing_field("projectPath")),
        }
    }
}

#[derive(serde::Deserialize)]
pub struct MigrateBody {
    #[serde(default)]
    pub data: Option<Value>,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/settings/status: whether the settings files exist yet.
pub async fn get_status(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    let store = app.settings.clone();
    let status = blocking(move || store.status()).await?;
    Ok(Json(json!({
        "success": true,
        "hasGlobalSettings": status.has_global_settings,
        "hasCredentials": status.has_credentials,
        "dataDir": status.data_dir,
        "needsMigration": status.needs_migration,
    })))
}

// ---------------------------------------------------------------------------
// Global
// ---------------------------------------------------------------------------

/// GET /api/settings/global
pub async fn get_global(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    let store = app.settings.clone();
    let settings = blocking(move || store.global()).await?;
    Ok(Json(json!({ "success": true, "settings": settings })))
}

/// PUT /api/settings/global: merge a partial settings object.
pub async fn update_global(
    State(app): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    if !body.is_object() {
        return Err(AppError::bad_request(
            "Invalid request body - expected settings object",
        ));
    }
    let store = app.settings.clone();
    let settings = blocking(move || store.update_global(&body)).await??;
    Ok(Json(json!({ "success": true, "settings": settings })))
}

// ---------------------------------------------------------------------------
// Credentials (masked on the way out)
// ---------------------------------------------------------------------------

/// GET /api/settings/credentials
pub async fn get_credentials(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    let store = app.settings.clone();
    let credentials = blocking(move || store.masked_credentials()).await?;
    Ok(Json(json!({ "success": true, "credentials": credentials })))
}

/// PUT /api/settings/credentials: returns the masked view for confirmation.
pub async fn update_credentials(
    State(app): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    if !body.is_object() {
        return Err(AppError::bad_request(
            "Invalid request body - expected credentials object",
        ));
    }
    let store = app.settings.clone();
    let credentials = blocking(move || {
        store.update_credentials(&body)?;
        Ok::<_, automaker_core::AutomakerError>(store.masked_credentials())
    })
    .await??;
    Ok(Json(json!({ "success": true, "credentials": credentials })))
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// POST /api/settings/project: POST because the path rides in the body.
pub async fn get_project(
    State(app): State<AppState>,
    Json(body): Json<ProjectBody>,
) -> Result<Json<Value>, AppError> {
    let project = body.project_path()?;
    let store = app.settings.clone();
    let settings = blocking(move || store.project(&project)).await?;
    Ok(Json(json!({ "success": true, "settings": settings })))
}

/// PUT /api/settings/project: `{ projectPath, updates }`.
pub async fn update_project(
    State(app): State<AppState>,
    Json(body): Json<ProjectBody>,
) -> Result<Json<Value>, AppError> {
    let project = body.project_path()?;
    let updates = match body.updates {
        Some(updates) if updates.is_object() => updates,
        _ => return Err(AppError::bad_request("updates object is required")),
    };
    let store = app.settings.clone();
    let settings = blocking(move || store.update_project(&project, &updates)).await??;
    Ok(Json(json!({ "success": true, "settings": settings })))
}

// ---------------------------------------------------------------------------
// Migration
// ---------------------------------------------------------------------------

/// POST /api/settings/migrate: import the legacy storage blob.
pub async fn migrate(
    State(app): State<AppState>,
    Json(body): Json<MigrateBody>,
) -> Result<Json<Value>, AppError> {
    let data = match body.data {
        Some(data) if data.is_object() => data,
        _ => {
            return Err(AppError::bad_request(
                "data object is required containing localStorage data",
            ))
        }
    };
    let legacy: LegacyStorage = serde_json::from_value(data)
        .map_err(|e| AppError::bad_request(format!("invalid legacy storage data: {e}")))?;

    info!("starting settings migration from legacy storage");
    let store = app.settings.clone();
    let result = blocking(move || store.migrate(&legacy)).await??;

    if result.success {
        info!(projects = result.migrated_project_count, "migration successful");
    } else {
        warn!(errors = %result.errors.join(", "), "migration completed with errors");
    }
    Ok(Json(serde_json::to_value(result)?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn app(dir: &tempfile::TempDir) -> AppState {
        AppState::new(dir.path().join("data"))
    }

    #[tokio::test]
    async fn status_needs_migration_on_fresh_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = get_status(State(app(&dir))).await.unwrap();
        assert_eq!(result.0["success"], true);
        assert_eq!(result.0["hasGlobalSettings"], false);
        assert_eq!(result.0["needsMigration"], true);
    }

    #[tokio::test]
    async fn update_then_get_global() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = app(&dir);
        update_global(State(app.clone()), Json(json!({ "theme": "retro" })))
            .await
            .unwrap();
        let result = get_global(State(app)).await.unwrap();
        assert_eq!(result.0["settings"]["theme"], "retro");
        assert_eq!(result.0["settings"]["version"], 1);
    }

    #[tokio::test]
    async fn non_object_global_body_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = update_global(State(app(&dir)), Json(json!(["theme"])))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn credentials_are_never_returned_in_clear() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = app(&dir);
        let result = update_credentials(
            State(app.clone()),
            Json(json!({ "apiKeys": { "anthropic": "sk-ant-1234567890" } })),
        )
        .await
        .unwrap();
        assert_eq!(result.0["credentials"]["anthropic"]["masked"], "sk-a...7890");
        assert!(!result.0.to_string().contains("sk-ant-1234567890"));

        let result = get_credentials(State(app)).await.unwrap();
        assert_eq!(result.0["credentials"]["anthropic"]["configured"], true);
        assert_eq!(result.0["credentials"]["google"]["configured"], false);
    }

    #[tokio::test]
    async fn project_requires_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let body = ProjectBody {
            project_path: None,
            updates: None,
        };
        let err = get_project(State(app(&dir)), Json(body)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn project_update_requires_updates_object() {
        let dir = tempfile::TempDir::new().unwrap();
        let body = ProjectBody {
            project_path: Some(dir.path().join("proj").to_string_lossy().into_owned()),
            updates: Some(json!("dark")),
        };
        let err = update_project(State(app(&dir)), Json(body))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn project_update_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = app(&dir);
        let project = dir.path().join("proj").to_string_lossy().into_owned();
        update_project(
            State(app.clone()),
            Json(ProjectBody {
                project_path: Some(project.clone()),
                updates: Some(json!({ "lastSelectedSessionId": "s-1" })),
            }),
        )
        .await
        .unwrap();
        let result = get_project(
            State(app),
            Json(ProjectBody {
                project_path: Some(project),
                updates: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(result.0["settings"]["lastSelectedSessionId"], "s-1");
    }

    #[tokio::test]
    async fn migrate_requires_data_object() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = migrate(State(app(&dir)), Json(MigrateBody { data: None }))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn migrate_reports_result() {
        let dir = tempfile::TempDir::new().unwrap();
        let body = MigrateBody {
            data: Some(json!({
                "automaker-storage": "{\"state\":{\"theme\":\"nord\"}}",
                "worktree-panel-collapsed": "true"
            })),
        };
        let result = migrate(State(app(&dir)), Json(body)).await.unwrap();
        assert_eq!(result.0["success"], true);
        assert_eq!(result.0["migratedGlobalSettings"], true);
        assert_eq!(result.0["migratedCredentials"], false);
        assert_eq!(result.0["migratedProjectCount"], 0);
    }

    #[tokio::test]
    async fn migrate_accepts_non_string_values() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = app(&dir);
        let body = MigrateBody {
            data: Some(json!({ "worktree-panel-collapsed": true })),
        };
        let result = migrate(State(app.clone()), Json(body)).await.unwrap();
        assert_eq!(result.0["success"], true);
        let global = get_global(State(app)).await.unwrap();
        assert_eq!(global.0["settings"]["worktreePanelCollapsed"], true);
    }
}
