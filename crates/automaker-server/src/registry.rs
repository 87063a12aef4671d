use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{info, warn};

struct RunEntry {
    label: String,
    started_at: DateTime<Utc>,
    abort: Option<AbortHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatus {
    pub project_path: String,
    pub project_name: String,
    pub label: String,
    pub started_at: DateTime<Utc>,
}

/// Generations currently running, keyed by project path.
///
/// Owned by `AppState` and handed to handlers, so each test can build its
/// own isolated registry. A generation runner registers through `start` and
/// `finish`; the HTTP surface only lists and stops.
#[derive(Default)]
pub struct RunRegistry {
    runs: Mutex<HashMap<String, RunEntry>>,
}

impl RunRegistry {
    /// Register a run for `project`. At most one run per project.
    pub async fn start(
        &self,
        project: &str,
        label: &str,
        abort: Option<AbortHandle>,
    ) -> Result<(), AppError> {
        let mut runs = self.runs.lock().await;
        if runs.contains_key(project) {
            warn!(project, "run already in progress");
            return Err(AppError::conflict(format!(
                "A run is already in progress for '{project}'"
            )));
        }
        runs.insert(
            project.to_string(),
            RunEntry {
                label: label.to_string(),
                started_at: Utc::now(),
                abort,
            },
        );
        info!(project, label, "run started");
        Ok(())
    }

    /// Forget a run that ended on its own. Returns false if none was registered.
    pub async fn finish(&self, project: &str) -> bool {
        self.runs.lock().await.remove(project).is_some()
    }

    /// Abort and forget the run for `project`. Returns false if none was running.
    pub async fn stop(&self, project: &str) -> bool {
        let removed = self.runs.lock().await.remove(project);
        match removed {
            Some(entry) => {
                if let Some(handle) = entry.abort {
                    handle.abort();
                }
                info!(project, "run stopped");
                true
            }
            None => false,
        }
    }

    pub async fn is_running(&self, project: &str) -> bool {
        self.runs.lock().await.contains_key(project)
    }

    /// All running generations, ordered by project path.
    pub async fn snapshot(&self) -> Vec<RunStatus> {
        let runs = self.runs.lock().await;
        let mut list: Vec<RunStatus> = runs
            .iter()
            .map(|(path, entry)| RunStatus {
                project_path: path.clone(),
                project_name: Path::new(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.clone()),
                label: entry.label.clone(),
                started_at: entry.started_at,
            })
            .collect();
        list.sort_by(|a, b| a.project_path.cmp(&b.project_path));
        list
    }
}
