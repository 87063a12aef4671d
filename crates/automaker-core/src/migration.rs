//! One-shot import of the legacy flat key-value storage into the settings
//! documents.
//!
//! Every step records its own failure as a string and the remaining steps
//! still run; whatever succeeded stays written. Only a failure to persist the
//! global settings document aborts the import.

use crate::error::Result;
use crate::store::SettingsStore;
use crate::types::{
    AgentModel, AiProfile, KanbanCardDetailLevel, KeyboardShortcuts, PlanningMode, ProjectRef,
    ThemeMode, TrashedProjectRef,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Input / output
// ---------------------------------------------------------------------------

/// The legacy storage keys, each holding a raw string value. Non-string
/// values are accepted and kept as their JSON text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyStorage {
    /// JSON-encoded app state, optionally wrapped as `{ "state": … }`.
    #[serde(rename = "automaker-storage", default, deserialize_with = "raw_value")]
    pub app_state: Option<String>,
    /// Accepted for completeness; carries nothing the documents keep.
    #[serde(rename = "automaker-setup", default, deserialize_with = "raw_value")]
    pub setup: Option<String>,
    #[serde(rename = "worktree-panel-collapsed", default, deserialize_with = "raw_value")]
    pub worktree_panel_collapsed: Option<String>,
    /// JSON array of folder paths.
    #[serde(rename = "file-browser-recent-folders", default, deserialize_with = "raw_value")]
    pub recent_folders: Option<String>,
    #[serde(rename = "automaker:lastProjectDir", default, deserialize_with = "raw_value")]
    pub last_project_dir: Option<String>,
}

fn raw_value<'de, De>(de: De) -> std::result::Result<Option<String>, De::Error>
where
    De: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    pub success: bool,
    pub migrated_global_settings: bool,
    pub migrated_credentials: bool,
    pub migrated_project_count: usize,
    pub errors: Vec<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Field extraction
// ---------------------------------------------------------------------------

/// Typed reads from the legacy app state. A value of the wrong shape is
/// recorded in `errors` and replaced by its default; absent and null keys are
/// silently defaulted.
struct Fields<'a> {
    state: &'a Map<String, Value>,
    errors: Vec<String>,
}

impl<'a> Fields<'a> {
    fn new(state: &'a Map<String, Value>) -> Self {
        Self {
            state,
            errors: Vec::new(),
        }
    }

    fn present(&self, key: &str) -> Option<&'a Value> {
        self.state.get(key).filter(|v| !v.is_null())
    }

    fn value<T: DeserializeOwned>(&mut self, key: &str, default: T) -> T {
        let Some(value) = self.present(key) else {
            return default;
        };
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.errors
                    .push(format!("Invalid {key} in automaker-storage: {e}"));
                default
            }
        }
    }

    fn flag(&mut self, key: &str, default: bool) -> bool {
        self.value(key, default)
    }

    /// Element by element; bad entries are skipped and reported by index.
    fn list<T: DeserializeOwned>(&mut self, key: &str) -> Vec<T> {
        let items = match self.present(key) {
            None => return Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.errors
                    .push(format!("Invalid {key} in automaker-storage: expected an array"));
                return Vec::new();
            }
        };
        let mut kept = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match serde_json::from_value(item.clone()) {
                Ok(parsed) => kept.push(parsed),
                Err(e) => self
                    .errors
                    .push(format!("Skipped {key}[{i}] in automaker-storage: {e}")),
            }
        }
        kept
    }
}

fn parse_app_state(raw: &str) -> std::result::Result<Map<String, Value>, serde_json::Error> {
    let state = match serde_json::from_str::<Value>(raw)? {
        Value::Object(mut outer) => match outer.remove("state") {
            Some(Value::Object(inner)) => inner,
            _ => outer,
        },
        _ => Map::new(),
    };
    Ok(state)
}

fn global_partial(
    fields: &mut Fields<'_>,
    projects: &[ProjectRef],
    legacy: &LegacyStorage,
) -> Value {
    let max_concurrency = match fields.value::<u32>("maxConcurrency", 0) {
        0 => 3,
        n => n,
    };
    let default_ai_profile_id = fields
        .value::<Option<String>>("defaultAIProfileId", None)
        .filter(|id| !id.is_empty());
    let ai_profiles: Vec<AiProfile> = fields.list("aiProfiles");
    let trashed_projects: Vec<TrashedProjectRef> = fields.list("trashedProjects");
    let project_history: Vec<String> = fields.list("projectHistory");
    let project_history_index: i64 = fields.value("projectHistoryIndex", -1);
    let last_sessions: BTreeMap<String, String> =
        fields.value("lastSelectedSessionByProject", BTreeMap::new());
    let theme = fields.value("theme", ThemeMode::Dark);
    let detail_level = fields.value("kanbanCardDetailLevel", KanbanCardDetailLevel::Standard);
    let planning_mode = fields.value("defaultPlanningMode", PlanningMode::Skip);
    let enhancement_model = fields.value("enhancementModel", AgentModel::Sonnet);
    let shortcuts = fields.value("keyboardShortcuts", KeyboardShortcuts::default());

    let partial = json!({
        "theme": theme,
        "sidebarOpen": fields.flag("sidebarOpen", true),
        "chatHistoryOpen": fields.flag("chatHistoryOpen", false),
        "kanbanCardDetailLevel": detail_level,
        "maxConcurrency": max_concurrency,
        "defaultSkipTests": fields.flag("defaultSkipTests", true),
        "enableDependencyBlocking": fields.flag("enableDependencyBlocking", true),
        "useWorktrees": fields.flag("useWorktrees", false),
        "showProfilesOnly": fields.flag("showProfilesOnly", false),
        "defaultPlanningMode": planning_mode,
        "defaultRequirePlanApproval": fields.flag("defaultRequirePlanApproval", false),
        "defaultAIProfileId": default_ai_profile_id,
        "muteDoneSound": fields.flag("muteDoneSound", false),
        "enhancementModel": enhancement_model,
        "keyboardShortcuts": shortcuts,
        "aiProfiles": ai_profiles,
        "projects": projects,
        "trashedProjects": trashed_projects,
        "projectHistory": project_history,
        "projectHistoryIndex": project_history_index,
        "lastSelectedSessionByProject": last_sessions,
    });

    let mut fields = match partial {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    if let Some(dir) = non_empty(&legacy.last_project_dir) {
        fields.insert("lastProjectDir".into(), Value::from(dir));
    }
    if let Some(raw) = non_empty(&legacy.recent_folders) {
        let folders: Vec<String> = serde_json::from_str(raw).unwrap_or_default();
        fields.insert("recentFolders".into(), json!(folders));
    }
    if let Some(raw) = non_empty(&legacy.worktree_panel_collapsed) {
        fields.insert("worktreePanelCollapsed".into(), Value::from(raw == "true"));
    }
    Value::Object(fields)
}

fn credentials_partial(state: &Map<String, Value>) -> Option<Value> {
    let Some(Value::Object(keys)) = state.get("apiKeys") else {
        return None;
    };
    let key = |name: &str| {
        keys.get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Some(json!({
        "apiKeys": {
            "anthropic": key("anthropic"),
            "google": key("google"),
            "openai": key("openai"),
        }
    }))
}

// ---------------------------------------------------------------------------
// Per-project sources
// ---------------------------------------------------------------------------

struct ProjectSources {
    board_backgrounds: Map<String, Value>,
    current_worktrees: Map<String, Value>,
    worktrees: Map<String, Value>,
    themes: Vec<(String, String)>,
}

impl ProjectSources {
    fn from_state(state: &Map<String, Value>, projects: &[ProjectRef]) -> Self {
        let map = |key: &str| match state.get(key) {
            Some(Value::Object(m)) => m.clone(),
            _ => Map::new(),
        };
        let themes = projects
            .iter()
            .filter_map(|p| match p.theme.as_deref() {
                Some(theme) if !theme.is_empty() => Some((p.path.clone(), theme.to_string())),
                _ => None,
            })
            .collect();
        Self {
            board_backgrounds: map("boardBackgroundByProject"),
            current_worktrees: map("currentWorktreeByProject"),
            worktrees: map("worktreesByProject"),
            themes,
        }
    }

    /// Distinct project paths, in first-seen order.
    fn project_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        let candidates = self
            .board_backgrounds
            .keys()
            .chain(self.current_worktrees.keys())
            .chain(self.worktrees.keys())
            .chain(self.themes.iter().map(|(path, _)| path));
        for path in candidates {
            if !paths.contains(path) {
                paths.push(path.clone());
            }
        }
        paths
    }

    fn theme_for(&self, path: &str) -> Option<&str> {
        self.themes
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, theme)| theme.as_str())
    }

    /// Build the project partial; unknown theme names are reported and skipped.
    fn partial_for(&self, path: &str, errors: &mut Vec<String>) -> Map<String, Value> {
        let mut partial = Map::new();
        if let Some(theme) = self.theme_for(path) {
            match ThemeMode::parse(theme) {
                Some(theme) => {
                    partial.insert("theme".into(), Value::from(theme.as_str()));
                }
                None => errors.push(format!("Unknown theme '{theme}' for project {path}")),
            }
        }
        let sources = [
            ("boardBackground", &self.board_backgrounds),
            ("currentWorktree", &self.current_worktrees),
            ("worktrees", &self.worktrees),
        ];
        for (key, source) in sources {
            match source.get(path) {
                None | Some(Value::Null) => {}
                Some(value) => {
                    partial.insert(key.into(), value.clone());
                }
            }
        }
        partial
    }
}

// ---------------------------------------------------------------------------
// SettingsStore::migrate
// ---------------------------------------------------------------------------

impl SettingsStore {
    /// Import the legacy storage blob into the three settings documents.
    ///
    /// Running it again with the same input rewrites the same values; list
    /// fields are replaced, never appended.
    pub fn migrate(&self, legacy: &LegacyStorage) -> Result<MigrationResult> {
        let mut errors = Vec::new();
        let mut migrated_credentials = false;
        let mut migrated_project_count = 0;

        let state = match non_empty(&legacy.app_state) {
            Some(raw) => parse_app_state(raw).unwrap_or_else(|e| {
                errors.push(format!("Failed to parse automaker-storage: {e}"));
                Map::new()
            }),
            None => Map::new(),
        };

        let mut fields = Fields::new(&state);
        let projects: Vec<ProjectRef> = fields.list("projects");
        let global = global_partial(&mut fields, &projects, legacy);
        errors.append(&mut fields.errors);

        self.update_global(&global)?;
        info!("migrated global settings from legacy storage");

        if let Some(partial) = credentials_partial(&state) {
            match self.update_credentials(&partial) {
                Ok(_) => {
                    migrated_credentials = true;
                    info!("migrated credentials from legacy storage");
                }
                Err(e) => errors.push(format!("Failed to migrate credentials: {e}")),
            }
        }

        let sources = ProjectSources::from_state(&state, &projects);
        for path in sources.project_paths() {
            let partial = sources.partial_for(&path, &mut errors);
            if partial.is_empty() {
                continue;
            }
            match self.update_project(Path::new(&path), &Value::Object(partial)) {
                Ok(_) => migrated_project_count += 1,
                Err(e) => {
                    errors.push(format!("Failed to migrate project settings for {path}: {e}"))
                }
            }
        }

        for e in &errors {
            warn!(error = %e, "legacy migration step failed");
        }
        info!(projects = migrated_project_count, "migration complete");

        Ok(MigrationResult {
            success: errors.is_empty(),
            migrated_global_settings: true,
            migrated_credentials,
            migrated_project_count,
            errors,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
