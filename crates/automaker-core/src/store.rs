use crate::credentials::MaskedCredentials;
use crate::document::{default_object, from_stored, merge_objects, merge_update, SettingsDocument};
use crate::error::{AutomakerError, Result};
use crate::io::atomic_write_json;
use crate::paths;
use crate::types::{Credentials, GlobalSettings, ProjectSettings};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Outcome of reading a settings document from disk.
///
/// `Partial` and `CorruptFallback` carry what was set aside so callers can
/// surface it instead of silently losing data.
#[derive(Debug, Clone, PartialEq)]
pub enum Load<D> {
    /// No file on disk; compiled-in defaults.
    Default(D),
    /// File parsed and merged over the defaults.
    Loaded(D),
    /// File parsed, but some keys did not fit the schema and were replaced by
    /// their defaults. The file itself keeps them.
    Partial { value: D, rejected: Vec<String> },
    /// File present but unreadable or not JSON; defaults substituted.
    CorruptFallback { value: D, error: String },
}

impl<D> Load<D> {
    pub fn into_inner(self) -> D {
        match self {
            Load::Default(value) | Load::Loaded(value) => value,
            Load::Partial { value, .. } | Load::CorruptFallback { value, .. } => value,
        }
    }

    pub fn value(&self) -> &D {
        match self {
            Load::Default(value) | Load::Loaded(value) => value,
            Load::Partial { value, .. } | Load::CorruptFallback { value, .. } => value,
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Load::CorruptFallback { .. })
    }
}

/// The parsed file, or `None` when there is no file.
fn read_raw(path: &Path) -> Result<Option<Value>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn read_document<D: SettingsDocument>(path: &Path) -> Load<D> {
    let stored = match read_raw(path) {
        Ok(None) => return Load::Default(D::default()),
        Ok(Some(stored)) => stored,
        Err(e) => return corrupt(path, e.to_string()),
    };
    match from_stored::<D>(stored) {
        Ok((value, rejected)) if rejected.is_empty() => Load::Loaded(value),
        Ok((value, rejected)) => {
            warn!(
                path = %path.display(),
                rejected = %rejected.join("; "),
                "{} has values that do not fit the schema, using defaults for them",
                D::KIND
            );
            Load::Partial { value, rejected }
        }
        Err(e) => corrupt(path, e.to_string()),
    }
}

fn corrupt<D: SettingsDocument>(path: &Path, reason: String) -> Load<D> {
    error!(
        path = %path.display(),
        error = %reason,
        "unreadable {}, falling back to defaults",
        D::KIND
    );
    Load::CorruptFallback {
        value: D::default(),
        error: reason,
    }
}

/// Merge `partial` over the stored object and persist. The parent directory
/// must exist.
///
/// A file that cannot be read is never overwritten. A file that is not a
/// JSON object is replaced, matching what `get` serves for it.
fn update_document<D: SettingsDocument>(path: &Path, partial: &Value) -> Result<D> {
    let stored = match read_raw(path) {
        Ok(Some(Value::Object(stored))) => stored,
        Ok(None) => Map::new(),
        Ok(Some(_)) | Err(AutomakerError::Json(_)) => {
            error!(path = %path.display(), "replacing unparseable {}", D::KIND);
            Map::new()
        }
        Err(e) => return Err(e),
    };
    let current = merge_objects::<D>(&default_object::<D>()?, &stored);
    let merged = merge_update::<D>(&current, partial)?;
    atomic_write_json(path, &merged)?;
    let (updated, _) = from_stored::<D>(Value::Object(merged))?;
    Ok(updated)
}

// ---------------------------------------------------------------------------
// SettingsStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsStatus {
    pub has_global_settings: bool,
    pub has_credentials: bool,
    pub data_dir: PathBuf,
    /// No global settings file yet, so the legacy blob has not been imported.
    pub needs_migration: bool,
}

// ---------------------------------------------------------------------------
// SettingsStore
// ---------------------------------------------------------------------------

/// Typed, defaulted, atomically persisted access to the settings documents
/// rooted at one global data directory.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    data_dir: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // -- global -------------------------------------------------------------

    pub fn load_global(&self) -> Load<GlobalSettings> {
        read_document(&paths::global_settings_path(&self.data_dir))
    }

    pub fn global(&self) -> GlobalSettings {
        self.load_global().into_inner()
    }

    pub fn update_global(&self, partial: &Value) -> Result<GlobalSettings> {
        paths::ensure_data_dir(&self.data_dir)?;
        let updated = update_document(&paths::global_settings_path(&self.data_dir), partial)?;
        info!("global settings updated");
        Ok(updated)
    }

    pub fn has_global(&self) -> bool {
        paths::global_settings_path(&self.data_dir).exists()
    }

    // -- credentials --------------------------------------------------------

    pub fn load_credentials(&self) -> Load<Credentials> {
        read_document(&paths::credentials_path(&self.data_dir))
    }

    /// Raw credentials. Never hand this across an untrusted boundary; use
    /// [`SettingsStore::masked_credentials`] instead.
    pub fn credentials(&self) -> Credentials {
        self.load_credentials().into_inner()
    }

    pub fn update_credentials(&self, partial: &Value) -> Result<Credentials> {
        paths::ensure_data_dir(&self.data_dir)?;
        let updated = update_document(&paths::credentials_path(&self.data_dir), partial)?;
        info!("credentials updated");
        Ok(updated)
    }

    pub fn masked_credentials(&self) -> MaskedCredentials {
        MaskedCredentials::from(&self.credentials())
    }

    pub fn has_credentials(&self) -> bool {
        paths::credentials_path(&self.data_dir).exists()
    }

    // -- project ------------------------------------------------------------

    pub fn load_project(&self, project: &Path) -> Load<ProjectSettings> {
        read_document(&paths::project_settings_path(project))
    }

    pub fn project(&self, project: &Path) -> ProjectSettings {
        self.load_project(project).into_inner()
    }

    pub fn update_project(&self, project: &Path, partial: &Value) -> Result<ProjectSettings> {
        paths::ensure_app_dir(project)?;
        let updated = update_document(&paths::project_settings_path(project), partial)?;
        info!(project = %project.display(), "project settings updated");
        Ok(updated)
    }

    pub fn has_project(&self, project: &Path) -> bool {
        paths::project_settings_path(project).exists()
    }

    // -- status -------------------------------------------------------------

    pub fn status(&self) -> SettingsStatus {
        let has_global_settings = self.has_global();
        SettingsStatus {
            has_global_settings,
            has_credentials: self.has_credentials(),
            data_dir: self.data_dir.clone(),
            needs_migration: !has_global_settings,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ThemeMode, CREDENTIALS_VERSION, SETTINGS_VERSION};
    use serde_json::json;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join("data"))
    }

    #[test]
    fn missing_files_yield_defaults_without_creating_anything() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert_eq!(store.load_global(), Load::Default(GlobalSettings::default()));
        assert_eq!(store.credentials(), Credentials::default());
        assert_eq!(
            store.project(&dir.path().join("proj")),
            ProjectSettings::default()
        );
        assert!(!store.data_dir().exists());
        assert!(!store.has_global());
        assert!(!store.has_credentials());
    }

    #[test]
    fn update_then_get_reflects_partial() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let partial = json!({ "theme": "nord", "maxConcurrency": 7, "muteDoneSound": true });
        let updated = store.update_global(&partial).unwrap();

        let read = store.global();
        assert_eq!(read, updated);
        assert_eq!(read.theme, ThemeMode::Nord);
        assert_eq!(read.max_concurrency, 7);
        assert!(read.mute_done_sound);
        assert_eq!(read.version, SETTINGS_VERSION);
        assert!(store.has_global());
        assert!(matches!(store.load_global(), Load::Loaded(_)));
    }

    #[test]
    fn update_stamps_current_version_over_partial() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let updated = store
            .update_credentials(&json!({ "version": 99, "apiKeys": { "openai": "sk-o" } }))
            .unwrap();
        assert_eq!(updated.version, CREDENTIALS_VERSION);
        assert_eq!(store.credentials().version, CREDENTIALS_VERSION);
    }

    #[test]
    fn round_trip_preserves_written_document() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let project = dir.path().join("proj");
        let written = store
            .update_project(
                &project,
                &json!({
                    "theme": "dracula",
                    "useWorktrees": true,
                    "currentWorktree": { "path": null, "branch": "main" },
                    "worktrees": [
                        { "path": "/w/main", "branch": "main", "isMain": true },
                        { "path": "/w/feat", "branch": "feat", "isMain": false,
                          "hasChanges": true, "changedFilesCount": 3 }
                    ],
                    "boardBackground": { "imagePath": "board/bg.png", "imageVersion": 2,
                                         "cardOpacity": 80 },
                    "lastSelectedSessionId": "session-9"
                }),
            )
            .unwrap();
        assert!(project.join(".appdata/settings.json").exists());
        assert_eq!(store.project(&project), written);
        assert!(store.has_project(&project));
    }

    #[test]
    fn missing_shortcut_is_backfilled_on_read() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::create_dir_all(store.data_dir()).unwrap();
        std::fs::write(
            paths::global_settings_path(store.data_dir()),
            r#"{ "version": 1, "theme": "light", "keyboardShortcuts": { "board": "B", "agent": "X" } }"#,
        )
        .unwrap();

        let settings = store.global();
        assert_eq!(settings.keyboard_shortcuts.terminal, "T");
        assert_eq!(settings.keyboard_shortcuts.board, "B");
        assert_eq!(settings.keyboard_shortcuts.agent, "X");
        assert_eq!(settings.theme, ThemeMode::Light);
    }

    #[test]
    fn shortcut_update_merges_with_existing_shortcuts() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .update_global(&json!({ "keyboardShortcuts": { "board": "B" } }))
            .unwrap();
        let updated = store
            .update_global(&json!({ "keyboardShortcuts": { "agent": "Y" } }))
            .unwrap();
        assert_eq!(updated.keyboard_shortcuts.board, "B");
        assert_eq!(updated.keyboard_shortcuts.agent, "Y");
    }

    #[test]
    fn corrupt_file_falls_back_and_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::create_dir_all(store.data_dir()).unwrap();
        std::fs::write(paths::credentials_path(store.data_dir()), "{ not json").unwrap();

        let load = store.load_credentials();
        assert!(load.is_corrupt());
        assert_eq!(load.value(), &Credentials::default());
        assert_eq!(store.credentials(), Credentials::default());
    }

    #[test]
    fn off_schema_value_is_reported_and_the_rest_kept() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::create_dir_all(store.data_dir()).unwrap();
        std::fs::write(
            paths::global_settings_path(store.data_dir()),
            r#"{ "theme": "gruvbox", "maxConcurrency": "lots" }"#,
        )
        .unwrap();

        let load = store.load_global();
        assert!(!load.is_corrupt());
        let Load::Partial { value, rejected } = load else {
            panic!("expected a partial load");
        };
        assert_eq!(value.theme, ThemeMode::Gruvbox);
        assert_eq!(value.max_concurrency, 3);
        assert_eq!(rejected.len(), 1);
    }

    #[test]
    fn update_keeps_stored_data_next_to_an_off_schema_value() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let path = paths::global_settings_path(store.data_dir());
        std::fs::create_dir_all(store.data_dir()).unwrap();
        std::fs::write(
            &path,
            r#"{"theme":"nord","maxConcurrency":-1,"projects":[{"id":"1","name":"a","path":"/work/a"}]}"#,
        )
        .unwrap();

        let updated = store.update_global(&json!({ "muteDoneSound": true })).unwrap();
        assert_eq!(updated.theme, ThemeMode::Nord);
        assert_eq!(updated.projects.len(), 1);
        assert!(updated.mute_done_sound);

        let on_disk: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["maxConcurrency"], -1);
        assert_eq!(on_disk["projects"][0]["path"], "/work/a");
        assert_eq!(on_disk["muteDoneSound"], true);
        assert_eq!(on_disk["version"], SETTINGS_VERSION);
    }

    #[test]
    fn update_keeps_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let project = dir.path().join("proj");
        let path = paths::project_settings_path(&project);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "version": 1, "pinnedFeature": "feat-7" }"#).unwrap();

        store
            .update_project(&project, &json!({ "useWorktrees": true }))
            .unwrap();
        let on_disk: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["pinnedFeature"], "feat-7");
        assert_eq!(on_disk["useWorktrees"], true);
    }

    #[cfg(unix)]
    #[test]
    fn failed_write_leaves_existing_file_bytes_unchanged() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.update_global(&json!({ "theme": "nord" })).unwrap();
        let path = paths::global_settings_path(store.data_dir());
        let before = std::fs::read(&path).unwrap();

        let data_dir = store.data_dir().to_path_buf();
        std::fs::set_permissions(&data_dir, std::fs::Permissions::from_mode(0o555)).unwrap();
        // Directory permissions do not bind a privileged user.
        let writable = std::fs::write(data_dir.join("write-check"), "x").is_ok();
        let result = if writable {
            None
        } else {
            Some(store.update_global(&json!({ "theme": "dracula" })))
        };
        std::fs::set_permissions(&data_dir, std::fs::Permissions::from_mode(0o755)).unwrap();

        if let Some(result) = result {
            assert!(matches!(result, Err(AutomakerError::Io(_))));
            assert_eq!(std::fs::read(&path).unwrap(), before);
            assert_eq!(store.global().theme, ThemeMode::Nord);
            let leftovers = std::fs::read_dir(&data_dir)
                .unwrap()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
                .count();
            assert_eq!(leftovers, 0);
        }
    }

    #[test]
    fn failed_rename_propagates_io_error_and_keeps_target() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let target = paths::global_settings_path(store.data_dir());
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("sentinel"), "unchanged").unwrap();

        let err = store.update_global(&json!({ "theme": "nord" })).unwrap_err();
        assert!(matches!(err, AutomakerError::Io(_)));
        assert_eq!(
            std::fs::read_to_string(target.join("sentinel")).unwrap(),
            "unchanged"
        );
    }

    #[test]
    fn unreadable_file_is_not_overwritten_by_update() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::create_dir_all(store.data_dir()).unwrap();
        let path = paths::global_settings_path(store.data_dir());
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = store.update_global(&json!({ "theme": "nord" })).unwrap_err();
        assert!(matches!(err, AutomakerError::Io(_)));
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xff, 0xfe, 0x00]);
    }

    #[test]
    fn invalid_update_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.update_global(&json!({ "theme": "nord" })).unwrap();
        let before = std::fs::read(paths::global_settings_path(store.data_dir())).unwrap();

        let err = store.update_global(&json!({ "theme": 42 })).unwrap_err();
        assert!(matches!(err, AutomakerError::InvalidUpdate(_)));
        let after = std::fs::read(paths::global_settings_path(store.data_dir())).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn status_reports_migration_need() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let status = store.status();
        assert!(status.needs_migration);
        assert!(!status.has_credentials);

        store.update_global(&json!({})).unwrap();
        let status = store.status();
        assert!(status.has_global_settings);
        assert!(!status.needs_migration);
        assert_eq!(status.data_dir, dir.path().join("data"));
    }
}
