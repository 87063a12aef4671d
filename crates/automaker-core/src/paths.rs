use crate::error::Result;
use crate::io::ensure_dir;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

/// Per-project data directory, owned by the project it lives in.
pub const APP_DIR: &str = ".appdata";
pub const FEATURES_DIR: &str = "features";
pub const BOARD_DIR: &str = "board";
pub const IMAGES_DIR: &str = "images";
pub const CONTEXT_DIR: &str = "context";
pub const WORKTREES_DIR: &str = "worktrees";

pub const SETTINGS_FILE: &str = "settings.json";
pub const CREDENTIALS_FILE: &str = "credentials.json";
pub const APP_SPEC_FILE: &str = "app_spec.txt";
pub const BRANCH_TRACKING_FILE: &str = "active-branches.json";

// ---------------------------------------------------------------------------
// Global data directory
// ---------------------------------------------------------------------------

pub fn global_settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SETTINGS_FILE)
}

/// Kept apart from `settings.json` so the secrets file can be handled separately.
pub fn credentials_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CREDENTIALS_FILE)
}

pub fn ensure_data_dir(data_dir: &Path) -> Result<PathBuf> {
    ensure_dir(data_dir)
}

// ---------------------------------------------------------------------------
// Per-project layout
// ---------------------------------------------------------------------------

pub fn app_dir(project: &Path) -> PathBuf {
    project.join(APP_DIR)
}

pub fn project_settings_path(project: &Path) -> PathBuf {
    app_dir(project).join(SETTINGS_FILE)
}

pub fn features_dir(project: &Path) -> PathBuf {
    app_dir(project).join(FEATURES_DIR)
}

pub fn feature_dir(project: &Path, feature_id: &str) -> PathBuf {
    features_dir(project).join(feature_id)
}

pub fn feature_images_dir(project: &Path, feature_id: &str) -> PathBuf {
    feature_dir(project, feature_id).join(IMAGES_DIR)
}

/// Board backgrounds and other board assets.
pub fn board_dir(project: &Path) -> PathBuf {
    app_dir(project).join(BOARD_DIR)
}

pub fn images_dir(project: &Path) -> PathBuf {
    app_dir(project).join(IMAGES_DIR)
}

/// User-added context files.
pub fn context_dir(project: &Path) -> PathBuf {
    app_dir(project).join(CONTEXT_DIR)
}

pub fn worktrees_dir(project: &Path) -> PathBuf {
    app_dir(project).join(WORKTREES_DIR)
}

pub fn app_spec_path(project: &Path) -> PathBuf {
    app_dir(project).join(APP_SPEC_FILE)
}

pub fn branch_tracking_path(project: &Path) -> PathBuf {
    app_dir(project).join(BRANCH_TRACKING_FILE)
}

pub fn ensure_app_dir(project: &Path) -> Result<PathBuf> {
    ensure_dir(&app_dir(project))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
