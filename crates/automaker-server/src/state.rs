use crate::registry::RunRegistry;
use automaker_core::SettingsStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<SettingsStore>,
    pub runs: Arc<RunRegistry>,
}

impl AppState {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            settings: Arc::new(SettingsStore::new(data_dir)),
            runs: Arc::new(RunRegistry::default()),
        }
    }
}
