use std::path::{Path, PathBuf};

const APP_NAME: &str = "automaker";
const FALLBACK_DIR: &str = ".automaker-data";

/// Resolve the global data directory.
///
/// Priority:
/// 1. `--data-dir` flag / `AUTOMAKER_DATA_DIR` env var (passed in as `explicit`)
/// 2. `<platform config dir>/automaker`
/// 3. `./.automaker-data`
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    resolve_with(explicit, dirs::config_dir())
}

fn resolve_with(explicit: Option<&Path>, config_dir: Option<PathBuf>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    match config_dir {
        Some(dir) => dir.join(APP_NAME),
        None => PathBuf::from(FALLBACK_DIR),
    }
}
