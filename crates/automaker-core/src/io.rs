use crate::error::Result;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write `data` to `path` using a tempfile in the same directory.
///
/// The content lands in `<file>.tmp.XXXXXX` first and is then renamed over
/// `path`, so readers see either the old file or the new one, never a partial
/// write. The tempfile is removed on any failure.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let prefix = match path.file_name() {
        Some(name) => format!("{}.tmp.", name.to_string_lossy()),
        None => ".tmp.".to_string(),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .tempfile_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    // Dropping the PersistError drops the tempfile, which unlinks it.
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Serialize `value` as pretty-printed JSON and write it atomically.
pub fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    atomic_write(path, content.as_bytes())
}

/// Create a directory and all parents, idempotent. Returns the path.
pub fn ensure_dir(path: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}
