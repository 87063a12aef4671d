use crate::output::print_json;
use anyhow::Context;
use automaker_core::migration::LegacyStorage;
use automaker_core::SettingsStore;
use std::path::Path;

/// Import a legacy storage export.
///
/// The file is either the raw key/value object or `{ "data": { ... } }`,
/// the same body the HTTP endpoint takes.
pub fn run(data_dir: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let mut value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    if let Some(inner) = value.get_mut("data").filter(|d| d.is_object()) {
        value = inner.take();
    }
    if !value.is_object() {
        anyhow::bail!("{} must contain a JSON object", file.display());
    }
    let legacy: LegacyStorage =
        serde_json::from_value(value).context("invalid legacy storage data")?;

    let store = SettingsStore::new(data_dir);
    let result = store.migrate(&legacy).context("migration failed")?;

    if json {
        print_json(&result)?;
    } else {
        println!(
            "Global settings:  {}",
            if result.migrated_global_settings { "migrated" } else { "skipped" }
        );
        println!(
            "Credentials:      {}",
            if result.migrated_credentials { "migrated" } else { "none found" }
        );
        println!("Projects:         {}", result.migrated_project_count);
        for error in &result.errors {
            eprintln!("[error] {error}");
        }
    }

    if !result.success {
        anyhow::bail!("migration finished with {} error(s)", result.errors.len());
    }
    Ok(())
}
