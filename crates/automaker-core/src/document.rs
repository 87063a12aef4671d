//! Persisted settings documents and the JSON merge rules they share.
//!
//! Each document declares which of its top-level keys hold nested objects
//! that merge key-by-key instead of being replaced wholesale. The merge
//! routines below only consult that table.

use crate::error::{AutomakerError, Result};
use crate::types::{
    Credentials, GlobalSettings, ProjectSettings, CREDENTIALS_VERSION, PROJECT_SETTINGS_VERSION,
    SETTINGS_VERSION,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

pub trait SettingsDocument: Serialize + DeserializeOwned + Default {
    /// Human-readable name used in log lines.
    const KIND: &'static str;
    /// Schema version stamped on every write.
    const VERSION: u32;
    /// Top-level keys whose object values merge one level deep.
    const NESTED_MERGE_KEYS: &'static [&'static str];
}

impl SettingsDocument for GlobalSettings {
    const KIND: &'static str = "global settings";
    const VERSION: u32 = SETTINGS_VERSION;
    const NESTED_MERGE_KEYS: &'static [&'static str] = &["keyboardShortcuts"];
}

impl SettingsDocument for Credentials {
    const KIND: &'static str = "credentials";
    const VERSION: u32 = CREDENTIALS_VERSION;
    const NESTED_MERGE_KEYS: &'static [&'static str] = &["apiKeys"];
}

impl SettingsDocument for ProjectSettings {
    const KIND: &'static str = "project settings";
    const VERSION: u32 = PROJECT_SETTINGS_VERSION;
    const NESTED_MERGE_KEYS: &'static [&'static str] = &["boardBackground"];
}

/// The compiled-in default of `D` as a JSON object.
pub fn default_object<D: SettingsDocument>() -> Result<Map<String, Value>> {
    match serde_json::to_value(D::default())? {
        Value::Object(map) => Ok(map),
        other => Err(AutomakerError::InvalidUpdate(format!(
            "{} default is not an object: {other}",
            D::KIND
        ))),
    }
}

/// Overlay `overlay` onto `base`: overlay wins per top-level key, and for
/// every nested merge key where both sides hold objects the inner keys are
/// merged the same way.
pub fn merge_objects<D: SettingsDocument>(
    base: &Map<String, Value>,
    overlay: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    for key in D::NESTED_MERGE_KEYS {
        if let (Some(Value::Object(inner_base)), Some(Value::Object(inner_overlay))) =
            (base.get(*key), overlay.get(*key))
        {
            let mut inner = inner_base.clone();
            for (k, v) in inner_overlay {
                inner.insert(k.clone(), v.clone());
            }
            merged.insert((*key).to_string(), Value::Object(inner));
        }
    }
    merged
}

/// Interpret a parsed file as `D`, backfilling defaults.
///
/// Top-level keys whose stored value does not fit the schema fall back to
/// their default; each one is listed in the returned `rejected` strings.
pub fn from_stored<D: SettingsDocument>(stored: Value) -> Result<(D, Vec<String>)> {
    let Value::Object(stored) = stored else {
        return Err(AutomakerError::InvalidUpdate(format!(
            "{} file does not contain a JSON object",
            D::KIND
        )));
    };
    let defaults = default_object::<D>()?;
    let merged = merge_objects::<D>(&defaults, &stored);
    if let Ok(value) = serde_json::from_value::<D>(Value::Object(merged.clone())) {
        return Ok((value, Vec::new()));
    }

    let mut kept = defaults;
    let mut rejected = Vec::new();
    for (key, value) in merged {
        let mut candidate = kept.clone();
        candidate.insert(key.clone(), value);
        match serde_json::from_value::<D>(Value::Object(candidate.clone())) {
            Ok(_) => kept = candidate,
            Err(e) => rejected.push(format!("{key}: {e}")),
        }
    }
    Ok((serde_json::from_value(Value::Object(kept))?, rejected))
}

/// Merge `partial` over the raw `stored` object and stamp the schema version.
///
/// Only the keys the partial sets are checked against the schema of `D`;
/// every other stored key, known or not, is carried through as-is. A
/// non-object partial or a touched key that does not fit is an
/// `InvalidUpdate`.
pub fn merge_update<D: SettingsDocument>(
    stored: &Map<String, Value>,
    partial: &Value,
) -> Result<Map<String, Value>> {
    let Value::Object(partial) = partial else {
        return Err(AutomakerError::InvalidUpdate(format!(
            "expected a {} object",
            D::KIND
        )));
    };
    let mut merged = merge_objects::<D>(stored, partial);
    merged.insert("version".to_string(), Value::from(D::VERSION));

    let mut touched = default_object::<D>()?;
    for key in partial.keys() {
        if let Some(value) = merged.get(key) {
            touched.insert(key.clone(), value.clone());
        }
    }
    touched.insert("version".to_string(), Value::from(D::VERSION));
    serde_json::from_value::<D>(Value::Object(touched))
        .map_err(|e| AutomakerError::InvalidUpdate(format!("{}: {e}", D::KIND)))?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ThemeMode;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn stored_values_win_and_nested_defaults_backfill() {
        let stored = json!({
            "theme": "nord",
            "keyboardShortcuts": { "board": "B" }
        });
        let (settings, rejected): (GlobalSettings, _) = from_stored(stored).unwrap();
        assert!(rejected.is_empty());
        assert_eq!(settings.theme, ThemeMode::Nord);
        assert_eq!(settings.keyboard_shortcuts.board, "B");
        assert_eq!(settings.keyboard_shortcuts.terminal, "T");
        assert_eq!(settings.max_concurrency, 3);
    }

    #[test]
    fn non_object_file_is_rejected() {
        let err = from_stored::<Credentials>(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, AutomakerError::InvalidUpdate(_)));
    }

    #[test]
    fn off_schema_keys_fall_back_individually() {
        let stored = json!({
            "theme": "nord",
            "maxConcurrency": -1,
            "projects": [ { "id": "1", "name": "a", "path": "/work/a" } ]
        });
        let (settings, rejected): (GlobalSettings, _) = from_stored(stored).unwrap();
        assert_eq!(settings.theme, ThemeMode::Nord);
        assert_eq!(settings.max_concurrency, 3);
        assert_eq!(settings.projects.len(), 1);
        assert_eq!(rejected.len(), 1);
        assert!(rejected[0].starts_with("maxConcurrency"));
    }

    #[test]
    fn update_merges_nested_keys_and_forces_version() {
        let stored = object(json!({ "version": 0, "apiKeys": { "google": "g-key" } }));
        let merged =
            merge_update::<Credentials>(&stored, &json!({ "apiKeys": { "anthropic": "a-key" } }))
                .unwrap();
        assert_eq!(merged["version"], CREDENTIALS_VERSION);
        assert_eq!(merged["apiKeys"]["anthropic"], "a-key");
        assert_eq!(merged["apiKeys"]["google"], "g-key");
    }

    #[test]
    fn update_replaces_lists_wholesale() {
        let stored = object(json!({ "recentFolders": ["/a", "/b"] }));
        let merged =
            merge_update::<GlobalSettings>(&stored, &json!({ "recentFolders": ["/c"] })).unwrap();
        assert_eq!(merged["recentFolders"], json!(["/c"]));
    }

    #[test]
    fn nested_merge_into_absent_object_uses_partial() {
        let merged = merge_update::<ProjectSettings>(
            &Map::new(),
            &json!({ "boardBackground": { "cardOpacity": 50 } }),
        )
        .unwrap();
        let (settings, _): (ProjectSettings, _) = from_stored(Value::Object(merged)).unwrap();
        let bg = settings.board_background.unwrap();
        assert_eq!(bg.card_opacity, 50.0);
        assert_eq!(bg.column_opacity, 100.0);
    }

    #[test]
    fn untouched_keys_are_carried_through_verbatim() {
        let stored = object(json!({
            "maxConcurrency": -1,
            "futureFlag": { "nested": true },
            "projects": [ { "name": "no id", "path": "/work/b" } ]
        }));
        let merged =
            merge_update::<GlobalSettings>(&stored, &json!({ "muteDoneSound": true })).unwrap();
        assert_eq!(merged["maxConcurrency"], -1);
        assert_eq!(merged["futureFlag"], json!({ "nested": true }));
        assert_eq!(merged["projects"][0]["path"], "/work/b");
        assert_eq!(merged["muteDoneSound"], true);
    }

    #[test]
    fn schema_violation_is_invalid_update() {
        let err = merge_update::<GlobalSettings>(&Map::new(), &json!({ "theme": "neon" }))
            .unwrap_err();
        assert!(matches!(err, AutomakerError::InvalidUpdate(_)));

        let err = merge_update::<GlobalSettings>(&Map::new(), &json!("dark")).unwrap_err();
        assert!(matches!(err, AutomakerError::InvalidUpdate(_)));
    }
}
