use crate::output::{print_json, print_table};
use automaker_core::paths;
use std::path::{Path, PathBuf};

pub fn run(data_dir: &Path, project: &Path, json: bool) -> anyhow::Result<()> {
    let entries: Vec<(&str, PathBuf)> = vec![
        ("globalSettings", paths::global_settings_path(data_dir)),
        ("credentials", paths::credentials_path(data_dir)),
        ("appDir", paths::app_dir(project)),
        ("projectSettings", paths::project_settings_path(project)),
        ("features", paths::features_dir(project)),
        ("board", paths::board_dir(project)),
        ("images", paths::images_dir(project)),
        ("context", paths::context_dir(project)),
        ("worktrees", paths::worktrees_dir(project)),
        ("appSpec", paths::app_spec_path(project)),
        ("branchTracking", paths::branch_tracking_path(project)),
    ];

    if json {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(name, path)| (name.to_string(), path.display().to_string().into()))
            .collect();
        return print_json(&map);
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|(name, path)| vec![name.to_string(), path.display().to_string()])
        .collect();
    print_table(&["NAME", "PATH"], &rows);
    Ok(())
}
