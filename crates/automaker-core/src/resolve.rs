use crate::store::SettingsStore;
use std::path::Path;
use tracing::debug;

/// Whether the agent SDK should load `CLAUDE.md` itself for `project`.
///
/// A project-level setting wins; otherwise the global one applies.
pub fn auto_load_claude_md(store: &SettingsStore, project: &Path) -> bool {
    if let Some(enabled) = store.project(project).auto_load_claude_md {
        debug!(project = %project.display(), enabled, "autoLoadClaudeMd from project settings");
        return enabled;
    }
    let enabled = store.global().auto_load_claude_md;
    debug!(project = %project.display(), enabled, "autoLoadClaudeMd from global settings");
    enabled
}
