use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const SETTINGS_VERSION: u32 = 1;
pub const CREDENTIALS_VERSION: u32 = 1;
pub const PROJECT_SETTINGS_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
    System,
    Retro,
    Dracula,
    Nord,
    Monokai,
    Tokyonight,
    Solarized,
    Gruvbox,
    Catppuccin,
    Onedark,
    Synthwave,
    Red,
    Cream,
    Sunset,
    Gray,
}

impl ThemeMode {
    pub fn all() -> &'static [ThemeMode] {
        &[
            ThemeMode::Light,
            ThemeMode::Dark,
            ThemeMode::System,
            ThemeMode::Retro,
            ThemeMode::Dracula,
            ThemeMode::Nord,
            ThemeMode::Monokai,
            ThemeMode::Tokyonight,
            ThemeMode::Solarized,
            ThemeMode::Gruvbox,
            ThemeMode::Catppuccin,
            ThemeMode::Onedark,
            ThemeMode::Synthwave,
            ThemeMode::Red,
            ThemeMode::Cream,
            ThemeMode::Sunset,
            ThemeMode::Gray,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
            ThemeMode::Retro => "retro",
            ThemeMode::Dracula => "dracula",
            ThemeMode::Nord => "nord",
            ThemeMode::Monokai => "monokai",
            ThemeMode::Tokyonight => "tokyonight",
            ThemeMode::Solarized => "solarized",
            ThemeMode::Gruvbox => "gruvbox",
            ThemeMode::Catppuccin => "catppuccin",
            ThemeMode::Onedark => "onedark",
            ThemeMode::Synthwave => "synthwave",
            ThemeMode::Red => "red",
            ThemeMode::Cream => "cream",
            ThemeMode::Sunset => "sunset",
            ThemeMode::Gray => "gray",
        }
    }

    pub fn parse(name: &str) -> Option<ThemeMode> {
        Self::all().iter().copied().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KanbanCardDetailLevel {
    Minimal,
    #[default]
    Standard,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentModel {
    Opus,
    #[default]
    Sonnet,
    Haiku,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanningMode {
    #[default]
    Skip,
    Lite,
    Spec,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
    Ultrathink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    #[default]
    Claude,
}

// ---------------------------------------------------------------------------
// KeyboardShortcuts
// ---------------------------------------------------------------------------

/// Shortcut name → key combination. Missing names deserialize to their
/// defaults, so every recognized shortcut is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyboardShortcuts {
    pub board: String,
    pub agent: String,
    pub spec: String,
    pub context: String,
    pub settings: String,
    pub profiles: String,
    pub terminal: String,
    pub toggle_sidebar: String,
    pub add_feature: String,
    pub add_context_file: String,
    pub start_next: String,
    pub new_session: String,
    pub open_project: String,
    pub project_picker: String,
    pub cycle_prev_project: String,
    pub cycle_next_project: String,
    pub add_profile: String,
    pub split_terminal_right: String,
    pub split_terminal_down: String,
    pub close_terminal: String,
}

impl Default for KeyboardShortcuts {
    fn default() -> Self {
        Self {
            board: "K".into(),
            agent: "A".into(),
            spec: "D".into(),
            context: "C".into(),
            settings: "S".into(),
            profiles: "M".into(),
            terminal: "T".into(),
            toggle_sidebar: "`".into(),
            add_feature: "N".into(),
            add_context_file: "N".into(),
            start_next: "G".into(),
            new_session: "N".into(),
            open_project: "O".into(),
            project_picker: "P".into(),
            cycle_prev_project: "Q".into(),
            cycle_next_project: "E".into(),
            add_profile: "N".into(),
            split_terminal_right: "Alt+D".into(),
            split_terminal_down: "Alt+S".into(),
            close_terminal: "Alt+W".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Profiles and project references
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub model: AgentModel,
    #[serde(default)]
    pub thinking_level: ThinkingLevel,
    #[serde(default)]
    pub provider: ModelProvider,
    #[serde(default)]
    pub is_built_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Minimal project info kept in global settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashedProjectRef {
    #[serde(flatten)]
    pub project: ProjectRef,
    pub trashed_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_from_disk: Option<bool>,
}

// ---------------------------------------------------------------------------
// GlobalSettings
// ---------------------------------------------------------------------------

/// Process-wide preferences, stored in `<dataDir>/settings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalSettings {
    pub version: u32,

    pub theme: ThemeMode,

    pub sidebar_open: bool,
    pub chat_history_open: bool,
    pub kanban_card_detail_level: KanbanCardDetailLevel,

    pub max_concurrency: u32,
    pub default_skip_tests: bool,
    pub enable_dependency_blocking: bool,
    pub use_worktrees: bool,
    pub show_profiles_only: bool,
    pub default_planning_mode: PlanningMode,
    pub default_require_plan_approval: bool,
    #[serde(rename = "defaultAIProfileId")]
    pub default_ai_profile_id: Option<String>,

    pub mute_done_sound: bool,
    pub enhancement_model: AgentModel,

    pub keyboard_shortcuts: KeyboardShortcuts,
    pub ai_profiles: Vec<AiProfile>,

    pub projects: Vec<ProjectRef>,
    pub trashed_projects: Vec<TrashedProjectRef>,
    pub project_history: Vec<String>,
    pub project_history_index: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_project_dir: Option<String>,
    pub recent_folders: Vec<String>,
    pub worktree_panel_collapsed: bool,

    /// Project path → last selected session id.
    pub last_selected_session_by_project: BTreeMap<String, String>,

    pub auto_load_claude_md: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            theme: ThemeMode::Dark,
            sidebar_open: true,
            chat_history_open: false,
            kanban_card_detail_level: KanbanCardDetailLevel::Standard,
            max_concurrency: 3,
            default_skip_tests: true,
            enable_dependency_blocking: true,
            use_worktrees: false,
            show_profiles_only: false,
            default_planning_mode: PlanningMode::Skip,
            default_require_plan_approval: false,
            default_ai_profile_id: None,
            mute_done_sound: false,
            enhancement_model: AgentModel::Sonnet,
            keyboard_shortcuts: KeyboardShortcuts::default(),
            ai_profiles: Vec::new(),
            projects: Vec::new(),
            trashed_projects: Vec::new(),
            project_history: Vec::new(),
            project_history_index: -1,
            last_project_dir: None,
            recent_folders: Vec::new(),
            worktree_panel_collapsed: false,
            last_selected_session_by_project: BTreeMap::new(),
            auto_load_claude_md: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub anthropic: String,
    pub google: String,
    pub openai: String,
}

/// API keys, stored in `<dataDir>/credentials.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Credentials {
    pub version: u32,
    pub api_keys: ApiKeys,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            version: CREDENTIALS_VERSION,
            api_keys: ApiKeys::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardBackgroundSettings {
    pub image_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_version: Option<u64>,
    pub card_opacity: f64,
    pub column_opacity: f64,
    pub column_border_enabled: bool,
    pub card_glassmorphism: bool,
    pub card_border_enabled: bool,
    pub card_border_opacity: f64,
    pub hide_scrollbar: bool,
}

impl Default for BoardBackgroundSettings {
    fn default() -> Self {
        Self {
            image_path: None,
            image_version: None,
            card_opacity: 100.0,
            column_opacity: 100.0,
            column_border_enabled: true,
            card_glassmorphism: true,
            card_border_enabled: true,
            card_border_opacity: 100.0,
            hide_scrollbar: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentWorktree {
    pub path: Option<String>,
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorktreeInfo {
    pub path: String,
    pub branch: String,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_changes: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_files_count: Option<u32>,
}

/// Per-project overrides, stored in `<projectPath>/.appdata/settings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectSettings {
    pub version: u32,
    /// `None` means "use the global theme".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_worktrees: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_worktree: Option<CurrentWorktree>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worktrees: Option<Vec<WorktreeInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_background: Option<BoardBackgroundSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_selected_session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_load_claude_md: Option<bool>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            version: PROJECT_SETTINGS_VERSION,
            theme: None,
            use_worktrees: None,
            current_worktree: None,
            worktrees: None,
            board_background: None,
            last_selected_session_id: None,
            auto_load_claude_md: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_defaults_serialize_with_camel_case_keys() {
        let json = serde_json::to_value(GlobalSettings::default()).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["maxConcurrency"], 3);
        assert_eq!(json["projectHistoryIndex"], -1);
        assert!(json["defaultAIProfileId"].is_null());
        assert_eq!(json["keyboardShortcuts"]["toggleSidebar"], "`");
        assert_eq!(json["keyboardShortcuts"]["closeTerminal"], "Alt+W");
        assert!(json.get("lastProjectDir").is_none());
    }

    #[test]
    fn partial_shortcuts_backfill_defaults() {
        let shortcuts: KeyboardShortcuts =
            serde_json::from_value(serde_json::json!({ "board": "B" })).unwrap();
        assert_eq!(shortcuts.board, "B");
        assert_eq!(shortcuts.terminal, "T");
    }

    #[test]
    fn trashed_project_flattens_project_fields() {
        let trashed = TrashedProjectRef {
            project: ProjectRef {
                id: "p1".into(),
                name: "Demo".into(),
                path: "/work/demo".into(),
                last_opened: None,
                theme: None,
            },
            trashed_at: "2024-05-01T10:00:00.000Z".into(),
            deleted_from_disk: Some(false),
        };
        let json = serde_json::to_value(&trashed).unwrap();
        assert_eq!(json["path"], "/work/demo");
        assert_eq!(json["trashedAt"], "2024-05-01T10:00:00.000Z");
        assert_eq!(json["deletedFromDisk"], false);
        let back: TrashedProjectRef = serde_json::from_value(json).unwrap();
        assert_eq!(back, trashed);
    }

    #[test]
    fn project_defaults_only_carry_version() {
        let json = serde_json::to_value(ProjectSettings::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "version": 1 }));
    }

    #[test]
    fn theme_parse_matches_serde_names() {
        for theme in ThemeMode::all() {
            let json = serde_json::to_value(theme).unwrap();
            assert_eq!(json, theme.as_str());
            assert_eq!(ThemeMode::parse(theme.as_str()), Some(*theme));
        }
        assert_eq!(ThemeMode::parse("neon"), None);
    }
}
