use crate::output::{print_json, print_table, yes_no};
use anyhow::Context;
use automaker_core::credentials::Provider;
use automaker_core::resolve::auto_load_claude_md;
use automaker_core::{Load, SettingsStore};
use clap::Subcommand;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum SettingsSubcommand {
    /// Show global settings
    Global,

    /// Show which API keys are configured (masked)
    Credentials,

    /// Show a project's settings overrides
    Project {
        /// Project directory
        path: PathBuf,
    },

    /// Merge a JSON object into the global settings
    SetGlobal {
        /// Partial settings, e.g. '{"theme":"nord"}'
        #[arg(id = "partial_json", value_name = "JSON")]
        json: String,
    },

    /// Store an API key
    SetKey {
        /// Provider: anthropic, google, or openai
        provider: String,
        /// The key itself (empty string clears it)
        key: String,
    },

    /// Merge a JSON object into a project's settings
    SetProject {
        /// Project directory
        path: PathBuf,
        /// Partial settings, e.g. '{"useWorktrees":true}'
        #[arg(id = "partial_json", value_name = "JSON")]
        json: String,
    },

    /// Show whether CLAUDE.md is auto-loaded for a project, and why
    AutoLoad {
        /// Project directory
        path: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(data_dir: &Path, subcmd: SettingsSubcommand, json: bool) -> anyhow::Result<()> {
    let store = SettingsStore::new(data_dir);
    match subcmd {
        SettingsSubcommand::Global => show_global(&store, json),
        SettingsSubcommand::Credentials => show_credentials(&store, json),
        SettingsSubcommand::Project { path } => show_project(&store, &path, json),
        SettingsSubcommand::SetGlobal { json: partial } => set_global(&store, &partial, json),
        SettingsSubcommand::SetKey { provider, key } => set_key(&store, &provider, &key, json),
        SettingsSubcommand::SetProject {
            path,
            json: partial,
        } => set_project(&store, &path, &partial, json),
        SettingsSubcommand::AutoLoad { path } => show_auto_load(&store, &path, json),
    }
}

fn parse_partial(raw: &str) -> anyhow::Result<Value> {
    let value: Value = serde_json::from_str(raw).context("settings must be valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("settings must be a JSON object");
    }
    Ok(value)
}

fn warn_if_corrupt<D>(load: &Load<D>, what: &str) {
    match load {
        Load::CorruptFallback { error, .. } => {
            eprintln!("warning: {what} could not be read ({error}); showing defaults");
        }
        Load::Partial { rejected, .. } => {
            for reason in rejected {
                eprintln!("warning: {what}: ignoring {reason}; showing the default");
            }
        }
        Load::Default(_) | Load::Loaded(_) => {}
    }
}

// ---------------------------------------------------------------------------
// global
// ---------------------------------------------------------------------------

fn show_global(store: &SettingsStore, json: bool) -> anyhow::Result<()> {
    let load = store.load_global();
    warn_if_corrupt(&load, "global settings");
    let settings = load.into_inner();

    if json {
        return print_json(&settings);
    }

    println!("Theme:              {}", settings.theme);
    println!("Max concurrency:    {}", settings.max_concurrency);
    println!("Use worktrees:      {}", yes_no(settings.use_worktrees));
    println!("Skip tests:         {}", yes_no(settings.default_skip_tests));
    println!("Auto-load CLAUDE.md: {}", yes_no(settings.auto_load_claude_md));
    println!("AI profiles:        {}", settings.ai_profiles.len());
    println!("Projects:           {}", settings.projects.len());
    Ok(())
}

fn set_global(store: &SettingsStore, raw: &str, json: bool) -> anyhow::Result<()> {
    let partial = parse_partial(raw)?;
    let settings = store
        .update_global(&partial)
        .context("failed to update global settings")?;
    if json {
        print_json(&settings)
    } else {
        println!("Updated global settings.");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// credentials
// ---------------------------------------------------------------------------

fn show_credentials(store: &SettingsStore, json: bool) -> anyhow::Result<()> {
    let load = store.load_credentials();
    warn_if_corrupt(&load, "credentials");
    let masked = automaker_core::credentials::MaskedCredentials::from(load.value());

    if json {
        return print_json(&masked);
    }

    let rows: Vec<Vec<String>> = [
        (Provider::Anthropic, &masked.anthropic),
        (Provider::Google, &masked.google),
        (Provider::OpenAi, &masked.openai),
    ]
    .iter()
    .map(|(provider, key)| {
        vec![
            provider.to_string(),
            yes_no(key.configured),
            key.masked.clone(),
        ]
    })
    .collect();
    print_table(&["PROVIDER", "CONFIGURED", "KEY"], &rows);
    Ok(())
}

fn set_key(store: &SettingsStore, provider: &str, key: &str, json: bool) -> anyhow::Result<()> {
    let provider: Provider = provider.parse()?;
    let mut keys = serde_json::Map::new();
    keys.insert(provider.as_str().to_string(), Value::from(key));
    let partial = json!({ "apiKeys": keys });
    store
        .update_credentials(&partial)
        .context("failed to update credentials")?;
    let masked = store.masked_credentials();

    if json {
        return print_json(&masked);
    }
    println!("Stored {provider} key.");
    Ok(())
}

// ---------------------------------------------------------------------------
// project
// ---------------------------------------------------------------------------

fn show_project(store: &SettingsStore, path: &Path, json: bool) -> anyhow::Result<()> {
    let load = store.load_project(path);
    warn_if_corrupt(&load, "project settings");
    let settings = load.into_inner();

    if json {
        return print_json(&settings);
    }

    let inherit = || "(global)".to_string();
    println!(
        "Theme:          {}",
        settings.theme.map(|t| t.to_string()).unwrap_or_else(inherit)
    );
    println!(
        "Use worktrees:  {}",
        settings.use_worktrees.map(yes_no).unwrap_or_else(inherit)
    );
    if let Some(current) = &settings.current_worktree {
        println!("Branch:         {}", current.branch);
    }
    if let Some(worktrees) = &settings.worktrees {
        println!("Worktrees:      {}", worktrees.len());
    }
    Ok(())
}

fn set_project(store: &SettingsStore, path: &Path, raw: &str, json: bool) -> anyhow::Result<()> {
    let partial = parse_partial(raw)?;
    let settings = store
        .update_project(path, &partial)
        .with_context(|| format!("failed to update settings for {}", path.display()))?;
    if json {
        print_json(&settings)
    } else {
        println!("Updated settings for {}.", path.display());
        Ok(())
    }
}

fn show_auto_load(store: &SettingsStore, path: &Path, json: bool) -> anyhow::Result<()> {
    let enabled = auto_load_claude_md(store, path);
    let source = if store.project(path).auto_load_claude_md.is_some() {
        "project"
    } else {
        "global"
    };
    if json {
        return print_json(&json!({ "autoLoadClaudeMd": enabled, "source": source }));
    }
    println!("autoLoadClaudeMd: {} (from {source} settings)", yes_no(enabled));
    Ok(())
}
