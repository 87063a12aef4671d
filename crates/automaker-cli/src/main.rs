mod cmd;
mod data_dir;
mod output;

use clap::{Parser, Subcommand};
use cmd::settings::SettingsSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "automaker",
    about = "Inspect, edit, and migrate automaker settings",
    version,
    propagate_version = true
)]
struct Cli {
    /// Global data directory (default: <config dir>/automaker)
    #[arg(long, global = true, env = "AUTOMAKER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the settings HTTP API
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, env = "AUTOMAKER_PORT", default_value = "3008")]
        port: u16,
    },

    /// Show which settings files exist and whether migration is needed
    Status,

    /// Read and update settings documents
    Settings {
        #[command(subcommand)]
        subcommand: SettingsSubcommand,
    },

    /// Import a legacy storage export (JSON object of raw key/value strings)
    Migrate {
        /// Path to the exported JSON file
        file: PathBuf,
    },

    /// Print where automaker keeps data for a project
    Paths {
        /// Project directory
        project: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let data_dir = data_dir::resolve_data_dir(cli.data_dir.as_deref());

    let result = match cli.command {
        Commands::Serve { port } => cmd::serve::run(data_dir, port),
        Commands::Status => cmd::status::run(&data_dir, cli.json),
        Commands::Settings { subcommand } => cmd::settings::run(&data_dir, subcommand, cli.json),
        Commands::Migrate { file } => cmd::migrate::run(&data_dir, &file, cli.json),
        Commands::Paths { project } => cmd::paths::run(&data_dir, &project, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
