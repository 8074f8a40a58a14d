//! `workbench`: launches the terminal dashboard, or creates a workspace from a
//! YAML file when invoked with `create`.

mod headless;

use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use workbench_api::{API_BASE_ENV, ApiConfig, WorkbenchClient};
use workbench_tui::{TuiOptions, WORKSPACES_PATH, dashboard_navigation_items};
use workbench_types::ClusterType;
use workbench_util::UserPreferences;

#[derive(Debug, Parser)]
#[command(name = "workbench", version, about = "Create and browse Workbench workspaces")]
struct Cli {
    /// Base URL of the Workbench API.
    #[arg(long, env = API_BASE_ENV, global = true)]
    api_base: Option<String>,

    /// Cluster type for new workspaces (k8s, ecs, cloud_run, ...).
    #[arg(long, global = true)]
    cluster_type: Option<ClusterType>,

    /// Send lifecycle settings with creation requests.
    #[arg(long, global = true)]
    submit_lifecycle: bool,

    /// Path the dashboard opens on.
    #[arg(long, default_value = WORKSPACES_PATH)]
    path: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a workspace described by a YAML file.
    Create {
        /// YAML document with `name` and optional settings.
        #[arg(long, short)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = cli.command.is_none();
    init_tracing(interactive);

    let preferences = Arc::new(UserPreferences::new().unwrap_or_else(|error| {
        warn!(%error, "preferences unavailable; using in-memory defaults");
        UserPreferences::ephemeral()
    }));
    let saved = preferences.snapshot();
    let submit_lifecycle_config = cli.submit_lifecycle || saved.submit_lifecycle_config;

    let config = ApiConfig {
        base_url: cli.api_base.clone(),
        api_key: None,
    }
    .or(ApiConfig::from_env());
    let client = WorkbenchClient::new(config).context("failed to configure the Workbench API client")?;

    match cli.command {
        Some(Command::Create { file }) => {
            let saved_cluster = saved.default_cluster_type.map(ClusterType::from);
            headless::create_from_file(&client, &file, cli.cluster_type, saved_cluster, submit_lifecycle_config).await
        }
        None => {
            let cluster_type = cli
                .cluster_type
                .or_else(|| saved.default_cluster_type.map(ClusterType::from))
                .unwrap_or_default();
            info!(%cluster_type, path = %cli.path, "starting dashboard");
            workbench_tui::run(TuiOptions {
                api: Arc::new(client),
                preferences,
                cluster_type,
                submit_lifecycle_config,
                navigation_items: Some(dashboard_navigation_items()),
                initial_path: cli.path,
            })
            .await
        }
    }
}

/// Headless runs log to stderr; the dashboard logs to a file so the
/// terminal stays clean.
fn init_tracing(interactive: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = if interactive {
        // Without a log file the dashboard runs silently.
        match open_log_file(&log_file_path()) {
            Ok(file) => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init(),
            Err(error) => {
                eprintln!("workbench: logging disabled: {error:#}");
                return;
            }
        }
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };
    if let Err(error) = installed {
        eprintln!("workbench: failed to install the log subscriber: {error}");
    }
}

/// Open `path` for appending, creating its parent directory first.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

fn log_file_path() -> PathBuf {
    dirs_next::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("workbench")
        .join("workbench.log")
}
