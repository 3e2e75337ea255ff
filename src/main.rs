//! HRMS Lite - employee directory and daily attendance service.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hrms_lite as app;

use app::commands::{self, remote::RemoteArgs};
use app::config::{AppConfig, ConfigLoadResult};
use app::export::generate_export_filename;
use app::logging;

/// HR management service: employees, attendance and admin accounts.
#[derive(Parser)]
#[command(name = "hrms", version)]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Explicit config file path
    #[arg(long, conflicts_with = "dev")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,
    /// Create the default admin and demo data
    Seed {
        /// Reset the default admin's password if it already exists
        #[arg(long)]
        reset_admin: bool,
    },
    /// Write a default config file
    InitConfig {
        #[arg(long)]
        force: bool,
    },
    /// Export attendance records to an Excel workbook
    Export {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Numeric employee id
        #[arg(long)]
        employee: Option<i32>,
        /// Output file (defaults to a timestamped name in the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Talk to a running server
    Remote(RemoteArgs),
}

/// Defaults when the file is missing, then environment overrides.
fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let mut config = match AppConfig::try_load(path) {
        ConfigLoadResult::Loaded(config) => config,
        ConfigLoadResult::Missing => AppConfig::default(),
        ConfigLoadResult::Invalid(e) => bail!("Config invalid ({}): {e}", path.display()),
    };
    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config_path = match (cli.config, cli.dev) {
        (Some(path), _) => path,
        (None, true) => PathBuf::from("config.toml"),
        (None, false) => AppConfig::default_path(),
    };

    if let Command::InitConfig { force } = cli.command {
        return commands::init_config(&config_path, force);
    }

    let config = load_config(&config_path)?;
    let _guard = logging::init(&config.logging);
    tracing::info!("Config path: {:?}", config_path);

    match cli.command {
        Command::Serve => commands::serve(config).await,
        Command::Seed { reset_admin } => commands::seed(&config, reset_admin).await,
        Command::Export { from, to, employee, out } => {
            let out = out.unwrap_or_else(|| PathBuf::from(generate_export_filename("attendance")));
            let count = commands::export(&config, from, to, employee, &out)
                .await
                .context("Export failed")?;
            println!("Exported {count} records to {}", out.display());
            Ok(())
        }
        Command::Remote(args) => commands::remote::run(args).await,
        Command::InitConfig { .. } => Ok(()),
    }
}
