mod app;
mod commands;
mod controller;
mod ui;

use clap::{Parser, Subcommand};
use luckydraw_core::DrawConfig;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONFIG_FILE: &str = "luckydraw.json";
const LOG_FILE: &str = "luckydraw.log";

#[derive(Parser)]
#[command(name = "luckydraw")]
#[command(about = "Full-screen lucky draw for live events")]
#[command(version)]
struct Cli {
    /// Data directory for winner history, config and logs
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to luckydraw.json in the data directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the live drawing
    Draw {
        /// Roster CSV with a Name column and optional Identifier column
        roster: Option<PathBuf>,
        /// Forget previous winners before starting
        #[arg(long)]
        fresh: bool,
        /// Keep this session's winners in memory only
        #[arg(long)]
        session_only: bool,
        /// Milliseconds between reselections while drawing
        #[arg(long)]
        tick_ms: Option<u64>,
    },
    /// Show recorded winners
    Winners,
    /// Forget all recorded winners
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Validate a roster file against the recorded winners
    Check {
        /// Roster CSV
        roster: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Get data directory
    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("luckydraw")
    });

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir).await?;

    // The presenter owns the terminal, so logs go to a file
    init_logging(&data_dir, cli.verbose)?;

    let config_path = cli.config.unwrap_or_else(|| data_dir.join(CONFIG_FILE));
    let mut config = DrawConfig::load_or_default(&config_path).await?;

    let result = match cli.command {
        Commands::Draw {
            roster,
            fresh,
            session_only,
            tick_ms,
        } => {
            if fresh {
                config.reset_on_start = true;
            }
            if session_only {
                config.persist_across_restarts = false;
            }
            if let Some(ms) = tick_ms {
                config.tick_interval_ms = ms;
            }
            commands::run_draw(&data_dir, &config, roster).await
        }
        Commands::Winners => commands::list_winners(&data_dir, &config).await,
        Commands::Reset { force } => commands::reset_winners(&data_dir, &config, force).await,
        Commands::Check { roster } => commands::check_roster(&data_dir, &config, &roster).await,
    };

    if let Err(e) = result {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(data_dir: &Path, verbose: bool) -> std::io::Result<()> {
    let log_level = if verbose { "debug" } else { "info" };
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "luckydraw={},luckydraw_core={},luckydraw_engine={}",
            log_level, log_level, log_level
        )))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    Ok(())
}
