//! graphhook CLI — the hook entry points.
//!
//! Commands:
//! - `inject`  — Print knowledge-graph context for the submitted prompt
//! - `capture` — Advance the capture cadence, write a transcript window when due
//! - `window`  — Print the capture window for a transcript
//! - `config`  — Show the effective configuration
//!
//! `inject` and `capture` run inside the host's turn loop. They never fail
//! the turn: problems are logged and the command exits successfully.

use std::path::PathBuf;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use graphhook_config::HookConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "graphhook",
    about = "graphhook — knowledge-graph context hooks for coding agents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default ~/.graphhook/config.toml)
    #[arg(short, long, global = true, env = "GRAPHHOOK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Inject knowledge-graph context for a submitted prompt (reads hook JSON on stdin)
    Inject,

    /// Advance the capture cadence and write the transcript window when due
    Capture {
        /// Forced trigger at a lifecycle boundary (compaction, session end)
        #[arg(long)]
        force: bool,

        /// Hook event name for forced triggers (e.g. PreCompact, SessionEnd)
        #[arg(long)]
        event: Option<String>,

        /// Write the window here instead of the capture log directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the capture window for a transcript
    Window {
        /// Path to the JSON-lines transcript
        transcript: PathBuf,

        /// Anchor text to start the window from
        #[arg(short, long)]
        anchor: Option<String>,

        /// Select as a final capture (keep trailing user turns)
        #[arg(long = "final")]
        final_capture: bool,
    },

    /// Show configuration
    Config {
        /// Print the config file path instead
        #[arg(long)]
        path: bool,
    },
}

impl Commands {
    fn is_hook(&self) -> bool {
        matches!(self, Commands::Inject | Commands::Capture { .. })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => HookConfig::load_with_overrides(path),
        None => HookConfig::load(),
    };
    let (config, config_error) = match loaded {
        Ok(config) => (config, None),
        // Hooks run on defaults rather than block the host
        Err(e) if cli.command.is_hook() => (HookConfig::default(), Some(e)),
        Err(e) => {
            return Err(graphhook_core::Error::Config {
                message: e.to_string(),
            }
            .into());
        }
    };

    init_tracing(&config, cli.verbose);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Falling back to default configuration");
    }

    match cli.command {
        Commands::Inject => {
            let input = commands::read_hook_input().await;
            if let Some(context) = commands::inject::run(&config, &input).await {
                println!("{context}");
            }
        }
        Commands::Capture {
            force,
            event,
            output,
        } => {
            let input = commands::read_hook_input().await;
            let options = commands::capture::CaptureOptions {
                force,
                event,
                output,
            };
            if let Err(e) = commands::capture::run(&config, &input, options).await {
                tracing::error!(error = %e, "Capture failed");
            }
        }
        Commands::Window {
            transcript,
            anchor,
            final_capture,
        } => commands::window::run(&config, transcript, anchor, final_capture).await?,
        Commands::Config { path } => {
            if path {
                commands::config_cmd::path(cli.config.as_deref())
            } else {
                commands::config_cmd::show(&config)?
            }
        }
    }

    Ok(())
}

/// Logs go to stderr, or to `<log_dir>/graphhook.log`; stdout belongs to
/// the host.
fn init_tracing(config: &HookConfig, verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if config.logging.to_file {
        let dir = config.log_dir();
        let file = std::fs::create_dir_all(&dir).and_then(|_| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("graphhook.log"))
        });
        if let Ok(file) = file {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
