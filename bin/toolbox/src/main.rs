//! toolbox – entry point.
//!
//! Startup order:
//! 1. Parse the command line.
//! 2. Load defaults from environment variables.
//! 3. Initialise structured tracing on stderr (JSON optional).
//! 4. Dispatch to the selected tool.

mod cli;
mod commands;
mod config;

use clap::Parser;
use tracing::debug;

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Configuration ──────────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── Tracing ────────────────────────────────────────────────────────────────
    // RUST_LOG wins; otherwise TOOLBOX_LOG, warning if it does not parse.
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: TOOLBOX_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'warn'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("warn")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    debug!(version = env!("CARGO_PKG_VERSION"), ?cfg, "toolbox starting");

    commands::run(cli.command, &cfg).await
}
