//! veltrix REPL entry point.
//!
//! ```bash
//! cargo run -p veltrix-repl -- --login
//! RUST_LOG=veltrix_kernel=debug cargo run -p veltrix-repl -- --transient
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use veltrix_repl::ReplConfig;

/// Terminal host for the veltrix playground.
#[derive(Parser, Debug)]
#[command(name = "veltrix", version, about)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/veltrix/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory for slots, preview.html and history
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Keep the file tree in memory only
    #[arg(long)]
    transient: bool,

    /// Quiet interval before the preview recomposes
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Sign in on start
    #[arg(long)]
    login: bool,
}

impl Cli {
    fn apply(self, mut config: ReplConfig) -> ReplConfig {
        if self.data_dir.is_some() {
            config.data_dir = self.data_dir;
        }
        if self.debounce_ms.is_some() {
            config.debounce_ms = self.debounce_ms;
        }
        config.transient |= self.transient;
        config.login |= self.login;
        config
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so they never mix with command output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ReplConfig::load_from(path),
        None => ReplConfig::load(),
    }
    .context("Failed to load configuration")?;

    veltrix_repl::run(cli.apply(config))
}
