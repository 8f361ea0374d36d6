//! Command-line interface for repo-ask
//!
//! Without flags the tool prompts for the repository URL and then the
//! question; `--repo` and `--question` skip the corresponding prompt.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod input;
mod session;

/// Ask natural-language questions about a remote repository
#[derive(Parser, Debug)]
#[command(name = "repo-ask")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository URL to clone (prompted for when omitted)
    #[arg(short, long, value_name = "URL")]
    pub repo: Option<String>,

    /// Question about the code (prompted for when omitted)
    #[arg(short, long, value_name = "TEXT")]
    pub question: Option<String>,

    /// Number of most relevant files to include in the prompt
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub top_n: Option<usize>,

    /// Config file (TOML or YAML); defaults to repo-ask.toml in the working directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Keep the cloned repository instead of deleting it
    #[arg(long)]
    pub keep_clone: bool,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let default_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let filter =
        EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let result = runtime.block_on(async {
        tokio::select! {
            result = session::run(cli) => result,
            _ = tokio::signal::ctrl_c() => {
                // The session future is dropped here, which removes the clone.
                Err(anyhow::anyhow!("Interrupted"))
            }
        }
    });

    // A pending terminal prompt must not keep the process alive.
    runtime.shutdown_timeout(Duration::from_millis(250));
    result
}
