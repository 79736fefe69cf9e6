//! KEEL console entry point.
//!
//! Reads operator commands from stdin and writes their output to stdout.
//! Logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;

use keel_commands::{HandlerDeps, MemoryStore, install, spawn_memory_store};
use keel_console::pipeline::PipelineBuilder;
use keel_types::config::KeelConfig;

#[derive(Parser, Debug)]
#[command(name = "keel")]
#[command(about = "Interactive cluster-management console")]
struct Cli {
    /// Configuration file (TOML). Built-in defaults are used when omitted.
    #[arg(short, long, env = "KEEL_CONFIG")]
    config: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<KeelConfig> {
    match &cli.config {
        Some(path) => KeelConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(KeelConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .init();
    log::info!(
        "Starting KEEL console with handlers: {}",
        config.handlers.join(", ")
    );

    let persistence = spawn_memory_store(MemoryStore::new());
    let deps = HandlerDeps::from_config(config.clone(), Some(persistence));
    let mut builder = PipelineBuilder::new();
    install(&config.handlers, &deps, &mut builder).context("failed to start command handlers")?;

    builder
        .start(config.await_registrations)
        .into_console(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .with_prompt(config.prompt.clone())
        .with_banner(config.banner.clone())
        .run()
        .await?;

    log::info!("KEEL console stopped");
    Ok(())
}
