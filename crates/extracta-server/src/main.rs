//! Extracta server binary
//!
//! Starts the HTTP extraction service.

use anyhow::Context;
use clap::Parser;
use extracta_server::{config::ServerConfig, start_server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Structured data extraction service
#[derive(Debug, Parser)]
#[command(name = "extracta-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML configuration file (environment only when omitted)
    #[arg(short, long, env = "EXTRACTA_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::from_env().context("reading configuration from the environment")?,
    };
    if let Some(bind) = cli.bind {
        config.bind_address = bind;
    }
    if let Some(port) = cli.port {
        config.bind_port = port;
    }

    start_server(config).await?;

    Ok(())
}
