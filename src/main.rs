//! # pi_jobs - Entry Point
//! src/main.rs

use anyhow::Context;
use clap::Parser;
use pi_jobs::config::Config;
use pi_jobs::server::Server;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pi_jobs=info")),
        )
        .with_thread_names(true)
        .init();

    let config = Config::parse();
    config.log_summary();

    let address = config.address();
    let server = Server::bind(config).with_context(|| format!("failed to start server on {}", address))?;
    server.run()?;

    Ok(())
}
