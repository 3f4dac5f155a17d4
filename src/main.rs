use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use cgiserv::config::Config;
use cgiserv::server;

#[derive(Parser, Debug)]
#[command(name = "cgiserv", about = "Static file and CGI server")]
struct Args {
    /// Configuration file with staticfiles, cgibin, port and exec keys
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let args = Args::parse();
    let cfg = Config::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    tokio::select! {
        res = server::listener::run(Arc::new(cfg)) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
