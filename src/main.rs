use clap::Parser;
use mipmesh::cli::{Cli, Commands, WireCommand};
use mipmesh::config::{AppConfig, LoggingConfig};
use mipmesh::error::Result;
use mipmesh::identity::Identity;
use mipmesh::transport::{BroadcastTransport, SignalTransport};
use mipmesh::{runtime, MipmeshError};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => run_daemon(None, None).await,
        Some(Commands::Run { config, name }) => run_daemon(config, name).await,
        Some(Commands::Send { command }) => send_once(command).await,
    }
}

async fn run_daemon(config_path: Option<PathBuf>, name: Option<String>) -> Result<()> {
    let config = load_config(config_path)?;
    init_logging(&config.logging);

    let identity = match name {
        Some(name) => Identity::custom(name)?,
        None => Identity::generate(),
    };

    runtime::run(config, identity).await
}

async fn send_once(command: WireCommand) -> Result<()> {
    init_logging_simple();
    let config = load_config(None)?;
    let transport = BroadcastTransport::bind(&config.network, Identity::generate())?;
    transport.send(command.into()).await;
    println!("sent {:?} to {}", command, config.network.broadcast_addr);
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    config.map_err(MipmeshError::from)
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,mipmesh={}", config.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn init_logging_simple() {
    // Minimal logging for one-shot CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
