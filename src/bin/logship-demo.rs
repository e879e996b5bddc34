use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use logship::{
    AppContext, CauseInfo, CollectorSink, ConsoleSink, DeviceInfo, ErrorInfo, Priority,
    SinkRegistry,
};

#[derive(Parser, Debug)]
#[clap(name = "logship-demo", version, about)]
struct Cli {
    /// Path to configuration file
    #[clap(long, default_value = "./logship.toml")]
    config: PathBuf,

    /// Override collector host
    #[clap(long)]
    collector_host: Option<String>,

    /// Override collector port
    #[clap(long)]
    collector_port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct DemoConfig {
    app: AppContext,
    device: DeviceInfo,
}

fn load_config(cli: &Cli) -> Result<DemoConfig> {
    let config_content = fs::read_to_string(&cli.config)
        .with_context(|| format!("Failed to read config file: {:?}", cli.config))?;

    let mut config: DemoConfig =
        toml::from_str(&config_content).context("Failed to parse config file")?;

    // Apply CLI overrides
    if let Some(ref collector_host) = cli.collector_host {
        config.app.collector_host = collector_host.clone();
    }

    if let Some(collector_port) = cli.collector_port {
        config.app.collector_port = collector_port;
    }

    Ok(config)
}

fn main() -> Result<()> {
    simple_logger::init_with_level(log::Level::Debug)?;

    info!("Starting logship-demo");

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(
        "Shipping to collector at {}:{}",
        config.app.collector_host, config.app.collector_port
    );

    let registry = SinkRegistry::new()
        .with_sink(Box::new(ConsoleSink))
        .with_sink(Box::new(
            CollectorSink::new(config.app, config.device).context("Failed to build collector sink")?,
        ));

    registry.emit(Priority::Info, Some("demo"), "Application started", None);
    registry.emit(Priority::Debug, None, "Untagged debug event", None);

    let error = ErrorInfo {
        type_name: "demo::StorageError".to_string(),
        message: "could not persist session".to_string(),
        stack_frames: vec![
            "demo::storage::persist_session".to_string(),
            "demo::run".to_string(),
        ],
        cause: Some(CauseInfo {
            message: "disk full".to_string(),
            stack_frames: vec!["std::fs::write".to_string()],
        }),
    };
    registry.emit(
        Priority::Error,
        Some("demo"),
        "Session persistence failed",
        Some(&error),
    );

    // Captured events are delivered in the background; give the in-flight
    // chains a moment before the process exits.
    info!("Events emitted, waiting for background delivery");
    thread::sleep(Duration::from_secs(2));

    Ok(())
}
