#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use flashdeck::cli::{run, App, Cli};
use flashdeck::config::{Config, ConfigSource};

fn parse_level(level: &str) -> TraceLevel {
    match level.trim().to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The config names the fallback log level, so it is read before logging
    // starts; its outcome is reported once the subscriber is installed
    let config_path = Config::path();
    let (config, source) = Config::open(&config_path)?;

    // LOG_LEVEL wins over the config file
    let log_level = parse_level(
        &std::env::var("LOG_LEVEL").unwrap_or_else(|_| config.log_level.clone()),
    );

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match source {
        ConfigSource::Created => info!("Created default config at {:?}", config_path),
        ConfigSource::Existing => info!("Using config at {:?}", config_path),
    }

    let app = App::new(config, cli.data_dir);
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout().lock();
    run(&app, cli.command, &mut input, &mut out)
}
