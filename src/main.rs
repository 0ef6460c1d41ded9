//! sample-app
//!
//! A minimal HTTP service that exists to exercise an OpenTelemetry pipeline.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ /healthz ──▶ "OK"
//!
//!     Client ──▶ /work ──▶ RouteSpanLayer ──▶ WorkSimulator ──▶ CorrelatedLogger ──▶ stdout
//!                          (span "work")      ├ span "simulate_work"
//!                                             └ span "db_cache_lookup"
//!
//!     Telemetry ──(batch spans, periodic metrics)──▶ OTLP/gRPC ──▶ collector
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use sample_app::config::{self, ServiceConfig};
use sample_app::lifecycle::{self, Bootstrapped, Shutdown, StartupError};
use sample_app::observability::logging::init_logging;
use sample_app::work::ThreadRandom;
use sample_app::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "sample-app", version, about = "OTLP-instrumented sample service")]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "SAMPLE_APP_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(error) => {
            init_logging(&config::LoggingConfig::default());
            tracing::error!(%error, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sample-app starting");

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(%error, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

/// Config file (or defaults), then environment, then CLI flags; validated once at the end.
fn load(cli: &Cli) -> Result<ServiceConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::read_config(path)?,
        None => {
            let mut config = ServiceConfig::default();
            config::apply_env_overrides(&mut config, |key| std::env::var(key).ok());
            config
        }
    };

    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    config::validate_config(&config).map_err(config::ConfigError::Validation)?;
    Ok(config)
}

async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        collector_endpoint = %config.telemetry.collector_endpoint,
        "Configuration loaded"
    );

    let Bootstrapped { telemetry, listener } = lifecycle::bootstrap(&config).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(Arc::clone(&telemetry), Arc::new(ThreadRandom));
    let mut served = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let result = tokio::select! {
        _ = lifecycle::wait_for_signal() => {
            shutdown.trigger();
            (&mut served).await
        }
        result = &mut served => result,
    };

    lifecycle::drain_telemetry(&telemetry, config.telemetry.shutdown_timeout()).await;

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(StartupError::Serve(error)),
        Err(join) => Err(StartupError::Serve(std::io::Error::other(join))),
    }
}
