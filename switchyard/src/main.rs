use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use metrics_exporter_statsd::StatsdBuilder;
use sentry::ClientInitGuard;
use tracing_subscriber::EnvFilter;

mod config;

use config::{Config, LoggingConfig, MetricsConfig};

#[derive(Parser)]
enum Cli {
    /// Run the HTTP gateway.
    Serve {
        #[arg(long, value_name = "FILE")]
        config: PathBuf,
    },
    /// Parse and validate a configuration file without serving.
    CheckConfig {
        #[arg(long, value_name = "FILE")]
        config: PathBuf,
    },
}

#[derive(thiserror::Error, Debug)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Override(#[from] dispatch::config::OverrideError),
    #[error("invalid configuration: {0}")]
    Validation(#[from] gateway::config::ValidationError),
    #[error("could not connect statsd recorder: {0}")]
    Metrics(#[from] metrics_exporter_statsd::StatsdError),
    #[error("could not install metrics recorder: {0}")]
    MetricsInstall(String),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Gateway(#[from] gateway::GatewayError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match &cli {
        Cli::Serve { config } => run_serve(config),
        Cli::CheckConfig { config } => run_check(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: &Path) -> Result<Config, StartupError> {
    let mut config = Config::from_file(path)?;
    config
        .gateway
        .dispatch
        .apply_overrides(|name| std::env::var(name).ok())?;
    config.gateway.validate()?;

    Ok(config)
}

fn run_serve(path: &Path) -> Result<(), StartupError> {
    let config = load_config(path)?;

    init_tracing();
    // Sentry starts before the runtime; the guard flushes pending events on drop.
    let _sentry = init_sentry(config.common.logging.as_ref());
    if let Some(metrics) = &config.common.metrics {
        init_metrics(metrics)?;
    }

    tracing::info!(config = %path.display(), "starting gateway");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(gateway::serve(config.gateway))?;

    Ok(())
}

fn run_check(path: &Path) -> Result<(), StartupError> {
    let config = load_config(path)?;

    println!("configuration ok");
    println!(
        "listener: {}:{}",
        config.gateway.listener.host, config.gateway.listener.port
    );
    println!(
        "primary enabled: {}",
        config.gateway.dispatch.primary_enabled
    );
    println!(
        "fallback enabled: {}",
        config.gateway.dispatch.fallback_enabled
    );

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn init_sentry(logging: Option<&LoggingConfig>) -> Option<ClientInitGuard> {
    logging.map(|logging| {
        sentry::init((
            logging.sentry_dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    })
}

fn init_metrics(metrics: &MetricsConfig) -> Result<(), StartupError> {
    let recorder = StatsdBuilder::from(metrics.statsd_host.as_str(), metrics.statsd_port)
        .with_queue_size(5000)
        .with_buffer_size(1024)
        .build(Some(metrics.prefix.as_str()))?;
    metrics::set_global_recorder(recorder)
        .map_err(|error| StartupError::MetricsInstall(error.to_string()))?;

    shared::describe_all(dispatch::metrics_defs::ALL_METRICS);
    shared::describe_all(gateway::metrics_defs::ALL_METRICS);

    Ok(())
}
