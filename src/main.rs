//! imgd-status - version 0.1.0
//!
//! Standalone host for the status collector with tracing logging.
//! This is the main entry point that loads configuration, starts the
//! collector and serves `/status` and `/metrics`.

mod app_state;
mod cli;
mod handlers;

use axum::{routing::get, Router};
use clap::Parser;
use imgd_status::{
    config::load_config, Collaborators, Config, EmptyCache, PrometheusSink, StatusCollector,
};
use prometheus::Registry;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info, Level};

use app_state::AppState;
use cli::{Args, ConfigFormat, LogLevel};
use handlers::{metrics_handler, root_handler, status_handler};

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let level = LogLevel::resolve(config);
    let log_level = match level {
        LogLevel::Off => return Ok(()),
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Logging initialized with level: {:?}", level);
    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };
    args.apply_overrides(&mut config);
    Ok(config)
}

/// Shows configuration in requested format
fn show_config(config: &Config, format: &ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    println!("{output}");
    Ok(())
}

/// Completes on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    if args.check_config {
        if let Err(e) = config.validate() {
            eprintln!("❌ Configuration invalid: {}", e);
            std::process::exit(1);
        }
        println!("✅ Configuration is valid");
        return Ok(());
    }

    if args.show_config {
        return show_config(&config, &args.config_format);
    }

    if let Err(e) = config.validate() {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }

    setup_logging(&config)?;

    info!("Starting imgd-status");

    let registry = Registry::new();
    let sink = PrometheusSink::new(&registry, &config.collector.metrics_namespace)?;
    debug!("Prometheus registry initialized");

    let deps = Collaborators::new(Arc::new(sink), Arc::new(EmptyCache));
    let (collector, task) = StatusCollector::spawn(&config.collector, deps)?;
    info!(
        "Status collector running: tick every {}s, queue capacity {}",
        config.collector.tick_interval_secs, config.collector.queue_capacity
    );

    let state = Arc::new(AppState {
        registry,
        collector,
    });

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state);

    let addr = SocketAddr::new(config.server.bind.parse::<IpAddr>()?, config.server.port);
    let listener = TcpListener::bind(addr).await?;
    info!("imgd-status listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and its collector handle) is gone; stop the task and flush
    task.shutdown().await?;

    info!("imgd-status stopped gracefully");
    Ok(())
}
