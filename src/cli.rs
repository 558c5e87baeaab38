//! CLI arguments for the imgd-status host binary.
//!
//! This module defines the command-line interface using the clap library and
//! merges it over the file configuration.

use clap::{Parser, ValueEnum};
use imgd_status::Config;
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Effective level from the merged config, falling back to info.
    pub fn resolve(config: &Config) -> Self {
        config
            .log_level
            .as_deref()
            .and_then(|name| LogLevel::from_str(name, true).ok())
            .unwrap_or(LogLevel::Info)
    }
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "imgd-status",
    about = "Status and metrics aggregator for the imgd image cache",
    long_about = "Status and metrics aggregator for the imgd image cache.\n\n\
                  Collects cache, request and error counters plus periodically sampled \
                  gauges, and serves them as a JSON status document and Prometheus metrics.",
    version,
    propagate_version = true
)]
pub struct Args {
    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level (overrides log_level from the config file; default: info)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Seconds between gauge samples
    #[arg(long)]
    pub tick_interval_secs: Option<u64>,

    /// Capacity of the ingestion queue
    #[arg(long)]
    pub queue_capacity: Option<usize>,
}

impl Args {
    /// Applies CLI overrides. Precedence: CLI > config file > default.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(level) = &self.log_level {
            config.log_level = level
                .to_possible_value()
                .map(|v| v.get_name().to_string());
        }
        if let Some(bind_ip) = self.bind {
            config.server.bind = bind_ip.to_string();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(secs) = self.tick_interval_secs {
            config.collector.tick_interval_secs = secs;
        }
        if let Some(capacity) = self.queue_capacity {
            config.collector.queue_capacity = capacity;
        }
    }
}
