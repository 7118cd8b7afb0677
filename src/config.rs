//! Configuration management for procwatch
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to layer a `procwatch.toml` file, environment variables and
//! command-line overrides over built-in defaults.

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cli::Cli;

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Configuration for the InfluxDB sink.
    pub influxdb: InfluxConfig,
    /// Which processes to monitor and how often to re-resolve them.
    pub process: ProcessConfig,
    /// Sampling cadence and batching behavior.
    pub sampling: SamplingConfig,
}

/// Configuration for the InfluxDB sink.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InfluxConfig {
    pub host: String,
    pub port: u16,
    /// Target database name.
    pub database: String,
    /// Credentials are passed through to the sink verbatim; empty strings
    /// disable authentication.
    pub username: String,
    pub password: String,
    /// Measurement name applied to every point.
    pub measurement: String,
}

/// Which processes to monitor.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProcessConfig {
    /// Process names to monitor, matched exactly against the process
    /// table.
    pub names: Vec<String>,
    /// Whether host-level samples are taken each cycle, under the
    /// reserved subject label "OS".
    pub sample_os: bool,
    /// Number of cycles between process-list re-resolutions.
    pub reload_cycles: u32,
}

/// What to do with a batch whose flush fails.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlushFailureMode {
    /// Report the failure and drop the batch (the default).
    Discard,
    /// Retry the write a bounded number of times first, then drop the
    /// batch.
    Retry,
}

/// Sampling cadence and batching behavior.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SamplingConfig {
    /// Seconds slept between sampling cycles.
    pub delay_seconds: u64,
    /// Buffer length that triggers a flush.
    pub max_batch_size: usize,
    /// Echo each sample to stdout in line-protocol form before buffering.
    pub print_data: bool,
    /// Policy for batches whose flush fails.
    pub on_flush_failure: FlushFailureMode,
    /// Extra write attempts when `on_flush_failure = "retry"`.
    pub retry_attempts: u32,
    /// Pause between retry attempts, in milliseconds.
    pub retry_backoff_ms: u64,
}

impl Config {
    /// Loads the application configuration by layering sources: built-in
    /// defaults, the TOML file, `PROCWATCH_*` environment variables, and
    /// CLI arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from("procwatch.toml"));
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // Allow overriding with environment variables, e.g.
            // PROCWATCH_LOG_LEVEL=debug
            .merge(Env::prefixed("PROCWATCH_"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            influxdb: InfluxConfig {
                host: "localhost".to_string(),
                port: 8086,
                database: "procwatch".to_string(),
                username: String::new(),
                password: String::new(),
                measurement: "proc_stats".to_string(),
            },
            process: ProcessConfig {
                names: vec![],
                sample_os: true,
                reload_cycles: 10,
            },
            sampling: SamplingConfig {
                delay_seconds: 10,
                max_batch_size: 10,
                print_data: false,
                on_flush_failure: FlushFailureMode::Discard,
                retry_attempts: 3,
                retry_backoff_ms: 1000,
            },
        }
    }
}
