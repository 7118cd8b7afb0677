//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using
//! the `clap` crate. These arguments are parsed at startup and then merged
//! with the configuration from the `procwatch.toml` file and environment
//! variables.

use clap::Parser;
use figment::{
    providers::Serialized,
    value::{Dict, Map},
    Error, Figment, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// A lightweight agent that ships process and host CPU/memory utilization
/// to InfluxDB.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seconds to sleep between sampling cycles.
    #[arg(long, value_name = "SECONDS")]
    pub delay: Option<u64>,

    /// Number of buffered points that triggers a flush.
    #[arg(long, value_name = "POINTS")]
    pub max_batch: Option<usize>,

    /// Echo every sample to stdout before it is buffered.
    #[arg(long)]
    pub print_data: Option<bool>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut overrides = Figment::new();

        if let Some(delay) = self.delay {
            overrides = overrides.merge(Serialized::default("sampling.delay_seconds", delay));
        }

        if let Some(max_batch) = self.max_batch {
            overrides = overrides.merge(Serialized::default("sampling.max_batch_size", max_batch));
        }

        // The `print_data` flag is special. If it's present, it's true.
        // We use `Option<bool>` and check `is_some()` to differentiate
        // between "not present" and an explicit `--print-data=false`.
        if self.print_data.is_some() {
            overrides = overrides.merge(Serialized::default("sampling.print_data", true));
        }

        overrides.data()
    }
}
