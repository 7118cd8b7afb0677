//! procwatch - process and host utilization shipping agent
//!
//! Periodically samples CPU and memory for a configured set of named OS
//! processes and for the host, and ships the samples to InfluxDB in
//! bounded batches.

use anyhow::Result;
use clap::Parser;
use procwatch::{
    cli::Cli,
    config::Config,
    influx::InfluxWriter,
    monitor::Monitor,
    probe::SysinfoProbe,
    sink::{BatchingSink, FlushPolicy},
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli).unwrap_or_else(|err| {
        // Logging is not configured yet; set up a plain subscriber for
        // this specific error.
        tracing_subscriber::fmt().init();
        error!("Failed to load configuration: {}", err);
        // Exit if configuration fails, as it's a critical step.
        std::process::exit(1);
    });

    // Initialize logging. RUST_LOG takes precedence over the configured
    // level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("procwatch starting up...");

    // Log the loaded configuration settings for visibility
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!(
        "InfluxDB: {}:{} db={} measurement={}",
        config.influxdb.host,
        config.influxdb.port,
        config.influxdb.database,
        config.influxdb.measurement
    );
    if config.process.names.is_empty() {
        info!("Processes: (none configured)");
    } else {
        info!("Processes: {}", config.process.names.join(", "));
    }
    info!("OS Sampling: {}", config.process.sample_os);
    info!("Cycle Delay: {}s", config.sampling.delay_seconds);
    info!("Reload Interval: {} cycles", config.process.reload_cycles);
    info!("Max Batch Size: {}", config.sampling.max_batch_size);
    info!("Print Data: {}", config.sampling.print_data);
    info!("-------------------------------------------------------");

    let writer = Arc::new(InfluxWriter::from_config(&config.influxdb)?);
    let sink = BatchingSink::new(
        writer,
        config.influxdb.measurement.clone(),
        config.sampling.max_batch_size,
        config.sampling.print_data,
        FlushPolicy::from_config(&config.sampling),
    );
    let host = SysinfoProbe::host_name();
    info!("Host tag: {}", host);
    let monitor = Monitor::new(SysinfoProbe::new(), sink, &config, host);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor_task = tokio::spawn(monitor.run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Shutting down gracefully...");
    shutdown_tx.send(true).ok();

    if let Err(e) = monitor_task.await {
        error!("Monitor task panicked: {:?}", e);
    }

    info!("All tasks shut down. Exiting.");
    Ok(())
}
