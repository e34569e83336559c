//! # Pylon Bridge
//!
//! Aggregate Pylontech battery stack telemetry and publish derived metrics.
//!
//! This application reads the structured stack snapshot written by the
//! console reader and publishes raw and derived values as JSON lines on
//! stdout, where a broker adapter can pick them up.

use anyhow::{Context, Result};
use tokio::time::{interval, Duration};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use pylon_bridge::config::{Config, LoggingConfig};
use pylon_bridge::monitor::Monitor;
use pylon_bridge::source::JsonFileSource;
use pylon_bridge::telemetry::publisher::JsonLinesPublisher;

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of cycles between status log messages
const LOG_INTERVAL_CYCLES: u64 = 30;

/// Main entry point for Pylon Bridge application
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument or `config/default.toml`)
///    - Set up logging to stderr or a daily rolling file
///    - Open the snapshot source and stdout publisher
///
/// 2. **Main Loop**
///    - Run one publish cycle every `publish.interval_s` seconds
///    - Log and skip failed cycles, never abort on them
///    - Log status every 30 cycles
///
/// 3. **Graceful Shutdown**
///    - Stop on Ctrl+C
///    - Log cycle totals
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
///
/// Expected output (stderr):
/// ```text
/// INFO pylon_bridge: Pylon Bridge v0.1.0 starting...
/// INFO pylon_bridge: Publishing every 2s under pylontech/sensor/grid_battery/
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = config_path(std::env::args());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&config.logging);

    info!("Pylon Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let source = JsonFileSource::new(&config.source.snapshot_path);
    info!("Reading stack snapshots from {}", source.path().display());

    let publisher = JsonLinesPublisher::new(tokio::io::stdout());
    let interval_s = config.publish.interval_s;
    info!("Publishing every {}s under {}", interval_s, config.publish.topic_root);

    let mut monitor = Monitor::new(source, publisher, config.publish);
    let mut publish_interval = interval(Duration::from_secs(interval_s));

    info!("Press Ctrl+C to exit");

    let mut completed_cycles: u64 = 0;
    let mut failed_cycles: u64 = 0;
    let mut last_log_cycles: u64 = 0;

    loop {
        // The cycle runs inside the select so Ctrl+C can cancel a stalled publish
        tokio::select! {
            (result, cycles) = async {
                publish_interval.tick().await;
                let result = monitor.run_cycle().await;
                (result, monitor.cycles())
            } => {
                completed_cycles = cycles;

                if let Err(e) = result {
                    failed_cycles += 1;
                    warn!("Publish cycle failed: {}", e);
                    continue;
                }

                if completed_cycles - last_log_cycles >= LOG_INTERVAL_CYCLES {
                    info!("Completed {} cycles ({} failed)", completed_cycles, failed_cycles);
                    last_log_cycles = completed_cycles;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total cycles: {} completed, {} failed", completed_cycles, failed_cycles);
                break;
            }
        }
    }

    Ok(())
}

/// Configuration path from the command line, falling back to the default
fn config_path<I: IntoIterator<Item = String>>(args: I) -> String {
    args.into_iter()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Set up the tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Logs go to stderr
/// because stdout carries the published telemetry.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.log_dir.is_empty() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&logging.log_dir, "pylon-bridge.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}
