//! # S.Port Sensors
//!
//! Emulate FrSky S.Port telemetry sensors (FLVSS, GPS, RPM) on a real bus.
//!
//! The application listens for poll requests from the receiver and answers
//! for every sensor enabled in the configuration file.

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

mod config;
mod error;
mod hub;
mod sensor;
mod serial;
mod sport;

use config::Config;
use hub::SensorHub;
use serial::SportSerial;
use sport::decoder::PollDecoder;

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for the S.Port sensor emulator
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first argument, or `config/default.toml`)
///    - Build the sensor hub and open the serial port
///
/// 2. **Main Loop**
///    - Answer the latest poll request as it arrives on the bus
///    - Refresh sensor snapshots on the update interval (GPS clock)
///    - Log poll and frame counters on the status interval
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if:
/// - The configuration cannot be loaded
/// - The serial port cannot be opened
/// - The bus connection is lost
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("S.Port Sensors v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;
    info!("Loaded configuration from {}", config_path);

    let mut hub = SensorHub::from_config(&config, Utc::now())?;
    if hub.is_empty() {
        warn!("No sensors enabled, nothing will answer on the bus");
    }

    let mut serial = match config.serial.port.as_deref() {
        Some(port) => SportSerial::open_with_paths(&[port], config.serial.baud_rate)?,
        None => SportSerial::open()?,
    };
    info!("S.Port bus opened at: {}", serial.device_path());

    let mut decoder = PollDecoder::new();
    let mut update_interval = interval(Duration::from_millis(config.emulator.update_interval_ms));
    let mut status_interval = interval(Duration::from_secs(config.emulator.status_interval_s));

    info!("Answering polls for {:?}", hub.ids());
    info!("Press Ctrl+C to exit");

    let mut poll_count: u64 = 0;
    let mut frame_count: u64 = 0;

    // Main loop
    loop {
        tokio::select! {
            result = serial.read_polls(&mut decoder) => {
                let polls = result.context("S.Port bus connection lost")?;
                let stats = serial.answer(&polls, &mut hub).await
                    .context("Failed to answer poll")?;
                poll_count += stats.polls as u64;
                frame_count += stats.frames as u64;
            }

            _ = update_interval.tick() => {
                hub.refresh(&config, Utc::now());
            }

            _ = status_interval.tick() => {
                info!("Seen {} polls, sent {} frames", poll_count, frame_count);
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total polls seen: {}, frames sent: {}", poll_count, frame_count);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "config/default.toml");
    }

    #[test]
    fn test_shipped_config_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
        let config = Config::load(path).unwrap();

        let hub = SensorHub::from_config(&config, Utc::now()).unwrap();
        assert_eq!(hub.len(), 3);
        assert!(config.serial.port.is_none());
    }
}
