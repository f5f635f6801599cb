//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use chrono::{DateTime, Utc};
use serde::de::Error;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{Result, SportError};
use crate::sensor::flvss::FLVSS_MAX_CELLS;
use crate::sensor::{CellVoltages, GpsFix, RpmData};
use crate::sport::protocol::{SENSOR_ID_COUNT, SPORT_BAUD_RATE};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub serial: SerialConfig,
    pub emulator: EmulatorConfig,
    pub flvss: FlvssConfig,
    pub gps: GpsConfig,
    pub rpm: RpmConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    /// Device path; when unset the common adapter paths are tried in order
    #[serde(default)]
    pub port: Option<String>,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// Emulator loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct EmulatorConfig {
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,

    #[serde(default = "default_status_interval_s")]
    pub status_interval_s: u64,
}

/// FLVSS cell voltage sensor configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FlvssConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_flvss_sensor_id")]
    pub sensor_id: u8,

    #[serde(default = "default_cells")]
    pub cells: Vec<f32>,
}

/// GPS sensor configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GpsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_gps_sensor_id")]
    pub sensor_id: u8,

    #[serde(default)]
    pub latitude: f64,

    #[serde(default)]
    pub longitude: f64,

    #[serde(default)]
    pub altitude: f32,

    #[serde(default)]
    pub speed: f32,

    #[serde(default)]
    pub course: f32,

    /// Take date and time from the host clock instead of the fields below
    #[serde(default = "default_enabled")]
    pub use_system_clock: bool,

    #[serde(default)]
    pub year: u8,

    #[serde(default = "default_month_day")]
    pub month: u8,

    #[serde(default = "default_month_day")]
    pub day: u8,

    #[serde(default)]
    pub hour: u8,

    #[serde(default)]
    pub minute: u8,

    #[serde(default)]
    pub second: u8,
}

/// RPM sensor configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RpmConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_rpm_sensor_id")]
    pub sensor_id: u8,

    #[serde(default)]
    pub rpm: f32,

    #[serde(default)]
    pub t1: f32,

    #[serde(default)]
    pub t2: f32,
}

// Default value functions
fn default_baud_rate() -> u32 { SPORT_BAUD_RATE }

fn default_update_interval_ms() -> u64 { 1000 }
fn default_status_interval_s() -> u64 { 10 }

fn default_enabled() -> bool { true }
fn default_flvss_sensor_id() -> u8 { 2 }
fn default_gps_sensor_id() -> u8 { 4 }
fn default_rpm_sensor_id() -> u8 { 5 }

fn default_cells() -> Vec<f32> { vec![4.2, 4.2, 4.2] }
fn default_month_day() -> u8 { 1 }

impl FlvssConfig {
    /// Configured voltages, absent cells filled with 0.0
    pub fn cell_voltages(&self) -> CellVoltages {
        CellVoltages::from_slice(&self.cells)
    }
}

impl GpsConfig {
    /// Configured fix, with date and time from `now` when the system clock is used
    pub fn fix(&self, now: DateTime<Utc>) -> GpsFix {
        let mut fix = GpsFix {
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            speed: self.speed,
            course: self.course,
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            second: self.second,
        };
        if self.use_system_clock {
            fix.set_timestamp(now);
        }
        fix
    }
}

impl RpmConfig {
    pub fn data(&self) -> RpmData {
        RpmData {
            rpm: self.rpm,
            t1: self.t1,
            t2: self.t2,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sport_sensors::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.serial.port.as_deref().is_some_and(str::is_empty) {
            return Err(invalid("serial port cannot be empty"));
        }

        if self.serial.baud_rate != SPORT_BAUD_RATE {
            return Err(invalid(format!("baud_rate must be {}", SPORT_BAUD_RATE)));
        }

        if self.emulator.update_interval_ms == 0 || self.emulator.update_interval_ms > 60000 {
            return Err(invalid("update_interval_ms must be between 1 and 60000"));
        }

        if self.emulator.status_interval_s == 0 {
            return Err(invalid("status_interval_s must be greater than 0"));
        }

        let mut used_ids = HashSet::new();
        for (name, enabled, sensor_id) in [
            ("flvss", self.flvss.enabled, self.flvss.sensor_id),
            ("gps", self.gps.enabled, self.gps.sensor_id),
            ("rpm", self.rpm.enabled, self.rpm.sensor_id),
        ] {
            if sensor_id == 0 || sensor_id as usize > SENSOR_ID_COUNT {
                return Err(invalid(format!(
                    "{} sensor_id {} is out of range (must be 1-{})",
                    name, sensor_id, SENSOR_ID_COUNT
                )));
            }

            if enabled && !used_ids.insert(sensor_id) {
                return Err(invalid(format!(
                    "{} sensor_id {} is already used by another sensor",
                    name, sensor_id
                )));
            }
        }

        if self.flvss.cells.is_empty() || self.flvss.cells.len() > FLVSS_MAX_CELLS {
            return Err(invalid(format!(
                "flvss cells must list between 1 and {} voltages",
                FLVSS_MAX_CELLS
            )));
        }

        if !self.gps.use_system_clock {
            if !(1..=12).contains(&self.gps.month) {
                return Err(invalid("gps month must be between 1 and 12"));
            }

            if !(1..=31).contains(&self.gps.day) {
                return Err(invalid("gps day must be between 1 and 31"));
            }
        }

        Ok(())
    }
}

fn invalid(message: impl std::fmt::Display) -> SportError {
    SportError::Config(toml::de::Error::custom(message))
}
