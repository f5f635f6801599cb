//! # Sensor Hub
//!
//! Owns every emulated sensor and forwards bus polls to them.
//!
//! A poll is offered to each sensor in registration order; only sensors
//! whose id matches emit a word. Measurement snapshots are (re)applied from
//! the configuration, with the GPS date and time optionally taken from the
//! system clock.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::sensor::{FlvssSensor, GpsSensor, RpmSensor, Sensor, SportTransport};
use crate::sport::protocol::SensorId;

/// Collection of sensors answering on one S.Port bus
#[derive(Debug, Default)]
pub struct SensorHub {
    sensors: Vec<Sensor>,
}

impl SensorHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the hub for every enabled sensor section and load its data
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `now` - Timestamp used for the GPS date/time when the system clock is enabled
    ///
    /// # Errors
    ///
    /// Returns error if a configured sensor id is out of range
    pub fn from_config(config: &Config, now: DateTime<Utc>) -> Result<Self> {
        let mut hub = Self::new();

        if config.flvss.enabled {
            hub.add(FlvssSensor::new(SensorId::new(config.flvss.sensor_id)?));
        }
        if config.gps.enabled {
            hub.add(GpsSensor::new(SensorId::new(config.gps.sensor_id)?));
        }
        if config.rpm.enabled {
            hub.add(RpmSensor::new(SensorId::new(config.rpm.sensor_id)?));
        }

        hub.refresh(config, now);
        Ok(hub)
    }

    /// Register a sensor
    pub fn add(&mut self, sensor: impl Into<Sensor>) {
        let sensor = sensor.into();
        info!("Registered {} sensor at {}", sensor.kind(), sensor.id());
        self.sensors.push(sensor);
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Ids of all registered sensors, in registration order
    pub fn ids(&self) -> Vec<SensorId> {
        self.sensors.iter().map(Sensor::id).collect()
    }

    /// Mutable access for updating measurement snapshots directly
    pub fn sensors_mut(&mut self) -> &mut [Sensor] {
        &mut self.sensors
    }

    /// Offer a poll for `id` to every sensor
    pub fn poll(&mut self, id: SensorId, transport: &mut dyn SportTransport) {
        for sensor in self.sensors.iter_mut() {
            sensor.poll(id, transport);
        }
    }

    /// Re-apply measurement snapshots from the configuration
    pub fn refresh(&mut self, config: &Config, now: DateTime<Utc>) {
        for sensor in self.sensors.iter_mut() {
            match sensor {
                Sensor::Flvss(flvss) => flvss.set_data(&config.flvss.cell_voltages()),
                Sensor::Gps(gps) => gps.set_data(&config.gps.fix(now)),
                Sensor::Rpm(rpm) => rpm.set_data(&config.rpm.data()),
            }
        }
        debug!("Refreshed {} sensor snapshots", self.sensors.len());
    }
}
