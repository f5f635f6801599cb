//! # Sensor Module
//!
//! S.Port sensor data model: encodes physical measurements into 32-bit
//! protocol words and schedules them round-robin across poll requests.
//!
//! This module handles:
//! - The transport seam sensors emit words through
//! - Per-sensor rotation state (one slot per protocol word)
//! - Cell voltage (FLVSS), GPS and RPM/temperature encoders
//! - Dispatch over the closed set of sensor kinds

pub mod flvss;
pub mod gps;
pub mod rpm;

pub use flvss::{CellVoltages, FlvssSensor};
pub use gps::{GpsFix, GpsSensor};
pub use rpm::{RpmData, RpmSensor};

use crate::sport::protocol::SensorId;

/// Transport accepting one protocol word at a time
///
/// Framing, checksums and bus timing belong to the implementation; a sensor
/// only hands over the data type id and the encoded value. Failures are not
/// reported back to the sensor.
#[cfg_attr(test, mockall::automock)]
pub trait SportTransport {
    /// Send one data word
    ///
    /// # Arguments
    ///
    /// * `data_type_id` - 16-bit protocol data type (e.g. 0x0300)
    /// * `value` - 32-bit encoded word
    fn send_data(&mut self, data_type_id: u16, value: u32);
}

/// Round-robin slot index of a sensor
///
/// The index always stays in `[0, slot_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rotation {
    index: usize,
    slot_count: usize,
}

impl Rotation {
    pub(crate) const fn new(slot_count: usize) -> Self {
        Self { index: 0, slot_count }
    }

    /// Slot to emit on this poll
    pub(crate) fn current(&self) -> usize {
        self.index
    }

    /// Abandon the remaining slots of this cycle
    ///
    /// The following [`Rotation::advance`] wraps back to slot 0.
    pub(crate) fn skip_rest(&mut self) {
        self.index = self.slot_count;
    }

    pub(crate) fn advance(&mut self) {
        self.index += 1;
        if self.index >= self.slot_count {
            self.index = 0;
        }
    }
}

/// Convert a scaled physical value into a protocol word
///
/// Goes through `i64` so negative and oversized values wrap into the low
/// 32 bits instead of saturating.
pub(crate) fn scaled_word(value: f64) -> u32 {
    value as i64 as u32
}

/// Any S.Port sensor the emulator can host
#[derive(Debug, Clone)]
pub enum Sensor {
    Flvss(FlvssSensor),
    Gps(GpsSensor),
    Rpm(RpmSensor),
}

impl Sensor {
    /// Logical bus address of this sensor
    pub fn id(&self) -> SensorId {
        match self {
            Sensor::Flvss(sensor) => sensor.id(),
            Sensor::Gps(sensor) => sensor.id(),
            Sensor::Rpm(sensor) => sensor.id(),
        }
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Sensor::Flvss(_) => "flvss",
            Sensor::Gps(_) => "gps",
            Sensor::Rpm(_) => "rpm",
        }
    }

    /// Handle a poll request for `id`
    ///
    /// Emits at most one word through `transport`. Does nothing when `id`
    /// addresses another sensor.
    pub fn poll(&mut self, id: SensorId, transport: &mut dyn SportTransport) {
        match self {
            Sensor::Flvss(sensor) => sensor.poll(id, transport),
            Sensor::Gps(sensor) => sensor.poll(id, transport),
            Sensor::Rpm(sensor) => sensor.poll(id, transport),
        }
    }
}

impl From<FlvssSensor> for Sensor {
    fn from(sensor: FlvssSensor) -> Self {
        Sensor::Flvss(sensor)
    }
}

impl From<GpsSensor> for Sensor {
    fn from(sensor: GpsSensor) -> Self {
        Sensor::Gps(sensor)
    }
}

impl From<RpmSensor> for Sensor {
    fn from(sensor: RpmSensor) -> Self {
        Sensor::Rpm(sensor)
    }
}
