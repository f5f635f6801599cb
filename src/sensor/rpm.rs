//! # RPM Sensor
//!
//! Rotation speed plus two temperatures, sent as three S.Port words.

use tracing::trace;

use super::{scaled_word, Rotation, SportTransport};
use crate::sport::protocol::{SensorId, RPM_ROT_DATA_ID, RPM_T1_DATA_ID, RPM_T2_DATA_ID};

/// Conventional address of an RPM sensor
pub const RPM_DEFAULT_ID: SensorId = SensorId::ID5;

/// Rotation slots: rpm, temperature 1, temperature 2
pub const RPM_DATA_COUNT: usize = 3;

/// RPM sensor measurements
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RpmData {
    /// Revolutions per minute
    pub rpm: f32,

    /// Temperature 1 in °C (fraction truncated)
    pub t1: f32,

    /// Temperature 2 in °C (fraction truncated)
    pub t2: f32,
}

/// FrSky RPM and temperature sensor
#[derive(Debug, Clone)]
pub struct RpmSensor {
    id: SensorId,
    rotation: Rotation,
    rpm: u32,
    t1: i32,
    t2: i32,
}

impl RpmSensor {
    pub fn new(id: SensorId) -> Self {
        Self {
            id,
            rotation: Rotation::new(RPM_DATA_COUNT),
            rpm: 0,
            t1: 0,
            t2: 0,
        }
    }

    pub fn id(&self) -> SensorId {
        self.id
    }

    /// Replace the measurement snapshot
    ///
    /// RPM is stored in half-rpm units; temperatures are truncated to whole
    /// degrees and may be negative.
    pub fn set_data(&mut self, data: &RpmData) {
        self.rpm = scaled_word((data.rpm as f64 * 2.0).round());
        self.t1 = data.t1 as i32;
        self.t2 = data.t2 as i32;
    }

    /// Emit the next word when `id` addresses this sensor
    pub fn poll(&mut self, id: SensorId, transport: &mut dyn SportTransport) {
        if id != self.id {
            return;
        }

        let (data_id, value) = match self.rotation.current() {
            0 => (RPM_ROT_DATA_ID, self.rpm),
            1 => (RPM_T1_DATA_ID, self.t1 as u32),
            _ => (RPM_T2_DATA_ID, self.t2 as u32),
        };
        trace!("{} rpm 0x{:04X} -> 0x{:08X}", self.id, data_id, value);
        transport.send_data(data_id, value);
        self.rotation.advance();
    }
}

impl Default for RpmSensor {
    fn default() -> Self {
        Self::new(RPM_DEFAULT_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::mocks::RecordingTransport;
    use crate::sensor::MockSportTransport;

    #[test]
    fn test_default_id() {
        assert_eq!(RpmSensor::default().id(), SensorId::ID5);
        assert_eq!(RpmSensor::new(SensorId::ID6).id(), SensorId::ID6);
    }

    #[test]
    fn test_rotation_sends_all_slots() {
        let mut sensor = RpmSensor::default();
        sensor.set_data(&RpmData { rpm: 1500.0, t1: 45.9, t2: -12.7 });
        let mut transport = RecordingTransport::new();

        for _ in 0..RPM_DATA_COUNT {
            sensor.poll(SensorId::ID5, &mut transport);
        }

        assert_eq!(
            transport.sent,
            vec![
                (RPM_ROT_DATA_ID, 3000),
                (RPM_T1_DATA_ID, 45),
                (RPM_T2_DATA_ID, (-12i32) as u32),
            ]
        );
        assert_eq!(sensor.rotation.current(), 0);
    }

    #[test]
    fn test_rpm_rounds_to_half_rpm() {
        let mut sensor = RpmSensor::default();
        sensor.set_data(&RpmData { rpm: 100.3, ..RpmData::default() });
        assert_eq!(sensor.rpm, 201);

        sensor.set_data(&RpmData { rpm: 100.2, ..RpmData::default() });
        assert_eq!(sensor.rpm, 200);
    }

    #[test]
    fn test_default_temperatures_are_zero() {
        let mut sensor = RpmSensor::default();
        sensor.set_data(&RpmData { rpm: 10.0, ..RpmData::default() });
        assert_eq!((sensor.t1, sensor.t2), (0, 0));
    }

    #[test]
    fn test_rotation_stays_in_bounds() {
        let mut sensor = RpmSensor::default();
        let mut transport = RecordingTransport::new();

        for poll in 1..=10 {
            sensor.poll(SensorId::ID5, &mut transport);
            assert_eq!(sensor.rotation.current(), poll % RPM_DATA_COUNT);
        }
    }

    #[test]
    fn test_other_id_is_ignored() {
        let mut sensor = RpmSensor::default();
        sensor.set_data(&RpmData { rpm: 900.0, t1: 20.0, t2: 21.0 });

        let mut transport = MockSportTransport::new();
        transport.expect_send_data().times(0);

        sensor.poll(SensorId::ID4, &mut transport);
        sensor.poll(SensorId::ID2, &mut transport);
        assert_eq!(sensor.rotation.current(), 0);
        assert_eq!(sensor.rpm, 1800);
    }
}
