//! # S.Port Protocol Constants and Types
//!
//! Core protocol definitions for FrSky S.Port (Smart Port) communication.

use crate::error::{Result, SportError};
use std::fmt;

/// Start byte of a poll request sent by the bus master (always 0x7E)
pub const SPORT_START_BYTE: u8 = 0x7E;

/// Byte-stuffing escape marker
pub const SPORT_STUFF_BYTE: u8 = 0x7D;

/// Value XORed into a stuffed byte
pub const SPORT_STUFF_MASK: u8 = 0x20;

/// Frame header of a sensor data frame
pub const SPORT_DATA_FRAME: u8 = 0x10;

/// Unstuffed data frame size: header(1) + data id(2) + value(4) + crc(1)
pub const SPORT_DATA_FRAME_SIZE: usize = 8;

/// S.Port baud rate (57,600 baud, 8N1, inverted on the wire)
pub const SPORT_BAUD_RATE: u32 = 57_600;

/// FLVSS cell voltage data type
pub const FLVSS_CELL_DATA_ID: u16 = 0x0300;

/// GPS latitude and longitude data type (axis carried in bit 31 of the value)
pub const GPS_LAT_LON_DATA_ID: u16 = 0x0800;

/// GPS altitude data type
pub const GPS_ALT_DATA_ID: u16 = 0x0820;

/// GPS speed data type
pub const GPS_SPEED_DATA_ID: u16 = 0x0830;

/// GPS course over ground data type
pub const GPS_COG_DATA_ID: u16 = 0x0840;

/// GPS date and time data type (date marked by 0xFF in the low byte)
pub const GPS_DATE_TIME_DATA_ID: u16 = 0x0850;

/// RPM sensor temperature 1 data type
pub const RPM_T1_DATA_ID: u16 = 0x0400;

/// RPM sensor temperature 2 data type
pub const RPM_T2_DATA_ID: u16 = 0x0410;

/// RPM sensor rotation speed data type
pub const RPM_ROT_DATA_ID: u16 = 0x0500;

/// Number of addressable sensor ids on one bus
pub const SENSOR_ID_COUNT: usize = 28;

/// Physical id bytes, indexed by logical id minus one.
///
/// The low five bits carry the logical index; bits 5..7 are parity bits.
const PHYSICAL_IDS: [u8; SENSOR_ID_COUNT] = [
    0x00, 0xA1, 0x22, 0x83, 0xE4, 0x45, 0xC6, 0x67, 0x48, 0xE9, 0x6A, 0xCB, 0xAC, 0x0D,
    0x8E, 0x2F, 0xD0, 0x71, 0xF2, 0x53, 0x34, 0x95, 0x16, 0xB7, 0x98, 0x39, 0xBA, 0x1B,
];

/// Logical sensor address on the S.Port bus (ID1 to ID28)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SensorId(u8);

impl SensorId {
    pub const ID1: SensorId = SensorId(1);
    pub const ID2: SensorId = SensorId(2);
    pub const ID3: SensorId = SensorId(3);
    pub const ID4: SensorId = SensorId(4);
    pub const ID5: SensorId = SensorId(5);
    pub const ID6: SensorId = SensorId(6);
    pub const ID7: SensorId = SensorId(7);
    pub const ID8: SensorId = SensorId(8);
    pub const ID9: SensorId = SensorId(9);
    pub const ID10: SensorId = SensorId(10);
    pub const ID11: SensorId = SensorId(11);
    pub const ID12: SensorId = SensorId(12);
    pub const ID13: SensorId = SensorId(13);
    pub const ID14: SensorId = SensorId(14);
    pub const ID15: SensorId = SensorId(15);
    pub const ID16: SensorId = SensorId(16);
    pub const ID17: SensorId = SensorId(17);
    pub const ID18: SensorId = SensorId(18);
    pub const ID19: SensorId = SensorId(19);
    pub const ID20: SensorId = SensorId(20);
    pub const ID21: SensorId = SensorId(21);
    pub const ID22: SensorId = SensorId(22);
    pub const ID23: SensorId = SensorId(23);
    pub const ID24: SensorId = SensorId(24);
    pub const ID25: SensorId = SensorId(25);
    pub const ID26: SensorId = SensorId(26);
    pub const ID27: SensorId = SensorId(27);
    pub const ID28: SensorId = SensorId(28);

    /// Create a sensor id from its logical number
    ///
    /// # Arguments
    ///
    /// * `number` - Logical id (1-28)
    ///
    /// # Errors
    ///
    /// Returns error if `number` is outside 1-28
    pub fn new(number: u8) -> Result<Self> {
        if (1..=SENSOR_ID_COUNT as u8).contains(&number) {
            Ok(Self(number))
        } else {
            Err(SportError::Protocol(format!(
                "Sensor id {} out of range (must be 1-{})",
                number, SENSOR_ID_COUNT
            )))
        }
    }

    /// Look up the sensor id addressed by a physical id byte
    ///
    /// Returns `None` for bytes that are not a valid physical id.
    pub fn from_physical(byte: u8) -> Option<Self> {
        PHYSICAL_IDS
            .iter()
            .position(|&id| id == byte)
            .map(|index| Self(index as u8 + 1))
    }

    /// Logical id number (1-28)
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Physical id byte sent by the bus master after the start byte
    pub const fn physical(self) -> u8 {
        PHYSICAL_IDS[(self.0 - 1) as usize]
    }

    /// Iterate over all 28 sensor ids in order
    pub fn all() -> impl Iterator<Item = SensorId> {
        (1..=SENSOR_ID_COUNT as u8).map(SensorId)
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID{}", self.0)
    }
}

impl TryFrom<u8> for SensorId {
    type Error = SportError;

    fn try_from(number: u8) -> Result<Self> {
        Self::new(number)
    }
}

/// Decoded S.Port data frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFrame {
    /// Data type id (e.g. 0x0300 for FLVSS cells)
    pub data_id: u16,

    /// 32-bit protocol word
    pub value: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parity bits as the receivers compute them
    fn physical_from_parity(index: u8) -> u8 {
        let bit = |n: u8| (index >> n) & 1;
        let p5 = bit(0) ^ bit(1) ^ bit(2);
        let p6 = bit(2) ^ bit(3) ^ bit(4);
        let p7 = bit(0) ^ bit(2) ^ bit(4);
        index | (p5 << 5) | (p6 << 6) | (p7 << 7)
    }

    #[test]
    fn test_frame_constants() {
        assert_eq!(SPORT_START_BYTE, 0x7E);
        assert_eq!(SPORT_STUFF_BYTE, 0x7D);
        assert_eq!(SPORT_DATA_FRAME, 0x10);
        assert_eq!(SPORT_DATA_FRAME_SIZE, 8);
        assert_eq!(SPORT_BAUD_RATE, 57_600);
    }

    #[test]
    fn test_data_ids() {
        assert_eq!(FLVSS_CELL_DATA_ID, 0x0300);
        assert_eq!(RPM_ROT_DATA_ID, 0x0500);
        assert_eq!(RPM_T1_DATA_ID, 0x0400);
        assert_eq!(RPM_T2_DATA_ID, 0x0410);
        assert_eq!(GPS_LAT_LON_DATA_ID, 0x0800);
        assert_eq!(GPS_DATE_TIME_DATA_ID, 0x0850);
    }

    #[test]
    fn test_physical_ids_match_parity() {
        for id in SensorId::all() {
            assert_eq!(
                id.physical(),
                physical_from_parity(id.number() - 1),
                "Physical id mismatch for {}",
                id
            );
        }
    }

    #[test]
    fn test_known_physical_ids() {
        assert_eq!(SensorId::ID1.physical(), 0x00);
        assert_eq!(SensorId::ID2.physical(), 0xA1);
        assert_eq!(SensorId::ID4.physical(), 0x83);
        assert_eq!(SensorId::ID5.physical(), 0xE4);
        assert_eq!(SensorId::ID28.physical(), 0x1B);
    }

    #[test]
    fn test_from_physical_round_trip() {
        for id in SensorId::all() {
            assert_eq!(SensorId::from_physical(id.physical()), Some(id));
        }
        assert_eq!(SensorId::from_physical(0x01), None);
        assert_eq!(SensorId::from_physical(0xFF), None);
    }

    #[test]
    fn test_sensor_id_range() {
        assert!(SensorId::new(0).is_err());
        assert!(SensorId::new(29).is_err());
        assert_eq!(SensorId::new(1).unwrap(), SensorId::ID1);
        assert_eq!(SensorId::try_from(28).unwrap(), SensorId::ID28);
        assert_eq!(SensorId::all().count(), 28);
    }

    #[test]
    fn test_sensor_id_display() {
        assert_eq!(SensorId::ID5.to_string(), "ID5");
        assert_eq!(SensorId::ID28.to_string(), "ID28");
    }
}
