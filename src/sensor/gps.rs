//! # GPS Sensor
//!
//! Packs a GPS fix into seven S.Port words sent in a fixed rotation:
//!
//! | Slot | Data id | Content |
//! |------|---------|---------|
//! | 0 | 0x0800 | Latitude |
//! | 1 | 0x0800 | Longitude |
//! | 2 | 0x0820 | Altitude (cm) |
//! | 3 | 0x0830 | Speed (m/s × 1944) |
//! | 4 | 0x0840 | Course over ground (0.01°) |
//! | 5 | 0x0850 | Date `[yy][mm][dd][0xFF]` |
//! | 6 | 0x0850 | Time `[hh][mm][ss][0x00]` |

use chrono::{DateTime, Datelike, Timelike, Utc};
use tracing::trace;

use super::{scaled_word, Rotation, SportTransport};
use crate::sport::protocol::*;

/// Conventional address of a GPS sensor
pub const GPS_DEFAULT_ID: SensorId = SensorId::ID4;

/// Rotation slots
pub const GPS_DATA_COUNT: usize = 7;

/// Speed scale applied by receivers (fixed-point m/s to knots)
const GPS_SPEED_SCALE: f64 = 1944.0;

/// Coordinate magnitude mask (30 bits)
const LAT_LON_MASK: u32 = 0x3FFF_FFFF;

/// Set on longitude words
const LON_FLAG: u32 = 0x8000_0000;

/// Set on negative (south / west) coordinates
const NEGATIVE_FLAG: u32 = 0x4000_0000;

/// Low byte marking a date word
const DATE_MARKER: u32 = 0xFF;

/// One GPS fix plus UTC date and time
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsFix {
    /// Decimal degrees, negative south
    pub latitude: f64,

    /// Decimal degrees, negative west
    pub longitude: f64,

    /// Meters
    pub altitude: f32,

    /// Meters per second
    pub speed: f32,

    /// Course over ground in degrees
    pub course: f32,

    /// Year within the century (e.g. 24 for 2024)
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl GpsFix {
    /// Fill the date and time fields from a UTC timestamp
    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.year = timestamp.year().rem_euclid(100) as u8;
        self.month = timestamp.month() as u8;
        self.day = timestamp.day() as u8;
        self.hour = timestamp.hour() as u8;
        self.minute = timestamp.minute() as u8;
        self.second = timestamp.second() as u8;
    }
}

/// Encode a coordinate as minutes × 10000 with axis and sign flags
///
/// # Arguments
///
/// * `degrees` - Decimal degrees
/// * `is_latitude` - `false` sets the longitude flag (bit 31)
pub fn encode_lat_lon(degrees: f64, is_latitude: bool) -> u32 {
    let mut data = scaled_word((degrees.abs() * 60.0 * 10000.0).floor()) & LAT_LON_MASK;
    if !is_latitude {
        data |= LON_FLAG;
    }
    if degrees < 0.0 {
        data |= NEGATIVE_FLAG;
    }
    data
}

/// Pack three byte fields into the top of a word
///
/// Date words carry 0xFF in the low byte; time words leave it zero.
pub fn encode_date_time(year_or_hour: u8, month_or_minute: u8, day_or_second: u8, is_date: bool) -> u32 {
    let mut data =
        ((year_or_hour as u32) << 24) | ((month_or_minute as u32) << 16) | ((day_or_second as u32) << 8);
    if is_date {
        data |= DATE_MARKER;
    }
    data
}

/// FrSky GPS sensor
#[derive(Debug, Clone)]
pub struct GpsSensor {
    id: SensorId,
    rotation: Rotation,
    lat: u32,
    lon: u32,
    alt: u32,
    speed: u32,
    cog: u32,
    date: u32,
    time: u32,
}

impl GpsSensor {
    pub fn new(id: SensorId) -> Self {
        Self {
            id,
            rotation: Rotation::new(GPS_DATA_COUNT),
            lat: 0,
            lon: 0,
            alt: 0,
            speed: 0,
            cog: 0,
            date: 0,
            time: 0,
        }
    }

    pub fn id(&self) -> SensorId {
        self.id
    }

    /// Replace the measurement snapshot with a new fix
    pub fn set_data(&mut self, fix: &GpsFix) {
        self.lat = encode_lat_lon(fix.latitude, true);
        self.lon = encode_lat_lon(fix.longitude, false);
        self.alt = scaled_word((fix.altitude as f64 * 100.0).round());
        self.speed = scaled_word((fix.speed as f64 * GPS_SPEED_SCALE).round());
        self.cog = scaled_word((fix.course as f64 * 100.0).round());
        self.date = encode_date_time(fix.year, fix.month, fix.day, true);
        self.time = encode_date_time(fix.hour, fix.minute, fix.second, false);
    }

    /// Data id and word for a rotation slot
    fn slot(&self, slot: usize) -> (u16, u32) {
        match slot {
            0 => (GPS_LAT_LON_DATA_ID, self.lat),
            1 => (GPS_LAT_LON_DATA_ID, self.lon),
            2 => (GPS_ALT_DATA_ID, self.alt),
            3 => (GPS_SPEED_DATA_ID, self.speed),
            4 => (GPS_COG_DATA_ID, self.cog),
            5 => (GPS_DATE_TIME_DATA_ID, self.date),
            _ => (GPS_DATE_TIME_DATA_ID, self.time),
        }
    }

    /// Emit the next GPS word when `id` addresses this sensor
    pub fn poll(&mut self, id: SensorId, transport: &mut dyn SportTransport) {
        if id != self.id {
            return;
        }

        let (data_id, value) = self.slot(self.rotation.current());
        trace!("{} gps 0x{:04X} -> 0x{:08X}", self.id, data_id, value);
        transport.send_data(data_id, value);
        self.rotation.advance();
    }
}

impl Default for GpsSensor {
    fn default() -> Self {
        Self::new(GPS_DEFAULT_ID)
    }
}
