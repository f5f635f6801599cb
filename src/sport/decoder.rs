//! # S.Port Decoder
//!
//! Decodes poll requests from the bus byte stream and S.Port data frames.

use super::crc::sport_crc_valid;
use super::protocol::*;
use crate::error::{Result, SportError};

/// Byte-at-a-time poll request decoder
///
/// The bus master sends `0x7E` followed by a physical sensor id. Data frames
/// from other sensors never contain a raw `0x7E` (it is always stuffed), so a
/// start byte reliably marks the beginning of a poll.
#[derive(Debug, Default)]
pub struct PollDecoder {
    after_start: bool,
}

impl PollDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte from the bus
    ///
    /// # Returns
    ///
    /// * `Option<SensorId>` - The polled sensor id when `byte` completes a
    ///   poll request, `None` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use sport_sensors::sport::decoder::PollDecoder;
    /// use sport_sensors::sport::protocol::SensorId;
    ///
    /// let mut decoder = PollDecoder::new();
    /// assert_eq!(decoder.push(0x7E), None);
    /// assert_eq!(decoder.push(0xA1), Some(SensorId::ID2));
    /// ```
    pub fn push(&mut self, byte: u8) -> Option<SensorId> {
        if byte == SPORT_START_BYTE {
            // A repeated start byte restarts the request
            self.after_start = true;
            return None;
        }

        if !self.after_start {
            return None;
        }

        self.after_start = false;
        SensorId::from_physical(byte)
    }

    /// Feed a buffer of bus bytes, collecting every completed poll
    pub fn push_slice(&mut self, bytes: &[u8]) -> Vec<SensorId> {
        bytes.iter().filter_map(|&byte| self.push(byte)).collect()
    }
}

/// Decode a byte-stuffed S.Port data frame
///
/// # Arguments
///
/// * `frame` - Frame bytes as read from the wire (header through checksum)
///
/// # Returns
///
/// * `Result<DataFrame>` - Decoded data id and value
///
/// # Errors
///
/// Returns error if:
/// - Frame has the wrong length after unstuffing
/// - Header byte is not a data frame
/// - A stuff byte is not followed by an escaped byte
/// - Checksum check fails
pub fn decode_data_frame(frame: &[u8]) -> Result<DataFrame> {
    let mut raw = Vec::with_capacity(SPORT_DATA_FRAME_SIZE);
    let mut bytes = frame.iter();

    while let Some(&byte) = bytes.next() {
        if byte == SPORT_STUFF_BYTE {
            let escaped = bytes.next().ok_or_else(|| {
                SportError::Protocol("Frame ends inside a stuffed byte".to_string())
            })?;
            raw.push(escaped ^ SPORT_STUFF_MASK);
        } else {
            raw.push(byte);
        }
    }

    if raw.len() != SPORT_DATA_FRAME_SIZE {
        return Err(SportError::Protocol(format!(
            "Invalid frame length: expected {} bytes, got {}",
            SPORT_DATA_FRAME_SIZE,
            raw.len()
        )));
    }

    if raw[0] != SPORT_DATA_FRAME {
        return Err(SportError::Protocol(format!(
            "Invalid frame header: 0x{:02X}",
            raw[0]
        )));
    }

    if !sport_crc_valid(&raw) {
        return Err(SportError::Protocol(format!(
            "Checksum mismatch: 0x{:02X}",
            raw[7]
        )));
    }

    Ok(DataFrame {
        data_id: u16::from_le_bytes([raw[1], raw[2]]),
        value: u32::from_le_bytes([raw[3], raw[4], raw[5], raw[6]]),
    })
}
