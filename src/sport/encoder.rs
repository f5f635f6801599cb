//! # S.Port Frame Encoder
//!
//! Encodes sensor data words into S.Port data frames.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use super::crc::sport_crc;
use super::protocol::*;
use crate::sensor::SportTransport;

/// Encode a data word into a complete, byte-stuffed S.Port data frame
///
/// # Arguments
///
/// * `data_id` - Data type id (e.g. 0x0300 for FLVSS cells)
/// * `value` - 32-bit protocol word
///
/// # Returns
///
/// * `Bytes` - Frame ready for the wire (8 bytes, more when stuffing applies)
///
/// # Frame Layout
///
/// ```text
/// 0x10 | id lo | id hi | v0 | v1 | v2 | v3 | crc
/// ```
///
/// `0x7E` and `0x7D` anywhere after the header are sent as `0x7D, byte ^ 0x20`.
///
/// # Examples
///
/// ```
/// use sport_sensors::sport::encoder::encode_data_frame;
///
/// let frame = encode_data_frame(0x0500, 0);
/// assert_eq!(&frame[..], &[0x10, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0xEA]);
/// ```
pub fn encode_data_frame(data_id: u16, value: u32) -> Bytes {
    let mut raw = BytesMut::with_capacity(SPORT_DATA_FRAME_SIZE);
    raw.put_u8(SPORT_DATA_FRAME);
    raw.put_u16_le(data_id);
    raw.put_u32_le(value);
    let crc = sport_crc(&raw);
    raw.put_u8(crc);

    let mut frame = BytesMut::with_capacity(SPORT_DATA_FRAME_SIZE * 2);
    frame.put_u8(SPORT_DATA_FRAME);
    for &byte in &raw[1..] {
        stuff_byte(&mut frame, byte);
    }

    frame.freeze()
}

/// Append a byte, escaping the start and stuff markers
fn stuff_byte(out: &mut BytesMut, byte: u8) {
    if byte == SPORT_START_BYTE || byte == SPORT_STUFF_BYTE {
        out.put_u8(SPORT_STUFF_BYTE);
        out.put_u8(byte ^ SPORT_STUFF_MASK);
    } else {
        out.put_u8(byte);
    }
}

/// Transport that encodes every emitted word into S.Port frame bytes
///
/// Sensors write into the buffer during a poll; the serial layer drains it
/// with [`FrameWriter::take`] and puts the bytes on the wire.
#[derive(Debug, Default)]
pub struct FrameWriter {
    pending: BytesMut,
    frames: usize,
}

impl FrameWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no frame is waiting to be sent
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of frames encoded since the last [`FrameWriter::take`]
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    /// Drain all pending frame bytes
    pub fn take(&mut self) -> Bytes {
        self.frames = 0;
        self.pending.split().freeze()
    }
}

impl SportTransport for FrameWriter {
    fn send_data(&mut self, data_type_id: u16, value: u32) {
        trace!("Encoding frame id=0x{:04X} value=0x{:08X}", data_type_id, value);
        self.pending.extend_from_slice(&encode_data_frame(data_type_id, value));
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sport::crc::sport_crc_valid;

    #[test]
    fn test_encode_frame_length() {
        let frame = encode_data_frame(RPM_ROT_DATA_ID, 1234);
        assert_eq!(frame.len(), SPORT_DATA_FRAME_SIZE);
    }

    #[test]
    fn test_encode_frame_little_endian() {
        let frame = encode_data_frame(FLVSS_CELL_DATA_ID, 0x1122_3344);

        assert_eq!(frame[0], SPORT_DATA_FRAME);
        assert_eq!(frame[1], 0x00); // id lo
        assert_eq!(frame[2], 0x03); // id hi
        assert_eq!(&frame[3..7], &[0x44, 0x33, 0x22, 0x11]);
        assert!(sport_crc_valid(&frame));
    }

    #[test]
    fn test_encode_frame_stuffs_start_byte() {
        let frame = encode_data_frame(RPM_ROT_DATA_ID, 0x0000_007E);

        assert_eq!(&frame[3..5], &[0x7D, 0x5E]);
        assert_eq!(frame.len(), SPORT_DATA_FRAME_SIZE + 1);
    }

    #[test]
    fn test_encode_frame_stuffs_escape_byte() {
        let frame = encode_data_frame(RPM_ROT_DATA_ID, 0x7D00_0000);

        assert_eq!(&frame[6..8], &[0x7D, 0x5D]);
        assert_eq!(frame.len(), SPORT_DATA_FRAME_SIZE + 1);
    }

    #[test]
    fn test_encode_frame_never_contains_start_byte() {
        let frame = encode_data_frame(0x7E7E, 0x7E7D_7E7D);

        assert!(!frame.iter().any(|&b| b == SPORT_START_BYTE));
        assert_eq!(frame.len(), SPORT_DATA_FRAME_SIZE + 6);
    }

    #[test]
    fn test_frame_writer_collects_frames() {
        let mut writer = FrameWriter::new();
        assert!(writer.is_empty());

        writer.send_data(RPM_T1_DATA_ID, 25);
        writer.send_data(RPM_T2_DATA_ID, 30);
        assert_eq!(writer.frame_count(), 2);

        let bytes = writer.take();
        assert_eq!(bytes.len(), 2 * SPORT_DATA_FRAME_SIZE);
        assert_eq!(&bytes[..8], &encode_data_frame(RPM_T1_DATA_ID, 25)[..]);
        assert_eq!(&bytes[8..], &encode_data_frame(RPM_T2_DATA_ID, 30)[..]);

        assert!(writer.is_empty());
        assert_eq!(writer.frame_count(), 0);
    }

    #[test]
    fn test_encode_frame_checksum_byte() {
        let frame = encode_data_frame(RPM_ROT_DATA_ID, 0);
        assert_eq!(frame[7], sport_crc(&frame[..7]));
    }
}
