//! # S.Port Checksum
//!
//! Checksum calculation for S.Port data frames.
//!
//! Bytes are summed as 16-bit values; after each addition the carry is
//! folded back into the low byte. The transmitted checksum is `0xFF - sum`.
//! A frame is valid when the same fold over header..checksum yields `0xFF`.

/// Fold one byte into a running checksum
#[inline]
fn fold(crc: u16, byte: u8) -> u16 {
    let mut crc = crc + byte as u16;
    crc += crc >> 8;
    crc & 0x00FF
}

/// Calculate the S.Port checksum byte
///
/// # Arguments
///
/// * `data` - Unstuffed frame bytes from the header through the value
///
/// # Returns
///
/// * `u8` - Checksum byte to append to the frame
///
/// # Examples
///
/// ```
/// use sport_sensors::sport::crc::sport_crc;
///
/// let data = [0x10, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00];
/// assert_eq!(sport_crc(&data), 0xEA);
/// ```
pub fn sport_crc(data: &[u8]) -> u8 {
    let sum = data.iter().fold(0u16, |crc, &byte| fold(crc, byte));
    0xFF - sum as u8
}

/// Check a complete unstuffed frame including its trailing checksum byte
pub fn sport_crc_valid(frame: &[u8]) -> bool {
    frame.iter().fold(0u16, |crc, &byte| fold(crc, byte)) == 0x00FF
}
