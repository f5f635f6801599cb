//! # S.Port Protocol Module
//!
//! Implementation of the FrSky S.Port (Smart Port) wire protocol, sensor side.
//!
//! This module handles:
//! - Data frame encoding (header, little-endian id and value, checksum)
//! - Byte stuffing of the 0x7E / 0x7D markers
//! - Poll request decoding from the bus byte stream
//! - Sensor id addressing (ID1-ID28 and their physical id bytes)

pub mod protocol;
pub mod encoder;
pub mod decoder;
pub mod crc;
