//! # S.Port Sensors Library
//!
//! Emulate FrSky S.Port telemetry sensors on a real bus.
//!
//! This library provides the sensor-side data model for the S.Port protocol:
//! encoding cell voltages, GPS fixes and RPM/temperature readings into 32-bit
//! protocol words, scheduling them round-robin across poll requests, and
//! framing them for the wire.

pub mod config;
pub mod error;
pub mod hub;
pub mod sensor;
pub mod serial;
pub mod sport;
