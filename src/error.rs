//! # Error Types
//!
//! Custom error types for the S.Port sensor emulator using `thiserror`.
//!
//! The sensor encoders themselves never fail; these errors come from the
//! wire decoder, configuration loading and the serial port.

use thiserror::Error;

/// Main error type for the S.Port sensor emulator
#[derive(Debug, Error)]
pub enum SportError {
    /// S.Port wire protocol errors
    #[error("S.Port protocol error: {0}")]
    Protocol(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port errors
    #[error("Serial port error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No serial device found (tried: {0})")]
    SerialPortNotFound(String),
}

/// Result type alias for the S.Port sensor emulator
pub type Result<T> = std::result::Result<T, SportError>;
