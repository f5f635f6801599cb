//! # Serial Communication Module
//!
//! Handles the half-duplex S.Port bus connection.
//!
//! This module handles:
//! - Opening the serial port at 57,600 baud
//! - Reading poll requests from the bus master
//! - Answering polls with the frames produced by the sensor hub
//!
//! Signal inversion is left to the adapter hardware.

pub mod port_trait;

use crate::error::{Result, SportError};
use crate::hub::SensorHub;
use crate::sport::decoder::PollDecoder;
use crate::sport::encoder::FrameWriter;
use crate::sport::protocol::{SensorId, SPORT_BAUD_RATE};
use port_trait::{SerialPortIO, SerialStreamPort};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

/// Default serial device paths to try (in order of preference)
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial adapters with an inverter
    "/dev/ttyAMA0", // Raspberry Pi UART
];

/// Read buffer size; a poll is two bytes, responses from other sensors up to 16
const READ_BUFFER_SIZE: usize = 64;

/// Counters for one [`SportSerial::answer`] call
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollStats {
    /// Poll requests decoded from the bus
    pub polls: usize,

    /// Data frames written in response
    pub frames: usize,
}

/// S.Port serial port handler
pub struct SportSerial<P: SerialPortIO = SerialStreamPort> {
    /// Serial port handle
    port: P,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
    /// Frames produced by the sensors for the current poll
    writer: FrameWriter,
}

impl<P: SerialPortIO> std::fmt::Debug for SportSerial<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SportSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl SportSerial<SerialStreamPort> {
    /// Open the S.Port bus
    ///
    /// Auto-detects the device by trying common paths.
    ///
    /// # Errors
    ///
    /// Returns error if no serial device could be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sport_sensors::serial::SportSerial;
    ///
    /// fn main() -> anyhow::Result<()> {
    ///     let serial = SportSerial::open()?;
    ///     Ok(())
    /// }
    /// ```
    pub fn open() -> Result<Self> {
        Self::open_with_paths(DEFAULT_DEVICE_PATHS, SPORT_BAUD_RATE)
    }

    /// Open the S.Port bus with custom device paths
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try (e.g., &["/dev/ttyUSB0"])
    /// * `baud_rate` - Line speed, normally 57,600
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Successfully opened S.Port bus at {}", path);
                    return Ok(Self::with_port(SerialStreamPort::from(port), path));
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(SportError::SerialPortNotFound(paths.join(", ")))
    }

    /// Open a specific serial port with S.Port settings (8N1, no flow control)
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| SportError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }
}

impl<P: SerialPortIO> SportSerial<P> {
    /// Wrap an already opened port
    pub fn with_port(port: P, device_path: &str) -> Self {
        Self {
            port,
            device_path: device_path.to_string(),
            writer: FrameWriter::new(),
        }
    }

    /// Read from the bus and decode any poll requests
    ///
    /// Cancel safe: nothing is consumed until the read completes, so this can
    /// sit in a `tokio::select!` branch.
    ///
    /// # Errors
    ///
    /// Returns error if the read fails or the port reports end of stream
    pub async fn read_polls(&mut self, decoder: &mut PollDecoder) -> Result<Vec<SensorId>> {
        let mut buf = [0u8; READ_BUFFER_SIZE];
        let len = self.port.read(&mut buf).await
            .map_err(|e| SportError::Serial(format!("Failed to read from bus: {}", e)))?;

        if len == 0 {
            return Err(SportError::Serial("Serial port closed".to_string()));
        }

        Ok(decoder.push_slice(&buf[..len]))
    }

    /// Write frame bytes to the bus and flush
    pub async fn send_frames(&mut self, frames: &[u8]) -> Result<()> {
        self.port.write_all(frames).await
            .map_err(|e| SportError::Serial(format!("Failed to write frames: {}", e)))?;

        self.port.flush().await
            .map_err(|e| SportError::Serial(format!("Failed to flush serial port: {}", e)))?;

        debug!("Sent S.Port frames ({} bytes)", frames.len());
        Ok(())
    }

    /// Answer the latest poll of one read
    ///
    /// Only the last poll in `polls` is still inside its response window;
    /// the earlier ones are skipped. Not cancel safe: the polled sensor
    /// advances its rotation before the frame is written, so await this to
    /// completion outside `tokio::select!`.
    pub async fn answer(&mut self, polls: &[SensorId], hub: &mut SensorHub) -> Result<PollStats> {
        let mut stats = PollStats { polls: polls.len(), frames: 0 };

        let Some((&current, expired)) = polls.split_last() else {
            return Ok(stats);
        };

        if !expired.is_empty() {
            debug!("Skipping {} expired polls: {:?}", expired.len(), expired);
        }

        hub.poll(current, &mut self.writer);
        if self.writer.is_empty() {
            return Ok(stats);
        }

        stats.frames = self.writer.frame_count();
        let frames = self.writer.take();
        self.send_frames(&frames).await?;

        Ok(stats)
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}
