//! Byte-level access to the S.Port wire, abstracted so the bus logic can run
//! against a scripted bus in tests

use async_trait::async_trait;
use std::io;

/// Half-duplex serial line carrying S.Port traffic
#[async_trait]
pub trait SerialPortIO: Send {
    /// Read whatever bytes have arrived, returning how many were read
    ///
    /// Returning 0 means the line is gone.
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Put a complete response on the wire
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Wait until the response has left the output buffer
    async fn flush(&mut self) -> io::Result<()>;
}

/// A `tokio_serial` stream opened at S.Port line settings
pub struct SerialStreamPort {
    stream: tokio_serial::SerialStream,
}

impl From<tokio_serial::SerialStream> for SerialStreamPort {
    fn from(stream: tokio_serial::SerialStream) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl SerialPortIO for SerialStreamPort {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        use tokio::io::AsyncReadExt;
        self.stream.read(buf).await
    }

    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.stream.write_all(data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.stream.flush().await
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct BusState {
        /// Chunks the master side has put on the line, one per `read`
        incoming: VecDeque<Vec<u8>>,
        /// Responses written by the sensor side
        sent: Vec<Vec<u8>>,
        /// Single-wire adapters read back everything they transmit
        echo: bool,
        /// Number of upcoming writes that yield once before completing
        stalled_writes: usize,
        write_error: Option<io::ErrorKind>,
        flush_error: Option<io::ErrorKind>,
    }

    /// Scripted S.Port bus
    ///
    /// Clones share the same bus, so a test keeps one handle to script the
    /// master while `SportSerial` owns the other. An empty `incoming` queue
    /// reads as a closed line.
    #[derive(Clone, Default)]
    pub struct MockBus {
        state: Arc<Mutex<BusState>>,
    }

    impl MockBus {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue bytes from the master; each call is delivered by one `read`
        pub fn master_sends(&self, chunk: &[u8]) {
            self.state.lock().unwrap().incoming.push_back(chunk.to_vec());
        }

        /// Responses written so far, one entry per `write_all`
        pub fn sent(&self) -> Vec<Vec<u8>> {
            self.state.lock().unwrap().sent.clone()
        }

        pub fn enable_echo(&self) {
            self.state.lock().unwrap().echo = true;
        }

        /// Make the next write return `Pending` once before it completes
        pub fn stall_next_write(&self) {
            self.state.lock().unwrap().stalled_writes += 1;
        }

        pub fn fail_writes(&self, error: io::ErrorKind) {
            self.state.lock().unwrap().write_error = Some(error);
        }

        pub fn fail_flushes(&self, error: io::ErrorKind) {
            self.state.lock().unwrap().flush_error = Some(error);
        }
    }

    #[async_trait]
    impl SerialPortIO for MockBus {
        async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let chunk = self.state.lock().unwrap().incoming.pop_front();
            match chunk {
                Some(chunk) => {
                    let len = chunk.len().min(buf.len());
                    buf[..len].copy_from_slice(&chunk[..len]);
                    Ok(len)
                }
                None => Ok(0),
            }
        }

        async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            let stall = {
                let mut state = self.state.lock().unwrap();
                if let Some(error) = state.write_error {
                    return Err(io::Error::new(error, "bus write failed"));
                }
                let stall = state.stalled_writes > 0;
                if stall {
                    state.stalled_writes -= 1;
                }
                stall
            };

            if stall {
                tokio::task::yield_now().await;
            }

            let mut state = self.state.lock().unwrap();
            state.sent.push(data.to_vec());
            if state.echo {
                state.incoming.push_back(data.to_vec());
            }
            Ok(())
        }

        async fn flush(&mut self) -> io::Result<()> {
            match self.state.lock().unwrap().flush_error {
                Some(error) => Err(io::Error::new(error, "bus flush failed")),
                None => Ok(()),
            }
        }
    }
}
