// Serial transport for the Open Interface
//
// One driver instance owns one link for its whole lifetime. The protocol
// never reads a variable-length response: every read names the exact byte
// count up front, so the transport surface is just "write all of this"
// and "give me exactly n bytes before the timeout".

use serialport::SerialPort;
use std::io::{self, Read, Write};
use tracing::debug;

use crate::config::{BAUD_RATE, READ_TIMEOUT};

use super::{OiError, Result};

/// Byte-stream contract the driver speaks over.
///
/// Implemented by [`SerialLink`] for real hardware and by a mock in the
/// driver's tests.
pub trait Transport {
    /// Write all bytes, blocking until the OS has accepted them.
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read exactly `n` bytes, failing with [`OiError::Timeout`] if fewer
    /// arrive before the port's deadline. Never returns a partial buffer.
    fn read_exact(&mut self, n: usize) -> Result<Vec<u8>>;

    /// Release the handle. Idempotent; later sends fail with
    /// [`OiError::Closed`].
    fn close(&mut self);
}

/// Exclusive handle on the robot's serial port.
pub struct SerialLink {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialLink {
    /// Open `port_name` at the Open Interface baud rate.
    pub fn open(port_name: &str) -> Result<Self> {
        let port = serialport::new(port_name, BAUD_RATE)
            .timeout(READ_TIMEOUT)
            .open()?;
        Ok(Self { port: Some(port) })
    }
}

impl Transport for SerialLink {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(OiError::Closed)?;
        debug!("tx {:02X?}", bytes);
        port.write_all(bytes)?;
        port.flush()?;
        Ok(())
    }

    fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let port = self.port.as_mut().ok_or(OiError::Closed)?;
        let mut buf = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            match port.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(OiError::Timeout {
                        expected: n,
                        got: filled,
                    });
                }
                Ok(k) => filled += k,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                    return Err(OiError::Timeout {
                        expected: n,
                        got: filled,
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
        debug!("rx {:02X?}", buf);
        Ok(buf)
    }

    fn close(&mut self) {
        // Dropping the boxed port releases the OS handle
        self.port = None;
    }
}
