//! Serial port transport implementation

use crate::error::{TransportError, TransportResult};
use crate::transport::Transport;
use async_trait::async_trait;
use std::fmt;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

/// Serial port transport settings
///
/// The UT181A's USB bridge enumerates as a CDC serial port running
/// 9600 baud, 8 data bits, no parity, one stop bit.
#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: tokio_serial::DataBits,
    pub stop_bits: tokio_serial::StopBits,
    pub parity: tokio_serial::Parity,
    pub flow_control: tokio_serial::FlowControl,
}

impl SerialSettings {
    /// Settings for the instrument's fixed line parameters
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate: 9600,
            data_bits: tokio_serial::DataBits::Eight,
            stop_bits: tokio_serial::StopBits::One,
            parity: tokio_serial::Parity::None,
            flow_control: tokio_serial::FlowControl::None,
        }
    }
}

/// Serial port transport implementation
pub struct SerialTransport {
    stream: Option<SerialStream>,
    settings: SerialSettings,
    closed: bool,
}

impl fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialTransport")
            .field("settings", &self.settings)
            .field("closed", &self.closed)
            .finish()
    }
}

impl SerialTransport {
    /// Open the serial port described by `settings`
    pub fn open(settings: SerialSettings) -> Result<Self, tokio_serial::Error> {
        let builder = tokio_serial::new(&settings.port_name, settings.baud_rate)
            .data_bits(settings.data_bits)
            .stop_bits(settings.stop_bits)
            .parity(settings.parity)
            .flow_control(settings.flow_control);

        let stream = builder.open_native_async()?;
        Ok(Self {
            stream: Some(stream),
            settings,
            closed: false,
        })
    }

    /// Settings the port was opened with
    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    fn stream_mut(&mut self) -> TransportResult<&mut SerialStream> {
        self.stream.as_mut().ok_or_else(|| {
            TransportError::LinkLost(io::Error::new(
                io::ErrorKind::NotConnected,
                "serial port not open",
            ))
        })
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn send(&mut self, bytes: &[u8]) -> TransportResult<()> {
        let stream = self.stream_mut()?;
        let written = match stream.write_all(bytes).await {
            Ok(()) => stream.flush().await,
            Err(e) => Err(e),
        };
        match written {
            Ok(()) => Ok(()),
            Err(e) => {
                self.closed = true;
                Err(TransportError::LinkLost(e))
            }
        }
    }

    async fn receive(&mut self, max_len: usize, timeout: Duration) -> TransportResult<Vec<u8>> {
        let stream = self.stream_mut()?;
        let mut buf = vec![0u8; max_len];

        let read = tokio::time::timeout(timeout, stream.read(&mut buf))
            .await
            .map_err(|_| TransportError::Timeout)?;

        match read {
            Ok(0) => {
                self.closed = true;
                Err(TransportError::LinkLost(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "serial stream closed by peer",
                )))
            }
            Ok(n) => {
                buf.truncate(n);
                Ok(buf)
            }
            Err(e) => {
                self.closed = true;
                Err(TransportError::LinkLost(e))
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.flush().await;
        }
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_settings() {
        let settings = SerialSettings::new("/dev/ttyUSB0");
        assert_eq!(settings.port_name, "/dev/ttyUSB0");
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.parity, tokio_serial::Parity::None);
    }
}
