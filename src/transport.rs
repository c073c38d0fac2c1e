use std::io::Write;
use std::thread;
use std::time::Duration;

use serialport::SerialPort;
use thiserror::Error;

use crate::config::TransportConfig;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Serial write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport already closed")]
    Closed,
}

/// Byte sink that clocks a whole frame out to the LEDs
pub trait Transport {
    /// Send `frame` and block until it has been written
    fn transfer(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// Release the underlying device
    fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn transfer(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        (**self).transfer(frame)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        (**self).close()
    }
}

/// Serial port transport (USB bridge to the LED data/clock lines)
pub struct SerialTransport {
    name: String,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    pub fn open(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut port = serialport::new(&config.port, config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(config.timeout_ms))
            .open()
            .map_err(|source| TransportError::Open {
                port: config.port.clone(),
                source,
            })?;

        if let Err(e) = port.write_data_terminal_ready(true) {
            log::warn!("Failed to set DTR on {}: {}", config.port, e);
        }

        // Allow the bridge to initialize
        thread::sleep(Duration::from_millis(100));

        log::debug!("Opened {} @ {} baud", config.port, config.baud_rate);

        Ok(SerialTransport {
            name: config.port.clone(),
            port: Some(port),
        })
    }
}

impl Transport for SerialTransport {
    fn transfer(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::Closed)?;
        port.write_all(frame)?;
        port.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if self.port.take().is_some() {
            log::debug!("Closed {}", self.name);
        }
        Ok(())
    }
}
