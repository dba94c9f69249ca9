//! Byte transport to a thermal printer

use crate::config::Config;
use async_trait::async_trait;
use receipt_printer::{PrintResult, Printer, SerialPrinter};
use std::time::Duration;
use tracing::debug;

/// Opens a thermal printer by port path and writes whole jobs to it
#[async_trait]
pub trait ThermalTransport: Send + Sync {
    /// Whether the port can be opened right now
    async fn is_connected(&self, path: &str) -> bool;

    /// Write one complete job in a single flush
    async fn execute(&self, path: &str, job: Vec<u8>) -> PrintResult<()>;
}

/// Serial/Bluetooth SPP transport
#[derive(Debug, Clone)]
pub struct SerialTransport {
    baud_rate: u32,
    timeout: Duration,
}

impl SerialTransport {
    pub fn new(baud_rate: u32, timeout: Duration) -> Self {
        Self { baud_rate, timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.serial_baud_rate, config.serial_timeout())
    }

    fn printer(&self, path: &str) -> PrintResult<SerialPrinter> {
        Ok(SerialPrinter::new(path)?
            .with_baud_rate(self.baud_rate)
            .with_timeout(self.timeout))
    }
}

impl Default for SerialTransport {
    fn default() -> Self {
        Self::new(9600, Duration::from_millis(5000))
    }
}

#[async_trait]
impl ThermalTransport for SerialTransport {
    async fn is_connected(&self, path: &str) -> bool {
        match self.printer(path) {
            Ok(printer) => printer.is_online().await,
            Err(e) => {
                debug!(error = %e, "invalid serial path");
                false
            }
        }
    }

    async fn execute(&self, path: &str, job: Vec<u8>) -> PrintResult<()> {
        self.printer(path)?.print(&job).await
    }
}
