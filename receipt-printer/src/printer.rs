//! Printer adapters for sending ESC/POS data
//!
//! Supports serial-style thermal printers: USB-serial adapters, RS-232 and
//! Bluetooth SPP ports (`/dev/rfcomm*`, `COMx`) all appear as serial ports.

use crate::error::{PrintError, PrintResult};
use std::io::Write;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw ESC/POS data to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// Serial thermal printer
///
/// The port is opened per job and closed when the job is written; no handle
/// outlives a call.
#[derive(Debug, Clone)]
pub struct SerialPrinter {
    path: String,
    baud_rate: u32,
    timeout: Duration,
}

impl SerialPrinter {
    /// Create a new serial printer (9600 baud, 5 s timeout)
    pub fn new(path: &str) -> PrintResult<Self> {
        if path.trim().is_empty() {
            return Err(PrintError::InvalidConfig("Empty serial port path".to_string()));
        }

        Ok(Self {
            path: path.to_string(),
            baud_rate: 9600,
            timeout: Duration::from_secs(5),
        })
    }

    /// Set the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set open/write timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the port path
    pub fn path(&self) -> &str {
        &self.path
    }

    fn open(&self) -> PrintResult<Box<dyn serialport::SerialPort>> {
        serialport::new(&self.path, self.baud_rate)
            .timeout(self.timeout)
            .open()
            .map_err(|e| match PrintError::from(e) {
                PrintError::Offline(msg) => PrintError::Offline(format!("{}: {}", self.path, msg)),
                other => PrintError::Connection(format!("{}: {}", self.path, other)),
            })
    }

    /// Send raw ESC/POS data synchronously (for use from blocking contexts)
    pub fn print_sync(&self, data: &[u8]) -> PrintResult<()> {
        let mut port = self.open()?;

        info!("Connected, sending {} bytes", data.len());

        port.write_all(data).map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Write failed: {}", e),
            ))
        })?;

        port.flush()?;

        info!("Print job sent successfully");
        Ok(())
    }

    /// Check whether the port can be opened right now
    pub fn check_online(&self) -> bool {
        match self.open() {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Printer offline");
                false
            }
        }
    }
}

impl Printer for SerialPrinter {
    #[instrument(skip(data), fields(path = %self.path, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        // serialport is blocking, run in blocking task
        let printer = self.clone();
        let data = data.to_vec();

        tokio::task::spawn_blocking(move || printer.print_sync(&data))
            .await
            .map_err(|e| PrintError::Serial(format!("Task join failed: {}", e)))?
    }

    #[instrument(fields(path = %self.path))]
    async fn is_online(&self) -> bool {
        let printer = self.clone();
        tokio::task::spawn_blocking(move || printer.check_online())
            .await
            .unwrap_or(false)
    }
}
