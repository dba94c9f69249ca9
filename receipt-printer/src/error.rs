//! Error types for the printer library

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Could not open the printer transport
    #[error("Connection failed: {0}")]
    Connection(String),

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Printer is offline or unreachable
    #[error("Printer offline: {0}")]
    Offline(String),

    /// Timeout waiting for printer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Serial port enumeration or driver error
    #[error("Serial port error: {0}")]
    Serial(String),

    /// Image could not be decoded or rasterised
    #[error("Image error: {0}")]
    Image(String),
}

impl From<serialport::Error> for PrintError {
    fn from(e: serialport::Error) -> Self {
        match e.kind() {
            serialport::ErrorKind::NoDevice => PrintError::Offline(e.to_string()),
            serialport::ErrorKind::InvalidInput => PrintError::InvalidConfig(e.to_string()),
            serialport::ErrorKind::Io(kind) => {
                PrintError::Io(std::io::Error::new(kind, e.description))
            }
            serialport::ErrorKind::Unknown => PrintError::Serial(e.to_string()),
        }
    }
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
