//! Error types for discovery and dispatch

use crate::model::PrintOutcome;
use receipt_printer::PrintError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeskError {
    /// One enumeration source failed; the listing continues without it
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Transport could not be reached; terminal for the job
    #[error("{0}")]
    DeviceUnreachable(String),

    /// Logo decode/stage failure; the job continues without the logo
    #[error("Render failed: {0}")]
    RenderFailure(String),

    /// Backend reported failure during execute/submit
    #[error("{0}")]
    SubmitFailure(String),

    /// Anything that escaped the backends (panics, task join errors)
    #[error("Unexpected error: {0}")]
    UnexpectedInternal(String),

    /// Invalid configuration value
    #[error("Invalid config: {0}")]
    Config(String),
}

pub type DeskResult<T> = Result<T, DeskError>;

impl From<PrintError> for DeskError {
    fn from(err: PrintError) -> Self {
        match err {
            PrintError::Connection(msg) | PrintError::Offline(msg) | PrintError::Timeout(msg) => {
                DeskError::DeviceUnreachable(format!("Connection failed: {}", msg))
            }
            PrintError::Image(msg) => DeskError::RenderFailure(msg),
            PrintError::InvalidConfig(msg) => DeskError::Config(msg),
            other => DeskError::SubmitFailure(format!("Printing failed: {}", other)),
        }
    }
}

impl From<DeskError> for PrintOutcome {
    fn from(err: DeskError) -> Self {
        PrintOutcome::failure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_are_unreachable() {
        let err: DeskError = PrintError::Offline("/dev/rfcomm0".to_string()).into();
        assert!(matches!(err, DeskError::DeviceUnreachable(_)));
        assert_eq!(err.to_string(), "Connection failed: /dev/rfcomm0");
    }

    #[test]
    fn test_io_error_is_submit_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: DeskError = PrintError::Io(io).into();
        assert!(matches!(err, DeskError::SubmitFailure(_)));
        assert!(err.to_string().starts_with("Printing failed: "));
    }

    #[test]
    fn test_outcome_from_error() {
        let outcome: PrintOutcome = DeskError::UnexpectedInternal("boom".to_string()).into();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Unexpected error: boom");
    }
}
