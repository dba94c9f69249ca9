//! Host OS print system
//!
//! The host context is handed to the registry and the system backend on every
//! call; nothing holds on to it between calls.

#[cfg(unix)]
mod cups;

#[cfg(unix)]
pub use cups::CupsHost;

use crate::render::ReceiptDocument;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A printer as reported by the host print system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostPrinterRecord {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub is_default: bool,
}

/// Page margins for a submission; `None` means zero margins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Margins {
    None,
    Default,
}

/// Options passed with every system print submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOptions {
    /// No user dialog
    pub silent: bool,
    pub print_background: bool,
    pub margins: Margins,
    /// Percent
    pub scale_factor: u32,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            silent: true,
            print_background: true,
            margins: Margins::None,
            scale_factor: 100,
        }
    }
}

/// Terminal result of one submitted job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed,
    Failed(String),
}

/// Host print context: enumerate printers and print documents
#[async_trait]
pub trait HostPrintContext: Send + Sync {
    /// Printers known to the host, in host order
    async fn printers(&self) -> Result<Vec<HostPrinterRecord>, String>;

    /// Submit one document and resolve once the host reports the job's fate
    async fn submit(
        &self,
        device: &str,
        document: &ReceiptDocument,
        options: &SubmitOptions,
    ) -> SubmitOutcome;
}
