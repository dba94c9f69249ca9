//! Host OS print system backend

use crate::error::{DeskError, DeskResult};
use crate::host::{HostPrintContext, SubmitOptions, SubmitOutcome};
use crate::model::LogoImage;
use crate::render::{DocumentRenderer, ReceiptView};
use tracing::{info, instrument, warn};

pub const SUCCESS_MESSAGE: &str = "Receipt printed successfully to system printer!";

#[derive(Default)]
pub struct SystemBackend {
    renderer: DocumentRenderer,
}

impl SystemBackend {
    pub fn new(renderer: DocumentRenderer) -> Self {
        Self { renderer }
    }

    /// Render the receipt document and wait for the host's verdict on the job
    #[instrument(skip(self, host, view, logo))]
    pub async fn print(
        &self,
        host: Option<&dyn HostPrintContext>,
        device: &str,
        view: &ReceiptView,
        logo: Option<&LogoImage>,
    ) -> DeskResult<()> {
        let Some(host) = host else {
            warn!("no host print context");
            return Err(failed("host print context not available"));
        };

        let document = self.renderer.render(view, logo);
        match host.submit(device, &document, &SubmitOptions::default()).await {
            SubmitOutcome::Completed => {
                info!("system print job completed");
                Ok(())
            }
            SubmitOutcome::Failed(reason) => Err(failed(&reason)),
        }
    }
}

fn failed(reason: &str) -> DeskError {
    DeskError::SubmitFailure(format!("System printing failed: {}", reason))
}
