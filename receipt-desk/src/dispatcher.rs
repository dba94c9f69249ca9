//! Print dispatcher
//!
//! Resolves a target id to its printer kind and runs the matching backend.
//! Every call ends in a [`PrintOutcome`]; errors and panics do not escape.

use crate::backend::{self, MockPrinter, SerialBackend, SerialTransport, SystemBackend, ThermalTransport};
use crate::config::Config;
use crate::error::{DeskError, DeskResult};
use crate::host::HostPrintContext;
use crate::model::{PrintOutcome, PrinterKind, ReceiptPayload};
use crate::registry::{MOCK_PRINTER_ID, SERIAL_ID_PREFIX};
use crate::render::{DocumentRenderer, ReceiptView};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// A target id decoded into its backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceTarget<'a> {
    /// Host printer name
    System(&'a str),
    /// Serial port path
    SerialThermal(&'a str),
    Mock,
}

impl<'a> DeviceTarget<'a> {
    /// Decode an id by its shape alone
    ///
    /// Ids the registry did not produce fall back to the host print system.
    /// A host printer that happens to be named like the mock or a serial id
    /// parses as those; [`PrintDispatcher`] checks the host's printer names
    /// first when a host is given.
    pub fn parse(id: &'a str) -> Self {
        if id == MOCK_PRINTER_ID {
            return DeviceTarget::Mock;
        }
        match id.strip_prefix(SERIAL_ID_PREFIX) {
            Some(path) if !path.is_empty() => DeviceTarget::SerialThermal(path),
            _ => DeviceTarget::System(id),
        }
    }

    pub fn kind(&self) -> PrinterKind {
        match self {
            DeviceTarget::System(_) => PrinterKind::System,
            DeviceTarget::SerialThermal(_) => PrinterKind::SerialThermal,
            DeviceTarget::Mock => PrinterKind::Mock,
        }
    }
}

pub struct PrintDispatcher {
    timezone: Tz,
    serial: SerialBackend,
    system: SystemBackend,
    mock: MockPrinter,
}

impl PrintDispatcher {
    /// Dispatcher over the real serial transport
    pub fn new(config: &Config) -> Self {
        Self::with_transport(config, Arc::new(SerialTransport::from_config(config)))
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn ThermalTransport>) -> Self {
        Self {
            timezone: config.timezone,
            serial: SerialBackend::new(transport, config),
            system: SystemBackend::new(DocumentRenderer::new(57, config.paper_width)),
            mock: MockPrinter::new(config.paper_width),
        }
    }

    /// The demo printer and its job journal
    pub fn mock(&self) -> &MockPrinter {
        &self.mock
    }

    /// Print one receipt, stamped with the current time
    pub async fn print(
        &self,
        host: Option<&dyn HostPrintContext>,
        target_id: &str,
        payload: &ReceiptPayload,
    ) -> PrintOutcome {
        let printed_at = Utc::now().with_timezone(&self.timezone);
        self.print_at(host, target_id, payload, printed_at).await
    }

    /// Print one receipt with an explicit print time
    #[instrument(skip(self, host, payload, printed_at), fields(items = payload.items.len()))]
    pub async fn print_at(
        &self,
        host: Option<&dyn HostPrintContext>,
        target_id: &str,
        payload: &ReceiptPayload,
        printed_at: DateTime<Tz>,
    ) -> PrintOutcome {
        let job = AssertUnwindSafe(self.run(host, target_id, payload, printed_at));
        let result = match job.catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(DeskError::UnexpectedInternal(panic_message(panic.as_ref()))),
        };

        match result {
            Ok(message) => {
                info!("{}", message);
                PrintOutcome::success(message)
            }
            Err(e) => {
                error!(error = %e, "print job failed");
                e.into()
            }
        }
    }

    /// Exact host printer names win over the mock and serial id shapes
    async fn resolve<'a>(
        &self,
        host: Option<&dyn HostPrintContext>,
        target_id: &'a str,
    ) -> DeviceTarget<'a> {
        let target = DeviceTarget::parse(target_id);
        let Some(host) = host else {
            return target;
        };
        if matches!(target, DeviceTarget::System(_)) {
            return target;
        }
        match host.printers().await {
            Ok(printers) if printers.iter().any(|p| p.name == target_id) => {
                info!("host printer shadows {:?} id", target.kind());
                DeviceTarget::System(target_id)
            }
            _ => target,
        }
    }

    async fn run(
        &self,
        host: Option<&dyn HostPrintContext>,
        target_id: &str,
        payload: &ReceiptPayload,
        printed_at: DateTime<Tz>,
    ) -> DeskResult<&'static str> {
        let target = self.resolve(host, target_id).await;
        info!(kind = ?target.kind(), "dispatching print job");

        let view = ReceiptView::new(payload, printed_at);
        let logo = payload.image.as_ref();

        match target {
            DeviceTarget::Mock => {
                self.mock.print(MOCK_PRINTER_ID, &view);
                Ok(backend::mock::SUCCESS_MESSAGE)
            }
            DeviceTarget::SerialThermal(path) => {
                self.serial.print(path, &view, logo).await?;
                Ok(backend::serial::SUCCESS_MESSAGE)
            }
            DeviceTarget::System(name) => {
                self.system.print(host, name, &view, logo).await?;
                Ok(backend::system::SUCCESS_MESSAGE)
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic during print job".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets() {
        assert_eq!(DeviceTarget::parse("mock_epson_thermal"), DeviceTarget::Mock);
        assert_eq!(
            DeviceTarget::parse("serial_thermal_/dev/rfcomm0"),
            DeviceTarget::SerialThermal("/dev/rfcomm0")
        );
        assert_eq!(
            DeviceTarget::parse("serial_thermal_COM3"),
            DeviceTarget::SerialThermal("COM3")
        );
        assert_eq!(DeviceTarget::parse("Office_Laser"), DeviceTarget::System("Office_Laser"));
        assert_eq!(DeviceTarget::parse("serial_thermal_"), DeviceTarget::System("serial_thermal_"));
        assert_eq!(DeviceTarget::parse(""), DeviceTarget::System(""));
    }

    #[test]
    fn test_kind() {
        assert_eq!(DeviceTarget::Mock.kind(), PrinterKind::Mock);
        assert_eq!(DeviceTarget::SerialThermal("COM3").kind(), PrinterKind::SerialThermal);
        assert_eq!(DeviceTarget::System("x").kind(), PrinterKind::System);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "panic during print job");
    }
}
