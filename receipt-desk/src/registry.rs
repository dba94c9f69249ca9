//! Device registry
//!
//! Merges the host print system, the serial bus and the demo printer into one
//! list. A failing source contributes nothing; it never fails the listing.

use crate::error::DeskError;
use crate::host::{HostPrintContext, HostPrinterRecord};
use crate::model::{PrinterDescriptor, PrinterKind, SerialTransportInfo};
use async_trait::async_trait;
use receipt_printer::{PortRecord, PrintResult};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const SERIAL_ID_PREFIX: &str = "serial_thermal_";
pub const MOCK_PRINTER_ID: &str = "mock_epson_thermal";

/// Friendly-name fragments that mark a port as a probable receipt printer
const THERMAL_KEYWORDS: [&str; 4] = ["bluetooth", "thermal", "pos", "epson"];

/// Serial bus enumeration
#[async_trait]
pub trait PortEnumerator: Send + Sync {
    async fn ports(&self) -> PrintResult<Vec<PortRecord>>;
}

/// The OS serial ports
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPorts;

#[async_trait]
impl PortEnumerator for SystemPorts {
    async fn ports(&self) -> PrintResult<Vec<PortRecord>> {
        tokio::task::spawn_blocking(receipt_printer::list_ports)
            .await
            .map_err(|e| receipt_printer::PrintError::Serial(format!("Task join failed: {}", e)))?
    }
}

/// How one source fared during a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Number of descriptors contributed
    Ok(usize),
    /// Skipped, with the reason
    Degraded(String),
}

impl SourceOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, SourceOutcome::Degraded(_))
    }
}

/// One enumeration pass
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    pub devices: Vec<PrinterDescriptor>,
    pub system: SourceOutcome,
    pub serial: SourceOutcome,
}

#[derive(Clone)]
pub struct DeviceRegistry {
    ports: Arc<dyn PortEnumerator>,
}

impl DeviceRegistry {
    pub fn new(ports: Arc<dyn PortEnumerator>) -> Self {
        Self { ports }
    }

    /// Current printable targets: system, then serial, then the demo printer
    pub async fn list_devices(&self, host: Option<&dyn HostPrintContext>) -> Vec<PrinterDescriptor> {
        self.snapshot(host).await.devices
    }

    /// Like [`list_devices`](Self::list_devices), also reporting per-source outcomes
    #[instrument(skip_all)]
    pub async fn snapshot(&self, host: Option<&dyn HostPrintContext>) -> RegistrySnapshot {
        let mut devices = Vec::new();

        let system = match host {
            None => degraded(DeskError::SourceUnavailable(
                "host print context not available".to_string(),
            )),
            Some(host) => match host.printers().await {
                Ok(records) => {
                    let found = system_descriptors(records);
                    let n = found.len();
                    devices.extend(found);
                    SourceOutcome::Ok(n)
                }
                Err(e) => degraded(DeskError::SourceUnavailable(format!("system printers: {}", e))),
            },
        };

        let serial = match self.ports.ports().await {
            Ok(ports) => {
                let found: Vec<_> = ports
                    .into_iter()
                    .filter(is_thermal_candidate)
                    .map(serial_descriptor)
                    .collect();
                let n = found.len();
                devices.extend(found);
                SourceOutcome::Ok(n)
            }
            Err(e) => degraded(DeskError::SourceUnavailable(format!("serial ports: {}", e))),
        };

        devices.push(mock_descriptor());

        info!(
            total = devices.len(),
            system = ?system,
            serial = ?serial,
            "printer list built"
        );

        RegistrySnapshot {
            devices,
            system,
            serial,
        }
    }

    /// Resolve an id against a fresh snapshot
    pub async fn find(
        &self,
        host: Option<&dyn HostPrintContext>,
        id: &str,
    ) -> Option<PrinterDescriptor> {
        self.list_devices(host)
            .await
            .into_iter()
            .find(|d| d.id == id)
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new(Arc::new(SystemPorts))
    }
}

fn degraded(err: DeskError) -> SourceOutcome {
    warn!(error = %err, "enumeration source skipped");
    SourceOutcome::Degraded(err.to_string())
}

/// A keyword in the friendly name, or any manufacturer string
pub fn is_thermal_candidate(port: &PortRecord) -> bool {
    let name_matches = port.friendly_name.as_deref().is_some_and(|name| {
        let name = name.to_lowercase();
        THERMAL_KEYWORDS.iter().any(|k| name.contains(k))
    });
    let has_manufacturer = port
        .manufacturer
        .as_deref()
        .is_some_and(|m| !m.is_empty());

    name_matches || has_manufacturer
}

fn system_descriptors(records: Vec<HostPrinterRecord>) -> Vec<PrinterDescriptor> {
    let mut default_taken = false;
    records
        .into_iter()
        .map(|r| {
            let is_default = r.is_default && !default_taken;
            default_taken |= is_default;
            PrinterDescriptor {
                display_name: r
                    .display_name
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| r.name.clone()),
                description: r.description.unwrap_or_default(),
                id: r.name,
                kind: PrinterKind::System,
                status: r.status,
                is_default,
                transport: None,
            }
        })
        .collect()
}

fn serial_descriptor(port: PortRecord) -> PrinterDescriptor {
    let fallback_name = format!("Thermal Printer ({})", port.path);
    PrinterDescriptor {
        id: format!("{}{}", SERIAL_ID_PREFIX, port.path),
        display_name: port
            .friendly_name
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback_name),
        description: format!("Serial thermal printer on {}", port.path),
        kind: PrinterKind::SerialThermal,
        status: "available".to_string(),
        is_default: false,
        transport: Some(SerialTransportInfo {
            path: port.path,
            vendor_id: port.vendor_id,
            product_id: port.product_id,
            manufacturer: port.manufacturer,
        }),
    }
}

fn mock_descriptor() -> PrinterDescriptor {
    PrinterDescriptor {
        id: MOCK_PRINTER_ID.to_string(),
        display_name: "EPSON TM-T20 Thermal Printer (Demo)".to_string(),
        description: "Mock EPSON thermal printer for demonstration".to_string(),
        kind: PrinterKind::Mock,
        status: "available".to_string(),
        is_default: false,
        transport: None,
    }
}
