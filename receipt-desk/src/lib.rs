//! # receipt-desk
//!
//! Printer discovery and receipt dispatch.
//!
//! - [`DeviceRegistry`] merges host printers, serial thermal printers and a
//!   demo printer into one list of [`PrinterDescriptor`]s.
//! - [`PrintDispatcher`] prints a [`ReceiptPayload`] on one of them and
//!   always answers with a [`PrintOutcome`].
//!
//! ```ignore
//! let config = Config::from_env()?;
//! let host = CupsHost::new();
//! let registry = DeviceRegistry::default();
//! let dispatcher = PrintDispatcher::new(&config);
//!
//! let devices = registry.list_devices(Some(&host)).await;
//! let outcome = dispatcher.print(Some(&host), &devices[0].id, &payload).await;
//! ```
//!
//! ESC/POS encoding and the serial transport live in `receipt-printer`.

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod logger;
pub mod model;
pub mod registry;
pub mod render;

pub use config::Config;
pub use dispatcher::{DeviceTarget, PrintDispatcher};
pub use error::{DeskError, DeskResult};
pub use host::{HostPrintContext, HostPrinterRecord, Margins, SubmitOptions, SubmitOutcome};
pub use model::{
    LogoImage, PrintOutcome, PrinterDescriptor, PrinterKind, ReceiptItem, ReceiptPayload,
    SerialTransportInfo,
};
pub use registry::{DeviceRegistry, PortEnumerator, RegistrySnapshot, SourceOutcome, SystemPorts};

#[cfg(unix)]
pub use host::CupsHost;
