//! # receipt-printer
//!
//! ESC/POS thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building
//! - Shift_JIS encoding for Japanese printers
//! - Serial / Bluetooth SPP printing
//! - Serial port enumeration
//! - Image/logo processing
//!
//! Business logic (WHAT to print) stays in `receipt-desk`.
//!
//! ## Example
//!
//! ```ignore
//! use receipt_printer::{Align, EscPosBuilder, Printer, SerialPrinter};
//!
//! let mut builder = EscPosBuilder::new(32);
//! builder.align(Align::Center).text_size(2, 2).line("レシート");
//! builder.text_size(1, 1).rule('=');
//! builder.align(Align::Right).line("¥300");
//! builder.cut();
//!
//! let printer = SerialPrinter::new("/dev/rfcomm0")?;
//! printer.print(&builder.build()).await?;
//! ```

mod encoding;
mod error;
mod escpos;
mod ports;
mod printer;

#[cfg(feature = "image")]
mod raster;

// Re-exports
pub use encoding::{convert_to_sjis, pad_sjis, sjis_width, truncate_sjis};
pub use error::{PrintError, PrintResult};
pub use escpos::{Align, EscPosBuilder};
pub use ports::{PortRecord, list_ports};
pub use printer::{Printer, SerialPrinter};

#[cfg(feature = "image")]
pub use raster::process_logo;
