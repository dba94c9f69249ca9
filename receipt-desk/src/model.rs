//! Printer and receipt data structures
//!
//! Shapes are camelCase on the wire so a web UI can pass them through as-is.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Backend family of a printable target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrinterKind {
    /// Printer installed in the host OS print system
    System,
    /// ESC/POS printer on a serial-style port (USB-serial, Bluetooth SPP)
    SerialThermal,
    /// Built-in demo printer, no hardware
    Mock,
}

/// Transport details of a serial thermal printer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerialTransportInfo {
    pub path: String,
    pub vendor_id: Option<String>,
    pub product_id: Option<String>,
    pub manufacturer: Option<String>,
}

/// One addressable output target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterDescriptor {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub kind: PrinterKind,
    pub status: String,
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<SerialTransportInfo>,
}

/// One receipt line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// One print job
///
/// `total` is whatever the caller typed; it is never recomputed from items.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReceiptPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(
        default,
        deserialize_with = "lenient_logo",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<LogoImage>,
}

/// Uniform result of a print call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintOutcome {
    pub success: bool,
    pub message: String,
}

impl PrintOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Encoded logo image (PNG, JPEG, WebP, SVG...) exactly as uploaded
///
/// Accepts a `data:image/...;base64,` URL or bare base64 on deserialize and
/// serializes back to a data URL. The MIME type of an incoming data URL is
/// kept; otherwise it is sniffed from the bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogoImage {
    bytes: Vec<u8>,
    declared_mime: Option<String>,
}

impl LogoImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            declared_mime: None,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Parse a data URL or bare base64 text
    pub fn from_data_url(s: &str) -> Result<Self, base64::DecodeError> {
        let (declared_mime, encoded) = match s.split_once(',') {
            Some((header, rest)) if header.starts_with("data:") => {
                let mime = header["data:".len()..]
                    .split(';')
                    .next()
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string);
                (mime, rest)
            }
            _ => (None, s),
        };
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD.decode(compact)?;
        Ok(Self {
            bytes,
            declared_mime,
        })
    }

    pub fn mime_type(&self) -> &str {
        match &self.declared_mime {
            Some(mime) => mime.as_str(),
            None => image::guess_format(&self.bytes)
                .map(|f| f.to_mime_type())
                .unwrap_or("application/octet-stream"),
        }
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }
}

impl std::fmt::Debug for LogoImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogoImage")
            .field("len", &self.bytes.len())
            .field("mime", &self.mime_type())
            .finish()
    }
}

/// An unreadable logo is dropped; the receipt still prints
fn lenient_logo<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<LogoImage>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| match LogoImage::from_data_url(&s) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(error = %e, "undecodable logo dropped from payload");
                None
            }
        }))
}

impl TryFrom<String> for LogoImage {
    type Error = base64::DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_data_url(&value)
    }
}

impl From<LogoImage> for String {
    fn from(value: LogoImage) -> Self {
        value.to_data_url()
    }
}
