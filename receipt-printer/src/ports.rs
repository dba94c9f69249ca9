//! Serial port enumeration

use crate::error::PrintResult;
use serde::{Deserialize, Serialize};
use serialport::SerialPortType;
use tracing::{debug, instrument};

/// One serial-style port as reported by the OS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRecord {
    pub path: String,
    pub friendly_name: Option<String>,
    pub manufacturer: Option<String>,
    /// USB vendor id, lowercase hex (`04b8`)
    pub vendor_id: Option<String>,
    /// USB product id, lowercase hex
    pub product_id: Option<String>,
}

impl PortRecord {
    fn from_info(info: serialport::SerialPortInfo) -> Self {
        let path = info.port_name;
        match info.port_type {
            SerialPortType::UsbPort(usb) => Self {
                friendly_name: usb.product,
                manufacturer: usb.manufacturer,
                vendor_id: Some(format!("{:04x}", usb.vid)),
                product_id: Some(format!("{:04x}", usb.pid)),
                path,
            },
            SerialPortType::BluetoothPort => Self {
                friendly_name: Some(format!("Bluetooth serial port ({})", path)),
                manufacturer: None,
                vendor_id: None,
                product_id: None,
                path,
            },
            SerialPortType::PciPort | SerialPortType::Unknown => Self {
                friendly_name: None,
                manufacturer: None,
                vendor_id: None,
                product_id: None,
                path,
            },
        }
    }
}

/// List serial ports in OS enumeration order
#[instrument]
pub fn list_ports() -> PrintResult<Vec<PortRecord>> {
    let ports = serialport::available_ports()?;
    debug!(count = ports.len(), "serial ports enumerated");
    Ok(ports.into_iter().map(PortRecord::from_info).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::{SerialPortInfo, UsbPortInfo};

    #[test]
    fn test_bluetooth_port_gets_friendly_name() {
        let record = PortRecord::from_info(SerialPortInfo {
            port_name: "/dev/rfcomm0".to_string(),
            port_type: SerialPortType::BluetoothPort,
        });
        assert_eq!(
            record.friendly_name.as_deref(),
            Some("Bluetooth serial port (/dev/rfcomm0)")
        );
        assert!(record.manufacturer.is_none());
    }

    #[test]
    fn test_usb_port_ids_are_hex() {
        let record = PortRecord::from_info(SerialPortInfo {
            port_name: "/dev/ttyUSB0".to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x04b8,
                pid: 0x0e15,
                serial_number: None,
                manufacturer: Some("EPSON".to_string()),
                product: Some("TM-T20II".to_string()),
            }),
        });
        assert_eq!(record.vendor_id.as_deref(), Some("04b8"));
        assert_eq!(record.product_id.as_deref(), Some("0e15"));
        assert_eq!(record.friendly_name.as_deref(), Some("TM-T20II"));
    }
}
