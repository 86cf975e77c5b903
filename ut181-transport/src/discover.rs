//! USB candidate discovery for the UT181A
//!
//! Discovery only enumerates; matching a candidate against a requested serial
//! string is a pure filter that lives in the session layer.

use tokio_serial::{SerialPortType, available_ports};

/// USB vendor ID of the instrument's Silicon Labs UART bridge
pub const UT181A_USB_VID: u16 = 0x10C4;
/// USB product ID of the instrument's Silicon Labs UART bridge
pub const UT181A_USB_PID: u16 = 0xEA60;

/// One attached device that looks like a UT181A
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCandidate {
    /// OS port name, e.g. `/dev/ttyUSB0`
    pub port_name: String,
    /// Serial string reported by the USB descriptor, if any
    pub serial_number: Option<String>,
}

/// Enumerate attached serial ports whose USB identity matches the UT181A
/// bridge, in OS enumeration order.
///
/// # Errors
/// Returns the underlying enumeration error if the port scan itself fails;
/// an empty bus is an empty list, not an error.
pub fn discover_candidates() -> Result<Vec<DeviceCandidate>, tokio_serial::Error> {
    let ports = available_ports()?;
    Ok(ports
        .into_iter()
        .filter_map(|port| match port.port_type {
            SerialPortType::UsbPort(usb)
                if usb.vid == UT181A_USB_VID && usb.pid == UT181A_USB_PID =>
            {
                Some(DeviceCandidate {
                    port_name: port.port_name,
                    serial_number: usb.serial_number,
                })
            }
            _ => None,
        })
        .collect())
}
