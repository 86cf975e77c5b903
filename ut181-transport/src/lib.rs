//! Transport layer for UT181A multimeter communication
//!
//! This crate owns the physical link to the instrument: a byte-oriented
//! send/receive contract with bounded waits, its serial-over-USB
//! implementation, and discovery of candidate devices on the USB bus.

pub mod discover;
pub mod error;
pub mod serial;
pub mod transport;

pub use discover::{DeviceCandidate, discover_candidates, UT181A_USB_PID, UT181A_USB_VID};
pub use error::{TransportError, TransportResult};
pub use serial::{SerialSettings, SerialTransport};
pub use transport::Transport;
