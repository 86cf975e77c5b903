//! UT181A multimeter communication stack
//!
//! Connects to a UNI-T UT181A bench multimeter over its USB serial bridge,
//! retrieves stored measurement records and streams live measurements.
//!
//! # Architecture
//!
//! This library is organized as a workspace with one crate per layer:
//!
//! - `ut181-core`: shared data model (records, samples, cancellation)
//! - `ut181-transport`: byte transport, serial port, USB discovery
//! - `ut181-session`: wire framing, handshake, session lifecycle
//! - `ut181-client`: record catalog, record download, live monitor, and the
//!   `Device` facade for the driver layer
//!
//! # Usage
//!
//! ```no_run
//! use ut181::client::Device;
//! use ut181::CancelToken;
//!
//! # async fn demo() {
//! let cancel = CancelToken::new();
//! let mut device = Device::new();
//! if device.open(None).await {
//!     device
//!         .list_records(&cancel, |descriptor| {
//!             println!("{}: {} bytes", descriptor.index, descriptor.size);
//!         })
//!         .await;
//!     device.close().await;
//! }
//! # }
//! ```

// Re-export core types
pub use ut181_core::{
    CancelToken, MeasurementSample, RecordData, RecordDescriptor, RecordKind,
};

// Re-export the client API
pub mod client {
    pub use ut181_client::*;
}

// Re-export the session API
pub mod session {
    pub use ut181_session::*;
}

// Re-export the transport API
pub mod transport {
    pub use ut181_transport::*;
}
