//! Record retrieval and live monitoring client for the UT181A
//!
//! Built on the session layer, this crate implements the three operations
//! the tool exposes: listing the stored-record catalog, downloading a record
//! chunk by chunk, and streaming live measurements until cancelled. The
//! `Device` facade wraps them in the success/failure interface the driver
//! layer consumes.

pub mod catalog;
pub mod device;
pub mod download;
pub mod error;
pub mod monitor;

pub use catalog::list_records;
pub use device::Device;
pub use download::{fetch_record, CHUNK_ATTEMPT_LIMIT};
pub use error::{CatalogError, DownloadError, MonitorError};
pub use monitor::{LiveMonitor, MonitorState, LIVE_POLL_TIMEOUT};
