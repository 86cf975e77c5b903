//! Core types and utilities for UT181A multimeter communication
//!
//! This crate provides the shared data model used by the transport, session
//! and client layers: stored-record descriptors, decoded measurement samples,
//! and the cancellation token polled between blocking operations.

pub mod cancel;
pub mod error;
pub mod record;

pub use cancel::CancelToken;
pub use error::{RecordError, RecordResult};
pub use record::{
    decode_samples, MeasurementSample, RecordData, RecordDescriptor, RecordKind, DESCRIPTOR_LEN,
    TREND_PREAMBLE_LEN,
};
