//! Stored-record catalog listing

use crate::error::CatalogError;
use std::collections::HashSet;
use ut181_core::{CancelToken, RecordDescriptor, DESCRIPTOR_LEN};
use ut181_session::{DeviceSession, Opcode, RESPONSE_TIMEOUT};

/// List the records stored on the instrument.
///
/// Sends one ListRecords request, then reads descriptor frames until the
/// device terminates the listing with an Ack marker. Descriptors are
/// returned in the order the device sent them — no sorting is applied.
/// Cancellation is observed between frames and returns the descriptors
/// gathered so far inside `CatalogError::Cancelled`.
///
/// # Errors
/// `ProtocolViolation` for duplicate indices, malformed descriptors or an
/// unexpected frame in the listing; transport/frame errors propagate.
pub async fn list_records(
    session: &mut DeviceSession,
    cancel: &CancelToken,
) -> Result<Vec<RecordDescriptor>, CatalogError> {
    session.send_request(Opcode::ListRecords, &[]).await?;

    let mut descriptors = Vec::new();
    let mut seen = HashSet::new();
    loop {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled {
                partial: descriptors,
            });
        }

        let frame = session.read_response(RESPONSE_TIMEOUT).await?;
        match frame.opcode {
            Opcode::Data => {
                if frame.payload.len() != DESCRIPTOR_LEN {
                    return Err(CatalogError::ProtocolViolation(format!(
                        "descriptor frame carries {} bytes, expected {}",
                        frame.payload.len(),
                        DESCRIPTOR_LEN
                    )));
                }
                let descriptor = RecordDescriptor::decode(&frame.payload)
                    .map_err(|e| CatalogError::ProtocolViolation(e.to_string()))?;
                if !seen.insert(descriptor.index) {
                    return Err(CatalogError::ProtocolViolation(format!(
                        "duplicate record index {}",
                        descriptor.index
                    )));
                }
                log::debug!(
                    "record {}: kind 0x{:02X}, {} bytes",
                    descriptor.index,
                    descriptor.kind_code,
                    descriptor.size
                );
                descriptors.push(descriptor);
            }
            // End-of-list marker
            Opcode::Ack => return Ok(descriptors),
            other => {
                return Err(CatalogError::ProtocolViolation(format!(
                    "unexpected {} during listing",
                    other
                )));
            }
        }
    }
}
