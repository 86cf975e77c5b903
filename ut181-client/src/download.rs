//! Stored-record download and reassembly
//!
//! A record larger than one transport frame arrives as a sequence of chunks,
//! each carrying a 14-byte header and a continuation flag. Chunks are
//! requested one at a time with increasing offsets; a checksum failure on a
//! chunk retries that same chunk within a fixed bound before the record is
//! declared corrupt.

use crate::error::DownloadError;
use ut181_core::{decode_samples, CancelToken, RecordData, RecordDescriptor, RecordKind};
use ut181_session::{DeviceSession, Frame, FrameError, Opcode, SessionError, RESPONSE_TIMEOUT};

/// Total attempts per chunk: the initial request plus three retries.
///
/// Inferred from the public call shape of the original tool; confirm against
/// real device traces before relying on it for marginal links.
pub const CHUNK_ATTEMPT_LIMIT: u32 = 4;

/// Chunk header: index u32, total size u32, timestamp u32, kind u8, flags u8
const CHUNK_HEADER_LEN: usize = 14;

/// Continuation bit: more chunks follow this one
const FLAG_CONTINUES: u8 = 0x01;

struct ChunkHeader {
    index: u32,
    total_size: u32,
    timestamp: u32,
    kind_code: u8,
    continues: bool,
}

fn parse_chunk(payload: &[u8]) -> Result<(ChunkHeader, &[u8]), DownloadError> {
    if payload.len() < CHUNK_HEADER_LEN {
        return Err(DownloadError::ProtocolViolation(format!(
            "chunk frame carries {} bytes, header alone needs {}",
            payload.len(),
            CHUNK_HEADER_LEN
        )));
    }
    let header = ChunkHeader {
        index: u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]),
        total_size: u32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]),
        timestamp: u32::from_le_bytes([payload[8], payload[9], payload[10], payload[11]]),
        kind_code: payload[12],
        continues: payload[13] & FLAG_CONTINUES != 0,
    };
    Ok((header, &payload[CHUNK_HEADER_LEN..]))
}

/// Download one stored record and decode it into samples.
///
/// When the record was previously listed, pass its descriptor: the declared
/// size then cross-checks the chunk headers. Without a descriptor the
/// metadata is taken from the first chunk's header.
///
/// Cancellation between chunk requests aborts with `Cancelled` and discards
/// the partial data — a partial record is never returned as valid.
///
/// # Errors
/// `ProtocolViolation` for index/size disagreements or structurally invalid
/// record bodies, `CorruptRecord` once the per-chunk retry bound is
/// exhausted, `UnsupportedRecordKind` for kind codes this firmware revision
/// does not define.
pub async fn fetch_record(
    session: &mut DeviceSession,
    index: u32,
    descriptor: Option<&RecordDescriptor>,
    cancel: &CancelToken,
) -> Result<RecordData, DownloadError> {
    let mut meta = descriptor.cloned();
    let mut kind = match &meta {
        Some(desc) => Some(resolve_kind(desc.kind_code)?),
        None => None,
    };

    let mut body: Vec<u8> = Vec::new();
    loop {
        if cancel.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }

        let offset = body.len() as u32;
        let frame = request_chunk(session, index, offset).await?;
        if frame.opcode != Opcode::Data {
            return Err(DownloadError::ProtocolViolation(format!(
                "expected Data chunk, device sent {}",
                frame.opcode
            )));
        }

        let (header, data) = parse_chunk(&frame.payload)?;
        if header.index != index {
            return Err(DownloadError::ProtocolViolation(format!(
                "requested record {}, chunk answers for record {}",
                index, header.index
            )));
        }
        if data.is_empty() {
            // A header-only chunk makes no progress; re-requesting the same
            // offset would loop forever.
            return Err(DownloadError::ProtocolViolation(format!(
                "record {} chunk at offset {} carries no data",
                index, offset
            )));
        }

        let expected = match &meta {
            Some(desc) => {
                if header.total_size != desc.size {
                    return Err(DownloadError::ProtocolViolation(format!(
                        "chunk declares total {} bytes, descriptor says {}",
                        header.total_size, desc.size
                    )));
                }
                if header.kind_code != desc.kind_code {
                    return Err(DownloadError::ProtocolViolation(format!(
                        "chunk declares kind 0x{:02X}, descriptor says 0x{:02X}",
                        header.kind_code, desc.kind_code
                    )));
                }
                desc.size
            }
            None => {
                let desc = RecordDescriptor {
                    index,
                    timestamp: header.timestamp,
                    kind_code: header.kind_code,
                    size: header.total_size,
                };
                kind = Some(resolve_kind(desc.kind_code)?);
                let size = desc.size;
                meta = Some(desc);
                size
            }
        };

        body.extend_from_slice(data);
        if body.len() as u32 > expected {
            return Err(DownloadError::ProtocolViolation(format!(
                "record {} grew to {} bytes, {} declared",
                index,
                body.len(),
                expected
            )));
        }

        if !header.continues {
            if (body.len() as u32) < expected {
                return Err(DownloadError::ProtocolViolation(format!(
                    "record {} ended at {} bytes, {} declared",
                    index,
                    body.len(),
                    expected
                )));
            }
            break;
        }
        if body.len() as u32 == expected {
            // Declared size reached; the continuation flag no longer matters.
            break;
        }
    }

    // meta and kind are both set by the first chunk at the latest
    let (descriptor, kind) = match (meta, kind) {
        (Some(descriptor), Some(kind)) => (descriptor, kind),
        _ => {
            return Err(DownloadError::ProtocolViolation(format!(
                "record {} produced no chunks",
                index
            )));
        }
    };
    let samples =
        decode_samples(kind, &body).map_err(|e| DownloadError::ProtocolViolation(e.to_string()))?;

    log::debug!(
        "record {}: {} bytes, {} samples",
        index,
        body.len(),
        samples.len()
    );
    Ok(RecordData {
        descriptor,
        samples,
    })
}

fn resolve_kind(code: u8) -> Result<RecordKind, DownloadError> {
    RecordKind::try_from_code(code).map_err(|_| DownloadError::UnsupportedRecordKind(code))
}

/// Request one chunk, retrying the same offset on checksum failure.
///
/// Only checksum damage is retried; every other error propagates
/// immediately.
async fn request_chunk(
    session: &mut DeviceSession,
    index: u32,
    offset: u32,
) -> Result<Frame, DownloadError> {
    let mut payload = [0u8; 8];
    payload[..4].copy_from_slice(&index.to_le_bytes());
    payload[4..].copy_from_slice(&offset.to_le_bytes());

    for attempt in 1..=CHUNK_ATTEMPT_LIMIT {
        match session
            .transact(Opcode::GetRecordChunk, &payload, RESPONSE_TIMEOUT)
            .await
        {
            Ok(frame) => return Ok(frame),
            Err(SessionError::Frame(FrameError::ChecksumMismatch { .. })) => {
                log::warn!(
                    "record {} chunk at offset {}: checksum failed (attempt {}/{})",
                    index,
                    offset,
                    attempt,
                    CHUNK_ATTEMPT_LIMIT
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(DownloadError::CorruptRecord {
        index,
        attempts: CHUNK_ATTEMPT_LIMIT,
    })
}
