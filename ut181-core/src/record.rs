//! Stored-record and measurement-sample data model
//!
//! Layouts here mirror the instrument's binary record formats and are part of
//! the fixed wire contract. All multi-byte fields are little-endian.

use crate::error::{RecordError, RecordResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Encoded size of one record descriptor in a listing frame
pub const DESCRIPTOR_LEN: usize = 13;

/// Size of the preamble that opens a trend record payload
pub const TREND_PREAMBLE_LEN: usize = 6;

const MANUAL_SAMPLE_LEN: usize = 9;
const TREND_SAMPLE_LEN: usize = 7;

/// Record kind, selecting the sample layout of a record payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// Manually saved readings, one full-resolution sample per entry
    Manual,
    /// Interval-logged trend capture with a compact per-sample layout
    Trend,
}

impl RecordKind {
    /// Get record kind from its wire code, `None` if unrecognized
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(RecordKind::Manual),
            0x02 => Some(RecordKind::Trend),
            _ => None,
        }
    }

    /// Get record kind from its wire code, failing on unknown codes
    pub fn try_from_code(code: u8) -> RecordResult<Self> {
        Self::from_code(code).ok_or(RecordError::UnsupportedKind(code))
    }

    /// Wire code for this record kind
    pub fn code(&self) -> u8 {
        match self {
            RecordKind::Manual => 0x01,
            RecordKind::Trend => 0x02,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Manual => write!(f, "manual"),
            RecordKind::Trend => write!(f, "trend"),
        }
    }
}

/// One decoded measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSample {
    /// Measured magnitude
    pub value: f32,
    /// Instrument unit/range code; interpreted by the presentation layer
    pub range_code: u8,
    /// Timestamp relative to the start of the record, in milliseconds
    pub t_rel_ms: u32,
}

/// Descriptor of one stored record, as reported by the listing response.
///
/// Immutable once listed; `index` is instrument-assigned and unique within a
/// listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDescriptor {
    pub index: u32,
    /// Creation time, device epoch seconds
    pub timestamp: u32,
    pub kind_code: u8,
    /// Total record payload size in bytes, across all chunks
    pub size: u32,
}

impl RecordDescriptor {
    /// Decode a descriptor from a listing frame payload
    pub fn decode(payload: &[u8]) -> RecordResult<Self> {
        if payload.len() < DESCRIPTOR_LEN {
            return Err(RecordError::Truncated {
                context: "record descriptor",
                needed: DESCRIPTOR_LEN,
                available: payload.len(),
            });
        }
        Ok(Self {
            index: u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]),
            timestamp: u32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]),
            kind_code: payload[8],
            size: u32::from_le_bytes([payload[9], payload[10], payload[11], payload[12]]),
        })
    }

    /// Encode a descriptor into its 13-byte wire form
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(DESCRIPTOR_LEN);
        out.extend_from_slice(&self.index.to_le_bytes());
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.push(self.kind_code);
        out.extend_from_slice(&self.size.to_le_bytes());
        out
    }

    /// Record kind, `None` if this firmware revision does not know the code
    pub fn kind(&self) -> Option<RecordKind> {
        RecordKind::from_code(self.kind_code)
    }
}

/// Fully reassembled and decoded stored record.
///
/// Only constructed once every chunk has been received and checksum-verified;
/// partial records are never represented by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordData {
    pub descriptor: RecordDescriptor,
    pub samples: Vec<MeasurementSample>,
}

impl MeasurementSample {
    /// Decode one live/manual sample: value f32, range code, t_rel u32 (ms)
    pub fn decode_manual(bytes: &[u8]) -> RecordResult<Self> {
        if bytes.len() < MANUAL_SAMPLE_LEN {
            return Err(RecordError::Truncated {
                context: "manual sample",
                needed: MANUAL_SAMPLE_LEN,
                available: bytes.len(),
            });
        }
        Ok(Self {
            value: f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            range_code: bytes[4],
            t_rel_ms: u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]),
        })
    }

    fn decode_trend(bytes: &[u8]) -> RecordResult<Self> {
        if bytes.len() < TREND_SAMPLE_LEN {
            return Err(RecordError::Truncated {
                context: "trend sample",
                needed: TREND_SAMPLE_LEN,
                available: bytes.len(),
            });
        }
        let t_rel_s = u16::from_le_bytes([bytes[5], bytes[6]]);
        Ok(Self {
            value: f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            range_code: bytes[4],
            t_rel_ms: u32::from(t_rel_s) * 1000,
        })
    }
}

/// Decode a complete record payload into its samples.
///
/// The payload must be the fully reassembled record body; chunk boundaries
/// carry no meaning here.
pub fn decode_samples(kind: RecordKind, payload: &[u8]) -> RecordResult<Vec<MeasurementSample>> {
    match kind {
        RecordKind::Manual => {
            if payload.len() % MANUAL_SAMPLE_LEN != 0 {
                return Err(RecordError::Truncated {
                    context: "manual record body",
                    needed: payload.len().next_multiple_of(MANUAL_SAMPLE_LEN),
                    available: payload.len(),
                });
            }
            payload
                .chunks_exact(MANUAL_SAMPLE_LEN)
                .map(MeasurementSample::decode_manual)
                .collect()
        }
        RecordKind::Trend => {
            if payload.len() < TREND_PREAMBLE_LEN {
                return Err(RecordError::Truncated {
                    context: "trend preamble",
                    needed: TREND_PREAMBLE_LEN,
                    available: payload.len(),
                });
            }
            let declared = usize::from(u16::from_le_bytes([payload[0], payload[1]]));
            let body = &payload[TREND_PREAMBLE_LEN..];
            if body.len() % TREND_SAMPLE_LEN != 0 {
                return Err(RecordError::Truncated {
                    context: "trend record body",
                    needed: body.len().next_multiple_of(TREND_SAMPLE_LEN),
                    available: body.len(),
                });
            }
            let actual = body.len() / TREND_SAMPLE_LEN;
            if declared != actual {
                return Err(RecordError::CountMismatch { declared, actual });
            }
            body.chunks_exact(TREND_SAMPLE_LEN)
                .map(MeasurementSample::decode_trend)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_sample_bytes(value: f32, range: u8, t_rel_ms: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&value.to_le_bytes());
        out.push(range);
        out.extend_from_slice(&t_rel_ms.to_le_bytes());
        out
    }

    #[test]
    fn test_descriptor_round_trip() {
        let desc = RecordDescriptor {
            index: 7,
            timestamp: 1_513_400_000,
            kind_code: RecordKind::Trend.code(),
            size: 237,
        };
        let decoded = RecordDescriptor::decode(&desc.encode()).unwrap();
        assert_eq!(decoded, desc);
        assert_eq!(decoded.kind(), Some(RecordKind::Trend));
    }

    #[test]
    fn test_descriptor_too_short() {
        let err = RecordDescriptor::decode(&[0u8; 12]).unwrap_err();
        assert!(matches!(err, RecordError::Truncated { .. }));
    }

    #[test]
    fn test_decode_manual_record() {
        let mut payload = manual_sample_bytes(1.5, 0x21, 0);
        payload.extend(manual_sample_bytes(-0.25, 0x21, 1000));
        let samples = decode_samples(RecordKind::Manual, &payload).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].value, 1.5);
        assert_eq!(samples[1].t_rel_ms, 1000);
    }

    #[test]
    fn test_decode_manual_record_ragged_length() {
        let payload = vec![0u8; 10];
        assert!(matches!(
            decode_samples(RecordKind::Manual, &payload),
            Err(RecordError::Truncated { .. })
        ));
    }

    #[test]
    fn test_decode_trend_record() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&2u16.to_le_bytes()); // sample count
        payload.extend_from_slice(&60u16.to_le_bytes()); // interval seconds
        payload.extend_from_slice(&0u16.to_le_bytes()); // reserved
        for (i, v) in [3.0f32, 3.1f32].iter().enumerate() {
            payload.extend_from_slice(&v.to_le_bytes());
            payload.push(0x10);
            payload.extend_from_slice(&((i as u16) * 60).to_le_bytes());
        }
        let samples = decode_samples(RecordKind::Trend, &payload).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].t_rel_ms, 60_000);
    }

    #[test]
    fn test_decode_trend_count_mismatch() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&3u16.to_le_bytes());
        payload.extend_from_slice(&[0u8; 4]);
        payload.extend_from_slice(&[0u8; TREND_SAMPLE_LEN]); // only one sample
        assert!(matches!(
            decode_samples(RecordKind::Trend, &payload),
            Err(RecordError::CountMismatch {
                declared: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_unknown_kind_code() {
        assert_eq!(RecordKind::from_code(0x7F), None);
    }
}
