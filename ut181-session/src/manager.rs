//! Session manager: device discovery, open handshake, candidate selection

use crate::error::OpenError;
use crate::frame::{Frame, Opcode};
use crate::reader::FrameReader;
use crate::session::{DeviceSession, SessionCapabilities};
use std::time::Duration;
use ut181_transport::{
    discover_candidates, DeviceCandidate, SerialSettings, SerialTransport, Transport,
};

/// Bound on waiting for the OpenSession acknowledgement
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Discover, select and open a UT181A device.
///
/// With a `serial_filter`, only the device whose USB serial string matches
/// exactly is opened. Without one, a single attached candidate is opened and
/// multiple candidates fail with `AmbiguousDevice` so the caller can
/// disambiguate explicitly.
///
/// # Errors
/// `NotFound` / `AmbiguousDevice` from selection, `Enumeration` / `Port` for
/// bus or port failures, `HandshakeFailed` when the device does not
/// acknowledge the session in time.
pub async fn open(serial_filter: Option<&str>) -> Result<DeviceSession, OpenError> {
    let candidates = discover_candidates().map_err(OpenError::Enumeration)?;
    let candidate = select_candidate(&candidates, serial_filter)?;
    log::debug!(
        "opening UT181A on {} (serial {:?})",
        candidate.port_name,
        candidate.serial_number
    );

    let transport =
        SerialTransport::open(SerialSettings::new(&candidate.port_name)).map_err(OpenError::Port)?;
    open_with_transport(Box::new(transport)).await
}

/// Perform the OpenSession handshake over an already-open transport.
///
/// Used by [`open`] and by callers that bring their own link.
pub async fn open_with_transport(
    mut transport: Box<dyn Transport>,
) -> Result<DeviceSession, OpenError> {
    let mut reader = FrameReader::new();

    let request = Frame::new(Opcode::OpenSession, Vec::new());
    transport
        .send(&request.encode())
        .await
        .map_err(|e| OpenError::HandshakeFailed(e.to_string()))?;

    let reply = reader
        .read_frame(&mut *transport, HANDSHAKE_TIMEOUT)
        .await
        .map_err(|e| OpenError::HandshakeFailed(e.to_string()))?;

    match reply.opcode {
        Opcode::Ack => {
            let capabilities = SessionCapabilities::decode(&reply.payload);
            log::debug!("session open, capabilities {:?}", capabilities);
            Ok(DeviceSession::new(transport, reader, capabilities))
        }
        Opcode::Nak => Err(OpenError::HandshakeFailed(format!(
            "device refused session (reason 0x{:02X})",
            reply.payload.first().copied().unwrap_or(0)
        ))),
        other => Err(OpenError::HandshakeFailed(format!(
            "expected Ack, device sent {}",
            other
        ))),
    }
}

/// Pure candidate selection: exact serial match, or the exactly-one rule.
///
/// Discovery mechanics stay behind the transport crate; this is only a
/// filter over the enumerated list.
pub fn select_candidate<'a>(
    candidates: &'a [DeviceCandidate],
    serial_filter: Option<&str>,
) -> Result<&'a DeviceCandidate, OpenError> {
    match serial_filter {
        Some(serial) => candidates
            .iter()
            .find(|c| c.serial_number.as_deref() == Some(serial))
            .ok_or(OpenError::NotFound),
        None => match candidates {
            [] => Err(OpenError::NotFound),
            [only] => Ok(only),
            many => Err(OpenError::AmbiguousDevice { count: many.len() }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(port: &str, serial: Option<&str>) -> DeviceCandidate {
        DeviceCandidate {
            port_name: port.to_string(),
            serial_number: serial.map(str::to_string),
        }
    }

    #[test]
    fn test_select_by_serial_exact_match() {
        let candidates = vec![
            candidate("/dev/ttyUSB0", Some("SN999")),
            candidate("/dev/ttyUSB1", Some("SN123")),
        ];
        let chosen = select_candidate(&candidates, Some("SN123")).unwrap();
        assert_eq!(chosen.port_name, "/dev/ttyUSB1");
    }

    #[test]
    fn test_select_by_serial_not_found() {
        let candidates = vec![candidate("/dev/ttyUSB0", Some("SN999"))];
        assert!(matches!(
            select_candidate(&candidates, Some("SN123")),
            Err(OpenError::NotFound)
        ));
    }

    #[test]
    fn test_select_single_unfiltered() {
        let candidates = vec![candidate("/dev/ttyUSB0", None)];
        assert!(select_candidate(&candidates, None).is_ok());
    }

    #[test]
    fn test_select_multiple_unfiltered_is_ambiguous() {
        let candidates = vec![
            candidate("/dev/ttyUSB0", Some("SN1")),
            candidate("/dev/ttyUSB1", Some("SN2")),
        ];
        assert!(matches!(
            select_candidate(&candidates, None),
            Err(OpenError::AmbiguousDevice { count: 2 })
        ));
    }

    #[test]
    fn test_select_empty_list() {
        assert!(matches!(
            select_candidate(&[], None),
            Err(OpenError::NotFound)
        ));
    }
}
