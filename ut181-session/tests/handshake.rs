//! Session handshake and frame-reader behaviour against a scripted link

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use ut181_session::{
    open_with_transport, Frame, FrameError, FrameReader, Opcode, OpenError, SessionError,
};
use ut181_transport::{Transport, TransportError, TransportResult};

/// Transport that replays a fixed sequence of receive chunks and records
/// everything sent. An exhausted script reports `Timeout`, like an idle
/// instrument.
struct ScriptedTransport {
    chunks: VecDeque<Vec<u8>>,
    sent: Vec<Vec<u8>>,
    closed: bool,
}

impl ScriptedTransport {
    fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into(),
            sent: Vec::new(),
            closed: false,
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&mut self, bytes: &[u8]) -> TransportResult<()> {
        self.sent.push(bytes.to_vec());
        Ok(())
    }

    async fn receive(&mut self, max_len: usize, _timeout: Duration) -> TransportResult<Vec<u8>> {
        match self.chunks.pop_front() {
            Some(mut chunk) => {
                if chunk.len() > max_len {
                    let rest = chunk.split_off(max_len);
                    self.chunks.push_front(rest);
                }
                Ok(chunk)
            }
            None => Err(TransportError::Timeout),
        }
    }

    async fn close(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[tokio::test]
async fn open_handshake_acknowledged() {
    let ack = Frame::new(Opcode::Ack, vec![2, 0x01]);
    let transport = ScriptedTransport::new(vec![ack.encode()]);

    let session = open_with_transport(Box::new(transport)).await.unwrap();
    assert!(session.is_open());
    assert_eq!(session.capabilities().protocol_version, 2);
    assert_eq!(session.capabilities().flags, 0x01);
}

#[tokio::test]
async fn open_handshake_refused_with_nak() {
    let nak = Frame::new(Opcode::Nak, vec![0x05]);
    let transport = ScriptedTransport::new(vec![nak.encode()]);

    let err = open_with_transport(Box::new(transport)).await.unwrap_err();
    assert!(matches!(err, OpenError::HandshakeFailed(_)));
}

#[tokio::test]
async fn open_handshake_times_out_without_reply() {
    let transport = ScriptedTransport::new(Vec::new());
    let err = open_with_transport(Box::new(transport)).await.unwrap_err();
    assert!(matches!(err, OpenError::HandshakeFailed(_)));
}

#[tokio::test]
async fn response_stream_rejects_request_opcode() {
    let ack = Frame::new(Opcode::Ack, vec![1, 0]);
    let echoed = Frame::new(Opcode::ListRecords, Vec::new());
    let transport = ScriptedTransport::new(vec![ack.encode(), echoed.encode()]);

    let mut session = open_with_transport(Box::new(transport)).await.unwrap();
    let err = session
        .read_response(Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Frame(FrameError::Malformed(_))
    ));
}

#[tokio::test]
async fn reader_skips_noise_before_sync() {
    let frame = Frame::new(Opcode::Data, vec![9, 9, 9]);
    let mut bytes = vec![0x00, 0x13, 0x37]; // line noise
    bytes.extend(frame.encode());
    let mut transport = ScriptedTransport::new(vec![bytes]);

    let mut reader = FrameReader::new();
    let decoded = reader
        .read_frame(&mut transport, Duration::from_millis(50))
        .await
        .unwrap();
    assert_eq!(decoded, frame);
}

#[tokio::test]
async fn reader_reassembles_split_delivery() {
    let frame = Frame::new(Opcode::Data, (0u8..40).collect::<Vec<_>>());
    let encoded = frame.encode();
    let (head, tail) = encoded.split_at(7);
    let mut transport = ScriptedTransport::new(vec![head.to_vec(), tail.to_vec()]);

    let mut reader = FrameReader::new();
    let decoded = reader
        .read_frame(&mut transport, Duration::from_millis(50))
        .await
        .unwrap();
    assert_eq!(decoded, frame);
}

#[tokio::test]
async fn reader_consumes_corrupt_frame_whole() {
    let good = Frame::new(Opcode::Ack, vec![1]);
    let mut bad = Frame::new(Opcode::Data, vec![1, 2, 3]).encode();
    bad[5] ^= 0xFF; // corrupt payload, checksum now wrong

    let mut stream = bad;
    stream.extend(good.encode());
    let mut transport = ScriptedTransport::new(vec![stream]);

    let mut reader = FrameReader::new();
    let err = reader
        .read_frame(&mut transport, Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Frame(_)));

    // The damaged frame was dropped whole; the stream is still synchronised.
    let decoded = reader
        .read_frame(&mut transport, Duration::from_millis(50))
        .await
        .unwrap();
    assert_eq!(decoded, good);
}
