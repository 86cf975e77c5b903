//! Live measurement streaming
//!
//! The monitor drives a repeated poll cycle against the instrument: one
//! GetLiveSample transaction per iteration, bounded by a short timeout so a
//! quiet instrument shows up as a no-data tick rather than an error. The
//! loop is intentionally unbounded; only cancellation or a real failure
//! stops it.

use crate::error::MonitorError;
use std::time::Duration;
use ut181_core::{CancelToken, MeasurementSample};
use ut181_session::{DeviceSession, FrameError, Opcode, SessionError};

/// Bound on one live sample poll; expiry is a tick, not an error
pub const LIVE_POLL_TIMEOUT: Duration = Duration::from_millis(250);

/// Live monitor state
///
/// ```text
/// Idle -> Streaming (on run())
/// Streaming -> Stopped (on cancellation or error)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    /// Not yet started
    #[default]
    Idle,
    /// Poll loop is running
    Streaming,
    /// Terminated, by cancellation (success) or by error
    Stopped,
}

impl MonitorState {
    /// Check whether the poll loop is active
    pub fn is_streaming(&self) -> bool {
        matches!(self, MonitorState::Streaming)
    }
}

/// Cancellable live-measurement stream
#[derive(Debug, Default)]
pub struct LiveMonitor {
    state: MonitorState,
}

impl LiveMonitor {
    /// Create a monitor in the `Idle` state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Stream live measurements into `sink` until cancelled.
    ///
    /// Each iteration checks the cancellation token first, then polls for
    /// one sample. Receive timeouts are treated as no-data ticks — the
    /// instrument may simply be idle. Cancellation is normal termination and
    /// returns `Ok(())`; any other transport or frame error stops the
    /// monitor and propagates.
    pub async fn run<F>(
        &mut self,
        session: &mut DeviceSession,
        cancel: &CancelToken,
        mut sink: F,
    ) -> Result<(), MonitorError>
    where
        F: FnMut(MeasurementSample),
    {
        self.state = MonitorState::Streaming;
        loop {
            if cancel.is_cancelled() {
                log::debug!("live monitor cancelled");
                self.state = MonitorState::Stopped;
                return Ok(());
            }

            match session
                .transact(Opcode::GetLiveSample, &[], LIVE_POLL_TIMEOUT)
                .await
            {
                Ok(frame) if frame.opcode == Opcode::Data => {
                    match MeasurementSample::decode_manual(&frame.payload) {
                        Ok(sample) => sink(sample),
                        Err(e) => {
                            self.state = MonitorState::Stopped;
                            return Err(MonitorError::Session(SessionError::Frame(
                                FrameError::Malformed(format!("live sample payload: {}", e)),
                            )));
                        }
                    }
                }
                Ok(frame) => {
                    self.state = MonitorState::Stopped;
                    return Err(MonitorError::UnexpectedResponse(frame.opcode));
                }
                // No measurement ready; the instrument may be idle
                Err(e) if e.is_timeout() => continue,
                Err(e) => {
                    self.state = MonitorState::Stopped;
                    return Err(e.into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let monitor = LiveMonitor::new();
        assert_eq!(monitor.state(), MonitorState::Idle);
        assert!(!monitor.state().is_streaming());
    }
}
