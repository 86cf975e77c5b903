//! Device facade consumed by the driver/CLI layer
//!
//! The driver layer wants success/failure answers and reports detail through
//! logging; presentation (printed tables, CSV export) stays on its side of
//! the boundary and is fed through the sink callbacks here.

use crate::catalog::list_records;
use crate::download::fetch_record;
use crate::error::CatalogError;
use crate::monitor::LiveMonitor;
use anyhow::{anyhow, Context};
use ut181_core::{CancelToken, MeasurementSample, RecordData, RecordDescriptor};
use ut181_session::{self, DeviceSession};

/// High-level handle over one UT181A.
///
/// Wraps the session lifecycle and the three client operations behind the
/// boolean interface the driver layer consumes. At most one session is open
/// per `Device`, and operations borrow it exclusively.
#[derive(Debug, Default)]
pub struct Device {
    session: Option<DeviceSession>,
}

impl Device {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a session is open
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Discover and open the instrument, optionally matched by USB serial
    /// string. Returns success/failure; detail goes to the log.
    pub async fn open(&mut self, serial_filter: Option<&str>) -> bool {
        if self.session.is_some() {
            log::warn!("device already open");
            return true;
        }
        match ut181_session::open(serial_filter).await {
            Ok(session) => {
                self.session = Some(session);
                true
            }
            Err(e) => {
                log::error!("failed to open UT181A: {}", e);
                false
            }
        }
    }

    /// Close the session if one is open. Always safe, idempotent.
    pub async fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close().await;
        }
    }

    /// Stream live measurements into `sink` until cancelled
    pub async fn monitor<F>(&mut self, cancel: &CancelToken, sink: F) -> bool
    where
        F: FnMut(MeasurementSample),
    {
        let result = Self::try_monitor(&mut self.session, cancel, sink).await;
        report(result)
    }

    /// List stored records, emitting each descriptor to `sink` in device
    /// order. On cancellation the descriptors gathered so far are still
    /// emitted, but the call reports failure since the listing is partial.
    pub async fn list_records<F>(&mut self, cancel: &CancelToken, sink: F) -> bool
    where
        F: FnMut(&RecordDescriptor),
    {
        let result = Self::try_list_records(&mut self.session, cancel, sink).await;
        report(result)
    }

    /// Download one stored record by index and hand it to `exporter`
    pub async fn receive_record<F>(&mut self, index: u32, cancel: &CancelToken, exporter: F) -> bool
    where
        F: FnOnce(RecordData),
    {
        let result = Self::try_receive_record(&mut self.session, index, cancel, exporter).await;
        report(result)
    }

    fn session_mut(session: &mut Option<DeviceSession>) -> anyhow::Result<&mut DeviceSession> {
        session
            .as_mut()
            .ok_or_else(|| anyhow!("device session is not open"))
    }

    async fn try_monitor<F>(
        session: &mut Option<DeviceSession>,
        cancel: &CancelToken,
        sink: F,
    ) -> anyhow::Result<()>
    where
        F: FnMut(MeasurementSample),
    {
        let session = Self::session_mut(session)?;
        let mut monitor = LiveMonitor::new();
        monitor
            .run(session, cancel, sink)
            .await
            .context("live monitor failed")
    }

    async fn try_list_records<F>(
        session: &mut Option<DeviceSession>,
        cancel: &CancelToken,
        mut sink: F,
    ) -> anyhow::Result<()>
    where
        F: FnMut(&RecordDescriptor),
    {
        let session = Self::session_mut(session)?;
        match list_records(session, cancel).await {
            Ok(descriptors) => {
                for descriptor in &descriptors {
                    sink(descriptor);
                }
                Ok(())
            }
            Err(CatalogError::Cancelled { partial }) => {
                for descriptor in &partial {
                    sink(descriptor);
                }
                Err(anyhow!(
                    "listing cancelled after {} descriptors",
                    partial.len()
                ))
            }
            Err(e) => Err(e).context("record listing failed"),
        }
    }

    async fn try_receive_record<F>(
        session: &mut Option<DeviceSession>,
        index: u32,
        cancel: &CancelToken,
        exporter: F,
    ) -> anyhow::Result<()>
    where
        F: FnOnce(RecordData),
    {
        let session = Self::session_mut(session)?;
        let record = fetch_record(session, index, None, cancel)
            .await
            .with_context(|| format!("failed to receive record {}", index))?;
        exporter(record);
        Ok(())
    }
}

/// Log a failure and fold the outcome into the driver-facing bool
fn report(result: anyhow::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::error!("{:#}", e);
            false
        }
    }
}
