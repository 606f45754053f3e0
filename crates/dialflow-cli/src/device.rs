//! Live device monitoring over hidapi.

use crate::error::CliError;
use dialflow_engine::prelude::*;
use hidapi::{HidApi, HidDevice};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Read timeout used by the monitor loop; bounds how long shutdown waits.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Largest report the reader accepts.
const MAX_REPORT_LEN: usize = 64;

/// Report source backed by an open HID device.
pub struct HidReportSource {
    device: HidDevice,
    buf: [u8; MAX_REPORT_LEN],
    sequence: u64,
}

impl HidReportSource {
    /// Open the first HID interface matching `vid`/`pid`.
    ///
    /// No usage-page filtering is done. On devices that expose several
    /// interfaces this may attach to a non-vendor collection (keyboard or
    /// consumer control) instead of the `0xFF43` vendor page that carries the
    /// dial reports.
    pub fn open(api: &HidApi, vid: u16, pid: u16) -> Result<Self, CliError> {
        let device = api.open(vid, pid).map_err(|e| CliError::DeviceOpen {
            vid,
            pid,
            reason: e.to_string(),
        })?;
        tracing::info!(
            vid = %format!("0x{vid:04X}"),
            pid = %format!("0x{pid:04X}"),
            "Device opened"
        );
        Ok(Self {
            device,
            buf: [0u8; MAX_REPORT_LEN],
            sequence: 0,
        })
    }
}

impl ReportSource for HidReportSource {
    fn read_report(&mut self, timeout: Duration) -> EngineResult<Option<Report>> {
        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        let n = self
            .device
            .read_timeout(&mut self.buf, timeout_ms)
            .map_err(|e| EngineError::source_failed(e.to_string()))?;
        let Some(bytes) = self.buf.get(..n).filter(|b| !b.is_empty()) else {
            return Ok(None);
        };
        self.sequence += 1;
        Ok(Some(Report::new(self.sequence, bytes)))
    }
}

/// Decode reports from `source` until Ctrl-C or a source failure.
pub async fn monitor<S>(
    engine: Arc<DialEngine>,
    mut source: S,
    tick_period: Duration,
) -> anyhow::Result<()>
where
    S: ReportSource + 'static,
{
    engine.connect();
    let driver = TickDriver::spawn(Arc::clone(&engine), tick_period);
    let stop = Arc::new(AtomicBool::new(false));

    let mut reader = tokio::task::spawn_blocking({
        let engine = Arc::clone(&engine);
        let stop = Arc::clone(&stop);
        move || -> EngineResult<()> {
            while !stop.load(Ordering::Acquire) {
                match engine.poll_source(&mut source, READ_TIMEOUT) {
                    Ok(_) => {}
                    Err(EngineError::Decode(err)) => {
                        tracing::warn!(error = %err, "Report dropped");
                    }
                    Err(err) => return Err(err),
                }
            }
            Ok(())
        }
    });

    let result = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
            stop.store(true, Ordering::Release);
            let joined = (&mut reader).await;
            signal.map_err(anyhow::Error::from).and(flatten(joined))
        }
        joined = &mut reader => flatten(joined),
    };

    driver.stop().await;
    engine.disconnect();
    result
}

fn flatten(joined: Result<EngineResult<()>, tokio::task::JoinError>) -> anyhow::Result<()> {
    joined??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialflow_engine::sink::mock::MockReportSource;

    /// GIVEN a source whose device went away
    /// WHEN the monitor runs
    /// THEN it returns the source error and closes the session
    #[tokio::test]
    async fn given_failing_source_when_monitoring_then_error_and_disconnect() {
        let engine = Arc::new(DialEngine::new(EngineConfig::mx_dialpad()));
        let source = MockReportSource::new();
        source.fail("unplugged");

        let result = monitor(Arc::clone(&engine), source, Duration::from_millis(5)).await;
        assert!(matches!(
            result.map_err(|e| e.downcast::<EngineError>()),
            Err(Ok(EngineError::Source(reason))) if reason == "unplugged"
        ));
        assert!(!engine.is_connected());
    }
}
