//! Collaborator interfaces around the engine.
//!
//! Device I/O, event transport and token dispatch live outside the engine and
//! are plugged in through these traits.

use crate::error::EngineResult;
use dialflow_physics::DirectionToken;
use dialflow_report::{DecodedReport, Report};
use std::time::Duration;

/// Source of raw input reports, usually a device handle.
pub trait ReportSource: Send {
    /// Wait up to `timeout` for the next report.
    ///
    /// Returns `Ok(None)` when no report arrived in time.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Source`](crate::EngineError::Source) when the
    /// source failed, for example because the device went away.
    fn read_report(&mut self, timeout: Duration) -> EngineResult<Option<Report>>;
}

/// Receiver of every decoded report.
pub trait EventSink: Send + Sync {
    /// Called once per successfully decoded report.
    fn publish(&self, report: &DecodedReport);
}

/// Receiver of direction tokens.
pub trait OutputSink: Send + Sync {
    /// Called once per token, in emission order.
    fn emit(&self, wheel: &str, token: DirectionToken);
}

/// In-memory collaborators for tests and offline tools.
pub mod mock {
    use super::*;
    use crate::error::EngineError;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// Report source fed from a queue.
    #[derive(Debug, Clone, Default)]
    pub struct MockReportSource {
        queue: Arc<Mutex<VecDeque<Report>>>,
        failed: Arc<Mutex<Option<String>>>,
    }

    impl MockReportSource {
        /// Empty source.
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a report for a later read.
        pub fn push(&self, report: Report) {
            self.queue.lock().push_back(report);
        }

        /// Make every later read fail with `reason`.
        pub fn fail(&self, reason: impl Into<String>) {
            *self.failed.lock() = Some(reason.into());
        }

        /// Reports not yet read.
        pub fn pending(&self) -> usize {
            self.queue.lock().len()
        }
    }

    impl ReportSource for MockReportSource {
        fn read_report(&mut self, _timeout: Duration) -> EngineResult<Option<Report>> {
            if let Some(reason) = self.failed.lock().clone() {
                return Err(EngineError::source_failed(reason));
            }
            Ok(self.queue.lock().pop_front())
        }
    }

    /// Event sink that keeps every published report.
    #[derive(Debug, Default)]
    pub struct RecordingEventSink {
        reports: Mutex<Vec<DecodedReport>>,
    }

    impl RecordingEventSink {
        /// Empty sink.
        pub fn new() -> Self {
            Self::default()
        }

        /// Copy of all published reports.
        pub fn reports(&self) -> Vec<DecodedReport> {
            self.reports.lock().clone()
        }
    }

    impl EventSink for RecordingEventSink {
        fn publish(&self, report: &DecodedReport) {
            self.reports.lock().push(report.clone());
        }
    }

    /// Output sink that keeps every emitted token.
    #[derive(Debug, Default)]
    pub struct RecordingOutputSink {
        tokens: Mutex<Vec<(String, DirectionToken)>>,
    }

    impl RecordingOutputSink {
        /// Empty sink.
        pub fn new() -> Self {
            Self::default()
        }

        /// Copy of all emitted tokens with their wheel names.
        pub fn tokens(&self) -> Vec<(String, DirectionToken)> {
            self.tokens.lock().clone()
        }

        /// Number of emitted tokens.
        pub fn len(&self) -> usize {
            self.tokens.lock().len()
        }

        /// Whether nothing was emitted.
        pub fn is_empty(&self) -> bool {
            self.tokens.lock().is_empty()
        }
    }

    impl OutputSink for RecordingOutputSink {
        fn emit(&self, wheel: &str, token: DirectionToken) {
            self.tokens.lock().push((wheel.to_string(), token));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn test_mock_source_drains_in_order() -> EngineResult<()> {
        let mut source = MockReportSource::new();
        source.push(Report::with_timestamp(1, 0, vec![0]));
        source.push(Report::with_timestamp(2, 0, vec![1]));

        let timeout = Duration::from_millis(1);
        assert_eq!(source.read_report(timeout)?.map(|r| r.sequence), Some(1));
        assert_eq!(source.read_report(timeout)?.map(|r| r.sequence), Some(2));
        assert_eq!(source.read_report(timeout)?, None);
        Ok(())
    }

    #[test]
    fn test_mock_source_failure() {
        let mut source = MockReportSource::new();
        source.fail("unplugged");
        assert!(matches!(
            source.read_report(Duration::ZERO),
            Err(EngineError::Source(reason)) if reason == "unplugged"
        ));
    }
}
