//! Capture files and offline replay.
//!
//! The file format is the one written by HID capture tools:
//!
//! ```json
//! {
//!   "vendor_id": "0x046D",
//!   "product_id": "0xBC00",
//!   "captures": [
//!     { "timestamp_us": 1000, "report_id": 0, "data": "0x00 0x00 0x00" }
//!   ]
//! }
//! ```

use crate::error::CliError;
use dialflow_engine::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

/// Upper bound on ticks run after the last capture while wheels coast.
const MAX_SETTLE_TICKS: u32 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureReport {
    pub timestamp_us: u64,
    pub report_id: u8,
    pub data: String,
}

impl CaptureReport {
    pub fn bytes(&self) -> Result<Vec<u8>, CliError> {
        parse_hex(&self.data).ok_or_else(|| CliError::InvalidReport(self.data.clone()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureFile {
    pub vendor_id: String,
    pub product_id: String,
    pub captures: Vec<CaptureReport>,
}

impl CaptureFile {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let json = std::fs::read_to_string(path)?;
        let file: Self = serde_json::from_str(&json)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<(), CliError> {
        let ordered = self
            .captures
            .windows(2)
            .all(|pair| matches!(pair, [a, b] if a.timestamp_us <= b.timestamp_us));
        if !ordered {
            return Err(CliError::InvalidCapture(
                "captures must be in timestamp order".to_string(),
            ));
        }
        Ok(())
    }
}

/// Counters from one replay run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub reports: usize,
    pub events: usize,
    pub tokens: usize,
    pub rejected: usize,
    pub ticks: u32,
}

/// Feed every capture through `engine` on a simulated clock starting at `base`.
///
/// Ticks fire every `period` between captures, and keep firing after the last
/// capture until every wheel has settled.
pub fn replay(
    engine: &DialEngine,
    capture: &CaptureFile,
    period: Duration,
    base: Instant,
) -> Result<ReplaySummary, CliError> {
    let period = period.max(Duration::from_millis(1));
    let mut summary = ReplaySummary::default();
    let mut next_tick = base + period;

    let first_us = capture.captures.first().map_or(0, |c| c.timestamp_us);
    engine.connect();

    for (sequence, entry) in capture.captures.iter().enumerate() {
        let offset = Duration::from_micros(entry.timestamp_us.saturating_sub(first_us));
        let now = base + offset;

        while next_tick <= now {
            summary.tokens += engine.tick_at(next_tick).len();
            summary.ticks += 1;
            next_tick += period;
        }

        let report = Report::with_timestamp(
            sequence as u64,
            entry.timestamp_us / 1_000,
            entry.bytes()?,
        );
        match engine.process_report_at(&report, now) {
            Ok(decoded) => {
                summary.reports += 1;
                summary.events += decoded.events.len();
            }
            Err(EngineError::Decode(err)) => {
                tracing::warn!(sequence, error = %err, "Capture rejected");
                summary.rejected += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    for _ in 0..MAX_SETTLE_TICKS {
        if engine.status().active_wheels.is_empty() {
            break;
        }
        summary.tokens += engine.tick_at(next_tick).len();
        summary.ticks += 1;
        next_tick += period;
    }

    engine.disconnect();
    Ok(summary)
}
