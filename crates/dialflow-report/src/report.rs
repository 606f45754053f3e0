//! Raw input report snapshots.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// One fixed-length snapshot of device input state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Sequence number assigned by the source, monotonically increasing.
    pub sequence: u64,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Report payload.
    pub bytes: Vec<u8>,
}

impl Report {
    /// Create a report stamped with the current wall-clock time.
    pub fn new(sequence: u64, bytes: impl Into<Vec<u8>>) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        Self::with_timestamp(sequence, timestamp_ms, bytes)
    }

    /// Create a report with an explicit capture time.
    pub fn with_timestamp(sequence: u64, timestamp_ms: u64, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            sequence,
            timestamp_ms,
            bytes: bytes.into(),
        }
    }

    /// Number of bytes in the payload.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercase hex rendering, two digits per byte, space separated.
    pub fn hex(&self) -> String {
        to_hex(&self.bytes)
    }
}

/// Render bytes as `"0a ff 00"`.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push(hex_digit(b >> 4));
        out.push(hex_digit(b & 0x0f));
    }
    out
}

fn hex_digit(nibble: u8) -> char {
    char::from_digit(u32::from(nibble), 16).unwrap_or('0')
}

/// Parse a hex string such as `"00 0a ff"` or `"0x00 0x0A 0xFF"`.
///
/// Returns `None` if any token is not a valid byte.
pub fn parse_hex(text: &str) -> Option<Vec<u8>> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            let digits = tok.trim_start_matches("0x").trim_start_matches("0X");
            u8::from_str_radix(digits, 16).ok()
        })
        .collect()
}
