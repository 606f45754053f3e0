//! Decoded events and per-report decode results.

use serde::{Deserialize, Serialize};

/// Button transition kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    /// Byte went from zero to non-zero.
    Press,
    /// Byte went from non-zero to zero.
    Release,
    /// Byte went from one non-zero value to another.
    Change,
}

/// Wheel rotation direction as reported by the device.
///
/// `Up` is clockwise rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    /// Velocity code in `1..=127`.
    Up,
    /// Velocity code in `128..=255`.
    Down,
}

impl ScrollDirection {
    /// `+1` for up, `-1` for down.
    pub fn sign(self) -> i64 {
        match self {
            ScrollDirection::Up => 1,
            ScrollDirection::Down => -1,
        }
    }

    /// Decode a wheel velocity code.
    ///
    /// Returns `None` for `0` (wheel at rest). Codes `1..=127` rotate up by
    /// the code, codes `128..=255` rotate down by `256 - code`.
    pub fn from_velocity_code(code: u8) -> Option<(Self, u8)> {
        match code {
            0 => None,
            1..=127 => Some((ScrollDirection::Up, code)),
            _ => Some((ScrollDirection::Down, 0u8.wrapping_sub(code))),
        }
    }
}

/// A typed event decoded from one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    /// A button edge.
    Button {
        /// Configured or synthetic button name.
        name: String,
        /// Edge kind.
        action: ButtonAction,
        /// Byte carrying the button.
        byte_index: usize,
        /// Byte value that identifies the button: the new value for press and
        /// change, the previous value for release.
        value: u8,
    },
    /// A wheel rotation step.
    Scroll {
        /// Configured or synthetic wheel name.
        name: String,
        /// Byte carrying the wheel.
        byte_index: usize,
        /// Rotation direction.
        direction: ScrollDirection,
        /// Step size, `1..=128`.
        magnitude: u8,
        /// Running total for this wheel in the current session.
        running_position: i64,
    },
    /// A change the decoder could not classify.
    Value {
        /// Synthetic name of the byte.
        name: String,
        /// Byte that changed.
        byte_index: usize,
        /// Previous value.
        previous: u8,
        /// Current value.
        current: u8,
    },
}

impl Event {
    /// Byte index the event was decoded from.
    pub fn byte_index(&self) -> usize {
        match self {
            Event::Button { byte_index, .. }
            | Event::Scroll { byte_index, .. }
            | Event::Value { byte_index, .. } => *byte_index,
        }
    }

    /// Name of the button, wheel or byte.
    pub fn name(&self) -> &str {
        match self {
            Event::Button { name, .. } | Event::Scroll { name, .. } | Event::Value { name, .. } => {
                name
            }
        }
    }

    /// Whether this is a scroll event.
    pub fn is_scroll(&self) -> bool {
        matches!(self, Event::Scroll { .. })
    }

    /// Ordering rank within one byte index: scroll before button before value.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Event::Scroll { .. } => 0,
            Event::Button { .. } => 1,
            Event::Value { .. } => 2,
        }
    }
}

/// Raw change of one byte between two consecutive reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteDelta {
    /// Byte index.
    pub index: usize,
    /// Value in the previous report.
    pub previous: u8,
    /// Value in the current report.
    pub current: u8,
    /// `current - previous`.
    pub diff: i16,
}

impl ByteDelta {
    /// Build a delta for one byte.
    pub fn new(index: usize, previous: u8, current: u8) -> Self {
        Self {
            index,
            previous,
            current,
            diff: i16::from(current) - i16::from(previous),
        }
    }
}

/// Result of decoding one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedReport {
    /// Session report count after this report.
    pub count: u64,
    /// Sequence number of the source report.
    pub sequence: u64,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Copy of the report payload.
    pub raw: Vec<u8>,
    /// Hex rendering of the payload.
    pub hex: String,
    /// Decoded events in byte-index order.
    pub events: Vec<Event>,
    /// Raw per-byte changes against the previous report.
    pub deltas: Vec<ByteDelta>,
}

impl DecodedReport {
    /// Scroll events only.
    pub fn scroll_events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.is_scroll())
    }
}
