//! Report diffing and byte classification.
//!
//! Each call to [`decode`] compares one report against the previous report of
//! the session and classifies every changed byte. Classification order for a
//! changed byte is fixed:
//!
//! 1. configured scroll wheel
//! 2. configured button, unless the byte already carries a running scroll
//!    position in this session
//! 3. heuristics for bytes with no mapping
//!
//! Configured wheels that hold the same non-zero velocity code across reports
//! keep producing scroll events: a constant code means constant rotation.

use crate::config::DecoderConfig;
use crate::error::{DecodeError, DecodeResult};
use crate::event::{ButtonAction, ByteDelta, DecodedReport, Event, ScrollDirection};
use crate::report::{Report, to_hex};

/// Largest absolute change on a non-zero byte treated as an incremental scroll.
pub const SMALL_SCROLL_DIFF: i16 = 5;

/// Session memory of the decoder.
///
/// Scroll positions live in a slot per byte index, sized from the first report
/// of the session. A slot is `None` until its byte is classified as a wheel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderState {
    previous: Option<Vec<u8>>,
    scroll_positions: Vec<Option<i64>>,
    report_count: u64,
}

impl DecoderState {
    /// Fresh state for a new session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; the next report is treated as the first of a session.
    pub fn reset(&mut self) {
        self.previous = None;
        self.scroll_positions.clear();
        self.report_count = 0;
    }

    /// Reports accepted in this session.
    pub fn report_count(&self) -> u64 {
        self.report_count
    }

    /// Payload of the last accepted report.
    pub fn previous(&self) -> Option<&[u8]> {
        self.previous.as_deref()
    }

    /// Running scroll position of a byte, if it has been classified as a wheel.
    pub fn scroll_position(&self, index: usize) -> Option<i64> {
        self.scroll_positions.get(index).copied().flatten()
    }

    /// Whether a byte has been classified as a wheel in this session.
    pub fn is_scroll_index(&self, index: usize) -> bool {
        self.scroll_position(index).is_some()
    }

    /// Decode a report against this state.
    pub fn decode(&mut self, report: &Report, config: &DecoderConfig) -> DecodeResult<DecodedReport> {
        decode(report, config, self)
    }
}

/// Decode one report.
///
/// The first report of a session only primes the state and yields no events.
/// A report whose length differs from the previous one is rejected and leaves
/// `state` untouched.
pub fn decode(
    report: &Report,
    config: &DecoderConfig,
    state: &mut DecoderState,
) -> DecodeResult<DecodedReport> {
    let bytes = report.bytes.as_slice();

    if let Some(previous) = &state.previous
        && previous.len() != bytes.len()
    {
        tracing::warn!(
            expected = previous.len(),
            actual = bytes.len(),
            sequence = report.sequence,
            "Rejecting report with mismatched length"
        );
        return Err(DecodeError::LengthMismatch {
            expected: previous.len(),
            actual: bytes.len(),
        });
    }

    state.report_count = state.report_count.saturating_add(1);

    let mut decoded = DecodedReport {
        count: state.report_count,
        sequence: report.sequence,
        timestamp_ms: report.timestamp_ms,
        raw: bytes.to_vec(),
        hex: to_hex(bytes),
        events: Vec::new(),
        deltas: Vec::new(),
    };

    let Some(previous) = state.previous.take() else {
        tracing::debug!(len = bytes.len(), "First report of session");
        state.scroll_positions = vec![None; bytes.len()];
        state.previous = Some(bytes.to_vec());
        return Ok(decoded);
    };

    let mut classifier = Classifier {
        config,
        slots: &mut state.scroll_positions,
    };

    for (index, (&prev, &curr)) in previous.iter().zip(bytes).enumerate() {
        if prev == curr {
            if curr != 0
                && let Some(name) = config.scroll_wheels.get(index)
                && let Some(event) = classifier.scroll(index, name, curr)
            {
                decoded.events.push(event);
            }
            continue;
        }

        decoded.deltas.push(ByteDelta::new(index, prev, curr));
        if let Some(event) = classifier.classify(index, prev, curr) {
            tracing::trace!(?event, "Classified byte change");
            decoded.events.push(event);
        }
    }

    decoded.events.sort_by_key(|e| (e.byte_index(), e.rank()));
    state.previous = Some(bytes.to_vec());
    Ok(decoded)
}

struct Classifier<'a> {
    config: &'a DecoderConfig,
    slots: &'a mut Vec<Option<i64>>,
}

impl Classifier<'_> {
    fn classify(&mut self, index: usize, prev: u8, curr: u8) -> Option<Event> {
        let config = self.config;
        if let Some(name) = config.scroll_wheels.get(index) {
            return self.scroll(index, name, curr);
        }

        let scroll_active = self.slots.get(index).is_some_and(Option::is_some);
        if !scroll_active && config.buttons.covers_index(index) {
            return Some(self.configured_button(index, prev, curr));
        }

        self.heuristic(index, prev, curr, scroll_active)
    }

    /// Apply a velocity code to a wheel. A zero code is a stopped wheel.
    fn scroll(&mut self, index: usize, name: &str, code: u8) -> Option<Event> {
        let (direction, magnitude) = ScrollDirection::from_velocity_code(code)?;
        Some(self.advance(index, name, direction, magnitude))
    }

    fn advance(
        &mut self,
        index: usize,
        name: &str,
        direction: ScrollDirection,
        magnitude: u8,
    ) -> Event {
        let step = direction.sign() * i64::from(magnitude);
        let running_position = match self.slots.get_mut(index) {
            Some(slot) => {
                let position = slot.get_or_insert(0);
                *position = position.saturating_add(step);
                *position
            }
            None => step,
        };

        Event::Scroll {
            name: name.to_string(),
            byte_index: index,
            direction,
            magnitude,
            running_position,
        }
    }

    fn configured_button(&self, index: usize, prev: u8, curr: u8) -> Event {
        let (action, value) = button_edge(prev, curr);
        match self.config.buttons.resolve(index, value) {
            Some(name) => Event::Button {
                name: name.to_string(),
                action,
                byte_index: index,
                value,
            },
            None => value_event(index, prev, curr),
        }
    }

    fn heuristic(
        &mut self,
        index: usize,
        prev: u8,
        curr: u8,
        scroll_active: bool,
    ) -> Option<Event> {
        let name = synthetic_name(index);

        if scroll_active || same_velocity_half(prev, curr) {
            return self.scroll(index, &name, curr);
        }

        if prev == 0 || curr == 0 {
            let (action, value) = button_edge(prev, curr);
            return Some(Event::Button {
                name,
                action,
                byte_index: index,
                value,
            });
        }

        let diff = i16::from(curr) - i16::from(prev);
        if diff.abs() <= SMALL_SCROLL_DIFF {
            let direction = if diff > 0 {
                ScrollDirection::Up
            } else {
                ScrollDirection::Down
            };
            let magnitude = u8::try_from(diff.unsigned_abs()).unwrap_or(u8::MAX);
            return Some(self.advance(index, &name, direction, magnitude));
        }

        Some(value_event(index, prev, curr))
    }
}

fn button_edge(prev: u8, curr: u8) -> (ButtonAction, u8) {
    match (prev, curr) {
        (0, _) => (ButtonAction::Press, curr),
        (_, 0) => (ButtonAction::Release, prev),
        _ => (ButtonAction::Change, curr),
    }
}

/// Both values are non-zero velocity codes pointing the same way.
fn same_velocity_half(prev: u8, curr: u8) -> bool {
    prev != 0 && curr != 0 && (prev < 128) == (curr < 128)
}

fn synthetic_name(index: usize) -> String {
    format!("Byte{index}")
}

fn value_event(index: usize, prev: u8, curr: u8) -> Event {
    Event::Value {
        name: synthetic_name(index),
        byte_index: index,
        previous: prev,
        current: curr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(seq: u64, bytes: &[u8]) -> Report {
        Report::with_timestamp(seq, 0, bytes.to_vec())
    }

    #[test]
    fn test_first_report_primes_state() -> DecodeResult<()> {
        let mut state = DecoderState::new();
        let out = decode(&report(1, &[1, 2, 3]), &DecoderConfig::default(), &mut state)?;

        assert!(out.events.is_empty());
        assert!(out.deltas.is_empty());
        assert_eq!(out.count, 1);
        assert_eq!(out.hex, "01 02 03");
        assert_eq!(state.previous(), Some(&[1u8, 2, 3][..]));
        Ok(())
    }

    #[test]
    fn test_configured_button_press_and_release() -> DecodeResult<()> {
        let config = DecoderConfig::mx_dialpad();
        let mut state = DecoderState::new();
        decode(&report(1, &[0; 8]), &config, &mut state)?;

        let pressed = decode(&report(2, &[0, 8, 0, 0, 0, 0, 0, 0]), &config, &mut state)?;
        assert_eq!(
            pressed.events,
            vec![Event::Button {
                name: "TopLeft".to_string(),
                action: ButtonAction::Press,
                byte_index: 1,
                value: 8,
            }]
        );

        let released = decode(&report(3, &[0; 8]), &config, &mut state)?;
        assert_eq!(
            released.events,
            vec![Event::Button {
                name: "TopLeft".to_string(),
                action: ButtonAction::Release,
                byte_index: 1,
                value: 8,
            }]
        );
        Ok(())
    }

    #[test]
    fn test_configured_button_change() -> DecodeResult<()> {
        let config = DecoderConfig::mx_dialpad();
        let mut state = DecoderState::new();
        decode(&report(1, &[0, 8, 0, 0, 0, 0, 0, 0]), &config, &mut state)?;

        let out = decode(&report(2, &[0, 16, 0, 0, 0, 0, 0, 0]), &config, &mut state)?;
        assert!(matches!(
            out.events.as_slice(),
            [Event::Button { name, action: ButtonAction::Change, value: 16, .. }] if name == "TopRight"
        ));
        Ok(())
    }

    #[test]
    fn test_unresolved_value_on_button_byte_is_diagnostic() -> DecodeResult<()> {
        let config = DecoderConfig::mx_dialpad();
        let mut state = DecoderState::new();
        decode(&report(1, &[0, 8, 0, 0, 0, 0, 0, 0]), &config, &mut state)?;

        // Two buttons held at once: 8 | 16 has no exact entry.
        let out = decode(&report(2, &[0, 24, 0, 0, 0, 0, 0, 0]), &config, &mut state)?;
        assert!(matches!(
            out.events.as_slice(),
            [Event::Value { byte_index: 1, previous: 8, current: 24, .. }]
        ));
        assert!(!state.is_scroll_index(1));
        Ok(())
    }

    #[test]
    fn test_heuristic_button_edges() -> DecodeResult<()> {
        let config = DecoderConfig::default();
        let mut state = DecoderState::new();
        decode(&report(1, &[0, 0]), &config, &mut state)?;

        let out = decode(&report(2, &[0, 4]), &config, &mut state)?;
        assert!(matches!(
            out.events.as_slice(),
            [Event::Button { name, action: ButtonAction::Press, byte_index: 1, value: 4 }] if name == "Byte1"
        ));

        let out = decode(&report(3, &[0, 0]), &config, &mut state)?;
        assert!(matches!(
            out.events.as_slice(),
            [Event::Button { action: ButtonAction::Release, value: 4, .. }]
        ));
        Ok(())
    }

    #[test]
    fn test_heuristic_scroll_claims_byte_for_session() -> DecodeResult<()> {
        let config = DecoderConfig::default();
        let mut state = DecoderState::new();
        decode(&report(1, &[2]), &config, &mut state)?;

        let out = decode(&report(2, &[3]), &config, &mut state)?;
        assert!(matches!(
            out.events.as_slice(),
            [Event::Scroll { direction: ScrollDirection::Up, magnitude: 3, running_position: 3, .. }]
        ));
        assert!(state.is_scroll_index(0));

        // Stopping must not read as a button release.
        let out = decode(&report(3, &[0]), &config, &mut state)?;
        assert!(out.events.is_empty());

        // Starting again from rest is still a scroll.
        let out = decode(&report(4, &[0xFE]), &config, &mut state)?;
        assert!(matches!(
            out.events.as_slice(),
            [Event::Scroll { direction: ScrollDirection::Down, magnitude: 2, running_position: 1, .. }]
        ));
        Ok(())
    }

    #[test]
    fn test_heuristic_small_diff_across_halves() -> DecodeResult<()> {
        let config = DecoderConfig::default();
        let mut state = DecoderState::new();
        decode(&report(1, &[126]), &config, &mut state)?;

        let out = decode(&report(2, &[129]), &config, &mut state)?;
        assert!(matches!(
            out.events.as_slice(),
            [Event::Scroll { direction: ScrollDirection::Up, magnitude: 3, .. }]
        ));
        Ok(())
    }

    #[test]
    fn test_heuristic_large_jump_is_value() -> DecodeResult<()> {
        let config = DecoderConfig::default();
        let mut state = DecoderState::new();
        decode(&report(1, &[0x10]), &config, &mut state)?;

        let out = decode(&report(2, &[0xF0]), &config, &mut state)?;
        assert!(matches!(
            out.events.as_slice(),
            [Event::Value { previous: 0x10, current: 0xF0, .. }]
        ));
        Ok(())
    }

    #[test]
    fn test_events_sorted_by_index() -> DecodeResult<()> {
        let config = DecoderConfig::mx_dialpad();
        let mut state = DecoderState::new();
        decode(&report(1, &[0; 8]), &config, &mut state)?;

        let out = decode(&report(2, &[0, 32, 0, 0, 0, 0, 1, 0xFF]), &config, &mut state)?;
        let indices: Vec<usize> = out.events.iter().map(Event::byte_index).collect();
        assert_eq!(indices, vec![1, 6, 7]);
        assert_eq!(out.deltas.len(), 3);
        Ok(())
    }

    #[test]
    fn test_reset_starts_new_session() -> DecodeResult<()> {
        let config = DecoderConfig::mx_dialpad();
        let mut state = DecoderState::new();
        decode(&report(1, &[0; 8]), &config, &mut state)?;
        decode(&report(2, &[0, 0, 0, 0, 0, 0, 5, 0]), &config, &mut state)?;
        assert_eq!(state.scroll_position(6), Some(5));

        state.reset();
        assert_eq!(state.report_count(), 0);
        assert_eq!(state.previous(), None);
        assert_eq!(state.scroll_position(6), None);

        let out = decode(&report(3, &[0, 0, 0, 0, 0, 0, 5, 0]), &config, &mut state)?;
        assert!(out.events.is_empty());
        Ok(())
    }
}
