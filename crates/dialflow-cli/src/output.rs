//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use dialflow_engine::prelude::*;
use serde_json::json;

/// Prints decoded reports and tokens as they happen.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    json: bool,
}

impl ConsoleSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl EventSink for ConsoleSink {
    fn publish(&self, report: &DecodedReport) {
        if self.json {
            print_json(report);
            return;
        }
        println!("{} {}", format!("#{:<5}", report.count).dimmed(), report.hex);
        for event in &report.events {
            println!("    {}", describe_event(event));
        }
    }
}

impl OutputSink for ConsoleSink {
    fn emit(&self, wheel: &str, token: DirectionToken) {
        if self.json {
            print_json(&json!({ "wheel": wheel, "token": token }));
        } else {
            println!("    {} {}", "token".cyan(), describe_token(wheel, token));
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format output as JSON: {e}"),
    }
}

/// One-line human rendering of an event.
pub fn describe_event(event: &Event) -> String {
    match event {
        Event::Button {
            name,
            action,
            byte_index,
            value,
        } => format!(
            "{} {} {:?} (byte {byte_index} = 0x{value:02x})",
            "button".green(),
            name.bold(),
            action
        ),
        Event::Scroll {
            name,
            direction,
            magnitude,
            running_position,
            ..
        } => format!(
            "{} {} {:?} x{magnitude} (position {running_position})",
            "scroll".blue(),
            name.bold(),
            direction
        ),
        Event::Value {
            name,
            previous,
            current,
            ..
        } => format!(
            "{} {} 0x{previous:02x} -> 0x{current:02x}",
            "value".yellow(),
            name
        ),
    }
}

/// One-line human rendering of a token.
pub fn describe_token(wheel: &str, token: DirectionToken) -> String {
    let arrow = match token.direction {
        Direction::Clockwise => "cw",
        Direction::CounterClockwise => "ccw",
    };
    let mode = match token.mode {
        TokenMode::Primary => "primary",
        TokenMode::Alternate => "alternate",
    };
    format!("{wheel} {arrow} ({mode})")
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    print_json(&json!({
        "success": false,
        "error": { "message": error.to_string() }
    }));
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);
    for err in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_token_when_described_then_wheel_direction_and_mode_shown() {
        colored::control::set_override(false);
        let token = DirectionToken {
            direction: Direction::CounterClockwise,
            mode: TokenMode::Alternate,
        };
        assert_eq!(describe_token("Jog", token), "Jog ccw (alternate)");
    }

    #[test]
    fn given_scroll_event_when_described_then_position_shown() {
        colored::control::set_override(false);
        let event = Event::Scroll {
            name: "Scroll".to_string(),
            byte_index: 6,
            direction: ScrollDirection::Up,
            magnitude: 3,
            running_position: 12,
        };
        assert_eq!(describe_event(&event), "scroll Scroll Up x3 (position 12)");
    }
}
