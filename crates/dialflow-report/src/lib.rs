//! Input report decoding for multi-function dial pads
//!
//! A dial pad streams fixed-size input reports in which individual bytes carry
//! button bitmasks or wheel velocity codes. This crate diffs consecutive
//! reports and classifies each changed byte into a typed [`Event`].
//!
//! ## Features
//! - Configurable byte-to-name mapping for buttons (exact value or whole byte)
//!   and scroll wheels
//! - Velocity-code decoding for wheels (`1..=127` up, `128..=255` down)
//! - Per-session running scroll positions
//! - Constant-velocity continuation for wheels holding a non-zero code
//! - Heuristic classification for bytes that are not configured
//!
//! # Example
//!
//! ```
//! use dialflow_report::prelude::*;
//!
//! let config = DecoderConfig::mx_dialpad();
//! let mut state = DecoderState::new();
//!
//! let first = decode(&Report::new(1, vec![0; 8]), &config, &mut state)?;
//! assert!(first.events.is_empty());
//!
//! let mut bytes = vec![0; 8];
//! bytes[6] = 3;
//! let second = decode(&Report::new(2, bytes), &config, &mut state)?;
//! assert_eq!(second.events.len(), 1);
//! # Ok::<(), DecodeError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod config;
pub mod decoder;
pub mod error;
pub mod event;
pub mod prelude;
pub mod report;

pub use config::{ButtonMap, DecoderConfig, ScrollWheelMap};
pub use decoder::{DecoderState, decode};
pub use error::{DecodeError, DecodeResult, MappingError};
pub use event::{ButtonAction, ByteDelta, DecodedReport, Event, ScrollDirection};
pub use report::Report;

/// Vendor ID of the reference dial pad.
pub const VENDOR_ID_LOGITECH: u16 = 0x046D;

/// Product ID of the reference dial pad.
pub const PRODUCT_ID_MX_DIALPAD: u16 = 0xBC00;
