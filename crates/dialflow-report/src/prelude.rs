//! Prelude for the report crate.
//!
//! ```
//! use dialflow_report::prelude::*;
//!
//! let mut state = DecoderState::new();
//! let out = decode(&Report::new(1, vec![0; 8]), &DecoderConfig::default(), &mut state)?;
//! assert_eq!(out.count, 1);
//! # Ok::<(), DecodeError>(())
//! ```

pub use crate::config::{ButtonMap, DecoderConfig, ScrollWheelMap};
pub use crate::decoder::{DecoderState, decode};
pub use crate::error::{DecodeError, DecodeResult, MappingError};
pub use crate::event::{ButtonAction, ByteDelta, DecodedReport, Event, ScrollDirection};
pub use crate::report::{Report, parse_hex, to_hex};
pub use crate::{PRODUCT_ID_MX_DIALPAD, VENDOR_ID_LOGITECH};
