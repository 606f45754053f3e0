//! Dial pad session engine
//!
//! Ties the report decoder to per-wheel physics:
//!
//! ```text
//! ReportSource -> DialEngine::process_report -> EventSink
//!                        |
//!                        v  scroll events
//!                  WheelPhysics (per wheel)
//!                        |
//!                        v  DialEngine::tick (TickDriver)
//!                  ImpulseEmitter -> OutputSink
//! ```
//!
//! # Example
//!
//! ```
//! use dialflow_engine::prelude::*;
//! use std::time::{Duration, Instant};
//!
//! let engine = DialEngine::new(EngineConfig::mx_dialpad());
//! engine.connect();
//!
//! let start = Instant::now();
//! engine.process_report_at(&Report::new(1, vec![0; 8]), start)?;
//! engine.process_report_at(&Report::new(2, vec![0, 0, 0, 0, 0, 0, 20, 0]), start)?;
//!
//! let mut tokens = Vec::new();
//! for i in 1..=10u32 {
//!     tokens.extend(engine.tick_at(start + Duration::from_millis(16) * i));
//! }
//! assert!(tokens.iter().all(|t| t.wheel == "Scroll"));
//! assert!(!tokens.is_empty());
//! # Ok::<(), EngineError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod sink;

pub use config::EngineConfig;
pub use driver::TickDriver;
pub use engine::{DialEngine, EmittedToken, EngineStatus};
pub use error::{ConfigError, ConfigResult, EngineError, EngineResult};
pub use sink::{EventSink, OutputSink, ReportSource};
