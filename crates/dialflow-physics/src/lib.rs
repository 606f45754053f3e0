//! Inertial wheel model for dial input
//!
//! Turns discrete wheel rotation impulses into smooth motion sampled on a fixed
//! tick, and turns that motion back into discrete direction tokens.
//!
//! - [`WheelPhysics`]: velocity, friction decay and sensitivity-scaled position
//! - [`ImpulseEmitter`]: one token per threshold of position travel
//! - [`TuningHandle`]: shared friction and sensitivity with per-tick snapshots
//!
//! # Example
//!
//! ```
//! use dialflow_physics::prelude::*;
//! use std::time::Instant;
//!
//! let tuning = TuningParameters::default();
//! let mut wheel = WheelPhysics::new();
//! let mut emitter = ImpulseEmitter::new();
//!
//! let now = Instant::now();
//! wheel.on_impulse(20.0, Direction::Clockwise, &tuning, now);
//! let mut tokens = Vec::new();
//! for i in 1..=5u32 {
//!     if let TickOutcome::Advanced { position, .. } =
//!         wheel.tick(&tuning, now + TICK_PERIOD * i)
//!     {
//!         tokens.extend(emitter.observe(position));
//!     }
//! }
//! assert!(!tokens.is_empty());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod emitter;
pub mod error;
pub mod prelude;
pub mod tuning;
pub mod wheel;

pub use emitter::{DirectionToken, ImpulseEmitter, TokenMode};
pub use error::{PhysicsError, PhysicsResult};
pub use tuning::{TuningHandle, TuningParameters};
pub use wheel::{Direction, TickOutcome, WheelPhysics, WheelSnapshot};
