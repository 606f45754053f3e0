//! Prelude for the physics crate.

pub use crate::emitter::{
    DEFAULT_THRESHOLD, DirectionToken, ImpulseEmitter, MAX_TOKENS_PER_OBSERVE, TokenMode,
};
pub use crate::error::{PhysicsError, PhysicsResult};
pub use crate::tuning::{TuningHandle, TuningParameters};
pub use crate::wheel::{Direction, TICK_PERIOD, TickOutcome, WheelPhysics, WheelSnapshot};
