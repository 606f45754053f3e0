//! Inertial wheel model.
//!
//! Rotation impulses pull the wheel velocity toward a target proportional to
//! the impulse size. While impulses keep arriving the velocity holds; once they
//! stop for longer than [`DECAY_DELAY`], every tick multiplies the velocity by
//! the friction-dependent decay rate until it drops below
//! [`VELOCITY_THRESHOLD`].
//!
//! The model does not read a clock. Callers pass `now` into every operation,
//! which keeps it deterministic under test.

use crate::tuning::TuningParameters;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Below this absolute velocity a wheel is considered stopped.
pub const VELOCITY_THRESHOLD: f64 = 0.1;

/// Target velocity per unit of impulse.
pub const TARGET_MULTIPLIER: f64 = 2.5;

/// Time without input after which friction starts to act.
pub const DECAY_DELAY: Duration = Duration::from_millis(50);

/// Nominal tick period of the fixed-rate driver.
pub const TICK_PERIOD: Duration = Duration::from_millis(16);

/// Rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Positive rotation.
    Clockwise,
    /// Negative rotation.
    CounterClockwise,
}

impl Direction {
    /// `1.0` for clockwise, `-1.0` for counter-clockwise.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Clockwise => 1.0,
            Direction::CounterClockwise => -1.0,
        }
    }
}

/// Result of one [`WheelPhysics::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Wheel was not moving; nothing changed.
    Idle,
    /// Wheel came to rest on this tick.
    Settled,
    /// Wheel moved.
    Advanced {
        /// Position after the step.
        position: f64,
        /// Velocity after decay.
        velocity: f64,
        /// Position change applied by this tick.
        step: f64,
    },
}

/// Serializable view of a wheel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelSnapshot {
    /// Accumulated position.
    pub position: f64,
    /// Current velocity.
    pub velocity: f64,
    /// Whether the wheel is between an impulse and settling.
    pub running: bool,
}

/// Velocity, position and activity of one wheel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WheelPhysics {
    position: f64,
    velocity: f64,
    last_input: Option<Instant>,
    running: bool,
}

impl WheelPhysics {
    /// A wheel at rest at position zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a rotation impulse of size `amount`.
    ///
    /// Returns `true` if the wheel was idle and is now running. A non-finite or
    /// negative amount is ignored.
    pub fn on_impulse(
        &mut self,
        amount: f64,
        direction: Direction,
        tuning: &TuningParameters,
        now: Instant,
    ) -> bool {
        if !amount.is_finite() || amount < 0.0 {
            tracing::warn!(amount, "Ignoring invalid impulse amount");
            return false;
        }

        let target = amount * TARGET_MULTIPLIER * direction.sign();
        self.velocity += (target - self.velocity) * tuning.acceleration_rate();
        self.last_input = Some(now);

        let started = !self.running;
        self.running = true;
        if started {
            tracing::trace!(velocity = self.velocity, "Wheel started");
        }
        started
    }

    /// Advance the wheel by one tick.
    pub fn tick(&mut self, tuning: &TuningParameters, now: Instant) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        if self.velocity.abs() < VELOCITY_THRESHOLD {
            return self.settle();
        }

        let coasting = self
            .last_input
            .is_none_or(|last| now.saturating_duration_since(last) > DECAY_DELAY);
        if coasting {
            self.velocity *= tuning.decay_rate();
            if self.velocity.abs() < VELOCITY_THRESHOLD {
                return self.settle();
            }
        }

        let step = self.velocity * tuning.sensitivity_scale();
        self.position += step;
        TickOutcome::Advanced {
            position: self.position,
            velocity: self.velocity,
            step,
        }
    }

    fn settle(&mut self) -> TickOutcome {
        self.velocity = 0.0;
        self.running = false;
        tracing::trace!(position = self.position, "Wheel settled");
        TickOutcome::Settled
    }

    /// Zero position and velocity and stop the wheel.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Accumulated position.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Time of the last impulse.
    pub fn last_input(&self) -> Option<Instant> {
        self.last_input
    }

    /// Whether the wheel is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Serializable view of the wheel.
    pub fn snapshot(&self) -> WheelSnapshot {
        WheelSnapshot {
            position: self.position,
            velocity: self.velocity,
            running: self.running,
        }
    }
}
