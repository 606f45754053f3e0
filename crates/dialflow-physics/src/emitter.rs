//! Threshold emitter over a continuous wheel position.

use crate::error::{PhysicsError, PhysicsResult};
use crate::wheel::Direction;
use serde::{Deserialize, Serialize};

/// Position distance that produces one token.
pub const DEFAULT_THRESHOLD: f64 = 10.0;

/// Most tokens a single [`ImpulseEmitter::observe`] call returns.
pub const MAX_TOKENS_PER_OBSERVE: usize = 4096;

/// Token vocabulary selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenMode {
    /// Default vocabulary.
    #[default]
    Primary,
    /// Alternate vocabulary.
    Alternate,
}

impl TokenMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            TokenMode::Primary => TokenMode::Alternate,
            TokenMode::Alternate => TokenMode::Primary,
        }
    }
}

/// One discrete output step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectionToken {
    /// Direction of the step.
    pub direction: Direction,
    /// Vocabulary active when the token was produced.
    pub mode: TokenMode,
}

/// Turns position travel into whole tokens, keeping the remainder.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseEmitter {
    threshold: f64,
    last_emitted: f64,
    mode: TokenMode,
}

impl Default for ImpulseEmitter {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            last_emitted: 0.0,
            mode: TokenMode::Primary,
        }
    }
}

impl ImpulseEmitter {
    /// Emitter with the default threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emitter with a custom threshold.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidThreshold`] unless `threshold` is finite
    /// and positive.
    pub fn with_threshold(threshold: f64) -> PhysicsResult<Self> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(PhysicsError::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            ..Self::default()
        })
    }

    /// Emit one token per full threshold travelled since the last emission.
    ///
    /// At most [`MAX_TOKENS_PER_OBSERVE`] tokens are returned. Travel beyond
    /// that is skipped in whole thresholds, so the sub-threshold residual is
    /// kept but the dropped tokens are never emitted.
    ///
    /// # Panics
    ///
    /// Panics if `position` is not finite. Positions come from the wheel model,
    /// which only produces finite values.
    pub fn observe(&mut self, position: f64) -> Vec<DirectionToken> {
        assert!(position.is_finite(), "wheel position must be finite");

        let delta = position - self.last_emitted;
        if delta.abs() < self.threshold {
            return Vec::new();
        }

        let direction = if delta > 0.0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        };
        let step = self.threshold * direction.sign();

        let mut tokens = Vec::new();
        while (position - self.last_emitted) * direction.sign() >= self.threshold {
            let next = self.last_emitted + step;
            if next.to_bits() == self.last_emitted.to_bits() {
                // Step lost to float precision; resync.
                self.last_emitted = position;
                break;
            }
            self.last_emitted = next;
            tokens.push(DirectionToken {
                direction,
                mode: self.mode,
            });
            if tokens.len() == MAX_TOKENS_PER_OBSERVE {
                self.skip_whole_thresholds(position, step);
                break;
            }
        }
        tokens
    }

    fn skip_whole_thresholds(&mut self, position: f64, step: f64) {
        let whole = ((position - self.last_emitted) / step).floor();
        if whole >= 1.0 {
            self.last_emitted += whole * step;
            tracing::warn!(
                skipped = whole,
                emitted = MAX_TOKENS_PER_OBSERVE,
                "Token burst capped"
            );
        }
    }

    /// Position at which the last token was counted.
    pub fn last_emitted(&self) -> f64 {
        self.last_emitted
    }

    /// Distance per token.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Current vocabulary.
    pub fn mode(&self) -> TokenMode {
        self.mode
    }

    /// Select the vocabulary for subsequent tokens.
    pub fn set_mode(&mut self, mode: TokenMode) {
        self.mode = mode;
    }

    /// Switch vocabulary. Returns the new mode.
    pub fn toggle_mode(&mut self) -> TokenMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    /// Forget emitted travel. The mode is kept.
    pub fn reset(&mut self) {
        self.last_emitted = 0.0;
    }
}
