//! Friction and sensitivity tuning.
//!
//! Both values are dimensionless with `50` as the baseline. Out-of-range input
//! is clamped, never rejected.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Lowest accepted friction.
pub const FRICTION_MIN: f64 = 5.0;
/// Highest accepted friction.
pub const FRICTION_MAX: f64 = 100.0;
/// Lowest accepted sensitivity.
pub const SENSITIVITY_MIN: f64 = 1.0;
/// Highest accepted sensitivity.
pub const SENSITIVITY_MAX: f64 = 100.0;
/// Baseline for both friction and sensitivity.
pub const BASELINE: f64 = 50.0;

const MIN_FRICTION_FACTOR: f64 = 0.1;
const MAX_ACCELERATION_RATE: f64 = 0.5;
const BASE_ACCELERATION_RATE: f64 = 0.2;
const BASE_DECAY_LOSS: f64 = 0.08;
const DECAY_MIN: f64 = 0.8;
const DECAY_MAX: f64 = 0.99;

/// Friction and sensitivity, always within range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTuning", into = "RawTuning")]
pub struct TuningParameters {
    friction: f64,
    sensitivity: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct RawTuning {
    friction: f64,
    sensitivity: f64,
}

impl Default for RawTuning {
    fn default() -> Self {
        Self {
            friction: BASELINE,
            sensitivity: BASELINE,
        }
    }
}

impl From<RawTuning> for TuningParameters {
    fn from(raw: RawTuning) -> Self {
        Self::new(raw.friction, raw.sensitivity)
    }
}

impl From<TuningParameters> for RawTuning {
    fn from(params: TuningParameters) -> Self {
        Self {
            friction: params.friction,
            sensitivity: params.sensitivity,
        }
    }
}

fn clamp_or_baseline(value: f64, min: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        BASELINE
    }
}

impl TuningParameters {
    /// Create clamped parameters. Non-finite values fall back to the baseline.
    ///
    /// ```
    /// use dialflow_physics::TuningParameters;
    ///
    /// let tuning = TuningParameters::new(500.0, 0.0);
    /// assert_eq!(tuning.friction(), 100.0);
    /// assert_eq!(tuning.sensitivity(), 1.0);
    /// ```
    pub fn new(friction: f64, sensitivity: f64) -> Self {
        Self {
            friction: clamp_or_baseline(friction, FRICTION_MIN, FRICTION_MAX),
            sensitivity: clamp_or_baseline(sensitivity, SENSITIVITY_MIN, SENSITIVITY_MAX),
        }
    }

    /// Friction in `[5, 100]`.
    pub fn friction(&self) -> f64 {
        self.friction
    }

    /// Sensitivity in `[1, 100]`.
    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Copy with a new friction value.
    pub fn with_friction(self, friction: f64) -> Self {
        Self::new(friction, self.sensitivity)
    }

    /// Copy with a new sensitivity value.
    pub fn with_sensitivity(self, sensitivity: f64) -> Self {
        Self::new(self.friction, sensitivity)
    }

    /// Friction relative to baseline, floored at `0.1`.
    pub fn friction_factor(&self) -> f64 {
        (self.friction / BASELINE).max(MIN_FRICTION_FACTOR)
    }

    /// Fraction of the gap to the target velocity closed by one impulse.
    pub fn acceleration_rate(&self) -> f64 {
        (BASE_ACCELERATION_RATE / self.friction_factor()).min(MAX_ACCELERATION_RATE)
    }

    /// Per-tick velocity multiplier once input has stopped.
    pub fn decay_rate(&self) -> f64 {
        (1.0 - BASE_DECAY_LOSS * self.friction_factor()).clamp(DECAY_MIN, DECAY_MAX)
    }

    /// Velocity to position scale.
    pub fn sensitivity_scale(&self) -> f64 {
        self.sensitivity / BASELINE
    }
}

impl Default for TuningParameters {
    fn default() -> Self {
        Self::new(BASELINE, BASELINE)
    }
}

/// Shared tuning with a version counter.
///
/// Writers replace both values under one lock, so a [`snapshot`](Self::snapshot)
/// never mixes an old friction with a new sensitivity.
#[derive(Debug, Default)]
pub struct TuningHandle {
    params: RwLock<TuningParameters>,
    version: AtomicU64,
}

impl TuningHandle {
    /// Create a handle holding `params`.
    pub fn new(params: TuningParameters) -> Self {
        Self {
            params: RwLock::new(params),
            version: AtomicU64::new(0),
        }
    }

    /// Copy of the current parameters.
    pub fn snapshot(&self) -> TuningParameters {
        *self.params.read()
    }

    /// Copy of the current parameters with the version they belong to.
    pub fn versioned_snapshot(&self) -> (u64, TuningParameters) {
        let params = self.params.read();
        (self.version.load(Ordering::Acquire), *params)
    }

    /// Number of updates applied so far.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Replace both parameters.
    pub fn set(&self, params: TuningParameters) -> u64 {
        let mut guard = self.params.write();
        *guard = params;
        self.version.fetch_add(1, Ordering::AcqRel).saturating_add(1)
    }

    /// Update either parameter, keeping the other. Returns the new parameters.
    pub fn update(&self, friction: Option<f64>, sensitivity: Option<f64>) -> TuningParameters {
        let mut guard = self.params.write();
        let mut next = *guard;
        if let Some(friction) = friction {
            next = next.with_friction(friction);
        }
        if let Some(sensitivity) = sensitivity {
            next = next.with_sensitivity(sensitivity);
        }
        *guard = next;
        self.version.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(
            friction = next.friction(),
            sensitivity = next.sensitivity(),
            "Tuning updated"
        );
        next
    }
}
