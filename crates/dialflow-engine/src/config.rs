//! Engine configuration.
//!
//! The serialized form is flat, matching the device configuration files:
//!
//! ```json
//! {
//!   "buttons": { "1:8": "TopLeft" },
//!   "scrollWheels": { "6": "Scroll", "7": "Jog" },
//!   "friction": 50,
//!   "sensitivity": 50,
//!   "modeToggleButton": "TopLeft",
//!   "tickPeriodMs": 16
//! }
//! ```
//!
//! Every key is optional. Unknown keys are ignored.

use crate::error::{ConfigError, ConfigResult};
use dialflow_physics::TuningParameters;
use dialflow_report::DecoderConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default tick period in milliseconds.
pub const DEFAULT_TICK_PERIOD_MS: u64 = 16;

/// Longest accepted tick period in milliseconds.
pub const MAX_TICK_PERIOD_MS: u64 = 1_000;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Byte mapping used by the decoder.
    #[serde(flatten)]
    pub decoder: DecoderConfig,
    /// Initial friction and sensitivity.
    #[serde(flatten)]
    pub tuning: TuningParameters,
    /// Button whose press toggles the token mode of every wheel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_toggle_button: Option<String>,
    /// Physics tick period in milliseconds.
    pub tick_period_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decoder: DecoderConfig::default(),
            tuning: TuningParameters::default(),
            mode_toggle_button: None,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
        }
    }
}

impl EngineConfig {
    /// Configuration for the MX Dialpad.
    pub fn mx_dialpad() -> Self {
        Self {
            decoder: DecoderConfig::mx_dialpad(),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON or mapping keys and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// errors of [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            buttons = config.decoder.buttons.len(),
            wheels = config.decoder.scroll_wheels.len(),
            "Loaded engine configuration"
        );
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tick_period_ms == 0 || self.tick_period_ms > MAX_TICK_PERIOD_MS {
            return Err(ConfigError::invalid(format!(
                "tickPeriodMs must be in 1..={MAX_TICK_PERIOD_MS}, got {}",
                self.tick_period_ms
            )));
        }
        if let Some(button) = &self.mode_toggle_button
            && button.trim().is_empty()
        {
            return Err(ConfigError::invalid("modeToggleButton must not be empty"));
        }
        Ok(())
    }

    /// Tick period as a duration.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() -> ConfigResult<()> {
        let config = EngineConfig::default();
        config.validate()?;
        assert_eq!(config.tick_period(), Duration::from_millis(16));
        Ok(())
    }

    #[test]
    fn test_zero_tick_period_rejected() {
        let config = EngineConfig {
            tick_period_ms: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_blank_toggle_button_rejected() {
        let config = EngineConfig {
            mode_toggle_button: Some("  ".to_string()),
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_flat_json_shape() -> ConfigResult<()> {
        let config = EngineConfig::from_json_str(
            r#"{
                "buttons": { "1:8": "TopLeft" },
                "scrollWheels": { "6": "Scroll" },
                "friction": 80,
                "sensitivity": 20,
                "modeToggleButton": "TopLeft",
                "theme": "dark"
            }"#,
        )?;
        assert_eq!(config.decoder.buttons.resolve(1, 8), Some("TopLeft"));
        assert_eq!(config.decoder.scroll_wheels.get(6), Some("Scroll"));
        assert!((config.tuning.friction() - 80.0).abs() < f64::EPSILON);
        assert!((config.tuning.sensitivity() - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.mode_toggle_button.as_deref(), Some("TopLeft"));
        assert_eq!(config.tick_period_ms, DEFAULT_TICK_PERIOD_MS);
        Ok(())
    }
}
