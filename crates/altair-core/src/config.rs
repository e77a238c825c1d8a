//! Signal chain configuration.
//!
//! Fixed for the lifetime of an engine: the hop length in particular sizes
//! every block buffer and the convolver's partitions.
//!
//! ```
//! use altair_core::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(
//!     r#"
//!     sample_rate = 48000.0
//!     hop_length = 128
//!     "#,
//! )?;
//! assert_eq!(config.hop_length, 128);
//! assert_eq!(config.max_delay_secs, 2.0);
//! # Ok::<(), altair_core::Error>(())
//! ```

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration for the signal chain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Samples per callback (L). Power of two.
    pub hop_length: usize,
    /// Delay line capacity in seconds.
    pub max_delay_secs: f32,
    /// Ramp time for input gain and output level changes.
    pub smoothing_secs: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            hop_length: 256,
            max_delay_secs: 2.0,
            smoothing_secs: 0.010,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8000.0..=384000.0).contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if self.hop_length == 0 || !self.hop_length.is_power_of_two() {
            return Err(Error::InvalidHopLength(self.hop_length));
        }
        if !(self.max_delay_secs > 0.0 && self.max_delay_secs <= 10.0) {
            return Err(Error::InvalidConfig(format!(
                "max_delay_secs {} out of range (0-10 s)",
                self.max_delay_secs
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing_secs) {
            return Err(Error::InvalidConfig(format!(
                "smoothing_secs {} out of range (0-1 s)",
                self.smoothing_secs
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Callback deadline in seconds (hop length / sample rate).
    pub fn block_deadline_secs(&self) -> f32 {
        self.hop_length as f32 / self.sample_rate
    }

    /// Delay line capacity in samples.
    pub fn max_delay_samples(&self) -> usize {
        (self.max_delay_secs * self.sample_rate).ceil() as usize + 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.sample_rate, 48000.0);
        assert_eq!(config.hop_length, 256);
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.block_deadline_secs(), 256.0 / 48000.0);
    }

    #[test]
    fn test_rejects_non_power_of_two_hop() {
        let config = EngineConfig {
            hop_length: 250,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidHopLength(250))));

        let config = EngineConfig {
            hop_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_sample_rate() {
        let config = EngineConfig {
            sample_rate: 100.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_toml_partial_override() {
        let config = EngineConfig::from_toml_str("max_delay_secs = 1.5").unwrap();
        assert_eq!(config.max_delay_secs, 1.5);
        assert_eq!(config.hop_length, 256);
    }

    #[test]
    fn test_toml_unknown_key_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("hop = 256"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_toml_invalid_value_rejected() {
        assert!(EngineConfig::from_toml_str("hop_length = 300").is_err());
    }
}
