//! Parameter snapshot published by the control loop.
//!
//! The audio callback copies one snapshot per block. Values are clamped into
//! their [`ParameterRanges`] when published, so the real-time side never has
//! to validate them.

use altair_core::ParameterRange;
use serde::Deserialize;

use crate::Result;

/// Every continuous and switched setting of the chain at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterSnapshot {
    /// Input gain ahead of the amp model, 0.1-2.5.
    pub gain: f32,
    /// Wet/dry balance of the reverb, 0 = dry.
    pub mix: f32,
    pub output_level: f32,
    /// Tone knob; below 0.5 darkens, above 0.5 thins.
    pub tone: f32,
    pub delay_time_secs: f32,
    pub delay_feedback: f32,
    pub delay_level: f32,
    pub delay_enabled: bool,
    pub second_tap: bool,
    pub reverb_size: f32,
    pub reverb_decay: f32,
    pub amp_enabled: bool,
    pub cabinet_enabled: bool,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            gain: 1.0,
            mix: 0.0,
            output_level: 1.0,
            tone: 0.5,
            delay_time_secs: 0.35,
            delay_feedback: 0.3,
            delay_level: 0.5,
            delay_enabled: false,
            second_tap: false,
            reverb_size: 0.5,
            reverb_decay: 0.7,
            amp_enabled: true,
            cabinet_enabled: true,
        }
    }
}

impl ParameterSnapshot {
    /// Parse a preset. Missing keys keep their defaults; values are not
    /// clamped until published.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let snapshot = toml::from_str(source).map_err(altair_core::Error::from)?;
        Ok(snapshot)
    }
}

/// Valid range and taper of each continuous parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRanges {
    pub gain: ParameterRange,
    pub mix: ParameterRange,
    pub output_level: ParameterRange,
    pub tone: ParameterRange,
    pub delay_time_secs: ParameterRange,
    pub delay_feedback: ParameterRange,
    pub delay_level: ParameterRange,
    pub reverb_size: ParameterRange,
    pub reverb_decay: ParameterRange,
}

impl ParameterRanges {
    /// Ranges for a chain whose delay line holds `max_delay_secs`.
    pub fn new(max_delay_secs: f32) -> Self {
        let defaults = ParameterSnapshot::default();
        let max_delay = max_delay_secs.max(0.02);

        Self {
            gain: ParameterRange::linear(0.1, 2.5, defaults.gain),
            mix: ParameterRange::linear(0.0, 1.0, defaults.mix),
            output_level: ParameterRange::linear(0.0, 2.0, defaults.output_level),
            tone: ParameterRange::linear(0.0, 1.0, defaults.tone),
            delay_time_secs: ParameterRange::logarithmic(0.01, max_delay, defaults.delay_time_secs),
            delay_feedback: ParameterRange::linear(0.0, 0.95, defaults.delay_feedback),
            delay_level: ParameterRange::linear(0.0, 1.0, defaults.delay_level),
            reverb_size: ParameterRange::linear(0.0, 1.0, defaults.reverb_size),
            reverb_decay: ParameterRange::linear(0.0, 0.95, defaults.reverb_decay),
        }
    }

    pub fn clamp(&self, snapshot: &ParameterSnapshot) -> ParameterSnapshot {
        ParameterSnapshot {
            gain: self.gain.clamp(snapshot.gain),
            mix: self.mix.clamp(snapshot.mix),
            output_level: self.output_level.clamp(snapshot.output_level),
            tone: self.tone.clamp(snapshot.tone),
            delay_time_secs: self.delay_time_secs.clamp(snapshot.delay_time_secs),
            delay_feedback: self.delay_feedback.clamp(snapshot.delay_feedback),
            delay_level: self.delay_level.clamp(snapshot.delay_level),
            reverb_size: self.reverb_size.clamp(snapshot.reverb_size),
            reverb_decay: self.reverb_decay.clamp(snapshot.reverb_decay),
            ..*snapshot
        }
    }
}
