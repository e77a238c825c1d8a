//! Knob position ↔ real value mapping.
//!
//! The control loop reads pots as a normalized 0.0-1.0 position. Each
//! parameter in the chain owns a [`ParameterRange`] that turns that position
//! into the value the DSP code works with.
//!
//! # Example
//!
//! ```
//! use altair_core::ParameterRange;
//!
//! // Input gain knob: 0.1x to 2.5x, linear taper
//! let gain = ParameterRange::linear(0.1, 2.5, 1.0);
//! assert!((gain.denormalize(0.5) - 1.3).abs() < 1e-6);
//!
//! // Low-pass cutoff: 500 Hz to 20 kHz, log taper
//! let cutoff = ParameterRange::logarithmic(500.0, 20_000.0, 20_000.0);
//! let hz = cutoff.denormalize(0.5); // geometric mean, ~3162 Hz
//! assert!((cutoff.normalize(hz) - 0.5).abs() < 1e-4);
//! ```

/// How a parameter value is scaled between normalized (0-1) and real values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParameterScale {
    /// `real = min + normalized * (max - min)`
    #[default]
    Linear,

    /// `real = min * (max/min)^normalized`
    ///
    /// Requires `min > 0` and `max > min`.
    Logarithmic,
}

/// Valid range, default and taper of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange {
    pub min: f32,
    pub max: f32,
    /// Default real value, clamped into range on construction.
    pub default: f32,
    pub scale: ParameterScale,
}

impl ParameterRange {
    pub fn new(min: f32, max: f32, default: f32, scale: ParameterScale) -> Self {
        debug_assert!(max > min, "max must be greater than min");

        Self {
            min,
            max,
            default: default.clamp(min, max),
            scale,
        }
    }

    pub fn linear(min: f32, max: f32, default: f32) -> Self {
        Self::new(min, max, default, ParameterScale::Linear)
    }

    /// # Panics
    ///
    /// Panics in debug mode if `min <= 0`.
    pub fn logarithmic(min: f32, max: f32, default: f32) -> Self {
        debug_assert!(min > 0.0, "logarithmic scale requires min > 0");
        Self::new(min, max, default, ParameterScale::Logarithmic)
    }

    /// Clamp a real value into `[min, max]`. NaN maps to the default.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }

    /// Convert a real value to normalized (0.0-1.0).
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let value = self.clamp(value);
        let range = self.max - self.min;

        if range <= 0.0 {
            return 0.0;
        }

        match self.scale {
            ParameterScale::Linear => (value - self.min) / range,
            ParameterScale::Logarithmic => {
                if self.min <= 0.0 {
                    (value - self.min) / range
                } else {
                    let log_min = self.min.ln();
                    let log_max = self.max.ln();
                    (value.ln() - log_min) / (log_max - log_min)
                }
            }
        }
    }

    /// Convert a normalized value (0.0-1.0) to a real value.
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let normalized = if normalized.is_nan() {
            0.0
        } else {
            normalized.clamp(0.0, 1.0)
        };
        let range = self.max - self.min;

        match self.scale {
            ParameterScale::Linear => self.min + normalized * range,
            ParameterScale::Logarithmic => {
                if self.min <= 0.0 {
                    self.min + normalized * range
                } else {
                    self.min * (self.max / self.min).powf(normalized)
                }
            }
        }
    }
}
