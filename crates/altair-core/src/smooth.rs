//! Smoothed parameter values for zipper-free knob changes.
//!
//! Two flavours:
//!
//! - [`SmoothedValue`] ramps linearly to a new target over a fixed time. The
//!   chain uses it for input gain and output level, where a predictable ramp
//!   length matters more than the curve.
//! - [`OnePole`] chases its target exponentially with a fixed per-sample
//!   coefficient. The delay line uses it for its read offset so a moving knob
//!   bends pitch smoothly instead of clicking.
//!
//! # Example
//!
//! ```
//! use altair_core::SmoothedValue;
//!
//! // 10ms ramp at 48kHz
//! let mut level = SmoothedValue::new(1.0, 0.010, 48000.0);
//! level.set_target(0.5);
//!
//! let mut block = [1.0f32; 256];
//! for sample in block.iter_mut() {
//!     *sample *= level.next_sample();
//! }
//! ```

/// Linear-ramp smoother. Call [`next_sample()`](SmoothedValue::next_sample)
/// once per sample in the audio callback.
#[derive(Debug, Clone)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    samples_remaining: u32,
    smooth_samples: u32,
}

impl SmoothedValue {
    pub fn new(initial: f32, smooth_time_secs: f32, sample_rate: f32) -> Self {
        let smooth_samples = (smooth_time_secs * sample_rate).max(1.0) as u32;

        Self {
            current: initial,
            target: initial,
            step: 0.0,
            samples_remaining: 0,
            smooth_samples,
        }
    }

    #[inline]
    pub fn set_target(&mut self, target: f32) {
        if (target - self.target).abs() < f32::EPSILON {
            return;
        }

        self.target = target;
        self.samples_remaining = self.smooth_samples;
        self.step = (self.target - self.current) / self.samples_remaining as f32;
    }

    /// Jump straight to the target. Used when the chain re-engages so the
    /// first active block does not fade in from a stale value.
    #[inline]
    pub fn skip_to_target(&mut self) {
        self.current = self.target;
        self.step = 0.0;
        self.samples_remaining = 0;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current += self.step;
            self.samples_remaining -= 1;

            // Snap to avoid drift
            if self.samples_remaining == 0 {
                self.current = self.target;
            }
        }

        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.samples_remaining > 0
    }
}

/// Exponential smoother: `y += coeff * (target - y)` per sample.
#[derive(Debug, Clone, Copy)]
pub struct OnePole {
    current: f32,
    target: f32,
    coeff: f32,
}

impl OnePole {
    /// `coeff` is the fraction of the remaining distance covered per sample,
    /// clamped to `(0, 1]`.
    pub fn new(initial: f32, coeff: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: coeff.clamp(f32::MIN_POSITIVE, 1.0),
        }
    }

    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }
}
