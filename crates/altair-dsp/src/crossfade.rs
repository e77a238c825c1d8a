//! Equal-power wet/dry crossfade.
//!
//! A polynomial approximation of the sine/cosine law, cheap enough to
//! recompute every block:
//!
//! ```text
//! x = 1 - mix
//! a = mix * x
//! b = a * (1 + 1.4186 a)
//! wet = (b + mix)²
//! dry = (b + x)²
//! ```

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeGains {
    pub dry: f32,
    pub wet: f32,
}

/// Dry and wet gains for `mix` in `[0, 1]` (clamped, NaN treated as dry).
#[inline]
pub fn equal_power_gains(mix: f32) -> CrossfadeGains {
    let mix = if mix.is_nan() { 0.0 } else { mix.clamp(0.0, 1.0) };
    let x = 1.0 - mix;
    let a = mix * x;
    let b = a * (1.0 + 1.4186 * a);
    let wet = b + mix;
    let dry = b + x;

    CrossfadeGains {
        dry: dry * dry,
        wet: wet * wet,
    }
}

/// Caches the gain pair for the last mix value.
#[derive(Debug, Clone)]
pub struct Crossfade {
    mix: f32,
    gains: CrossfadeGains,
}

impl Default for Crossfade {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Crossfade {
    pub fn new(mix: f32) -> Self {
        Self {
            mix,
            gains: equal_power_gains(mix),
        }
    }

    /// Recomputes the gains only when `mix` changed.
    pub fn set_mix(&mut self, mix: f32) {
        if mix != self.mix {
            self.mix = mix;
            self.gains = equal_power_gains(mix);
        }
    }

    #[inline]
    pub fn gains(&self) -> CrossfadeGains {
        self.gains
    }

    #[inline]
    pub fn mix(&self, dry: f32, wet: f32) -> f32 {
        self.gains.dry * dry + self.gains.wet * wet
    }
}
