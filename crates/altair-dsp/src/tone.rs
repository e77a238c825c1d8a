//! Single-knob tone control.
//!
//! Below the midpoint the knob sweeps a one-pole low-pass from 500 Hz up to
//! 20 kHz; from the midpoint up it sweeps a one-pole high-pass from 20 Hz to
//! 1 kHz. Both ends of the midpoint are effectively flat. The filtered
//! signal then goes through an energy balancer so turning the knob changes
//! colour, not loudness.

use altair_core::ParameterRange;
use std::f32::consts::TAU;

const BALANCE_CUTOFF_HZ: f32 = 10.0;
const MAX_BALANCE_GAIN: f32 = 4.0;
/// Mean-square floor below which the balancer holds unity gain.
const ENERGY_FLOOR: f32 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneMode {
    LowPass,
    HighPass,
}

/// `y += a * (x - y)`, with `a = 1 - exp(-2π fc / fs)`.
#[derive(Debug, Clone)]
struct OnePoleFilter {
    a: f32,
    state: f32,
}

impl OnePoleFilter {
    fn new() -> Self {
        Self { a: 1.0, state: 0.0 }
    }

    fn set_cutoff(&mut self, cutoff_hz: f32, sample_rate: f32) {
        self.a = 1.0 - (-TAU * cutoff_hz / sample_rate).exp();
    }

    #[inline]
    fn lowpass(&mut self, input: f32) -> f32 {
        self.state += self.a * (input - self.state);
        self.state
    }

    #[inline]
    fn highpass(&mut self, input: f32) -> f32 {
        input - self.lowpass(input)
    }
}

/// Matches the short-term energy of a processed signal to a reference.
#[derive(Debug, Clone)]
struct Balancer {
    c1: f32,
    c2: f32,
    reference_ms: f32,
    signal_ms: f32,
}

impl Balancer {
    fn new(sample_rate: f32) -> Self {
        let b = 2.0 - (TAU * BALANCE_CUTOFF_HZ / sample_rate).cos();
        let c2 = b - (b * b - 1.0).sqrt();
        Self {
            c1: 1.0 - c2,
            c2,
            reference_ms: 0.0,
            signal_ms: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, signal: f32, reference: f32) -> f32 {
        self.reference_ms = self.c1 * reference * reference + self.c2 * self.reference_ms;
        self.signal_ms = self.c1 * signal * signal + self.c2 * self.signal_ms;

        let gain = if self.signal_ms > ENERGY_FLOOR {
            (self.reference_ms / self.signal_ms).sqrt().min(MAX_BALANCE_GAIN)
        } else {
            1.0
        };
        signal * gain
    }

    fn reset(&mut self) {
        self.reference_ms = 0.0;
        self.signal_ms = 0.0;
    }
}

/// Tone knob → low-pass or high-pass filter with energy balancing.
#[derive(Debug, Clone)]
pub struct ToneStage {
    sample_rate: f32,
    position: f32,
    mode: ToneMode,
    cutoff_hz: f32,
    filter: OnePoleFilter,
    balancer: Balancer,
    lowpass_range: ParameterRange,
    highpass_range: ParameterRange,
}

impl ToneStage {
    pub fn new(sample_rate: f32) -> Self {
        let mut stage = Self {
            sample_rate,
            position: f32::NAN,
            mode: ToneMode::LowPass,
            cutoff_hz: 0.0,
            filter: OnePoleFilter::new(),
            balancer: Balancer::new(sample_rate),
            lowpass_range: ParameterRange::logarithmic(500.0, 20_000.0, 20_000.0),
            highpass_range: ParameterRange::logarithmic(20.0, 1_000.0, 20.0),
        };
        stage.set_tone(0.5);
        stage
    }

    /// Set the knob position (0.0-1.0). Call once per block; recomputes the
    /// coefficient only when the position moved.
    pub fn set_tone(&mut self, position: f32) {
        let position = if position.is_nan() {
            0.5
        } else {
            position.clamp(0.0, 1.0)
        };
        if position == self.position {
            return;
        }
        self.position = position;

        let (mode, cutoff) = if position < 0.5 {
            (ToneMode::LowPass, self.lowpass_range.denormalize(position * 2.0))
        } else {
            (
                ToneMode::HighPass,
                self.highpass_range.denormalize((position - 0.5) * 2.0),
            )
        };
        self.mode = mode;
        self.cutoff_hz = cutoff;
        self.filter.set_cutoff(cutoff, self.sample_rate);
    }

    pub fn mode(&self) -> ToneMode {
        self.mode
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let filtered = match self.mode {
            ToneMode::LowPass => self.filter.lowpass(input),
            ToneMode::HighPass => self.filter.highpass(input),
        };
        let output = self.balancer.process(filtered, input);

        if output.is_finite() {
            output
        } else {
            self.reset();
            0.0
        }
    }

    /// Clear filter and envelope state. Coefficients are kept.
    pub fn reset(&mut self) {
        self.filter.state = 0.0;
        self.balancer.reset();
    }
}
