//! Feedback delay with a smoothed read offset and an optional second tap.
//!
//! Taps are read before the write, so a delay of `D` samples returns the
//! input from exactly `D` calls ago. The read offset glides toward its
//! target through a [`OnePole`] so sweeping the time knob bends pitch rather
//! than clicking.
//!
//! When the delay is switched off the input stops feeding the line, but the
//! line keeps recirculating and playing back, so existing echoes ring out.

use altair_core::{OnePole, RingBuffer};

/// Per-sample glide coefficient for the read offsets.
pub const DELAY_GLIDE_COEFF: f32 = 0.0002;
const MAX_FEEDBACK: f32 = 0.999;

#[derive(Debug, Clone)]
pub struct DelayLine {
    ring: RingBuffer,
    primary: OnePole,
    secondary: OnePole,
    feedback: f32,
    level: f32,
    active: bool,
    second_tap: bool,
}

impl DelayLine {
    /// Delay line holding up to `capacity` samples; usable delays are
    /// `1..capacity - 1`.
    pub fn new(capacity: usize) -> Self {
        let ring = RingBuffer::new(capacity.max(3));
        let initial = 1.0;

        Self {
            ring,
            primary: OnePole::new(initial, DELAY_GLIDE_COEFF),
            secondary: OnePole::new(initial, DELAY_GLIDE_COEFF),
            feedback: 0.0,
            level: 1.0,
            active: false,
            second_tap: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    fn clamp_delay(&self, samples: f32) -> f32 {
        let max = (self.ring.capacity() - 1) as f32;
        if samples.is_nan() {
            return 1.0;
        }
        samples.clamp(1.0, max)
    }

    /// Target delay for the primary tap, in samples. The read offset glides
    /// there.
    pub fn set_delay(&mut self, samples: f32) {
        let samples = self.clamp_delay(samples);
        self.primary.set_target(samples);
    }

    /// Jump the primary tap straight to `samples` with no glide.
    pub fn set_delay_immediate(&mut self, samples: f32) {
        let samples = self.clamp_delay(samples);
        self.primary.set_immediate(samples);
    }

    /// Target delay for the second tap, in samples.
    pub fn set_second_tap_delay(&mut self, samples: f32) {
        let samples = self.clamp_delay(samples);
        self.secondary.set_target(samples);
    }

    pub fn set_second_tap_delay_immediate(&mut self, samples: f32) {
        let samples = self.clamp_delay(samples);
        self.secondary.set_immediate(samples);
    }

    /// Feedback gain, clamped to `[0, 1)`.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = if feedback.is_nan() {
            0.0
        } else {
            feedback.clamp(0.0, MAX_FEEDBACK)
        };
    }

    pub fn set_level(&mut self, level: f32) {
        self.level = if level.is_finite() { level.max(0.0) } else { 0.0 };
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn set_second_tap(&mut self, enabled: bool) {
        self.second_tap = enabled;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current (smoothed) primary delay in samples.
    pub fn current_delay(&self) -> f32 {
        self.primary.current()
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let primary = self.primary.next_sample();
        let secondary = self.secondary.next_sample();

        let tap1 = self.ring.read_interpolated(primary);
        let tap2 = if self.second_tap {
            self.ring.read_interpolated(secondary)
        } else {
            0.0
        };

        let recirculated = self.feedback * tap1;
        let write = if self.active {
            input + recirculated
        } else {
            recirculated
        };
        self.ring.push(if write.is_finite() { write } else { 0.0 });

        let output = (tap1 + tap2) * self.level;
        if output.is_finite() {
            output
        } else {
            0.0
        }
    }

    /// Silence the line. Delay targets and settings are kept.
    pub fn reset(&mut self) {
        self.ring.clear();
    }
}
