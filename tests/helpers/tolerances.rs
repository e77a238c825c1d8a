//! Comparison bounds for the chain tests, tightest first.

/// Bit-exact paths: bypass copies, silence after a reset, unity gain.
pub const FLOAT_EPSILON: f32 = 1e-6;

/// One forward and inverse 512-point transform in the cabinet convolver.
pub const FFT_EPSILON: f32 = 1e-5;

/// Recurrent amp and filter state accumulated over a few thousand samples.
pub const DSP_EPSILON: f32 = 1e-4;

/// -60 dB: what is left once a level ramp has settled.
pub const PERCEPTUAL_EPSILON: f32 = 0.001;

/// -80 dB: below this a tail counts as gone.
pub const SILENCE_THRESHOLD: f32 = 0.0001;
