//! Shared fixtures for the Altair integration tests: synthetic amp
//! models, chains at the pedal's rate and hop, a block runner and signal
//! generators. Comparison bounds live in [`tolerances`].

#![allow(dead_code)]

pub mod tolerances;

use altair::prelude::*;

/// Default test sample rate (matches the pedal hardware)
pub const TEST_SAMPLE_RATE: f32 = 48000.0;

/// Hop length used by the pedal firmware
pub const TEST_HOP: usize = 256;

/// Zero weights with the dry input added back: the amp stage is a wire.
pub fn passthrough_model() -> ModelWeights {
    ModelWeights {
        skip_connection: true,
        ..Default::default()
    }
}

/// Small random recurrent weights and zero biases. Silent input drives the
/// hidden state to zero.
pub fn contractive_model(seed: u32) -> ModelWeights {
    let mut state = seed;
    let mut next = |scale: f32| {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        ((state >> 16) as f32 / 32768.0 - 1.0) * scale
    };

    let mut weights = ModelWeights::default();
    for w in weights.input_weights[0].iter_mut() {
        *w = next(1.0);
    }
    for row in weights.recurrent_weights.iter_mut() {
        for w in row.iter_mut() {
            *w = next(0.05);
        }
    }
    for d in weights.dense_weights.iter_mut() {
        *d = next(0.5);
    }
    weights
}

/// Exponentially decaying noise, like a measured cabinet.
pub fn cabinet_ir(len: usize) -> Vec<f32> {
    generate_noise(len, 99)
        .into_iter()
        .enumerate()
        .map(|(i, s)| s * (-5.0 * i as f32 / len as f32).exp() * 0.3)
        .collect()
}

/// Chain at the test rate and hop with a wire amp and a unit impulse.
pub fn passthrough_chain() -> (SignalChain, ControlHandle) {
    SignalChain::builder()
        .sample_rate(TEST_SAMPLE_RATE)
        .hop_length(TEST_HOP)
        .model("direct", passthrough_model())
        .impulse_response("direct", &[1.0])
        .build()
        .expect("Failed to build test chain")
}

/// Run `input` through the chain block by block, zero-padding the tail.
/// Returns (left, right), trimmed to the input length.
pub fn process_signal(chain: &mut SignalChain, input: &[f32]) -> (Vec<f32>, Vec<f32>) {
    let hop = chain.hop_length();
    let mut left = Vec::with_capacity(input.len());
    let mut right = Vec::with_capacity(input.len());
    let mut block = vec![0.0; hop];
    let mut out_l = vec![0.0; hop];
    let mut out_r = vec![0.0; hop];

    for chunk in input.chunks(hop) {
        block[..chunk.len()].copy_from_slice(chunk);
        block[chunk.len()..].fill(0.0);
        chain
            .process_block(&block, &mut out_l, &mut out_r)
            .expect("process_block failed");
        left.extend_from_slice(&out_l[..chunk.len()]);
        right.extend_from_slice(&out_r[..chunk.len()]);
    }
    (left, right)
}

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f32, sample_rate: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (2.0 * std::f64::consts::PI * frequency as f64 * t).sin() as f32
        })
        .collect()
}

/// Generate silence (zero samples).
pub fn generate_silence(num_samples: usize) -> Vec<f32> {
    vec![0.0; num_samples]
}

/// Single 1.0 at `position`, zeros elsewhere.
pub fn generate_impulse(num_samples: usize, position: usize) -> Vec<f32> {
    let mut signal = vec![0.0; num_samples];
    if position < num_samples {
        signal[position] = 1.0;
    }
    signal
}

/// Generate white noise (random samples in -1..1).
pub fn generate_noise(num_samples: usize, seed: u64) -> Vec<f32> {
    // Simple LCG for reproducible "random" noise
    let mut rng = seed;
    (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((rng >> 33) as f32 / u32::MAX as f32) * 4.0 - 1.0
        })
        .collect()
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Assert that a signal is approximately silent (all values near zero).
pub fn assert_silence(samples: &[f32], tolerance: f32) {
    let max = peak(samples);
    assert!(
        max <= tolerance,
        "Expected silence, but peak amplitude was {}",
        max
    );
}

/// Assert that a signal has content (not silent).
pub fn assert_has_audio(samples: &[f32], min_rms: f32) {
    let r = rms(samples);
    assert!(
        r >= min_rms,
        "Expected audio content with RMS >= {}, but RMS was {}",
        min_rms,
        r
    );
}
