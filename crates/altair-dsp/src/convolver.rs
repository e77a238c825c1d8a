//! Uniformly partitioned overlap-save convolution.
//!
//! A long impulse response is split into `K` partitions of hop length `L`.
//! Each partition is zero-padded to `N = 2L` and transformed once, off the
//! audio thread, into an [`IrPartitions`] set. The [`PartitionedConvolver`]
//! then processes one `L`-sample block per call:
//!
//! 1. frame = previous block ‖ current block (`N` samples)
//! 2. forward transform, stored in the history ring at the write slot
//! 3. `Y = Σₖ history[(write − k) mod K] · H[k]`
//! 4. inverse transform scaled by `1/N`
//! 5. output = real part of `Y[L..N]`
//!
//! Per block that is one forward transform, one inverse transform and `K`
//! complex multiply-accumulates, so latency is a single hop regardless of
//! the impulse response length.
//!
//! ```
//! use altair_dsp::PartitionedConvolver;
//!
//! // A unit impulse is a passthrough.
//! let mut conv = PartitionedConvolver::from_impulse_response(&[1.0], 64)?;
//! let input: Vec<f32> = (0..64).map(|i| (i as f32 * 0.1).sin()).collect();
//! let mut output = vec![0.0; 64];
//! conv.process_block(&input, &mut output)?;
//! assert!((output[10] - input[10]).abs() < 1e-5);
//! # Ok::<(), altair_dsp::Error>(())
//! ```

use crate::fft::FixedFft;
use crate::{Error, Result};
use altair_core::error::check_block_length;
use rustfft::num_complex::Complex32;
use std::sync::Arc;

const ZERO: Complex32 = Complex32::new(0.0, 0.0);

/// Pre-transformed partitions of one impulse response.
///
/// Immutable once built. Shared with the convolver through an `Arc` so
/// switching responses on the audio thread is a pointer swap.
#[derive(Debug, Clone)]
pub struct IrPartitions {
    hop: usize,
    count: usize,
    source_len: usize,
    /// `count` spectra of `2 * hop` bins, back to back.
    spectra: Vec<Complex32>,
}

impl IrPartitions {
    /// Split and transform `impulse_response` for hop length `hop`.
    ///
    /// The response is zero-padded to a multiple of `hop`. An empty response
    /// produces one all-zero partition, so the convolver outputs silence.
    pub fn new(impulse_response: &[f32], hop: usize) -> Result<Self> {
        if hop == 0 || !hop.is_power_of_two() {
            return Err(altair_core::Error::InvalidHopLength(hop).into());
        }

        let fft_size = 2 * hop;
        let count = impulse_response.len().div_ceil(hop).max(1);
        let mut fft = FixedFft::new(fft_size);
        let mut spectra = vec![ZERO; count * fft_size];

        for (k, spectrum) in spectra.chunks_exact_mut(fft_size).enumerate() {
            let start = (k * hop).min(impulse_response.len());
            let end = (start + hop).min(impulse_response.len());
            for (bin, &tap) in spectrum.iter_mut().zip(&impulse_response[start..end]) {
                bin.re = tap;
            }
            fft.forward(spectrum);
        }

        Ok(Self {
            hop,
            count,
            source_len: impulse_response.len(),
            spectra,
        })
    }

    #[inline]
    pub fn hop(&self) -> usize {
        self.hop
    }

    #[inline]
    pub fn fft_size(&self) -> usize {
        2 * self.hop
    }

    /// Number of partitions (`K`).
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Always false: even an empty response has one partition.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Length of the impulse response before padding.
    #[inline]
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    #[inline]
    fn partition(&self, k: usize) -> &[Complex32] {
        let n = self.fft_size();
        &self.spectra[k * n..(k + 1) * n]
    }
}

/// Streaming overlap-save convolver with a fixed hop length.
///
/// All buffers are sized at construction for up to `capacity` partitions.
/// [`process_block`](Self::process_block) and
/// [`set_partitions`](Self::set_partitions) never allocate.
#[derive(Debug)]
pub struct PartitionedConvolver {
    hop: usize,
    fft: FixedFft,
    partitions: Arc<IrPartitions>,
    capacity: usize,
    /// Frequency-domain history ring, `capacity` slots of `2 * hop` bins.
    history: Vec<Complex32>,
    write_index: usize,
    frame: Vec<Complex32>,
    accum: Vec<Complex32>,
    prev_block: Vec<f32>,
}

impl PartitionedConvolver {
    /// Convolver sized exactly for `partitions`.
    pub fn new(partitions: Arc<IrPartitions>) -> Self {
        let capacity = partitions.len();
        Self::with_capacity(partitions, capacity)
    }

    /// Convolver whose history can hold up to `max_partitions`, so later
    /// [`set_partitions`](Self::set_partitions) calls with longer responses
    /// stay allocation-free.
    pub fn with_capacity(partitions: Arc<IrPartitions>, max_partitions: usize) -> Self {
        let hop = partitions.hop();
        let fft_size = partitions.fft_size();
        let capacity = max_partitions.max(partitions.len());

        Self {
            hop,
            fft: FixedFft::new(fft_size),
            partitions,
            capacity,
            history: vec![ZERO; capacity * fft_size],
            write_index: 0,
            frame: vec![ZERO; fft_size],
            accum: vec![ZERO; fft_size],
            prev_block: vec![0.0; hop],
        }
    }

    /// Build partitions and a convolver in one step.
    pub fn from_impulse_response(impulse_response: &[f32], hop: usize) -> Result<Self> {
        let partitions = IrPartitions::new(impulse_response, hop)?;
        Ok(Self::new(Arc::new(partitions)))
    }

    /// Re-initialize for a new response and possibly a new hop length.
    ///
    /// Allocates. Everything, including the history ring, starts cold.
    pub fn init(&mut self, impulse_response: &[f32], hop: usize) -> Result<()> {
        *self = Self::from_impulse_response(impulse_response, hop)?;
        Ok(())
    }

    #[inline]
    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Partitions in the active response.
    #[inline]
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Largest partition count installable without allocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn partitions(&self) -> &Arc<IrPartitions> {
        &self.partitions
    }

    /// Swap in another response and clear all history.
    ///
    /// Rejects partitions built for a different hop length or with more
    /// partitions than the history was sized for.
    pub fn set_partitions(&mut self, partitions: Arc<IrPartitions>) -> Result<()> {
        if partitions.hop() != self.hop {
            return Err(Error::HopMismatch {
                expected: self.hop,
                actual: partitions.hop(),
            });
        }
        if partitions.len() > self.capacity {
            return Err(Error::PartitionCapacity {
                required: partitions.len(),
                capacity: self.capacity,
            });
        }

        self.partitions = partitions;
        self.reset();
        Ok(())
    }

    /// Zero the history ring and the previous-block tail.
    pub fn reset(&mut self) {
        self.history.fill(ZERO);
        self.prev_block.fill(0.0);
        self.write_index = 0;
    }

    /// Convolve one hop of input. Both slices must be exactly `hop` long.
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) -> Result<()> {
        check_block_length(self.hop, input.len())?;
        check_block_length(self.hop, output.len())?;

        let hop = self.hop;
        let fft_size = 2 * hop;
        let count = self.partitions.len();

        // Previous block ‖ current block
        for (bin, &s) in self.frame[..hop].iter_mut().zip(&self.prev_block) {
            *bin = Complex32::new(s, 0.0);
        }
        for (bin, &s) in self.frame[hop..].iter_mut().zip(input) {
            *bin = Complex32::new(s, 0.0);
        }
        self.prev_block.copy_from_slice(input);

        self.fft.forward(&mut self.frame);
        let slot = self.write_index * fft_size;
        self.history[slot..slot + fft_size].copy_from_slice(&self.frame);

        self.accum.fill(ZERO);
        for k in 0..count {
            let index = (self.write_index + count - k) % count;
            let spectrum = &self.history[index * fft_size..(index + 1) * fft_size];
            let partition = self.partitions.partition(k);

            for ((acc, x), h) in self.accum.iter_mut().zip(spectrum).zip(partition) {
                *acc += x * h;
            }
        }

        self.fft.inverse(&mut self.accum);
        let scale = 1.0 / fft_size as f32;
        for (out, y) in output.iter_mut().zip(&self.accum[hop..]) {
            *out = y.re * scale;
        }

        self.write_index = (self.write_index + 1) % count;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn naive_convolution(signal: &[f32], ir: &[f32]) -> Vec<f32> {
        (0..signal.len())
            .map(|n| {
                ir.iter()
                    .enumerate()
                    .take(n + 1)
                    .map(|(j, &h)| h * signal[n - j])
                    .sum()
            })
            .collect()
    }

    fn run_blocks(conv: &mut PartitionedConvolver, signal: &[f32]) -> Vec<f32> {
        let hop = conv.hop();
        let mut out = vec![0.0; signal.len()];
        for (input, output) in signal.chunks_exact(hop).zip(out.chunks_exact_mut(hop)) {
            conv.process_block(input, output).unwrap();
        }
        out
    }

    fn test_signal(len: usize) -> Vec<f32> {
        let mut state = 12345u32;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1103515245).wrapping_add(12345);
                (state >> 16) as f32 / 32768.0 - 1.0
            })
            .collect()
    }

    #[test]
    fn test_partition_count() {
        assert_eq!(IrPartitions::new(&[0.5; 10], 16).unwrap().len(), 1);
        assert_eq!(IrPartitions::new(&[0.5; 16], 16).unwrap().len(), 1);
        assert_eq!(IrPartitions::new(&[0.5; 17], 16).unwrap().len(), 2);
        assert_eq!(IrPartitions::new(&[0.5; 100], 16).unwrap().len(), 7);
        assert_eq!(IrPartitions::new(&[], 16).unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_non_power_of_two_hop() {
        assert!(IrPartitions::new(&[1.0], 0).is_err());
        assert!(matches!(
            IrPartitions::new(&[1.0], 100),
            Err(Error::Core(altair_core::Error::InvalidHopLength(100)))
        ));
    }

    #[test]
    fn test_unit_impulse_passthrough() {
        let mut conv = PartitionedConvolver::from_impulse_response(&[1.0], 256).unwrap();
        let signal = test_signal(256 * 8);
        let out = run_blocks(&mut conv, &signal);

        for (a, b) in out.iter().zip(&signal) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_matches_naive_convolution_multi_partition() {
        let ir = test_signal(100);
        let signal = test_signal(32 * 12);
        let mut conv = PartitionedConvolver::from_impulse_response(&ir, 32).unwrap();
        assert_eq!(conv.partition_count(), 4);

        let out = run_blocks(&mut conv, &signal);
        let expected = naive_convolution(&signal, &ir);
        for (a, b) in out.iter().zip(&expected) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_delayed_impulse_crosses_partitions() {
        // Tap at 40 lands in the second partition for hop 32
        let mut ir = vec![0.0; 41];
        ir[40] = 0.5;
        let mut conv = PartitionedConvolver::from_impulse_response(&ir, 32).unwrap();

        let mut signal = vec![0.0; 32 * 4];
        signal[3] = 1.0;
        let out = run_blocks(&mut conv, &signal);

        assert_abs_diff_eq!(out[43], 0.5, epsilon = 1e-5);
        let stray: f32 = out
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != 43)
            .map(|(_, s)| s.abs())
            .fold(0.0, f32::max);
        assert!(stray < 1e-5, "unexpected energy {stray}");
    }

    #[test]
    fn test_empty_ir_is_silent() {
        let mut conv = PartitionedConvolver::from_impulse_response(&[], 16).unwrap();
        let out = run_blocks(&mut conv, &test_signal(64));
        assert!(out.iter().all(|s| s.abs() < 1e-7));
    }

    #[test]
    fn test_block_length_mismatch() {
        let mut conv = PartitionedConvolver::from_impulse_response(&[1.0], 64).unwrap();
        let input = vec![0.0; 63];
        let mut output = vec![0.0; 64];

        let err = conv.process_block(&input, &mut output).unwrap_err();
        assert!(matches!(
            err,
            Error::Core(altair_core::Error::BlockLengthMismatch {
                expected: 64,
                actual: 63
            })
        ));
    }

    #[test]
    fn test_set_partitions_rejects_other_hop() {
        let mut conv = PartitionedConvolver::from_impulse_response(&[1.0], 64).unwrap();
        let other = Arc::new(IrPartitions::new(&[1.0], 128).unwrap());

        assert!(matches!(
            conv.set_partitions(other),
            Err(Error::HopMismatch {
                expected: 64,
                actual: 128
            })
        ));
    }

    #[test]
    fn test_set_partitions_respects_capacity() {
        let short = Arc::new(IrPartitions::new(&[1.0], 16).unwrap());
        let long = Arc::new(IrPartitions::new(&[0.1; 64], 16).unwrap());

        let mut conv = PartitionedConvolver::new(short.clone());
        assert!(matches!(
            conv.set_partitions(long.clone()),
            Err(Error::PartitionCapacity {
                required: 4,
                capacity: 1
            })
        ));

        let mut conv = PartitionedConvolver::with_capacity(short, 4);
        conv.set_partitions(long).unwrap();
        assert_eq!(conv.partition_count(), 4);
    }

    #[test]
    fn test_switch_clears_history() {
        let ir = test_signal(48);
        let mut conv = PartitionedConvolver::with_capacity(
            Arc::new(IrPartitions::new(&ir, 16).unwrap()),
            3,
        );
        run_blocks(&mut conv, &test_signal(64));

        conv.set_partitions(Arc::new(IrPartitions::new(&[1.0], 16).unwrap()))
            .unwrap();
        let out = run_blocks(&mut conv, &vec![0.0; 16]);
        assert!(out.iter().all(|s| s.abs() < 1e-6));
    }

    #[test]
    fn test_reset_matches_fresh_instance() {
        let ir = test_signal(70);
        let signal = test_signal(128);

        let mut fresh = PartitionedConvolver::from_impulse_response(&ir, 16).unwrap();
        let expected = run_blocks(&mut fresh, &signal);

        let mut used = PartitionedConvolver::from_impulse_response(&ir, 16).unwrap();
        run_blocks(&mut used, &test_signal(96));
        used.reset();
        let out = run_blocks(&mut used, &signal);

        for (a, b) in out.iter().zip(&expected) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_init_changes_hop() {
        let mut conv = PartitionedConvolver::from_impulse_response(&[1.0], 64).unwrap();
        conv.init(&[1.0, 0.5], 128).unwrap();
        assert_eq!(conv.hop(), 128);
        assert_eq!(conv.partition_count(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_matches_naive_convolution(
            hop_log2 in 2u32..7,
            ir in prop::collection::vec(-1.0f32..1.0, 0..300),
            blocks in 1usize..6,
            seed in any::<u32>(),
        ) {
            let hop = 1usize << hop_log2;
            let mut state = seed;
            let signal: Vec<f32> = (0..hop * blocks)
                .map(|_| {
                    state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                    (state >> 8) as f32 / (1u32 << 23) as f32 - 1.0
                })
                .collect();

            let mut conv = PartitionedConvolver::from_impulse_response(&ir, hop).unwrap();
            let out = run_blocks(&mut conv, &signal);
            let expected = naive_convolution(&signal, &ir);

            let scale = 1.0 + ir.iter().map(|h| h.abs()).sum::<f32>();
            for (a, b) in out.iter().zip(&expected) {
                prop_assert!((a - b).abs() <= 1e-4 * scale, "{} vs {}", a, b);
            }
        }
    }
}
