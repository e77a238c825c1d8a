//! Fixed-size complex FFT with preplanned transforms and scratch.
//!
//! Planning and scratch allocation happen once in [`FixedFft::new`]; the
//! transforms themselves run in place and never allocate.

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

pub struct FixedFft {
    size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex32>,
}

impl FixedFft {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let mut planner = FftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);

        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        Self {
            size,
            forward,
            inverse,
            scratch: vec![Complex32::new(0.0, 0.0); scratch_len],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// In-place forward transform. `buffer.len()` must equal [`size()`](Self::size).
    #[inline]
    pub fn forward(&mut self, buffer: &mut [Complex32]) {
        debug_assert_eq!(buffer.len(), self.size);
        self.forward.process_with_scratch(buffer, &mut self.scratch);
    }

    /// In-place inverse transform, unnormalized: the result is scaled by
    /// `size` relative to the time-domain input.
    #[inline]
    pub fn inverse(&mut self, buffer: &mut [Complex32]) {
        debug_assert_eq!(buffer.len(), self.size);
        self.inverse.process_with_scratch(buffer, &mut self.scratch);
    }
}

impl std::fmt::Debug for FixedFft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedFft").field("size", &self.size).finish()
    }
}
