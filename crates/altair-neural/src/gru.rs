//! Single-layer GRU with a dense output, one sample per step.
//!
//! Per hidden unit `j`:
//!
//! ```text
//! z = σ(Wz·x + Uz·h + bz₀ + bz₁)
//! r = σ(Wr·x + Ur·h + br₀ + br₁)
//! c = tanh(Wc·x + bc₀ + r ⊙ (Uc·h + bc₁))
//! h' = (1 − z) ⊙ c + z ⊙ h
//! y = level · (d·h' + b_d [+ x])
//! ```

use crate::weights::{ModelWeights, HIDDEN_SIZE};

const UPDATE: usize = 0;
const RESET: usize = HIDDEN_SIZE;
const CANDIDATE: usize = 2 * HIDDEN_SIZE;

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// GRU amp model with persistent hidden state.
#[derive(Debug, Clone)]
pub struct GruAmp {
    weights: ModelWeights,
    hidden: [f32; HIDDEN_SIZE],
}

impl Default for GruAmp {
    fn default() -> Self {
        Self::new(&ModelWeights::default())
    }
}

impl GruAmp {
    pub fn new(weights: &ModelWeights) -> Self {
        Self {
            weights: *weights,
            hidden: [0.0; HIDDEN_SIZE],
        }
    }

    /// Replace every weight and clear the hidden state. A plain copy, safe
    /// to call from the audio thread between blocks.
    pub fn load(&mut self, weights: &ModelWeights) {
        self.weights = *weights;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.hidden = [0.0; HIDDEN_SIZE];
    }

    pub fn weights(&self) -> &ModelWeights {
        &self.weights
    }

    pub fn hidden_state(&self) -> &[f32; HIDDEN_SIZE] {
        &self.hidden
    }

    /// Advance one step and return the scaled dense output.
    ///
    /// If the step produces a non-finite hidden value it is discarded, the
    /// previous state is kept and the sample is silent.
    #[inline]
    pub fn forward(&mut self, x: f32) -> f32 {
        let w = &self.weights;
        let input = &w.input_weights[0];
        let [bias_in, bias_rec] = &w.biases;

        let mut next = [0.0f32; HIDDEN_SIZE];
        for (j, out) in next.iter_mut().enumerate() {
            let (zi, ri, ci) = (UPDATE + j, RESET + j, CANDIDATE + j);

            let (mut uz, mut ur, mut uc) = (0.0f32, 0.0f32, 0.0f32);
            for (row, &h) in w.recurrent_weights.iter().zip(&self.hidden) {
                uz += row[zi] * h;
                ur += row[ri] * h;
                uc += row[ci] * h;
            }

            let z = sigmoid(input[zi] * x + uz + bias_in[zi] + bias_rec[zi]);
            let r = sigmoid(input[ri] * x + ur + bias_in[ri] + bias_rec[ri]);
            let c = (input[ci] * x + bias_in[ci] + r * (uc + bias_rec[ci])).tanh();

            *out = (1.0 - z) * c + z * self.hidden[j];
        }

        if !next.iter().all(|h| h.is_finite()) {
            return 0.0;
        }
        self.hidden = next;

        let mut y = w.dense_bias
            + w.dense_weights
                .iter()
                .zip(&self.hidden)
                .map(|(d, h)| d * h)
                .sum::<f32>();
        if w.skip_connection {
            y += x;
        }
        let y = y * w.level;

        if y.is_finite() {
            y
        } else {
            0.0
        }
    }
}
