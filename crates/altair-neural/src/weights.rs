//! Weight format for the GRU amp model.
//!
//! Each gate row holds `3 * HIDDEN_SIZE` values ordered update, reset,
//! candidate. Field aliases accept the names used by the usual Colab
//! training export (`rec_weight_ih_l0`, `rec_weight_hh_l0`, `rec_bias`,
//! `lin_weight`, `lin_bias`, `levelAdjust`).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

pub const HIDDEN_SIZE: usize = 9;
/// Width of a gate row: update, reset, candidate.
pub const GATE_WIDTH: usize = 3 * HIDDEN_SIZE;

/// Complete weight set for one amp capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    /// Input-to-hidden weights, one row for the single input.
    #[serde(alias = "rec_weight_ih_l0")]
    pub input_weights: [[f32; GATE_WIDTH]; 1],

    /// Hidden-to-hidden weights, one row per hidden unit.
    #[serde(alias = "rec_weight_hh_l0")]
    pub recurrent_weights: [[f32; GATE_WIDTH]; HIDDEN_SIZE],

    /// Input bias row and recurrent bias row.
    #[serde(alias = "rec_bias")]
    pub biases: [[f32; GATE_WIDTH]; 2],

    #[serde(alias = "lin_weight", deserialize_with = "flat_or_single_row")]
    pub dense_weights: [f32; HIDDEN_SIZE],

    #[serde(alias = "lin_bias", deserialize_with = "scalar_or_single")]
    pub dense_bias: f32,

    /// Output gain applied after the dense layer.
    #[serde(default = "unity", alias = "levelAdjust")]
    pub level: f32,

    /// Add the dry input to the dense output before the level.
    #[serde(default)]
    pub skip_connection: bool,
}

fn unity() -> f32 {
    1.0
}

/// `lin_bias` is exported as a one-element array; accept both shapes.
fn scalar_or_single<'de, D>(deserializer: D) -> std::result::Result<f32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Bias {
        Scalar(f32),
        Single([f32; 1]),
    }

    Ok(match Bias::deserialize(deserializer)? {
        Bias::Scalar(b) => b,
        Bias::Single([b]) => b,
    })
}

/// `lin_weight` is exported as a 1×9 output-by-input matrix; accept it and
/// the flat vector.
fn flat_or_single_row<'de, D>(
    deserializer: D,
) -> std::result::Result<[f32; HIDDEN_SIZE], D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Dense {
        Flat([f32; HIDDEN_SIZE]),
        SingleRow([[f32; HIDDEN_SIZE]; 1]),
    }

    Ok(match Dense::deserialize(deserializer)? {
        Dense::Flat(w) => w,
        Dense::SingleRow([w]) => w,
    })
}

impl Default for ModelWeights {
    /// All-zero weights at unity level: outputs silence (the dense bias).
    fn default() -> Self {
        Self {
            input_weights: [[0.0; GATE_WIDTH]; 1],
            recurrent_weights: [[0.0; GATE_WIDTH]; HIDDEN_SIZE],
            biases: [[0.0; GATE_WIDTH]; 2],
            dense_weights: [0.0; HIDDEN_SIZE],
            dense_bias: 0.0,
            level: 1.0,
            skip_connection: false,
        }
    }
}

impl ModelWeights {
    pub fn from_json_str(source: &str) -> Result<Self> {
        let weights: Self = serde_json::from_str(source)?;
        weights.validate()?;
        Ok(weights)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let weights: Self = toml::from_str(source)?;
        weights.validate()?;
        Ok(weights)
    }

    /// Reject weight sets containing NaN or infinity.
    pub fn validate(&self) -> Result<()> {
        let rows = self
            .input_weights
            .iter()
            .chain(&self.recurrent_weights)
            .chain(&self.biases);
        for (row_index, row) in rows.enumerate() {
            if let Some(col) = row.iter().position(|w| !w.is_finite()) {
                return Err(Error::InvalidWeights(format!(
                    "non-finite gate weight at row {row_index}, column {col}"
                )));
            }
        }

        if !self.dense_weights.iter().all(|w| w.is_finite()) {
            return Err(Error::InvalidWeights("non-finite dense weight".into()));
        }
        if !self.dense_bias.is_finite() || !self.level.is_finite() {
            return Err(Error::InvalidWeights(
                "non-finite dense bias or level".into(),
            ));
        }
        Ok(())
    }
}
