//! GRU amplifier model for the Altair signal chain.
//!
//! A single recurrent layer with nine hidden units followed by a dense
//! projection, evaluated one sample at a time. Weights live in fixed-size
//! arrays, so loading a model is a plain copy and inference never allocates.
//!
//! ## Usage
//!
//! ```
//! use altair_neural::{GruAmp, ModelWeights};
//!
//! let mut weights = ModelWeights::default();
//! weights.dense_bias = 1.0;
//!
//! let mut amp = GruAmp::new(&weights);
//! assert_eq!(amp.forward(0.3), 1.0);
//! ```

mod error;
pub use error::{Error, Result};

mod weights;
pub use weights::{ModelWeights, GATE_WIDTH, HIDDEN_SIZE};

mod gru;
pub use gru::GruAmp;

mod table;
pub use table::{ModelEntry, ModelTable};
