//! Centralized error type for the altair umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] altair_core::Error),

    #[error("DSP: {0}")]
    Dsp(#[from] altair_dsp::Error),

    #[error("Neural: {0}")]
    Neural(#[from] altair_neural::Error),

    #[error("Model table is empty")]
    EmptyModelTable,

    #[error("Impulse response table is empty")]
    EmptyImpulseTable,

    #[cfg(feature = "wav")]
    #[error("WAV: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
