//! Error types for altair-dsp

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] altair_core::Error),

    #[error("Partitions built for hop {actual}, convolver runs at hop {expected}")]
    HopMismatch { expected: usize, actual: usize },

    #[error("Impulse response needs {required} partitions, history holds {capacity}")]
    PartitionCapacity { required: usize, capacity: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
