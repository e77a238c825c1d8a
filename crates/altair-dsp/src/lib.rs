//! DSP stages of the Altair signal chain: cabinet convolution, tone,
//! delay, reverb and the equal-power wet/dry crossfade.
//!
//! Every stage preallocates at construction and is driven sample-by-sample
//! (or block-by-block for the convolver) from the audio callback without
//! allocating or locking.

mod error;
pub use error::{Error, Result};

pub mod fft;
pub use fft::FixedFft;

pub mod convolver;
pub use convolver::{IrPartitions, PartitionedConvolver};

mod tone;
pub use tone::{ToneMode, ToneStage};

mod delay;
pub use delay::DelayLine;

mod reverb;
pub use reverb::Reverb;

mod crossfade;
pub use crossfade::{equal_power_gains, Crossfade, CrossfadeGains};

pub use rustfft::num_complex::Complex32;
