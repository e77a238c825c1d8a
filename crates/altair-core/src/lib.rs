//! Runtime building blocks shared by the Altair signal chain.
//!
//! # Primary API
//!
//! - [`EngineConfig`]: sample rate, hop length, delay capacity, smoothing time
//! - [`AtomicFlag`], [`AtomicIndex`]: single-writer handoff
//!   primitives between the control loop and the audio callback
//! - [`ParameterRange`]: knob position ↔ real value mapping
//! - [`SmoothedValue`], [`OnePole`]: zipper-free parameter changes
//! - [`RingBuffer`]: fixed-capacity circular buffer with offset reads
//!
//! Nothing in this crate allocates after construction, so every type here is
//! safe to drive from the audio callback.

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::EngineConfig;

pub(crate) mod lockfree;
pub use lockfree::{AtomicFlag, AtomicIndex};

pub mod parameter;
pub use parameter::{ParameterRange, ParameterScale};

pub mod ring_buffer;
pub use ring_buffer::RingBuffer;

pub mod smooth;
pub use smooth::{OnePole, SmoothedValue};

