//! # Altair - Real-time Guitar Pedal Signal Chain
//!
//! Neural amp model, cabinet convolution, tone, delay and reverb for a
//! block-based audio callback with a separate control loop.
//!
//! ## Architecture
//!
//! Altair is an umbrella crate that coordinates:
//! - **altair-core** - Lock-free handoff, parameter ranges, smoothing, ring buffer, config
//! - **altair-dsp** - Partitioned FFT convolver, tone, delay, reverb, crossfade
//! - **altair-neural** - GRU amp model and model tables
//!
//! The audio side is a single owned [`SignalChain`]. The control side holds a
//! [`ControlHandle`]; the two only talk through atomics and an `ArcSwap`'d
//! parameter snapshot, so the audio callback never blocks.
//!
//! ## Quick Start
//!
//! ```
//! use altair::prelude::*;
//!
//! let mut crunch = ModelWeights::default();
//! crunch.skip_connection = true;
//!
//! let (mut chain, mut control) = SignalChain::builder()
//!     .sample_rate(48000.0)
//!     .hop_length(256)
//!     .model("crunch", crunch)
//!     .impulse_response("4x12", &[1.0, 0.3, 0.1])
//!     .build()?;
//!
//! // Control loop, every ~10 ms
//! let mut controls = PedalControls::default();
//! controls.footswitch = true;
//! control.poll(&controls)?;
//!
//! // Audio callback
//! let input = vec![0.0; 256];
//! let (mut left, mut right) = (vec![0.0; 256], vec![0.0; 256]);
//! chain.process_block(&input, &mut left, &mut right)?;
//! assert!(!control.is_bypassed());
//! # Ok::<(), altair::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `wav` - Load impulse responses from WAV files
//! - `render` - The `altair-render` offline WAV renderer

mod error;
pub use error::{Error, Result};

/// Re-export of altair-core for direct access
pub use altair_core as core;
/// Re-export of altair-dsp for direct access
pub use altair_dsp as dsp;
/// Re-export of altair-neural for direct access
pub use altair_neural as neural;

pub use altair_core::{EngineConfig, ParameterRange};
pub use altair_neural::{ModelTable, ModelWeights};

mod builder;
mod control;
mod controller;
mod engine;
mod impulse;
mod params;

pub use builder::AltairEngineBuilder;
pub use control::{knob, ControlHandle, ControlMailbox, PedalControls, ToggleSwitch};
pub use controller::{BlockTransition, ChainController, ChainState};
pub use engine::{SignalChain, SECOND_TAP_RATIO};
pub use impulse::ImpulseTable;
#[cfg(feature = "wav")]
pub use impulse::read_wav_mono;
pub use params::{ParameterRanges, ParameterSnapshot};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{
        AltairEngineBuilder, ChainState, ControlHandle, EngineConfig, ImpulseTable, ModelTable,
        ModelWeights, ParameterSnapshot, PedalControls, SignalChain, ToggleSwitch,
    };
}
