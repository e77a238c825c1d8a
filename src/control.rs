//! Control loop → audio callback handoff.
//!
//! [`ControlMailbox`] is shared between the two threads. Every field has a
//! single writer:
//!
//! | field | writer | reader |
//! |---|---|---|
//! | `parameters` | control | audio, once per block |
//! | `toggle_request` | control (set) | audio (take, once per block) |
//! | `model_index`, `impulse_index` | control | audio, once per block |
//! | `bypassed` | audio | control |
//!
//! The snapshot replaced by a publish is parked in `retired` until the next
//! publish, so an audio-side guard released late never drops the last
//! reference and the old allocation is always freed on the control side.
//!
//! [`ControlHandle`] is the control-side API. It validates and clamps before
//! publishing, so the audio callback can trust whatever it reads.

use altair_core::{AtomicFlag, AtomicIndex};
use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::params::{ParameterRanges, ParameterSnapshot};
use crate::Result;

/// Shared state between [`ControlHandle`] and the signal chain.
#[derive(Debug)]
pub struct ControlMailbox {
    parameters: ArcSwap<ParameterSnapshot>,
    retired: ArcSwap<ParameterSnapshot>,
    toggle_request: AtomicFlag,
    bypassed: AtomicFlag,
    model_index: AtomicIndex,
    impulse_index: AtomicIndex,
}

impl ControlMailbox {
    pub(crate) fn new(parameters: ParameterSnapshot, model: usize, impulse: usize) -> Self {
        Self {
            parameters: ArcSwap::from_pointee(parameters),
            retired: ArcSwap::from_pointee(parameters),
            toggle_request: AtomicFlag::new(false),
            bypassed: AtomicFlag::new(true),
            model_index: AtomicIndex::new(model),
            impulse_index: AtomicIndex::new(impulse),
        }
    }

    /// Copy of the latest snapshot. Lock-free, no allocation.
    #[inline]
    pub(crate) fn parameters(&self) -> ParameterSnapshot {
        **self.parameters.load()
    }

    #[inline]
    pub(crate) fn take_toggle_request(&self) -> bool {
        self.toggle_request.take()
    }

    #[inline]
    pub(crate) fn model_index(&self) -> usize {
        self.model_index.get()
    }

    #[inline]
    pub(crate) fn impulse_index(&self) -> usize {
        self.impulse_index.get()
    }

    #[inline]
    pub(crate) fn publish_bypassed(&self, bypassed: bool) {
        self.bypassed.set(bypassed);
    }
}

/// Position of a three-way toggle switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleSwitch {
    #[default]
    Down,
    Middle,
    Up,
}

impl ToggleSwitch {
    /// Down = 0, Middle = 1, Up = 2.
    pub fn position(self) -> usize {
        match self {
            Self::Down => 0,
            Self::Middle => 1,
            Self::Up => 2,
        }
    }
}

/// Knob assignments in [`PedalControls::knobs`].
pub mod knob {
    pub const GAIN: usize = 0;
    pub const MIX: usize = 1;
    pub const LEVEL: usize = 2;
    pub const TONE: usize = 3;
    pub const DELAY_TIME: usize = 4;
    pub const DELAY_FEEDBACK: usize = 5;
}

/// One reading of the pedal's physical controls.
///
/// Knobs are normalized 0.0-1.0. Toggle 1 picks the impulse response,
/// toggles 2 and 3 together pick the amp model. The footswitch toggles
/// bypass on each press.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PedalControls {
    pub knobs: [f32; 6],
    pub toggles: [ToggleSwitch; 3],
    pub footswitch: bool,
}

impl PedalControls {
    /// Toggle 2 + toggle 3, 0..=4.
    pub fn model_index(&self) -> usize {
        self.toggles[1].position() + self.toggles[2].position()
    }

    /// Toggle 1, 0..=2.
    pub fn impulse_index(&self) -> usize {
        self.toggles[0].position()
    }
}

/// Control-side handle to a running signal chain.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    mailbox: Arc<ControlMailbox>,
    ranges: ParameterRanges,
    model_count: usize,
    impulse_count: usize,
    footswitch_down: bool,
}

impl ControlHandle {
    pub(crate) fn new(
        mailbox: Arc<ControlMailbox>,
        ranges: ParameterRanges,
        model_count: usize,
        impulse_count: usize,
    ) -> Self {
        Self {
            mailbox,
            ranges,
            model_count,
            impulse_count,
            footswitch_down: false,
        }
    }

    /// Publish a new snapshot, clamped into range. Returns what was
    /// published.
    pub fn set_parameters(&self, parameters: ParameterSnapshot) -> ParameterSnapshot {
        let clamped = self.ranges.clamp(&parameters);
        let previous = self.mailbox.parameters.swap(Arc::new(clamped));
        self.mailbox.retired.store(previous);
        clamped
    }

    /// The most recently published snapshot.
    pub fn parameters(&self) -> ParameterSnapshot {
        self.mailbox.parameters()
    }

    pub fn ranges(&self) -> &ParameterRanges {
        &self.ranges
    }

    /// Ask the chain to flip bypass at its next block boundary. Requests
    /// made before the chain runs again collapse into one.
    pub fn request_bypass_toggle(&self) {
        self.mailbox.toggle_request.set(true);
    }

    /// Bypass state as last applied by the audio callback.
    pub fn is_bypassed(&self) -> bool {
        self.mailbox.bypassed.get()
    }

    pub fn select_model(&self, index: usize) -> Result<()> {
        if index >= self.model_count {
            tracing::warn!("Rejected model {} (table holds {})", index, self.model_count);
            return Err(altair_core::Error::IndexOutOfRange {
                index,
                len: self.model_count,
            }
            .into());
        }
        if self.mailbox.model_index.get() != index {
            tracing::debug!("Selecting model {}", index);
            self.mailbox.model_index.set(index);
        }
        Ok(())
    }

    pub fn select_impulse_response(&self, index: usize) -> Result<()> {
        if index >= self.impulse_count {
            tracing::warn!(
                "Rejected impulse response {} (table holds {})",
                index,
                self.impulse_count
            );
            return Err(altair_core::Error::IndexOutOfRange {
                index,
                len: self.impulse_count,
            }
            .into());
        }
        if self.mailbox.impulse_index.get() != index {
            tracing::debug!("Selecting impulse response {}", index);
            self.mailbox.impulse_index.set(index);
        }
        Ok(())
    }

    pub fn model_index(&self) -> usize {
        self.mailbox.model_index()
    }

    pub fn impulse_index(&self) -> usize {
        self.mailbox.impulse_index()
    }

    pub fn model_count(&self) -> usize {
        self.model_count
    }

    pub fn impulse_count(&self) -> usize {
        self.impulse_count
    }

    /// Map one reading of the physical controls onto the chain.
    ///
    /// Call every control tick (~10 ms). Knobs update the snapshot, the
    /// toggles select model and impulse response, and a footswitch rising
    /// edge requests a bypass toggle. Nothing is published unless it
    /// changed. Settings without a knob keep their current values.
    pub fn poll(&mut self, controls: &PedalControls) -> Result<()> {
        if controls.footswitch && !self.footswitch_down {
            self.request_bypass_toggle();
        }
        self.footswitch_down = controls.footswitch;

        let current = self.parameters();
        let knobs = &controls.knobs;
        let next = ParameterSnapshot {
            gain: self.ranges.gain.denormalize(knobs[knob::GAIN]),
            mix: self.ranges.mix.denormalize(knobs[knob::MIX]),
            output_level: self.ranges.output_level.denormalize(knobs[knob::LEVEL]),
            tone: self.ranges.tone.denormalize(knobs[knob::TONE]),
            delay_time_secs: self
                .ranges
                .delay_time_secs
                .denormalize(knobs[knob::DELAY_TIME]),
            delay_feedback: self
                .ranges
                .delay_feedback
                .denormalize(knobs[knob::DELAY_FEEDBACK]),
            ..current
        };
        if next != current {
            self.set_parameters(next);
        }

        self.select_model(controls.model_index())?;
        self.select_impulse_response(controls.impulse_index())?;
        Ok(())
    }
}
