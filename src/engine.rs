//! The real-time signal chain.
//!
//! Per block:
//!
//! 1. The controller consumes a pending bypass toggle and picks up model /
//!    impulse response selection changes.
//! 2. Bypassed: input is copied to both outputs, done.
//! 3. The latest parameter snapshot is copied and applied.
//! 4. Re-engaging from bypass clears every stage and snaps the smoothers.
//! 5. Samples run gain → amp → cabinet → tone → delay → reverb → mix →
//!    level, and the result is written to both outputs.
//!
//! `process_block` never allocates, locks or logs.

use altair_core::error::check_block_length;
use altair_core::{EngineConfig, SmoothedValue};
use altair_dsp::{Crossfade, DelayLine, PartitionedConvolver, Reverb, ToneStage};
use altair_neural::{GruAmp, ModelTable};
use std::sync::Arc;

use crate::control::ControlMailbox;
use crate::controller::{ChainController, ChainState};
use crate::impulse::ImpulseTable;
use crate::params::ParameterSnapshot;
use crate::Result;

/// The second delay tap sits at this fraction of the primary delay.
pub const SECOND_TAP_RATIO: f32 = 0.75;

/// Owns every piece of audio-thread state. Move it into the audio callback
/// and drive it with [`process_block`](SignalChain::process_block).
pub struct SignalChain {
    config: EngineConfig,
    mailbox: Arc<ControlMailbox>,
    controller: ChainController,
    models: ModelTable,
    impulses: ImpulseTable,

    amp: GruAmp,
    convolver: PartitionedConvolver,
    tone: ToneStage,
    delay: DelayLine,
    reverb: Reverb,
    crossfade: Crossfade,
    input_gain: SmoothedValue,
    output_level: SmoothedValue,

    params: ParameterSnapshot,
    amp_block: Vec<f32>,
    cabinet_block: Vec<f32>,
}

impl SignalChain {
    pub(crate) fn new(
        config: EngineConfig,
        mailbox: Arc<ControlMailbox>,
        models: ModelTable,
        impulses: ImpulseTable,
        model_index: usize,
        impulse_index: usize,
    ) -> Result<Self> {
        let weights = models.weights(model_index)?;
        let partitions = impulses.get(impulse_index).cloned().ok_or_else(|| {
            altair_core::Error::IndexOutOfRange {
                index: impulse_index,
                len: impulses.len(),
            }
        })?;

        let sample_rate = config.sample_rate;
        let hop = config.hop_length;
        let params = mailbox.parameters();

        let mut chain = Self {
            amp: GruAmp::new(weights),
            convolver: PartitionedConvolver::with_capacity(
                partitions,
                impulses.max_partitions(),
            ),
            tone: ToneStage::new(sample_rate),
            delay: DelayLine::new(config.max_delay_samples()),
            reverb: Reverb::new(sample_rate),
            crossfade: Crossfade::new(params.mix),
            input_gain: SmoothedValue::new(params.gain, config.smoothing_secs, sample_rate),
            output_level: SmoothedValue::new(
                params.output_level,
                config.smoothing_secs,
                sample_rate,
            ),
            controller: ChainController::new(model_index, impulse_index),
            params,
            amp_block: vec![0.0; hop],
            cabinet_block: vec![0.0; hop],
            config,
            mailbox,
            models,
            impulses,
        };
        chain.apply_parameters(&params);
        chain.snap_to_targets();
        Ok(chain)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn hop_length(&self) -> usize {
        self.config.hop_length
    }

    pub fn state(&self) -> ChainState {
        self.controller.state()
    }

    pub fn model_index(&self) -> usize {
        self.controller.model_index()
    }

    pub fn impulse_index(&self) -> usize {
        self.controller.impulse_index()
    }

    /// Process one hop. All three slices must be exactly
    /// [`hop_length`](Self::hop_length) long; the mono input is written to
    /// both outputs.
    pub fn process_block(
        &mut self,
        input: &[f32],
        out_left: &mut [f32],
        out_right: &mut [f32],
    ) -> Result<()> {
        let hop = self.config.hop_length;
        check_block_length(hop, input.len())?;
        check_block_length(hop, out_left.len())?;
        check_block_length(hop, out_right.len())?;

        let transition = self.controller.begin_block(&self.mailbox);

        // Table indices were range-checked when requested.
        if let Some(index) = transition.model {
            if let Some(weights) = self.models.get(index) {
                self.amp.load(weights);
            }
        }
        if let Some(index) = transition.impulse {
            if let Some(partitions) = self.impulses.get(index) {
                self.convolver.set_partitions(partitions.clone())?;
            }
        }

        if self.controller.state() == ChainState::Bypassed {
            out_left.copy_from_slice(input);
            out_right.copy_from_slice(input);
            return Ok(());
        }

        let params = self.mailbox.parameters();
        self.apply_parameters(&params);
        if transition.reengaged {
            self.reset_stages();
            self.snap_to_targets();
        }

        for (out, &x) in self.amp_block.iter_mut().zip(input) {
            let x = if x.is_finite() { x } else { 0.0 };
            let driven = x * self.input_gain.next_sample();
            *out = if params.amp_enabled {
                self.amp.forward(driven)
            } else {
                driven
            };
        }

        if params.cabinet_enabled {
            self.convolver.process_block(&self.amp_block, &mut self.cabinet_block)?;
        } else {
            self.cabinet_block.copy_from_slice(&self.amp_block);
        }

        for ((&cab, left), right) in self
            .cabinet_block
            .iter()
            .zip(out_left.iter_mut())
            .zip(out_right.iter_mut())
        {
            let pre = self.tone.process(cab);
            let dry = pre + self.delay.process(pre);
            let wet = self.reverb.process(dry);
            let out = self.output_level.next_sample() * self.crossfade.mix(dry, wet);

            let out = if out.is_finite() { out } else { 0.0 };
            *left = out;
            *right = out;
        }

        Ok(())
    }

    fn apply_parameters(&mut self, params: &ParameterSnapshot) {
        let sample_rate = self.config.sample_rate;
        let previous = self.params;
        self.params = *params;

        self.input_gain.set_target(params.gain);
        self.output_level.set_target(params.output_level);
        self.crossfade.set_mix(params.mix);
        self.tone.set_tone(params.tone);

        let delay_samples = params.delay_time_secs * sample_rate;
        self.delay.set_delay(delay_samples);
        self.delay.set_second_tap_delay(delay_samples * SECOND_TAP_RATIO);
        self.delay.set_feedback(params.delay_feedback);
        self.delay.set_level(params.delay_level);
        self.delay.set_active(params.delay_enabled);
        self.delay.set_second_tap(params.second_tap);

        self.reverb.set_room_size(params.reverb_size);
        self.reverb.set_decay(params.reverb_decay);

        // A stage switched back in starts from silence, not stale state.
        if params.amp_enabled && !previous.amp_enabled {
            self.amp.reset();
        }
        if params.cabinet_enabled && !previous.cabinet_enabled {
            self.convolver.reset();
        }
    }

    fn reset_stages(&mut self) {
        self.amp.reset();
        self.convolver.reset();
        self.tone.reset();
        self.delay.reset();
        self.reverb.reset();
    }

    fn snap_to_targets(&mut self) {
        self.input_gain.skip_to_target();
        self.output_level.skip_to_target();

        let delay_samples = self.params.delay_time_secs * self.config.sample_rate;
        self.delay.set_delay_immediate(delay_samples);
        self.delay.set_second_tap_delay_immediate(delay_samples * SECOND_TAP_RATIO);
    }
}

impl std::fmt::Debug for SignalChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalChain")
            .field("config", &self.config)
            .field("state", &self.controller.state())
            .field("model_index", &self.controller.model_index())
            .field("impulse_index", &self.controller.impulse_index())
            .finish_non_exhaustive()
    }
}
