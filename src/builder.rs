//! Builder for configuring and constructing a [`SignalChain`] and its
//! [`ControlHandle`].

use altair_core::EngineConfig;
use altair_neural::{ModelTable, ModelWeights};
use std::path::PathBuf;
use std::sync::Arc;

use crate::control::{ControlHandle, ControlMailbox};
use crate::engine::SignalChain;
use crate::impulse::ImpulseTable;
use crate::params::{ParameterRanges, ParameterSnapshot};
use crate::{Error, Result};

enum ModelSource {
    Weights(String, ModelWeights),
    Table(ModelTable),
    Pack(PathBuf),
    Dir(PathBuf),
}

enum ImpulseSource {
    Samples(String, Vec<f32>),
    #[cfg(feature = "wav")]
    Wav(PathBuf),
}

/// Tables are loaded and impulse responses partitioned in
/// [`build`](AltairEngineBuilder::build), off the audio thread. Models and
/// impulse responses are indexed in the order they were added.
///
/// # Example
///
/// ```
/// use altair::prelude::*;
///
/// let (mut chain, control) = SignalChain::builder()
///     .hop_length(128)
///     .model("clean", ModelWeights::default())
///     .impulse_response("direct", &[1.0])
///     .build()?;
///
/// control.request_bypass_toggle();
///
/// let input = vec![0.0; 128];
/// let (mut left, mut right) = (vec![0.0; 128], vec![0.0; 128]);
/// chain.process_block(&input, &mut left, &mut right)?;
/// assert!(!control.is_bypassed());
/// # Ok::<(), altair::Error>(())
/// ```
pub struct AltairEngineBuilder {
    config: EngineConfig,
    models: Vec<ModelSource>,
    impulses: Vec<ImpulseSource>,
    model_index: usize,
    impulse_index: usize,
    parameters: ParameterSnapshot,
}

impl Default for AltairEngineBuilder {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            models: Vec::new(),
            impulses: Vec::new(),
            model_index: 0,
            impulse_index: 0,
            parameters: ParameterSnapshot::default(),
        }
    }
}

impl SignalChain {
    pub fn builder() -> AltairEngineBuilder {
        AltairEngineBuilder::default()
    }
}

impl AltairEngineBuilder {
    /// Replace the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 48000
    pub fn sample_rate(mut self, sample_rate: f32) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    /// Default: 256. Must be a power of two.
    pub fn hop_length(mut self, hop_length: usize) -> Self {
        self.config.hop_length = hop_length;
        self
    }

    /// Default: 2.0
    pub fn max_delay_secs(mut self, secs: f32) -> Self {
        self.config.max_delay_secs = secs;
        self
    }

    /// Default: 0.010
    pub fn smoothing_secs(mut self, secs: f32) -> Self {
        self.config.smoothing_secs = secs;
        self
    }

    pub fn model(mut self, name: impl Into<String>, weights: ModelWeights) -> Self {
        self.models.push(ModelSource::Weights(name.into(), weights));
        self
    }

    /// Append every model of an already loaded table.
    pub fn model_table(mut self, table: ModelTable) -> Self {
        self.models.push(ModelSource::Table(table));
        self
    }

    /// Append the models of a JSON or TOML model pack.
    pub fn model_pack(mut self, path: impl Into<PathBuf>) -> Self {
        self.models.push(ModelSource::Pack(path.into()));
        self
    }

    /// Append one model per `.json` / `.toml` file in a directory.
    pub fn model_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.models.push(ModelSource::Dir(path.into()));
        self
    }

    pub fn impulse_response(mut self, name: impl Into<String>, samples: &[f32]) -> Self {
        self.impulses.push(ImpulseSource::Samples(name.into(), samples.to_vec()));
        self
    }

    #[cfg(feature = "wav")]
    pub fn impulse_response_wav(mut self, path: impl Into<PathBuf>) -> Self {
        self.impulses.push(ImpulseSource::Wav(path.into()));
        self
    }

    /// Model active at power-up. Default: 0
    pub fn default_model(mut self, index: usize) -> Self {
        self.model_index = index;
        self
    }

    /// Impulse response active at power-up. Default: 0
    pub fn default_impulse_response(mut self, index: usize) -> Self {
        self.impulse_index = index;
        self
    }

    /// Initial parameter snapshot, clamped into range.
    pub fn parameters(mut self, parameters: ParameterSnapshot) -> Self {
        self.parameters = parameters;
        self
    }

    /// The chain powers up bypassed. Move it into the audio callback; keep
    /// the handle on the control side.
    pub fn build(self) -> Result<(SignalChain, ControlHandle)> {
        self.config.validate()?;

        let mut models = ModelTable::new();
        for source in self.models {
            match source {
                ModelSource::Weights(name, weights) => {
                    models.push(name, weights)?;
                }
                ModelSource::Table(table) => append_models(&mut models, &table)?,
                ModelSource::Pack(path) => {
                    append_models(&mut models, &ModelTable::from_pack_file(path)?)?
                }
                ModelSource::Dir(path) => {
                    append_models(&mut models, &ModelTable::from_dir(path)?)?
                }
            }
        }
        if models.is_empty() {
            return Err(Error::EmptyModelTable);
        }

        let mut impulses = ImpulseTable::new(self.config.hop_length);
        for source in self.impulses {
            match source {
                ImpulseSource::Samples(name, samples) => {
                    impulses.push(name, &samples)?;
                }
                #[cfg(feature = "wav")]
                ImpulseSource::Wav(path) => {
                    impulses.push_wav(path)?;
                }
            }
        }
        if impulses.is_empty() {
            return Err(Error::EmptyImpulseTable);
        }

        let ranges = ParameterRanges::new(self.config.max_delay_secs);
        let parameters = ranges.clamp(&self.parameters);
        let model_count = models.len();
        let impulse_count = impulses.len();

        let mailbox = Arc::new(ControlMailbox::new(
            parameters,
            self.model_index,
            self.impulse_index,
        ));
        let chain = SignalChain::new(
            self.config.clone(),
            mailbox.clone(),
            models,
            impulses,
            self.model_index,
            self.impulse_index,
        )?;

        tracing::info!(
            "Altair chain ready: {} Hz, hop {}, {} models, {} impulse responses",
            self.config.sample_rate,
            self.config.hop_length,
            model_count,
            impulse_count
        );

        let handle = ControlHandle::new(mailbox, ranges, model_count, impulse_count);
        Ok((chain, handle))
    }
}

fn append_models(into: &mut ModelTable, from: &ModelTable) -> Result<()> {
    for entry in from.iter() {
        into.push(entry.name.clone(), entry.weights)?;
    }
    Ok(())
}
