//! Integer-indexed table of cabinet impulse responses.
//!
//! Every response is partitioned for the engine's hop length when it is
//! added, so selecting one on the audio thread is an `Arc` clone.

use altair_dsp::IrPartitions;
use std::sync::Arc;

use crate::Result;

#[derive(Debug, Clone)]
struct ImpulseEntry {
    name: String,
    partitions: Arc<IrPartitions>,
}

#[derive(Debug, Clone)]
pub struct ImpulseTable {
    hop: usize,
    entries: Vec<ImpulseEntry>,
}

impl ImpulseTable {
    /// Empty table partitioning for hop length `hop`.
    pub fn new(hop: usize) -> Self {
        Self {
            hop,
            entries: Vec::new(),
        }
    }

    #[inline]
    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Partition `samples` and append them; returns the new index.
    pub fn push(&mut self, name: impl Into<String>, samples: &[f32]) -> Result<usize> {
        let name = name.into();
        let partitions = IrPartitions::new(samples, self.hop)?;
        tracing::debug!(
            "Impulse response {}: {} samples, {} partitions",
            name,
            samples.len(),
            partitions.len()
        );

        self.entries.push(ImpulseEntry {
            name,
            partitions: Arc::new(partitions),
        });
        Ok(self.entries.len() - 1)
    }

    /// Load the first channel of a WAV file. Integer formats are scaled to
    /// ±1.0. The file's sample rate is not converted.
    #[cfg(feature = "wav")]
    pub fn push_wav(&mut self, path: impl AsRef<std::path::Path>) -> Result<usize> {
        let path = path.as_ref();
        let samples = read_wav_mono(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("impulse")
            .to_string();
        self.push(name, &samples)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Arc<IrPartitions>> {
        self.entries.get(index).map(|e| &e.partitions)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.name.as_str())
    }

    /// Largest partition count in the table; sizes the convolver history.
    pub fn max_partitions(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.partitions.len())
            .max()
            .unwrap_or(1)
    }
}

/// Read the first channel of a WAV file as `f32`.
#[cfg(feature = "wav")]
pub fn read_wav_mono(path: &std::path::Path) -> Result<Vec<f32>> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    Ok(interleaved.into_iter().step_by(channels).collect())
}
