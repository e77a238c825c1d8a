//! Offline renderer. Runs a mono WAV through the signal chain in hop-sized
//! blocks and writes a stereo 32-bit float WAV.
//!
//! ```text
//! altair-render <input.wav> <output.wav>
//!     [--config engine.toml] [--preset preset.toml]
//!     [--models pack.json | model_dir/] [--model N]
//!     [--ir cab.wav]... [--ir-index N]
//! ```

use altair::{EngineConfig, Error, ModelWeights, ParameterSnapshot, Result, SignalChain};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Default)]
struct Args {
    input: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    preset: Option<PathBuf>,
    models: Option<PathBuf>,
    model_index: usize,
    impulses: Vec<PathBuf>,
    impulse_index: usize,
}

fn usage() -> Error {
    Error::Core(altair::core::Error::InvalidConfig(
        "usage: altair-render <input.wav> <output.wav> [--config FILE] [--preset FILE] \
         [--models PATH] [--model N] [--ir FILE]... [--ir-index N]"
            .into(),
    ))
}

fn parse_index(value: Option<String>) -> Result<usize> {
    value.and_then(|v| v.parse().ok()).ok_or_else(usage)
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut positional = Vec::new();
    let mut iter = env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config = Some(iter.next().ok_or_else(usage)?.into()),
            "--preset" => args.preset = Some(iter.next().ok_or_else(usage)?.into()),
            "--models" => args.models = Some(iter.next().ok_or_else(usage)?.into()),
            "--model" => args.model_index = parse_index(iter.next())?,
            "--ir" => args.impulses.push(iter.next().ok_or_else(usage)?.into()),
            "--ir-index" => args.impulse_index = parse_index(iter.next())?,
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let [input, output] = <[PathBuf; 2]>::try_from(positional).map_err(|_| usage())?;
    args.input = input;
    args.output = output;
    Ok(args)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = parse_args()?;
    let sample_rate = hound::WavReader::open(&args.input)?.spec().sample_rate;
    let input = altair::read_wav_mono(&args.input)?;

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_toml_file(path)?,
        None => EngineConfig::default(),
    };
    config.sample_rate = sample_rate as f32;

    let parameters = match &args.preset {
        Some(path) => ParameterSnapshot::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => ParameterSnapshot::default(),
    };

    let mut builder = SignalChain::builder()
        .config(config)
        .parameters(parameters)
        .default_model(args.model_index)
        .default_impulse_response(args.impulse_index);

    builder = match &args.models {
        Some(path) if path.is_dir() => builder.model_dir(path),
        Some(path) => builder.model_pack(path),
        // Clean DI: zero weights with the dry input passed through
        None => builder.model(
            "direct",
            ModelWeights {
                skip_connection: true,
                ..Default::default()
            },
        ),
    };

    if args.impulses.is_empty() {
        builder = builder.impulse_response("direct", &[1.0]);
    }
    for path in &args.impulses {
        builder = builder.impulse_response_wav(path);
    }

    let (mut chain, control) = builder.build()?;
    control.request_bypass_toggle();

    let rendered = render(&mut chain, &input)?;
    write_stereo(&args.output, sample_rate, &rendered)?;

    tracing::info!(
        "Rendered {} samples from {} to {}",
        input.len(),
        args.input.display(),
        args.output.display()
    );
    Ok(())
}

/// Run `input` through the chain; the last block is zero-padded.
fn render(chain: &mut SignalChain, input: &[f32]) -> Result<Vec<(f32, f32)>> {
    let hop = chain.hop_length();
    let mut block = vec![0.0; hop];
    let mut left = vec![0.0; hop];
    let mut right = vec![0.0; hop];
    let mut rendered = Vec::with_capacity(input.len());

    for chunk in input.chunks(hop) {
        block[..chunk.len()].copy_from_slice(chunk);
        block[chunk.len()..].fill(0.0);

        chain.process_block(&block, &mut left, &mut right)?;
        rendered.extend(left.iter().copied().zip(right.iter().copied()).take(chunk.len()));
    }
    Ok(rendered)
}

fn write_stereo(path: &Path, sample_rate: u32, frames: &[(f32, f32)]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &(l, r) in frames {
        writer.write_sample(l)?;
        writer.write_sample(r)?;
    }
    writer.finalize()?;
    Ok(())
}
