//! Per-block cost of the partitioned convolver at the default hop.

use altair_dsp::PartitionedConvolver;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

const HOP: usize = 256;

fn white_noise(len: usize) -> Vec<f32> {
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as i32) as f32 / (i32::MAX as f32)
        })
        .collect()
}

/// Exponentially decaying noise, like a measured cabinet response.
fn cabinet_ir(len: usize) -> Vec<f32> {
    white_noise(len)
        .into_iter()
        .enumerate()
        .map(|(i, s)| s * (-6.0 * i as f32 / len as f32).exp())
        .collect()
}

fn bench_convolver(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolver");
    let input = white_noise(HOP);
    let mut output = vec![0.0f32; HOP];

    // 256 taps up to ~170 ms at 48 kHz
    for &ir_len in &[256, 1024, 2048, 8192] {
        let ir = cabinet_ir(ir_len);

        group.bench_with_input(BenchmarkId::new("process_block", ir_len), &ir, |b, ir| {
            let Ok(mut conv) = PartitionedConvolver::from_impulse_response(ir, HOP) else {
                return;
            };
            // Fill the history ring so every partition does real work
            for _ in 0..conv.partition_count() {
                let _ = conv.process_block(&input, &mut output);
            }

            b.iter(|| {
                let _ = conv.process_block(black_box(&input), black_box(&mut output));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_convolver);
criterion_main!(benches);
