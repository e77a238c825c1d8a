//! Small-room reverb: four damped feedback delay lines in parallel.
//!
//! Line lengths are a base length derived from the room size scaled by
//! irrational ratios, so their echoes never line up into a flutter.

use altair_core::RingBuffer;
use std::f32::consts::{PI, SQRT_2};

const GOLDEN_RATIO: f32 = 1.618_034;
const LINE_RATIOS: [f32; 4] = [1.0, 4.0 / PI, SQRT_2, GOLDEN_RATIO];

const MIN_BASE_SECS: f32 = 0.020;
const MAX_BASE_SECS: f32 = 0.060;

/// One-pole low-pass coefficient in each feedback path.
const DAMPING: f32 = 0.4;
pub const DEFAULT_DECAY: f32 = 0.7;
const OUTPUT_GAIN: f32 = 0.35;
const MAX_DECAY: f32 = 0.99;

#[derive(Debug, Clone)]
struct ReverbLine {
    ring: RingBuffer,
    length: usize,
    damp_state: f32,
}

#[derive(Debug, Clone)]
pub struct Reverb {
    sample_rate: f32,
    lines: [ReverbLine; 4],
    room_size: f32,
    decay: f32,
}

impl Reverb {
    /// Buffers are sized for the largest room, so [`set_room_size`]
    /// never allocates.
    ///
    /// [`set_room_size`]: Reverb::set_room_size
    pub fn new(sample_rate: f32) -> Self {
        let lines = LINE_RATIOS.map(|ratio| {
            let capacity = (MAX_BASE_SECS * ratio * sample_rate).ceil() as usize + 1;
            ReverbLine {
                ring: RingBuffer::new(capacity),
                length: 1,
                damp_state: 0.0,
            }
        });

        let mut reverb = Self {
            sample_rate,
            lines,
            room_size: f32::NAN,
            decay: DEFAULT_DECAY,
        };
        reverb.set_room_size(0.5);
        reverb
    }

    /// Room size 0.0-1.0, mapping the base line length to 20-60 ms.
    ///
    /// A change recomputes every line length and clears the buffers.
    pub fn set_room_size(&mut self, size: f32) {
        let size = if size.is_nan() { 0.5 } else { size.clamp(0.0, 1.0) };
        if size == self.room_size {
            return;
        }
        self.room_size = size;

        let base_secs = MIN_BASE_SECS + size * (MAX_BASE_SECS - MIN_BASE_SECS);
        let sample_rate = self.sample_rate;
        for (line, ratio) in self.lines.iter_mut().zip(LINE_RATIOS) {
            let length = (base_secs * ratio * sample_rate).round() as usize;
            line.length = length.clamp(1, line.ring.capacity());
            line.ring.clear();
            line.damp_state = 0.0;
        }
    }

    /// Feedback gain shared by all lines. Only rescales; buffers are kept.
    pub fn set_decay(&mut self, decay: f32) {
        self.decay = if decay.is_nan() {
            0.0
        } else {
            decay.clamp(0.0, MAX_DECAY)
        };
    }

    pub fn room_size(&self) -> f32 {
        self.room_size
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Line lengths in samples for the current room size.
    pub fn line_lengths(&self) -> [usize; 4] {
        [
            self.lines[0].length,
            self.lines[1].length,
            self.lines[2].length,
            self.lines[3].length,
        ]
    }

    /// Longest line in samples, i.e. the time for one full traversal.
    pub fn longest_line(&self) -> usize {
        self.lines.iter().map(|l| l.length).max().unwrap_or(1)
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let mut sum = 0.0;
        for line in &mut self.lines {
            let y = line.ring.read(line.length);
            line.damp_state = (1.0 - DAMPING) * y + DAMPING * line.damp_state;

            let write = input + self.decay * line.damp_state;
            line.ring.push(if write.is_finite() { write } else { 0.0 });
            sum += y;
        }

        let output = sum * OUTPUT_GAIN;
        if output.is_finite() {
            output
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        for line in &mut self.lines {
            line.ring.clear();
            line.damp_state = 0.0;
        }
    }
}
