//! Fixed-capacity circular sample buffer.
//!
//! Reads address samples by how many pushes ago they were written, so callers
//! never touch raw indices. Capacity is fixed at construction; nothing here
//! allocates afterwards.

/// Circular buffer of `f32` samples with offset reads.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl RingBuffer {
    /// A zeroed buffer holding the last `capacity` pushed samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            write_pos: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// The sample pushed `delay` pushes ago; `delay = 1` is the most recent.
    ///
    /// `delay` is clamped to `[1, capacity]`.
    #[inline]
    pub fn read(&self, delay: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay.clamp(1, len);
        self.buffer[(self.write_pos + len - delay) % len]
    }

    /// Linearly interpolated read at a fractional delay.
    ///
    /// `delay` is clamped to `[1, capacity - 1]` so both neighbours exist.
    #[inline]
    pub fn read_interpolated(&self, delay: f32) -> f32 {
        let max = (self.buffer.len().saturating_sub(1)).max(1) as f32;
        let delay = delay.clamp(1.0, max);
        let whole = delay.floor();
        let fraction = delay - whole;

        let near = self.read(whole as usize);
        if fraction == 0.0 {
            return near;
        }
        let far = self.read(whole as usize + 1);
        near + fraction * (far - near)
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
