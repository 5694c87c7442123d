//! Circular delay line with fractional (linearly interpolated) reads.

/*
Circular Delay Line
===================

A delay line remembers the last N samples in a ring. Every sample we write
at the cursor and advance it; reading "d samples ago" means looking back
from the most recent write.

    capacity = 8, cursor after writing x[n] points at slot 3

      slot:   0     1     2     3     4     5     6     7
            x[n-2] x[n-1] x[n] x[n-7] x[n-6] x[n-5] x[n-4] x[n-3]
                           ↑     ↑
                      newest     next write

Vocabulary
----------

  cursor        Index of the next write. Always in [0, capacity) and wraps
                exactly at capacity.

  delay         How far back to read, in samples. May be fractional.

  tap           An integer slot index the read touches. A fractional read
                touches two neighbouring taps.


Fractional Reads
----------------

Modulated delays (wow, flutter, chorus) sweep the delay time smoothly, so the
read position lands between samples. We interpolate linearly between the two
taps that surround it:

    position = (cursor - 1) - delay        wrapped into [0, capacity)
    i0       = floor(position)
    i1       = i0 + 1                      wrapped
    frac     = position - i0

    out      = buffer[i0] * (1 - frac) + buffer[i1] * frac

An integral delay has frac = 0 and reads exactly one tap, so a fixed delay of
576 samples is a bit-exact 576-sample delay.


Sizing
------

The ring is allocated once (when the sample rate is known) and never grows
on the audio thread. Requested delays are clamped to [0, capacity - 2] so the
second tap never reaches the slot that is about to be overwritten.
*/

#[derive(Debug, Default)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            write_pos: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut line = Self::new();
        line.allocate(capacity);
        line
    }

    /// Size the ring for `capacity` samples and clear it.
    ///
    /// Allocates. Only call this while preparing, never from the audio thread.
    pub fn allocate(&mut self, capacity: usize) {
        self.buffer = vec![0.0; capacity.max(2)];
        self.write_pos = 0;
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Largest delay (in samples) a read can honour.
    pub fn max_delay(&self) -> f32 {
        self.buffer.len().saturating_sub(2) as f32
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Store a sample at the cursor and advance it.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        debug_assert!(!self.buffer.is_empty(), "delay line used before allocate()");

        self.buffer[self.write_pos] = sample;
        self.write_pos += 1;
        if self.write_pos == self.buffer.len() {
            self.write_pos = 0;
        }
    }

    /// Read `delay_samples` behind the most recent write, interpolating
    /// between the two surrounding taps.
    #[inline]
    pub fn read_interpolated(&self, delay_samples: f32) -> f32 {
        let capacity = self.buffer.len();
        let delay = delay_samples.clamp(0.0, self.max_delay());

        let mut position = self.write_pos as f32 - 1.0 - delay;
        if position < 0.0 {
            position += capacity as f32;
        }

        let i0 = (position as usize).min(capacity - 1);
        let frac = position - i0 as f32;
        let i1 = if i0 + 1 == capacity { 0 } else { i0 + 1 };

        if frac <= 0.0 {
            return self.buffer[i0];
        }

        self.buffer[i0] * (1.0 - frac) + self.buffer[i1] * frac
    }

    /// Write `sample`, then read back `delay_samples` behind it.
    ///
    /// A delay of zero returns `sample` unchanged.
    #[inline]
    pub fn next_sample(&mut self, sample: f32, delay_samples: f32) -> f32 {
        self.write(sample);
        self.read_interpolated(delay_samples)
    }

    /// Run a whole buffer through a fixed delay, in place.
    pub fn render(&mut self, buffer: &mut [f32], delay_samples: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, delay_samples);
        }
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
