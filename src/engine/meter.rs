//! Level metering and scope taps shared with display threads.
//!
//! The audio thread writes, display threads read, nobody waits. Every value is
//! an independent relaxed atomic: a reader may see channel 0 from this block
//! and channel 1 from the last one, which a meter never notices.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::{
    dsp::level::{peak, rms},
    io::AudioBlock,
    MAX_CHANNELS,
};

/// Peak at or above this counts as clipping.
pub const CLIP_THRESHOLD: f32 = 1.0;

/// One channel's levels for one block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeterReading {
    pub peak: f32,
    pub rms: f32,
    pub clip: bool,
}

#[derive(Debug, Default)]
struct ChannelMeter {
    peak: AtomicU32,
    rms: AtomicU32,
    clip: AtomicBool,
}

impl ChannelMeter {
    fn store(&self, reading: MeterReading) {
        self.peak.store(reading.peak.to_bits(), Ordering::Relaxed);
        self.rms.store(reading.rms.to_bits(), Ordering::Relaxed);
        self.clip.store(reading.clip, Ordering::Relaxed);
    }

    fn load(&self) -> MeterReading {
        MeterReading {
            peak: f32::from_bits(self.peak.load(Ordering::Relaxed)),
            rms: f32::from_bits(self.rms.load(Ordering::Relaxed)),
            clip: self.clip.load(Ordering::Relaxed),
        }
    }
}

/// Per-channel meters for one tap point (input or output).
#[derive(Debug)]
pub struct MeterBank {
    channels: Vec<ChannelMeter>,
    active_channels: AtomicU32,
}

impl MeterBank {
    fn new() -> Self {
        Self {
            channels: (0..MAX_CHANNELS).map(|_| ChannelMeter::default()).collect(),
            active_channels: AtomicU32::new(0),
        }
    }

    /// Measure every channel of `block` and publish the results.
    pub fn publish(&self, block: &AudioBlock) {
        let count = block.num_channels().min(self.channels.len());
        for (meter, samples) in self.channels.iter().zip(block.channels()) {
            let block_peak = peak(samples);
            meter.store(MeterReading {
                peak: block_peak,
                rms: rms(samples),
                clip: block_peak >= CLIP_THRESHOLD,
            });
        }
        for meter in &self.channels[count..] {
            meter.store(MeterReading::default());
        }
        self.active_channels.store(count as u32, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        for meter in &self.channels {
            meter.store(MeterReading::default());
        }
    }

    /// Number of channels in the last published block.
    pub fn channel_count(&self) -> usize {
        self.active_channels.load(Ordering::Relaxed) as usize
    }

    /// Reading for `channel`; channels out of range read as silence.
    pub fn reading(&self, channel: usize) -> MeterReading {
        self.channels
            .get(channel)
            .map(ChannelMeter::load)
            .unwrap_or_default()
    }

    pub fn peak(&self, channel: usize) -> f32 {
        self.reading(channel).peak
    }

    pub fn rms(&self, channel: usize) -> f32 {
        self.reading(channel).rms
    }

    pub fn clip(&self, channel: usize) -> bool {
        self.reading(channel).clip
    }
}

/// Input and output meters for one engine.
#[derive(Debug)]
pub struct LevelMeters {
    pub input: MeterBank,
    pub output: MeterBank,
}

impl LevelMeters {
    pub fn new() -> Self {
        Self {
            input: MeterBank::new(),
            output: MeterBank::new(),
        }
    }

    pub fn clear(&self) {
        self.input.clear();
        self.output.clear();
    }
}

impl Default for LevelMeters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "rtrb")]
pub use scope::{ScopeReader, ScopeTap};

#[cfg(feature = "rtrb")]
mod scope {
    use rtrb::{Consumer, Producer, RingBuffer};

    use crate::io::AudioBlock;

    /// Audio-thread end of a mono scope feed.
    ///
    /// Pushes the channel average of every processed frame. When the display
    /// falls behind, new samples are dropped rather than blocking.
    pub struct ScopeTap {
        producer: Producer<f32>,
    }

    /// Display-thread end of a scope feed.
    pub struct ScopeReader {
        consumer: Consumer<f32>,
    }

    impl ScopeTap {
        pub fn new(capacity: usize) -> (Self, ScopeReader) {
            let (producer, consumer) = RingBuffer::new(capacity);
            (Self { producer }, ScopeReader { consumer })
        }

        pub fn push_block(&mut self, block: &AudioBlock) {
            let channels = block.num_channels();
            if channels == 0 {
                return;
            }
            let scale = 1.0 / channels as f32;
            for frame in 0..block.len() {
                if self.producer.is_full() {
                    return;
                }
                let sum: f32 = block.channels().map(|c| c[frame]).sum();
                let _ = self.producer.push(sum * scale);
            }
        }
    }

    impl ScopeReader {
        /// Move everything available into `dest`, keeping at most `keep`
        /// of the newest samples.
        pub fn drain_into(&mut self, dest: &mut Vec<f32>, keep: usize) {
            while let Ok(sample) = self.consumer.pop() {
                dest.push(sample);
            }
            if dest.len() > keep {
                let excess = dest.len() - keep;
                dest.drain(..excess);
            }
        }

        pub fn available(&self) -> usize {
            self.consumer.slots()
        }
    }
}
