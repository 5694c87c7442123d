// Purpose - audio buffers and host-facing transport data

pub mod transport;

pub use transport::TransportInfo;

/// Per-channel sample buffers sized once, reused every block.
///
/// Capacity (`max_len`) and channel count are fixed at construction. The
/// active length can shrink for short host blocks but never exceeds capacity.
#[derive(Debug, Default, Clone)]
pub struct AudioBlock {
    channels: Vec<Vec<f32>>,
    len: usize,
}

impl AudioBlock {
    pub fn new(num_channels: usize, max_len: usize) -> Self {
        Self {
            channels: vec![vec![0.0; max_len]; num_channels],
            len: max_len,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn max_len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Change the active length. Clamped to capacity.
    pub fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.max_len(), "block length exceeds capacity");
        self.len = len.min(self.max_len());
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index][..self.len]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        let len = self.len;
        &mut self.channels[index][..len]
    }

    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        let len = self.len;
        self.channels.iter().map(move |c| &c[..len])
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        let len = self.len;
        self.channels.iter_mut().map(move |c| &mut c[..len])
    }

    /// Zero the active region of every channel.
    pub fn clear(&mut self) {
        for channel in self.channels_mut() {
            channel.fill(0.0);
        }
    }

    /// Copy `other`'s active samples into this block and adopt its length.
    ///
    /// Channels missing from `other` are cleared; extra channels in `other`
    /// are ignored.
    pub fn copy_from(&mut self, other: &AudioBlock) {
        self.set_len(other.len());
        let len = self.len;
        for (index, dst) in self.channels.iter_mut().enumerate() {
            match other.channels.get(index) {
                Some(src) => dst[..len].copy_from_slice(&src[..len]),
                None => dst[..len].fill(0.0),
            }
        }
    }

    /// Deinterleave `frames` frames of `source` into this block.
    ///
    /// Missing source channels are zeroed.
    pub fn read_interleaved(&mut self, source: &[f32], source_channels: usize) {
        let source_channels = source_channels.max(1);
        let frames = (source.len() / source_channels).min(self.max_len());
        self.set_len(frames);

        for (ch, dst) in self.channels.iter_mut().enumerate() {
            for (frame, sample) in dst[..frames].iter_mut().enumerate() {
                *sample = if ch < source_channels {
                    source[frame * source_channels + ch]
                } else {
                    0.0
                };
            }
        }
    }

    /// Interleave the active region into `dest`, which holds `dest_channels`
    /// samples per frame. Extra destination channels receive silence.
    pub fn write_interleaved(&self, dest: &mut [f32], dest_channels: usize) {
        let dest_channels = dest_channels.max(1);
        let frames = (dest.len() / dest_channels).min(self.len);

        for frame in 0..frames {
            for ch in 0..dest_channels {
                dest[frame * dest_channels + ch] = match self.channels.get(ch) {
                    Some(channel) => channel[frame],
                    None => 0.0,
                };
            }
        }
    }
}
