/// Host transport state for one block.
///
/// Passed explicitly into each process call. Hosts that know nothing about
/// tempo pass `None` for the whole struct; hosts that know the tempo but not
/// the song position leave `ppq_position` empty.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransportInfo {
    /// Beats per minute. Non-positive or non-finite values are ignored.
    pub bpm: Option<f64>,
    /// Position in quarter notes at the first sample of the block.
    pub ppq_position: Option<f64>,
    pub is_playing: bool,
}

impl TransportInfo {
    pub fn with_tempo(bpm: f64) -> Self {
        Self {
            bpm: Some(bpm),
            ppq_position: None,
            is_playing: false,
        }
    }

    pub fn playing(bpm: f64, ppq_position: f64) -> Self {
        Self {
            bpm: Some(bpm),
            ppq_position: Some(ppq_position),
            is_playing: true,
        }
    }

    /// Tempo if the host supplied a usable one.
    pub fn valid_bpm(&self) -> Option<f64> {
        self.bpm.filter(|bpm| bpm.is_finite() && *bpm > 0.0)
    }

    /// Song position if the host supplied a usable one.
    pub fn valid_ppq(&self) -> Option<f64> {
        self.ppq_position.filter(|ppq| ppq.is_finite())
    }
}
