//! Tempo and cycle position for tempo-synced stages.
//!
//! Hosts that run a transport hand us BPM and a song position in quarter
//! notes; we derive the pump cycle position directly from that so it stays
//! locked to the bar. Without a transport we fall back to 120 BPM and keep our
//! own free-running phase, advanced by every block we see.

use crate::{
    dsp::lfo::wrap_phase, io::TransportInfo, params::SyncDivision, stage::BlockContext,
};

pub const FALLBACK_BPM: f64 = 120.0;

/// Length of one `division` cycle in samples.
pub fn samples_per_cycle(bpm: f64, sample_rate: f64, division: SyncDivision) -> f64 {
    let seconds_per_beat = 60.0 / bpm;
    seconds_per_beat * sample_rate / division.cycles_per_beat()
}

#[derive(Debug, Clone)]
pub struct TempoClock {
    sample_rate: f64,
    bpm: f64,
    fallback_phase: f64,
    host_synced: bool,
}

impl TempoClock {
    pub fn new() -> Self {
        Self {
            sample_rate: 48_000.0,
            bpm: FALLBACK_BPM,
            fallback_phase: 0.0,
            host_synced: false,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.fallback_phase = 0.0;
        self.bpm = FALLBACK_BPM;
        self.host_synced = false;
    }

    /// Tempo used for the most recent block.
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Whether the most recent block took its phase from the host.
    pub fn is_host_synced(&self) -> bool {
        self.host_synced
    }

    pub fn fallback_phase(&self) -> f64 {
        self.fallback_phase
    }

    /// Resolve the cycle for a block of `num_samples` starting now, then move
    /// the free-running phase past it.
    pub fn advance(
        &mut self,
        transport: Option<&TransportInfo>,
        division: SyncDivision,
        num_samples: usize,
    ) -> BlockContext {
        self.bpm = transport
            .and_then(TransportInfo::valid_bpm)
            .unwrap_or(FALLBACK_BPM);

        let samples_per_cycle = samples_per_cycle(self.bpm, self.sample_rate, division);
        let host_phase = transport
            .and_then(TransportInfo::valid_ppq)
            .map(|ppq| wrap_phase(ppq * division.cycles_per_beat()));

        self.host_synced = host_phase.is_some();
        let cycle_phase = host_phase.unwrap_or(self.fallback_phase);

        if samples_per_cycle > 0.0 {
            self.fallback_phase =
                wrap_phase(self.fallback_phase + num_samples as f64 / samples_per_cycle);
        }

        BlockContext {
            samples_per_cycle,
            cycle_phase,
        }
    }
}

impl Default for TempoClock {
    fn default() -> Self {
        Self::new()
    }
}
