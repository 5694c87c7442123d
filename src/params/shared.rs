//! Lock-free parameter publication from a control thread to the audio thread.
//!
//! Each scalar lives in its own atomic. The control side calls [`store`] when
//! anything changes; the audio side calls [`snapshot`] once per block. A
//! snapshot taken while a store is in flight may mix old and new values. That
//! is fine: every audible parameter is smoothed inside the engine.
//!
//! [`store`]: SharedParameters::store
//! [`snapshot`]: SharedParameters::snapshot

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::{
    DirtParameters, EngineParameters, GlobalParameters, NoiseParameters, NoiseRouting,
    PumpParameters, ReverbParameters, SyncDivision, TapeParameters,
};

#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

#[derive(Debug)]
pub struct SharedParameters {
    wow_depth: AtomicF32,
    wow_rate_hz: AtomicF32,
    flutter_depth: AtomicF32,
    tone_cutoff_hz: AtomicF32,

    saturation: AtomicF32,
    bit_depth: AtomicU32,
    rate_divider: AtomicU32,

    pump_amount: AtomicF32,
    pump_division: AtomicU32,
    pump_phase_offset: AtomicF32,

    pre_delay_ms: AtomicF32,
    decay_s: AtomicF32,
    damping: AtomicF32,
    reverb_mix: AtomicF32,

    noise_level_db: AtomicF32,
    noise_routing: AtomicU32,

    wet_mix: AtomicF32,
    output_gain_db: AtomicF32,
    bypass: AtomicBool,
}

impl SharedParameters {
    pub fn new(initial: &EngineParameters) -> Self {
        let p = initial;
        Self {
            wow_depth: AtomicF32::new(p.tape.wow_depth),
            wow_rate_hz: AtomicF32::new(p.tape.wow_rate_hz),
            flutter_depth: AtomicF32::new(p.tape.flutter_depth),
            tone_cutoff_hz: AtomicF32::new(p.tape.tone_cutoff_hz),
            saturation: AtomicF32::new(p.dirt.saturation),
            bit_depth: AtomicU32::new(p.dirt.bit_depth),
            rate_divider: AtomicU32::new(p.dirt.rate_divider),
            pump_amount: AtomicF32::new(p.pump.amount),
            pump_division: AtomicU32::new(p.pump.division.index()),
            pump_phase_offset: AtomicF32::new(p.pump.phase_offset),
            pre_delay_ms: AtomicF32::new(p.reverb.pre_delay_ms),
            decay_s: AtomicF32::new(p.reverb.decay_s),
            damping: AtomicF32::new(p.reverb.damping),
            reverb_mix: AtomicF32::new(p.reverb.mix),
            noise_level_db: AtomicF32::new(p.noise.level_db),
            noise_routing: AtomicU32::new(p.noise.routing.index()),
            wet_mix: AtomicF32::new(p.global.wet_mix),
            output_gain_db: AtomicF32::new(p.global.output_gain_db),
            bypass: AtomicBool::new(p.global.bypass),
        }
    }

    /// Publish a full parameter set. Control thread only.
    pub fn store(&self, p: &EngineParameters) {
        self.wow_depth.store(p.tape.wow_depth);
        self.wow_rate_hz.store(p.tape.wow_rate_hz);
        self.flutter_depth.store(p.tape.flutter_depth);
        self.tone_cutoff_hz.store(p.tape.tone_cutoff_hz);

        self.saturation.store(p.dirt.saturation);
        self.bit_depth.store(p.dirt.bit_depth, Ordering::Relaxed);
        self.rate_divider.store(p.dirt.rate_divider, Ordering::Relaxed);

        self.pump_amount.store(p.pump.amount);
        self.pump_division
            .store(p.pump.division.index(), Ordering::Relaxed);
        self.pump_phase_offset.store(p.pump.phase_offset);

        self.pre_delay_ms.store(p.reverb.pre_delay_ms);
        self.decay_s.store(p.reverb.decay_s);
        self.damping.store(p.reverb.damping);
        self.reverb_mix.store(p.reverb.mix);

        self.noise_level_db.store(p.noise.level_db);
        self.noise_routing
            .store(p.noise.routing.index(), Ordering::Relaxed);

        self.wet_mix.store(p.global.wet_mix);
        self.output_gain_db.store(p.global.output_gain_db);
        self.bypass.store(p.global.bypass, Ordering::Relaxed);
    }

    pub fn set_bypass(&self, bypass: bool) {
        self.bypass.store(bypass, Ordering::Relaxed);
    }

    pub fn set_wet_mix(&self, wet_mix: f32) {
        self.wet_mix.store(wet_mix);
    }

    pub fn set_output_gain_db(&self, gain_db: f32) {
        self.output_gain_db.store(gain_db);
    }

    /// Read every scalar once. Safe to call from the audio thread.
    pub fn snapshot(&self) -> EngineParameters {
        EngineParameters {
            tape: TapeParameters {
                wow_depth: self.wow_depth.load(),
                wow_rate_hz: self.wow_rate_hz.load(),
                flutter_depth: self.flutter_depth.load(),
                tone_cutoff_hz: self.tone_cutoff_hz.load(),
            },
            dirt: DirtParameters {
                saturation: self.saturation.load(),
                bit_depth: self.bit_depth.load(Ordering::Relaxed),
                rate_divider: self.rate_divider.load(Ordering::Relaxed),
            },
            pump: PumpParameters {
                amount: self.pump_amount.load(),
                division: SyncDivision::from_index(self.pump_division.load(Ordering::Relaxed)),
                phase_offset: self.pump_phase_offset.load(),
            },
            reverb: ReverbParameters {
                pre_delay_ms: self.pre_delay_ms.load(),
                decay_s: self.decay_s.load(),
                damping: self.damping.load(),
                mix: self.reverb_mix.load(),
            },
            noise: NoiseParameters {
                level_db: self.noise_level_db.load(),
                routing: NoiseRouting::from_index(self.noise_routing.load(Ordering::Relaxed)),
            },
            global: GlobalParameters {
                wet_mix: self.wet_mix.load(),
                output_gain_db: self.output_gain_db.load(),
                bypass: self.bypass.load(Ordering::Relaxed),
            },
        }
    }
}

impl Default for SharedParameters {
    fn default() -> Self {
        Self::new(&EngineParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn snapshot_returns_what_was_stored() {
        let shared = SharedParameters::default();
        let mut params = EngineParameters::default();
        params.tape.wow_depth = 0.42;
        params.dirt.bit_depth = 6;
        params.pump.division = SyncDivision::Sixteenth;
        params.noise.routing = NoiseRouting::Parallel;
        params.global.bypass = true;

        shared.store(&params);
        assert_eq!(shared.snapshot(), params);
    }

    #[test]
    fn single_field_setters() {
        let shared = SharedParameters::default();
        shared.set_wet_mix(0.9);
        shared.set_output_gain_db(-6.0);
        shared.set_bypass(true);

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.global.wet_mix, 0.9);
        assert_eq!(snapshot.global.output_gain_db, -6.0);
        assert!(snapshot.global.bypass);
        assert_eq!(snapshot.tape, TapeParameters::default());
    }

    #[test]
    fn visible_across_threads() {
        let shared = Arc::new(SharedParameters::default());
        let writer = Arc::clone(&shared);
        std::thread::spawn(move || writer.set_wet_mix(0.25))
            .join()
            .unwrap();
        assert_eq!(shared.snapshot().global.wet_mix, 0.25);
    }
}
