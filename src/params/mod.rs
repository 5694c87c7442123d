//! Plain parameter snapshots for every stage.
//!
//! These are the values the host (or the harness) hands the engine once per
//! block. Nothing here validates by rejecting: out-of-range values are pulled
//! back into range by `clamped()`, which the engine calls before any stage sees
//! them.

pub mod shared;

pub use shared::SharedParameters;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const WOW_RATE_RANGE_HZ: (f32, f32) = (0.1, 5.0);
pub const TONE_RANGE_HZ: (f32, f32) = (20.0, 22_000.0);
pub const BIT_DEPTH_RANGE: (u32, u32) = (4, 24);
pub const RATE_DIVIDER_RANGE: (u32, u32) = (1, 16);
pub const PRE_DELAY_MAX_MS: f32 = 120.0;
pub const DECAY_RANGE_S: (f32, f32) = (0.1, 8.0);
pub const NOISE_LEVEL_RANGE_DB: (f32, f32) = (-60.0, -20.0);
pub const OUTPUT_GAIN_RANGE_DB: (f32, f32) = (-24.0, 24.0);

/// NaN falls back to `fallback`; everything else is clamped.
fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

fn unit(value: f32, fallback: f32) -> f32 {
    clamp_or(value, 0.0, 1.0, fallback)
}

/// Note length of one pump cycle.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncDivision {
    Quarter,
    #[default]
    Eighth,
    Sixteenth,
}

impl SyncDivision {
    pub const ALL: [SyncDivision; 3] = [Self::Quarter, Self::Eighth, Self::Sixteenth];

    /// Out-of-range indices fall back to an eighth note.
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => Self::Quarter,
            2 => Self::Sixteenth,
            _ => Self::Eighth,
        }
    }

    pub fn index(self) -> u32 {
        match self {
            Self::Quarter => 0,
            Self::Eighth => 1,
            Self::Sixteenth => 2,
        }
    }

    /// Cycles per quarter note.
    pub fn cycles_per_beat(self) -> f64 {
        match self {
            Self::Quarter => 1.0,
            Self::Eighth => 2.0,
            Self::Sixteenth => 4.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Quarter => "1/4",
            Self::Eighth => "1/8",
            Self::Sixteenth => "1/16",
        }
    }
}

/// Where the hiss enters the signal path.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseRouting {
    /// Added to the input before the tape stage.
    PreChain,
    /// Added after tape, before dirt.
    #[default]
    MidChain,
    /// Added after output gain.
    PostMix,
    /// Added inside the dry/wet mix, next to both signals.
    Parallel,
}

impl NoiseRouting {
    pub const ALL: [NoiseRouting; 4] = [
        Self::PreChain,
        Self::MidChain,
        Self::PostMix,
        Self::Parallel,
    ];

    pub fn from_index(index: u32) -> Self {
        match index {
            0 => Self::PreChain,
            2 => Self::PostMix,
            3 => Self::Parallel,
            _ => Self::MidChain,
        }
    }

    pub fn index(self) -> u32 {
        match self {
            Self::PreChain => 0,
            Self::MidChain => 1,
            Self::PostMix => 2,
            Self::Parallel => 3,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapeParameters {
    pub wow_depth: f32,
    pub wow_rate_hz: f32,
    pub flutter_depth: f32,
    pub tone_cutoff_hz: f32,
}

impl Default for TapeParameters {
    fn default() -> Self {
        Self {
            wow_depth: 0.15,
            wow_rate_hz: 0.6,
            flutter_depth: 0.08,
            tone_cutoff_hz: 11_000.0,
        }
    }
}

impl TapeParameters {
    pub fn clamped(&self) -> Self {
        let d = Self::default();
        Self {
            wow_depth: unit(self.wow_depth, d.wow_depth),
            wow_rate_hz: clamp_or(
                self.wow_rate_hz,
                WOW_RATE_RANGE_HZ.0,
                WOW_RATE_RANGE_HZ.1,
                d.wow_rate_hz,
            ),
            flutter_depth: unit(self.flutter_depth, d.flutter_depth),
            tone_cutoff_hz: clamp_or(
                self.tone_cutoff_hz,
                TONE_RANGE_HZ.0,
                TONE_RANGE_HZ.1,
                d.tone_cutoff_hz,
            ),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirtParameters {
    pub saturation: f32,
    pub bit_depth: u32,
    pub rate_divider: u32,
}

impl Default for DirtParameters {
    fn default() -> Self {
        Self {
            saturation: 0.35,
            bit_depth: 12,
            rate_divider: 2,
        }
    }
}

impl DirtParameters {
    pub fn clamped(&self) -> Self {
        Self {
            saturation: unit(self.saturation, Self::default().saturation),
            bit_depth: self.bit_depth.clamp(BIT_DEPTH_RANGE.0, BIT_DEPTH_RANGE.1),
            rate_divider: self
                .rate_divider
                .clamp(RATE_DIVIDER_RANGE.0, RATE_DIVIDER_RANGE.1),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PumpParameters {
    pub amount: f32,
    pub division: SyncDivision,
    pub phase_offset: f32,
}

impl Default for PumpParameters {
    fn default() -> Self {
        Self {
            amount: 0.35,
            division: SyncDivision::Eighth,
            phase_offset: 0.0,
        }
    }
}

impl PumpParameters {
    pub fn clamped(&self) -> Self {
        Self {
            amount: unit(self.amount, Self::default().amount),
            division: self.division,
            phase_offset: unit(self.phase_offset, 0.0),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParameters {
    pub pre_delay_ms: f32,
    pub decay_s: f32,
    pub damping: f32,
    pub mix: f32,
}

impl Default for ReverbParameters {
    fn default() -> Self {
        Self {
            pre_delay_ms: 20.0,
            decay_s: 1.8,
            damping: 0.35,
            mix: 0.0,
        }
    }
}

impl ReverbParameters {
    pub fn clamped(&self) -> Self {
        let d = Self::default();
        Self {
            pre_delay_ms: clamp_or(self.pre_delay_ms, 0.0, PRE_DELAY_MAX_MS, d.pre_delay_ms),
            decay_s: clamp_or(self.decay_s, DECAY_RANGE_S.0, DECAY_RANGE_S.1, d.decay_s),
            damping: unit(self.damping, d.damping),
            mix: unit(self.mix, d.mix),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParameters {
    pub level_db: f32,
    pub routing: NoiseRouting,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            level_db: -48.0,
            routing: NoiseRouting::MidChain,
        }
    }
}

impl NoiseParameters {
    pub fn clamped(&self) -> Self {
        Self {
            level_db: clamp_or(
                self.level_db,
                NOISE_LEVEL_RANGE_DB.0,
                NOISE_LEVEL_RANGE_DB.1,
                Self::default().level_db,
            ),
            routing: self.routing,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalParameters {
    pub wet_mix: f32,
    pub output_gain_db: f32,
    pub bypass: bool,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            wet_mix: 0.5,
            output_gain_db: 0.0,
            bypass: false,
        }
    }
}

impl GlobalParameters {
    pub fn clamped(&self) -> Self {
        Self {
            wet_mix: unit(self.wet_mix, Self::default().wet_mix),
            output_gain_db: clamp_or(
                self.output_gain_db,
                OUTPUT_GAIN_RANGE_DB.0,
                OUTPUT_GAIN_RANGE_DB.1,
                0.0,
            ),
            bypass: self.bypass,
        }
    }
}

/// Everything the engine needs for one block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineParameters {
    pub tape: TapeParameters,
    pub dirt: DirtParameters,
    pub pump: PumpParameters,
    pub reverb: ReverbParameters,
    pub noise: NoiseParameters,
    pub global: GlobalParameters,
}

impl EngineParameters {
    pub fn clamped(&self) -> Self {
        Self {
            tape: self.tape.clamped(),
            dirt: self.dirt.clamped(),
            pump: self.pump.clamped(),
            reverb: self.reverb.clamped(),
            noise: self.noise.clamped(),
            global: self.global.clamped(),
        }
    }
}
