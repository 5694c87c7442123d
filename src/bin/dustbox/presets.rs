//! Factory presets and preset files.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use dustbox::params::{
    DirtParameters, EngineParameters, GlobalParameters, NoiseParameters, PumpParameters,
    ReverbParameters, TapeParameters,
};
use dustbox::{NoiseRouting, SyncDivision};
use std::{fs, path::Path};

use crate::cli::PresetSource;

pub struct Preset {
    pub name: &'static str,
    pub params: EngineParameters,
}

#[allow(clippy::too_many_arguments)]
fn preset(
    name: &'static str,
    tape: (f32, f32, f32, f32),
    dirt: (f32, u32, u32),
    pump: (f32, SyncDivision, f32),
    noise: (f32, NoiseRouting),
    wet_mix: f32,
    output_gain_db: f32,
) -> Preset {
    Preset {
        name,
        params: EngineParameters {
            tape: TapeParameters {
                wow_depth: tape.0,
                wow_rate_hz: tape.1,
                flutter_depth: tape.2,
                tone_cutoff_hz: tape.3,
            },
            dirt: DirtParameters {
                saturation: dirt.0,
                bit_depth: dirt.1,
                rate_divider: dirt.2,
            },
            pump: PumpParameters {
                amount: pump.0,
                division: pump.1,
                phase_offset: pump.2,
            },
            reverb: ReverbParameters::default(),
            noise: NoiseParameters {
                level_db: noise.0,
                routing: noise.1,
            },
            global: GlobalParameters {
                wet_mix,
                output_gain_db,
                bypass: false,
            },
        },
    }
}

pub fn factory() -> Vec<Preset> {
    use NoiseRouting::*;
    use SyncDivision::*;

    vec![
        preset(
            "Subtle Glue",
            (0.10, 0.55, 0.04, 16_000.0),
            (0.12, 24, 1),
            (0.08, Eighth, 0.0),
            (-58.0, MidChain),
            0.35,
            0.0,
        ),
        preset(
            "Lo-Fi Hiss",
            (0.22, 0.65, 0.12, 7_800.0),
            (0.28, 14, 3),
            (0.15, Eighth, 0.0),
            (-32.0, MidChain),
            0.58,
            -0.5,
        ),
        preset(
            "Chorus Pump",
            (0.35, 1.5, 0.24, 12_500.0),
            (0.10, 24, 1),
            (0.65, Quarter, 0.0),
            (-46.0, Parallel),
            0.65,
            -0.5,
        ),
        preset(
            "Warm Crunch",
            (0.24, 0.75, 0.14, 9_000.0),
            (0.52, 12, 2),
            (0.18, Eighth, 0.0),
            (-60.0, PreChain),
            0.62,
            -1.0,
        ),
        preset(
            "Noisy Parallel",
            (0.16, 0.60, 0.08, 11_500.0),
            (0.20, 18, 2),
            (0.22, Eighth, 0.25),
            (-30.0, Parallel),
            0.45,
            -0.5,
        ),
    ]
}

/// Case, spaces and punctuation are ignored, so `lofi-hiss` finds "Lo-Fi Hiss".
fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn find(name: &str) -> Option<Preset> {
    let wanted = normalize(name);
    factory().into_iter().find(|p| normalize(p.name) == wanted)
}

/// Load a JSON preset. Missing fields keep their defaults.
pub fn load_file(path: &Path) -> EyreResult<EngineParameters> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read preset file {}", path.display()))?;
    let params: EngineParameters = serde_json::from_str(&text)
        .wrap_err_with(|| format!("invalid preset file {}", path.display()))?;
    Ok(params)
}

/// Turn a command-line preset choice into parameters.
pub fn resolve(source: &PresetSource) -> EyreResult<EngineParameters> {
    match source {
        PresetSource::Default => Ok(EngineParameters::default()),
        PresetSource::Factory(name) => find(name)
            .map(|p| p.params)
            .ok_or_else(|| eyre!("no factory preset named '{name}' (try `dustbox presets`)")),
        PresetSource::File(path) => load_file(path),
    }
}
