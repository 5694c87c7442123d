//! Command-line interface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// dustbox - lo-fi tape effect chain, offline and live
#[derive(Parser, Debug)]
#[command(name = "dustbox")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List the factory presets
    Presets,
    /// Process a WAV file offline
    Render(RenderArgs),
    /// Play a test signal through the effect with a live meter view
    Live(LiveArgs),
}

impl Command {
    /// Live mode owns the terminal, so it wants a quieter log.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Command::Live(_) => "warn",
            _ => "info",
        }
    }
}

/// Where the starting parameters come from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PresetSource {
    #[default]
    Default,
    Factory(String),
    File(PathBuf),
}

#[derive(Args, Debug, Clone, PartialEq, Default)]
pub struct PresetArgs {
    /// Factory preset name (see `dustbox presets`)
    #[arg(long, value_name = "NAME", conflicts_with = "preset_file")]
    pub preset: Option<String>,

    /// JSON preset file; missing fields keep their defaults
    #[arg(long, value_name = "PATH")]
    pub preset_file: Option<PathBuf>,
}

impl PresetArgs {
    pub fn source(&self) -> PresetSource {
        match (&self.preset, &self.preset_file) {
            (Some(name), _) => PresetSource::Factory(name.clone()),
            (None, Some(path)) => PresetSource::File(path.clone()),
            (None, None) => PresetSource::Default,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct RenderArgs {
    /// Input WAV file
    pub input: PathBuf,

    /// Output WAV file (32-bit float)
    pub output: PathBuf,

    #[command(flatten)]
    pub preset: PresetArgs,

    /// Simulated host tempo. Without it the engine runs on its own clock.
    #[arg(long, value_name = "BPM", value_parser = parse_bpm)]
    pub bpm: Option<f64>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct LiveArgs {
    #[command(flatten)]
    pub preset: PresetArgs,
}

fn parse_bpm(value: &str) -> Result<f64, String> {
    let bpm: f64 = value
        .parse()
        .map_err(|_| format!("invalid tempo '{value}'"))?;
    if !bpm.is_finite() || bpm <= 0.0 {
        return Err(format!("tempo must be positive, got {bpm}"));
    }
    Ok(bpm)
}
