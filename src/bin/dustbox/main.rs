//! dustbox - lo-fi tape effect chain, offline and live
//!
//! Run with: cargo run -- render in.wav out.wav --preset "lo-fi hiss"

mod cli;
mod live;
mod presets;
mod render;
mod ui;

use clap::Parser;
use cli::{Cli, Command};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let Cli { command } = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(command.default_log_filter()),
    )
    .init();

    match command {
        Command::Presets => {
            for preset in presets::factory() {
                let p = &preset.params;
                println!(
                    "{:<16} wet {:>3.0}%  tone {:>5.0} Hz  {:>2} bit  pump {:.2}  noise {:.0} dB",
                    preset.name,
                    p.global.wet_mix * 100.0,
                    p.tape.tone_cutoff_hz,
                    p.dirt.bit_depth,
                    p.pump.amount,
                    p.noise.level_db,
                );
            }
            Ok(())
        }
        Command::Render(args) => render::run(&args),
        Command::Live(args) => live::run(&args),
    }
}
