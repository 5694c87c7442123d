pub mod dsp; // Allocation-free signal primitives
pub mod engine; // Orchestration, tempo, metering
pub mod io;
pub mod params; // Parameter snapshots and lock-free publication
pub mod stage; // Tape, Dirt, Pump, Reverb, Noise

pub use engine::{DustboxEngine, EngineError, LevelMeters, MeterReading};
pub use io::{AudioBlock, TransportInfo};
pub use params::{EngineParameters, NoiseRouting, SharedParameters, SyncDivision};

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Upper bound on channels a single engine will prepare for.
pub const MAX_CHANNELS: usize = 16;
