//! Real-world scenario benchmarks.
//!
//! These run the whole engine the way a host would: stereo blocks, one
//! parameter snapshot per block, a playing transport.

mod chain;
mod stages;

pub use chain::bench_chain;
pub use stages::bench_stages;
