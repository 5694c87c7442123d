use thiserror::Error;

/// Configuration rejected by [`DustboxEngine::prepare`](super::DustboxEngine::prepare).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),

    #[error("block size must be between 1 and {max}, got {requested}")]
    InvalidBlockSize { requested: usize, max: usize },

    #[error("channel count must be between 1 and {max}, got {requested}")]
    InvalidChannelCount { requested: usize, max: usize },
}
