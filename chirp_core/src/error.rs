use thiserror::Error;

/// Errors raised when building or slicing a sample buffer view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("range {offset}..{end} is outside a buffer of {frames} frames", end = .offset + .length)]
    OutOfRange {
        offset: usize,
        length: usize,
        frames: usize,
    },
    #[error("sample buffer needs at least one channel")]
    NoChannels,
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(u32),
    #[error("storage of {len} samples is not a whole number of {channels}-channel frames")]
    RaggedStorage { len: usize, channels: usize },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating a [`crate::SynthConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse synth config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(u32),
    #[error("output needs at least one channel")]
    NoChannels,
    #[error("synth needs at least one voice")]
    NoVoices,
    #[error("parameter queue capacity must be non-zero")]
    ZeroQueueCapacity,
}
