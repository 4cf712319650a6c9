//! Shared data model for the chirp synthesis engine.
//!
//! Everything in here is plain data: oscillator settings, the mask used to
//! patch a subset of them, engine configuration and error types. The
//! real-time code lives in `chirp-backend`.

pub mod config;
pub mod error;
pub mod settings;

pub use config::SynthConfig;
pub use error::{BufferError, ConfigError};
pub use settings::{MAX_FREQUENCY, ParameterMask, VoiceSettings, WaveformKind};
