use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Engine-wide configuration for a polyphonic synth and the slot that drives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Number of independent voices mixed into the output.
    pub voices: usize,
    /// Pending scheduled changes each voice can hold before dropping new ones.
    pub queue_capacity: usize,
    /// Base seed for the noise generators; voice `i` uses `noise_seed + i`.
    pub noise_seed: u64,
    /// Largest buffer (in frames) the backend is expected to request.
    pub max_frames: usize,
}

impl SynthConfig {
    pub fn new() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
            voices: 4,
            queue_capacity: 8,
            noise_seed: 0x5eed,
            max_frames: 1024,
        }
    }

    pub fn with_sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_voices(mut self, voices: usize) -> Self {
        self.voices = voices;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_noise_seed(mut self, seed: u64) -> Self {
        self.noise_seed = seed;
        self
    }

    pub fn with_max_frames(mut self, frames: usize) -> Self {
        self.max_frames = frames;
        self
    }

    /// Short one-shot effects: few voices, shallow queues.
    pub fn sound_effects() -> Self {
        Self::new().with_voices(4).with_queue_capacity(8)
    }

    /// Sequenced music: every voice gets a deeper queue for note events.
    pub fn music() -> Self {
        Self::new().with_voices(8).with_queue_capacity(32)
    }

    /// Parse and validate a JSON config. Missing fields take the defaults of [`SynthConfig::new`].
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.channels == 0 {
            return Err(ConfigError::NoChannels);
        }
        if self.voices == 0 {
            return Err(ConfigError::NoVoices);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        Ok(())
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self::new()
    }
}
