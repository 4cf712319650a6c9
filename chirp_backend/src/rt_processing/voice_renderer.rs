use chirp_core::{ParameterMask, SynthConfig, VoiceSettings};
use tracing::debug;

use crate::rt_processing::sample_buffer::SampleBuffer;
use crate::rt_processing::voice::{Voice, VoiceHandle};
use crate::rt_processing::waveform::mixers;

/// Pull-based sample source driven by the platform audio backend.
///
/// `generate_samples` is called on the real-time thread: it must fill the
/// interleaved buffer synchronously, must not block and should not allocate.
/// Returns the number of frames written.
pub trait SampleSource: Send + 'static {
    fn generate_samples(&mut self, buffer: &mut SampleBuffer<'_>) -> usize;
}

/// Fixed set of voices mixed additively into one output.
///
/// Voice 0 renders straight into the caller's buffer; every other voice
/// renders into a scratch buffer that is then combined channel by channel.
pub struct PolyphonicSynth {
    voices: Vec<Voice>,
    // Interleaved scratch. Grows to the largest request seen, never shrinks.
    scratch: Vec<i16>,
}

impl PolyphonicSynth {
    pub fn new(voice_count: usize, queue_capacity: usize, noise_seed: u64) -> Self {
        let voices = (0..voice_count.max(1))
            .map(|i| Voice::new(queue_capacity, noise_seed.wrapping_add(i as u64)))
            .collect::<Vec<_>>();
        debug!(voices = voices.len(), queue_capacity, "polyphonic synth created");
        Self {
            voices,
            scratch: Vec::new(),
        }
    }

    /// Build from config, preallocating scratch for `max_frames`.
    pub fn from_config(config: &SynthConfig) -> Self {
        let mut synth = Self::new(config.voices, config.queue_capacity, config.noise_seed);
        synth.scratch = vec![0; config.max_frames * config.channels as usize];
        synth
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    pub fn voice_mut(&mut self, index: usize) -> Option<&mut Voice> {
        self.voices.get_mut(index)
    }

    /// Live settings of voice `index`. Render thread only.
    pub fn voice_settings_mut(&mut self, index: usize) -> Option<&mut VoiceSettings> {
        self.voices.get_mut(index).map(Voice::settings_mut)
    }

    /// Schedule a change on voice `index`. `false` if the index is out of
    /// range or that voice's queue is full.
    pub fn queue_parameter_change(
        &self,
        index: usize,
        delay: f64,
        settings: &VoiceSettings,
        mask: ParameterMask,
    ) -> bool {
        self.voices
            .get(index)
            .is_some_and(|voice| voice.queue_parameter_change(delay, settings, mask))
    }

    /// Producer endpoints for every voice, for use from other threads.
    pub fn handle(&self) -> SynthHandle {
        SynthHandle {
            voices: self.voices.iter().map(Voice::handle).collect(),
        }
    }

    pub fn generate_samples(&mut self, buffer: &mut SampleBuffer<'_>) -> usize {
        let frames = buffer.frames();
        let channels = buffer.channels();
        let Some((first, rest)) = self.voices.split_first_mut() else {
            buffer.samples_mut().fill(0);
            return frames;
        };

        let written = first.generate_samples(buffer).min(frames);
        if written < frames {
            buffer.tail(written).samples_mut().fill(0);
        }

        if rest.is_empty() {
            return frames;
        }

        let needed = frames * channels;
        if self.scratch.len() < needed {
            debug!(from = self.scratch.len(), to = needed, "growing mix scratch buffer");
            self.scratch.resize(needed, 0);
        }

        for voice in rest {
            let Ok(mut scratch) = SampleBuffer::new(&mut self.scratch[..needed], channels, buffer.sample_rate())
            else {
                continue;
            };
            let rendered = voice.generate_samples(&mut scratch).min(frames);
            if rendered < frames {
                scratch.tail(rendered).samples_mut().fill(0);
            }
            for channel in 0..channels {
                mixers::combine(buffer, channel, &scratch, channel);
            }
        }

        frames
    }
}

impl SampleSource for PolyphonicSynth {
    fn generate_samples(&mut self, buffer: &mut SampleBuffer<'_>) -> usize {
        PolyphonicSynth::generate_samples(self, buffer)
    }
}

/// Cross-thread scheduling endpoint for a whole [`PolyphonicSynth`].
#[derive(Clone)]
pub struct SynthHandle {
    voices: Vec<VoiceHandle>,
}

impl SynthHandle {
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn voice(&self, index: usize) -> Option<&VoiceHandle> {
        self.voices.get(index)
    }

    pub fn queue_parameter_change(
        &self,
        index: usize,
        delay: f64,
        settings: &VoiceSettings,
        mask: ParameterMask,
    ) -> bool {
        self.voices
            .get(index)
            .is_some_and(|voice| voice.queue_parameter_change(delay, settings, mask))
    }

    /// Total changes dropped on full queues across all voices.
    pub fn dropped_changes(&self) -> u64 {
        self.voices.iter().map(VoiceHandle::dropped_changes).sum()
    }
}
