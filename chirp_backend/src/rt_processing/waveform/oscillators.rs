use std::f32::consts::TAU;

use chirp_core::{MAX_FREQUENCY, WaveformKind};

use super::generators::{WaveformSample, normalize_phase, phase_increment};
use super::noise::NoiseTable;
use crate::rt_processing::sample_buffer::SampleBuffer;

/// Starting values and per-sample increments for one rendered segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentRamp {
    pub waveform: WaveformKind,
    pub frequency: f32,
    pub duty: f32,
    pub vibrato_frequency: f32,
    pub vibrato_depth: f32,
    pub frequency_step: f32,
    pub duty_step: f32,
    pub vibrato_frequency_step: f32,
    pub vibrato_depth_step: f32,
}

impl SegmentRamp {
    /// Fixed parameters, no slides, no vibrato.
    pub fn steady(waveform: WaveformKind, frequency: f32, duty: f32) -> Self {
        Self {
            waveform,
            frequency,
            duty,
            vibrato_frequency: 0.0,
            vibrato_depth: 0.0,
            frequency_step: 0.0,
            duty_step: 0.0,
            vibrato_frequency_step: 0.0,
            vibrato_depth_step: 0.0,
        }
    }

    #[inline]
    fn advance(&mut self) {
        self.frequency = (self.frequency + self.frequency_step).max(0.0);
        self.duty = (self.duty + self.duty_step).clamp(0.0, 1.0);
        self.vibrato_frequency = (self.vibrato_frequency + self.vibrato_frequency_step).max(0.0);
        self.vibrato_depth = (self.vibrato_depth + self.vibrato_depth_step).max(0.0);
    }
}

/// Persistent oscillator state of a voice.
///
/// Phases carry across render calls and parameter changes so the output never
/// jumps; they are only reduced modulo one, never reset.
#[derive(Debug, Clone)]
pub struct Oscillator {
    phase: f32,
    vibrato_phase: f32,
    noise: NoiseTable,
}

impl Oscillator {
    pub fn new(noise_seed: u64) -> Self {
        Self {
            phase: 0.0,
            vibrato_phase: 0.0,
            noise: NoiseTable::new(noise_seed),
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn vibrato_phase(&self) -> f32 {
        self.vibrato_phase
    }

    /// Write one sample per frame of `channel`, stepping the ramp after each.
    pub fn render(&mut self, buffer: &mut SampleBuffer<'_>, channel: usize, ramp: SegmentRamp) {
        let sample_rate = buffer.sample_rate() as f32;
        let mut ramp = ramp;

        for out in buffer.channel_mut(channel) {
            let vibrato = ramp.vibrato_depth * (TAU * self.vibrato_phase).sin();
            let frequency = (ramp.frequency + vibrato).clamp(0.0, MAX_FREQUENCY);

            *out = ramp.waveform.sample(self.phase, ramp.duty, self.noise.values());

            self.phase += phase_increment(frequency, sample_rate);
            if ramp.waveform == WaveformKind::Noise {
                // Noise redraws its table once per period instead of wrapping silently.
                if self.phase >= 1.0 {
                    self.noise.refill();
                    self.phase = normalize_phase(self.phase);
                }
            } else {
                self.phase = normalize_phase(self.phase);
            }

            self.vibrato_phase =
                normalize_phase(self.vibrato_phase + phase_increment(ramp.vibrato_frequency, sample_rate));
            ramp.advance();
        }
    }
}
