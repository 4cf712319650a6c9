use std::sync::Arc;

use chirp_core::{ParameterMask, SynthConfig, VoiceSettings};
use crossbeam::atomic::AtomicCell;
use tracing::{debug, trace};

use crate::rt_processing::sample_buffer::SampleBuffer;
use crate::rt_processing::scheduling::{ChangeReceiver, ChangeSender, ScheduledChange, parameter_queue};
use crate::rt_processing::voice_renderer::SampleSource;
use crate::rt_processing::waveform::envelopes::LinearRamp;
use crate::rt_processing::waveform::mixers;
use crate::rt_processing::waveform::oscillators::{Oscillator, SegmentRamp};

/// Headroom applied to every voice so a few can be mixed without clipping.
pub const MASTER_VOLUME: f32 = 0.6;

/// A single oscillator with a volume envelope and a queue of timed parameter changes.
///
/// The render thread owns the voice and calls [`Voice::generate_samples`].
/// Other threads schedule changes through a [`VoiceHandle`]; they never touch
/// the live settings, phases or clock.
pub struct Voice {
    settings: VoiceSettings,
    oscillator: Oscillator,
    /// Seconds of audio rendered so far. Never rewinds.
    clock: f64,
    published_clock: Arc<AtomicCell<f64>>,
    sender: ChangeSender,
    receiver: ChangeReceiver,
}

impl Voice {
    pub fn new(queue_capacity: usize, noise_seed: u64) -> Self {
        let (sender, receiver) = parameter_queue(queue_capacity);
        debug!(queue_capacity, noise_seed, "voice created");
        Self {
            settings: VoiceSettings::default(),
            oscillator: Oscillator::new(noise_seed),
            clock: 0.0,
            published_clock: Arc::new(AtomicCell::new(0.0)),
            sender,
            receiver,
        }
    }

    pub fn from_config(config: &SynthConfig) -> Self {
        Self::new(config.queue_capacity, config.noise_seed)
    }

    /// Schedule `settings` (fields selected by `mask`) `delay` seconds after
    /// the current voice clock. Returns `false` if the queue was full.
    pub fn queue_parameter_change(&self, delay: f64, settings: &VoiceSettings, mask: ParameterMask) -> bool {
        self.sender.enqueue(ScheduledChange {
            scheduled_time: self.clock + delay,
            settings: *settings,
            mask,
        })
    }

    /// Cloneable producer endpoint for other threads.
    pub fn handle(&self) -> VoiceHandle {
        VoiceHandle {
            sender: self.sender.clone(),
            clock: Arc::clone(&self.published_clock),
        }
    }

    pub fn settings(&self) -> &VoiceSettings {
        &self.settings
    }

    /// Live settings. Only for the thread that renders this voice.
    pub fn settings_mut(&mut self) -> &mut VoiceSettings {
        &mut self.settings
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn pending_changes(&self) -> usize {
        self.receiver.len()
    }

    pub fn dropped_changes(&self) -> u64 {
        self.sender.dropped()
    }

    /// Fill the whole buffer, splitting at every scheduled change that falls inside it.
    ///
    /// Always returns `buffer.frames()`.
    pub fn generate_samples(&mut self, buffer: &mut SampleBuffer<'_>) -> usize {
        let frames = buffer.frames();
        let mut written = 0;
        while written < frames {
            written += self.render_segment(&mut buffer.tail(written));
        }
        frames
    }

    /// Render up to the next scheduled change (or the whole buffer) and
    /// return how many frames were produced.
    fn render_segment(&mut self, buffer: &mut SampleBuffer<'_>) -> usize {
        let frames = buffer.frames();
        let sample_rate = buffer.sample_rate() as f64;
        let full_duration = frames as f64 / sample_rate;
        let start_time = self.clock;

        let due = self
            .receiver
            .peek()
            .is_some_and(|change| change.scheduled_time <= start_time + full_duration);
        let pending = if due { self.receiver.dequeue() } else { None };

        let (duration, output_frames) = match &pending {
            Some(change) => {
                let duration = (change.scheduled_time - start_time).max(0.0);
                let output = ((duration * sample_rate).round() as usize).min(frames);
                (duration, output)
            }
            None => (full_duration, frames),
        };

        // Increments are per sample of the unclipped buffer, so slide speed does
        // not depend on how many changes split the call.
        let rate = sample_rate as f32;
        let initial = self.settings;
        let volume_step = initial.volume_slide / rate;
        let ramp = SegmentRamp {
            waveform: initial.waveform,
            frequency: initial.frequency,
            duty: initial.duty,
            vibrato_frequency: initial.vibrato_frequency,
            vibrato_depth: initial.vibrato_depth,
            frequency_step: initial.frequency_slide / rate,
            duty_step: initial.duty_slide / rate,
            vibrato_frequency_step: initial.vibrato_frequency_slide / rate,
            vibrato_depth_step: initial.vibrato_depth_slide / rate,
        };

        let span = frames as f32;
        self.settings.volume = (initial.volume + volume_step * span).clamp(0.0, 1.0);
        self.settings.frequency = (initial.frequency + ramp.frequency_step * span).max(0.0);
        self.settings.duty = (initial.duty + ramp.duty_step * span).clamp(0.0, 1.0);
        self.settings.vibrato_frequency =
            (initial.vibrato_frequency + ramp.vibrato_frequency_step * span).max(0.0);
        self.settings.vibrato_depth = (initial.vibrato_depth + ramp.vibrato_depth_step * span).max(0.0);

        self.clock += duration;
        self.published_clock.store(self.clock);

        if let Some(change) = pending {
            trace!(
                scheduled_time = change.scheduled_time,
                clock = self.clock,
                mask = change.mask.bits(),
                "applying scheduled change"
            );
            self.settings.apply(&change.settings, change.mask);
        }

        let mut segment = buffer.head(output_frames);
        self.oscillator.render(&mut segment, 0, ramp);

        let mut envelope = LinearRamp::new(initial.volume * MASTER_VOLUME, volume_step * MASTER_VOLUME)
            .with_bounds(0.0, MASTER_VOLUME);
        mixers::amplify_ramp(&mut segment, 0, &mut envelope);

        for channel in 1..segment.channels() {
            mixers::copy_channel(&mut segment, channel, 0);
        }

        output_frames
    }
}

impl SampleSource for Voice {
    fn generate_samples(&mut self, buffer: &mut SampleBuffer<'_>) -> usize {
        Voice::generate_samples(self, buffer)
    }
}

/// Producer endpoint of a [`Voice`], usable from any thread.
///
/// Scheduling is relative to the voice clock as last published by the render
/// thread, so the delay is measured from the end of the most recent segment.
#[derive(Clone)]
pub struct VoiceHandle {
    sender: ChangeSender,
    clock: Arc<AtomicCell<f64>>,
}

impl VoiceHandle {
    pub fn queue_parameter_change(&self, delay: f64, settings: &VoiceSettings, mask: ParameterMask) -> bool {
        self.sender.enqueue(ScheduledChange {
            scheduled_time: self.clock.load() + delay,
            settings: *settings,
            mask,
        })
    }

    /// Voice clock as of the last rendered segment.
    pub fn clock(&self) -> f64 {
        self.clock.load()
    }

    pub fn dropped_changes(&self) -> u64 {
        self.sender.dropped()
    }
}
