//! Lock-conscious slot between the platform audio backend and a sample source.
//!
//! - No OS mutex or syscall in the audio callback path.
//! - The source can be hot-swapped from another thread.
//! - No allocation inside the audio callback.
//! - If the source is busy (being swapped or edited), the callback outputs silence.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chirp_core::SynthConfig;
use dasp::Sample;
use spin::Mutex;
use tracing::{debug, warn};

use crate::rt_processing::performance::RenderMonitor;
use crate::rt_processing::sample_buffer::SampleBuffer;
use crate::rt_processing::voice_renderer::{PolyphonicSynth, SampleSource};

struct SlotState {
    source: Box<dyn SampleSource>,
    // i16 staging for float backends, sized for the largest expected buffer.
    staging: Vec<i16>,
}

/// Hot-swappable holder of the active [`SampleSource`].
///
/// The audio thread calls [`CallbackSlot::process_realtime`] (or the `f32`
/// variant), which takes the spin lock with `try_lock` only. Other threads
/// swap or edit the source through the blocking methods, which are expected
/// to be rare and short.
pub struct CallbackSlot {
    state: Arc<Mutex<SlotState>>,
    /// Frames handed to the backend so far.
    frame_clock: Arc<AtomicU64>,
    sample_rate: u32,
    channels: usize,
    monitor: Option<Arc<RenderMonitor>>,
}

impl CallbackSlot {
    /// `max_frames` sizes the staging buffer used by [`CallbackSlot::process_realtime_f32`].
    pub fn new(source: Box<dyn SampleSource>, sample_rate: u32, channels: usize, max_frames: usize) -> Self {
        let channels = channels.max(1);
        debug!(sample_rate, channels, max_frames, "callback slot created");
        Self {
            state: Arc::new(Mutex::new(SlotState {
                source,
                staging: vec![0; max_frames * channels],
            })),
            frame_clock: Arc::new(AtomicU64::new(0)),
            sample_rate,
            channels,
            monitor: None,
        }
    }

    /// Slot driving a [`PolyphonicSynth`] built from `config`.
    pub fn from_config(config: &SynthConfig) -> Self {
        Self::new(
            Box::new(PolyphonicSynth::from_config(config)),
            config.sample_rate,
            config.channels as usize,
            config.max_frames,
        )
    }

    /// Slot that renders silence until a real source is swapped in.
    pub fn silent(sample_rate: u32, channels: usize) -> Self {
        Self::new(Box::new(SilentSource), sample_rate, channels, 0)
    }

    pub fn with_monitor(mut self, monitor: Arc<RenderMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Replace the active source, spinning until the audio thread releases it.
    pub fn swap_source(&self, source: Box<dyn SampleSource>) {
        self.state.lock().source = source;
    }

    /// Edit the active source in place, spinning for the lock.
    pub fn with_source_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Box<dyn SampleSource>) -> R,
    {
        let mut guard = self.state.lock();
        f(&mut guard.source)
    }

    /// Render into an interleaved `i16` output of `frames * channels` samples.
    ///
    /// Returns `false` when silence was written instead: the source was busy or
    /// the buffer was not a whole number of frames.
    pub fn process_realtime(&self, output: &mut [i16]) -> bool {
        if output.is_empty() {
            return false;
        }
        let _timing = self.monitor.as_deref().map(RenderMonitor::scoped_render);

        if output.len() % self.channels != 0 || self.sample_rate == 0 {
            warn!(len = output.len(), channels = self.channels, "malformed output buffer");
            output.fill(0);
            self.note_fallback();
            return false;
        }
        let Ok(mut buffer) = SampleBuffer::new(output, self.channels, self.sample_rate) else {
            self.note_fallback();
            return false;
        };
        let frames = buffer.frames();

        let rendered = match self.state.try_lock() {
            Some(mut guard) => {
                let written = guard.source.generate_samples(&mut buffer).min(frames);
                if written < frames {
                    buffer.tail(written).samples_mut().fill(0);
                }
                true
            }
            None => {
                buffer.samples_mut().fill(0);
                self.note_fallback();
                false
            }
        };

        self.advance(frames);
        rendered
    }

    /// Render into an interleaved `f32` output via the preallocated `i16` staging.
    ///
    /// Buffers larger than the staging area are rendered in staging-sized chunks.
    pub fn process_realtime_f32(&self, output: &mut [f32]) -> bool {
        if output.is_empty() {
            return false;
        }
        let _timing = self.monitor.as_deref().map(RenderMonitor::scoped_render);

        if output.len() % self.channels != 0 {
            warn!(len = output.len(), channels = self.channels, "malformed output buffer");
            output.fill(0.0);
            self.note_fallback();
            return false;
        }

        let Some(mut guard) = self.state.try_lock() else {
            output.fill(0.0);
            self.note_fallback();
            self.advance(output.len() / self.channels);
            return false;
        };
        let SlotState { source, staging } = &mut *guard;

        let chunk_len = staging.len() - staging.len() % self.channels;
        if chunk_len == 0 {
            output.fill(0.0);
            self.note_fallback();
            self.advance(output.len() / self.channels);
            return false;
        }

        for chunk in output.chunks_mut(chunk_len) {
            let staged = &mut staging[..chunk.len()];
            if let Ok(mut buffer) = SampleBuffer::new(&mut *staged, self.channels, self.sample_rate) {
                let frames = buffer.frames();
                let written = source.generate_samples(&mut buffer).min(frames);
                if written < frames {
                    buffer.tail(written).samples_mut().fill(0);
                }
            }
            for (out, &s) in chunk.iter_mut().zip(staged.iter()) {
                *out = s.to_sample::<f32>();
            }
        }

        self.advance(output.len() / self.channels);
        true
    }

    /// Seconds of audio handed to the backend.
    pub fn playback_time(&self) -> f64 {
        self.frame_clock.load(Ordering::Relaxed) as f64 / self.sample_rate.max(1) as f64
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_clock.load(Ordering::Relaxed)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    fn advance(&self, frames: usize) {
        self.frame_clock.fetch_add(frames as u64, Ordering::Relaxed);
        if let Some(monitor) = &self.monitor {
            monitor.record_frames(frames as u64);
        }
    }

    #[inline]
    fn note_fallback(&self) {
        if let Some(monitor) = &self.monitor {
            monitor.record_fallback();
        }
    }
}

struct SilentSource;

impl SampleSource for SilentSource {
    fn generate_samples(&mut self, buffer: &mut SampleBuffer<'_>) -> usize {
        buffer.samples_mut().fill(0);
        buffer.frames()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirp_core::{ParameterMask, VoiceSettings, WaveformKind};

    fn loud_synth() -> PolyphonicSynth {
        let mut synth = PolyphonicSynth::new(2, 8, 0);
        *synth.voice_settings_mut(0).unwrap() =
            VoiceSettings::tone(WaveformKind::Square, 100.0, 1.0).with_duty(1.0);
        synth
    }

    #[test]
    fn renders_and_advances_clock() {
        let slot = CallbackSlot::new(Box::new(loud_synth()), 44_100, 2, 512);
        let mut out = vec![0i16; 882];
        assert!(slot.process_realtime(&mut out));
        assert_eq!(slot.frame_count(), 441);
        assert!((slot.playback_time() - 0.01).abs() < 1e-12);
        assert!(out.iter().all(|&s| s == 19_660));
    }

    #[test]
    fn silent_slot_writes_zeros() {
        let slot = CallbackSlot::silent(48_000, 2);
        let mut out = vec![5i16; 64];
        assert!(slot.process_realtime(&mut out));
        assert!(out.iter().all(|&s| s == 0));
    }

    #[test]
    fn busy_source_falls_back_to_silence() {
        let monitor = Arc::new(RenderMonitor::new(32, 44_100, 0.1));
        let slot = CallbackSlot::new(Box::new(loud_synth()), 44_100, 1, 32).with_monitor(Arc::clone(&monitor));
        let mut out = vec![1i16; 32];

        let held = slot.state.lock();
        assert!(!slot.process_realtime(&mut out));
        drop(held);

        assert!(out.iter().all(|&s| s == 0));
        let snap = monitor.snapshot(false);
        assert_eq!(snap.fallback_silences, 1);
        assert_eq!(snap.render_calls, 1);
        assert_eq!(snap.frames_rendered, 32);
    }

    #[test]
    fn ragged_buffer_is_rejected() {
        let slot = CallbackSlot::new(Box::new(loud_synth()), 44_100, 2, 32);
        let mut out = vec![1i16; 7];
        assert!(!slot.process_realtime(&mut out));
        assert!(out.iter().all(|&s| s == 0));
        assert_eq!(slot.frame_count(), 0);
    }

    #[test]
    fn float_output_is_converted_in_chunks() {
        // Staging holds 16 frames; 100 frames forces several chunks.
        let slot = CallbackSlot::new(Box::new(loud_synth()), 44_100, 2, 16);
        let mut out = vec![0.0f32; 200];
        assert!(slot.process_realtime_f32(&mut out));
        let expected = 19_660i16.to_sample::<f32>();
        assert!(out.iter().all(|&s| s == expected));
        assert!(expected > 0.59 && expected < 0.61);
        assert_eq!(slot.frame_count(), 100);
    }

    #[test]
    fn float_output_without_staging_is_silent() {
        let slot = CallbackSlot::silent(44_100, 2);
        let mut out = vec![0.5f32; 8];
        assert!(!slot.process_realtime_f32(&mut out));
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn swap_and_edit_source() {
        let slot = CallbackSlot::silent(44_100, 1);
        slot.swap_source(Box::new(loud_synth()));
        let mut out = vec![0i16; 16];
        slot.process_realtime(&mut out);
        assert!(out.iter().all(|&s| s == 19_660));

        slot.with_source_mut(|source| {
            *source = Box::new(PolyphonicSynth::new(1, 8, 0));
        });
        slot.process_realtime(&mut out);
        assert!(out.iter().all(|&s| s == 0));
    }

    #[test]
    fn from_config_uses_config_layout() {
        let config = SynthConfig::sound_effects().with_channels(1).with_sample_rate(22_050);
        let slot = CallbackSlot::from_config(&config);
        assert_eq!(slot.channels(), 1);
        assert_eq!(slot.sample_rate(), 22_050);

        let mut out = vec![3i16; 64];
        assert!(slot.process_realtime(&mut out));
        assert!(out.iter().all(|&s| s == 0));
    }

    #[test]
    fn changes_scheduled_through_handle_reach_the_slot() {
        let synth = PolyphonicSynth::new(2, 8, 0);
        let handle = synth.handle();
        let slot = CallbackSlot::new(Box::new(synth), 44_100, 1, 64);

        let tone = VoiceSettings::tone(WaveformKind::Square, 100.0, 1.0).with_duty(1.0);
        assert!(handle.queue_parameter_change(1, 0.0, &tone, ParameterMask::ALL));

        let mut out = vec![0i16; 64];
        assert!(slot.process_realtime(&mut out));
        assert!(out.iter().all(|&s| s == 19_660));
    }
}
