//! Buffer-level operations on a single channel of a [`SampleBuffer`].
//!
//! None of these allocate and all results saturate through [`clamp_to_i16`].

use super::envelopes::LinearRamp;
use super::generators::{FULL_SCALE, clamp_to_i16, normalize_phase};
use crate::rt_processing::sample_buffer::SampleBuffer;

pub fn silence(buffer: &mut SampleBuffer<'_>, channel: usize) {
    for s in buffer.channel_mut(channel) {
        *s = 0;
    }
}

/// Scale by `amplitude / 32767`.
pub fn amplify(buffer: &mut SampleBuffer<'_>, channel: usize, amplitude: i16) {
    let gain = amplitude as f32 / FULL_SCALE;
    for s in buffer.channel_mut(channel) {
        *s = clamp_to_i16(*s as f32 * gain);
    }
}

/// Scale each frame by the next value of `ramp` (a gain, 1.0 = unity).
pub fn amplify_ramp(buffer: &mut SampleBuffer<'_>, channel: usize, ramp: &mut LinearRamp) {
    for s in buffer.channel_mut(channel) {
        *s = clamp_to_i16(*s as f32 * ramp.next_value());
    }
}

pub fn copy(dst: &mut SampleBuffer<'_>, dst_channel: usize, src: &SampleBuffer<'_>, src_channel: usize) {
    debug_assert_eq!(dst.frames(), src.frames(), "copy needs equal frame counts");
    for (d, s) in dst.channel_mut(dst_channel).zip(src.channel(src_channel)) {
        *d = *s;
    }
}

/// Add `src` into `dst`, saturating.
pub fn combine(dst: &mut SampleBuffer<'_>, dst_channel: usize, src: &SampleBuffer<'_>, src_channel: usize) {
    debug_assert_eq!(dst.frames(), src.frames(), "combine needs equal frame counts");
    for (d, s) in dst.channel_mut(dst_channel).zip(src.channel(src_channel)) {
        *d = clamp_to_i16(*d as f32 + *s as f32);
    }
}

/// [`copy`] between two channels of the same buffer.
pub fn copy_channel(buffer: &mut SampleBuffer<'_>, dst_channel: usize, src_channel: usize) {
    debug_assert_ne!(dst_channel, src_channel, "copying a channel onto itself");
    let channels = buffer.channels();
    for frame in buffer.samples_mut().chunks_exact_mut(channels) {
        frame[dst_channel] = frame[src_channel];
    }
}

/// [`combine`] between two channels of the same buffer.
pub fn combine_channel(buffer: &mut SampleBuffer<'_>, dst_channel: usize, src_channel: usize) {
    debug_assert_ne!(dst_channel, src_channel, "combining a channel with itself");
    let channels = buffer.channels();
    for frame in buffer.samples_mut().chunks_exact_mut(channels) {
        frame[dst_channel] = clamp_to_i16(frame[dst_channel] as f32 + frame[src_channel] as f32);
    }
}

/// Render a fixed-frequency periodic generator starting at `phase`.
///
/// Returns the phase after the last frame, wrapped to [0, 1), so consecutive
/// calls stay continuous.
pub fn fill_periodic<F>(
    buffer: &mut SampleBuffer<'_>,
    channel: usize,
    phase: f32,
    increment: f32,
    mut generator: F,
) -> f32
where
    F: FnMut(f32) -> i16,
{
    let mut t = normalize_phase(phase);
    for s in buffer.channel_mut(channel) {
        *s = generator(t);
        t = normalize_phase(t + increment);
    }
    t
}
