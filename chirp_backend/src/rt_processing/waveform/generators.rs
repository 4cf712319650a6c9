use std::f32::consts::TAU;

use chirp_core::WaveformKind;

/// Largest positive sample; waveforms are symmetric around zero at this scale.
pub const FULL_SCALE: f32 = i16::MAX as f32;

/// Saturate to the `i16` range. Every waveform and mixer result goes through here.
#[inline(always)]
pub fn clamp_to_i16(x: f32) -> i16 {
    x.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Wrap phase to [0.0, 1.0)
#[inline]
pub fn normalize_phase(phase: f32) -> f32 {
    phase - phase.floor()
}

#[inline]
pub fn phase_increment(frequency: f32, sample_rate: f32) -> f32 {
    frequency / sample_rate
}

#[inline]
pub fn square(t: f32, duty: f32) -> i16 {
    if t < duty { i16::MAX } else { -i16::MAX }
}

/// Rises from -1 to +1 over `[0, duty)` and falls back over `[duty, 1)`.
#[inline]
pub fn triangle(t: f32, duty: f32) -> i16 {
    let value = if t < duty {
        -1.0 + 2.0 * t / duty
    } else {
        1.0 - 2.0 * (t - duty) / (1.0 - duty)
    };
    clamp_to_i16(value * FULL_SCALE)
}

#[inline]
pub fn sawtooth(t: f32) -> i16 {
    clamp_to_i16((-1.0 + 2.0 * t) * FULL_SCALE)
}

#[inline]
pub fn sine(t: f32) -> i16 {
    clamp_to_i16((TAU * t).sin() * FULL_SCALE)
}

/// Four held steps per noise period.
#[inline]
pub fn noise(t: f32, table: &[i16; 4]) -> i16 {
    let step = ((t * 4.0) as usize).min(3);
    table[step]
}

/// Per-sample dispatch used by the voice render loop.
pub trait WaveformSample {
    fn sample(self, t: f32, duty: f32, noise_table: &[i16; 4]) -> i16;
}

impl WaveformSample for WaveformKind {
    #[inline]
    fn sample(self, t: f32, duty: f32, noise_table: &[i16; 4]) -> i16 {
        match self {
            WaveformKind::Silence => 0,
            WaveformKind::Square => square(t, duty),
            WaveformKind::Triangle => triangle(t, duty),
            WaveformKind::Sawtooth => sawtooth(t),
            WaveformKind::Noise => noise(t, noise_table),
        }
    }
}
