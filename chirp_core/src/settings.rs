use serde::{Deserialize, Serialize};

/// Upper bound for the instantaneous oscillator frequency, in Hz.
pub const MAX_FREQUENCY: f32 = 10_000.0;

/// Waveform produced by a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveformKind {
    #[default]
    Silence,
    Square,
    Triangle,
    Sawtooth,
    Noise,
}

/// Oscillator parameters of a single voice.
///
/// Slide fields are rates per second; the voice integrates them while
/// rendering so `volume`, `frequency`, `duty` and the vibrato values drift
/// linearly until a scheduled change overrides them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub waveform: WaveformKind,
    /// 0.0 to 1.0
    pub volume: f32,
    /// Hz, 0.0 to [`MAX_FREQUENCY`]
    pub frequency: f32,
    /// 0.0 to 1.0, fraction of the period spent in the first half of the wave
    pub duty: f32,
    pub vibrato_frequency: f32,
    /// Hz of frequency deviation at the vibrato peak
    pub vibrato_depth: f32,
    pub volume_slide: f32,
    pub frequency_slide: f32,
    pub duty_slide: f32,
    pub vibrato_frequency_slide: f32,
    pub vibrato_depth_slide: f32,
}

impl VoiceSettings {
    /// The silent default: no waveform, half duty, everything else zero.
    pub const SILENCE: Self = Self {
        waveform: WaveformKind::Silence,
        volume: 0.0,
        frequency: 0.0,
        duty: 0.5,
        vibrato_frequency: 0.0,
        vibrato_depth: 0.0,
        volume_slide: 0.0,
        frequency_slide: 0.0,
        duty_slide: 0.0,
        vibrato_frequency_slide: 0.0,
        vibrato_depth_slide: 0.0,
    };

    /// A steady tone with half duty and no slides.
    pub fn tone(waveform: WaveformKind, frequency: f32, volume: f32) -> Self {
        Self {
            waveform,
            frequency: frequency.clamp(0.0, MAX_FREQUENCY),
            volume: volume.clamp(0.0, 1.0),
            ..Self::SILENCE
        }
    }

    pub fn with_duty(mut self, duty: f32) -> Self {
        self.duty = duty.clamp(0.0, 1.0);
        self
    }

    pub fn with_vibrato(mut self, frequency: f32, depth: f32) -> Self {
        self.vibrato_frequency = frequency.max(0.0);
        self.vibrato_depth = depth.max(0.0);
        self
    }

    pub fn with_volume_slide(mut self, rate: f32) -> Self {
        self.volume_slide = rate;
        self
    }

    pub fn with_frequency_slide(mut self, rate: f32) -> Self {
        self.frequency_slide = rate;
        self
    }

    pub fn with_duty_slide(mut self, rate: f32) -> Self {
        self.duty_slide = rate;
        self
    }

    /// Copy the fields selected by `mask` from `source`, leaving the rest untouched.
    pub fn apply(&mut self, source: &VoiceSettings, mask: ParameterMask) {
        if mask.contains(ParameterMask::WAVEFORM) {
            self.waveform = source.waveform;
        }
        if mask.contains(ParameterMask::VOLUME) {
            self.volume = source.volume;
        }
        if mask.contains(ParameterMask::FREQUENCY) {
            self.frequency = source.frequency;
        }
        if mask.contains(ParameterMask::DUTY) {
            self.duty = source.duty;
        }
        if mask.contains(ParameterMask::VIBRATO_FREQUENCY) {
            self.vibrato_frequency = source.vibrato_frequency;
        }
        if mask.contains(ParameterMask::VIBRATO_DEPTH) {
            self.vibrato_depth = source.vibrato_depth;
        }
        if mask.contains(ParameterMask::VOLUME_SLIDE) {
            self.volume_slide = source.volume_slide;
        }
        if mask.contains(ParameterMask::FREQUENCY_SLIDE) {
            self.frequency_slide = source.frequency_slide;
        }
        if mask.contains(ParameterMask::DUTY_SLIDE) {
            self.duty_slide = source.duty_slide;
        }
        if mask.contains(ParameterMask::VIBRATO_FREQUENCY_SLIDE) {
            self.vibrato_frequency_slide = source.vibrato_frequency_slide;
        }
        if mask.contains(ParameterMask::VIBRATO_DEPTH_SLIDE) {
            self.vibrato_depth_slide = source.vibrato_depth_slide;
        }
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self::SILENCE
    }
}

bitflags::bitflags! {
    /// Selects which [`VoiceSettings`] fields a scheduled change overwrites.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParameterMask: u16 {
        const WAVEFORM = 1 << 0;
        const VOLUME = 1 << 1;
        const FREQUENCY = 1 << 2;
        const DUTY = 1 << 3;
        const VIBRATO_FREQUENCY = 1 << 4;
        const VIBRATO_DEPTH = 1 << 5;
        const VOLUME_SLIDE = 1 << 6;
        const FREQUENCY_SLIDE = 1 << 7;
        const DUTY_SLIDE = 1 << 8;
        const VIBRATO_FREQUENCY_SLIDE = 1 << 9;
        const VIBRATO_DEPTH_SLIDE = 1 << 10;

        const TONE = Self::WAVEFORM.bits()
            | Self::VOLUME.bits()
            | Self::FREQUENCY.bits()
            | Self::DUTY.bits();
        const SLIDES = Self::VOLUME_SLIDE.bits()
            | Self::FREQUENCY_SLIDE.bits()
            | Self::DUTY_SLIDE.bits()
            | Self::VIBRATO_FREQUENCY_SLIDE.bits()
            | Self::VIBRATO_DEPTH_SLIDE.bits();
        const ALL = (1 << 11) - 1;
    }
}

// Masks travel as their raw bits.
impl Serialize for ParameterMask {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParameterMask {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u16::deserialize(deserializer)?;
        Ok(ParameterMask::from_bits_truncate(bits))
    }
}
