pub mod envelopes;
pub mod generators;
pub mod mixers;
pub mod noise;
pub mod oscillators;

pub use generators::{WaveformSample, clamp_to_i16};
pub use noise::NoiseTable;
pub use oscillators::{Oscillator, SegmentRamp};
