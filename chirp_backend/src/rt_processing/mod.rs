pub mod callback;
pub mod performance;
pub mod sample_buffer;
pub mod scheduling;
pub mod voice;
pub mod voice_renderer;
pub mod waveform;
