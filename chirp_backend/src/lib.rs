//! Real-time side of the chirp synthesis engine.
//!
//! The platform audio backend pulls samples through a [`CallbackSlot`]
//! holding a [`PolyphonicSynth`]; game logic schedules parameter changes
//! through a [`SynthHandle`] from any thread.

pub mod rt_processing;

pub use chirp_core::{ParameterMask, SynthConfig, VoiceSettings, WaveformKind};
pub use rt_processing::callback::CallbackSlot;
pub use rt_processing::performance::{RenderMonitor, RenderSnapshot};
pub use rt_processing::sample_buffer::SampleBuffer;
pub use rt_processing::scheduling::{ChangeReceiver, ChangeSender, ScheduledChange, parameter_queue};
pub use rt_processing::voice::{MASTER_VOLUME, Voice, VoiceHandle};
pub use rt_processing::voice_renderer::{PolyphonicSynth, SampleSource, SynthHandle};
