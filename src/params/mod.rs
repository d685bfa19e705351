//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Units (pixels, Hz, seconds)
//! - Documented ranges and meanings
//! - `validate()` where a bad value would otherwise reach the render loop

mod audio;
mod ocean;
mod render;

// Re-export all types
pub use audio::{synth_constants, AnalyserConfig};
pub use ocean::{OceanWaveConfig, AUDIO_AMPLITUDE_SCALE, WAVE_RESOLUTION};
pub use render::{RecordingConfig, RenderConfig, ANIMATION_TICKS_PER_SECOND};
