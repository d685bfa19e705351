//! Harmonic synthesizer, audio graph backends, and per-frame analysis.

mod analysis;
mod backend;
mod fft;
mod harmonics;
pub mod output;
mod preview;
mod software;

// Re-export public types
pub use analysis::{band_energy, AnalysisTap, AudioAnalysisBridge};
pub use backend::{AudioBackend, AudioParam, ContextState, NodeId};
pub use fft::{hann_window, magnitude_to_byte, sample_to_byte, Spectrum};
pub use harmonics::{Harmonic, HarmonicsEngine, HarmonicsOptions, HarmonicsState};
pub use preview::harmonic_preview;
pub use software::{GraphRenderer, OutputStream, SoftwareBackend, OUTPUT_LIMIT};
