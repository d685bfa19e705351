//! Audio analysis configuration and synth constants.

use crate::error::ConfigError;

/// Frequency analysis configuration with band mappings
///
/// The sample rate is deliberately absent: bin boundaries are always derived
/// from the running audio context's rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyserConfig {
    /// FFT window size (must be power of 2)
    pub fft_size: usize,

    /// Bass frequency range (Hz), half-open
    pub low_range_hz: (f32, f32),

    /// Mid frequency range (Hz), half-open
    pub mid_range_hz: (f32, f32),

    /// High frequency range (Hz), half-open
    pub high_range_hz: (f32, f32),
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            low_range_hz: (20.0, 250.0),
            mid_range_hz: (250.0, 4000.0),
            high_range_hz: (4000.0, 20000.0),
        }
    }
}

impl AnalyserConfig {
    /// Number of magnitude bins produced per analysis frame
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(ConfigError::out_of_range(
                "fft_size",
                "a power of 2 >= 32",
                self.fft_size as f64,
            ));
        }
        for (field, (lo, hi)) in [
            ("low_range_hz", self.low_range_hz),
            ("mid_range_hz", self.mid_range_hz),
            ("high_range_hz", self.high_range_hz),
        ] {
            if !(lo >= 0.0 && hi > lo) {
                return Err(ConfigError::out_of_range(field, "0 <= min < max", lo as f64));
            }
        }
        Ok(())
    }
}

/// Harmonic synth constants
pub mod synth_constants {
    /// Number of harmonic slots (harmonic numbers 1..=16)
    pub const NUM_HARMONICS: usize = 16;

    /// Per-harmonic gain scale so a full chord stays below clipping
    pub const GAIN_SCALE: f32 = 0.3;

    /// Default fundamental frequency (Hz)
    pub const DEFAULT_FUNDAMENTAL_HZ: f32 = 110.0;

    /// Default master volume
    pub const DEFAULT_MASTER_VOLUME: f32 = 0.5;

    /// Default volume for harmonic slot `index` (0-based)
    pub fn default_harmonic_volume(index: usize) -> f32 {
        0.5 / ((index + 1) as f32).sqrt()
    }
}
