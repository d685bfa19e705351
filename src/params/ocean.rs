//! Ocean wave field configuration and layer compositing constants.

use crate::error::ConfigError;

/// Horizontal sample points per layer polygon
pub const WAVE_RESOLUTION: usize = 120;

/// Band energy → layer amplitude (pixels per unit energy)
pub const AUDIO_AMPLITUDE_SCALE: f32 = 0.002;

/// Semantic wave field configuration
///
/// Created once as a default and cloned per layer per frame with an amplitude
/// override (see [`OceanWaveConfig::with_amplitude`]).
#[derive(Debug, Clone, PartialEq)]
pub struct OceanWaveConfig {
    /// Number of depth-ordered wave strips (>= 1)
    pub layers: usize,

    /// Spatial scale applied to x before sampling noise (> 0)
    pub noise_scale: f32,

    /// Peak wave displacement in pixels (>= 0)
    pub amplitude: f32,

    /// Time scale for the noise z axis
    pub wave_speed: f32,

    /// Normalized crest height at which foam appears, in [0, 1]
    pub foam_threshold: f32,

    /// Per-layer amplitude attenuation, in [0, 1)
    pub perspective: f32,
}

impl Default for OceanWaveConfig {
    fn default() -> Self {
        Self {
            layers: 5,
            noise_scale: 0.003,
            amplitude: 50.0,
            wave_speed: 0.008,
            foam_threshold: 0.7,
            perspective: 0.6,
        }
    }
}

impl OceanWaveConfig {
    /// Clone with a replacement amplitude (used for audio modulation)
    pub fn with_amplitude(&self, amplitude: f32) -> Self {
        Self {
            amplitude,
            ..self.clone()
        }
    }

    /// Attenuation factor for a layer, clamped so distant layers flatten
    /// instead of inverting.
    pub fn depth_scale(&self, layer_index: usize) -> f32 {
        (1.0 - layer_index as f32 * self.perspective).max(0.0)
    }

    /// Validate configuration ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layers == 0 {
            return Err(ConfigError::out_of_range("layers", ">= 1", 0.0));
        }
        if !(self.noise_scale.is_finite() && self.noise_scale > 0.0) {
            return Err(ConfigError::out_of_range(
                "noise_scale",
                "> 0",
                self.noise_scale as f64,
            ));
        }
        if !(self.amplitude.is_finite() && self.amplitude >= 0.0) {
            return Err(ConfigError::out_of_range(
                "amplitude",
                ">= 0",
                self.amplitude as f64,
            ));
        }
        if !self.wave_speed.is_finite() {
            return Err(ConfigError::out_of_range(
                "wave_speed",
                "finite",
                self.wave_speed as f64,
            ));
        }
        if !(0.0..=1.0).contains(&self.foam_threshold) {
            return Err(ConfigError::out_of_range(
                "foam_threshold",
                "in [0, 1]",
                self.foam_threshold as f64,
            ));
        }
        if !(0.0..1.0).contains(&self.perspective) {
            return Err(ConfigError::out_of_range(
                "perspective",
                "in [0, 1)",
                self.perspective as f64,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(OceanWaveConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_with_amplitude_leaves_original_untouched() {
        let base = OceanWaveConfig::default();
        let louder = base.with_amplitude(80.0);
        assert_eq!(louder.amplitude, 80.0);
        assert_eq!(base.amplitude, 50.0);
        assert_eq!(louder.layers, base.layers);
    }

    #[test]
    fn test_depth_scale_clamps_at_zero() {
        let config = OceanWaveConfig::default();
        assert_eq!(config.depth_scale(0), 1.0);
        assert!((config.depth_scale(1) - 0.4).abs() < 1e-6);
        assert_eq!(config.depth_scale(2), 0.0);
        assert_eq!(config.depth_scale(40), 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let mut config = OceanWaveConfig::default();
        config.perspective = 1.0;
        assert!(config.validate().is_err());

        let mut config = OceanWaveConfig::default();
        config.layers = 0;
        assert!(config.validate().is_err());

        let mut config = OceanWaveConfig::default();
        config.foam_threshold = -0.1;
        assert!(config.validate().is_err());
    }
}
