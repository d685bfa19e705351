//! Per-point wave height, foam eligibility, and layer coloring.
//!
//! Everything here is pure: identical noise output gives identical results.

use super::Rgb;
use crate::noise::NoiseSource;
use crate::params::OceanWaveConfig;

/// Farthest layer color (hazy light blue)
pub const DISTANT_LAYER_RGB: Rgb = Rgb::new(126, 184, 218);

/// Nearest layer color (deep blue-green)
pub const NEAR_LAYER_RGB: Rgb = Rgb::new(14, 74, 92);

/// Wave height at horizontal position `x` for one layer
///
/// Noise is sampled at `(x * noise_scale, layer * noise_scale * 0.5, time * wave_speed)`,
/// centered, and scaled to `[-a, a]` where `a` is the depth-scaled amplitude.
///
/// # Arguments
/// * `x` - Horizontal position (pixels)
/// * `layer_index` - 0 = farthest layer
/// * `time` - Animation time (frame units)
/// * `config` - Wave configuration (amplitude already audio-modulated if applicable)
/// * `noise` - Noise source returning `[0, 1]`
pub fn calculate_wave_point(
    x: f32,
    layer_index: usize,
    time: f32,
    config: &OceanWaveConfig,
    noise: &impl NoiseSource,
) -> f32 {
    let effective_amplitude = config.amplitude.max(0.0) * config.depth_scale(layer_index);
    if effective_amplitude == 0.0 {
        return 0.0;
    }

    let n = noise.sample(
        x * config.noise_scale,
        layer_index as f32 * config.noise_scale * 0.5,
        time * config.wave_speed,
    );
    let n = if n.is_finite() { n.clamp(0.0, 1.0) } else { 0.5 };

    (n - 0.5) * 2.0 * effective_amplitude
}

/// Whether a point is high enough on its crest to carry foam
pub fn should_render_foam(wave_height: f32, amplitude: f32, threshold: f32) -> bool {
    if !amplitude.is_finite() || amplitude <= 0.0 {
        return false;
    }
    let normalized = (wave_height + amplitude) / (2.0 * amplitude);
    normalized >= threshold
}

/// How far above the foam threshold a point sits, rescaled to `[0, 1]`
///
/// Returns 0 for points that do not carry foam.
pub fn foam_intensity(wave_height: f32, amplitude: f32, threshold: f32) -> f32 {
    if !should_render_foam(wave_height, amplitude, threshold) {
        return 0.0;
    }
    if threshold >= 1.0 {
        return 1.0;
    }
    let normalized = (wave_height + amplitude) / (2.0 * amplitude);
    ((normalized - threshold) / (1.0 - threshold)).clamp(0.0, 1.0)
}

/// Fill color for a layer, blending distant → near
pub fn wave_layer_color(layer_index: usize, total_layers: usize) -> Rgb {
    let t = if total_layers <= 1 {
        0.0
    } else {
        layer_index as f32 / (total_layers - 1) as f32
    };
    DISTANT_LAYER_RGB.lerp(NEAR_LAYER_RGB, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: f32) -> impl Fn(f32, f32, f32) -> f32 {
        move |_, _, _| value
    }

    #[test]
    fn test_wave_point_scales_noise_to_amplitude() {
        let config = OceanWaveConfig::default();
        assert!((calculate_wave_point(5.0, 0, 0.0, &config, &constant(1.0)) - 50.0).abs() < 1e-4);
        assert!((calculate_wave_point(5.0, 0, 0.0, &config, &constant(0.0)) + 50.0).abs() < 1e-4);
        assert_eq!(calculate_wave_point(5.0, 0, 0.0, &config, &constant(0.5)), 0.0);
    }

    #[test]
    fn test_wave_point_samples_expected_coordinates() {
        let config = OceanWaveConfig::default();
        let probe = |x: f32, y: f32, z: f32| {
            assert!((x - 10.0 * 0.003).abs() < 1e-7);
            assert!((y - 1.0 * 0.003 * 0.5).abs() < 1e-7);
            assert!((z - 100.0 * 0.008).abs() < 1e-6);
            0.75
        };
        calculate_wave_point(10.0, 1, 100.0, &config, &probe);
    }

    #[test]
    fn test_distant_layers_flatten_without_inverting() {
        let config = OceanWaveConfig::default();
        let noise = constant(0.9);
        let near = calculate_wave_point(5.0, 0, 0.0, &config, &noise);
        let mid = calculate_wave_point(5.0, 1, 0.0, &config, &noise);
        assert!(mid.abs() < near.abs());
        for layer in 2..10 {
            let h = calculate_wave_point(5.0, layer, 0.0, &config, &noise);
            assert_eq!(h, 0.0, "layer {} should be flat", layer);
        }
    }

    #[test]
    fn test_bad_noise_is_neutralized() {
        let config = OceanWaveConfig::default();
        assert_eq!(
            calculate_wave_point(0.0, 0, 0.0, &config, &constant(f32::NAN)),
            0.0
        );
        let h = calculate_wave_point(0.0, 0, 0.0, &config, &constant(3.0));
        assert!((h - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_foam_guards_zero_amplitude() {
        assert!(!should_render_foam(0.0, 0.0, 0.0));
        assert!(!should_render_foam(10.0, -5.0, 0.0));
        assert!(!should_render_foam(0.0, f32::NAN, 0.5));
        assert_eq!(foam_intensity(1.0, 0.0, 0.5), 0.0);
    }

    #[test]
    fn test_foam_threshold_edges() {
        for h in [-10.0, -3.0, 0.0, 7.5, 10.0] {
            assert!(should_render_foam(h, 10.0, 0.0));
        }
        assert!(should_render_foam(10.0, 10.0, 1.0));
        assert!(!should_render_foam(9.99, 10.0, 1.0));
    }

    #[test]
    fn test_foam_intensity_ramps_above_threshold() {
        // threshold 0.5 → normalized 0.75 sits halfway up the foam range
        assert!((foam_intensity(5.0, 10.0, 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(foam_intensity(10.0, 10.0, 0.5), 1.0);
        assert_eq!(foam_intensity(-5.0, 10.0, 0.5), 0.0);
        assert_eq!(foam_intensity(10.0, 10.0, 1.0), 1.0);
    }

    #[test]
    fn test_layer_colors() {
        assert_eq!(wave_layer_color(0, 5), DISTANT_LAYER_RGB);
        assert_eq!(wave_layer_color(4, 5), NEAR_LAYER_RGB);
        assert_ne!(wave_layer_color(0, 5), wave_layer_color(4, 5));
        assert_eq!(wave_layer_color(0, 1), DISTANT_LAYER_RGB);
        assert_eq!(wave_layer_color(0, 0), DISTANT_LAYER_RGB);
        // Out-of-range index clamps to the near color
        assert_eq!(wave_layer_color(9, 5), NEAR_LAYER_RGB);
    }
}
