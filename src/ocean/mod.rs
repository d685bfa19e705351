//! Layered ocean wave field with perspective, foam, and audio-reactive modulation.

mod compositor;
mod foam;
mod wave;

// Re-export public types
pub use compositor::{
    band_for_layer, layer_amplitude, layer_origin_y, Band, FoamDraw, FrameGeometry,
    LayerCompositor, LayerGeometry, Vertex,
};
pub use foam::{
    base_foam_alpha, generate_foam_particles, FoamParticle, FOAM_SPREAD_X, FOAM_SPREAD_Y,
};
pub use wave::{
    calculate_wave_point, foam_intensity, should_render_foam, wave_layer_color, DISTANT_LAYER_RGB,
    NEAR_LAYER_RGB,
};

/// Audio frequency band energies, averaged byte magnitudes
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioBands {
    pub low: f32,  // Bass (20-250 Hz)
    pub mid: f32,  // Mids (250-4000 Hz)
    pub high: f32, // Highs (4000-20000 Hz)
}

impl AudioBands {
    pub fn energy(&self, band: Band) -> f32 {
        match band {
            Band::Low => self.low,
            Band::Mid => self.mid,
            Band::High => self.high,
        }
    }
}

/// 8-bit RGB color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend towards `other`, `t` clamped to [0, 1]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_lookup() {
        let bands = AudioBands {
            low: 1.0,
            mid: 2.0,
            high: 3.0,
        };
        assert_eq!(bands.energy(Band::Low), 1.0);
        assert_eq!(bands.energy(Band::Mid), 2.0);
        assert_eq!(bands.energy(Band::High), 3.0);
    }

    #[test]
    fn test_rgb_lerp_endpoints() {
        let a = Rgb::new(0, 100, 200);
        let b = Rgb::new(100, 0, 0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(50, 50, 100));
        assert_eq!(a.lerp(b, f32::NAN), a);
    }
}
