//! Noise sampling for the wave field.
//!
//! The wave math never owns a noise generator; it takes anything implementing
//! [`NoiseSource`], so tests can pin the field with a constant closure.

use ::noise::{NoiseFn, Perlin};

/// 3D noise sampler returning values in `[0, 1]`.
pub trait NoiseSource {
    fn sample(&self, x: f32, y: f32, z: f32) -> f32;
}

impl<F> NoiseSource for F
where
    F: Fn(f32, f32, f32) -> f32,
{
    fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        self(x, y, z)
    }
}

/// Perlin noise remapped from `[-1, 1]` into `[0, 1]`.
pub struct PerlinNoise {
    perlin: Perlin,
}

impl PerlinNoise {
    /// Create new noise generator with seed
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }
}

impl Default for PerlinNoise {
    fn default() -> Self {
        Self::new(42)
    }
}

impl NoiseSource for PerlinNoise {
    fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        let raw = self.perlin.get([x as f64, y as f64, z as f64]) as f32;
        ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}
