//! Foam particle swarms spawned on wave crests.

use super::Rgb;
use crate::noise::NoiseSource;

/// Horizontal spread of a swarm (pixels, centered)
pub const FOAM_SPREAD_X: f32 = 12.0;

/// Vertical spread of a swarm (pixels, centered)
pub const FOAM_SPREAD_Y: f32 = 3.0;

const MIN_PARTICLES: f32 = 3.0;
const EXTRA_PARTICLES: f32 = 5.0;
const MIN_SIZE_PX: f32 = 1.5;
const SIZE_RANGE_PX: f32 = 2.0;

// Noise lattice spacing between particles of the same swarm
const PARTICLE_STRIDE: f32 = 17.31;
const JITTER_SCALE: f32 = 0.05;

/// A single foam speck, relative to its wave sample point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoamParticle {
    pub offset_x: f32,
    pub offset_y: f32,
    /// Radius in pixels
    pub size: f32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in [0, 255]
    pub alpha: f32,
}

impl FoamParticle {
    pub fn color(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// Crest opacity before dissipation
pub fn base_foam_alpha(foam_intensity: f32) -> f32 {
    (0.6 + foam_intensity * 0.4).min(1.0) * 255.0
}

/// Build the swarm for one wave sample point
///
/// Always yields between 3 and 8 particles; more intense crests get more.
/// Each particle draws its x and y jitter from separate noise samples offset by
/// the particle index so neighbouring specks do not move in lockstep.
pub fn generate_foam_particles(
    x: f32,
    layer_index: usize,
    time: f32,
    foam_intensity: f32,
    noise: &impl NoiseSource,
) -> Vec<FoamParticle> {
    let intensity = if foam_intensity.is_finite() {
        foam_intensity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let count = (MIN_PARTICLES + intensity * EXTRA_PARTICLES).floor() as usize;

    let base_alpha = base_foam_alpha(intensity);
    let layer_y = layer_index as f32 * 0.5;
    let t = time * 0.01;
    let px = x * JITTER_SCALE;

    (0..count)
        .map(|i| {
            let seed = i as f32 * PARTICLE_STRIDE;

            let jitter_x = unit(noise.sample(px + seed, layer_y, t));
            let jitter_y = unit(noise.sample(px, layer_y + seed + 100.0, t));
            let size_n = unit(noise.sample(px + seed, layer_y + 200.0, t + seed));

            let offset_x = (jitter_x - 0.5) * FOAM_SPREAD_X;
            let offset_y = (jitter_y - 0.5) * FOAM_SPREAD_Y;
            let dissipation = 1.0 - (offset_x.abs() / FOAM_SPREAD_X) * 0.6;

            FoamParticle {
                offset_x,
                offset_y,
                size: MIN_SIZE_PX + size_n * SIZE_RANGE_PX,
                r: 255,
                g: 255,
                b: 255,
                alpha: base_alpha * dissipation * (0.5 + intensity * 0.5),
            }
        })
        .collect()
}

fn unit(n: f32) -> f32 {
    if n.is_finite() {
        n.clamp(0.0, 1.0)
    } else {
        0.5
    }
}
