//! Layer compositing: perspective, audio modulation, and draw geometry.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::foam::generate_foam_particles;
use super::wave::{calculate_wave_point, foam_intensity, should_render_foam, wave_layer_color};
use super::{AudioBands, Rgb};
use crate::noise::NoiseSource;
use crate::params::{OceanWaveConfig, AUDIO_AMPLITUDE_SCALE, WAVE_RESOLUTION};
use crate::rendering::DrawSurface;

/// Fraction of the surface height where the farthest layer sits
const HORIZON_FRACTION: f32 = 0.35;

/// Fraction of the surface height the layer origins are spread across
const LAYER_SPAN_FRACTION: f32 = 0.55;

/// Polygon vertex for GPU hosts (tightly packed `vec2<f32>`)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
}

/// Frequency band that drives a layer's amplitude
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Band {
    Low,
    Mid,
    High,
}

/// Layers 0-1 follow the bass, 2-3 the mids, the rest the highs
pub fn band_for_layer(layer_index: usize) -> Band {
    match layer_index {
        0 | 1 => Band::Low,
        2 | 3 => Band::Mid,
        _ => Band::High,
    }
}

/// Layer amplitude before depth scaling
///
/// Without bands (audio not playing) the configured amplitude is used as-is.
pub fn layer_amplitude(
    config: &OceanWaveConfig,
    layer_index: usize,
    bands: Option<&AudioBands>,
) -> f32 {
    match bands {
        Some(bands) => {
            config.amplitude + bands.energy(band_for_layer(layer_index)) * AUDIO_AMPLITUDE_SCALE
        }
        None => config.amplitude,
    }
}

/// Vertical origin of a layer; farthest layers sit highest
pub fn layer_origin_y(layer_index: usize, layers: usize, surface_height: f32) -> f32 {
    let spacing = surface_height * LAYER_SPAN_FRACTION / layers.max(1) as f32;
    surface_height * HORIZON_FRACTION + spacing * layer_index as f32
}

/// A foam speck ready for the rasterizer (absolute position)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoamDraw {
    pub center: Vec2,
    pub radius: f32,
    pub color: Rgb,
    /// Opacity in [0, 1]
    pub alpha: f32,
}

/// Fill polygon and foam overlay for one layer
#[derive(Clone, Debug, Default)]
pub struct LayerGeometry {
    pub layer_index: usize,
    pub color: Rgb,
    /// Audio-modulated amplitude used for this layer (before depth scaling)
    pub amplitude: f32,
    /// Closed outline: top curve left→right, then baseline right→left
    pub polygon: Vec<Vec2>,
    pub foam: Vec<FoamDraw>,
}

impl LayerGeometry {
    fn with_capacity() -> Self {
        Self {
            polygon: Vec::with_capacity(WAVE_RESOLUTION * 2),
            foam: Vec::with_capacity(WAVE_RESOLUTION),
            ..Self::default()
        }
    }

    /// Top curve only (first `WAVE_RESOLUTION` polygon points)
    pub fn crest(&self) -> &[Vec2] {
        &self.polygon[..self.polygon.len().min(WAVE_RESOLUTION)]
    }

    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygon
            .iter()
            .map(|p| Vertex {
                position: p.to_array(),
            })
            .collect()
    }

    /// Polygon as raw bytes for vertex buffer upload
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.vertices()).to_vec()
    }
}

/// Geometry for a whole frame, layers ordered far → near
#[derive(Clone, Debug, Default)]
pub struct FrameGeometry {
    layers: Vec<LayerGeometry>,
    active: usize,
}

impl FrameGeometry {
    pub fn layers(&self) -> &[LayerGeometry] {
        &self.layers[..self.active]
    }

    pub fn particle_count(&self) -> usize {
        self.layers().iter().map(|l| l.foam.len()).sum()
    }

    /// Paint every layer far → near, each polygon followed by its foam
    pub fn draw(&self, surface: &mut impl DrawSurface) {
        for layer in self.layers() {
            surface.fill_polygon(&layer.polygon, layer.color);
            for speck in &layer.foam {
                surface.fill_circle(speck.center, speck.radius, speck.color, speck.alpha);
            }
        }
    }
}

/// Builds per-frame layer geometry into buffers sized for the surface
pub struct LayerCompositor {
    width: f32,
    height: f32,
    frame: FrameGeometry,
}

impl LayerCompositor {
    /// Create a compositor for a `width` x `height` pixel surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            frame: FrameGeometry::default(),
        }
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Recreate geometry buffers for a new surface size
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!("Compositor resize: {}x{}", width, height);
        self.width = width as f32;
        self.height = height as f32;
        self.frame = FrameGeometry::default();
    }

    /// Build all layers for one frame
    ///
    /// # Arguments
    /// * `config` - Base wave configuration (never mutated)
    /// * `bands` - Band energies sampled once this frame, `None` when audio is not playing
    /// * `time` - Animation time
    /// * `noise` - Noise source shared by every layer
    pub fn render_frame(
        &mut self,
        config: &OceanWaveConfig,
        bands: Option<AudioBands>,
        time: f32,
        noise: &impl NoiseSource,
    ) -> &FrameGeometry {
        let layers = config.layers.max(1);
        while self.frame.layers.len() < layers {
            self.frame.layers.push(LayerGeometry::with_capacity());
        }
        self.frame.active = layers;

        let step = self.width / (WAVE_RESOLUTION - 1) as f32;

        for (index, layer) in self.frame.layers[..layers].iter_mut().enumerate() {
            let amplitude = layer_amplitude(config, index, bands.as_ref());
            let layer_config = config.with_amplitude(amplitude);
            // Foam is judged against the depth-scaled amplitude the wave is drawn with
            let foam_amplitude = amplitude.max(0.0) * layer_config.depth_scale(index);
            let origin_y = layer_origin_y(index, layers, self.height);

            layer.layer_index = index;
            layer.color = wave_layer_color(index, layers);
            layer.amplitude = amplitude;
            layer.polygon.clear();
            layer.foam.clear();

            for i in 0..WAVE_RESOLUTION {
                let x = i as f32 * step;
                let height = calculate_wave_point(x, index, time, &layer_config, noise);
                let y = origin_y - height;
                layer.polygon.push(Vec2::new(x, y));

                if !should_render_foam(height, foam_amplitude, config.foam_threshold) {
                    continue;
                }
                let intensity = foam_intensity(height, foam_amplitude, config.foam_threshold);
                for p in generate_foam_particles(x, index, time, intensity, noise) {
                    layer.foam.push(FoamDraw {
                        center: Vec2::new(x + p.offset_x, y + p.offset_y),
                        radius: p.size,
                        color: p.color(),
                        alpha: p.alpha / 255.0,
                    });
                }
            }

            let baseline = origin_y + amplitude.max(0.0) * 2.0;
            for i in (0..WAVE_RESOLUTION).rev() {
                layer.polygon.push(Vec2::new(i as f32 * step, baseline));
            }
        }

        &self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocean::{DISTANT_LAYER_RGB, NEAR_LAYER_RGB};

    fn constant(value: f32) -> impl Fn(f32, f32, f32) -> f32 {
        move |_, _, _| value
    }

    #[test]
    fn test_band_assignment() {
        assert_eq!(band_for_layer(0), Band::Low);
        assert_eq!(band_for_layer(1), Band::Low);
        assert_eq!(band_for_layer(2), Band::Mid);
        assert_eq!(band_for_layer(3), Band::Mid);
        assert_eq!(band_for_layer(4), Band::High);
        assert_eq!(band_for_layer(11), Band::High);
    }

    #[test]
    fn test_audio_reactive_mapping() {
        let config = OceanWaveConfig::default();
        let bands = AudioBands {
            low: 100.0,
            mid: 50.0,
            high: 10.0,
        };

        assert!((layer_amplitude(&config, 0, Some(&bands)) - 50.2).abs() < 1e-4);
        assert!((layer_amplitude(&config, 3, Some(&bands)) - 50.1).abs() < 1e-4);
        assert!((layer_amplitude(&config, 4, Some(&bands)) - 50.02).abs() < 1e-4);
        assert_eq!(layer_amplitude(&config, 0, None), config.amplitude);
    }

    #[test]
    fn test_frame_polygons_are_closed_strips() {
        let mut compositor = LayerCompositor::new(600, 300);
        let config = OceanWaveConfig::default();
        let frame = compositor.render_frame(&config, None, 0.0, &constant(0.5));

        assert_eq!(frame.layers().len(), 5);
        for layer in frame.layers() {
            assert_eq!(layer.polygon.len(), WAVE_RESOLUTION * 2);
            assert_eq!(layer.crest().len(), WAVE_RESOLUTION);
            assert_eq!(layer.polygon[0].x, 0.0);
            assert!((layer.polygon[WAVE_RESOLUTION - 1].x - 600.0).abs() < 1e-3);
            // Baseline runs back to the left edge
            assert_eq!(layer.polygon.last().map(|p| p.x), Some(0.0));
        }
        assert_eq!(frame.layers()[0].color, DISTANT_LAYER_RGB);
        assert_eq!(frame.layers()[4].color, NEAR_LAYER_RGB);
    }

    #[test]
    fn test_foam_appears_only_on_crests() {
        let mut compositor = LayerCompositor::new(600, 300);
        let config = OceanWaveConfig::default();

        let calm = compositor.render_frame(&config, None, 0.0, &constant(0.5));
        assert_eq!(calm.particle_count(), 0);

        // Noise 1.0 → normalized height 1.0 on layers with non-zero depth scale
        let stormy = compositor.render_frame(&config, None, 0.0, &constant(1.0));
        let layers = stormy.layers();
        assert!(!layers[0].foam.is_empty());
        assert!(!layers[1].foam.is_empty());
        // Flattened layers have no amplitude and therefore no foam
        assert!(layers[2].foam.is_empty());
        assert_eq!(layers[0].foam.len(), WAVE_RESOLUTION * 8);
    }

    #[test]
    fn test_bands_raise_layer_amplitude() {
        let mut compositor = LayerCompositor::new(200, 100);
        let config = OceanWaveConfig::default();
        let bands = AudioBands {
            low: 255.0,
            mid: 0.0,
            high: 0.0,
        };
        let frame = compositor.render_frame(&config, Some(bands), 0.0, &constant(0.5));
        assert!(frame.layers()[0].amplitude > config.amplitude);
        assert_eq!(frame.layers()[2].amplitude, config.amplitude);
    }

    #[test]
    fn test_layer_count_changes_and_resize() {
        let mut compositor = LayerCompositor::new(200, 100);
        let mut config = OceanWaveConfig::default();
        compositor.render_frame(&config, None, 0.0, &constant(0.5));

        config.layers = 2;
        let frame = compositor.render_frame(&config, None, 0.0, &constant(0.5));
        assert_eq!(frame.layers().len(), 2);

        compositor.resize(400, 200);
        assert_eq!(compositor.size(), (400.0, 200.0));
        let frame = compositor.render_frame(&config, None, 0.0, &constant(0.5));
        assert!((frame.layers()[0].polygon[WAVE_RESOLUTION - 1].x - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_vertex_bytes_layout() {
        let mut compositor = LayerCompositor::new(200, 100);
        let frame = compositor.render_frame(&OceanWaveConfig::default(), None, 0.0, &constant(0.5));
        let layer = &frame.layers()[0];
        assert_eq!(layer.vertex_bytes().len(), layer.polygon.len() * 8);
    }

    #[derive(Default)]
    struct Recorder {
        polygons: Vec<(usize, Rgb)>,
        circles: usize,
    }

    impl DrawSurface for Recorder {
        fn fill_polygon(&mut self, points: &[Vec2], color: Rgb) {
            self.polygons.push((points.len(), color));
        }

        fn fill_circle(&mut self, _center: Vec2, _radius: f32, _color: Rgb, alpha: f32) {
            assert!((0.0..=1.0).contains(&alpha));
            self.circles += 1;
        }
    }

    #[test]
    fn test_draw_replays_far_to_near() {
        let mut compositor = LayerCompositor::new(300, 150);
        let frame =
            compositor.render_frame(&OceanWaveConfig::default(), None, 0.0, &constant(1.0));
        let mut recorder = Recorder::default();
        frame.draw(&mut recorder);

        assert_eq!(recorder.polygons.len(), 5);
        assert_eq!(recorder.polygons[0], (WAVE_RESOLUTION * 2, DISTANT_LAYER_RGB));
        assert_eq!(recorder.polygons[4].1, NEAR_LAYER_RGB);
        assert_eq!(recorder.circles, frame.particle_count());
    }

    #[test]
    fn test_layer_origins_descend() {
        let far = layer_origin_y(0, 5, 500.0);
        let near = layer_origin_y(4, 5, 500.0);
        assert!(far < near);
        assert!(near < 500.0);
    }
}
