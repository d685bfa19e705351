//! Drawing surface abstraction and a CPU rasterizer for frame capture.

use glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::ocean::Rgb;
use crate::params::{RecordingConfig, RenderConfig};

/// Host-side painter the compositor's geometry is replayed onto
pub trait DrawSurface {
    /// Fill a closed polygon (even-odd rule)
    fn fill_polygon(&mut self, points: &[Vec2], color: Rgb);

    /// Blend a filled circle with opacity `alpha` in [0, 1]
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32);
}

/// Software surface backed by an RGBA image
pub struct RasterSurface {
    image: RgbaImage,
    // Reused scanline crossings
    crossings: Vec<f32>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            crossings: Vec::new(),
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.surface_width, config.surface_height)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Fill the whole surface with an opaque color
    pub fn clear(&mut self, color: Rgb) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([color.r, color.g, color.b, 255]);
        }
    }

    /// Trace a waveform (samples in [-1, 1]) across a strip along the top edge
    pub fn draw_waveform(&mut self, samples: &[f32], strip_px: u32, color: Rgb) {
        let (width, height) = self.image.dimensions();
        let strip = strip_px.min(height);
        if samples.is_empty() || strip == 0 || width == 0 {
            return;
        }

        let mid = strip as f32 / 2.0;
        let row_for = |sample: f32| -> u32 {
            let s = if sample.is_finite() { sample.clamp(-1.0, 1.0) } else { 0.0 };
            ((mid - s * (mid - 1.0)).round() as u32).min(strip - 1)
        };

        let mut previous: Option<u32> = None;
        for x in 0..width {
            let index = x as usize * samples.len() / width as usize;
            let row = row_for(samples[index]);
            // Connect to the previous column so steep edges stay continuous
            let (top, bottom) = match previous {
                Some(prev) => (prev.min(row), prev.max(row)),
                None => (row, row),
            };
            for y in top..=bottom {
                self.blend(x, y, color, 0.8);
            }
            previous = Some(row);
        }
    }

    /// Save the surface as a PNG at `path`
    pub fn save(&self, path: &str) -> Result<(), image::ImageError> {
        self.image.save(path)
    }

    /// Save as the numbered frame of a recording
    pub fn save_frame(
        &self,
        config: &RecordingConfig,
        frame: usize,
    ) -> Result<(), image::ImageError> {
        self.save(&config.frame_path(frame))
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgb, alpha: f32) {
        let alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
        let pixel = self.image.get_pixel_mut(x, y);
        let mix =
            |dst: u8, src: u8| (src as f32 * alpha + dst as f32 * (1.0 - alpha)).round() as u8;
        let Rgba([r, g, b, a]) = *pixel;
        *pixel = Rgba([
            mix(r, color.r),
            mix(g, color.g),
            mix(b, color.b),
            a.max((alpha * 255.0) as u8),
        ]);
    }
}

impl DrawSurface for RasterSurface {
    fn fill_polygon(&mut self, points: &[Vec2], color: Rgb) {
        if points.len() < 3 {
            return;
        }
        let (width, height) = self.image.dimensions();

        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).max(0.0);
        let max_y = points
            .iter()
            .map(|p| p.y)
            .fold(f32::NEG_INFINITY, f32::max)
            .min(height as f32);
        if !(min_y < max_y) {
            return;
        }

        let fill = Rgba([color.r, color.g, color.b, 255]);
        for row in (min_y.floor() as u32)..(max_y.ceil() as u32).min(height) {
            // Sample at pixel centers
            let y = row as f32 + 0.5;

            self.crossings.clear();
            for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
                if (a.y <= y) != (b.y <= y) {
                    let t = (y - a.y) / (b.y - a.y);
                    self.crossings.push(a.x + t * (b.x - a.x));
                }
            }
            self.crossings.sort_by(f32::total_cmp);

            for span in self.crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil().clamp(0.0, width as f32) as u32;
                let end = (span[1] - 0.5).ceil().clamp(0.0, width as f32) as u32;
                for x in start..end {
                    self.image.put_pixel(x, row, fill);
                }
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        if !(radius > 0.0) || !center.is_finite() {
            return;
        }
        let (width, height) = self.image.dimensions();
        let x0 = (center.x - radius).floor().clamp(0.0, width as f32) as u32;
        let x1 = (center.x + radius).ceil().clamp(0.0, width as f32) as u32;
        let y0 = (center.y - radius).floor().clamp(0.0, height as f32) as u32;
        let y1 = (center.y + radius).ceil().clamp(0.0, height as f32) as u32;

        let r2 = radius * radius;
        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
                if d.length_squared() <= r2 {
                    self.blend(x, y, color, alpha);
                }
            }
        }
    }
}
