//! Drawing surface and recording configuration.

/// Animation clock rate; wave time advances this many units per second
pub const ANIMATION_TICKS_PER_SECOND: f32 = 60.0;

/// Drawing surface configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Surface width (pixels)
    pub surface_width: u32,

    /// Surface height (pixels)
    pub surface_height: u32,

    /// Background fill behind the farthest layer (sky)
    pub background_rgb: [u8; 3],

    /// Height of the waveform strip along the top edge (pixels, 0 = hidden)
    pub waveform_strip_px: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            surface_width: 960,
            surface_height: 480,
            background_rgb: [12, 24, 38], // Night sky
            waveform_strip_px: 60,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.surface_width as f32 / self.surface_height.max(1) as f32
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames and audio
    pub output_dir: String,

    /// Frame rate (FPS)
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32, output_dir: impl Into<String>) -> Self {
        Self {
            duration_secs,
            output_dir: output_dir.into(),
            fps: 30,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs.max(0.0) * self.fps as f32).ceil() as usize
    }

    /// Audio samples rendered between two frames
    pub fn samples_per_frame(&self, sample_rate_hz: f32) -> usize {
        (sample_rate_hz / self.fps.max(1) as f32).round() as usize
    }

    /// Wave animation time at a captured frame
    pub fn animation_time(&self, frame: usize) -> f32 {
        frame as f32 / self.fps.max(1) as f32 * ANIMATION_TICKS_PER_SECOND
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> String {
        format!("{}/frames", self.output_dir)
    }

    /// Path of a single numbered frame
    pub fn frame_path(&self, frame: usize) -> String {
        format!("{}/frame_{:05}.png", self.frames_dir(), frame)
    }

    /// Audio file path
    pub fn audio_path(&self) -> String {
        format!("{}/audio.wav", self.output_dir)
    }
}
