//! Command-line argument parsing.

use clap::Parser;

use crate::audio::HarmonicsOptions;
use crate::error::ConfigError;
use crate::params::{OceanWaveConfig, RecordingConfig, RenderConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Tidewave")]
#[command(about = "Audio-reactive layered ocean with a harmonic series synth", long_about = None)]
pub struct Args {
    /// Capture length for offline rendering (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "3")]
    pub duration: f32,

    /// Output directory for frames and audio
    #[arg(long, value_name = "DIR", default_value = "output")]
    pub output: String,

    /// Also write the synth output to <DIR>/audio.wav
    #[arg(long)]
    pub wav: bool,

    /// Play through the default audio device instead of rendering frames
    #[arg(long, value_name = "SECONDS")]
    pub live: Option<f32>,

    /// Render the ocean without starting the synth
    #[arg(long)]
    pub mute: bool,

    /// Surface width (pixels)
    #[arg(long)]
    pub width: Option<u32>,

    /// Surface height (pixels)
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of wave layers
    #[arg(long)]
    pub layers: Option<usize>,

    /// Base wave amplitude (pixels)
    #[arg(long)]
    pub amplitude: Option<f32>,

    /// Normalized crest height where foam starts [0, 1]
    #[arg(long)]
    pub foam_threshold: Option<f32>,

    /// Per-layer amplitude falloff [0, 1)
    #[arg(long)]
    pub perspective: Option<f32>,

    /// Perlin noise seed
    #[arg(long, default_value = "42")]
    pub seed: u32,

    /// Fundamental frequency (Hz)
    #[arg(long, value_name = "HZ")]
    pub fundamental: Option<f32>,

    /// Master volume [0, 1]
    #[arg(long)]
    pub volume: Option<f32>,

    /// Active harmonic numbers, e.g. 1,3,5
    #[arg(long, value_delimiter = ',', value_name = "N,...")]
    pub harmonics: Option<Vec<usize>>,
}

impl Args {
    /// Wave configuration with command-line overrides applied and validated
    pub fn ocean_config(&self) -> Result<OceanWaveConfig, ConfigError> {
        let mut config = OceanWaveConfig::default();
        if let Some(layers) = self.layers {
            config.layers = layers;
        }
        if let Some(amplitude) = self.amplitude {
            config.amplitude = amplitude;
        }
        if let Some(threshold) = self.foam_threshold {
            config.foam_threshold = threshold;
        }
        if let Some(perspective) = self.perspective {
            config.perspective = perspective;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn render_config(&self) -> RenderConfig {
        let mut config = RenderConfig::default();
        if let Some(width) = self.width {
            config.surface_width = width.max(1);
        }
        if let Some(height) = self.height {
            config.surface_height = height.max(1);
        }
        config
    }

    pub fn harmonics_options(&self) -> HarmonicsOptions {
        HarmonicsOptions {
            fundamental_freq: self.fundamental,
            master_volume: self.volume,
            active_harmonics: self.harmonics.clone(),
        }
    }

    /// Recording configuration with its output directories created
    pub fn recording_config(&self) -> std::io::Result<RecordingConfig> {
        let config = RecordingConfig::new(self.duration, self.output.as_str());
        std::fs::create_dir_all(config.frames_dir())?;
        Ok(config)
    }
}
