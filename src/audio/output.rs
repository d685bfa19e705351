//! Native output: drives a [`SoftwareBackend`] from the default cpal device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::software::{GraphRenderer, OutputStream, SoftwareBackend};
use crate::error::AudioError;

/// cpal stream kept alive for the lifetime of the backend
pub struct CpalOutput {
    stream: cpal::Stream,
}

impl OutputStream for CpalOutput {
    fn start(&mut self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::ResumeRejected(format!("failed to start stream: {}", e)))
    }
}

/// Open the default output device and return a suspended backend bound to it
///
/// The backend runs at the device's native sample rate; the stream only starts
/// once the backend is resumed.
pub fn open_default_output() -> Result<SoftwareBackend, AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| AudioError::Device("no audio output device found".to_string()))?;

    let config = device
        .default_output_config()
        .map_err(|e| AudioError::Device(format!("failed to get audio config: {}", e)))?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    log::info!(
        "Audio: {} @ {}Hz ({} channels)",
        device.name().unwrap_or_else(|_| "Unknown".to_string()),
        sample_rate,
        channels
    );

    let backend = SoftwareBackend::offline(sample_rate);
    let renderer = backend.renderer();
    let stream = build_stream(&device, &config.into(), channels, renderer)?;

    // Some hosts start streams on creation; keep it quiet until resume
    if let Err(e) = stream.pause() {
        log::debug!("Stream pause not supported: {}", e);
    }

    Ok(backend.with_output(Box::new(CpalOutput { stream })))
}

fn build_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    renderer: GraphRenderer,
) -> Result<cpal::Stream, AudioError> {
    let mut mono: Vec<f32> = Vec::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let frames = data.len() / channels.max(1);
                mono.resize(frames, 0.0);
                renderer.render(&mut mono);

                // Same mono signal on every channel
                for (frame, &sample) in data.chunks_mut(channels.max(1)).zip(&mono) {
                    frame.fill(sample);
                }
            },
            |err| log::error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| AudioError::Device(format!("failed to build audio stream: {}", e)))
}
