//! Tidewave - layered ocean waves that swell with a harmonic series synth
//!
//! Offline mode renders PNG frames (and optionally a WAV) with the synth
//! running in-process; live mode plays through the default audio device.

use std::time::{Duration, Instant};

use clap::Parser;

use tidewave::audio::output::open_default_output;
use tidewave::audio::{AudioAnalysisBridge, AudioBackend, HarmonicsEngine, SoftwareBackend};
use tidewave::cli::Args;
use tidewave::error::AppError;
use tidewave::noise::PerlinNoise;
use tidewave::ocean::{LayerCompositor, Rgb};
use tidewave::params::{AnalyserConfig, OceanWaveConfig, ANIMATION_TICKS_PER_SECOND};
use tidewave::rendering::RasterSurface;

/// Sample rate for offline synthesis (Hz)
const OFFLINE_SAMPLE_RATE_HZ: f32 = 48000.0;

/// Control loop rate in live mode
const LIVE_FRAME_RATE: f32 = 30.0;

fn main() {
    env_logger::init();

    println!("Tidewave - audio-reactive ocean");

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();
    let ocean = args.ocean_config()?;
    let analyser = AnalyserConfig::default();
    analyser.validate()?;

    match args.live {
        Some(seconds) => run_live(&args, &ocean, analyser, seconds),
        None => run_offline(&args, &ocean, analyser),
    }
}

/// Render frames and audio in lockstep, one audio block per frame
fn run_offline(
    args: &Args,
    ocean: &OceanWaveConfig,
    analyser: AnalyserConfig,
) -> Result<(), AppError> {
    let render = args.render_config();
    let recording = args.recording_config()?;

    let backend = SoftwareBackend::offline(OFFLINE_SAMPLE_RATE_HZ);
    let mut engine = HarmonicsEngine::with_options(backend, args.harmonics_options());
    if !args.mute {
        pollster::block_on(engine.play())?;
    }

    let mut wav = if args.wav {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: engine.backend().sample_rate() as u32,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        Some(hound::WavWriter::create(recording.audio_path(), spec)?)
    } else {
        None
    };

    let noise = PerlinNoise::new(args.seed);
    let mut compositor = LayerCompositor::new(render.surface_width, render.surface_height);
    let mut bridge = AudioAnalysisBridge::new(analyser);
    let mut surface = RasterSurface::from_config(&render);
    let [r, g, b] = render.background_rgb;
    let background = Rgb::new(r, g, b);

    let total_frames = recording.total_frames();
    let mut block = vec![0.0f32; recording.samples_per_frame(engine.backend().sample_rate())];
    let mut waveform: Vec<f32> = Vec::new();

    println!(
        "Rendering {} frames ({}x{}, {:.2}:1) to {}",
        total_frames,
        render.surface_width,
        render.surface_height,
        render.aspect_ratio(),
        recording.frames_dir()
    );

    for frame in 0..total_frames {
        engine.backend().render(&mut block);
        if let Some(writer) = wav.as_mut() {
            for &sample in &block {
                writer.write_sample(sample)?;
            }
        }

        // Single analyser read per frame, shared by every layer
        let bands = bridge.sample(engine.analysis_tap());
        let time = recording.animation_time(frame);
        let geometry = compositor.render_frame(ocean, bands, time, &noise);

        surface.clear(background);
        geometry.draw(&mut surface);
        if bands.is_some() {
            waveform.clear();
            waveform.extend(bridge.waveform());
            surface.draw_waveform(&waveform, render.waveform_strip_px, Rgb::WHITE);
        }
        surface.save_frame(&recording, frame)?;

        if frame % recording.fps.max(1) as usize == 0 {
            log::info!(
                "Frame {}/{}: {} foam particles, bands {:?}",
                frame,
                total_frames,
                geometry.particle_count(),
                bands
            );
        }
    }

    engine.stop();
    if let Some(writer) = wav {
        writer.finalize()?;
        println!("Audio written to {}", recording.audio_path());
    }
    println!("Done: {} frames in {}", total_frames, recording.frames_dir());
    Ok(())
}

/// Play through the default device, driving the compositor from live analysis
fn run_live(
    args: &Args,
    ocean: &OceanWaveConfig,
    analyser: AnalyserConfig,
    seconds: f32,
) -> Result<(), AppError> {
    let render = args.render_config();
    let backend = open_default_output()?;
    let mut engine = HarmonicsEngine::with_options(backend, args.harmonics_options());
    pollster::block_on(engine.play())?;

    let active: Vec<usize> = engine.state().active_harmonics().map(|h| h.number).collect();
    println!(
        "Playing harmonics {:?} of {}Hz for {}s",
        active,
        engine.state().fundamental_freq,
        seconds
    );

    let noise = PerlinNoise::new(args.seed);
    let mut compositor = LayerCompositor::new(render.surface_width, render.surface_height);
    let mut bridge = AudioAnalysisBridge::new(analyser);
    let frame_time = Duration::from_secs_f32(1.0 / LIVE_FRAME_RATE);
    let start = Instant::now();
    let mut frame = 0usize;

    while start.elapsed().as_secs_f32() < seconds.max(0.0) {
        let bands = bridge.sample(engine.analysis_tap());
        let time = start.elapsed().as_secs_f32() * ANIMATION_TICKS_PER_SECOND;
        let geometry = compositor.render_frame(ocean, bands, time, &noise);

        if frame % LIVE_FRAME_RATE as usize == 0 {
            if let Some(bands) = bands {
                log::info!(
                    "low {:.1} mid {:.1} high {:.1} | {} foam particles",
                    bands.low,
                    bands.mid,
                    bands.high,
                    geometry.particle_count()
                );
            }
        }

        frame += 1;
        std::thread::sleep(frame_time);
    }

    engine.stop();
    println!("Stopped after {} frames", frame);
    Ok(())
}
