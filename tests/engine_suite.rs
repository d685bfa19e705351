use pollster::block_on;

use tidewave::audio::{
    AudioAnalysisBridge, AudioBackend, ContextState, HarmonicsEngine, OutputStream,
    SoftwareBackend,
};
use tidewave::error::AudioError;
use tidewave::ocean::LayerCompositor;
use tidewave::params::OceanWaveConfig;

struct BlockedOutput;

impl OutputStream for BlockedOutput {
    fn start(&mut self) -> Result<(), AudioError> {
        Err(AudioError::ResumeRejected("no user gesture".to_string()))
    }
}

fn offline_engine() -> HarmonicsEngine<SoftwareBackend> {
    HarmonicsEngine::new(SoftwareBackend::offline(48000.0))
}

#[test]
fn engine_defaults() {
    let engine = offline_engine();
    let state = engine.state();
    assert_eq!(state.harmonics.len(), 16);
    assert!(state.harmonics[0].active);
    assert!(state.harmonics.iter().skip(1).all(|h| !h.active));
    assert!(!state.is_playing);
    assert_eq!(engine.voice_count(), 0);
}

#[test]
fn toggling_twice_returns_to_silence() {
    let mut engine = offline_engine();
    block_on(engine.toggle_play()).expect("offline resume should succeed");
    block_on(engine.toggle_play()).expect("stop never fails");

    assert!(!engine.is_playing());
    assert_eq!(engine.voice_count(), 0);

    let mut out = vec![1.0f32; 512];
    engine.backend().render(&mut out);
    assert!(out.iter().all(|&s| s == 0.0));
}

#[test]
fn toggle_harmonic_adds_and_removes_one_voice() {
    let mut engine = offline_engine();
    block_on(engine.play()).unwrap();
    assert_eq!(engine.voice_count(), 1);

    engine.toggle_harmonic(1);
    assert_eq!(engine.voice_count(), 2);
    assert!(engine.state().harmonics[1].active);

    engine.toggle_harmonic(1);
    assert_eq!(engine.voice_count(), 1);
    assert_eq!(engine.backend().live_oscillators(), 1);
}

#[test]
fn set_fundamental_applies_in_any_state() {
    let mut engine = offline_engine();
    engine.set_fundamental(440.0);
    assert_eq!(engine.state().fundamental_freq, 440.0);

    block_on(engine.play()).unwrap();
    engine.set_fundamental(440.0);
    assert_eq!(engine.state().fundamental_freq, 440.0);
    assert!(engine.is_playing());
}

#[test]
fn rejected_resume_leaves_engine_stopped() {
    let backend = SoftwareBackend::offline(44100.0).with_output(Box::new(BlockedOutput));
    let mut engine = HarmonicsEngine::new(backend);

    let err = block_on(engine.play()).expect_err("resume should be rejected");
    assert!(matches!(err, AudioError::ResumeRejected(_)));
    assert!(!engine.state().is_playing);
    assert_eq!(engine.voice_count(), 0);
    assert_eq!(engine.backend().state(), ContextState::Suspended);
}

#[test]
fn analysis_feeds_compositor_only_while_playing() {
    let mut engine = offline_engine();
    let mut bridge = AudioAnalysisBridge::default();
    let mut compositor = LayerCompositor::new(320, 180);
    let config = OceanWaveConfig::default();
    let flat = |_: f32, _: f32, _: f32| 0.5f32;

    assert_eq!(bridge.sample(engine.analysis_tap()), None);

    block_on(engine.play()).unwrap();
    engine.toggle_harmonic(2);
    let mut block = vec![0.0f32; 4096];
    engine.backend().render(&mut block);

    let bands = bridge.sample(engine.analysis_tap());
    assert!(bands.is_some());
    let frame = compositor.render_frame(&config, bands, 0.0, &flat);
    assert!(frame.layers()[0].amplitude > config.amplitude);
}
