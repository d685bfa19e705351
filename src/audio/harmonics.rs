//! Additive harmonic-series synthesizer with a stopped/playing state machine.
//!
//! Each of the 16 harmonic slots maps to at most one oscillator → gain voice
//! feeding a shared master gain → analyser → destination chain. Voices exist
//! only for active slots while playing; everything else is torn down.

use super::analysis::AnalysisTap;
use super::backend::{AudioBackend, AudioParam, ContextState, NodeId};
use crate::error::AudioError;
use crate::params::synth_constants::{
    default_harmonic_volume, DEFAULT_FUNDAMENTAL_HZ, DEFAULT_MASTER_VOLUME, GAIN_SCALE,
    NUM_HARMONICS,
};
use crate::params::AnalyserConfig;

/// One slot of the harmonic series
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Harmonic {
    /// 1-based harmonic number (1 = fundamental)
    pub number: usize,
    pub active: bool,
    /// Relative loudness in [0, 1]
    pub volume: f32,
}

/// Snapshot of the synth's user-facing state
#[derive(Clone, Debug, PartialEq)]
pub struct HarmonicsState {
    pub fundamental_freq: f32,
    pub master_volume: f32,
    pub harmonics: [Harmonic; NUM_HARMONICS],
    pub is_playing: bool,
}

impl Default for HarmonicsState {
    fn default() -> Self {
        Self {
            fundamental_freq: DEFAULT_FUNDAMENTAL_HZ,
            master_volume: DEFAULT_MASTER_VOLUME,
            harmonics: std::array::from_fn(|index| Harmonic {
                number: index + 1,
                active: index == 0,
                volume: default_harmonic_volume(index),
            }),
            is_playing: false,
        }
    }
}

impl HarmonicsState {
    /// Slots that are switched on
    pub fn active_harmonics(&self) -> impl Iterator<Item = &Harmonic> {
        self.harmonics.iter().filter(|h| h.active)
    }
}

/// Partial override of the initial state
#[derive(Clone, Debug, Default)]
pub struct HarmonicsOptions {
    pub fundamental_freq: Option<f32>,
    pub master_volume: Option<f32>,
    /// 1-based harmonic numbers to start active (replaces the default set)
    pub active_harmonics: Option<Vec<usize>>,
}

#[derive(Clone, Copy, Debug)]
struct Voice {
    oscillator: NodeId,
    gain: NodeId,
}

/// Hardware chain built lazily on first play
#[derive(Clone, Copy, Debug)]
struct OutputChain {
    master: NodeId,
    analyser: NodeId,
}

/// Harmonic series synthesizer bound to one audio backend
pub struct HarmonicsEngine<B: AudioBackend> {
    backend: B,
    state: HarmonicsState,
    chain: Option<OutputChain>,
    voices: [Option<Voice>; NUM_HARMONICS],
    fft_size: usize,
}

impl<B: AudioBackend> HarmonicsEngine<B> {
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, HarmonicsOptions::default())
    }

    pub fn with_options(backend: B, options: HarmonicsOptions) -> Self {
        let mut state = HarmonicsState::default();

        match options.fundamental_freq {
            Some(freq) if freq.is_finite() && freq > 0.0 => state.fundamental_freq = freq,
            Some(freq) => log::warn!("Ignoring invalid fundamental {}Hz", freq),
            None => {}
        }
        if let Some(volume) = options.master_volume.filter(|v| v.is_finite()) {
            state.master_volume = volume.clamp(0.0, 1.0);
        }
        if let Some(numbers) = options.active_harmonics {
            for harmonic in &mut state.harmonics {
                harmonic.active = numbers.contains(&harmonic.number);
            }
        }

        Self {
            backend,
            state,
            chain: None,
            voices: [None; NUM_HARMONICS],
            fft_size: AnalyserConfig::default().fft_size,
        }
    }

    /// Deep copy of the current state
    pub fn state(&self) -> HarmonicsState {
        self.state.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    /// Number of live oscillator voices
    pub fn voice_count(&self) -> usize {
        self.voices.iter().flatten().count()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Analyser access for the current frame; `None` unless playing
    pub fn analysis_tap(&self) -> Option<AnalysisTap<'_, B>> {
        match (self.state.is_playing, self.chain) {
            (true, Some(chain)) => Some(AnalysisTap::new(&self.backend, chain.analyser)),
            _ => None,
        }
    }

    /// Build master gain → analyser → destination once
    fn ensure_audio_context(&mut self) -> Result<OutputChain, AudioError> {
        if let Some(chain) = self.chain {
            return Ok(chain);
        }

        let master = self.backend.create_gain(self.state.master_volume)?;
        let analyser = match self.backend.create_analyser(self.fft_size) {
            Ok(analyser) => analyser,
            Err(e) => {
                self.backend.release(master);
                return Err(e);
            }
        };
        let destination = self.backend.destination();
        let wired = self
            .backend
            .connect(master, analyser)
            .and_then(|_| self.backend.connect(analyser, destination));
        if let Err(e) = wired {
            self.backend.release(master);
            self.backend.release(analyser);
            return Err(e);
        }

        log::debug!(
            "Output chain ready: master {:?} → analyser {:?} (fft {})",
            master,
            analyser,
            self.fft_size
        );
        let chain = OutputChain { master, analyser };
        self.chain = Some(chain);
        Ok(chain)
    }

    /// Start playback
    ///
    /// Resolves once the backend is actually running. If the device refuses to
    /// resume, the engine ends up stopped and the error is returned. Calling it
    /// while playing wakes a context that was suspended underneath the engine.
    pub async fn play(&mut self) -> Result<(), AudioError> {
        let running = self.backend.state() == ContextState::Running;
        if self.state.is_playing && running {
            return Ok(());
        }

        self.ensure_audio_context()?;

        if !running {
            if let Err(e) = self.backend.resume().await {
                log::warn!("Audio resume failed: {}", e);
                self.stop();
                return Err(e);
            }
        }

        if self.state.is_playing {
            log::info!("Harmonics resumed");
            return Ok(());
        }

        self.state.is_playing = true;
        log::info!("Harmonics playing @ {}Hz", self.state.fundamental_freq);
        self.sync_oscillators();
        Ok(())
    }

    /// Stop playback and tear down every voice; safe from any state
    pub fn stop(&mut self) {
        for index in 0..NUM_HARMONICS {
            if let Some(voice) = self.voices[index].take() {
                self.teardown_voice(index, voice);
            }
        }
        if self.state.is_playing {
            log::info!("Harmonics stopped");
        }
        self.state.is_playing = false;
    }

    /// Flip between playing and stopped, returning the new playing flag
    pub async fn toggle_play(&mut self) -> Result<bool, AudioError> {
        if self.state.is_playing {
            self.stop();
        } else {
            self.play().await?;
        }
        Ok(self.state.is_playing)
    }

    /// Change the fundamental; bound oscillators follow at the current audio time
    pub fn set_fundamental(&mut self, freq: f32) {
        if !freq.is_finite() || freq <= 0.0 {
            return;
        }
        self.state.fundamental_freq = freq;
        if !self.state.is_playing {
            return;
        }

        let now = self.backend.current_time();
        for (index, voice) in self.voices.iter().enumerate() {
            if let Some(voice) = voice {
                let target = freq * (index + 1) as f32;
                if let Err(e) = self.backend.set_value_at_time(
                    voice.oscillator,
                    AudioParam::Frequency,
                    target,
                    now,
                ) {
                    log::warn!("Harmonic {} frequency update failed: {}", index + 1, e);
                }
            }
        }
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.state.master_volume = volume;

        if let Some(chain) = self.chain {
            let now = self.backend.current_time();
            if let Err(e) =
                self.backend
                    .set_value_at_time(chain.master, AudioParam::Gain, volume, now)
            {
                log::warn!("Master volume update failed: {}", e);
            }
        }
    }

    /// Flip a slot on or off (0-based index); out of range is ignored
    pub fn toggle_harmonic(&mut self, index: usize) {
        if let Some(active) = self.state.harmonics.get(index).map(|h| h.active) {
            self.set_harmonic_active(index, !active);
        }
    }

    pub fn set_harmonic_active(&mut self, index: usize, active: bool) {
        let Some(harmonic) = self.state.harmonics.get_mut(index) else {
            return;
        };
        if harmonic.active == active {
            return;
        }
        harmonic.active = active;
        if self.state.is_playing {
            self.sync_oscillators();
        }
    }

    /// Set a slot's volume; only that voice's gain is rescheduled
    pub fn set_harmonic_volume(&mut self, index: usize, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        let Some(harmonic) = self.state.harmonics.get_mut(index) else {
            return;
        };
        let volume = volume.clamp(0.0, 1.0);
        harmonic.volume = volume;

        if let Some(voice) = self.voices[index] {
            let now = self.backend.current_time();
            if let Err(e) = self.backend.set_value_at_time(
                voice.gain,
                AudioParam::Gain,
                volume * GAIN_SCALE,
                now,
            ) {
                log::warn!("Harmonic {} volume update failed: {}", index + 1, e);
            }
        }
    }

    /// Bring voices in line with the active set; untouched slots keep their nodes
    fn sync_oscillators(&mut self) {
        let Some(chain) = self.chain else {
            return;
        };
        if !self.state.is_playing {
            return;
        }

        for index in 0..NUM_HARMONICS {
            let active = self.state.harmonics[index].active;
            match (active, self.voices[index]) {
                (true, None) => match self.spawn_voice(index, chain.master) {
                    Ok(voice) => self.voices[index] = Some(voice),
                    Err(e) => log::warn!("Harmonic {} unavailable: {}", index + 1, e),
                },
                (false, Some(voice)) => {
                    self.voices[index] = None;
                    self.teardown_voice(index, voice);
                }
                _ => {}
            }
        }
    }

    fn spawn_voice(&mut self, index: usize, master: NodeId) -> Result<Voice, AudioError> {
        let harmonic = self.state.harmonics[index];
        let frequency = self.state.fundamental_freq * harmonic.number as f32;

        let oscillator = self.backend.create_oscillator(frequency)?;
        let gain = match self.backend.create_gain(harmonic.volume * GAIN_SCALE) {
            Ok(gain) => gain,
            Err(e) => {
                self.backend.release(oscillator);
                return Err(e);
            }
        };

        let started = self
            .backend
            .connect(oscillator, gain)
            .and_then(|_| self.backend.connect(gain, master))
            .and_then(|_| self.backend.start(oscillator));
        if let Err(e) = started {
            self.backend.disconnect(oscillator);
            self.backend.disconnect(gain);
            self.backend.release(oscillator);
            self.backend.release(gain);
            return Err(e);
        }

        log::debug!("Harmonic {} on @ {:.1}Hz", harmonic.number, frequency);
        Ok(Voice { oscillator, gain })
    }

    fn teardown_voice(&mut self, index: usize, voice: Voice) {
        // The backend may already have finished this oscillator
        if let Err(e) = self.backend.stop(voice.oscillator) {
            log::debug!("Harmonic {} stop ignored: {}", index + 1, e);
        }
        self.backend.disconnect(voice.oscillator);
        self.backend.disconnect(voice.gain);
        self.backend.release(voice.oscillator);
        self.backend.release(voice.gain);
        log::debug!("Harmonic {} off", index + 1);
    }
}
