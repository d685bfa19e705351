//! Per-frame bridge from an analyser node to wave-driving band energies.

use super::backend::{AudioBackend, NodeId};
use crate::ocean::AudioBands;
use crate::params::AnalyserConfig;

/// Borrowed access to one analyser node for the current frame
pub struct AnalysisTap<'a, B: AudioBackend> {
    backend: &'a B,
    analyser: NodeId,
}

impl<'a, B: AudioBackend> AnalysisTap<'a, B> {
    pub fn new(backend: &'a B, analyser: NodeId) -> Self {
        Self { backend, analyser }
    }

    /// Sample rate of the running context (Hz)
    pub fn sample_rate(&self) -> f32 {
        self.backend.sample_rate()
    }

    pub fn fft_size(&self) -> usize {
        self.backend.fft_size(self.analyser)
    }

    fn read_frequency(&self, out: &mut [u8]) {
        self.backend.byte_frequency_data(self.analyser, out);
    }

    fn read_time_domain(&self, out: &mut [u8]) {
        self.backend.byte_time_domain_data(self.analyser, out);
    }
}

/// Average byte magnitude between `min_hz` and `max_hz`
///
/// Bin index is `floor(hz / (sample_rate / fft_size))`, clamped to `data`.
/// Returns 0 for an empty range or a degenerate sample rate.
pub fn band_energy(
    data: &[u8],
    sample_rate_hz: f32,
    fft_size: usize,
    min_hz: f32,
    max_hz: f32,
) -> f32 {
    if fft_size == 0 || !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
        return 0.0;
    }
    let bin_width = sample_rate_hz / fft_size as f32;
    let to_bin = |hz: f32| -> usize {
        if hz.is_finite() && hz > 0.0 {
            ((hz / bin_width).floor() as usize).min(data.len())
        } else {
            0
        }
    };

    let (lo, hi) = (to_bin(min_hz), to_bin(max_hz));
    if hi <= lo {
        return 0.0;
    }
    let sum: u32 = data[lo..hi].iter().map(|&b| b as u32).sum();
    sum as f32 / (hi - lo) as f32
}

/// Reads frequency and time-domain data once per frame and derives [`AudioBands`]
pub struct AudioAnalysisBridge {
    config: AnalyserConfig,
    frequency_data: Vec<u8>,
    time_domain: Vec<u8>,
    bands: Option<AudioBands>,
}

impl AudioAnalysisBridge {
    pub fn new(config: AnalyserConfig) -> Self {
        Self {
            frequency_data: vec![0; config.bin_count()],
            time_domain: vec![128; config.fft_size],
            bands: None,
            config,
        }
    }

    /// Sample the analyser for this frame
    ///
    /// With no tap (synth stopped or not yet initialized) nothing is read, the
    /// waveform resets to silence and `None` is returned.
    pub fn sample<B: AudioBackend>(
        &mut self,
        tap: Option<AnalysisTap<'_, B>>,
    ) -> Option<AudioBands> {
        let Some(tap) = tap else {
            self.time_domain.fill(128);
            self.bands = None;
            return None;
        };

        let fft_size = match tap.fft_size() {
            0 => self.config.fft_size,
            size => size,
        };
        if self.time_domain.len() != fft_size {
            log::debug!("Analysis buffers resized for fft {}", fft_size);
            self.frequency_data.resize(fft_size / 2, 0);
            self.time_domain.resize(fft_size, 128);
        }

        tap.read_frequency(&mut self.frequency_data);
        tap.read_time_domain(&mut self.time_domain);

        let sample_rate = tap.sample_rate();
        let energy = |(lo, hi): (f32, f32)| {
            band_energy(&self.frequency_data, sample_rate, fft_size, lo, hi)
        };
        let bands = AudioBands {
            low: energy(self.config.low_range_hz),
            mid: energy(self.config.mid_range_hz),
            high: energy(self.config.high_range_hz),
        };

        self.bands = Some(bands);
        Some(bands)
    }

    /// Bands from the last sample, `None` when audio was not playing
    pub fn bands(&self) -> Option<AudioBands> {
        self.bands
    }

    pub fn frequency_data(&self) -> &[u8] {
        &self.frequency_data
    }

    /// Last time-domain frame in [-1, 1]
    pub fn waveform(&self) -> impl Iterator<Item = f32> + '_ {
        self.time_domain
            .iter()
            .map(|&b| (b as f32 - 128.0) / 128.0)
    }
}

impl Default for AudioAnalysisBridge {
    fn default() -> Self {
        Self::new(AnalyserConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::software::SoftwareBackend;
    use crate::audio::HarmonicsEngine;
    use pollster::block_on;

    #[test]
    fn test_band_energy_uses_runtime_rate() {
        let mut data = vec![0u8; 1024];
        data[42] = 200; // 1000 Hz at 48 kHz / 2048 ≈ bin 42.6
        data[46] = 100; // 1000 Hz at 44.1 kHz / 2048 ≈ bin 46.4

        let at_48k = band_energy(&data, 48000.0, 2048, 1000.0, 1030.0);
        let at_44k = band_energy(&data, 44100.0, 2048, 1000.0, 1030.0);
        assert_eq!(at_48k, 200.0);
        assert_eq!(at_44k, 100.0);
    }

    #[test]
    fn test_band_energy_guards() {
        let data = vec![255u8; 16];
        assert_eq!(band_energy(&data, 0.0, 2048, 20.0, 250.0), 0.0);
        assert_eq!(band_energy(&data, 48000.0, 0, 20.0, 250.0), 0.0);
        assert_eq!(band_energy(&data, 48000.0, 2048, 300.0, 200.0), 0.0);
        // Range beyond the buffer clamps instead of panicking
        assert_eq!(band_energy(&data, 48000.0, 32, 0.0, 30000.0), 255.0);
        assert_eq!(band_energy(&[], 48000.0, 2048, 20.0, 250.0), 0.0);
    }

    #[test]
    fn test_no_tap_skips_analysis() {
        let mut bridge = AudioAnalysisBridge::default();
        assert_eq!(bridge.sample::<SoftwareBackend>(None), None);
        assert_eq!(bridge.bands(), None);
        assert!(bridge.frequency_data().iter().all(|&b| b == 0));
        assert!(bridge.waveform().all(|s| s == 0.0));
    }

    #[test]
    fn test_playing_synth_drives_low_band() {
        let mut engine = HarmonicsEngine::new(SoftwareBackend::offline(48000.0));
        block_on(engine.play()).unwrap();

        let mut block = vec![0.0f32; 4096];
        engine.backend().render(&mut block);

        let mut bridge = AudioAnalysisBridge::default();
        let bands = bridge.sample(engine.analysis_tap()).unwrap();
        // 110 Hz fundamental sits in the bass band
        assert!(bands.low > bands.high, "{:?}", bands);
        assert!(bands.low > 0.0);
        assert_eq!(bridge.frequency_data().len(), 1024);
        let peak_bin = bridge
            .frequency_data()
            .iter()
            .enumerate()
            .max_by_key(|&(_, &b)| b)
            .map(|(bin, _)| bin);
        assert!(matches!(peak_bin, Some(bin) if bin < 10), "{:?}", peak_bin);
        assert!(bridge.waveform().any(|s| s.abs() > 0.01));

        engine.stop();
        assert_eq!(bridge.sample(engine.analysis_tap()), None);
        assert!(bridge.waveform().all(|s| s == 0.0));
    }
}
