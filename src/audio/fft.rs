//! Windowed FFT magnitudes with analyser-style byte scaling.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Decibel floor mapped to byte 0
pub const MIN_DECIBELS: f32 = -100.0;

/// Decibel ceiling mapped to byte 255
pub const MAX_DECIBELS: f32 = -30.0;

/// Weight of the previous frame when smoothing magnitudes
pub const SMOOTHING_TIME_CONSTANT: f32 = 0.8;

/// FFT state for one analyser node
pub struct Spectrum {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl Spectrum {
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        Self {
            fft,
            window: (0..fft_size).map(|i| hann_window(i, fft_size)).collect(),
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    /// Analyse one window of samples (oldest first, `fft_size` long)
    pub fn process(&mut self, samples: &[f32]) {
        let size = self.fft_size();

        // Apply Hann window
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let s = samples.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(s * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let scale = 1.0 / size as f32;
        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.buffer[k].norm() * scale;
            *smoothed =
                SMOOTHING_TIME_CONSTANT * *smoothed + (1.0 - SMOOTHING_TIME_CONSTANT) * magnitude;
        }
    }

    /// Smoothed linear magnitudes, `fft_size / 2` bins
    pub fn magnitudes(&self) -> &[f32] {
        &self.smoothed
    }

    /// Smoothed magnitudes mapped from [MIN_DECIBELS, MAX_DECIBELS] to bytes
    pub fn byte_magnitudes(&self, out: &mut [u8]) {
        for (byte, &magnitude) in out.iter_mut().zip(&self.smoothed) {
            *byte = magnitude_to_byte(magnitude);
        }
        if out.len() > self.smoothed.len() {
            out[self.smoothed.len()..].fill(0);
        }
    }
}

/// Linear magnitude to analyser byte
pub fn magnitude_to_byte(magnitude: f32) -> u8 {
    if magnitude <= 0.0 || !magnitude.is_finite() {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 * (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
    scaled.clamp(0.0, 255.0) as u8
}

/// Time-domain sample to analyser byte (128 = silence)
pub fn sample_to_byte(sample: f32) -> u8 {
    (128.0 + sample * 128.0).clamp(0.0, 255.0) as u8
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    if size < 2 {
        return 1.0;
    }
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_window() {
        let size = 1024;

        // Hann window should be 0 at edges, 1 at center
        assert!((hann_window(0, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size - 1, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_sine_peaks_in_its_bin() {
        let size = 1024;
        let sample_rate = 48000.0;
        let bin = 40;
        let freq = bin as f32 * sample_rate / size as f32;
        let samples: Vec<f32> = (0..size)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect();

        let mut spectrum = Spectrum::new(size);
        for _ in 0..20 {
            spectrum.process(&samples);
        }
        let mut bytes = vec![0u8; size / 2];
        spectrum.byte_magnitudes(&mut bytes);

        let peak = spectrum
            .magnitudes()
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(peak, Some(bin));
        assert_eq!(bytes[bin], 255);
        let magnitudes = spectrum.magnitudes();
        assert!(magnitudes[bin * 4] < magnitudes[bin] * 0.01);
    }

    #[test]
    fn test_silence_is_zero() {
        let mut spectrum = Spectrum::new(256);
        spectrum.process(&[0.0; 256]);
        let mut bytes = vec![7u8; 200];
        spectrum.byte_magnitudes(&mut bytes);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_byte_conversions() {
        assert_eq!(magnitude_to_byte(0.0), 0);
        assert_eq!(magnitude_to_byte(1.0), 255);
        assert_eq!(sample_to_byte(0.0), 128);
        assert_eq!(sample_to_byte(-1.0), 0);
        assert_eq!(sample_to_byte(1.0), 255);
    }
}
