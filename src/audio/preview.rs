//! Static waveform of the synth's harmonic mix, for display while stopped.

use std::f32::consts::TAU;

use super::harmonics::HarmonicsState;

/// Sum of active harmonic sines over one fundamental period, peak-normalized
///
/// `time` shifts the phase (in periods) so a host can animate the idle display.
/// Returns silence when nothing is active.
pub fn harmonic_preview(state: &HarmonicsState, samples: usize, time: f32) -> Vec<f32> {
    let mut wave: Vec<f32> = (0..samples)
        .map(|i| {
            let phase = (i as f32 / samples as f32 + time) * TAU;
            state
                .active_harmonics()
                .map(|h| h.volume * (phase * h.number as f32).sin())
                .sum()
        })
        .collect();

    let peak = wave.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if peak > f32::EPSILON {
        for sample in &mut wave {
            *sample /= peak;
        }
    }
    wave
}
