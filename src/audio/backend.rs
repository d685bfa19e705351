//! Capability interface over a real-time audio graph.
//!
//! The harmonics engine and analysis bridge only ever talk to an
//! [`AudioBackend`]. [`super::SoftwareBackend`] implements it in-process; a
//! browser host would implement it over WebAudio.

use crate::error::AudioError;

/// Opaque handle to a node owned by a backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Automatable node parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioParam {
    /// Oscillator frequency (Hz)
    Frequency,
    /// Gain node multiplier
    Gain,
}

/// Run state of the audio context
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextState {
    /// Created but not producing sound (low-power / awaiting user gesture)
    Suspended,
    Running,
    Closed,
}

/// Host-provided audio graph capabilities
#[allow(async_fn_in_trait)]
pub trait AudioBackend {
    /// Native sample rate of the running context (Hz)
    fn sample_rate(&self) -> f32;

    /// Audio clock (seconds) used for scheduling
    fn current_time(&self) -> f64;

    fn state(&self) -> ContextState;

    /// Leave the suspended state; completes once audio is actually flowing
    async fn resume(&mut self) -> Result<(), AudioError>;

    /// Final output node
    fn destination(&self) -> NodeId;

    /// Sine oscillator, created stopped
    fn create_oscillator(&mut self, frequency_hz: f32) -> Result<NodeId, AudioError>;

    fn create_gain(&mut self, gain: f32) -> Result<NodeId, AudioError>;

    /// Pass-through node exposing frequency and time-domain data
    fn create_analyser(&mut self, fft_size: usize) -> Result<NodeId, AudioError>;

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), AudioError>;

    /// Remove every outgoing connection of `node`
    fn disconnect(&mut self, node: NodeId);

    fn start(&mut self, oscillator: NodeId) -> Result<(), AudioError>;

    /// Stop an oscillator. Stopping one that already stopped is an
    /// [`AudioError::InvalidState`].
    fn stop(&mut self, oscillator: NodeId) -> Result<(), AudioError>;

    /// Schedule `param` of `node` to jump to `value` at audio time `time`
    fn set_value_at_time(
        &mut self,
        node: NodeId,
        param: AudioParam,
        value: f32,
        time: f64,
    ) -> Result<(), AudioError>;

    /// Analyser FFT window size
    fn fft_size(&self, analyser: NodeId) -> usize;

    /// Byte magnitudes (0-255) for the latest analysis window, `fft_size / 2` bins
    fn byte_frequency_data(&self, analyser: NodeId, out: &mut [u8]);

    /// Time-domain bytes (128 = silence) for the latest analysis window
    fn byte_time_domain_data(&self, analyser: NodeId, out: &mut [u8]);

    /// Free a node the caller no longer references
    fn release(&mut self, _node: NodeId) {}
}
