//! Error types for the audio graph, configuration, and the command-line host.

use thiserror::Error;

use crate::audio::NodeId;

/// Failures surfaced by an audio backend or the harmonics engine.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The output device refused to leave its suspended state (autoplay policy,
    /// device busy, stream could not start).
    #[error("audio resume rejected: {0}")]
    ResumeRejected(String),

    #[error("failed to create {kind} node: {reason}")]
    NodeCreation { kind: &'static str, reason: String },

    #[error("unknown audio node {0:?}")]
    UnknownNode(NodeId),

    /// Operation not valid for the node's current state, e.g. stopping an
    /// oscillator that already finished.
    #[error("invalid state for node {node:?}: {reason}")]
    InvalidState { node: NodeId, reason: &'static str },

    #[error("audio device unavailable: {0}")]
    Device(String),
}

/// Out-of-range configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}

impl ConfigError {
    pub(crate) fn out_of_range(field: &'static str, expected: &'static str, value: f64) -> Self {
        Self::OutOfRange {
            field,
            expected,
            value,
        }
    }
}

/// Top-level error for the command-line host.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to write frame: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to write audio: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
