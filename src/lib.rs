//! Tidewave library - layered audio-reactive ocean and harmonic series synth

pub mod audio;
pub mod cli;
pub mod error;
pub mod noise;
pub mod ocean;
pub mod params;
pub mod rendering;
