//! Error types for the parametric EQ

use thiserror::Error;

/// Core error type
///
/// None of these ever reach the audio callback: the signal path clamps or
/// falls back instead. They are returned from control-side APIs only.
#[derive(Error, Debug)]
pub enum EqError {
    #[error("Invalid cutoff frequency: {freq} Hz (must be inside (0, {nyquist}) Hz)")]
    InvalidCutoff { freq: f64, nyquist: f64 },

    #[error("Invalid filter order: {0} (must be even and within 2..=8)")]
    InvalidOrder(usize),

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias
pub type EqResult<T> = Result<T, EqError>;
