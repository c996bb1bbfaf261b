//! peq-core: Shared types for the parametric EQ
//!
//! This crate provides the types shared between the control side and the
//! audio thread: the parameter layout, the per-block settings snapshot,
//! the parameter store interface and the engine configuration.

mod config;
mod error;
mod params;
mod store;

pub use config::*;
pub use error::*;
pub use params::*;
pub use store::*;

/// Type alias for audio samples (always f64 internally)
pub type Sample = f64;

/// Fallback sample rate used before the host calls `prepare`
pub const DEFAULT_SAMPLE_RATE: f64 = 48000.0;

/// Fallback maximum block size used before the host calls `prepare`
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Processing context handed down by the host on `prepare`
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProcessSpec {
    pub sample_rate: f64,
    pub max_block_size: usize,
}

impl ProcessSpec {
    #[inline]
    pub fn new(sample_rate: f64, max_block_size: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
        }
    }

    #[inline]
    pub fn nyquist(&self) -> f64 {
        self.sample_rate * 0.5
    }

    /// Duration of one full block in milliseconds
    #[inline]
    pub fn block_ms(&self) -> f64 {
        (self.max_block_size as f64 / self.sample_rate) * 1000.0
    }
}

impl Default for ProcessSpec {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE, DEFAULT_BLOCK_SIZE)
    }
}

/// Decibel value wrapper
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Decibels(pub f64);

impl Decibels {
    pub const ZERO: Self = Self(0.0);
    pub const NEG_INF: Self = Self(f64::NEG_INFINITY);

    #[inline]
    pub fn from_gain(gain: f64) -> Self {
        if gain <= 0.0 {
            Self::NEG_INF
        } else {
            Self(20.0 * gain.log10())
        }
    }

    #[inline]
    pub fn to_gain(self) -> f64 {
        if self.0 <= -144.0 {
            0.0
        } else {
            10.0_f64.powf(self.0 / 20.0)
        }
    }
}

impl Default for Decibels {
    fn default() -> Self {
        Self::ZERO
    }
}
