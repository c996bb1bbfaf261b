//! Parameter layout and the per-block settings snapshot

use serde::{Deserialize, Serialize};

use crate::store::ParameterStore;

/// Number of peak (bell) bands in each channel chain
pub const PEAK_BAND_COUNT: usize = 3;

/// Number of automatable parameters
pub const PARAM_COUNT: usize = 13;

// ============================================================================
// RANGES
// ============================================================================

/// Value range of one parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Quantization interval, 0.0 for continuous
    pub step: f64,
    pub skew: ParamSkew,
}

impl ParamRange {
    pub const fn linear(min: f64, max: f64, default: f64, step: f64) -> Self {
        Self {
            min,
            max,
            default,
            step,
            skew: ParamSkew::Linear,
        }
    }

    pub const fn exponential(min: f64, max: f64, default: f64, step: f64, exponent: f64) -> Self {
        Self {
            min,
            max,
            default,
            step,
            skew: ParamSkew::Exponential(exponent),
        }
    }

    /// Clamp to the range; NaN collapses to the default
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Clamp, then round to the nearest step
    pub fn snap(&self, value: f64) -> f64 {
        let clamped = self.clamp(value);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).min(self.max)
    }

    /// Denormalize a 0-1 value to actual value
    pub fn denormalize(&self, normalized: f64) -> f64 {
        let normalized = if normalized.is_nan() {
            self.normalize(self.default)
        } else {
            normalized.clamp(0.0, 1.0)
        };
        match self.skew {
            ParamSkew::Linear => self.min + normalized * (self.max - self.min),
            ParamSkew::Logarithmic => {
                let log_min = self.min.ln();
                let log_max = self.max.ln();
                (log_min + normalized * (log_max - log_min)).exp()
            }
            ParamSkew::Exponential(exp) => self.min + normalized.powf(exp) * (self.max - self.min),
        }
    }

    /// Normalize an actual value to 0-1
    pub fn normalize(&self, value: f64) -> f64 {
        let clamped = self.clamp(value);
        match self.skew {
            ParamSkew::Linear => (clamped - self.min) / (self.max - self.min),
            ParamSkew::Logarithmic => {
                let log_min = self.min.ln();
                let log_max = self.max.ln();
                (clamped.ln() - log_min) / (log_max - log_min)
            }
            ParamSkew::Exponential(exp) => {
                ((clamped - self.min) / (self.max - self.min)).powf(1.0 / exp)
            }
        }
    }
}

/// Parameter skew type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamSkew {
    Linear,
    Logarithmic,
    Exponential(f64),
}

/// Frequency knobs spend most of their travel in the low range
/// (normalized^5, i.e. a skew factor of 0.2).
const FREQ_SKEW_EXPONENT: f64 = 5.0;

const fn freq_range(default: f64) -> ParamRange {
    ParamRange::exponential(20.0, 20000.0, default, 1.0, FREQ_SKEW_EXPONENT)
}

const GAIN_RANGE: ParamRange = ParamRange::linear(-24.0, 24.0, 0.0, 0.5);
const Q_RANGE: ParamRange = ParamRange::linear(0.1, 10.0, 1.0, 0.05);
const SLOPE_RANGE: ParamRange = ParamRange::linear(0.0, 3.0, 0.0, 1.0);

// ============================================================================
// PARAMETER IDS
// ============================================================================

/// The thirteen automatable parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum ParamId {
    LowCutFreq,
    HiCutFreq,
    LowCutSlope,
    HiCutSlope,
    Peak1Freq,
    Peak1Gain,
    Peak1Q,
    Peak2Freq,
    Peak2Gain,
    Peak2Q,
    Peak3Freq,
    Peak3Gain,
    Peak3Q,
}

/// All parameters in storage order
pub const PARAMETER_LAYOUT: [ParamId; PARAM_COUNT] = [
    ParamId::LowCutFreq,
    ParamId::HiCutFreq,
    ParamId::LowCutSlope,
    ParamId::HiCutSlope,
    ParamId::Peak1Freq,
    ParamId::Peak1Gain,
    ParamId::Peak1Q,
    ParamId::Peak2Freq,
    ParamId::Peak2Gain,
    ParamId::Peak2Q,
    ParamId::Peak3Freq,
    ParamId::Peak3Gain,
    ParamId::Peak3Q,
];

impl ParamId {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used by the host-facing parameter store
    pub fn name(self) -> &'static str {
        match self {
            ParamId::LowCutFreq => "LowCutFreq",
            ParamId::HiCutFreq => "HiCutFreq",
            ParamId::LowCutSlope => "LowCutSlope",
            ParamId::HiCutSlope => "HiCutSlope",
            ParamId::Peak1Freq => "Peak1Freq",
            ParamId::Peak1Gain => "Peak1Gain",
            ParamId::Peak1Q => "Peak1Q",
            ParamId::Peak2Freq => "Peak2Freq",
            ParamId::Peak2Gain => "Peak2Gain",
            ParamId::Peak2Q => "Peak2Q",
            ParamId::Peak3Freq => "Peak3Freq",
            ParamId::Peak3Gain => "Peak3Gain",
            ParamId::Peak3Q => "Peak3Q",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        PARAMETER_LAYOUT.iter().copied().find(|id| id.name() == name)
    }

    pub fn range(self) -> ParamRange {
        match self {
            ParamId::LowCutFreq => freq_range(20.0),
            ParamId::HiCutFreq => freq_range(20000.0),
            ParamId::Peak1Freq => freq_range(500.0),
            ParamId::Peak2Freq => freq_range(750.0),
            ParamId::Peak3Freq => freq_range(1200.0),
            ParamId::Peak1Gain | ParamId::Peak2Gain | ParamId::Peak3Gain => GAIN_RANGE,
            ParamId::Peak1Q | ParamId::Peak2Q | ParamId::Peak3Q => Q_RANGE,
            ParamId::LowCutSlope | ParamId::HiCutSlope => SLOPE_RANGE,
        }
    }

    /// Choice parameters are read through `get_enum_index`
    #[inline]
    pub fn is_choice(self) -> bool {
        matches!(self, ParamId::LowCutSlope | ParamId::HiCutSlope)
    }

    /// (frequency, gain, q) ids of a peak band, `band` in 0..3
    pub fn peak_band(band: usize) -> (ParamId, ParamId, ParamId) {
        match band {
            0 => (ParamId::Peak1Freq, ParamId::Peak1Gain, ParamId::Peak1Q),
            1 => (ParamId::Peak2Freq, ParamId::Peak2Gain, ParamId::Peak2Q),
            _ => (ParamId::Peak3Freq, ParamId::Peak3Gain, ParamId::Peak3Q),
        }
    }
}

// ============================================================================
// SLOPE
// ============================================================================

/// Cut filter slope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Slope {
    #[default]
    Db12,
    Db24,
    Db36,
    Db48,
}

impl Slope {
    pub const ALL: [Slope; 4] = [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48];

    /// Saturating conversion from a choice index
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=0 => Slope::Db12,
            1 => Slope::Db24,
            2 => Slope::Db36,
            _ => Slope::Db48,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Butterworth order: 2, 4, 6 or 8
    #[inline]
    pub fn order(self) -> usize {
        2 * (self.index() + 1)
    }

    #[inline]
    pub fn db_per_octave(self) -> u32 {
        12 * (self.index() as u32 + 1)
    }

    pub fn label(self) -> &'static str {
        match self {
            Slope::Db12 => "12 dB/Oct",
            Slope::Db24 => "24 dB/Oct",
            Slope::Db36 => "36 dB/Oct",
            Slope::Db48 => "48 dB/Oct",
        }
    }
}

// ============================================================================
// SETTINGS SNAPSHOT
// ============================================================================

/// One bell band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakSettings {
    pub freq: f32,
    pub gain_db: f32,
    pub q: f32,
}

/// Snapshot of every parameter, taken once at the top of each block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainSettings {
    pub low_cut_freq: f32,
    pub high_cut_freq: f32,
    pub low_cut_slope: Slope,
    pub high_cut_slope: Slope,
    pub peaks: [PeakSettings; PEAK_BAND_COUNT],
}

impl ChainSettings {
    /// Read every parameter from the store.
    ///
    /// Each field is an independent atomic load; fields may come from
    /// different control-side writes.
    pub fn from_store<S: ParameterStore + ?Sized>(store: &S) -> Self {
        let peak = |band: usize| {
            let (freq, gain, q) = ParamId::peak_band(band);
            PeakSettings {
                freq: store.get_param(freq),
                gain_db: store.get_param(gain),
                q: store.get_param(q),
            }
        };

        Self {
            low_cut_freq: store.get_param(ParamId::LowCutFreq),
            high_cut_freq: store.get_param(ParamId::HiCutFreq),
            low_cut_slope: Slope::from_index(store.get_choice(ParamId::LowCutSlope)),
            high_cut_slope: Slope::from_index(store.get_choice(ParamId::HiCutSlope)),
            peaks: [peak(0), peak(1), peak(2)],
        }
    }
}

impl Default for ChainSettings {
    fn default() -> Self {
        let default = |id: ParamId| id.range().default as f32;
        let peak = |band: usize| {
            let (freq, gain, q) = ParamId::peak_band(band);
            PeakSettings {
                freq: default(freq),
                gain_db: default(gain),
                q: default(q),
            }
        };

        Self {
            low_cut_freq: default(ParamId::LowCutFreq),
            high_cut_freq: default(ParamId::HiCutFreq),
            low_cut_slope: Slope::default(),
            high_cut_slope: Slope::default(),
            peaks: [peak(0), peak(1), peak(2)],
        }
    }
}
