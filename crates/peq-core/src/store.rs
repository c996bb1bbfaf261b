//! Parameter store: the only state shared between the control context
//! and the audio callback.

use portable_atomic::{AtomicF32, Ordering};

use crate::error::{EqError, EqResult};
use crate::params::{ChainSettings, PARAM_COUNT, PARAMETER_LAYOUT, ParamId};

/// Read-only view of the host's automation parameters.
///
/// Implementations must be wait-free on the read side: the audio callback
/// polls every parameter once per block.
pub trait ParameterStore: Send + Sync {
    /// Current value of a float parameter; unknown names read as 0.0
    fn get_float(&self, name: &str) -> f32;

    /// Current index of a choice parameter; unknown names read as 0
    fn get_enum_index(&self, name: &str) -> i32;

    #[inline]
    fn get_param(&self, id: ParamId) -> f32 {
        self.get_float(id.name())
    }

    #[inline]
    fn get_choice(&self, id: ParamId) -> i32 {
        self.get_enum_index(id.name())
    }
}

/// Lock-free parameter store, one atomic cell per parameter
///
/// Writes are clamped and quantized to each parameter's range before they
/// are published, so the audio thread only ever sees in-range values.
#[derive(Debug)]
pub struct AtomicParameterStore {
    values: [AtomicF32; PARAM_COUNT],
}

impl AtomicParameterStore {
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|i| {
                AtomicF32::new(PARAMETER_LAYOUT[i].range().default as f32)
            }),
        }
    }

    /// Build a store holding the given snapshot
    pub fn from_settings(settings: &ChainSettings) -> Self {
        let store = Self::new();
        store.apply_settings(settings);
        store
    }

    #[inline]
    pub fn param(&self, id: ParamId) -> f32 {
        self.values[id.index()].load(Ordering::Relaxed)
    }

    /// Publish a new value (clamped and snapped to the parameter's range)
    #[inline]
    pub fn set_param(&self, id: ParamId, value: f32) {
        let snapped = id.range().snap(value as f64) as f32;
        self.values[id.index()].store(snapped, Ordering::Relaxed);
    }

    /// Publish a host-normalized value in 0..1
    pub fn set_normalized(&self, id: ParamId, normalized: f64) {
        let value = id.range().denormalize(normalized);
        self.set_param(id, value as f32);
    }

    pub fn normalized(&self, id: ParamId) -> f64 {
        id.range().normalize(self.param(id) as f64)
    }

    /// Set by name, for control-side callers working with host identifiers
    pub fn set(&self, name: &str, value: f32) -> EqResult<()> {
        let id = ParamId::from_name(name)
            .ok_or_else(|| EqError::UnknownParameter(name.to_string()))?;
        self.set_param(id, value);
        Ok(())
    }

    /// Get by name, reporting unknown names instead of reading 0.0
    pub fn try_get(&self, name: &str) -> EqResult<f32> {
        ParamId::from_name(name)
            .map(|id| self.param(id))
            .ok_or_else(|| EqError::UnknownParameter(name.to_string()))
    }

    /// Publish a whole snapshot, field by field
    pub fn apply_settings(&self, settings: &ChainSettings) {
        self.set_param(ParamId::LowCutFreq, settings.low_cut_freq);
        self.set_param(ParamId::HiCutFreq, settings.high_cut_freq);
        self.set_param(ParamId::LowCutSlope, settings.low_cut_slope.index() as f32);
        self.set_param(ParamId::HiCutSlope, settings.high_cut_slope.index() as f32);
        for (band, peak) in settings.peaks.iter().enumerate() {
            let (freq, gain, q) = ParamId::peak_band(band);
            self.set_param(freq, peak.freq);
            self.set_param(gain, peak.gain_db);
            self.set_param(q, peak.q);
        }
    }

    pub fn snapshot(&self) -> ChainSettings {
        ChainSettings::from_store(self)
    }

    pub fn reset_to_defaults(&self) {
        for id in PARAMETER_LAYOUT {
            self.values[id.index()].store(id.range().default as f32, Ordering::Relaxed);
        }
        log::debug!("AtomicParameterStore: reset {} parameters to defaults", PARAM_COUNT);
    }
}

impl Default for AtomicParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterStore for AtomicParameterStore {
    fn get_float(&self, name: &str) -> f32 {
        ParamId::from_name(name).map_or(0.0, |id| self.param(id))
    }

    fn get_enum_index(&self, name: &str) -> i32 {
        ParamId::from_name(name).map_or(0, |id| self.param(id).round() as i32)
    }

    // Direct index, no name lookup on the audio thread
    #[inline]
    fn get_param(&self, id: ParamId) -> f32 {
        self.param(id)
    }

    #[inline]
    fn get_choice(&self, id: ParamId) -> i32 {
        self.param(id).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Slope;
    use std::sync::Arc;

    #[test]
    fn test_defaults() {
        let store = AtomicParameterStore::new();
        assert_eq!(store.get_float("LowCutFreq"), 20.0);
        assert_eq!(store.get_float("HiCutFreq"), 20000.0);
        assert_eq!(store.get_float("Peak2Freq"), 750.0);
        assert_eq!(store.get_enum_index("HiCutSlope"), 0);
        assert_eq!(store.snapshot(), ChainSettings::default());
    }

    #[test]
    fn test_writes_are_clamped_at_the_boundary() {
        let store = AtomicParameterStore::new();
        store.set_param(ParamId::Peak1Gain, 40.0);
        store.set_param(ParamId::Peak1Q, -1.0);
        store.set_param(ParamId::LowCutFreq, 5.0);
        store.set_param(ParamId::LowCutSlope, 7.0);
        store.set_param(ParamId::Peak3Gain, f32::NAN);

        assert_eq!(store.param(ParamId::Peak1Gain), 24.0);
        assert!((store.param(ParamId::Peak1Q) - 0.1).abs() < 1e-6);
        assert_eq!(store.param(ParamId::LowCutFreq), 20.0);
        assert_eq!(store.get_choice(ParamId::LowCutSlope), 3);
        assert_eq!(store.param(ParamId::Peak3Gain), 0.0);
    }

    #[test]
    fn test_unknown_names() {
        let store = AtomicParameterStore::new();
        assert_eq!(store.get_float("Volume"), 0.0);
        assert_eq!(store.get_enum_index("Volume"), 0);
        assert!(matches!(store.try_get("Volume"), Err(EqError::UnknownParameter(_))));
        assert!(store.set("Volume", 1.0).is_err());
        assert!(store.set("Peak1Gain", 6.0).is_ok());
        assert_eq!(store.try_get("Peak1Gain").ok(), Some(6.0));
    }

    #[test]
    fn test_normalized_automation() {
        let store = AtomicParameterStore::new();
        store.set_normalized(ParamId::Peak1Gain, 0.75);
        assert_eq!(store.param(ParamId::Peak1Gain), 12.0);
        store.set_normalized(ParamId::HiCutSlope, 1.0);
        assert_eq!(store.get_choice(ParamId::HiCutSlope), 3);
        assert!((store.normalized(ParamId::Peak1Gain) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_roundtrip_through_store() {
        let mut settings = ChainSettings::default();
        settings.low_cut_freq = 120.0;
        settings.high_cut_slope = Slope::Db36;
        settings.peaks[1].gain_db = -6.5;
        settings.peaks[2].q = 2.5;

        let store = AtomicParameterStore::from_settings(&settings);
        assert_eq!(store.snapshot(), settings);

        store.reset_to_defaults();
        assert_eq!(store.snapshot(), ChainSettings::default());
    }

    #[test]
    fn test_concurrent_writer_and_reader() {
        let store = Arc::new(AtomicParameterStore::new());
        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..1000 {
                    store.set_param(ParamId::Peak1Gain, (i % 49) as f32 - 24.0);
                }
            })
        };

        for _ in 0..1000 {
            let gain = store.snapshot().peaks[0].gain_db;
            assert!((-24.0..=24.0).contains(&gain));
        }
        writer.join().unwrap();
    }
}
