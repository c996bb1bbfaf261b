//! Cut filter cascade
//!
//! Four biquad slots with a runtime bypass mask. The selected slope activates
//! slots `0..=slope.index()`; the remaining slots pass the signal through.
//! Active slots always form a contiguous prefix.

use peq_core::{CutSectionPolicy, Sample, Slope};

use crate::biquad::{BiquadCoeffs, BiquadTDF2};
use crate::design::ButterworthSections;
use crate::{MonoProcessor, Processor};

/// Number of biquad slots in a cascade (enough for 48 dB/oct)
pub const CASCADE_SLOTS: usize = 4;

/// Low cut or high cut filter of selectable slope
#[derive(Debug, Clone)]
pub struct CutCascade {
    stages: [BiquadTDF2; CASCADE_SLOTS],
    bypassed: [bool; CASCADE_SLOTS],
    slope: Slope,
}

impl CutCascade {
    /// All slots bypassed
    pub fn new() -> Self {
        Self {
            stages: Default::default(),
            bypassed: [true; CASCADE_SLOTS],
            slope: Slope::Db12,
        }
    }

    /// Load designed sections and select the active slots for `slope`.
    ///
    /// Every slot is bypassed first, then slots `0..=slope.index()` receive
    /// coefficients according to `policy` and are activated. A slot coming
    /// out of bypass starts from a cleared delay state.
    pub fn configure(
        &mut self,
        sections: &ButterworthSections,
        slope: Slope,
        policy: CutSectionPolicy,
    ) {
        let was_bypassed = self.bypassed;
        self.bypassed = [true; CASCADE_SLOTS];
        self.slope = slope;

        let Some(&first) = sections.first() else {
            return;
        };

        for slot in 0..=slope.index().min(CASCADE_SLOTS - 1) {
            let coeffs = match policy {
                CutSectionPolicy::RepeatFirst => first,
                CutSectionPolicy::Distinct => sections.get(slot).copied().unwrap_or(first),
            };

            let stage = &mut self.stages[slot];
            stage.set_coeffs(coeffs);
            if was_bypassed[slot] {
                stage.reset();
            }
            self.bypassed[slot] = false;
        }
    }

    /// Bypass every slot
    pub fn bypass_all(&mut self) {
        self.bypassed = [true; CASCADE_SLOTS];
    }

    #[inline]
    pub fn slope(&self) -> Slope {
        self.slope
    }

    #[inline]
    pub fn is_bypassed(&self, slot: usize) -> bool {
        self.bypassed.get(slot).copied().unwrap_or(true)
    }

    /// Number of active slots
    pub fn active_stages(&self) -> usize {
        self.bypassed.iter().filter(|&&b| !b).count()
    }

    #[inline]
    pub fn coeffs(&self, slot: usize) -> Option<&BiquadCoeffs> {
        self.stages.get(slot).map(BiquadTDF2::coeffs)
    }

    #[inline]
    pub fn stage(&self, slot: usize) -> Option<&BiquadTDF2> {
        self.stages.get(slot)
    }

    /// Combined magnitude of the active slots
    pub fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        self.stages
            .iter()
            .zip(self.bypassed.iter())
            .filter(|&(_, &bypassed)| !bypassed)
            .map(|(stage, _)| stage.coeffs().magnitude_at(freq, sample_rate))
            .product()
    }
}

impl Default for CutCascade {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for CutCascade {
    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

impl MonoProcessor for CutCascade {
    #[inline]
    fn process_sample(&mut self, input: Sample) -> Sample {
        let mut out = input;
        for (stage, &bypassed) in self.stages.iter_mut().zip(self.bypassed.iter()) {
            if !bypassed {
                out = stage.process_sample(out);
            }
        }
        out
    }
}
