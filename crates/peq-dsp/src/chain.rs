//! Channel chain and stereo chain pair
//!
//! Per channel: Low-Cut → Peak 1 → Peak 2 → Peak 3 → High-Cut, in series.
//! The pair runs two such chains with no cross-channel coupling; the update
//! controller always loads both with the same coefficient values.

use peq_core::{CutSectionPolicy, PEAK_BAND_COUNT, ProcessSpec, Sample, Slope};

use crate::biquad::{BiquadCoeffs, BiquadTDF2};
use crate::cascade::CutCascade;
use crate::design::ButterworthSections;
use crate::{MonoProcessor, Processor, StereoProcessor};

/// Fixed position of each unit in a channel chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPosition {
    LowCut,
    Peak1,
    Peak2,
    Peak3,
    HighCut,
}

impl ChainPosition {
    /// Processing order
    pub const ORDER: [ChainPosition; 5] = [
        ChainPosition::LowCut,
        ChainPosition::Peak1,
        ChainPosition::Peak2,
        ChainPosition::Peak3,
        ChainPosition::HighCut,
    ];

    /// Peak band index for the three bell positions
    pub fn peak_band(self) -> Option<usize> {
        match self {
            ChainPosition::Peak1 => Some(0),
            ChainPosition::Peak2 => Some(1),
            ChainPosition::Peak3 => Some(2),
            ChainPosition::LowCut | ChainPosition::HighCut => None,
        }
    }
}

// ============================================================================
// CHANNEL CHAIN
// ============================================================================

/// Single-channel signal path
#[derive(Debug, Clone)]
pub struct ChannelChain {
    low_cut: CutCascade,
    peaks: [BiquadTDF2; PEAK_BAND_COUNT],
    high_cut: CutCascade,
    spec: ProcessSpec,
}

impl ChannelChain {
    pub fn new() -> Self {
        Self {
            low_cut: CutCascade::new(),
            peaks: Default::default(),
            high_cut: CutCascade::new(),
            spec: ProcessSpec::default(),
        }
    }

    /// Zero every delay state and record the processing context.
    ///
    /// Must run before the first sample and after any sample rate change.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.spec = *spec;
        self.reset();
    }

    #[inline]
    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    #[inline]
    pub fn low_cut(&self) -> &CutCascade {
        &self.low_cut
    }

    #[inline]
    pub fn low_cut_mut(&mut self) -> &mut CutCascade {
        &mut self.low_cut
    }

    #[inline]
    pub fn high_cut(&self) -> &CutCascade {
        &self.high_cut
    }

    #[inline]
    pub fn high_cut_mut(&mut self) -> &mut CutCascade {
        &mut self.high_cut
    }

    /// Bell stage of `band` (0..3)
    #[inline]
    pub fn peak(&self, band: usize) -> Option<&BiquadTDF2> {
        self.peaks.get(band)
    }

    #[inline]
    pub fn set_peak_coeffs(&mut self, band: usize, coeffs: BiquadCoeffs) {
        if let Some(peak) = self.peaks.get_mut(band) {
            peak.set_coeffs(coeffs);
        }
    }

    /// Magnitude of one unit of the chain
    pub fn unit_magnitude_at(&self, position: ChainPosition, freq: f64) -> f64 {
        let sr = self.spec.sample_rate;
        match position {
            ChainPosition::LowCut => self.low_cut.magnitude_at(freq, sr),
            ChainPosition::HighCut => self.high_cut.magnitude_at(freq, sr),
            bell => bell
                .peak_band()
                .map_or(1.0, |band| self.peaks[band].coeffs().magnitude_at(freq, sr)),
        }
    }

    /// Magnitude of the whole chain at `freq`
    pub fn magnitude_at(&self, freq: f64) -> f64 {
        ChainPosition::ORDER
            .iter()
            .map(|&position| self.unit_magnitude_at(position, freq))
            .product()
    }
}

impl Default for ChannelChain {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for ChannelChain {
    fn reset(&mut self) {
        self.low_cut.reset();
        for peak in &mut self.peaks {
            peak.reset();
        }
        self.high_cut.reset();
    }
}

impl MonoProcessor for ChannelChain {
    #[inline]
    fn process_sample(&mut self, input: Sample) -> Sample {
        let mut out = self.low_cut.process_sample(input);
        for peak in &mut self.peaks {
            out = peak.process_sample(out);
        }
        self.high_cut.process_sample(out)
    }
}

// ============================================================================
// CHAIN PAIR
// ============================================================================

/// Left and right chains sharing one set of coefficients
#[derive(Debug, Clone, Default)]
pub struct ChainPair {
    left: ChannelChain,
    right: ChannelChain,
}

impl ChainPair {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.left.prepare(spec);
        self.right.prepare(spec);
    }

    #[inline]
    pub fn left(&self) -> &ChannelChain {
        &self.left
    }

    #[inline]
    pub fn right(&self) -> &ChannelChain {
        &self.right
    }

    pub fn set_peak_coeffs(&mut self, band: usize, coeffs: BiquadCoeffs) {
        self.left.set_peak_coeffs(band, coeffs);
        self.right.set_peak_coeffs(band, coeffs);
    }

    pub fn configure_low_cut(
        &mut self,
        sections: &ButterworthSections,
        slope: Slope,
        policy: CutSectionPolicy,
    ) {
        self.left.low_cut_mut().configure(sections, slope, policy);
        self.right.low_cut_mut().configure(sections, slope, policy);
    }

    pub fn configure_high_cut(
        &mut self,
        sections: &ButterworthSections,
        slope: Slope,
        policy: CutSectionPolicy,
    ) {
        self.left.high_cut_mut().configure(sections, slope, policy);
        self.right.high_cut_mut().configure(sections, slope, policy);
    }

    /// Process a channel-major buffer in place.
    ///
    /// Channel 0 runs through the left chain, channel 1 through the right
    /// chain. Further channels are left untouched. At most `num_samples`
    /// samples of each channel are processed.
    pub fn process_buffer(&mut self, buffer: &mut [&mut [Sample]], num_samples: usize) {
        let mut channels = buffer.iter_mut();

        if let Some(left) = channels.next() {
            let n = num_samples.min(left.len());
            self.left.process_block(&mut left[..n]);
        }
        if let Some(right) = channels.next() {
            let n = num_samples.min(right.len());
            self.right.process_block(&mut right[..n]);
        }
    }

    /// Both chains hold the same coefficients in every slot
    pub fn is_symmetric(&self) -> bool {
        let cut_matches = |l: &CutCascade, r: &CutCascade| {
            (0..crate::cascade::CASCADE_SLOTS)
                .all(|i| l.coeffs(i) == r.coeffs(i) && l.is_bypassed(i) == r.is_bypassed(i))
        };
        let peaks_match = (0..PEAK_BAND_COUNT).all(|band| {
            self.left.peak(band).map(BiquadTDF2::coeffs)
                == self.right.peak(band).map(BiquadTDF2::coeffs)
        });

        cut_matches(self.left.low_cut(), self.right.low_cut())
            && peaks_match
            && cut_matches(self.left.high_cut(), self.right.high_cut())
    }
}

impl Processor for ChainPair {
    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}

impl StereoProcessor for ChainPair {
    #[inline]
    fn process_sample(&mut self, left: Sample, right: Sample) -> (Sample, Sample) {
        (
            self.left.process_sample(left),
            self.right.process_sample(right),
        )
    }
}
