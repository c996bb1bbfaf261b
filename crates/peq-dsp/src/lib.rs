//! peq-dsp: Signal path of the parametric EQ
//!
//! ## Modules
//! - `biquad` - TDF-II biquad stage and coefficient set
//! - `design` - Peaking and high-order Butterworth coefficient design
//! - `cascade` - 4-slot cut filter cascade with runtime bypass mask
//! - `chain` - Per-channel chain (low cut → 3 peaks → high cut) and the stereo pair
//! - `processor` - Block-level update controller driven by a parameter store
//! - `denormal` - Scoped flush-to-zero guard for the audio callback

pub mod biquad;
pub mod cascade;
pub mod chain;
pub mod denormal;
pub mod design;
pub mod processor;

pub use biquad::{BiquadCoeffs, BiquadTDF2};
pub use cascade::CutCascade;
pub use chain::{ChainPair, ChainPosition, ChannelChain};
pub use design::{ButterworthSections, CutResponse};
pub use processor::ParametricEq;

use peq_core::Sample;

/// Trait for all DSP processors
pub trait Processor: Send + Sync {
    /// Reset processor state
    fn reset(&mut self);

    /// Get latency in samples
    fn latency(&self) -> usize {
        0
    }
}

/// Mono processor trait
pub trait MonoProcessor: Processor {
    /// Process a single sample
    fn process_sample(&mut self, input: Sample) -> Sample;

    /// Process a block of samples
    fn process_block(&mut self, buffer: &mut [Sample]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

/// Stereo processor trait
pub trait StereoProcessor: Processor {
    /// Process a stereo sample pair
    fn process_sample(&mut self, left: Sample, right: Sample) -> (Sample, Sample);

    /// Process stereo blocks
    fn process_block(&mut self, left: &mut [Sample], right: &mut [Sample]) {
        debug_assert_eq!(left.len(), right.len());
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.process_sample(*l, *r);
        }
    }
}
