//! Biquad stage using Transposed Direct Form II
//!
//! TDF-II keeps two state variables per stage and behaves well in
//! floating point. Coefficients are plain values: a stage owns its copy and
//! the update controller replaces it wholesale once per block.

use peq_core::Sample;
use std::f64::consts::PI;

use crate::{MonoProcessor, Processor};

/// Biquad coefficients, normalized so that a0 == 1
///
/// H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Unity gain, no filtering
    pub const BYPASS: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Normalize raw cookbook taps by a0
    #[inline]
    pub fn from_raw(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    #[inline]
    pub fn bypass() -> Self {
        Self::BYPASS
    }

    #[inline]
    pub fn is_bypass(&self) -> bool {
        *self == Self::BYPASS
    }

    /// All five taps are finite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.b0.is_finite()
            && self.b1.is_finite()
            && self.b2.is_finite()
            && self.a1.is_finite()
            && self.a2.is_finite()
    }

    /// Poles strictly inside the unit circle (Jury criterion for 2nd order)
    pub fn is_stable(&self) -> bool {
        self.a2.abs() < 1.0 && self.a1.abs() < 1.0 + self.a2
    }

    /// Frequency response (magnitude, phase) at `freq`
    ///
    /// Evaluates H(z) at z = e^(jω), ω = 2πf/fs
    pub fn frequency_response(&self, freq: f64, sample_rate: f64) -> (f64, f64) {
        let omega = 2.0 * PI * freq / sample_rate;
        let (sin_w, cos_w) = omega.sin_cos();
        let (sin_2w, cos_2w) = (2.0 * omega).sin_cos();

        let num_real = self.b0 + self.b1 * cos_w + self.b2 * cos_2w;
        let num_imag = -self.b1 * sin_w - self.b2 * sin_2w;

        let den_real = 1.0 + self.a1 * cos_w + self.a2 * cos_2w;
        let den_imag = -self.a1 * sin_w - self.a2 * sin_2w;

        let den_mag_sq = den_real * den_real + den_imag * den_imag;

        let h_real = (num_real * den_real + num_imag * den_imag) / den_mag_sq;
        let h_imag = (num_imag * den_real - num_real * den_imag) / den_mag_sq;

        let magnitude = (h_real * h_real + h_imag * h_imag).sqrt();
        let phase = h_imag.atan2(h_real);

        (magnitude, phase)
    }

    #[inline]
    pub fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        self.frequency_response(freq, sample_rate).0
    }
}

impl Default for BiquadCoeffs {
    fn default() -> Self {
        Self::BYPASS
    }
}

/// Transposed Direct Form II biquad stage
#[derive(Debug, Clone, Default)]
pub struct BiquadTDF2 {
    coeffs: BiquadCoeffs,
    z1: f64,
    z2: f64,
}

impl BiquadTDF2 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coeffs(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Replace the coefficient set; delay state is kept
    #[inline]
    pub fn set_coeffs(&mut self, coeffs: BiquadCoeffs) {
        self.coeffs = coeffs;
    }

    #[inline]
    pub fn coeffs(&self) -> &BiquadCoeffs {
        &self.coeffs
    }

    #[inline]
    pub fn set_bypass(&mut self) {
        self.coeffs = BiquadCoeffs::BYPASS;
    }

    /// Delay state (z1, z2)
    #[inline]
    pub fn state(&self) -> (f64, f64) {
        (self.z1, self.z2)
    }
}

impl Processor for BiquadTDF2 {
    fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

impl MonoProcessor for BiquadTDF2 {
    #[inline(always)]
    fn process_sample(&mut self, input: Sample) -> Sample {
        let output = self.coeffs.b0 * input + self.z1;
        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;
        output
    }
}
