//! Filter design: coefficients from musical parameters
//!
//! Everything here is pure and allocation-free so it can run at the top of
//! every audio block.
//!
//! - Peaking (bell) filter from the Audio EQ Cookbook
//! - Butterworth lowpass/highpass of even order 2..=8, decomposed into
//!   cascaded second-order sections. Section `i` of an order-N design uses
//!   `Q = 1 / (2 cos((2i + 1) π / 2N))`; the bilinear transform is
//!   prewarped at the cutoff so every section (and their product) sits at
//!   its analog magnitude there.

use peq_core::{Decibels, EqError, EqResult};
use std::f64::consts::PI;
use std::ops::Index;

use crate::biquad::BiquadCoeffs;

/// Highest supported Butterworth order (48 dB/oct)
pub const MAX_ORDER: usize = 8;

/// Maximum number of second-order sections (MAX_ORDER / 2)
pub const MAX_SECTIONS: usize = MAX_ORDER / 2;

/// Lowest designable frequency
pub const MIN_FREQUENCY: f64 = 20.0;

/// Cutoffs are kept this fraction below Nyquist
const NYQUIST_GUARD: f64 = 0.98;

pub const MIN_Q: f64 = 0.1;
pub const MAX_Q: f64 = 10.0;
pub const DEFAULT_Q: f64 = 1.0;
pub const MAX_GAIN_DB: f64 = 24.0;

/// Direction of a cut filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutResponse {
    /// Used by the high cut
    Lowpass,
    /// Used by the low cut
    Highpass,
}

// ============================================================================
// DOMAIN CLAMPING
// ============================================================================

/// Clamp a frequency to [20 Hz, just below Nyquist]
///
/// NaN maps to the lower bound. At absurdly low sample rates the lower bound
/// follows the upper one down so the range never inverts.
pub fn clamp_frequency(freq: f64, sample_rate: f64) -> f64 {
    let upper = (sample_rate * 0.5 * NYQUIST_GUARD).max(0.0);
    let lower = MIN_FREQUENCY.min(upper);
    if freq.is_nan() {
        lower
    } else {
        freq.clamp(lower, upper)
    }
}

pub fn clamp_q(q: f64) -> f64 {
    if q.is_nan() { DEFAULT_Q } else { q.clamp(MIN_Q, MAX_Q) }
}

pub fn clamp_gain_db(gain_db: f64) -> f64 {
    if gain_db.is_nan() {
        0.0
    } else {
        gain_db.clamp(-MAX_GAIN_DB, MAX_GAIN_DB)
    }
}

#[inline]
pub fn db_to_gain(gain_db: f64) -> f64 {
    Decibels(gain_db).to_gain()
}

// ============================================================================
// PEAKING
// ============================================================================

/// Peaking EQ (bell) with linear gain `linear_gain = 10^(dB/20)`
///
/// `linear_gain == 1.0` yields b0 == 1, b1 == a1, b2 == a2: an exact
/// identity. Non-positive or non-finite results fall back to bypass.
pub fn design_peak(sample_rate: f64, center_freq: f64, q: f64, linear_gain: f64) -> BiquadCoeffs {
    if !(linear_gain > 0.0) || !linear_gain.is_finite() || !(q > 0.0) {
        return BiquadCoeffs::BYPASS;
    }

    let a = linear_gain.sqrt();
    let omega = 2.0 * PI * center_freq / sample_rate;
    let (sin_omega, cos_omega) = omega.sin_cos();
    let alpha = sin_omega / (2.0 * q);

    let coeffs = BiquadCoeffs::from_raw(
        1.0 + alpha * a,
        -2.0 * cos_omega,
        1.0 - alpha * a,
        1.0 + alpha / a,
        -2.0 * cos_omega,
        1.0 - alpha / a,
    );

    if coeffs.is_finite() {
        coeffs
    } else {
        BiquadCoeffs::BYPASS
    }
}

// ============================================================================
// SECOND ORDER LOWPASS / HIGHPASS
// ============================================================================

/// Second-order lowpass (bilinear, prewarped at `freq`)
pub fn lowpass(freq: f64, q: f64, sample_rate: f64) -> BiquadCoeffs {
    let omega = 2.0 * PI * freq / sample_rate;
    let (sin_omega, cos_omega) = omega.sin_cos();
    let alpha = sin_omega / (2.0 * q);

    BiquadCoeffs::from_raw(
        (1.0 - cos_omega) / 2.0,
        1.0 - cos_omega,
        (1.0 - cos_omega) / 2.0,
        1.0 + alpha,
        -2.0 * cos_omega,
        1.0 - alpha,
    )
}

/// Second-order highpass (bilinear, prewarped at `freq`)
pub fn highpass(freq: f64, q: f64, sample_rate: f64) -> BiquadCoeffs {
    let omega = 2.0 * PI * freq / sample_rate;
    let (sin_omega, cos_omega) = omega.sin_cos();
    let alpha = sin_omega / (2.0 * q);

    BiquadCoeffs::from_raw(
        (1.0 + cos_omega) / 2.0,
        -(1.0 + cos_omega),
        (1.0 + cos_omega) / 2.0,
        1.0 + alpha,
        -2.0 * cos_omega,
        1.0 - alpha,
    )
}

// ============================================================================
// BUTTERWORTH
// ============================================================================

/// Ordered second-order sections of a Butterworth design
///
/// Fixed capacity, lives on the stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButterworthSections {
    sections: [BiquadCoeffs; MAX_SECTIONS],
    len: usize,
}

impl ButterworthSections {
    /// `count` identity sections, the safe fallback when a design fails
    pub fn bypass(count: usize) -> Self {
        Self {
            sections: [BiquadCoeffs::BYPASS; MAX_SECTIONS],
            len: count.clamp(1, MAX_SECTIONS),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[BiquadCoeffs] {
        &self.sections[..self.len]
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&BiquadCoeffs> {
        self.as_slice().get(index)
    }

    #[inline]
    pub fn first(&self) -> Option<&BiquadCoeffs> {
        self.as_slice().first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BiquadCoeffs> {
        self.as_slice().iter()
    }

    /// Combined magnitude of all sections in series
    pub fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        self.iter().map(|c| c.magnitude_at(freq, sample_rate)).product()
    }
}

impl Index<usize> for ButterworthSections {
    type Output = BiquadCoeffs;

    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

/// Q of section `index` of an even `order` Butterworth filter
#[inline]
pub fn butterworth_q(order: usize, index: usize) -> f64 {
    1.0 / (2.0 * ((2.0 * index as f64 + 1.0) * PI / (2.0 * order as f64)).cos())
}

/// Design an even-order Butterworth lowpass or highpass as cascaded
/// second-order sections.
///
/// Rejects a non-positive / non-finite sample rate, an order that is odd,
/// zero or above 8, and a cutoff outside (0, Nyquist).
pub fn design_butterworth(
    response: CutResponse,
    cutoff_freq: f64,
    sample_rate: f64,
    order: usize,
) -> EqResult<ButterworthSections> {
    if !(sample_rate > 0.0) || !sample_rate.is_finite() {
        return Err(EqError::InvalidSampleRate(sample_rate));
    }
    if order == 0 || order % 2 != 0 || order > MAX_ORDER {
        return Err(EqError::InvalidOrder(order));
    }
    let nyquist = sample_rate * 0.5;
    if !(cutoff_freq > 0.0) || cutoff_freq >= nyquist {
        return Err(EqError::InvalidCutoff {
            freq: cutoff_freq,
            nyquist,
        });
    }

    let mut sections = [BiquadCoeffs::BYPASS; MAX_SECTIONS];
    let len = order / 2;
    for (i, section) in sections.iter_mut().take(len).enumerate() {
        let q = butterworth_q(order, i);
        *section = match response {
            CutResponse::Lowpass => lowpass(cutoff_freq, q, sample_rate),
            CutResponse::Highpass => highpass(cutoff_freq, q, sample_rate),
        };
    }

    Ok(ButterworthSections { sections, len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SR: f64 = 48000.0;

    #[test]
    fn test_peak_unity_gain_is_exact_identity() {
        for &freq in &[20.0, 440.0, 1000.0, 12000.0, 20000.0] {
            for &q in &[0.1, 0.707, 1.0, 4.0, 10.0] {
                let c = design_peak(SR, freq, q, 1.0);
                assert_eq!(c.b0, 1.0);
                assert_eq!(c.b1, c.a1);
                assert_eq!(c.b2, c.a2);
            }
        }
    }

    #[test]
    fn test_peak_gain_at_center() {
        for &gain_db in &[-24.0, -6.0, 3.0, 6.0, 24.0] {
            let c = design_peak(SR, 1000.0, 1.0, db_to_gain(gain_db));
            let mag_db = 20.0 * c.magnitude_at(1000.0, SR).log10();
            assert_relative_eq!(mag_db, gain_db, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_peak_gain_monotonic_at_center() {
        let mut last = 0.0;
        for step in 0..=48 {
            let gain_db = step as f64 * 0.5;
            let mag = design_peak(SR, 2500.0, 2.0, db_to_gain(gain_db)).magnitude_at(2500.0, SR);
            if step > 0 {
                assert!(mag > last, "gain {gain_db} dB did not raise magnitude");
            }
            last = mag;
        }
    }

    #[test]
    fn test_peak_degenerate_falls_back() {
        assert!(design_peak(SR, 1000.0, 1.0, 0.0).is_bypass());
        assert!(design_peak(SR, 1000.0, 0.0, 2.0).is_bypass());
        assert!(design_peak(SR, 1000.0, 1.0, f64::INFINITY).is_bypass());
        assert!(design_peak(0.0, 1000.0, 1.0, 2.0).is_bypass());
    }

    #[test]
    fn test_butterworth_qs() {
        assert_relative_eq!(butterworth_q(2, 0), std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(butterworth_q(4, 0), 0.5411961001461969, epsilon = 1e-12);
        assert_relative_eq!(butterworth_q(4, 1), 1.3065629648763764, epsilon = 1e-12);
        assert_relative_eq!(butterworth_q(8, 0), 0.5097955791041592, epsilon = 1e-9);
        assert_relative_eq!(butterworth_q(8, 3), 2.5629154477415055, epsilon = 1e-9);
    }

    #[test]
    fn test_butterworth_section_count() {
        for order in [2, 4, 6, 8] {
            let sections = design_butterworth(CutResponse::Highpass, 100.0, SR, order).unwrap();
            assert_eq!(sections.len(), order / 2);
            assert!(sections.iter().all(|c| c.is_finite() && c.is_stable()));
        }
    }

    #[test]
    fn test_butterworth_minus_3db_at_cutoff() {
        for response in [CutResponse::Lowpass, CutResponse::Highpass] {
            for order in [2, 4, 6, 8] {
                let sections = design_butterworth(response, 1000.0, SR, order).unwrap();
                assert_relative_eq!(
                    sections.magnitude_at(1000.0, SR),
                    std::f64::consts::FRAC_1_SQRT_2,
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn test_butterworth_passband_and_stopband() {
        let hp = design_butterworth(CutResponse::Highpass, 100.0, SR, 8).unwrap();
        assert_relative_eq!(hp.magnitude_at(5000.0, SR), 1.0, epsilon = 1e-3);
        // 8th order: ~48 dB per octave well below cutoff
        let ratio_db = 20.0 * (hp.magnitude_at(25.0, SR) / hp.magnitude_at(12.5, SR)).log10();
        assert_relative_eq!(ratio_db, 48.0, epsilon = 1.0);

        let lp = design_butterworth(CutResponse::Lowpass, 1000.0, SR, 2).unwrap();
        assert_relative_eq!(lp.magnitude_at(20.0, SR), 1.0, epsilon = 1e-3);
        assert!(lp.magnitude_at(8000.0, SR) < 0.02);
    }

    #[test]
    fn test_butterworth_rejects_bad_input() {
        assert!(matches!(
            design_butterworth(CutResponse::Highpass, 0.0, SR, 2),
            Err(EqError::InvalidCutoff { .. })
        ));
        assert!(matches!(
            design_butterworth(CutResponse::Highpass, -10.0, SR, 2),
            Err(EqError::InvalidCutoff { .. })
        ));
        assert!(matches!(
            design_butterworth(CutResponse::Lowpass, 24000.0, SR, 2),
            Err(EqError::InvalidCutoff { .. })
        ));
        assert!(matches!(
            design_butterworth(CutResponse::Lowpass, f64::NAN, SR, 2),
            Err(EqError::InvalidCutoff { .. })
        ));
        for order in [0, 3, 10] {
            assert!(matches!(
                design_butterworth(CutResponse::Lowpass, 1000.0, SR, order),
                Err(EqError::InvalidOrder(o)) if o == order
            ));
        }
        assert!(matches!(
            design_butterworth(CutResponse::Lowpass, 1000.0, 0.0, 2),
            Err(EqError::InvalidSampleRate(_))
        ));
    }

    #[test]
    fn test_clamping() {
        assert_eq!(clamp_frequency(5.0, SR), MIN_FREQUENCY);
        assert_eq!(clamp_frequency(f64::NAN, SR), MIN_FREQUENCY);
        assert!(clamp_frequency(30000.0, SR) < SR * 0.5);
        assert_eq!(clamp_frequency(1000.0, SR), 1000.0);
        // Degenerate rate never inverts the range
        assert!(clamp_frequency(1000.0, 10.0) <= 5.0);

        assert_eq!(clamp_q(0.0), MIN_Q);
        assert_eq!(clamp_q(50.0), MAX_Q);
        assert_eq!(clamp_q(f64::NAN), DEFAULT_Q);
        assert_eq!(clamp_gain_db(-40.0), -24.0);
        assert_eq!(clamp_gain_db(f64::NAN), 0.0);
    }

    #[test]
    fn test_bypass_sections() {
        let s = ButterworthSections::bypass(3);
        assert_eq!(s.len(), 3);
        assert!(s.iter().all(BiquadCoeffs::is_bypass));
        assert_eq!(ButterworthSections::bypass(0).len(), 1);
        assert_eq!(s[2], BiquadCoeffs::BYPASS);
        assert!(s.get(3).is_none());
    }
}
