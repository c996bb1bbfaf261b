//! Update controller and host-facing processor
//!
//! At the top of every block `ParametricEq` polls the parameter store,
//! designs fresh coefficients for all five units and loads them into both
//! channel chains, then runs the block. Recomputation is unconditional:
//! designing five filters is negligible next to a block of audio.

use std::sync::Arc;

use peq_core::{
    ChainSettings, EqConfig, EqError, EqResult, PEAK_BAND_COUNT, ParameterStore, ProcessSpec,
    Sample, Slope,
};

use crate::Processor;
use crate::chain::ChainPair;
use crate::denormal::DenormalGuard;
use crate::design::{
    ButterworthSections, CutResponse, clamp_frequency, clamp_gain_db, clamp_q, db_to_gain,
    design_butterworth, design_peak,
};

/// Stereo parametric EQ driven by an external parameter store
pub struct ParametricEq<S: ParameterStore> {
    store: Arc<S>,
    config: EqConfig,
    chains: ChainPair,
    spec: ProcessSpec,
}

impl<S: ParameterStore> ParametricEq<S> {
    pub fn new(store: Arc<S>, config: EqConfig) -> Self {
        let mut eq = Self {
            store,
            config,
            chains: ChainPair::new(),
            spec: ProcessSpec::default(),
        };
        eq.update_filters();
        eq
    }

    /// Called by the host before playback and whenever the sample rate or
    /// maximum block size changes. Clears all filter state.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) -> EqResult<()> {
        if !(sample_rate > 0.0) || !sample_rate.is_finite() {
            return Err(EqError::InvalidSampleRate(sample_rate));
        }

        self.spec = ProcessSpec::new(sample_rate, max_block_size);
        self.chains.prepare(&self.spec);
        self.update_filters();

        log::info!(
            "ParametricEq: prepared at {} Hz, max block {} samples ({:.2}ms)",
            sample_rate,
            max_block_size,
            self.spec.block_ms()
        );
        log::debug!("ParametricEq: config {:?}", self.config);
        Ok(())
    }

    /// Process one host block in place.
    ///
    /// `buffer` is channel-major; channel 0 goes through the left chain and
    /// channel 1 through the right chain.
    pub fn process_block(&mut self, buffer: &mut [&mut [Sample]], num_samples: usize) {
        let _denormals = self.config.flush_denormals.then(DenormalGuard::new);

        self.update_filters();
        self.chains.process_buffer(buffer, num_samples);
    }

    /// Poll the store and reload every coefficient
    pub fn update_filters(&mut self) {
        let settings = ChainSettings::from_store(&*self.store);
        self.apply_settings(&settings);
    }

    /// Load coefficients for an explicit snapshot
    pub fn apply_settings(&mut self, settings: &ChainSettings) {
        self.update_peak_filters(settings);
        self.update_low_cut_filters(settings);
        self.update_high_cut_filters(settings);
    }

    fn update_peak_filters(&mut self, settings: &ChainSettings) {
        let sr = self.spec.sample_rate;
        for band in 0..PEAK_BAND_COUNT {
            let peak = &settings.peaks[band];
            let coeffs = design_peak(
                sr,
                clamp_frequency(peak.freq as f64, sr),
                clamp_q(peak.q as f64),
                db_to_gain(clamp_gain_db(peak.gain_db as f64)),
            );
            self.chains.set_peak_coeffs(band, coeffs);
        }
    }

    fn update_low_cut_filters(&mut self, settings: &ChainSettings) {
        let sections = self.design_cut(
            CutResponse::Highpass,
            settings.low_cut_freq,
            settings.low_cut_slope,
        );
        self.chains
            .configure_low_cut(&sections, settings.low_cut_slope, self.config.cut_sections);
    }

    fn update_high_cut_filters(&mut self, settings: &ChainSettings) {
        let sections = self.design_cut(
            CutResponse::Lowpass,
            settings.high_cut_freq,
            settings.high_cut_slope,
        );
        self.chains
            .configure_high_cut(&sections, settings.high_cut_slope, self.config.cut_sections);
    }

    fn design_cut(&self, response: CutResponse, freq: f32, slope: Slope) -> ButterworthSections {
        let sr = self.spec.sample_rate;
        let cutoff = clamp_frequency(freq as f64, sr);

        match design_butterworth(response, cutoff, sr, slope.order()) {
            Ok(sections) if sections.iter().all(|c| c.is_finite()) => sections,
            Ok(_) => {
                log::warn!("ParametricEq: non-finite {response:?} design at {cutoff} Hz, bypassing");
                ButterworthSections::bypass(slope.index() + 1)
            }
            Err(e) => {
                log::warn!("ParametricEq: {response:?} design failed ({e}), bypassing");
                ButterworthSections::bypass(slope.index() + 1)
            }
        }
    }

    #[inline]
    pub fn chains(&self) -> &ChainPair {
        &self.chains
    }

    #[inline]
    pub fn config(&self) -> &EqConfig {
        &self.config
    }

    #[inline]
    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.spec.sample_rate
    }

    #[inline]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Combined response of the current coefficients in dB.
    ///
    /// Reads the left chain; the right one is identical.
    pub fn magnitude_response_db(&self, freq: f64) -> f64 {
        let magnitude = self.chains.left().magnitude_at(freq);
        if magnitude > 0.0 {
            20.0 * magnitude.log10()
        } else {
            -144.0
        }
    }

    /// IIR tail is not reported to the host
    pub fn tail_length_seconds(&self) -> f64 {
        0.0
    }
}

impl<S: ParameterStore> Processor for ParametricEq<S> {
    fn reset(&mut self) {
        self.chains.reset();
    }
}
