//! Four-band crossover filter bank (one channel).
//!
//! ```text
//!          ┌─ LP(c0) ─────────────────→ sub
//!          ├─ HP(c0) ─→ LP(c1) ───────→ low
//! input ───┤
//!          ├─ HP(c1) ─→ LP(c2) ───────→ mid
//!          └─ HP(c2) ─────────────────→ high
//! ```
//!
//! Every leg is a [`FilterChain`] of `order / 2` biquads. Band-pass legs run
//! the high-pass first. Band gain and mute are applied here; `mixed` is the
//! sum of the four gained bands.

use super::biquad::FilterKind;
use super::chain::FilterChain;
use super::math::{clamp, db_to_linear};
use crate::constants::NUM_BANDS;
use crate::processor::SampleProcessor;
use crate::settings::{
    sanitize_cutoffs, Adjustments, Band, CrossoverSettings, FilterOrder, FilterType,
    MAX_BAND_GAIN_DB, MIN_BAND_GAIN_DB,
};

/// Output of one crossover step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandSamples {
    pub sub: f32,
    pub low: f32,
    pub mid: f32,
    pub high: f32,
    /// Sum of the four bands.
    pub mixed: f32,
}

impl BandSamples {
    /// Band samples indexed by [`Band::index`].
    #[inline]
    pub fn bands(&self) -> [f32; NUM_BANDS] {
        [self.sub, self.low, self.mid, self.high]
    }

    pub fn band(&self, band: Band) -> f32 {
        match band {
            Band::Sub => self.sub,
            Band::Low => self.low,
            Band::Mid => self.mid,
            Band::High => self.high,
        }
    }
}

/// Six filter legs plus per-band gain and mute.
pub struct CrossoverFilterBank {
    sub_low_pass: FilterChain,
    low_high_pass: FilterChain,
    low_low_pass: FilterChain,
    mid_high_pass: FilterChain,
    mid_low_pass: FilterChain,
    high_high_pass: FilterChain,
    settings: CrossoverSettings,
    /// Effective linear gain per band, 0.0 when muted.
    gains: [f32; NUM_BANDS],
    sample_rate: f32,
}

impl CrossoverFilterBank {
    /// Create a bank configured with [`CrossoverSettings::default`].
    pub fn new(sample_rate: f32) -> Self {
        let mut bank = Self::unconfigured(sample_rate);
        bank.set_settings(&CrossoverSettings::new());
        bank
    }

    /// A bank whose legs are still empty pass-through chains. Usable in
    /// `const` context; call [`set_settings`](Self::set_settings) before
    /// processing.
    pub const fn unconfigured(sample_rate: f32) -> Self {
        CrossoverFilterBank {
            sub_low_pass: FilterChain::new(FilterKind::LowPass),
            low_high_pass: FilterChain::new(FilterKind::HighPass),
            low_low_pass: FilterChain::new(FilterKind::LowPass),
            mid_high_pass: FilterChain::new(FilterKind::HighPass),
            mid_low_pass: FilterChain::new(FilterKind::LowPass),
            high_high_pass: FilterChain::new(FilterKind::HighPass),
            settings: CrossoverSettings::new(),
            gains: [1.0; NUM_BANDS],
            sample_rate,
        }
    }

    /// Apply a complete configuration. Cutoffs and gains are clamped first.
    /// Filter history is preserved.
    pub fn set_settings(&mut self, settings: &CrossoverSettings) -> Adjustments {
        let mut sanitized = *settings;
        let adj = sanitized.sanitize(self.sample_rate);
        self.settings = sanitized;
        self.update_gains();
        self.update_filters();
        tracing::debug!(
            "crossover: cutoffs {:?} Hz, {:?} order {}",
            self.settings.cutoffs,
            self.settings.filter_type,
            self.settings.filter_order as u8
        );
        adj
    }

    /// Last applied (sanitised) configuration.
    pub fn settings(&self) -> &CrossoverSettings {
        &self.settings
    }

    /// Move one crossover point (`0` = sub/low, `1` = low/mid, `2` = mid/high).
    pub fn set_cutoff(&mut self, index: usize, hz: f32) -> Adjustments {
        let mut next = self.settings;
        match next.cutoffs.get_mut(index) {
            Some(c) => *c = hz,
            None => {
                tracing::warn!("crossover point {} does not exist", index);
                return Adjustments::NONE;
            }
        }
        let adj = sanitize_cutoffs(&mut next.cutoffs, self.sample_rate);
        self.settings.cutoffs = next.cutoffs;
        self.update_filters();
        adj
    }

    pub fn set_gain_db(&mut self, band: Band, db: f32) -> Adjustments {
        let clamped = clamp(db, MIN_BAND_GAIN_DB, MAX_BAND_GAIN_DB);
        self.settings.gains_db[band.index()] = clamped;
        self.update_gains();
        if clamped != db {
            tracing::warn!("{} gain {} dB clamped to {} dB", band, db, clamped);
            Adjustments::BAND_GAIN
        } else {
            Adjustments::NONE
        }
    }

    pub fn set_mute(&mut self, band: Band, muted: bool) {
        self.settings.mutes[band.index()] = muted;
        self.update_gains();
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.settings.filter_type = filter_type;
        self.update_filters();
    }

    pub fn set_filter_order(&mut self, order: FilterOrder) {
        self.settings.filter_order = order;
        self.update_filters();
    }

    /// Change the sample rate and redesign every leg. Cutoffs are re-clamped
    /// against the new Nyquist limit.
    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Adjustments {
        self.sample_rate = sample_rate;
        let adj = sanitize_cutoffs(&mut self.settings.cutoffs, sample_rate);
        self.update_filters();
        adj
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Effective linear gain of `band` (0.0 when muted).
    pub fn gain(&self, band: Band) -> f32 {
        self.gains[band.index()]
    }

    pub fn is_muted(&self, band: Band) -> bool {
        self.settings.mutes[band.index()]
    }

    /// Split one sample into four bands.
    #[inline]
    pub fn process(&mut self, input: f32) -> BandSamples {
        let sub = self.sub_low_pass.process(input) * self.gains[0];
        let low = self.low_low_pass.process(self.low_high_pass.process(input)) * self.gains[1];
        let mid = self.mid_low_pass.process(self.mid_high_pass.process(input)) * self.gains[2];
        let high = self.high_high_pass.process(input) * self.gains[3];
        BandSamples {
            sub,
            low,
            mid,
            high,
            mixed: sub + low + mid + high,
        }
    }

    /// Split a block. Processes `min(input.len(), output.len())` samples.
    pub fn process_block(&mut self, input: &[f32], output: &mut [BandSamples]) {
        for (x, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process(*x);
        }
    }

    /// Zero every biquad's history. Settings are kept.
    pub fn reset(&mut self) {
        for chain in self.chains_mut() {
            chain.reset();
        }
    }

    fn chains_mut(&mut self) -> [&mut FilterChain; 6] {
        [
            &mut self.sub_low_pass,
            &mut self.low_high_pass,
            &mut self.low_low_pass,
            &mut self.mid_high_pass,
            &mut self.mid_low_pass,
            &mut self.high_high_pass,
        ]
    }

    fn update_gains(&mut self) {
        for band in Band::ALL {
            let i = band.index();
            self.gains[i] = if self.settings.mutes[i] {
                0.0
            } else {
                db_to_linear(self.settings.gains_db[i])
            };
        }
    }

    fn update_filters(&mut self) {
        let [c0, c1, c2] = self.settings.cutoffs;
        let ft = self.settings.filter_type;
        let order = self.settings.filter_order;
        let fs = self.sample_rate;

        self.sub_low_pass.configure(c0, ft, order, fs);
        self.low_high_pass.configure(c0, ft, order, fs);
        self.low_low_pass.configure(c1, ft, order, fs);
        self.mid_high_pass.configure(c1, ft, order, fs);
        self.mid_low_pass.configure(c2, ft, order, fs);
        self.high_high_pass.configure(c2, ft, order, fs);
    }

    #[cfg(test)]
    fn chains(&self) -> [&FilterChain; 6] {
        [
            &self.sub_low_pass,
            &self.low_high_pass,
            &self.low_low_pass,
            &self.mid_high_pass,
            &self.mid_low_pass,
            &self.high_high_pass,
        ]
    }
}
