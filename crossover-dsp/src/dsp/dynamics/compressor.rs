//! Feed-forward peak compressor with optional soft knee.

use super::{DynamicsState, MIN_GAIN};
use crate::dsp::math::{db_to_linear, linear_to_db, time_constant_coef};
use crate::processor::SampleProcessor;
use crate::settings::{Adjustments, CompressorSettings};

/// Static gain curve: reduction in dB (≤ 0) for a detector `level_db`.
///
/// Below `threshold − W/2` nothing happens; inside the knee the reduction grows
/// quadratically and meets the `1/ratio` slope at `threshold + W/2`.
pub fn gain_computer_db(level_db: f32, threshold_db: f32, ratio: f32, knee_width_db: f32) -> f32 {
    let half_knee = knee_width_db * 0.5;
    let over = level_db - threshold_db;

    if knee_width_db > 0.0 && libm::fabsf(over) < half_knee {
        let x = over + half_knee;
        (1.0 / ratio - 1.0) * x * x / (2.0 * knee_width_db)
    } else if over <= 0.0 {
        0.0
    } else {
        (threshold_db - level_db) + over / ratio
    }
}

/// Per-band compressor (one channel).
#[derive(Debug, Clone, Copy)]
pub struct Compressor {
    params: CompressorSettings,
    state: DynamicsState,
    attack_coef: f32,
    release_coef: f32,
    makeup: f32,
    sample_rate: f32,
}

impl Compressor {
    pub fn new(sample_rate: f32) -> Self {
        let mut comp = Self::unconfigured(sample_rate);
        comp.update_coefficients();
        comp
    }

    /// Default parameters with time constants not yet computed. Usable in
    /// `const` context; [`set_params`](Self::set_params) finishes the setup.
    pub const fn unconfigured(sample_rate: f32) -> Self {
        Compressor {
            params: CompressorSettings::new(),
            state: DynamicsState::new(),
            attack_coef: 0.0,
            release_coef: 0.0,
            makeup: 1.0,
            sample_rate,
        }
    }

    /// Replace the parameters (clamped). Detector state is kept unless the
    /// compressor is being switched off.
    pub fn set_params(&mut self, params: &CompressorSettings) -> Adjustments {
        let mut p = *params;
        let adj = p.sanitize();
        if self.params.enabled && !p.enabled {
            self.state.reset();
        }
        self.params = p;
        self.update_coefficients();
        adj
    }

    pub fn params(&self) -> &CompressorSettings {
        &self.params
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coefficients();
    }

    pub fn state(&self) -> &DynamicsState {
        &self.state
    }

    /// Current smoothed gain reduction in dB (0.0 when idle or disabled).
    pub fn gain_reduction_db(&self) -> f32 {
        if !self.params.enabled {
            return 0.0;
        }
        linear_to_db(self.state.gain)
    }

    fn update_coefficients(&mut self) {
        self.attack_coef = time_constant_coef(self.params.attack_ms, self.sample_rate);
        self.release_coef = time_constant_coef(self.params.release_ms, self.sample_rate);
        self.makeup = db_to_linear(self.params.makeup_gain_db);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        if !self.params.enabled {
            return input;
        }

        let level = linear_to_db(self.state.detect_peak(input));

        let env_coef = if level > self.state.envelope {
            self.attack_coef
        } else {
            self.release_coef
        };
        self.state.envelope = env_coef * self.state.envelope + (1.0 - env_coef) * level;

        let reduction = gain_computer_db(
            self.state.envelope,
            self.params.threshold_db,
            self.params.ratio,
            self.params.knee_width_db,
        );
        let mut target = db_to_linear(reduction);
        if target < MIN_GAIN {
            target = MIN_GAIN;
        }

        let gain_coef = if target < self.state.gain {
            self.attack_coef
        } else {
            self.release_coef
        };
        self.state.gain = gain_coef * self.state.gain + (1.0 - gain_coef) * target;

        input * self.state.gain * self.makeup
    }
}

impl SampleProcessor for Compressor {
    #[inline]
    fn process_sample(&mut self, input: f32) -> f32 {
        self.process(input)
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}
