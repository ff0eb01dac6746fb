//! Brick-wall peak limiter with single-sample attack.

use super::{DynamicsState, MIN_GAIN};
use crate::dsp::math::{db_to_linear, linear_to_db, time_constant_coef};
use crate::processor::SampleProcessor;
use crate::settings::{Adjustments, LimiterSettings};

/// Per-band limiter (one channel).
///
/// The detector envelope jumps up to any new peak and decays with the release
/// time. Gain drops are applied on the same sample, so the output never
/// exceeds the threshold.
#[derive(Debug, Clone, Copy)]
pub struct Limiter {
    params: LimiterSettings,
    state: DynamicsState,
    release_coef: f32,
    sample_rate: f32,
}

impl Limiter {
    pub fn new(sample_rate: f32) -> Self {
        let mut lim = Self::unconfigured(sample_rate);
        lim.update_coefficients();
        lim
    }

    /// `const` counterpart of [`new`](Self::new); the release coefficient is
    /// computed by the first [`set_params`](Self::set_params).
    pub const fn unconfigured(sample_rate: f32) -> Self {
        Limiter {
            params: LimiterSettings::new(),
            state: DynamicsState::new(),
            release_coef: 0.0,
            sample_rate,
        }
    }

    /// Replace the parameters (clamped). Switching the limiter off clears its
    /// detector state.
    pub fn set_params(&mut self, params: &LimiterSettings) -> Adjustments {
        let mut p = *params;
        let adj = p.sanitize();
        if self.params.enabled && !p.enabled {
            self.state.reset();
        }
        self.params = p;
        self.update_coefficients();
        adj
    }

    pub fn params(&self) -> &LimiterSettings {
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
        self.release_coef = time_constant_coef(self.params.release_ms, self.sample_rate);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        if !self.params.enabled {
            return input;
        }

        let level = linear_to_db(self.state.detect_peak(input));
        self.state.envelope = if level > self.state.envelope {
            level
        } else {
            self.release_coef * self.state.envelope + (1.0 - self.release_coef) * level
        };

        let target = if self.state.envelope > self.params.threshold_db {
            let g = db_to_linear(self.params.threshold_db - self.state.envelope);
            if g < MIN_GAIN {
                MIN_GAIN
            } else {
                g
            }
        } else {
            1.0
        };

        self.state.gain = if target < self.state.gain {
            target
        } else {
            self.release_coef * self.state.gain + (1.0 - self.release_coef) * target
        };

        input * self.state.gain
    }
}

impl SampleProcessor for Limiter {
    #[inline]
    fn process_sample(&mut self, input: f32) -> f32 {
        self.process(input)
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}
