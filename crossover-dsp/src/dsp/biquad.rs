//! Second-order IIR section (biquad).
//!
//! Coefficients follow the RBJ Audio-EQ-Cookbook low-pass/high-pass designs,
//! normalised so that `a0 = 1`. Processing uses Direct Form II with a single
//! two-sample history.

use core::f32::consts::PI;

use crate::processor::SampleProcessor;

/// Q of a critically tuned 2nd-order Butterworth section (1/√2). Linkwitz-Riley
/// legs are built from cascades of sections at this Q.
pub const BUTTERWORTH_Q: f32 = 0.70711;

/// Response of a single section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    HighPass,
}

/// Normalised biquad coefficients (`a0` implicitly 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Pass-through coefficients.
    pub const IDENTITY: Self = BiquadCoefficients {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Design a low-pass or high-pass section.
    ///
    /// `cutoff_hz` must lie in `(0, sample_rate / 2)`; the crossover bank clamps
    /// before calling this.
    pub fn design(cutoff_hz: f32, q: f32, kind: FilterKind, sample_rate: f32) -> Self {
        let omega = 2.0 * PI * cutoff_hz / sample_rate;
        let alpha = libm::sinf(omega) / (2.0 * q);
        let cosw = libm::cosf(omega);

        let (b0, b1, b2) = match kind {
            FilterKind::LowPass => ((1.0 - cosw) / 2.0, 1.0 - cosw, (1.0 - cosw) / 2.0),
            FilterKind::HighPass => ((1.0 + cosw) / 2.0, -(1.0 + cosw), (1.0 + cosw) / 2.0),
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cosw;
        let a2 = 1.0 - alpha;

        BiquadCoefficients {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Both poles strictly inside the unit circle (stability triangle).
    pub fn is_stable(&self) -> bool {
        libm::fabsf(self.a2) < 1.0 && libm::fabsf(self.a1) < 1.0 + self.a2
    }
}

/// One biquad section: coefficients plus Direct-Form-II history.
#[derive(Debug, Clone, Copy)]
pub struct BiquadSection {
    coefs: BiquadCoefficients,
    w1: f32,
    w2: f32,
}

impl BiquadSection {
    /// A pass-through section with cleared history.
    pub const fn new() -> Self {
        BiquadSection {
            coefs: BiquadCoefficients::IDENTITY,
            w1: 0.0,
            w2: 0.0,
        }
    }

    /// Recompute coefficients. History is left untouched.
    pub fn compute_coefficients(
        &mut self,
        cutoff_hz: f32,
        q: f32,
        kind: FilterKind,
        sample_rate: f32,
    ) {
        self.coefs = BiquadCoefficients::design(cutoff_hz, q, kind, sample_rate);
    }

    pub fn set_coefficients(&mut self, coefs: BiquadCoefficients) {
        self.coefs = coefs;
    }

    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coefs
    }

    /// Run one sample through the section.
    #[inline(always)]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coefs;
        let w = input - c.a1 * self.w1 - c.a2 * self.w2;
        let output = c.b0 * w + c.b1 * self.w1 + c.b2 * self.w2;
        self.w2 = self.w1;
        self.w1 = w;
        output
    }

    /// Whether the history is all zero.
    pub fn is_cleared(&self) -> bool {
        self.w1 == 0.0 && self.w2 == 0.0
    }
}

impl Default for BiquadSection {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleProcessor for BiquadSection {
    #[inline(always)]
    fn process_sample(&mut self, input: f32) -> f32 {
        self.process(input)
    }

    fn reset(&mut self) {
        self.w1 = 0.0;
        self.w2 = 0.0;
    }
}
