//! Envelope-follower dynamics processors.
//!
//! | Processor | Attack | Knee | Gain smoothing |
//! |-----------|--------|------|----------------|
//! | [`Compressor`] | one-pole, `attack_ms` | hard or soft (quadratic) | attack on fall, release on rise |
//! | [`Limiter`] | instant | hard | instant fall, release on rise |
//!
//! Both share the same two-sample peak detector and report their current gain
//! reduction in dB (0.0 = untouched, negative = reducing).

pub mod compressor;
pub mod limiter;

pub use compressor::Compressor;
pub use limiter::Limiter;

/// Lowest linear gain a dynamics stage will apply (−60 dB).
pub const MIN_GAIN: f32 = 0.001;

/// Detector and gain state shared by the compressor and limiter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicsState {
    /// Smoothed detector level in dB.
    pub envelope: f32,
    /// Smoothed linear gain, 1.0 = no reduction.
    pub gain: f32,
    /// Magnitude of the previous input sample.
    pub prev_sample: f32,
}

impl DynamicsState {
    pub const fn new() -> Self {
        DynamicsState {
            envelope: 0.0,
            gain: 1.0,
            prev_sample: 0.0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Peak of the current and previous sample magnitudes.
    #[inline(always)]
    pub fn detect_peak(&mut self, input: f32) -> f32 {
        let magnitude = libm::fabsf(input);
        let peak = if magnitude > self.prev_sample {
            magnitude
        } else {
            self.prev_sample
        };
        self.prev_sample = magnitude;
        peak
    }
}

impl Default for DynamicsState {
    fn default() -> Self {
        Self::new()
    }
}
