//! Decaying peak-hold meter.
//!
//! Updated once per block: the held value jumps to the block peak when that
//! is higher, otherwise it decays by [`PEAK_DECAY`]. Values are linear,
//! full scale = 1.0.

/// Per-block decay factor of the held peak.
pub const PEAK_DECAY: f32 = 0.8;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeakMeter {
    held: f32,
}

impl PeakMeter {
    pub const fn new() -> Self {
        PeakMeter { held: 0.0 }
    }

    /// Largest absolute value in `samples`.
    pub fn block_peak(samples: &[f32]) -> f32 {
        samples
            .iter()
            .fold(0.0f32, |acc, &s| {
                let a = libm::fabsf(s);
                if a > acc {
                    a
                } else {
                    acc
                }
            })
    }

    /// Fold one block's peak into the held value.
    #[inline]
    pub fn update(&mut self, block_peak: f32) {
        if block_peak > self.held {
            self.held = block_peak;
        } else {
            self.held *= PEAK_DECAY;
        }
    }

    /// Measure `samples` and update.
    pub fn update_block(&mut self, samples: &[f32]) {
        self.update(Self::block_peak(samples));
    }

    pub fn read(&self) -> f32 {
        self.held
    }

    pub fn reset(&mut self) {
        self.held = 0.0;
    }
}
