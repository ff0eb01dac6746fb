//! Statistics snapshot published by the audio pipeline.

use crate::constants::{NUM_BANDS, NUM_CHANNELS};
use crate::settings::{Band, Channel};

/// Metering and health counters, refreshed once per processed block.
///
/// Peaks are linear (1.0 = full scale) and decay by 0.8 per block.
/// Dynamics activity is the current gain reduction in dB (≤ 0), taking the
/// stronger of the two channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioProcessingStats {
    pub input_peak: [f32; NUM_CHANNELS],
    pub output_peak: [f32; NUM_CHANNELS],
    /// Indexed `[band][channel]`.
    pub band_peak: [[f32; NUM_CHANNELS]; NUM_BANDS],
    pub compression_db: [f32; NUM_BANDS],
    pub limiting_db: [f32; NUM_BANDS],
    /// Output samples clamped to the `i16` range since the last reset.
    pub clipping_count: u32,
    /// Wall time of the last block in microseconds.
    pub processing_time_us: u32,
    /// Blocks that took longer than one block period.
    pub deadline_misses: u32,
    pub blocks_processed: u32,
}

impl AudioProcessingStats {
    pub const fn new() -> Self {
        AudioProcessingStats {
            input_peak: [0.0; NUM_CHANNELS],
            output_peak: [0.0; NUM_CHANNELS],
            band_peak: [[0.0; NUM_CHANNELS]; NUM_BANDS],
            compression_db: [0.0; NUM_BANDS],
            limiting_db: [0.0; NUM_BANDS],
            clipping_count: 0,
            processing_time_us: 0,
            deadline_misses: 0,
            blocks_processed: 0,
        }
    }

    pub fn band_peak(&self, band: Band, channel: Channel) -> f32 {
        self.band_peak[band.index()][channel.index()]
    }

    /// Whether any band's compressor or limiter is currently reducing gain
    /// by more than `threshold_db` (a positive number).
    pub fn dynamics_active(&self, threshold_db: f32) -> bool {
        self.compression_db
            .iter()
            .chain(self.limiting_db.iter())
            .any(|&db| db < -threshold_db)
    }
}

impl Default for AudioProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}
