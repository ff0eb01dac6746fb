//! Crate error type.
//!
//! The audio path itself never fails. Errors only arise when raw values coming
//! from outside the DSP core (persisted presets, menu indices) are converted
//! into typed settings.

use thiserror::Error;

/// Errors produced when decoding externally supplied configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Raw filter type is neither Butterworth (0) nor Linkwitz-Riley (1).
    #[error("unknown filter type {0}")]
    InvalidFilterType(u8),

    /// Raw filter order is not one of 2, 4 or 8.
    #[error("unsupported filter order {0}")]
    InvalidFilterOrder(u8),

    /// Band index outside `0..NUM_BANDS`.
    #[error("band index {0} out of range")]
    InvalidBand(u8),

    /// Factory preset index outside the preset table.
    #[error("factory preset index {0} out of range")]
    InvalidPreset(u8),
}
