//! Built-in tuning presets.
//!
//! | Preset | Cutoffs (Hz) | Character |
//! |--------|--------------|-----------|
//! | Flat | 80 / 500 / 4000 | No gain, compressors off |
//! | Rock | 90 / 600 / 3500 | Scooped mids, firm compression |
//! | Jazz | 70 / 450 / 5000 | Gentle, wide knees |
//! | Dangdut | 100 / 400 / 2800 | Forward sub and mids, fast compression |
//! | Pop | 85 / 450 / 3800 | Moderate lift top and bottom |
//!
//! All presets use 4th-order Linkwitz-Riley filters, no band delay and
//! normal polarity.

use core::fmt;

use crate::constants::NUM_BANDS;
use crate::error::Error;
use crate::settings::{
    CompressorSettings, CrossoverSettings, DelaySettings, FilterOrder, FilterType,
    LimiterSettings, SystemSettings,
};

/// Factory preset identifiers, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryPreset {
    Flat = 0,
    Rock = 1,
    Jazz = 2,
    Dangdut = 3,
    Pop = 4,
}

impl FactoryPreset {
    pub const ALL: [FactoryPreset; 5] = [
        FactoryPreset::Flat,
        FactoryPreset::Rock,
        FactoryPreset::Jazz,
        FactoryPreset::Dangdut,
        FactoryPreset::Pop,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            FactoryPreset::Flat => "Flat",
            FactoryPreset::Rock => "Rock",
            FactoryPreset::Jazz => "Jazz",
            FactoryPreset::Dangdut => "Dangdut",
            FactoryPreset::Pop => "Pop",
        }
    }

    /// Complete settings for this preset.
    pub const fn settings(self) -> SystemSettings {
        match self {
            FactoryPreset::Flat => SystemSettings {
                crossover: crossover([80.0, 500.0, 4000.0], [0.0, 0.0, 0.0, 0.0]),
                compressor: [comp(false, -24.0, 2.0, 20.0, 200.0, 0.0, 6.0); NUM_BANDS],
                limiter: [limiter(0.0, 50.0); NUM_BANDS],
                delay: DelaySettings::new(),
            },
            FactoryPreset::Rock => SystemSettings {
                crossover: crossover([90.0, 600.0, 3500.0], [3.0, 2.0, -1.0, 2.5]),
                compressor: [comp(true, -20.0, 3.0, 15.0, 150.0, 1.5, 4.0); NUM_BANDS],
                limiter: [limiter(-0.5, 45.0); NUM_BANDS],
                delay: DelaySettings::new(),
            },
            FactoryPreset::Jazz => SystemSettings {
                crossover: crossover([70.0, 450.0, 5000.0], [1.0, 1.5, 0.5, 0.0]),
                compressor: [comp(true, -18.0, 1.5, 25.0, 250.0, 0.5, 8.0); NUM_BANDS],
                limiter: [limiter(-1.0, 60.0); NUM_BANDS],
                delay: DelaySettings::new(),
            },
            FactoryPreset::Dangdut => SystemSettings {
                crossover: crossover([100.0, 400.0, 2800.0], [3.5, 1.0, 2.5, 2.0]),
                compressor: [comp(true, -22.0, 3.5, 10.0, 120.0, 2.0, 3.0); NUM_BANDS],
                limiter: [limiter(-0.5, 40.0); NUM_BANDS],
                delay: DelaySettings::new(),
            },
            FactoryPreset::Pop => SystemSettings {
                crossover: crossover([85.0, 450.0, 3800.0], [2.0, 1.0, 0.0, 1.5]),
                compressor: [comp(true, -18.0, 2.5, 15.0, 180.0, 1.0, 5.0); NUM_BANDS],
                limiter: [limiter(-0.5, 50.0); NUM_BANDS],
                delay: DelaySettings::new(),
            },
        }
    }
}

impl TryFrom<u8> for FactoryPreset {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Error> {
        FactoryPreset::ALL
            .get(raw as usize)
            .copied()
            .ok_or(Error::InvalidPreset(raw))
    }
}

impl fmt::Display for FactoryPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const fn crossover(cutoffs: [f32; 3], gains_db: [f32; NUM_BANDS]) -> CrossoverSettings {
    CrossoverSettings {
        cutoffs,
        gains_db,
        mutes: [false; NUM_BANDS],
        filter_type: FilterType::LinkwitzRiley,
        filter_order: FilterOrder::Fourth,
    }
}

const fn comp(
    enabled: bool,
    threshold_db: f32,
    ratio: f32,
    attack_ms: f32,
    release_ms: f32,
    makeup_gain_db: f32,
    knee_width_db: f32,
) -> CompressorSettings {
    CompressorSettings {
        threshold_db,
        ratio,
        attack_ms,
        release_ms,
        makeup_gain_db,
        knee_width_db,
        enabled,
    }
}

const fn limiter(threshold_db: f32, release_ms: f32) -> LimiterSettings {
    LimiterSettings {
        threshold_db,
        release_ms,
        enabled: true,
    }
}
