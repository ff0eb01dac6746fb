//! Runtime configuration of the crossover/DSP chain.
//!
//! All settings are plain `Copy` values. They are produced by the control
//! context (menu, preset loader) and consumed by the audio context through
//! [`AudioProcessor::apply_settings`](crate::pipeline::AudioProcessor::apply_settings)
//! or a [`SettingsMailbox`](crate::io::mailbox::SettingsMailbox).
//!
//! Values out of range are never rejected; the `sanitize` methods clamp them
//! and report what changed as [`Adjustments`].
//!
//! | Parameter | Range |
//! |-----------|-------|
//! | Cutoff | 20 Hz .. 0.45·fs, neighbours ≥ 1.1× apart |
//! | Band gain | −60 .. +12 dB |
//! | Compressor threshold | −60 .. 0 dB |
//! | Compressor ratio | 1 .. 20 |
//! | Attack | 0 .. 500 ms |
//! | Release | 0 .. 5000 ms |
//! | Makeup gain | 0 .. 24 dB |
//! | Knee width | 0 .. 24 dB |
//! | Limiter threshold | −30 .. 0 dB |
//! | Band delay | 0 .. 100 ms |

use core::fmt;

use crate::constants::{MAX_DELAY_MS, NUM_BANDS};
use crate::dsp::math::clamp;
use crate::error::Error;

pub const MIN_CUTOFF_HZ: f32 = 20.0;
/// Highest cutoff as a fraction of the sample rate.
pub const MAX_CUTOFF_FRACTION: f32 = 0.45;
/// Minimum spacing between neighbouring cutoffs.
pub const MIN_CUTOFF_RATIO: f32 = 1.1;
const RATIO_SLACK: f32 = 1e-4;

pub const MIN_BAND_GAIN_DB: f32 = -60.0;
pub const MAX_BAND_GAIN_DB: f32 = 12.0;

pub const MIN_THRESHOLD_DB: f32 = -60.0;
pub const MIN_LIMITER_THRESHOLD_DB: f32 = -30.0;
pub const MAX_RATIO: f32 = 20.0;
pub const MAX_ATTACK_MS: f32 = 500.0;
pub const MAX_RELEASE_MS: f32 = 5000.0;
pub const MAX_MAKEUP_DB: f32 = 24.0;
pub const MAX_KNEE_DB: f32 = 24.0;

// ---------------------------------------------------------------------------
// Band / channel identifiers
// ---------------------------------------------------------------------------

/// One of the four crossover bands, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Sub,
    Low,
    Mid,
    High,
}

impl Band {
    pub const ALL: [Band; NUM_BANDS] = [Band::Sub, Band::Low, Band::Mid, Band::High];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Band::Sub => "sub",
            Band::Low => "low",
            Band::Mid => "mid",
            Band::High => "high",
        }
    }
}

impl TryFrom<u8> for Band {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Error> {
        Band::ALL
            .get(raw as usize)
            .copied()
            .ok_or(Error::InvalidBand(raw))
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stereo channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Left, Channel::Right];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Filter topology
// ---------------------------------------------------------------------------

/// Crossover filter family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Butterworth = 0,
    LinkwitzRiley = 1,
}

impl TryFrom<u8> for FilterType {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Error> {
        match raw {
            0 => Ok(FilterType::Butterworth),
            1 => Ok(FilterType::LinkwitzRiley),
            other => Err(Error::InvalidFilterType(other)),
        }
    }
}

/// Filter slope: 12, 24 or 48 dB/octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOrder {
    Second = 2,
    Fourth = 4,
    Eighth = 8,
}

impl FilterOrder {
    /// Number of biquad sections per filter leg.
    #[inline]
    pub const fn sections(self) -> usize {
        self as usize / 2
    }

    /// Decode a persisted order, falling back to 4th order when the value is
    /// not supported.
    pub fn from_raw(raw: u8) -> Self {
        match FilterOrder::try_from(raw) {
            Ok(order) => order,
            Err(_) => {
                tracing::warn!("unsupported filter order {}, using 4", raw);
                FilterOrder::Fourth
            }
        }
    }
}

impl TryFrom<u8> for FilterOrder {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Error> {
        match raw {
            2 => Ok(FilterOrder::Second),
            4 => Ok(FilterOrder::Fourth),
            8 => Ok(FilterOrder::Eighth),
            other => Err(Error::InvalidFilterOrder(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Adjustments
// ---------------------------------------------------------------------------

/// Set of fields that were clamped while sanitising a settings value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Adjustments(u16);

impl Adjustments {
    pub const NONE: Adjustments = Adjustments(0);
    pub const CUTOFF_RANGE: Adjustments = Adjustments(1 << 0);
    pub const CUTOFF_ORDER: Adjustments = Adjustments(1 << 1);
    pub const BAND_GAIN: Adjustments = Adjustments(1 << 2);
    pub const THRESHOLD: Adjustments = Adjustments(1 << 3);
    pub const RATIO: Adjustments = Adjustments(1 << 4);
    pub const TIMING: Adjustments = Adjustments(1 << 5);
    pub const MAKEUP: Adjustments = Adjustments(1 << 6);
    pub const KNEE: Adjustments = Adjustments(1 << 7);
    pub const DELAY: Adjustments = Adjustments(1 << 8);

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: Adjustments) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: Adjustments) {
        self.0 |= other.0;
    }

    #[inline]
    pub const fn union(self, other: Adjustments) -> Adjustments {
        Adjustments(self.0 | other.0)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl core::ops::BitOr for Adjustments {
    type Output = Adjustments;

    fn bitor(self, rhs: Adjustments) -> Adjustments {
        self.union(rhs)
    }
}

impl core::ops::BitOrAssign for Adjustments {
    fn bitor_assign(&mut self, rhs: Adjustments) {
        self.insert(rhs);
    }
}

/// Clamp `value` in place, recording `flag` when it changed.
fn clamp_field(value: &mut f32, low: f32, high: f32, flag: Adjustments, adj: &mut Adjustments) {
    let clamped = clamp(*value, low, high);
    if clamped != *value {
        *value = clamped;
        adj.insert(flag);
    }
}

// ---------------------------------------------------------------------------
// Crossover
// ---------------------------------------------------------------------------

/// Crossover configuration, gains in dB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossoverSettings {
    /// Sub/low, low/mid and mid/high crossover points in Hz.
    pub cutoffs: [f32; 3],
    pub gains_db: [f32; NUM_BANDS],
    pub mutes: [bool; NUM_BANDS],
    pub filter_type: FilterType,
    pub filter_order: FilterOrder,
}

impl CrossoverSettings {
    pub const fn new() -> Self {
        CrossoverSettings {
            cutoffs: [100.0, 1000.0, 8000.0],
            gains_db: [0.0; NUM_BANDS],
            mutes: [false; NUM_BANDS],
            filter_type: FilterType::LinkwitzRiley,
            filter_order: FilterOrder::Fourth,
        }
    }

    /// Clamp cutoffs and gains into range for `sample_rate`.
    pub fn sanitize(&mut self, sample_rate: f32) -> Adjustments {
        let mut adj = sanitize_cutoffs(&mut self.cutoffs, sample_rate);
        for gain in self.gains_db.iter_mut() {
            clamp_field(gain, MIN_BAND_GAIN_DB, MAX_BAND_GAIN_DB, Adjustments::BAND_GAIN, &mut adj);
        }
        adj
    }
}

impl Default for CrossoverSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp cutoffs into `[MIN_CUTOFF_HZ, MAX_CUTOFF_FRACTION·fs]` and enforce
/// ascending order with at least [`MIN_CUTOFF_RATIO`] between neighbours.
///
/// Ordering is fixed bottom-up. If that pushes the top cutoff past the
/// ceiling it is pinned there and the lower cutoffs are pushed down.
pub fn sanitize_cutoffs(cutoffs: &mut [f32; 3], sample_rate: f32) -> Adjustments {
    let ceiling = MAX_CUTOFF_FRACTION * sample_rate;
    let original = *cutoffs;
    let mut adj = Adjustments::NONE;

    for c in cutoffs.iter_mut() {
        clamp_field(c, MIN_CUTOFF_HZ, ceiling, Adjustments::CUTOFF_RANGE, &mut adj);
    }

    for i in 1..cutoffs.len() {
        // Slack keeps already-spaced cutoffs stable under rounding
        if cutoffs[i] < cutoffs[i - 1] * (MIN_CUTOFF_RATIO - RATIO_SLACK) {
            cutoffs[i] = cutoffs[i - 1] * MIN_CUTOFF_RATIO;
            adj.insert(Adjustments::CUTOFF_ORDER);
        }
    }

    let top = cutoffs.len() - 1;
    if cutoffs[top] > ceiling {
        cutoffs[top] = ceiling;
        for i in (0..top).rev() {
            let limit = cutoffs[i + 1] / MIN_CUTOFF_RATIO;
            if cutoffs[i] > limit {
                cutoffs[i] = limit;
            }
        }
    }

    if !adj.is_empty() {
        tracing::warn!(
            "crossover cutoffs {:?} adjusted to {:?} (fs {})",
            original,
            cutoffs,
            sample_rate
        );
    }
    adj
}

// ---------------------------------------------------------------------------
// Dynamics
// ---------------------------------------------------------------------------

/// Per-band compressor parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    pub threshold_db: f32,
    /// Input:output ratio above threshold, ≥ 1.
    pub ratio: f32,
    pub attack_ms: f32,
    pub release_ms: f32,
    pub makeup_gain_db: f32,
    /// Soft-knee width; 0 gives a hard knee.
    pub knee_width_db: f32,
    pub enabled: bool,
}

impl CompressorSettings {
    pub const fn new() -> Self {
        CompressorSettings {
            threshold_db: -20.0,
            ratio: 4.0,
            attack_ms: 5.0,
            release_ms: 100.0,
            makeup_gain_db: 0.0,
            knee_width_db: 3.0,
            enabled: false,
        }
    }

    pub fn sanitize(&mut self) -> Adjustments {
        let mut adj = Adjustments::NONE;
        clamp_field(&mut self.threshold_db, MIN_THRESHOLD_DB, 0.0, Adjustments::THRESHOLD, &mut adj);
        clamp_field(&mut self.ratio, 1.0, MAX_RATIO, Adjustments::RATIO, &mut adj);
        clamp_field(&mut self.attack_ms, 0.0, MAX_ATTACK_MS, Adjustments::TIMING, &mut adj);
        clamp_field(&mut self.release_ms, 0.0, MAX_RELEASE_MS, Adjustments::TIMING, &mut adj);
        clamp_field(&mut self.makeup_gain_db, 0.0, MAX_MAKEUP_DB, Adjustments::MAKEUP, &mut adj);
        clamp_field(&mut self.knee_width_db, 0.0, MAX_KNEE_DB, Adjustments::KNEE, &mut adj);
        adj
    }
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-band limiter parameters. Attack is a single sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimiterSettings {
    pub threshold_db: f32,
    pub release_ms: f32,
    pub enabled: bool,
}

impl LimiterSettings {
    pub const fn new() -> Self {
        LimiterSettings {
            threshold_db: 0.0,
            release_ms: 50.0,
            enabled: true,
        }
    }

    pub fn sanitize(&mut self) -> Adjustments {
        let mut adj = Adjustments::NONE;
        clamp_field(
            &mut self.threshold_db,
            MIN_LIMITER_THRESHOLD_DB,
            0.0,
            Adjustments::THRESHOLD,
            &mut adj,
        );
        clamp_field(&mut self.release_ms, 0.0, MAX_RELEASE_MS, Adjustments::TIMING, &mut adj);
        adj
    }
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Delay
// ---------------------------------------------------------------------------

/// Per-band time alignment and polarity. Both channels of a band share the
/// same values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelaySettings {
    pub delay_ms: [f32; NUM_BANDS],
    pub phase_invert: [bool; NUM_BANDS],
}

impl DelaySettings {
    pub const fn new() -> Self {
        DelaySettings {
            delay_ms: [0.0; NUM_BANDS],
            phase_invert: [false; NUM_BANDS],
        }
    }

    pub fn sanitize(&mut self) -> Adjustments {
        let mut adj = Adjustments::NONE;
        for d in self.delay_ms.iter_mut() {
            clamp_field(d, 0.0, MAX_DELAY_MS, Adjustments::DELAY, &mut adj);
        }
        adj
    }
}

impl Default for DelaySettings {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Complete configuration of the processing chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemSettings {
    pub crossover: CrossoverSettings,
    pub compressor: [CompressorSettings; NUM_BANDS],
    pub limiter: [LimiterSettings; NUM_BANDS],
    pub delay: DelaySettings,
}

impl SystemSettings {
    pub const fn new() -> Self {
        SystemSettings {
            crossover: CrossoverSettings::new(),
            compressor: [CompressorSettings::new(); NUM_BANDS],
            limiter: [LimiterSettings::new(); NUM_BANDS],
            delay: DelaySettings::new(),
        }
    }

    /// Clamp every field into range for `sample_rate`.
    pub fn sanitize(&mut self, sample_rate: f32) -> Adjustments {
        let mut adj = self.crossover.sanitize(sample_rate);
        for comp in self.compressor.iter_mut() {
            adj |= comp.sanitize();
        }
        for lim in self.limiter.iter_mut() {
            adj |= lim.sanitize();
        }
        adj |= self.delay.sanitize();
        adj
    }
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self::new()
    }
}
