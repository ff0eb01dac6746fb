//! # crossover-dsp
//!
//! A `no_std`, allocation-free four-band stereo crossover for
//! microcontroller audio paths. One call per audio interrupt turns a block
//! of interleaved `i16` samples into a processed block:
//!
//! ```text
//! i16 → f32 → 4-band split → per band: meter, compressor, limiter,
//!       delay/polarity → sum → f32 → i16
//! ```
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Config | [`constants`] / [`settings`] | Block size, limits, `SystemSettings` |
//! | Trait | [`processor`] | `SampleProcessor` for per-sample stages |
//! | DSP | [`dsp`] | Biquads, crossover bank, dynamics, delay, meters |
//! | I/O | [`io`] | `AudioBuffer`, format conversion, settings mailbox |
//! | Pipeline | [`pipeline`] | `AudioProcessor` block orchestration and stats |
//! | Presets | [`presets`] | Factory tunings (feature-gated) |
//!
//! ## Quick start
//!
//! ```ignore
//! use cortex_m::singleton;
//! use crossover_dsp::io::{AudioBuffer, SettingsMailbox};
//! use crossover_dsp::pipeline::{AudioProcessor, NullClock};
//! use crossover_dsp::presets::FactoryPreset;
//!
//! static SETTINGS: SettingsMailbox = SettingsMailbox::new();
//!
//! // Built at compile time, configured in place at start-up:
//! let dsp: &mut AudioProcessor = singleton!(
//!     : AudioProcessor = AudioProcessor::unconfigured(48_000.0, NullClock)
//! ).unwrap();
//! dsp.init();
//!
//! // Control context (menu, preset loader):
//! SETTINGS.publish(FactoryPreset::Rock.settings());
//!
//! // Audio interrupt:
//! dsp.sync_settings(&SETTINGS);
//! dsp.process(&rx_block, &mut tx_block);
//! let stats = dsp.stats();
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `presets` | yes | [`presets::FactoryPreset`] tables |
//!
//! ## Audio parameters
//!
//! - **Block size:** 128 stereo frames ([`constants::AUDIO_BLOCK_FRAMES`])
//! - **Sample rate:** 48 kHz nominal ([`constants::SAMPLE_RATE`])
//! - **Sample format:** interleaved `i16`, processed as `f32`
//! - **Band delay:** up to 100 ms ([`constants::MAX_DELAY_MS`]), stored as Q15

#![no_std]

pub mod constants;
pub mod error;
pub mod processor;
pub mod settings;
pub mod dsp;
pub mod io;
pub mod pipeline;

#[cfg(feature = "presets")]
pub mod presets;

pub use error::Error;
pub use pipeline::{AudioProcessingStats, AudioProcessor, Clock, NullClock};
pub use settings::SystemSettings;
