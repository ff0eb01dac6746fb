//! Signal-processing building blocks.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`math`] | dB conversion, time constants, clamping |
//! | [`biquad`] | RBJ low/high-pass biquad section |
//! | [`chain`] | Cascaded sections for one crossover leg |
//! | [`crossover`] | Four-band filter bank |
//! | [`dynamics`] | Compressor and limiter |
//! | [`delay`] | Fractional delay line with polarity |
//! | [`meter`] | Decaying peak meter |

pub mod math;
pub mod biquad;
pub mod chain;
pub mod crossover;
pub mod dynamics;
pub mod delay;
pub mod meter;

pub use biquad::{BiquadCoefficients, BiquadSection, FilterKind};
pub use chain::FilterChain;
pub use crossover::{BandSamples, CrossoverFilterBank};
pub use delay::DelayLine;
pub use dynamics::{Compressor, DynamicsState, Limiter};
pub use meter::PeakMeter;
