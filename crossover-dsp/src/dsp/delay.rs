//! Multi-channel fractional delay line with polarity switch.
//!
//! All channels share one write index. Each channel keeps its own read index,
//! recomputed lazily after a delay change, so a new delay takes effect as a
//! jump at the start of the next frame.
//!
//! A fractional delay `D` blends the samples `⌊D⌋` and `⌊D⌋ + 1` frames back
//! with weights `1 − frac` and `frac`. Fractions below 0.001 read the
//! integer sample directly.
//!
//! Storage is Q15 (`i16`, full scale ±1.0), saturating on write. A channel
//! with zero delay hands its input straight through.

use crate::constants::{FULL_SCALE, MAX_DELAY_MS};
use crate::dsp::math::{clamp, ms_to_samples};
use crate::io::interleave::f32_to_i16;
use crate::settings::Adjustments;

/// Fractions below this are treated as an integer delay.
const FRACTION_EPSILON: f32 = 0.001;

/// `CH` channels of `CAP` samples each.
///
/// The longest usable delay is `CAP - 2` samples: one slot holds the sample
/// being written and one is interpolation headroom.
pub struct DelayLine<const CH: usize, const CAP: usize> {
    buffers: [[i16; CAP]; CH],
    write_index: usize,
    read_index: [usize; CH],
    delay_ms: [f32; CH],
    delay_samples: [f32; CH],
    phase_invert: [bool; CH],
    dirty: bool,
    sample_rate: f32,
}

impl<const CH: usize, const CAP: usize> DelayLine<CH, CAP> {
    /// Longest delay the storage can hold, in samples.
    pub const MAX_SAMPLES: usize = CAP - 2;

    pub const fn new(sample_rate: f32) -> Self {
        assert!(CAP >= 2, "delay line needs at least 2 slots");

        DelayLine {
            buffers: [[0; CAP]; CH],
            write_index: 0,
            read_index: [0; CH],
            delay_ms: [0.0; CH],
            delay_samples: [0.0; CH],
            phase_invert: [false; CH],
            dirty: false,
            sample_rate,
        }
    }

    /// Set the delay of `channel` in milliseconds, clamped to
    /// `[0, MAX_DELAY_MS]` and to the storage capacity at the current rate.
    pub fn set_delay_ms(&mut self, channel: usize, ms: f32) -> Adjustments {
        if channel >= CH {
            tracing::warn!("delay channel {} out of range", channel);
            return Adjustments::NONE;
        }
        let mut adj = Adjustments::NONE;
        let clamped = clamp(ms, 0.0, MAX_DELAY_MS);
        if clamped != ms {
            adj.insert(Adjustments::DELAY);
        }
        let samples = ms_to_samples(clamped, self.sample_rate);
        if samples > Self::MAX_SAMPLES as f32 {
            adj.insert(Adjustments::DELAY);
        }
        if !adj.is_empty() {
            tracing::warn!("delay {} ms on channel {} clamped", ms, channel);
        }
        self.delay_ms[channel] = clamped;
        self.store_samples(channel, samples);
        adj
    }

    /// Set the delay of `channel` directly in (fractional) samples.
    pub fn set_delay_samples(&mut self, channel: usize, samples: f32) {
        if channel >= CH {
            tracing::warn!("delay channel {} out of range", channel);
            return;
        }
        let samples = clamp(samples, 0.0, Self::MAX_SAMPLES as f32);
        self.delay_ms[channel] = samples * 1000.0 / self.sample_rate;
        self.store_samples(channel, samples);
    }

    fn store_samples(&mut self, channel: usize, samples: f32) {
        self.delay_samples[channel] = clamp(samples, 0.0, Self::MAX_SAMPLES as f32);
        self.dirty = true;
    }

    /// Configured delay of `channel` in ms (0.0 for an unknown channel).
    pub fn delay_ms(&self, channel: usize) -> f32 {
        self.delay_ms.get(channel).copied().unwrap_or(0.0)
    }

    pub fn delay_samples(&self, channel: usize) -> f32 {
        self.delay_samples.get(channel).copied().unwrap_or(0.0)
    }

    pub fn set_phase_invert(&mut self, channel: usize, invert: bool) {
        if let Some(flag) = self.phase_invert.get_mut(channel) {
            *flag = invert;
        }
    }

    pub fn phase_invert(&self, channel: usize) -> bool {
        self.phase_invert.get(channel).copied().unwrap_or(false)
    }

    /// Change the sample rate. Delays keep their value in milliseconds.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for ch in 0..CH {
            let samples = ms_to_samples(self.delay_ms[ch], sample_rate);
            self.store_samples(ch, samples);
        }
    }

    /// Clear stored audio and indices. Delays and polarity are kept.
    pub fn reset(&mut self) {
        for buf in self.buffers.iter_mut() {
            buf.fill(0);
        }
        self.write_index = 0;
        self.dirty = true;
    }

    fn update_read_indices(&mut self) {
        for ch in 0..CH {
            let whole = libm::floorf(self.delay_samples[ch]) as usize;
            self.read_index[ch] = (self.write_index + CAP - whole) % CAP;
        }
        self.dirty = false;
    }

    /// Push one frame (one sample per channel) and return the delayed frame.
    #[inline]
    pub fn process_frame(&mut self, input: [f32; CH]) -> [f32; CH] {
        if self.dirty {
            self.update_read_indices();
        }

        let mut output = [0.0f32; CH];
        for ch in 0..CH {
            let buf = &mut self.buffers[ch];
            buf[self.write_index] = f32_to_i16(input[ch]).0;

            let read = self.read_index[ch];
            let delay = self.delay_samples[ch];
            let frac = delay - libm::floorf(delay);

            let mut y = if delay == 0.0 {
                input[ch]
            } else if frac >= FRACTION_EPSILON {
                let older = if read == 0 { CAP - 1 } else { read - 1 };
                (buf[read] as f32 * (1.0 - frac) + buf[older] as f32 * frac) / FULL_SCALE
            } else {
                buf[read] as f32 / FULL_SCALE
            };
            if self.phase_invert[ch] {
                y = -y;
            }
            output[ch] = y;

            self.read_index[ch] = (read + 1) % CAP;
        }
        self.write_index = (self.write_index + 1) % CAP;

        output
    }
}
