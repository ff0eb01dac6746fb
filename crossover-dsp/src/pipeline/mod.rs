//! Block pipeline: one [`AudioBuffer`] in, one out.
//!
//! ```text
//!            ┌─ sub ─→ meter → comp → lim → delay ─┐
//! i16 → f32 ─┼─ low ─→ meter → comp → lim → delay ─┼─→ Σ → f32 → i16
//!  (meter)   ├─ mid ─→ meter → comp → lim → delay ─┤  (meter) (clip count)
//!            └─ high → meter → comp → lim → delay ─┘
//! ```
//!
//! The processor owns every stage and all of its state. It is driven from
//! the audio interrupt with [`AudioProcessor::process`]; configuration arrives
//! either directly through [`AudioProcessor::apply_settings`] or from the
//! control context through a [`SettingsMailbox`](crate::io::SettingsMailbox)
//! drained by [`AudioProcessor::sync_settings`].
//!
//! Nothing in the block path allocates, blocks, logs or fails.

mod stats;

#[cfg(test)]
mod verification_tests;

pub use stats::AudioProcessingStats;

use crate::constants::{AUDIO_BLOCK_FRAMES, DELAY_LINE_CAPACITY, NUM_BANDS, NUM_CHANNELS};
use crate::dsp::crossover::CrossoverFilterBank;
use crate::dsp::delay::DelayLine;
use crate::dsp::dynamics::{Compressor, Limiter};
use crate::dsp::meter::PeakMeter;
use crate::io::interleave::{channel_peak, deinterleave_to_f32, interleave_from_f32};
use crate::io::{AudioBuffer, SettingsMailbox};
use crate::processor::SampleProcessor;
use crate::settings::{Adjustments, Band, SystemSettings};

/// Per-band delay line covering both channels.
pub type BandDelay = DelayLine<NUM_CHANNELS, DELAY_LINE_CAPACITY>;

/// Microsecond time source used to measure block processing time.
pub trait Clock {
    /// Free-running microsecond counter. Wrap-around is allowed.
    fn now_us(&mut self) -> u32;
}

/// Clock that always reads zero; processing time is reported as 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullClock;

impl Clock for NullClock {
    fn now_us(&mut self) -> u32 {
        0
    }
}

/// Four-band stereo crossover with per-band dynamics and alignment.
pub struct AudioProcessor<C: Clock = NullClock> {
    clock: C,
    sample_rate: f32,
    /// Block period in microseconds.
    budget_us: u32,
    bypass: bool,
    settings: SystemSettings,

    crossover: [CrossoverFilterBank; NUM_CHANNELS],
    compressors: [[Compressor; NUM_CHANNELS]; NUM_BANDS],
    limiters: [[Limiter; NUM_CHANNELS]; NUM_BANDS],
    delays: [BandDelay; NUM_BANDS],

    input_meters: [PeakMeter; NUM_CHANNELS],
    output_meters: [PeakMeter; NUM_CHANNELS],
    band_meters: [[PeakMeter; NUM_CHANNELS]; NUM_BANDS],
    stats: AudioProcessingStats,
}

impl<C: Clock> AudioProcessor<C> {
    /// Build a processor at `sample_rate` with [`SystemSettings::default`].
    ///
    /// The delay storage makes this a large value. On a microcontroller place
    /// an [`unconfigured`](Self::unconfigured) processor in a `static` and
    /// call [`init`](Self::init) on it instead of moving one through the stack.
    pub fn new(sample_rate: f32, clock: C) -> Self {
        let mut processor = Self::unconfigured(sample_rate, clock);
        processor.init();
        processor
    }

    /// Every stage allocated, nothing designed yet. Usable in `const`
    /// context; [`init`](Self::init) must run before the first block.
    pub const fn unconfigured(sample_rate: f32, clock: C) -> Self {
        AudioProcessor {
            clock,
            sample_rate,
            budget_us: 0,
            bypass: false,
            settings: SystemSettings::new(),
            crossover: [
                CrossoverFilterBank::unconfigured(sample_rate),
                CrossoverFilterBank::unconfigured(sample_rate),
            ],
            compressors: [[Compressor::unconfigured(sample_rate); NUM_CHANNELS]; NUM_BANDS],
            limiters: [[Limiter::unconfigured(sample_rate); NUM_CHANNELS]; NUM_BANDS],
            delays: [
                BandDelay::new(sample_rate),
                BandDelay::new(sample_rate),
                BandDelay::new(sample_rate),
                BandDelay::new(sample_rate),
            ],
            input_meters: [PeakMeter::new(); NUM_CHANNELS],
            output_meters: [PeakMeter::new(); NUM_CHANNELS],
            band_meters: [[PeakMeter::new(); NUM_CHANNELS]; NUM_BANDS],
            stats: AudioProcessingStats::new(),
        }
    }

    /// Design every stage for the current sample rate and apply
    /// [`SystemSettings::default`], in place.
    pub fn init(&mut self) {
        self.budget_us = block_budget_us(self.sample_rate);
        self.apply_settings(&SystemSettings::new());
        tracing::debug!(
            "audio processor ready: {} Hz, {} frames/block, budget {} us",
            self.sample_rate,
            AUDIO_BLOCK_FRAMES,
            self.budget_us
        );
    }

    /// Apply a complete configuration to every stage.
    ///
    /// Values are clamped first; the returned set says which kinds of field
    /// were adjusted. Filter, envelope and delay-line state is kept.
    pub fn apply_settings(&mut self, settings: &SystemSettings) -> Adjustments {
        let mut s = *settings;
        let adj = s.sanitize(self.sample_rate);
        if !adj.is_empty() {
            tracing::warn!("settings adjusted on apply ({:#06x})", adj.bits());
        }

        for bank in self.crossover.iter_mut() {
            bank.set_settings(&s.crossover);
        }
        for (band, (comps, lims)) in self
            .compressors
            .iter_mut()
            .zip(self.limiters.iter_mut())
            .enumerate()
        {
            for comp in comps.iter_mut() {
                comp.set_params(&s.compressor[band]);
            }
            for lim in lims.iter_mut() {
                lim.set_params(&s.limiter[band]);
            }
        }
        for (band, delay) in self.delays.iter_mut().enumerate() {
            for ch in 0..NUM_CHANNELS {
                delay.set_delay_ms(ch, s.delay.delay_ms[band]);
                delay.set_phase_invert(ch, s.delay.phase_invert[band]);
            }
        }

        self.settings = s;
        tracing::debug!("settings applied");
        adj
    }

    /// Last applied (sanitised) configuration.
    pub fn settings(&self) -> &SystemSettings {
        &self.settings
    }

    /// Apply the newest settings published to `mailbox`, if any. Call from
    /// the audio context before [`process`](Self::process).
    pub fn sync_settings(&mut self, mailbox: &SettingsMailbox) -> bool {
        match mailbox.take_latest() {
            Some(settings) => {
                self.apply_settings(&settings);
                true
            }
            None => false,
        }
    }

    /// Change the sample rate of every stage. Settings are re-applied so that
    /// cutoffs and delays are re-clamped for the new rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.budget_us = block_budget_us(sample_rate);
        for bank in self.crossover.iter_mut() {
            bank.set_sample_rate(sample_rate);
        }
        for comp in self.compressors.iter_mut().flatten() {
            comp.set_sample_rate(sample_rate);
        }
        for lim in self.limiters.iter_mut().flatten() {
            lim.set_sample_rate(sample_rate);
        }
        for delay in self.delays.iter_mut() {
            delay.set_sample_rate(sample_rate);
        }
        let settings = self.settings;
        self.apply_settings(&settings);
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// In bypass the input is copied to the output untouched. Meters keep
    /// running on the input signal.
    pub fn set_bypass(&mut self, bypass: bool) {
        if bypass != self.bypass {
            tracing::info!("bypass {}", if bypass { "on" } else { "off" });
        }
        self.bypass = bypass;
    }

    pub fn bypass(&self) -> bool {
        self.bypass
    }

    /// Snapshot of the metering and health counters.
    pub fn stats(&self) -> AudioProcessingStats {
        self.stats
    }

    /// Clear filters, envelopes, delay lines, meters and counters. Settings
    /// and bypass state are kept.
    pub fn reset(&mut self) {
        for bank in self.crossover.iter_mut() {
            bank.reset();
        }
        for comp in self.compressors.iter_mut().flatten() {
            comp.reset();
        }
        for lim in self.limiters.iter_mut().flatten() {
            lim.reset();
        }
        for delay in self.delays.iter_mut() {
            delay.reset();
        }
        for meter in self
            .input_meters
            .iter_mut()
            .chain(self.output_meters.iter_mut())
            .chain(self.band_meters.iter_mut().flatten())
        {
            meter.reset();
        }
        self.stats = AudioProcessingStats::new();
    }

    /// Process one block.
    pub fn process(&mut self, input: &AudioBuffer, output: &mut AudioBuffer) {
        let start = self.clock.now_us();

        if self.bypass {
            output.data = input.data;
            for ch in 0..NUM_CHANNELS {
                let peak = channel_peak(&input.data, ch);
                self.input_meters[ch].update(peak);
                self.output_meters[ch] = self.input_meters[ch];
            }
        } else {
            self.process_active(input, output);
        }

        let elapsed = self.clock.now_us().wrapping_sub(start);
        self.stats.processing_time_us = elapsed;
        if elapsed > self.budget_us {
            self.stats.deadline_misses = self.stats.deadline_misses.saturating_add(1);
        }
        self.stats.blocks_processed = self.stats.blocks_processed.wrapping_add(1);
        self.publish_meters();
    }

    fn process_active(&mut self, input: &AudioBuffer, output: &mut AudioBuffer) {
        let mut left = [0.0f32; AUDIO_BLOCK_FRAMES];
        let mut right = [0.0f32; AUDIO_BLOCK_FRAMES];
        deinterleave_to_f32(&input.data, &mut left, &mut right);

        self.input_meters[0].update_block(&left);
        self.input_meters[1].update_block(&right);

        let mut band_peaks = [[0.0f32; NUM_CHANNELS]; NUM_BANDS];

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let split = [
                self.crossover[0].process(*l).bands(),
                self.crossover[1].process(*r).bands(),
            ];

            let mut mix = [0.0f32; NUM_CHANNELS];
            for band in Band::ALL {
                let b = band.index();
                let mut frame = [0.0f32; NUM_CHANNELS];

                if !self.crossover[0].is_muted(band) {
                    for ch in 0..NUM_CHANNELS {
                        let x = split[ch][b];
                        let magnitude = libm::fabsf(x);
                        if magnitude > band_peaks[b][ch] {
                            band_peaks[b][ch] = magnitude;
                        }
                        let y = self.compressors[b][ch].process(x);
                        frame[ch] = self.limiters[b][ch].process(y);
                    }
                }

                let delayed = self.delays[b].process_frame(frame);
                mix[0] += delayed[0];
                mix[1] += delayed[1];
            }

            *l = mix[0];
            *r = mix[1];
        }

        for (meters, peaks) in self.band_meters.iter_mut().zip(band_peaks.iter()) {
            for (meter, &peak) in meters.iter_mut().zip(peaks.iter()) {
                meter.update(peak);
            }
        }
        self.output_meters[0].update_block(&left);
        self.output_meters[1].update_block(&right);

        let clipped = interleave_from_f32(&mut output.data, &left, &right);
        self.stats.clipping_count = self.stats.clipping_count.saturating_add(clipped);

        for b in 0..NUM_BANDS {
            let [c0, c1] = &self.compressors[b];
            let [l0, l1] = &self.limiters[b];
            self.stats.compression_db[b] = c0.gain_reduction_db().min(c1.gain_reduction_db());
            self.stats.limiting_db[b] = l0.gain_reduction_db().min(l1.gain_reduction_db());
        }
    }

    fn publish_meters(&mut self) {
        for ch in 0..NUM_CHANNELS {
            self.stats.input_peak[ch] = self.input_meters[ch].read();
            self.stats.output_peak[ch] = self.output_meters[ch].read();
            for b in 0..NUM_BANDS {
                self.stats.band_peak[b][ch] = self.band_meters[b][ch].read();
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn delay_line(&self, band: Band) -> &BandDelay {
        &self.delays[band.index()]
    }

    #[cfg(test)]
    pub(crate) fn crossover_bank(&self, channel: usize) -> &CrossoverFilterBank {
        &self.crossover[channel]
    }
}

/// Length of one block in microseconds at `sample_rate`.
fn block_budget_us(sample_rate: f32) -> u32 {
    (AUDIO_BLOCK_FRAMES as f32 * 1_000_000.0 / sample_rate) as u32
}
