//! End-to-end verification of the block pipeline.
//!
//! These tests drive [`AudioProcessor`] with synthetic `i16` blocks and check:
//!
//! - **Bypass:** bit-exact copy, meters still running
//! - **Transparency:** default chain reproduces steady sines within ±1 dB
//! - **Band routing:** band meters follow the crossover points
//! - **Dynamics:** compressor and limiter activity reach the statistics
//! - **Alignment:** band delay and polarity act on the summed output
//! - **Control:** mailbox sync, reset, clip and deadline counters
//! - **Footprint:** size budget and `const` construction

#[cfg(test)]
mod tests {
    use core::f32::consts::PI;

    use crate::constants::{AUDIO_BLOCK_FRAMES, SAMPLE_RATE};
    use crate::io::{AudioBuffer, SettingsMailbox};
    use crate::pipeline::{AudioProcessor, Clock, NullClock};
    use crate::settings::{Band, Channel, SystemSettings};

    /// Advances by a fixed step on every read.
    struct StepClock {
        now: u32,
        step: u32,
    }

    impl Clock for StepClock {
        fn now_us(&mut self) -> u32 {
            let t = self.now;
            self.now = self.now.wrapping_add(self.step);
            t
        }
    }

    fn processor() -> AudioProcessor<NullClock> {
        AudioProcessor::new(SAMPLE_RATE, NullClock)
    }

    /// Block `index` of a continuous stereo sine.
    fn sine_block(freq: f32, amp: f32, index: usize) -> AudioBuffer {
        AudioBuffer::from_fn(|i| {
            let n = index * AUDIO_BLOCK_FRAMES + i;
            let v = amp * libm::sinf(2.0 * PI * freq * n as f32 / SAMPLE_RATE);
            let s = (v * 32767.0) as i16;
            (s, s)
        })
    }

    fn peak_i16(buf: &AudioBuffer) -> i32 {
        buf.data.iter().map(|&s| (s as i32).abs()).max().unwrap_or(0)
    }

    /// Run `blocks` blocks of a sine and return (input, output) peaks of the
    /// last quarter.
    fn run_sine<C: Clock>(p: &mut AudioProcessor<C>, freq: f32, amp: f32, blocks: usize) -> (i32, i32) {
        let mut out = AudioBuffer::new();
        let mut in_peak = 0;
        let mut out_peak = 0;
        for b in 0..blocks {
            let input = sine_block(freq, amp, b);
            p.process(&input, &mut out);
            if b >= blocks - blocks / 4 {
                in_peak = in_peak.max(peak_i16(&input));
                out_peak = out_peak.max(peak_i16(&out));
            }
        }
        (in_peak, out_peak)
    }

    // ═══════════════════════════════════════════════════════════════════
    //  Bypass
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn verify_bypass_is_bit_exact() {
        let mut p = processor();
        p.set_bypass(true);
        assert!(p.bypass());

        let input = AudioBuffer::from_fn(|i| ((i as i16) * 250 - 16000, i16::MIN + i as i16));
        let mut out = AudioBuffer::new();
        p.process(&input, &mut out);

        assert_eq!(out, input);
        let stats = p.stats();
        assert!(stats.input_peak[0] > 0.4);
        assert!(stats.input_peak[1] > 0.99);
        assert_eq!(stats.output_peak, stats.input_peak);
        assert_eq!(stats.clipping_count, 0);
        assert_eq!(stats.blocks_processed, 1);
    }

    // ═══════════════════════════════════════════════════════════════════
    //  Transparency of the default chain
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn verify_default_chain_is_flat() {
        let mut p = processor();
        for &freq in &[60.0f32, 300.0, 3000.0, 12_000.0] {
            p.reset();
            let (inp, out) = run_sine(&mut p, freq, 0.5, 200);
            let ratio = out as f32 / inp as f32;
            assert!(
                ratio > 0.891 && ratio < 1.122,
                "{} Hz: in {} out {} ratio {}",
                freq,
                inp,
                out,
                ratio
            );
        }
        let stats = p.stats();
        assert_eq!(stats.clipping_count, 0);
        for b in 0..4 {
            assert_eq!(stats.compression_db[b], 0.0);
            assert!(stats.limiting_db[b] > -0.01);
        }
    }

    #[test]
    fn verify_silence_in_silence_out() {
        let mut p = processor();
        let input = AudioBuffer::new();
        let mut out = AudioBuffer::from_fn(|_| (123, -123));
        for _ in 0..10 {
            p.process(&input, &mut out);
            assert_eq!(out, AudioBuffer::new());
        }
        assert_eq!(p.stats().output_peak, [0.0, 0.0]);
    }

    // ═══════════════════════════════════════════════════════════════════
    //  Band routing (100 / 1000 / 8000 Hz, LR4)
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn verify_one_khz_splits_between_low_and_mid() {
        let mut p = processor();
        run_sine(&mut p, 1000.0, 0.5, 200);
        let s = p.stats();

        // Each band carries half the amplitude (−6 dB); the held meter may
        // sit anywhere between one decay step and the true peak.
        for band in [Band::Low, Band::Mid] {
            let v = s.band_peak(band, Channel::Left);
            assert!(v > 0.18 && v < 0.28, "{} band peak {}", band, v);
        }
        let sub = s.band_peak(Band::Sub, Channel::Left);
        let upper = s.band_peak(Band::Mid, Channel::Left) + s.band_peak(Band::High, Channel::Left);
        assert!(sub < upper * 0.063, "sub {} vs mid+high {}", sub, upper);
    }

    #[test]
    fn verify_muted_band_is_silent() {
        let mut p = processor();
        let mut s = SystemSettings::new();
        s.crossover.mutes[Band::Sub.index()] = true;
        p.apply_settings(&s);

        let (inp, out) = run_sine(&mut p, 40.0, 0.5, 200);
        assert!(out < inp / 20, "muted sub leaked: in {} out {}", inp, out);
        assert_eq!(p.stats().band_peak(Band::Sub, Channel::Right), 0.0);
    }

    // ═══════════════════════════════════════════════════════════════════
    //  Dynamics
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn verify_compressor_activity_reported() {
        let mut p = processor();
        let mut s = SystemSettings::new();
        s.compressor[0].enabled = true;
        s.compressor[0].threshold_db = -30.0;
        s.compressor[0].ratio = 8.0;
        p.apply_settings(&s);

        let (inp, out) = run_sine(&mut p, 50.0, 0.8, 200);
        let stats = p.stats();
        assert!(stats.compression_db[0] < -6.0, "sub compression {}", stats.compression_db[0]);
        assert_eq!(stats.compression_db[3], 0.0);
        assert!(out < inp / 2, "in {} out {}", inp, out);
        assert!(stats.dynamics_active(1.0));
    }

    #[test]
    fn verify_limiter_holds_band_ceiling() {
        let mut p = processor();
        let mut s = SystemSettings::new();
        s.limiter[2].threshold_db = -12.0;
        p.apply_settings(&s);

        // 3 kHz sits in the middle of the mid band
        let (_, out) = run_sine(&mut p, 3000.0, 0.9, 200);
        let stats = p.stats();
        assert!(stats.limiting_db[2] < -3.0, "mid limiting {}", stats.limiting_db[2]);

        // Mid output limited to −12 dBFS plus whatever the neighbours pass
        let ceiling = 32767.0 * 0.2512 * 1.25;
        assert!((out as f32) < ceiling, "output peak {} over {}", out, ceiling);
    }

    #[test]
    fn verify_disabled_stages_report_no_reduction() {
        let mut p = processor();
        let mut s = SystemSettings::new();
        s.compressor[0].enabled = true;
        s.compressor[0].threshold_db = -30.0;
        s.compressor[0].ratio = 8.0;
        // The compressed sub peaks around −26 dBFS
        s.limiter[0].threshold_db = -30.0;
        p.apply_settings(&s);

        run_sine(&mut p, 50.0, 0.8, 200);
        let active = p.stats();
        assert!(active.compression_db[0] < -6.0, "compression {}", active.compression_db[0]);
        assert!(active.limiting_db[0] < -1.0, "limiting {}", active.limiting_db[0]);

        s.compressor[0].enabled = false;
        s.limiter[0].enabled = false;
        p.apply_settings(&s);
        let mut out = AudioBuffer::new();
        p.process(&AudioBuffer::new(), &mut out);

        let stats = p.stats();
        assert_eq!(stats.compression_db[0], 0.0);
        assert_eq!(stats.limiting_db[0], 0.0);
        assert!(!stats.dynamics_active(0.01));
    }

    // ═══════════════════════════════════════════════════════════════════
    //  Delay and polarity
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn verify_band_delay_shifts_output() {
        let mut p = processor();
        let mut s = SystemSettings::new();
        s.delay.delay_ms = [1.0; 4]; // 48 samples
        p.apply_settings(&s);
        assert_eq!(p.delay_line(Band::Mid).delay_samples(0), 48.0);

        let impulse = AudioBuffer::from_fn(|i| if i == 0 { (16000, 16000) } else { (0, 0) });
        let mut out = AudioBuffer::new();
        p.process(&impulse, &mut out);

        for frame in 0..48 {
            assert_eq!(out.sample(frame, 0), 0, "early output at frame {}", frame);
        }
        let energy: i32 = (48..AUDIO_BLOCK_FRAMES)
            .map(|f| (out.sample(f, 0) as i32).abs())
            .sum();
        assert!(energy > 1000, "delayed impulse missing");
    }

    #[test]
    fn verify_phase_invert_negates_output() {
        let mut p = processor();
        let blocks: [AudioBuffer; 4] = core::array::from_fn(|b| sine_block(700.0, 0.3, b));

        let mut normal = [AudioBuffer::new(); 4];
        for (input, out) in blocks.iter().zip(normal.iter_mut()) {
            p.process(input, out);
        }

        let mut s = SystemSettings::new();
        s.delay.phase_invert = [true; 4];
        p.apply_settings(&s);
        p.reset();

        for (input, expected) in blocks.iter().zip(normal.iter()) {
            let mut out = AudioBuffer::new();
            p.process(input, &mut out);
            for (a, b) in out.data.iter().zip(expected.data.iter()) {
                assert_eq!(*a, -*b);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    //  Control surface
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn verify_mailbox_applies_newest_settings() {
        let mut p = processor();
        let mailbox = SettingsMailbox::new();
        assert!(!p.sync_settings(&mailbox));

        let mut first = SystemSettings::new();
        first.crossover.cutoffs = [80.0, 800.0, 6000.0];
        let mut second = SystemSettings::new();
        second.crossover.cutoffs = [120.0, 1200.0, 9000.0];
        second.crossover.gains_db[1] = 40.0; // clamped to +12

        mailbox.publish(first);
        mailbox.publish(second);
        assert!(p.sync_settings(&mailbox));

        let applied = p.settings();
        assert_eq!(applied.crossover.cutoffs, [120.0, 1200.0, 9000.0]);
        assert_eq!(applied.crossover.gains_db[1], 12.0);
        assert_eq!(p.crossover_bank(1).settings().cutoffs, [120.0, 1200.0, 9000.0]);
        assert!(!p.sync_settings(&mailbox));
    }

    #[test]
    fn verify_clipping_is_counted() {
        let mut p = processor();
        let mut s = SystemSettings::new();
        s.crossover.gains_db = [12.0; 4];
        for lim in s.limiter.iter_mut() {
            lim.enabled = false;
        }
        p.apply_settings(&s);

        run_sine(&mut p, 500.0, 0.9, 20);
        let clipped = p.stats().clipping_count;
        assert!(clipped > 0);

        p.reset();
        assert_eq!(p.stats().clipping_count, 0);
    }

    #[test]
    fn verify_processing_time_and_deadline_misses() {
        let mut p = AudioProcessor::new(SAMPLE_RATE, StepClock { now: 0, step: 150 });
        let input = AudioBuffer::new();
        let mut out = AudioBuffer::new();
        p.process(&input, &mut out);
        assert_eq!(p.stats().processing_time_us, 150);
        assert_eq!(p.stats().deadline_misses, 0);

        // One block at 48 kHz lasts 2666 us
        let mut slow = AudioProcessor::new(SAMPLE_RATE, StepClock { now: u32::MAX - 10, step: 3000 });
        slow.process(&input, &mut out);
        slow.process(&input, &mut out);
        let stats = slow.stats();
        assert_eq!(stats.processing_time_us, 3000);
        assert_eq!(stats.deadline_misses, 2);
        assert_eq!(stats.blocks_processed, 2);
    }

    #[test]
    fn verify_reset_clears_state_and_meters() {
        let mut p = processor();
        let mut s = SystemSettings::new();
        s.delay.delay_ms = [50.0; 4];
        s.compressor[1].enabled = true;
        p.apply_settings(&s);

        run_sine(&mut p, 200.0, 0.9, 40);
        assert!(p.stats().input_peak[0] > 0.5);

        p.reset();
        let stats = p.stats();
        assert_eq!(stats.input_peak, [0.0, 0.0]);
        assert_eq!(stats.blocks_processed, 0);
        assert_eq!(p.settings().delay.delay_ms, [50.0; 4]);

        // Delay lines were flushed: silence in, silence out
        let mut out = AudioBuffer::new();
        for _ in 0..30 {
            p.process(&AudioBuffer::new(), &mut out);
            assert_eq!(out, AudioBuffer::new());
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    //  Memory footprint
    // ═══════════════════════════════════════════════════════════════════

    /// Built at compile time; nothing runs on the stack.
    static IDLE: AudioProcessor<NullClock> = AudioProcessor::unconfigured(SAMPLE_RATE, NullClock);

    #[test]
    fn verify_processor_fits_mcu_ram() {
        // Leaves a quarter of a 128 KiB part to the rest of the firmware
        let size = core::mem::size_of::<AudioProcessor<NullClock>>();
        assert!(size < 96 * 1024, "processor is {} bytes", size);
    }

    #[test]
    fn verify_const_construction_then_init() {
        assert_eq!(IDLE.sample_rate(), SAMPLE_RATE);
        assert!(!IDLE.bypass());

        let mut in_place = AudioProcessor::unconfigured(SAMPLE_RATE, NullClock);
        in_place.init();
        let mut built = processor();
        assert_eq!(in_place.settings(), built.settings());

        let mut a = AudioBuffer::new();
        let mut b = AudioBuffer::new();
        for block in 0..8 {
            let input = sine_block(440.0, 0.5, block);
            in_place.process(&input, &mut a);
            built.process(&input, &mut b);
            assert_eq!(a, b, "block {}", block);
        }
    }

    #[test]
    fn verify_sample_rate_change_reclamps() {
        let mut p = processor();
        let mut s = SystemSettings::new();
        s.crossover.cutoffs = [100.0, 1000.0, 20_000.0];
        p.apply_settings(&s);
        p.set_sample_rate(32_000.0);
        assert_eq!(p.sample_rate(), 32_000.0);
        assert_eq!(p.settings().crossover.cutoffs[2], 0.45 * 32_000.0);
    }
}
