/// Core trait for mono sample-by-sample DSP stages.
///
/// Every stage of the band chain (biquad sections, filter chains, compressor,
/// limiter) consumes one `f32` sample and produces one. Stages own their state;
/// `reset()` returns them to the power-on state without touching parameters.
pub trait SampleProcessor {
    /// Process one sample.
    fn process_sample(&mut self, input: f32) -> f32;

    /// Clear all internal state (history, envelopes). Parameters are kept.
    fn reset(&mut self);

    /// Process a block in place.
    fn process_block(&mut self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}
