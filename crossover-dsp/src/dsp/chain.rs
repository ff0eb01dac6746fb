//! Cascade of biquad sections forming one crossover leg.

use super::biquad::{BiquadSection, FilterKind, BUTTERWORTH_Q};
use crate::processor::SampleProcessor;
use crate::settings::{FilterOrder, FilterType};

/// Most sections a leg can hold (8th order).
pub const MAX_SECTIONS: usize = 4;

const BUTTERWORTH_Q2: [f32; 1] = [0.7071];
const BUTTERWORTH_Q4: [f32; 2] = [0.5412, 1.3066];
const BUTTERWORTH_Q8: [f32; 4] = [0.5098, 0.6013, 0.9000, 1.7412];

/// Q of section `index` for the given topology.
///
/// Butterworth uses the pole-pair table for its order. Linkwitz-Riley is a
/// cascade of identical 2nd-order Butterworth sections.
pub fn section_q(filter_type: FilterType, order: FilterOrder, index: usize) -> f32 {
    match filter_type {
        FilterType::LinkwitzRiley => BUTTERWORTH_Q,
        FilterType::Butterworth => {
            let table: &[f32] = match order {
                FilterOrder::Second => &BUTTERWORTH_Q2,
                FilterOrder::Fourth => &BUTTERWORTH_Q4,
                FilterOrder::Eighth => &BUTTERWORTH_Q8,
            };
            table.get(index).copied().unwrap_or(BUTTERWORTH_Q)
        }
    }
}

/// Up to [`MAX_SECTIONS`] biquads sharing one cutoff and response kind.
#[derive(Debug, Clone, Copy)]
pub struct FilterChain {
    sections: [BiquadSection; MAX_SECTIONS],
    active: usize,
    kind: FilterKind,
}

impl FilterChain {
    /// An empty pass-through chain.
    pub const fn new(kind: FilterKind) -> Self {
        FilterChain {
            sections: [BiquadSection::new(); MAX_SECTIONS],
            active: 0,
            kind,
        }
    }

    /// Redesign every section. History of sections that stay active is kept;
    /// sections that become active start from a cleared state.
    pub fn configure(
        &mut self,
        cutoff_hz: f32,
        filter_type: FilterType,
        order: FilterOrder,
        sample_rate: f32,
    ) {
        let count = order.sections();
        for (i, section) in self.sections.iter_mut().enumerate().take(count) {
            if i >= self.active {
                section.reset();
            }
            section.compute_coefficients(
                cutoff_hz,
                section_q(filter_type, order, i),
                self.kind,
                sample_rate,
            );
        }
        self.active = count;
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Number of sections a sample passes through.
    pub fn active_sections(&self) -> usize {
        self.active
    }

    pub fn section(&self, index: usize) -> Option<&BiquadSection> {
        self.sections[..self.active].get(index)
    }

    #[inline(always)]
    pub fn process(&mut self, input: f32) -> f32 {
        let mut y = input;
        for section in self.sections[..self.active].iter_mut() {
            y = section.process(y);
        }
        y
    }
}

impl SampleProcessor for FilterChain {
    #[inline(always)]
    fn process_sample(&mut self, input: f32) -> f32 {
        self.process(input)
    }

    fn reset(&mut self) {
        for section in self.sections.iter_mut() {
            section.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;

    const FS: f32 = 48_000.0;

    fn steady_peak(chain: &mut FilterChain, freq: f32) -> f32 {
        let total = 19_200;
        let mut peak = 0.0f32;
        for n in 0..total {
            let y = chain.process(libm::sinf(2.0 * PI * freq * n as f32 / FS));
            if n >= total / 2 {
                peak = peak.max(libm::fabsf(y));
            }
        }
        peak
    }

    #[test]
    fn section_counts_follow_order() {
        let mut chain = FilterChain::new(FilterKind::LowPass);
        assert_eq!(chain.active_sections(), 0);
        for (order, n) in [
            (FilterOrder::Second, 1),
            (FilterOrder::Fourth, 2),
            (FilterOrder::Eighth, 4),
        ] {
            chain.configure(1000.0, FilterType::Butterworth, order, FS);
            assert_eq!(chain.active_sections(), n);
            chain.configure(1000.0, FilterType::LinkwitzRiley, order, FS);
            assert_eq!(chain.active_sections(), n);
        }
    }

    #[test]
    fn q_tables() {
        assert_eq!(section_q(FilterType::Butterworth, FilterOrder::Fourth, 0), 0.5412);
        assert_eq!(section_q(FilterType::Butterworth, FilterOrder::Fourth, 1), 1.3066);
        assert_eq!(section_q(FilterType::Butterworth, FilterOrder::Eighth, 3), 1.7412);
        for i in 0..4 {
            assert_eq!(section_q(FilterType::LinkwitzRiley, FilterOrder::Eighth, i), BUTTERWORTH_Q);
        }
    }

    #[test]
    fn linkwitz_riley_4_is_minus_6db_at_cutoff() {
        let mut chain = FilterChain::new(FilterKind::LowPass);
        chain.configure(1000.0, FilterType::LinkwitzRiley, FilterOrder::Fourth, FS);
        let g = steady_peak(&mut chain, 1000.0);
        assert!((g - 0.5).abs() < 0.02, "LR4 gain at cutoff {}", g);
    }

    #[test]
    fn butterworth_4_is_minus_3db_at_cutoff() {
        let mut chain = FilterChain::new(FilterKind::HighPass);
        chain.configure(1000.0, FilterType::Butterworth, FilterOrder::Fourth, FS);
        let g = steady_peak(&mut chain, 1000.0);
        assert!((g - 0.7071).abs() < 0.02, "BW4 gain at cutoff {}", g);
    }

    #[test]
    fn higher_order_rejects_more() {
        let mut second = FilterChain::new(FilterKind::LowPass);
        let mut eighth = FilterChain::new(FilterKind::LowPass);
        second.configure(500.0, FilterType::Butterworth, FilterOrder::Second, FS);
        eighth.configure(500.0, FilterType::Butterworth, FilterOrder::Eighth, FS);
        let g2 = steady_peak(&mut second, 2000.0);
        let g8 = steady_peak(&mut eighth, 2000.0);
        assert!(g8 < g2 / 100.0, "8th {} vs 2nd {}", g8, g2);
    }

    #[test]
    fn newly_activated_sections_start_clean() {
        let mut chain = FilterChain::new(FilterKind::LowPass);
        chain.configure(200.0, FilterType::LinkwitzRiley, FilterOrder::Second, FS);
        for _ in 0..100 {
            chain.process(1.0);
        }
        chain.configure(200.0, FilterType::LinkwitzRiley, FilterOrder::Eighth, FS);
        assert!(!chain.section(0).map(|s| s.is_cleared()).unwrap_or(true));
        for i in 1..4 {
            assert!(chain.section(i).map(|s| s.is_cleared()).unwrap_or(false));
        }
    }

    #[test]
    fn reset_clears_all_sections() {
        let mut chain = FilterChain::new(FilterKind::HighPass);
        chain.configure(300.0, FilterType::Butterworth, FilterOrder::Eighth, FS);
        for n in 0..256 {
            chain.process(if n % 2 == 0 { 0.8 } else { -0.8 });
        }
        chain.reset();
        for i in 0..4 {
            assert!(chain.section(i).map(|s| s.is_cleared()).unwrap_or(false));
        }
        assert_eq!(chain.process(0.0), 0.0);
    }
}
