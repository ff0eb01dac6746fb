//! Interleaved `i16` ↔ planar `f32` conversion.
//!
//! The codec exchanges stereo audio as interleaved signed 16-bit samples
//! `[L0, R0, L1, R1, ...]`. The DSP chain works on planar `f32` channels with
//! full scale ±1.0 (`i16 / 32767`).

use crate::constants::FULL_SCALE;

/// Split an interleaved stereo buffer into two `f32` channels.
///
/// # Panics
///
/// Debug-asserts that `src` holds exactly one frame per output sample.
pub fn deinterleave_to_f32(src: &[i16], left: &mut [f32], right: &mut [f32]) {
    debug_assert_eq!(src.len(), left.len() * 2);
    debug_assert_eq!(left.len(), right.len());

    for ((frame, l), r) in src.chunks_exact(2).zip(left.iter_mut()).zip(right.iter_mut()) {
        *l = frame[0] as f32 / FULL_SCALE;
        *r = frame[1] as f32 / FULL_SCALE;
    }
}

/// Scale one `f32` sample to the nearest `i16`, saturating. Returns the
/// sample and whether it clipped.
#[inline(always)]
pub fn f32_to_i16(sample: f32) -> (i16, bool) {
    let scaled = libm::roundf(sample * FULL_SCALE);
    if scaled > i16::MAX as f32 {
        (i16::MAX, true)
    } else if scaled < i16::MIN as f32 {
        (i16::MIN, true)
    } else {
        (scaled as i16, false)
    }
}

/// Interleave two `f32` channels into `dest`, saturating to the `i16` range.
///
/// Returns the number of samples that had to be clamped.
///
/// # Panics
///
/// Debug-asserts that `dest` holds exactly one frame per input sample.
pub fn interleave_from_f32(dest: &mut [i16], left: &[f32], right: &[f32]) -> u32 {
    debug_assert_eq!(dest.len(), left.len() * 2);
    debug_assert_eq!(left.len(), right.len());

    let mut clipped = 0u32;
    for ((frame, &l), &r) in dest.chunks_exact_mut(2).zip(left.iter()).zip(right.iter()) {
        let (l16, lc) = f32_to_i16(l);
        let (r16, rc) = f32_to_i16(r);
        frame[0] = l16;
        frame[1] = r16;
        clipped += lc as u32 + rc as u32;
    }
    clipped
}

/// Largest absolute sample of one channel of an interleaved buffer, as a
/// fraction of full scale.
pub fn channel_peak(src: &[i16], channel: usize) -> f32 {
    let mut peak = 0i32;
    for frame in src.chunks_exact(2) {
        let v = (frame[channel] as i32).abs();
        if v > peak {
            peak = v;
        }
    }
    peak as f32 / FULL_SCALE
}
