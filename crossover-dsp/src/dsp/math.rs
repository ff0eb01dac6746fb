//! Scalar helpers shared by the DSP stages: decibel conversion, time
//! constants and clamping.

/// Floor applied before taking a logarithm (−100 dBFS).
pub const LINEAR_FLOOR: f32 = 0.000_01;

/// Convert decibels to a linear amplitude factor.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    libm::powf(10.0, db / 20.0)
}

/// Convert a linear amplitude factor to decibels. Values at or below
/// [`LINEAR_FLOOR`] read as −100 dB.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    let floored = if linear > LINEAR_FLOOR { linear } else { LINEAR_FLOOR };
    20.0 * libm::log10f(floored)
}

/// One-pole smoothing coefficient for a time constant in milliseconds.
///
/// Returns `exp(-1 / (t · fs))`. A non-positive time yields 0.0 (the smoother
/// jumps straight to its target).
#[inline]
pub fn time_constant_coef(time_ms: f32, sample_rate: f32) -> f32 {
    if time_ms <= 0.0 {
        0.0
    } else {
        libm::expf(-1.0 / ((time_ms * 0.001) * sample_rate))
    }
}

/// Clamp `value` into `[low, high]`. NaN clamps to `low`.
#[inline]
pub fn clamp(value: f32, low: f32, high: f32) -> f32 {
    if value > high {
        high
    } else if value >= low {
        value
    } else {
        low
    }
}

/// Milliseconds to (fractional) samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * (sample_rate / 1000.0)
}
