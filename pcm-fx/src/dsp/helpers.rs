//! Per-sample mixing and time conversion helpers.

/// Linear interpolation between `a` and `b` by `frac` in `[0, 1)`.
#[inline(always)]
pub fn lerp(a: f32, b: f32, frac: f32) -> f32 {
    a + frac * (b - a)
}

/// Crossfade between the dry and wet signal: `(1 - mix) * dry + mix * wet`.
#[inline(always)]
pub fn dry_wet(dry: f32, wet: f32, mix: f32) -> f32 {
    (1.0 - mix) * dry + mix * wet
}

/// Convert a duration in milliseconds to a (fractional) sample count.
#[inline]
pub fn ms_to_samples(milliseconds: f32, sample_rate: u32) -> f32 {
    milliseconds * sample_rate as f32 / 1000.0
}

/// Split a non-negative fractional delay into its integer offset and fraction.
#[inline(always)]
pub fn split_delay(delay: f32) -> (usize, f32) {
    let whole = libm::floorf(delay);
    (whole as usize, delay - whole)
}

/// Q16.16 fixed-point representation of a gain, clamped to ±32767.0.
pub fn gain_to_q16(level: f32) -> i32 {
    let clamped = level.clamp(-32767.0, 32767.0);
    (clamped * 65536.0) as i32
}
