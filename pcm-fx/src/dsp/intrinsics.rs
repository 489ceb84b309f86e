//! Saturating narrowing from accumulator width to sample width.
//!
//! On Cortex-M4/M7 (the `dsp` target feature) [`ssat`] is a single `SSAT`
//! instruction. Elsewhere (host tests, Cortex-M0) it falls back to an
//! equivalent clamp. Every sample conversion in the crate ends here, so
//! overflow clips instead of wrapping.

/// Clamp `val` to the signed `BITS`-bit range
/// `-(2^(BITS-1))..=2^(BITS-1)-1`, for `BITS` in `1..=31`.
///
/// `BITS` is a const generic because `SSAT` takes it as an immediate.
#[inline(always)]
pub fn ssat<const BITS: u32>(val: i32) -> i32 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "ssat {out}, #{bits}, {val}",
                out = out(reg) out,
                val = in(reg) val,
                bits = const BITS,
            );
        }
        out
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        let max = (1i32 << (BITS - 1)) - 1;
        val.clamp(-max - 1, max)
    }
}

/// Saturate to `i8` range.
#[inline(always)]
pub fn saturate8(val: i32) -> i8 {
    ssat::<8>(val) as i8
}

/// Saturate to `i16` range (`-32768..=32767`).
#[inline(always)]
pub fn saturate16(val: i32) -> i16 {
    ssat::<16>(val) as i16
}

/// Saturate to signed 24-bit range, kept in an `i32`.
#[inline(always)]
pub fn saturate24(val: i32) -> i32 {
    ssat::<24>(val)
}

/// Narrow a 64-bit accumulator to `i32`. There is no single-instruction
/// form of this on Cortex-M, so it is always a clamp.
#[inline(always)]
pub fn saturate32(val: i64) -> i32 {
    val.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
