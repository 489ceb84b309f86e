//! PCM sample types.
//!
//! A [`Sample`] is one signed amplitude for one channel at one instant.
//! Samples are plain `Copy` values; every conversion back from a wider or
//! floating-point intermediate rounds to nearest and saturates at the rails
//! instead of wrapping.

use core::fmt;

use crate::dsp::intrinsics::{saturate16, saturate24, saturate32, saturate8};
use crate::error::{Error, Result};

/// Sample width of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub enum BitDepth {
    Eight,
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

impl BitDepth {
    /// Parse a bit count.
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            24 => Ok(BitDepth::TwentyFour),
            32 => Ok(BitDepth::ThirtyTwo),
            other => Err(Error::UnsupportedBitDepth(other)),
        }
    }

    /// Number of bits per sample.
    pub const fn bits(self) -> u8 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::TwentyFour => 24,
            BitDepth::ThirtyTwo => 32,
        }
    }

    /// Largest representable amplitude.
    pub const fn max_value(self) -> i64 {
        match self {
            BitDepth::Eight => 127,
            BitDepth::Sixteen => 32_767,
            BitDepth::TwentyFour => 8_388_607,
            BitDepth::ThirtyTwo => 2_147_483_647,
        }
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        BitDepth::from_bits(bits)
    }
}

impl From<BitDepth> for u8 {
    fn from(depth: BitDepth) -> u8 {
        depth.bits()
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// A signed PCM sample of fixed width.
pub trait Sample: Copy + Default + PartialEq + PartialOrd + Send + fmt::Debug + 'static {
    /// Width of this sample type.
    const BIT_DEPTH: BitDepth;

    /// The silent value.
    const EQUILIBRIUM: Self;

    /// Widen to `i64` without loss.
    fn to_i64(self) -> i64;

    /// Narrow an integer, clamping to the representable range.
    fn saturate_from_i64(value: i64) -> Self;

    #[inline]
    fn to_f32(self) -> f32 {
        self.to_i64() as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self.to_i64() as f64
    }

    /// Round half away from zero, then saturate. NaN maps to silence.
    #[inline]
    fn from_f64(value: f64) -> Self {
        // `as` saturates out-of-range floats and maps NaN to 0
        Self::saturate_from_i64(libm::round(value) as i64)
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        Self::from_f64(value as f64)
    }
}

impl Sample for i8 {
    const BIT_DEPTH: BitDepth = BitDepth::Eight;
    const EQUILIBRIUM: Self = 0;

    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }

    #[inline]
    fn saturate_from_i64(value: i64) -> Self {
        saturate8(saturate32(value))
    }
}

impl Sample for i16 {
    const BIT_DEPTH: BitDepth = BitDepth::Sixteen;
    const EQUILIBRIUM: Self = 0;

    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }

    #[inline]
    fn saturate_from_i64(value: i64) -> Self {
        saturate16(saturate32(value))
    }
}

impl Sample for i32 {
    const BIT_DEPTH: BitDepth = BitDepth::ThirtyTwo;
    const EQUILIBRIUM: Self = 0;

    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }

    #[inline]
    fn saturate_from_i64(value: i64) -> Self {
        saturate32(value)
    }
}

/// Signed 24-bit sample stored in the low bits of an `i32`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct I24(i32);

impl I24 {
    pub const MAX: I24 = I24(8_388_607);
    pub const MIN: I24 = I24(-8_388_608);

    /// Build from an `i32`, saturating to 24 bits.
    pub fn new(value: i32) -> Self {
        I24(saturate24(value))
    }

    /// Sign-extended value in an `i32`.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<I24> for i32 {
    fn from(value: I24) -> i32 {
        value.0
    }
}

impl Sample for I24 {
    const BIT_DEPTH: BitDepth = BitDepth::TwentyFour;
    const EQUILIBRIUM: Self = I24(0);

    #[inline]
    fn to_i64(self) -> i64 {
        self.0 as i64
    }

    #[inline]
    fn saturate_from_i64(value: i64) -> Self {
        I24(saturate24(saturate32(value)))
    }
}
