//! Fixed-point volume control.

use crate::dsp::helpers::gain_to_q16;
use crate::error::{ensure_finite, Result};
use crate::sample::Sample;

use super::Effect;

/// Fixed-point unity gain: 1.0 in Q16.16 format.
const UNITY_GAIN: i32 = 65536;

/// Stateless amplifier. 0.0 = silence, 1.0 = unity, >1.0 = boost.
///
/// The level is held as a Q16.16 multiplier; products saturate at the
/// sample rails.
#[derive(Debug, Clone)]
pub struct Gain {
    /// Gain in Q16.16 fixed-point. 65536 = unity (1.0).
    multiplier: i32,
}

impl Gain {
    /// Gain at `level`, clamped to ±32767.0.
    pub fn new(level: f32) -> Result<Self> {
        let mut gain = Gain {
            multiplier: UNITY_GAIN,
        };
        gain.set_level(level)?;
        Ok(gain)
    }

    /// Gain of exactly 1.0; samples pass through untouched.
    pub fn unity() -> Self {
        Gain {
            multiplier: UNITY_GAIN,
        }
    }

    /// Change the level. Same range as [`new`](Self::new).
    pub fn set_level(&mut self, level: f32) -> Result<()> {
        ensure_finite("level", level)?;
        self.multiplier = gain_to_q16(level);
        Ok(())
    }

    /// Current level as a linear factor.
    pub fn level(&self) -> f32 {
        self.multiplier as f32 / UNITY_GAIN as f32
    }
}

impl<S: Sample> Effect<S> for Gain {
    #[inline]
    fn process(&mut self, sample: S) -> S {
        match self.multiplier {
            UNITY_GAIN => sample,
            0 => S::EQUILIBRIUM,
            mult => S::saturate_from_i64((sample.to_i64() * mult as i64) >> 16),
        }
    }

    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "gain"
    }
}
