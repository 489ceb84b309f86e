//! Offset-and-scale stage.

use crate::error::{ensure_finite, Result};
use crate::sample::Sample;

use super::Effect;

/// Adds a DC offset, multiplies by a factor and clips symmetrically.
///
/// `y = clamp((x + offset) * factor, -limit, limit)`. Without a limit the
/// result only saturates at the sample rails. A factor of `0.0` mutes.
#[derive(Debug, Clone)]
pub struct Scaler {
    factor: f32,
    offset: i32,
    limit: Option<u32>,
}

impl Scaler {
    /// Scaler with no clip limit beyond the sample rails.
    pub fn new(factor: f32, offset: i32) -> Result<Self> {
        ensure_finite("factor", factor)?;
        Ok(Scaler {
            factor,
            offset,
            limit: None,
        })
    }

    /// Clip the result to `-limit..=limit`.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Change the multiplier.
    pub fn set_factor(&mut self, factor: f32) -> Result<()> {
        ensure_finite("factor", factor)?;
        self.factor = factor;
        Ok(())
    }

    /// Change the offset added before scaling.
    pub fn set_offset(&mut self, offset: i32) {
        self.offset = offset;
    }

    /// Current multiplier.
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Current offset, in sample units.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Symmetric clip limit, if any.
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }
}

impl<S: Sample> Effect<S> for Scaler {
    #[inline]
    fn process(&mut self, sample: S) -> S {
        let scaled = (sample.to_i64() + self.offset as i64) as f64 * self.factor as f64;
        match self.limit {
            Some(limit) => {
                let limit = (limit as i64).min(S::BIT_DEPTH.max_value()) as f64;
                S::from_f64(scaled.clamp(-limit, limit))
            }
            None => S::from_f64(scaled),
        }
    }

    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "scaler"
    }
}
