//! Direct-form I recursive (IIR) filter with caller-supplied coefficients.
//!
//! ```text
//! a0 * y[n] = b0 x[n] + b1 x[n-1] + ... + bM x[n-M]
//!                     - a1 y[n-1] - ... - aN y[n-N]
//! ```
//!
//! Coefficients are designed elsewhere and handed over at construction; the
//! filter only normalizes them by `a0`. Input and output history live in
//! fixed ring buffers sized to the filter order. The sum is accumulated in
//! `f64` and rounded/saturated back to the sample range, so overflow clips
//! rather than wraps.

use alloc::boxed::Box;

use crate::buffer::SampleBuffer;
use crate::constants::MAX_IIR_ORDER;
use crate::error::{Error, Result};
use crate::sample::Sample;

use super::Effect;

/// Fixed-order IIR filter for one channel.
///
/// # Example
/// ```ignore
/// // Two-tap moving average
/// let mut lp = IirFilter::<i16>::new(&[0.5, 0.5], &[1.0])?;
/// ```
pub struct IirFilter<S: Sample> {
    /// Feedforward coefficients, normalized by `a0`.
    b: Box<[f64]>,
    /// Feedback coefficients `a1..aN`, normalized by `a0`.
    a: Box<[f64]>,
    /// Past inputs; `history(k)` is `x[n-k]`.
    inputs: SampleBuffer<S>,
    /// Past outputs; `history(k)` is `y[n-k]`.
    outputs: SampleBuffer<S>,
}

impl<S: Sample> IirFilter<S> {
    /// Build a filter from feedforward `b` and feedback `a` coefficients.
    ///
    /// `a[0]` must be non-zero; the filter order is
    /// `max(len(a), len(b)) - 1` and may not exceed [`MAX_IIR_ORDER`].
    pub fn new(b: &[f32], a: &[f32]) -> Result<Self> {
        if b.is_empty() {
            return Err(Error::InvalidCoefficients("feedforward list is empty"));
        }
        if a.is_empty() {
            return Err(Error::InvalidCoefficients("feedback list is empty"));
        }
        if b.iter().chain(a.iter()).any(|c| !c.is_finite()) {
            return Err(Error::InvalidCoefficients("coefficients must be finite"));
        }
        let a0 = a[0] as f64;
        if a0 == 0.0 {
            return Err(Error::InvalidCoefficients("a[0] must be non-zero"));
        }
        let order = b.len().max(a.len()) - 1;
        if order > MAX_IIR_ORDER {
            return Err(Error::FilterOrderTooLarge {
                order,
                max: MAX_IIR_ORDER,
            });
        }

        let b: Box<[f64]> = b.iter().map(|&c| c as f64 / a0).collect();
        let a: Box<[f64]> = a[1..].iter().map(|&c| c as f64 / a0).collect();

        // One spare slot: offsets 1..=order must stay below the capacity
        Ok(IirFilter {
            inputs: SampleBuffer::silent(b.len().max(1))?,
            outputs: SampleBuffer::silent(a.len() + 1)?,
            b,
            a,
        })
    }

    /// Filter order (length of the longest history).
    pub fn order(&self) -> usize {
        (self.b.len() - 1).max(self.a.len())
    }

    /// Normalized feedforward coefficients.
    pub fn feedforward(&self) -> &[f64] {
        &self.b
    }

    /// Normalized feedback coefficients, excluding `a0`.
    pub fn feedback(&self) -> &[f64] {
        &self.a
    }
}

impl<S: Sample> Effect<S> for IirFilter<S> {
    #[inline]
    fn process(&mut self, sample: S) -> S {
        let mut acc = self.b[0] * sample.to_f64();
        for (k, &bk) in self.b.iter().enumerate().skip(1) {
            acc += bk * self.inputs.history(k).to_f64();
        }
        for (k, &ak) in self.a.iter().enumerate() {
            acc -= ak * self.outputs.history(k + 1).to_f64();
        }
        let out = S::from_f64(acc);

        // Overwriting history: push cannot fail
        let _ = self.inputs.push(sample);
        let _ = self.outputs.push(out);
        out
    }

    fn reset(&mut self) {
        self.inputs.reset();
        self.outputs.reset();
    }

    fn name(&self) -> &'static str {
        "iir"
    }
}
