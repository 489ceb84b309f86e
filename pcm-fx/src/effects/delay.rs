//! Delay line with feedback and dry/wet mix.
//!
//! Per input sample `x`, with the delay `D` samples (possibly fractional):
//!
//! ```text
//! d = history(D)                       // linear interpolation when D is fractional
//! w = x + feedback * d                 // stored, so later reads see the feedback
//! y = (1 - mix) * x + mix * d
//! ```
//!
//! The delayed sample is read *before* `w` is written, so feedback always
//! uses the pre-write state of the line. Feedback and mix are not clamped.

use crate::buffer::SampleBuffer;
use crate::constants::MAX_DELAY_SAMPLES;
use crate::dsp::helpers::{dry_wet, lerp, split_delay};
use crate::error::{ensure_finite, Error, Result};
use crate::sample::Sample;

use super::Effect;

/// Feedback delay line.
///
/// # Example
/// ```ignore
/// // Slapback: 120 ms at 44.1 kHz, a little feedback, half wet.
/// let mut echo = Delay::<i16>::new(5292.0, 5292.0, 0.3, 0.5)?;
/// let y = echo.process(x);
/// ```
pub struct Delay<S: Sample> {
    line: SampleBuffer<S>,
    /// Current delay in samples, `1.0..=max_delay`.
    delay: f32,
    /// Longest delay accepted by [`set_delay`](Self::set_delay).
    max_delay: f32,
    feedback: f32,
    mix: f32,
}

impl<S: Sample> Delay<S> {
    /// Build a delay line able to hold `max_delay` samples of history, set to
    /// `delay` samples.
    ///
    /// Fails when `delay` is outside `1.0..=max_delay` or any parameter is
    /// not finite.
    pub fn new(max_delay: f32, delay: f32, feedback: f32, mix: f32) -> Result<Self> {
        ensure_finite("max_delay", max_delay)?;
        ensure_finite("feedback", feedback)?;
        ensure_finite("mix", mix)?;
        if max_delay < 1.0 || max_delay > MAX_DELAY_SAMPLES as f32 {
            return Err(Error::DelayOutOfRange {
                requested: max_delay,
                max: MAX_DELAY_SAMPLES,
            });
        }
        // +1 for the interpolation neighbour, +1 because an offset equal to
        // the capacity is never readable.
        let capacity = libm::ceilf(max_delay) as usize + 2;
        let mut line = Delay {
            line: SampleBuffer::silent(capacity)?,
            delay: 1.0,
            max_delay,
            feedback,
            mix,
        };
        line.set_delay(delay)?;
        Ok(line)
    }

    /// Change the delay. Rejects values outside `1.0..=max_delay`.
    pub fn set_delay(&mut self, delay: f32) -> Result<()> {
        ensure_finite("delay", delay)?;
        if delay < 1.0 || delay > self.max_delay {
            return Err(Error::DelayOutOfRange {
                requested: delay,
                max: libm::floorf(self.max_delay) as usize,
            });
        }
        self.delay = delay;
        Ok(())
    }

    /// Fraction of the delayed signal fed back into the line.
    pub fn set_feedback(&mut self, feedback: f32) -> Result<()> {
        ensure_finite("feedback", feedback)?;
        self.feedback = feedback;
        Ok(())
    }

    /// Wet/dry balance, `0` dry to `1` wet.
    pub fn set_mix(&mut self, mix: f32) -> Result<()> {
        ensure_finite("mix", mix)?;
        self.mix = mix;
        Ok(())
    }

    /// Current delay in samples.
    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Longest delay the line can hold, in samples.
    pub fn max_delay(&self) -> f32 {
        self.max_delay
    }

    /// Current feedback gain.
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Current wet/dry balance.
    pub fn mix(&self) -> f32 {
        self.mix
    }

    /// Read the line `delay` samples back, interpolating fractional delays.
    #[inline]
    fn tap(&self, delay: f32) -> f32 {
        let (whole, frac) = split_delay(delay);
        let d0 = self.line.history(whole).to_f32();
        if frac == 0.0 {
            d0
        } else {
            let d1 = self.line.history(whole + 1).to_f32();
            lerp(d0, d1, frac)
        }
    }

    /// One step of the line at an arbitrary in-range delay. Used by the
    /// modulated delays, which move the tap every sample.
    #[inline]
    pub(crate) fn step(&mut self, x: S, delay: f32) -> S {
        let dry = x.to_f32();
        let delayed = self.tap(delay);
        let fed = dry + self.feedback * delayed;
        // Overwriting line: push cannot fail
        let _ = self.line.push(S::from_f32(fed));
        S::from_f32(dry_wet(dry, delayed, self.mix))
    }
}

impl<S: Sample> Effect<S> for Delay<S> {
    #[inline]
    fn process(&mut self, sample: S) -> S {
        self.step(sample, self.delay)
    }

    fn reset(&mut self) {
        self.line.reset();
    }

    fn name(&self) -> &'static str {
        "delay"
    }
}
