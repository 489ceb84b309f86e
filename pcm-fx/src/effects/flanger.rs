//! Sine-modulated delay (flanger, and chorus with longer windows).
//!
//! The tap of an internal [`Delay`] line sweeps between `min_delay` and
//! `max_delay` samples following a sine LFO:
//!
//! ```text
//! D[n] = min + (max - min) * (0.5 + 0.5 * sin(phase[n]))
//! ```
//!
//! The delay for a sample is computed from the phase *before* the LFO
//! advances, so the first sample uses phase 0 (the centre of the window).

use crate::constants::MAX_DELAY_SAMPLES;
use crate::dsp::lfo::SineLfo;
use crate::error::{ensure_finite, Error, Result};
use crate::sample::Sample;

use super::{Delay, Effect};

/// Modulated feedback delay.
///
/// # Example
/// ```ignore
/// // Classic flanger: 1–5 ms sweep at 0.25 Hz
/// let mut flanger = Flanger::<i16>::new(44.0, 220.0, 0.25, 44_100, 0.6, 0.5)?;
/// ```
pub struct Flanger<S: Sample> {
    line: Delay<S>,
    lfo: SineLfo,
    min_delay: f32,
    max_delay: f32,
    rate_hz: f32,
    sample_rate: u32,
}

impl<S: Sample> Flanger<S> {
    /// Build a flanger sweeping `min_delay..=max_delay` samples at `rate_hz`.
    ///
    /// Fails when the window is empty, inverted, shorter than one sample,
    /// or longer than the crate's delay limit.
    pub fn new(
        min_delay: f32,
        max_delay: f32,
        rate_hz: f32,
        sample_rate: u32,
        feedback: f32,
        mix: f32,
    ) -> Result<Self> {
        ensure_finite("min_delay", min_delay)?;
        ensure_finite("max_delay", max_delay)?;
        ensure_finite("rate_hz", rate_hz)?;
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        if min_delay < 1.0 || max_delay < min_delay {
            return Err(Error::InvalidModulation {
                min: min_delay,
                max: max_delay,
            });
        }
        if max_delay > MAX_DELAY_SAMPLES as f32 {
            return Err(Error::DelayOutOfRange {
                requested: max_delay,
                max: MAX_DELAY_SAMPLES,
            });
        }
        if rate_hz < 0.0 {
            return Err(Error::InvalidModulation {
                min: min_delay,
                max: max_delay,
            });
        }

        let centre = 0.5 * (min_delay + max_delay);
        Ok(Flanger {
            line: Delay::new(max_delay, centre, feedback, mix)?,
            lfo: SineLfo::new(rate_hz, sample_rate),
            min_delay,
            max_delay,
            rate_hz,
            sample_rate,
        })
    }

    /// Change the sweep rate. The LFO phase is kept.
    pub fn set_rate(&mut self, rate_hz: f32) -> Result<()> {
        ensure_finite("rate_hz", rate_hz)?;
        if rate_hz < 0.0 {
            return Err(Error::InvalidModulation {
                min: self.min_delay,
                max: self.max_delay,
            });
        }
        self.rate_hz = rate_hz;
        self.lfo.set_rate(rate_hz, self.sample_rate);
        Ok(())
    }

    /// Feedback gain of the modulated line.
    pub fn set_feedback(&mut self, feedback: f32) -> Result<()> {
        self.line.set_feedback(feedback)
    }

    /// Wet/dry balance, `0` dry to `1` wet.
    pub fn set_mix(&mut self, mix: f32) -> Result<()> {
        self.line.set_mix(mix)
    }

    /// LFO rate in hertz.
    pub fn rate(&self) -> f32 {
        self.rate_hz
    }

    /// Sweep window as `(min_delay, max_delay)` in samples.
    pub fn window(&self) -> (f32, f32) {
        (self.min_delay, self.max_delay)
    }

    /// Current LFO phase in radians.
    pub fn phase(&self) -> f32 {
        self.lfo.phase_radians()
    }

    #[inline]
    fn current_delay(&mut self) -> f32 {
        let sweep = self.lfo.next_unipolar();
        let delay = self.min_delay + (self.max_delay - self.min_delay) * sweep;
        // Float rounding must never push the tap outside the line
        delay.clamp(self.min_delay, self.max_delay)
    }
}

impl<S: Sample> Effect<S> for Flanger<S> {
    #[inline]
    fn process(&mut self, sample: S) -> S {
        let delay = self.current_delay();
        self.line.step(sample, delay)
    }

    fn reset(&mut self) {
        self.line.reset();
        self.lfo.reset();
    }

    fn name(&self) -> &'static str {
        "flanger"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn window_validation() {
        assert!(matches!(
            Flanger::<i16>::new(0.5, 10.0, 1.0, 1000, 0.0, 1.0),
            Err(Error::InvalidModulation { .. })
        ));
        assert!(matches!(
            Flanger::<i16>::new(10.0, 5.0, 1.0, 1000, 0.0, 1.0),
            Err(Error::InvalidModulation { .. })
        ));
        assert!(matches!(
            Flanger::<i16>::new(2.0, 5.0, -1.0, 1000, 0.0, 1.0),
            Err(Error::InvalidModulation { .. })
        ));
        assert_eq!(
            Flanger::<i16>::new(2.0, 5.0, 1.0, 0, 0.0, 1.0).err(),
            Some(Error::InvalidSampleRate(0))
        );
        assert!(matches!(
            Flanger::<i16>::new(2.0, 1e9, 1.0, 1000, 0.0, 1.0),
            Err(Error::DelayOutOfRange { .. })
        ));
    }

    #[test]
    fn zero_width_window_is_a_plain_delay() {
        let mut flanger = Flanger::<i16>::new(3.0, 3.0, 5.0, 1000, 0.0, 1.0).unwrap();
        let out: Vec<i16> = [10, 20, 30, 40, 50, 60]
            .iter()
            .map(|&x| flanger.process(x))
            .collect();
        assert_eq!(out, [0, 0, 0, 10, 20, 30]);
    }

    #[test]
    fn sweep_stays_inside_window() {
        let mut flanger = Flanger::<i16>::new(2.0, 6.0, 50.0, 1000, 0.0, 1.0).unwrap();
        for _ in 0..200 {
            let d = flanger.current_delay();
            assert!((2.0..=6.0).contains(&d), "delay {d} escaped the window");
        }
    }

    #[test]
    fn first_sample_uses_window_centre() {
        let mut flanger = Flanger::<i16>::new(2.0, 6.0, 1.0, 1000, 0.0, 1.0).unwrap();
        assert!(libm::fabsf(flanger.current_delay() - 4.0) < 1e-3);
    }

    #[test]
    fn phase_persists_across_calls() {
        let mut flanger = Flanger::<i16>::new(2.0, 6.0, 10.0, 1000, 0.0, 1.0).unwrap();
        flanger.process(0);
        let p1 = flanger.phase();
        flanger.process(0);
        let p2 = flanger.phase();
        assert!(p2 > p1);
        assert!(p2 < core::f32::consts::TAU);
    }

    #[test]
    fn modulation_changes_output() {
        let input: Vec<i16> = (0..256).map(|i| ((i * 97) % 2000) as i16 - 1000).collect();

        let mut fixed = Delay::<i16>::new(20.0, 10.0, 0.0, 0.5).unwrap();
        let mut swept = Flanger::<i16>::new(2.0, 18.0, 20.0, 1000, 0.0, 0.5).unwrap();

        let a: Vec<i16> = input.iter().map(|&x| fixed.process(x)).collect();
        let b: Vec<i16> = input.iter().map(|&x| swept.process(x)).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn reset_rewinds_lfo() {
        let mut flanger = Flanger::<i16>::new(2.0, 6.0, 10.0, 1000, 0.3, 1.0).unwrap();
        for _ in 0..10 {
            flanger.process(1000);
        }
        flanger.reset();
        assert_eq!(flanger.phase(), 0.0);
        assert_eq!(flanger.process(0), 0);
    }
}
