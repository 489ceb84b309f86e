//! Low-frequency sine oscillator.
//!
//! The phase is a 32-bit accumulator where `2^32` corresponds to one full
//! turn (2π), so wrapping is free and exact. The sine itself is evaluated
//! with `libm::sinf`; at LFO rates a wavetable buys nothing.

use core::f32::consts::TAU;

/// Full turn of the phase accumulator, as a float.
const PHASE_SCALE: f64 = 4_294_967_296.0;

/// Sine LFO driven by a wrapping phase accumulator.
#[derive(Debug, Clone)]
pub struct SineLfo {
    /// Current phase; wraps naturally at 32 bits = 2π.
    phase: u32,
    /// Phase increment per sample: `rate / sample_rate * 2^32`.
    increment: u32,
}

impl SineLfo {
    /// Oscillator at `rate_hz`, starting at phase zero.
    pub fn new(rate_hz: f32, sample_rate: u32) -> Self {
        let mut lfo = SineLfo {
            phase: 0,
            increment: 0,
        };
        lfo.set_rate(rate_hz, sample_rate);
        lfo
    }

    /// Change the rate without disturbing the phase.
    pub fn set_rate(&mut self, rate_hz: f32, sample_rate: u32) {
        let turns = rate_hz as f64 / sample_rate.max(1) as f64;
        // Negative and NaN rates collapse to a stopped oscillator
        self.increment = (turns * PHASE_SCALE) as u32;
    }

    /// Sine of the current phase in `[-1, 1]`, then advance one sample.
    #[inline]
    pub fn next_bipolar(&mut self) -> f32 {
        let value = libm::sinf(self.phase_radians());
        self.phase = self.phase.wrapping_add(self.increment);
        value
    }

    /// `+1` for the first half of the cycle and `-1` for the second, then
    /// advance one sample.
    #[inline]
    pub fn next_square(&mut self) -> f32 {
        let value = if self.phase < 1 << 31 { 1.0 } else { -1.0 };
        self.phase = self.phase.wrapping_add(self.increment);
        value
    }

    /// Same oscillator mapped to `[0, 1]`.
    #[inline]
    pub fn next_unipolar(&mut self) -> f32 {
        0.5 + 0.5 * self.next_bipolar()
    }

    /// Current phase in radians, in `[0, 2π)`.
    pub fn phase_radians(&self) -> f32 {
        (self.phase as f64 / PHASE_SCALE) as f32 * TAU
    }

    /// Raw accumulator value.
    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Set the phase in degrees (0–360).
    pub fn set_phase_degrees(&mut self, degrees: f32) {
        let turns = libm::fmodf(degrees, 360.0) / 360.0;
        let turns = if turns < 0.0 { turns + 1.0 } else { turns };
        self.phase = (turns as f64 * PHASE_SCALE) as u32;
    }

    /// Back to phase zero.
    pub fn reset(&mut self) {
        self.phase = 0;
    }
}
