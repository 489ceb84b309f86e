//! Test-tone generator.
//!
//! Produces the same waveform on every channel of an interleaved stream,
//! either forever or for a fixed number of frames. Handy for bring-up of a
//! DAC path and for exercising effects without a decoder.

use crate::dsp::lfo::SineLfo;
use crate::error::{ensure_finite, Error, Result};
use crate::sample::Sample;

use super::Source;

/// Shape of a [`ToneSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Waveform {
    Sine,
    Square,
}

/// Phase-accumulator oscillator exposed as a [`Source`].
///
/// # Example
/// ```ignore
/// // One second of 440 Hz at half scale, stereo
/// let tone = ToneSource::<i16>::new(Waveform::Sine, 440.0, 44_100, 2, 0.5)?
///     .with_duration_frames(44_100);
/// ```
pub struct ToneSource<S: Sample> {
    osc: SineLfo,
    waveform: Waveform,
    /// Peak amplitude in sample units.
    peak: f32,
    channels: usize,
    frames_left: Option<usize>,
    _sample: core::marker::PhantomData<S>,
}

impl<S: Sample> ToneSource<S> {
    /// Tone at `frequency` Hz with `amplitude` in `[0, 1]` of full scale.
    pub fn new(
        waveform: Waveform,
        frequency: f32,
        sample_rate: u32,
        channels: usize,
        amplitude: f32,
    ) -> Result<Self> {
        ensure_finite("frequency", frequency)?;
        ensure_finite("amplitude", amplitude)?;
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        if channels == 0 {
            return Err(Error::InvalidChannelCount(channels));
        }
        let level = amplitude.clamp(0.0, 1.0);
        Ok(ToneSource {
            osc: SineLfo::new(frequency, sample_rate),
            waveform,
            peak: level * S::BIT_DEPTH.max_value() as f32,
            channels,
            frames_left: None,
            _sample: core::marker::PhantomData,
        })
    }

    /// End the stream after `frames` frames.
    pub fn with_duration_frames(mut self, frames: usize) -> Self {
        self.frames_left = Some(frames);
        self
    }

    /// Start phase in degrees.
    pub fn with_phase_degrees(mut self, degrees: f32) -> Self {
        self.osc.set_phase_degrees(degrees);
        self
    }

    /// Samples per frame.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frames still to be produced, or `None` for an endless tone.
    pub fn frames_left(&self) -> Option<usize> {
        self.frames_left
    }

    #[inline]
    fn next_value(&mut self) -> S {
        let unit = match self.waveform {
            Waveform::Sine => self.osc.next_bipolar(),
            Waveform::Square => self.osc.next_square(),
        };
        S::from_f32(unit * self.peak)
    }
}

impl<S: Sample> Source<S> for ToneSource<S> {
    /// Writes whole frames only.
    fn read_block(&mut self, buf: &mut [S]) -> usize {
        let mut frames = buf.len() / self.channels;
        if let Some(left) = self.frames_left {
            frames = frames.min(left);
            self.frames_left = Some(left - frames);
        }
        for frame in buf.chunks_exact_mut(self.channels).take(frames) {
            frame.fill(self.next_value());
        }
        frames * self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_wave_alternates() {
        // 1 kHz at 4 kHz: two samples high, two low
        let mut tone = ToneSource::<i16>::new(Waveform::Square, 1000.0, 4000, 1, 1.0).unwrap();
        let mut buf = [0i16; 8];
        assert_eq!(tone.read_block(&mut buf), 8);
        assert_eq!(buf, [32767, 32767, -32767, -32767, 32767, 32767, -32767, -32767]);
    }

    #[test]
    fn sine_quarter_points() {
        let mut tone = ToneSource::<i16>::new(Waveform::Sine, 1000.0, 4000, 1, 0.5).unwrap();
        let mut buf = [0i16; 4];
        tone.read_block(&mut buf);
        assert_eq!(buf[0], 0);
        assert!((buf[1] - 16384).abs() <= 1, "peak was {}", buf[1]);
        assert!(buf[2].abs() <= 1);
        assert!((buf[3] + 16384).abs() <= 1, "trough was {}", buf[3]);
    }

    #[test]
    fn every_channel_carries_the_tone() {
        let mut tone = ToneSource::<i16>::new(Waveform::Square, 10.0, 1000, 3, 0.25).unwrap();
        let mut buf = [0i16; 7];
        // Only two whole frames fit
        assert_eq!(tone.read_block(&mut buf), 6);
        assert!(buf[..6].iter().all(|&s| s == buf[0]));
        assert_eq!(buf[6], 0);
    }

    #[test]
    fn finite_tone_ends() {
        let mut tone = ToneSource::<i16>::new(Waveform::Sine, 100.0, 8000, 2, 1.0)
            .unwrap()
            .with_duration_frames(5);
        let mut buf = [0i16; 8];
        assert_eq!(tone.read_block(&mut buf), 8);
        assert_eq!(tone.read_block(&mut buf), 2);
        assert_eq!(tone.read_block(&mut buf), 0);
        assert_eq!(tone.frames_left(), Some(0));
    }

    #[test]
    fn rejects_bad_setup() {
        assert_eq!(
            ToneSource::<i16>::new(Waveform::Sine, 440.0, 0, 2, 1.0).err(),
            Some(Error::InvalidSampleRate(0))
        );
        assert_eq!(
            ToneSource::<i16>::new(Waveform::Sine, 440.0, 44_100, 0, 1.0).err(),
            Some(Error::InvalidChannelCount(0))
        );
    }
}
