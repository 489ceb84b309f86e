//! Pipeline configuration.
//!
//! A [`PipelineConfig`] fixes the stream format (sample rate, channel count,
//! bit depth) and lists the effects every channel runs. It is validated and
//! turned into effect chains once, before the pipe becomes active; changing
//! the format means building a new pipe.
//!
//! With the `serde` feature every type here derives `Serialize` and
//! `Deserialize`, so presets can be stored by the embedding application:
//!
//! ```json
//! {
//!   "sample_rate": 48000,
//!   "channels": 2,
//!   "bit_depth": 16,
//!   "effects": [
//!     { "type": "delay", "delay": { "millis": 120.0 }, "feedback": 0.3, "mix": 0.4 },
//!     { "type": "iir", "b": [0.2, 0.2], "a": [1.0] }
//!   ]
//! }
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::chain::EffectChain;
use crate::constants::{
    DEFAULT_BLOCK_FRAMES, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE, DEFAULT_WRITE_ATTEMPTS,
    MAX_BLOCK_FRAMES, MAX_CHANNELS,
};
use crate::context::{ctx_debug, ctx_warn, Context};
use crate::dsp::helpers::ms_to_samples;
use crate::effects::{AutoCenter, Delay, Effect, Flanger, Gain, IirFilter, Scaler};
use crate::error::{Error, Result};
use crate::sample::{BitDepth, Sample};

/// A duration given either in samples or in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DelayTime {
    Samples(f32),
    Millis(f32),
}

impl DelayTime {
    /// Length in (possibly fractional) samples at `sample_rate`.
    pub fn to_samples(self, sample_rate: u32) -> f32 {
        match self {
            DelayTime::Samples(samples) => samples,
            DelayTime::Millis(ms) => ms_to_samples(ms, sample_rate),
        }
    }
}

/// Parameters of one effect.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum EffectConfig {
    /// Feedback delay. The line is sized for `max_delay`, or for `delay`
    /// when no maximum is given.
    Delay {
        delay: DelayTime,
        #[cfg_attr(feature = "serde", serde(default))]
        max_delay: Option<DelayTime>,
        feedback: f32,
        mix: f32,
    },
    /// Sine-swept delay between `min_delay` and `max_delay`.
    Flanger {
        min_delay: DelayTime,
        max_delay: DelayTime,
        rate_hz: f32,
        feedback: f32,
        mix: f32,
    },
    /// Recursive filter with externally designed coefficients.
    Iir { b: Vec<f32>, a: Vec<f32> },
    /// Volume; 1.0 is unity.
    Gain { level: f32 },
    /// `(x + offset) * factor`, clipped to `±limit` when one is given.
    Scaler {
        factor: f32,
        #[cfg_attr(feature = "serde", serde(default))]
        offset: i32,
        #[cfg_attr(feature = "serde", serde(default))]
        limit: Option<u32>,
    },
    /// Removes the DC offset measured over the first `window` samples.
    AutoCenter { window: u32 },
}

impl EffectConfig {
    /// Name of the effect this entry builds.
    pub fn name(&self) -> &'static str {
        match self {
            EffectConfig::Delay { .. } => "delay",
            EffectConfig::Flanger { .. } => "flanger",
            EffectConfig::Iir { .. } => "iir",
            EffectConfig::Gain { .. } => "gain",
            EffectConfig::Scaler { .. } => "scaler",
            EffectConfig::AutoCenter { .. } => "auto_center",
        }
    }

    /// Feedback gain, for the effects that have one.
    pub fn feedback(&self) -> Option<f32> {
        match *self {
            EffectConfig::Delay { feedback, .. } | EffectConfig::Flanger { feedback, .. } => {
                Some(feedback)
            }
            _ => None,
        }
    }

    /// Validate the parameters and construct one effect instance.
    pub fn build<S: Sample>(&self, sample_rate: u32) -> Result<Box<dyn Effect<S>>> {
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        let effect: Box<dyn Effect<S>> = match self {
            EffectConfig::Delay {
                delay,
                max_delay,
                feedback,
                mix,
            } => {
                let delay = delay.to_samples(sample_rate);
                let max = max_delay.map_or(delay, |m| m.to_samples(sample_rate));
                Box::new(Delay::<S>::new(max, delay, *feedback, *mix)?)
            }
            EffectConfig::Flanger {
                min_delay,
                max_delay,
                rate_hz,
                feedback,
                mix,
            } => Box::new(Flanger::<S>::new(
                min_delay.to_samples(sample_rate),
                max_delay.to_samples(sample_rate),
                *rate_hz,
                sample_rate,
                *feedback,
                *mix,
            )?),
            EffectConfig::Iir { b, a } => Box::new(IirFilter::<S>::new(b, a)?),
            EffectConfig::Gain { level } => Box::new(Gain::new(*level)?),
            EffectConfig::Scaler {
                factor,
                offset,
                limit,
            } => {
                let scaler = Scaler::new(*factor, *offset)?;
                Box::new(match limit {
                    Some(limit) => scaler.with_limit(*limit),
                    None => scaler,
                })
            }
            EffectConfig::AutoCenter { window } => Box::new(AutoCenter::new(*window)?),
        };
        Ok(effect)
    }
}

/// Stream format and per-channel effect list, fixed for a pipe's lifetime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Interleaved channels per frame.
    pub channels: usize,
    /// Must match the pipe's sample type.
    pub bit_depth: BitDepth,
    /// Frames pulled from the source per pump.
    pub block_frames: usize,
    /// Zero-progress sink writes tolerated per pump before reporting a stall.
    pub write_attempts: u32,
    /// Effects applied, in order, to every channel. Each channel gets its
    /// own instances.
    pub effects: Vec<EffectConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            bit_depth: BitDepth::Sixteen,
            block_frames: DEFAULT_BLOCK_FRAMES,
            write_attempts: DEFAULT_WRITE_ATTEMPTS,
            effects: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Default format with `channels` channels and no effects.
    pub fn new(sample_rate: u32, channels: usize, bit_depth: BitDepth) -> Self {
        PipelineConfig {
            sample_rate,
            channels,
            bit_depth,
            ..Self::default()
        }
    }

    /// Frames processed per pump.
    pub fn with_block_frames(mut self, frames: usize) -> Self {
        self.block_frames = frames;
        self
    }

    /// Zero-progress writes tolerated before a pump reports a stall.
    pub fn with_write_attempts(mut self, attempts: u32) -> Self {
        self.write_attempts = attempts;
        self
    }

    /// Append an effect to every channel's chain.
    pub fn with_effect(mut self, effect: EffectConfig) -> Self {
        self.effects.push(effect);
        self
    }

    /// Check the stream format. Effect parameters are checked when the
    /// chains are built.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(Error::InvalidChannelCount(self.channels));
        }
        if self.block_frames == 0 || self.block_frames > MAX_BLOCK_FRAMES {
            return Err(Error::InvalidBlockSize(self.block_frames));
        }
        Ok(())
    }

    /// [`validate`](Self::validate), plus the bit depth must be that of `S`.
    pub fn validate_for<S: Sample>(&self) -> Result<()> {
        self.validate()?;
        if self.bit_depth != S::BIT_DEPTH {
            return Err(Error::BitDepthMismatch {
                configured: self.bit_depth.bits(),
                actual: S::BIT_DEPTH.bits(),
            });
        }
        Ok(())
    }

    /// Build one channel's chain from [`effects`](Self::effects).
    pub fn build_chain<S: Sample>(&self, ctx: &Context) -> Result<EffectChain<S>> {
        self.validate_for::<S>()?;
        let mut chain = EffectChain::with_capacity(*ctx, self.effects.len());
        for (index, effect) in self.effects.iter().enumerate() {
            if let Some(feedback) = effect.feedback() {
                if libm::fabsf(feedback) >= 1.0 {
                    ctx_warn!(
                        ctx,
                        "effect {} ({}): feedback {} does not decay; output will clip",
                        index,
                        effect.name(),
                        feedback
                    );
                }
            }
            chain.add_boxed(effect.build::<S>(self.sample_rate)?);
        }
        Ok(chain)
    }

    /// One independent chain per channel.
    pub fn build_chains<S: Sample>(&self, ctx: &Context) -> Result<Vec<EffectChain<S>>> {
        let chains = (0..self.channels)
            .map(|_| self.build_chain::<S>(ctx))
            .collect::<Result<Vec<_>>>()?;
        ctx_debug!(
            ctx,
            "built {} chains of {} effects",
            chains.len(),
            self.effects.len()
        );
        Ok(chains)
    }
}
