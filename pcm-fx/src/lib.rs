//! # pcm-fx
//!
//! A `no_std` real-time effects pipeline for PCM audio on small embedded
//! targets. Decoded, interleaved samples are pulled from a source, run
//! sample by sample through an effect chain per channel, and pushed to a
//! sink such as an I2S DAC. All storage is allocated while the pipeline is
//! configured; the processing path never allocates, locks or blocks.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Memory | [`buffer`] | Fixed-capacity circular sample buffer |
//! | Samples | [`sample`] | `i8` / `i16` / [`I24`] / `i32` sample types and bit depths |
//! | DSP | [`dsp`] | Saturation intrinsics, interpolation, LFO |
//! | Effects | [`effects`] | [`Effect`] trait, delay, flanger, IIR filter, gain |
//! | Chain | [`chain`] | Ordered, mutable per-channel effect chain |
//! | Pipe | [`pipe`] | Block pump: source → chains → sink, with backpressure |
//! | I/O | [`io`] | [`Source`]/[`Sink`] traits, memory, tone, ring and I2S endpoints |
//! | Setup | [`config`] / [`context`] | Pipeline configuration and explicit logging context |
//!
//! ## Quick start
//!
//! ```ignore
//! use pcm_fx::{BitDepth, Context, DelayTime, EffectConfig, PipelineConfig, PumpStatus, Sink, StreamPipe};
//! use pcm_fx::io::{I2sOutput, RingBufferStream};
//!
//! let config = PipelineConfig::new(44_100, 2, BitDepth::Sixteen)
//!     .with_effect(EffectConfig::Delay {
//!         delay: DelayTime::Millis(120.0),
//!         max_delay: None,
//!         feedback: 0.35,
//!         mix: 0.4,
//!     })
//!     .with_effect(EffectConfig::Iir { b: vec![0.2, 0.2], a: vec![1.0] });
//!
//! let decoded = RingBufferStream::new(8192)?;
//! let output = I2sOutput::new(512, true)?;
//! let mut pipe = StreamPipe::<i16, _, _>::from_config(Context::global(), &config, decoded, output)?;
//!
//! // Whenever the decoder has output, between pumps:
//! let accepted = pipe.source_mut().write_block(&pcm);
//!
//! // In the audio task, once per DMA interrupt:
//! match pipe.pump() {
//!     PumpStatus::Starved => { /* decoder fell behind; the DAC plays silence */ }
//!     PumpStatus::Finished => { /* tear down */ }
//!     _ => {}
//! }
//!
//! // When the decoder reaches the end of the track:
//! pipe.source_mut().close();
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `serde` | no | `Serialize`/`Deserialize` for the configuration types |
//!
//! ## Audio parameters
//!
//! - **Block size:** 128 frames by default ([`constants::DEFAULT_BLOCK_FRAMES`])
//! - **Sample rate:** 44 100 Hz by default ([`constants::DEFAULT_SAMPLE_RATE`])
//! - **Sample format:** signed 8/16/24/32-bit, fixed per pipeline
//! - **I2S DMA block:** 128 stereo frames ([`constants::I2S_DMA_FRAMES`])

#![no_std]

extern crate alloc;

pub mod buffer;
pub mod chain;
pub mod config;
pub mod constants;
pub mod context;
pub mod dsp;
pub mod effects;
pub mod error;
pub mod io;
pub mod pipe;
pub mod sample;

pub use buffer::{OverflowPolicy, SampleBuffer};
pub use chain::{EffectChain, EffectId};
pub use config::{DelayTime, EffectConfig, PipelineConfig};
pub use context::Context;
pub use effects::Effect;
pub use error::{Error, ErrorKind, Result};
pub use io::{Sink, Source};
pub use pipe::{PipeState, PipeStats, PumpStatus, StreamPipe};
pub use sample::{BitDepth, Sample, I24};
