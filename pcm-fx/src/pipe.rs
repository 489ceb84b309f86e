//! Block-oriented stream pipe.
//!
//! [`StreamPipe`] bridges a block-producing [`Source`] and a block-consuming
//! [`Sink`] to per-channel [`EffectChain`]s:
//!
//! ```text
//!  Source ──read──► input ──deinterleave──► chain[c].process() ──reinterleave──► output ──write──► Sink
//!                   (carry partial frame)                                        (pending until accepted)
//! ```
//!
//! Each [`pump()`](StreamPipe::pump) moves at most one working block:
//!
//! 1. Flush output still pending from an earlier pump. A sink that keeps
//!    refusing data makes the pump return [`PumpStatus::Stalled`] without
//!    reading anything new, so frames are never dropped or reordered.
//! 2. Read one block from the source. Samples of an incomplete trailing
//!    frame are carried over to the next read.
//! 3. Run every complete frame through the chains, channel `c` through
//!    `chain[c]`, and write the result.
//!
//! A read of 0 from an exhausted source is end of stream: a carried partial
//! frame is padded with silence and processed, and the pipe moves to
//! [`PipeState::Stopped`]. A read of 0 from a source that is merely empty
//! for now (a [`RingBufferStream`](crate::io::RingBufferStream) whose
//! producer fell behind) returns [`PumpStatus::Starved`] and changes
//! nothing, so the next pump picks up where this one left off.
//!
//! ## State machine
//!
//! ```text
//! Idle ──first block──► Active ──end of stream / stop()──► Stopped
//! ```
//!
//! The working buffers are allocated by the constructor. `pump()` never
//! allocates, locks or logs, so it can run from an audio interrupt. The end
//! of the stream is logged when the pipe is taken apart with
//! [`into_parts()`](StreamPipe::into_parts).

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use crate::chain::EffectChain;
use crate::config::PipelineConfig;
use crate::context::{ctx_debug, ctx_info, Context};
use crate::effects::Effect;
use crate::error::{Error, Result};
use crate::io::{Sink, Source};
use crate::sample::Sample;

/// Lifecycle of a [`StreamPipe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeState {
    /// Built, nothing processed yet.
    Idle,
    /// Processing blocks.
    Active,
    /// Source exhausted or [`stop()`](StreamPipe::stop) called. Pending output
    /// is still flushed by later pumps.
    Stopped,
}

/// Outcome of one [`StreamPipe::pump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// This many frames went through the chains and reached the sink.
    Processed(usize),
    /// The sink refused data; output stays pending. Pump again later.
    Stalled,
    /// The source has nothing yet but is not exhausted. Pump again later.
    Starved,
    /// Stopped with nothing pending.
    Finished,
}

/// Running counters, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipeStats {
    /// Pumps that read a non-empty block.
    pub blocks: u64,
    /// Frames processed, including a padded final frame.
    pub frames: u64,
    /// Pumps that ended in [`PumpStatus::Stalled`].
    pub stalls: u64,
    /// Pumps that ended in [`PumpStatus::Starved`].
    pub starved: u64,
    /// Final frames completed with silence at end of stream.
    pub padded_frames: u64,
}

/// Moves interleaved PCM from a source, through one effect chain per
/// channel, to a sink.
///
/// # Example
/// ```ignore
/// let config = PipelineConfig::new(44_100, 2, BitDepth::Sixteen)
///     .with_effect(EffectConfig::Gain { level: 0.5 });
/// let mut pipe = StreamPipe::<i16, _, _>::from_config(ctx, &config, source, output)?;
///
/// // From the audio callback:
/// match pipe.pump() {
///     PumpStatus::Processed(_) | PumpStatus::Stalled | PumpStatus::Starved => {}
///     PumpStatus::Finished => { /* tear down */ }
/// }
/// ```
pub struct StreamPipe<S: Sample, Src: Source<S>, Snk: Sink<S>> {
    ctx: Context,
    source: Src,
    sink: Snk,
    chains: Vec<EffectChain<S>>,
    channels: usize,
    write_attempts: u32,
    /// Samples read from the source; `input[..carry]` is a partial frame
    /// left over from the previous read.
    input: Box<[S]>,
    carry: usize,
    /// Processed samples; `output[out_pos..out_len]` awaits the sink.
    output: Box<[S]>,
    out_pos: usize,
    out_len: usize,
    state: PipeState,
    stats: PipeStats,
}

impl<S: Sample, Src: Source<S>, Snk: Sink<S>> StreamPipe<S, Src, Snk> {
    /// Build a pipe from ready-made chains, one per channel.
    pub fn new(
        ctx: Context,
        config: &PipelineConfig,
        source: Src,
        sink: Snk,
        chains: Vec<EffectChain<S>>,
    ) -> Result<Self> {
        config.validate_for::<S>()?;
        if chains.len() != config.channels {
            return Err(Error::ChainCountMismatch {
                chains: chains.len(),
                channels: config.channels,
            });
        }
        let block_len = config.block_frames * config.channels;

        ctx_info!(
            ctx,
            "stream pipe: {} Hz, {} channels, {}, {}-frame blocks",
            config.sample_rate,
            config.channels,
            config.bit_depth,
            config.block_frames
        );

        Ok(StreamPipe {
            ctx,
            source,
            sink,
            chains,
            channels: config.channels,
            write_attempts: config.write_attempts.max(1),
            input: vec![S::EQUILIBRIUM; block_len].into_boxed_slice(),
            carry: 0,
            output: vec![S::EQUILIBRIUM; block_len].into_boxed_slice(),
            out_pos: 0,
            out_len: 0,
            state: PipeState::Idle,
            stats: PipeStats::default(),
        })
    }

    /// Build the per-channel chains from `config.effects`, then the pipe.
    pub fn from_config(
        ctx: Context,
        config: &PipelineConfig,
        source: Src,
        sink: Snk,
    ) -> Result<Self> {
        let chains = config.build_chains::<S>(&ctx)?;
        Self::new(ctx, config, source, sink, chains)
    }

    /// Move at most one block from the source to the sink.
    pub fn pump(&mut self) -> PumpStatus {
        if !self.flush() {
            self.stats.stalls += 1;
            return PumpStatus::Stalled;
        }
        if self.state == PipeState::Stopped {
            return PumpStatus::Finished;
        }

        let ch = self.channels;
        let read = self.source.read_block(&mut self.input[self.carry..]);
        let mut filled = self.carry + read.min(self.input.len() - self.carry);
        if read == 0 && !self.source.is_exhausted() {
            self.stats.starved += 1;
            return PumpStatus::Starved;
        }
        let end_of_stream = read == 0;

        if end_of_stream {
            if self.carry == 0 {
                self.state = PipeState::Stopped;
                return PumpStatus::Finished;
            }
            self.input[self.carry..ch].fill(S::EQUILIBRIUM);
            filled = ch;
            self.stats.padded_frames += 1;
        }

        if self.state == PipeState::Idle {
            self.state = PipeState::Active;
        }

        let frames = filled / ch;
        let used = frames * ch;
        for (frame_in, frame_out) in self.input[..used]
            .chunks_exact(ch)
            .zip(self.output.chunks_exact_mut(ch))
        {
            for ((chain, &x), y) in self.chains.iter_mut().zip(frame_in).zip(frame_out) {
                *y = chain.process(x);
            }
        }
        self.input.copy_within(used..filled, 0);
        self.carry = filled - used;
        self.out_pos = 0;
        self.out_len = used;

        if frames > 0 {
            self.stats.blocks += 1;
            self.stats.frames += frames as u64;
        }
        if end_of_stream {
            self.state = PipeState::Stopped;
        }

        if self.flush() {
            PumpStatus::Processed(frames)
        } else {
            self.stats.stalls += 1;
            PumpStatus::Stalled
        }
    }

    /// Pump while blocks keep flowing, and return the first status that is
    /// not [`PumpStatus::Processed`].
    pub fn run(&mut self) -> PumpStatus {
        loop {
            match self.pump() {
                PumpStatus::Processed(_) => continue,
                other => return other,
            }
        }
    }

    /// Stop pulling from the source and clear every chain.
    ///
    /// Teardown is block-granular: output already processed stays pending
    /// and is flushed by later pumps, which then report
    /// [`PumpStatus::Finished`]. A carried partial frame is discarded.
    pub fn stop(&mut self) {
        if self.state == PipeState::Stopped {
            return;
        }
        self.state = PipeState::Stopped;
        self.carry = 0;
        for chain in self.chains.iter_mut() {
            chain.clear();
        }
        ctx_info!(
            self.ctx,
            "stream pipe stopped after {} frames",
            self.stats.frames
        );
    }

    /// Where the pipe is in its lifecycle.
    pub fn state(&self) -> PipeState {
        self.state
    }

    /// Counters since construction.
    pub fn stats(&self) -> PipeStats {
        self.stats
    }

    /// Interleaved channels per frame.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Processed samples the sink has not accepted yet.
    pub fn pending(&self) -> usize {
        self.out_len - self.out_pos
    }

    /// The chain of `channel`, for structural changes between pumps.
    pub fn chain_mut(&mut self, channel: usize) -> Option<&mut EffectChain<S>> {
        self.chains.get_mut(channel)
    }

    /// Every channel's chain, in channel order.
    pub fn chains(&self) -> &[EffectChain<S>] {
        &self.chains
    }

    /// The source being read.
    pub fn source(&self) -> &Src {
        &self.source
    }

    /// The source, for a producer refilling it between pumps.
    pub fn source_mut(&mut self) -> &mut Src {
        &mut self.source
    }

    /// The sink being written.
    pub fn sink(&self) -> &Snk {
        &self.sink
    }

    /// The sink, for draining or reconfiguring it between pumps.
    pub fn sink_mut(&mut self) -> &mut Snk {
        &mut self.sink
    }

    /// Tear the pipe down, handing back its collaborators.
    pub fn into_parts(self) -> (Src, Snk, Vec<EffectChain<S>>) {
        ctx_debug!(
            self.ctx,
            "stream pipe released in state {:?} after {} frames ({} padded, {} pending)",
            self.state,
            self.stats.frames,
            self.stats.padded_frames,
            self.pending()
        );
        (self.source, self.sink, self.chains)
    }

    /// Offer pending output to the sink until it is all accepted or the sink
    /// refuses `write_attempts` times in a row.
    fn flush(&mut self) -> bool {
        let mut refused = 0;
        while self.out_pos < self.out_len {
            let offered = self.out_len - self.out_pos;
            let written = self
                .sink
                .write_block(&self.output[self.out_pos..self.out_len])
                .min(offered);
            if written == 0 {
                refused += 1;
                if refused >= self.write_attempts {
                    return false;
                }
            } else {
                refused = 0;
                self.out_pos += written;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DelayTime, EffectConfig};
    use crate::context::test_logger::CaptureLogger;
    use crate::effects::Gain;
    use crate::io::{MemorySink, MemorySource, NullSink, RingBufferStream, Sink};
    use crate::sample::BitDepth;

    fn stereo(block_frames: usize) -> PipelineConfig {
        PipelineConfig::new(8000, 2, BitDepth::Sixteen).with_block_frames(block_frames)
    }

    fn ramp(len: usize) -> Vec<i16> {
        (0..len).map(|i| (i as i16) * 3 - 50).collect()
    }

    #[test]
    fn empty_chains_are_identity() {
        let input = ramp(101 * 2);
        let mut pipe = StreamPipe::from_config(
            Context::silent(),
            &stereo(16),
            MemorySource::new(input.clone()).with_chunk_limit(7),
            MemorySink::new().with_write_limit(5),
        )
        .unwrap();

        assert_eq!(pipe.run(), PumpStatus::Finished);
        assert_eq!(pipe.state(), PipeState::Stopped);
        let (_, sink, _) = pipe.into_parts();
        assert_eq!(sink.into_inner(), input);
    }

    #[test]
    fn state_moves_idle_active_stopped() {
        let mut pipe = StreamPipe::from_config(
            Context::silent(),
            &stereo(2),
            MemorySource::new([1i16, 2, 3, 4, 5, 6]),
            MemorySink::new(),
        )
        .unwrap();
        assert_eq!(pipe.state(), PipeState::Idle);
        assert_eq!(pipe.pump(), PumpStatus::Processed(2));
        assert_eq!(pipe.state(), PipeState::Active);
        assert_eq!(pipe.pump(), PumpStatus::Processed(1));
        assert_eq!(pipe.pump(), PumpStatus::Finished);
        assert_eq!(pipe.state(), PipeState::Stopped);
        assert_eq!(pipe.pump(), PumpStatus::Finished);
    }

    #[test]
    fn channels_get_their_own_chain() {
        let mut left = EffectChain::new();
        left.add(Gain::new(2.0).unwrap());
        let right = EffectChain::new();

        let mut pipe = StreamPipe::new(
            Context::silent(),
            &stereo(4),
            MemorySource::new([10i16, 10, 20, 20, 30, 30]),
            MemorySink::new(),
            vec![left, right],
        )
        .unwrap();
        pipe.run();
        assert_eq!(pipe.sink().samples(), [20, 10, 40, 20, 60, 30]);
    }

    #[test]
    fn partial_frames_are_carried() {
        // Reads of 3 samples split stereo frames
        let input = ramp(12);
        let config = stereo(4).with_effect(EffectConfig::Delay {
            delay: DelayTime::Samples(1.0),
            max_delay: None,
            feedback: 0.0,
            mix: 1.0,
        });
        let mut pipe = StreamPipe::from_config(
            Context::silent(),
            &config,
            MemorySource::new(input.clone()).with_chunk_limit(3),
            MemorySink::new(),
        )
        .unwrap();
        assert_eq!(pipe.pump(), PumpStatus::Processed(1));
        assert_eq!(pipe.run(), PumpStatus::Finished);

        // One-sample delay per channel: every channel is shifted by a frame
        let out = pipe.sink().samples();
        assert_eq!(out[..2], [0, 0]);
        assert_eq!(out[2..], input[..10]);
        assert_eq!(pipe.stats().padded_frames, 0);
    }

    #[test]
    fn trailing_partial_frame_is_padded() {
        let mut pipe = StreamPipe::from_config(
            Context::silent(),
            &stereo(4),
            MemorySource::new([1i16, 2, 3, 4, 5]),
            MemorySink::new(),
        )
        .unwrap();
        assert_eq!(pipe.run(), PumpStatus::Finished);
        assert_eq!(pipe.sink().samples(), [1, 2, 3, 4, 5, 0]);
        assert_eq!(pipe.stats().padded_frames, 1);
        assert_eq!(pipe.stats().frames, 3);
    }

    #[test]
    fn stalled_sink_keeps_output_pending() {
        let input = ramp(16);
        let config = stereo(4).with_write_attempts(3);
        let mut pipe = StreamPipe::from_config(
            Context::silent(),
            &config,
            MemorySource::new(input.clone()),
            MemorySink::new().with_write_limit(0),
        )
        .unwrap();

        assert_eq!(pipe.pump(), PumpStatus::Stalled);
        assert_eq!(pipe.pending(), 8);
        assert_eq!(pipe.sink().writes(), 3);
        // Nothing new is read while output is pending
        assert_eq!(pipe.pump(), PumpStatus::Stalled);
        assert_eq!(pipe.source().remaining(), 8);
        assert_eq!(pipe.stats().stalls, 2);

        pipe.sink_mut().set_write_limit(Some(3));
        assert_eq!(pipe.run(), PumpStatus::Finished);
        assert_eq!(pipe.sink().samples(), &input[..]);
    }

    #[test]
    fn stop_flushes_pending_then_finishes() {
        let mut pipe = StreamPipe::from_config(
            Context::silent(),
            &stereo(2).with_effect(EffectConfig::Gain { level: 1.0 }),
            MemorySource::new(ramp(40)),
            MemorySink::new().with_write_limit(0),
        )
        .unwrap();

        assert_eq!(pipe.pump(), PumpStatus::Stalled);
        pipe.stop();
        assert_eq!(pipe.state(), PipeState::Stopped);
        assert!(pipe.chains().iter().all(|c| c.is_empty()));

        pipe.sink_mut().set_write_limit(None);
        assert_eq!(pipe.pump(), PumpStatus::Finished);
        // Only the block processed before the stop reaches the sink
        assert_eq!(pipe.sink().samples(), &ramp(40)[..4]);
        assert_eq!(pipe.pump(), PumpStatus::Finished);
    }

    #[test]
    fn chains_can_change_between_pumps() {
        let mut pipe = StreamPipe::from_config(
            Context::silent(),
            &PipelineConfig::new(8000, 1, BitDepth::Sixteen).with_block_frames(2),
            MemorySource::new([100i16, 100, 100, 100]),
            MemorySink::new(),
        )
        .unwrap();
        pipe.pump();
        let gain = pipe
            .chain_mut(0)
            .unwrap()
            .add(Gain::new(0.5).unwrap());
        pipe.pump();
        assert!(pipe.chain_mut(1).is_none());
        assert_eq!(pipe.sink().samples(), [100, 100, 50, 50]);
        assert!(pipe.chain_mut(0).unwrap().remove(gain).is_some());
    }

    #[test]
    fn construction_errors() {
        let config = stereo(4);
        let err = StreamPipe::new(
            Context::silent(),
            &config,
            MemorySource::new([0i16; 4]),
            NullSink::new(),
            vec![EffectChain::new()],
        )
        .err();
        assert_eq!(
            err,
            Some(Error::ChainCountMismatch {
                chains: 1,
                channels: 2
            })
        );

        let err = StreamPipe::<i32, _, _>::from_config(
            Context::silent(),
            &config,
            MemorySource::new([0i32; 4]),
            NullSink::new(),
        )
        .err();
        assert_eq!(
            err,
            Some(Error::BitDepthMismatch {
                configured: 16,
                actual: 32
            })
        );
    }

    #[test]
    fn setup_and_teardown_are_logged() {
        static LOGGER: CaptureLogger = CaptureLogger::new();
        let ctx = Context::new(&LOGGER).with_target("pipe-log");

        let mut pipe = StreamPipe::from_config(
            ctx,
            &stereo(4),
            MemorySource::new(ramp(8)),
            NullSink::new(),
        )
        .unwrap();
        pipe.pump();
        pipe.stop();

        let messages: Vec<_> = LOGGER
            .messages("pipe-log")
            .into_iter()
            .map(|(_, m)| m)
            .collect();
        assert_eq!(
            messages,
            vec![
                "stream pipe: 8000 Hz, 2 channels, 16-bit, 4-frame blocks",
                "stream pipe stopped after 4 frames",
            ]
        );
    }

    #[test]
    fn end_of_stream_is_logged_on_release_not_in_pump() {
        static LOGGER: CaptureLogger = CaptureLogger::new();
        let ctx = Context::new(&LOGGER)
            .with_target("pipe-release")
            .with_max_level(log::LevelFilter::Debug);

        let mut pipe = StreamPipe::from_config(
            ctx,
            &stereo(4),
            MemorySource::new([1i16, 2, 3]),
            NullSink::new(),
        )
        .unwrap();
        let setup = LOGGER.messages("pipe-release").len();
        assert_eq!(pipe.run(), PumpStatus::Finished);
        assert_eq!(LOGGER.messages("pipe-release").len(), setup);

        pipe.into_parts();
        let messages = LOGGER.messages("pipe-release");
        assert_eq!(messages.len(), setup + 1);
        assert_eq!(
            messages[setup].1,
            "stream pipe released in state Stopped after 2 frames (1 padded, 0 pending)"
        );
    }

    #[test]
    fn empty_ring_starves_without_stopping() {
        let mut pipe = StreamPipe::from_config(
            Context::silent(),
            &stereo(4),
            RingBufferStream::<i16>::new(16).unwrap(),
            MemorySink::new(),
        )
        .unwrap();

        assert_eq!(pipe.pump(), PumpStatus::Starved);
        assert_eq!(pipe.state(), PipeState::Idle);
        assert_eq!(pipe.run(), PumpStatus::Starved);
        assert_eq!(pipe.stats().starved, 2);

        // The producer catches up, with a frame split across refills
        assert_eq!(pipe.source_mut().write_block(&[1, 2, 3]), 3);
        assert_eq!(pipe.pump(), PumpStatus::Processed(1));
        assert_eq!(pipe.state(), PipeState::Active);
        assert_eq!(pipe.pump(), PumpStatus::Starved);

        pipe.source_mut().write_block(&[4, 5, 6, 7]);
        assert_eq!(pipe.pump(), PumpStatus::Processed(2));
        assert_eq!(pipe.state(), PipeState::Active);

        // Closing with half a frame left pads it and ends the stream
        pipe.source_mut().close();
        assert_eq!(pipe.run(), PumpStatus::Finished);
        assert_eq!(pipe.state(), PipeState::Stopped);
        assert_eq!(pipe.sink().samples(), [1, 2, 3, 4, 5, 6, 7, 0]);
        assert_eq!(pipe.stats().padded_frames, 1);
    }
}
