//! Sources and sinks the stream pipe reads from and writes to.
//!
//! Everything upstream (fetching, decoding, tag extraction) reaches the pipe
//! as a [`Source`] of decoded PCM; everything downstream (DAC drivers,
//! recorders) is a [`Sink`]. Both exchange interleaved samples.
//!
//! ## Components
//!
//! | Type | Role | Description |
//! |------|------|-------------|
//! | [`MemorySource`] | source | Plays back an in-memory buffer, optionally in small chunks |
//! | [`ToneSource`] | source | Sine/square test tone from a phase accumulator |
//! | [`RingBufferStream`] | both | Bounded FIFO between a producer and the pipe |
//! | [`MemorySink`] | sink | Collects output, optionally accepting only part of each write |
//! | [`NullSink`] | sink | Counts and discards |
//! | [`I2sOutput`] | sink | Stages stereo `i16` frames for a DMA-driven I2S transmitter |
//!
//! ## Utilities
//!
//! - [`interleave`]: packed stereo DMA words and per-channel block helpers

pub mod interleave;
mod memory;
pub mod output_i2s;
mod ring_stream;
mod tone;

pub use memory::{MemorySink, MemorySource, NullSink};
pub use output_i2s::I2sOutput;
pub use ring_stream::RingBufferStream;
pub use tone::{ToneSource, Waveform};

use alloc::boxed::Box;

use crate::sample::Sample;

/// Producer of interleaved PCM.
pub trait Source<S: Sample> {
    /// Fill the front of `buf` and return how many samples were written.
    ///
    /// A short read is not end of stream, and it may end in the middle of a
    /// frame. A read of 0 is end of stream when
    /// [`is_exhausted()`](Self::is_exhausted) agrees; otherwise the source is
    /// only starved for now.
    fn read_block(&mut self, buf: &mut [S]) -> usize;

    /// Whether no more samples will ever be produced.
    ///
    /// Sources that hold or generate all their data never starve, so for
    /// them a read of 0 already means the end; that is the default.
    fn is_exhausted(&self) -> bool {
        true
    }
}

/// Consumer of interleaved PCM.
pub trait Sink<S: Sample> {
    /// Accept a prefix of `buf` and return its length.
    ///
    /// Accepting fewer samples than offered (including none) is backpressure;
    /// the caller keeps the remainder and offers it again.
    fn write_block(&mut self, buf: &[S]) -> usize;
}

impl<S: Sample, T: Source<S> + ?Sized> Source<S> for &mut T {
    fn read_block(&mut self, buf: &mut [S]) -> usize {
        (**self).read_block(buf)
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

impl<S: Sample, T: Source<S> + ?Sized> Source<S> for Box<T> {
    fn read_block(&mut self, buf: &mut [S]) -> usize {
        (**self).read_block(buf)
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

impl<S: Sample, T: Sink<S> + ?Sized> Sink<S> for &mut T {
    fn write_block(&mut self, buf: &[S]) -> usize {
        (**self).write_block(buf)
    }
}

impl<S: Sample, T: Sink<S> + ?Sized> Sink<S> for Box<T> {
    fn write_block(&mut self, buf: &[S]) -> usize {
        (**self).write_block(buf)
    }
}
