//! Bounded FIFO usable as both sink and source.
//!
//! A [`RingBufferStream`] decouples a producer (a decoder, a network task)
//! from the stream pipe. It is backed by a rejecting
//! [`SampleBuffer`](crate::buffer::SampleBuffer), so a full stream accepts a
//! partial write instead of overwriting unread audio.
//!
//! Running dry is not the end of the stream. An empty stream that is still
//! open reads 0 but reports [`is_exhausted()`](Source::is_exhausted) as
//! `false`, and the pipe answers with
//! [`PumpStatus::Starved`](crate::pipe::PumpStatus::Starved). Once the
//! producer calls [`close()`](RingBufferStream::close) and the reader has
//! drained what was left, the stream is exhausted.
//!
//! When a pipe owns the stream, the producer reaches it through
//! [`StreamPipe::source_mut`](crate::pipe::StreamPipe::source_mut) between
//! pumps.

use crate::buffer::{OverflowPolicy, SampleBuffer};
use crate::error::Result;
use crate::sample::Sample;

use super::{Sink, Source};

/// Bounded single-context FIFO of interleaved samples.
pub struct RingBufferStream<S: Sample> {
    buffer: SampleBuffer<S>,
    closed: bool,
}

impl<S: Sample> RingBufferStream<S> {
    /// Open stream holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(RingBufferStream {
            buffer: SampleBuffer::new(capacity, OverflowPolicy::Reject)?,
            closed: false,
        })
    }

    /// Samples waiting to be read.
    pub fn available(&self) -> usize {
        self.buffer.available()
    }

    /// Samples that can be written before the stream is full.
    pub fn free(&self) -> usize {
        self.buffer.free()
    }

    /// Most samples the stream can hold.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Mark the end of the stream. Buffered samples can still be read;
    /// further writes are refused.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Whether the producer has closed the stream.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Drop every buffered sample. The open/closed state is kept.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl<S: Sample> Sink<S> for RingBufferStream<S> {
    fn write_block(&mut self, buf: &[S]) -> usize {
        if self.closed {
            return 0;
        }
        let count = buf.len().min(self.buffer.free());
        for &sample in &buf[..count] {
            // count <= free(), so the rejecting push cannot fail
            let _ = self.buffer.push(sample);
        }
        count
    }
}

impl<S: Sample> Source<S> for RingBufferStream<S> {
    /// Drains what is buffered. An empty open stream reads 0 without being
    /// exhausted.
    fn read_block(&mut self, buf: &mut [S]) -> usize {
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.buffer.pop() {
                Some(sample) => *slot = sample,
                None => break,
            }
            count += 1;
        }
        count
    }

    fn is_exhausted(&self) -> bool {
        self.closed && self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            RingBufferStream::<i16>::new(0).err(),
            Some(Error::ZeroCapacity)
        );
    }

    #[test]
    fn full_stream_accepts_partial_write() {
        let mut stream = RingBufferStream::<i16>::new(4).unwrap();
        assert_eq!(stream.write_block(&[1, 2, 3]), 3);
        assert_eq!(stream.write_block(&[4, 5, 6]), 1);
        assert_eq!(stream.free(), 0);
        assert_eq!(stream.write_block(&[7]), 0);

        let mut out = [0i16; 8];
        assert_eq!(stream.read_block(&mut out), 4);
        assert_eq!(out[..4], [1, 2, 3, 4]);
        assert_eq!(stream.read_block(&mut out), 0);
    }

    #[test]
    fn wraps_around() {
        let mut stream = RingBufferStream::<i16>::new(3).unwrap();
        let mut out = [0i16; 2];
        for round in 0..5i16 {
            assert_eq!(stream.write_block(&[round, round + 100]), 2);
            assert_eq!(stream.read_block(&mut out), 2);
            assert_eq!(out, [round, round + 100]);
        }
        assert_eq!(stream.available(), 0);
    }

    #[test]
    fn empty_open_stream_is_not_exhausted() {
        let mut stream = RingBufferStream::<i16>::new(4).unwrap();
        let mut out = [0i16; 4];
        assert_eq!(stream.read_block(&mut out), 0);
        assert!(!stream.is_exhausted());

        assert_eq!(stream.write_block(&[9, 8]), 2);
        assert_eq!(stream.read_block(&mut out), 2);
        assert_eq!(out[..2], [9, 8]);
    }

    #[test]
    fn closed_stream_drains_then_ends() {
        let mut stream = RingBufferStream::<i16>::new(4).unwrap();
        stream.write_block(&[1, 2, 3]);
        stream.close();
        assert!(stream.is_closed());
        assert!(!stream.is_exhausted());
        assert_eq!(stream.write_block(&[4]), 0);

        let mut out = [0i16; 2];
        assert_eq!(stream.read_block(&mut out), 2);
        assert_eq!(stream.read_block(&mut out), 1);
        assert!(stream.is_exhausted());
        assert_eq!(stream.read_block(&mut out), 0);
    }
}
