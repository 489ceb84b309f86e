//! In-memory sources and sinks.
//!
//! [`MemorySource`] plays back a buffer the application already holds
//! (a decoded clip, a test vector). [`MemorySink`] records whatever reaches
//! it. Both can be throttled to model short reads and backpressure.

use alloc::vec::Vec;

use crate::sample::Sample;

use super::{Sink, Source};

/// Plays back an owned buffer of interleaved samples.
///
/// # Example
/// ```ignore
/// let source = MemorySource::new(decoded_pcm).with_chunk_limit(64);
/// ```
pub struct MemorySource<S: Sample> {
    data: Vec<S>,
    position: usize,
    /// Largest number of samples handed out per read.
    chunk_limit: Option<usize>,
}

impl<S: Sample> MemorySource<S> {
    /// Source that plays `data` once.
    pub fn new(data: impl Into<Vec<S>>) -> Self {
        MemorySource {
            data: data.into(),
            position: 0,
            chunk_limit: None,
        }
    }

    /// Never return more than `limit` samples from one read.
    pub fn with_chunk_limit(mut self, limit: usize) -> Self {
        self.chunk_limit = Some(limit.max(1));
        self
    }

    /// Samples not yet read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Start again from the beginning.
    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

impl<S: Sample> Source<S> for MemorySource<S> {
    fn read_block(&mut self, buf: &mut [S]) -> usize {
        let mut count = buf.len().min(self.remaining());
        if let Some(limit) = self.chunk_limit {
            count = count.min(limit);
        }
        buf[..count].copy_from_slice(&self.data[self.position..self.position + count]);
        self.position += count;
        count
    }
}

/// Collects every sample written to it.
#[derive(Default)]
pub struct MemorySink<S: Sample> {
    data: Vec<S>,
    /// Largest number of samples accepted per write; `Some(0)` refuses all.
    write_limit: Option<usize>,
    writes: usize,
}

impl<S: Sample> MemorySink<S> {
    /// Sink that accepts everything.
    pub fn new() -> Self {
        MemorySink {
            data: Vec::new(),
            write_limit: None,
            writes: 0,
        }
    }

    /// Pre-allocate room for `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        MemorySink {
            data: Vec::with_capacity(capacity),
            write_limit: None,
            writes: 0,
        }
    }

    /// Accept at most `limit` samples per write.
    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Change (or lift, with `None`) the per-write limit.
    pub fn set_write_limit(&mut self, limit: Option<usize>) {
        self.write_limit = limit;
    }

    /// Everything accepted so far.
    pub fn samples(&self) -> &[S] {
        &self.data
    }

    /// Number of `write_block` calls, including refused ones.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Everything written so far.
    pub fn into_inner(self) -> Vec<S> {
        self.data
    }
}

impl<S: Sample> Sink<S> for MemorySink<S> {
    fn write_block(&mut self, buf: &[S]) -> usize {
        self.writes += 1;
        let count = match self.write_limit {
            Some(limit) => buf.len().min(limit),
            None => buf.len(),
        };
        self.data.extend_from_slice(&buf[..count]);
        count
    }
}

/// Accepts and discards everything, counting samples.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink {
    samples: u64,
}

impl NullSink {
    /// Sink that has seen nothing yet.
    pub const fn new() -> Self {
        NullSink { samples: 0 }
    }

    /// Total samples discarded.
    pub fn samples(&self) -> u64 {
        self.samples
    }
}

impl<S: Sample> Sink<S> for NullSink {
    fn write_block(&mut self, buf: &[S]) -> usize {
        self.samples += buf.len() as u64;
        buf.len()
    }
}
