//! Fixed-capacity circular sample buffer.
//!
//! [`SampleBuffer`] is the storage behind every stateful effect (delay lines,
//! filter history) and behind the bounded producer/consumer streams in
//! [`io`](crate::io). Storage is allocated once by the constructor and never
//! resized; no operation allocates afterwards.
//!
//! ## Indexing
//!
//! The buffer tracks a write index `head` (always `< capacity`) and the number
//! of stored samples `len`. The read index is derived as
//! `(head - len) mod capacity`, so `available() == len` can reach the full
//! capacity without a reserved slot.
//!
//! ```text
//!   read            head
//!    │               │
//!  ┌─▼─┬───┬───┬───┬─▼─┬───┐
//!  │ a │ b │ c │ d │   │   │   peek(1) = d, peek(4) = a
//!  └───┴───┴───┴───┴───┴───┘
//! ```

use alloc::boxed::Box;
use alloc::vec;

use crate::error::{Error, Result};
use crate::sample::Sample;

/// What [`SampleBuffer::push`] does when the buffer is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Drop the oldest sample (ring semantics, used by delay lines).
    Overwrite,
    /// Refuse the new sample (bounded producer/consumer semantics).
    Reject,
}

/// Circular buffer of PCM samples with a fixed capacity.
pub struct SampleBuffer<S: Sample> {
    data: Box<[S]>,
    /// Next slot to be written.
    head: usize,
    /// Number of readable samples.
    len: usize,
    policy: OverflowPolicy,
}

impl<S: Sample> SampleBuffer<S> {
    /// Create an empty buffer.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(SampleBuffer {
            data: vec![S::EQUILIBRIUM; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
            policy,
        })
    }

    /// Create an overwriting buffer whose whole history reads as silence.
    ///
    /// This is the starting state of a delay line or filter history: every
    /// offset up to `capacity - 1` is immediately peekable.
    pub fn silent(capacity: usize) -> Result<Self> {
        let mut buffer = Self::new(capacity, OverflowPolicy::Overwrite)?;
        buffer.len = capacity;
        Ok(buffer)
    }

    /// Write one sample at the write index.
    ///
    /// Under [`OverflowPolicy::Reject`] a full buffer returns
    /// [`Error::BufferOverflow`] and is left untouched.
    #[inline]
    pub fn push(&mut self, sample: S) -> Result<()> {
        let capacity = self.data.len();
        if self.len == capacity {
            match self.policy {
                OverflowPolicy::Reject => return Err(Error::BufferOverflow { capacity }),
                // Oldest sample sits at `head` when full; it is overwritten below.
                OverflowPolicy::Overwrite => self.len -= 1,
            }
        }
        self.data[self.head] = sample;
        self.head = (self.head + 1) % capacity;
        self.len += 1;
        Ok(())
    }

    /// Read and consume the oldest sample, or `None` when empty.
    #[inline]
    pub fn pop(&mut self) -> Option<S> {
        if self.len == 0 {
            return None;
        }
        let sample = self.data[self.read_index()];
        self.len -= 1;
        Some(sample)
    }

    /// Read the sample `offset` positions behind the write index without
    /// consuming anything. `peek(1)` is the most recently pushed sample.
    ///
    /// Offsets of zero, beyond the stored history, or at/after the capacity
    /// are contract violations and return [`Error::BufferUnderflow`].
    pub fn peek(&self, offset: usize) -> Result<S> {
        if offset == 0 || offset > self.len || offset >= self.data.len() {
            return Err(Error::BufferUnderflow {
                offset,
                available: self.len,
            });
        }
        Ok(self.data[self.behind_head(offset)])
    }

    /// Same as [`peek`](Self::peek) for callers whose offsets were validated
    /// at configuration time.
    ///
    /// # Panics
    ///
    /// Panics on an out-of-range offset rather than returning stale data.
    #[inline]
    pub fn history(&self, offset: usize) -> S {
        assert!(
            offset != 0 && offset <= self.len && offset < self.data.len(),
            "sample history offset {} out of range (len {}, capacity {})",
            offset,
            self.len,
            self.data.len()
        );
        self.data[self.behind_head(offset)]
    }

    /// Number of readable samples.
    #[inline]
    pub fn available(&self) -> usize {
        self.len
    }

    /// Number of slots still free.
    #[inline]
    pub fn free(&self) -> usize {
        self.data.len() - self.len
    }

    /// Total number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` when every slot holds a sample.
    pub fn is_full(&self) -> bool {
        self.len == self.data.len()
    }

    /// What a push into a full buffer does.
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Discard all stored samples.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Zero the storage and make the full history read as silence again.
    pub fn reset(&mut self) {
        self.data.fill(S::EQUILIBRIUM);
        self.head = 0;
        self.len = self.data.len();
    }

    #[inline]
    fn read_index(&self) -> usize {
        let capacity = self.data.len();
        (self.head + capacity - self.len) % capacity
    }

    #[inline]
    fn behind_head(&self, offset: usize) -> usize {
        let capacity = self.data.len();
        (self.head + capacity - offset) % capacity
    }
}
