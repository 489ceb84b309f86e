//! Crate error type.
//!
//! Configuration problems are reported while the pipeline is being built,
//! before any audio flows. Buffer contract violations are reported by the
//! checked [`SampleBuffer`](crate::buffer::SampleBuffer) operations.
//! End of stream is not an error; see [`PumpStatus`](crate::pipe::PumpStatus).

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid setup parameters, surfaced before the pipe becomes active.
    Configuration,
    /// Push into a full, non-overwriting buffer.
    BufferOverflow,
    /// Read beyond the history a buffer holds.
    BufferUnderflow,
}

/// Errors reported by this crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A buffer was requested with zero capacity.
    #[error("buffer capacity must be at least one sample")]
    ZeroCapacity,

    /// A delay does not fit the delay line (or is shorter than one sample).
    #[error("delay of {requested} samples is outside 1..={max} samples")]
    DelayOutOfRange { requested: f32, max: usize },

    /// The modulation window of a modulated delay is empty or inverted.
    #[error("modulation range {min}..={max} samples is invalid")]
    InvalidModulation { min: f32, max: f32 },

    /// Filter coefficients are missing, non-finite or not normalizable.
    #[error("invalid filter coefficients: {0}")]
    InvalidCoefficients(&'static str),

    /// The filter needs more history than the crate supports.
    #[error("filter order {order} exceeds the maximum of {max}")]
    FilterOrderTooLarge { order: usize, max: usize },

    /// Bit depth other than 8, 16, 24 or 32.
    #[error("unsupported bit depth: {0} bits")]
    UnsupportedBitDepth(u8),

    /// The configured bit depth does not match the pipeline's sample type.
    #[error("configured bit depth {configured} does not match the {actual}-bit sample type")]
    BitDepthMismatch { configured: u8, actual: u8 },

    /// Zero channels, or more than the crate supports.
    #[error("invalid channel count: {0}")]
    InvalidChannelCount(usize),

    /// Zero sample rate.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// Zero or oversized working block.
    #[error("invalid block size: {0} frames")]
    InvalidBlockSize(usize),

    /// A pipe was given a different number of chains than channels.
    #[error("{chains} effect chains supplied for {channels} channels")]
    ChainCountMismatch { chains: usize, channels: usize },

    /// A floating-point parameter was NaN or infinite.
    #[error("parameter `{0}` must be finite")]
    NonFiniteParameter(&'static str),

    /// Push into a full buffer under the rejecting policy.
    #[error("buffer overflow: all {capacity} slots are occupied")]
    BufferOverflow { capacity: usize },

    /// Peek past the history the buffer holds.
    #[error("buffer underflow: offset {offset} requested, {available} samples of history")]
    BufferUnderflow { offset: usize, available: usize },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BufferOverflow { .. } => ErrorKind::BufferOverflow,
            Error::BufferUnderflow { .. } => ErrorKind::BufferUnderflow,
            _ => ErrorKind::Configuration,
        }
    }

    /// `true` for errors raised while configuring a pipeline.
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Reject NaN and infinities for a named parameter.
pub(crate) fn ensure_finite(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::NonFiniteParameter(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn kinds_are_classified() {
        assert_eq!(Error::BufferOverflow { capacity: 4 }.kind(), ErrorKind::BufferOverflow);
        assert_eq!(
            Error::BufferUnderflow { offset: 9, available: 3 }.kind(),
            ErrorKind::BufferUnderflow
        );
        assert!(Error::UnsupportedBitDepth(12).is_configuration());
        assert!(!Error::BufferOverflow { capacity: 1 }.is_configuration());
    }

    #[test]
    fn messages_name_the_values() {
        let msg = Error::DelayOutOfRange { requested: 300.0, max: 256 }.to_string();
        assert!(msg.contains("300"), "{msg}");
        assert!(msg.contains("256"), "{msg}");
    }

    #[test]
    fn finite_check() {
        assert!(ensure_finite("mix", 0.5).is_ok());
        assert_eq!(
            ensure_finite("mix", f32::NAN),
            Err(Error::NonFiniteParameter("mix"))
        );
    }
}
