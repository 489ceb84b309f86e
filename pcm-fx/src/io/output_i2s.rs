//! DMA-driven I2S stereo output.
//!
//! [`I2sOutput`] is the sink at the end of a stereo `i16` pipeline. The pipe
//! writes interleaved frames into a bounded staging buffer; the DMA
//! completion interrupt drains one DMA block of frames per call and packs
//! them into the transmit buffer.
//!
//! ## Architecture
//!
//! ```text
//! StreamPipe                 Staging (bounded)            DMA Buffer            SAI1 TX
//! ┌───────────┐  write   ┌──────────────────────┐ isr ┌──────────────────┐    ┌─────────┐
//! │ L R L R … ├─────────►│ SampleBuffer<i16>    ├────►│ 128 × u32        ├DMA►│  TDR[0] │
//! └───────────┘          └──────────────────────┘     │ (R << 16) | L    │    └─────────┘
//!                                                     └──────────────────┘
//! ```
//!
//! A full staging buffer accepts only part of a write; the pipe keeps the
//! rest pending. If the interrupt finds fewer frames than one DMA block, the
//! missing frames are sent as silence and the underrun is counted.
//!
//! ## Usage with RTIC
//!
//! ```ignore
//! // In init: configure SAI1 + DMA, create the output and the pipe
//! let output = I2sOutput::new(4 * I2S_DMA_FRAMES, true)?;
//!
//! // In DMA ISR: fill the buffer and re-arm
//! if output.isr(&mut DMA_TX_BUFFER) { /* schedule pipe.pump() */ }
//! ```

use crate::buffer::{OverflowPolicy, SampleBuffer};
use crate::constants::I2S_DMA_FRAMES;
use crate::error::Result;

use super::interleave::{pack_stereo, silence};
use super::Sink;

/// Stereo `i16` sink feeding a DMA-driven I2S transmitter.
pub struct I2sOutput {
    /// Interleaved `[l, r, l, r, …]` frames waiting for the interrupt.
    staging: SampleBuffer<i16>,
    /// If `true`, [`isr()`](Self::isr) asks for the pipe to be pumped.
    update_responsibility: bool,
    underruns: u32,
}

impl I2sOutput {
    /// Output staging up to `capacity_frames` stereo frames.
    ///
    /// - `update_responsibility`: if `true`, this output's ISR signals that
    ///   the pipe should be pumped. Typically only one output in the system
    ///   has this responsibility.
    pub fn new(capacity_frames: usize, update_responsibility: bool) -> Result<Self> {
        Ok(I2sOutput {
            staging: SampleBuffer::new(capacity_frames * 2, OverflowPolicy::Reject)?,
            update_responsibility,
            underruns: 0,
        })
    }

    /// Handle the DMA interrupt: pack the next [`I2S_DMA_FRAMES`] frames into
    /// `dma_buffer`, padding with silence on underrun.
    ///
    /// Returns `true` when this output has update responsibility.
    pub fn isr(&mut self, dma_buffer: &mut [u32; I2S_DMA_FRAMES]) -> bool {
        let mut frames = [0i16; 2 * I2S_DMA_FRAMES];
        // Staging only ever holds whole frames
        let ready = (self.staging.available() / 2).min(I2S_DMA_FRAMES);
        for slot in frames[..2 * ready].iter_mut() {
            *slot = self.staging.pop().unwrap_or(0);
        }
        pack_stereo(&mut dma_buffer[..ready], &frames[..2 * ready]);

        if ready < I2S_DMA_FRAMES {
            silence(&mut dma_buffer[ready..]);
            self.underruns = self.underruns.saturating_add(1);
        }
        self.update_responsibility
    }

    /// Whether this output is responsible for triggering pipe updates.
    pub fn has_update_responsibility(&self) -> bool {
        self.update_responsibility
    }

    /// Frames waiting for the next interrupt.
    pub fn buffered_frames(&self) -> usize {
        self.staging.available() / 2
    }

    /// Interrupts that had to send silence.
    pub fn underruns(&self) -> u32 {
        self.underruns
    }
}

impl Sink<i16> for I2sOutput {
    /// Accepts whole frames only, as many as fit.
    fn write_block(&mut self, buf: &[i16]) -> usize {
        let count = buf.len().min(self.staging.free()) & !1;
        for &sample in &buf[..count] {
            // count <= free(), so the rejecting push cannot fail
            let _ = self.staging.push(sample);
        }
        count
    }
}
