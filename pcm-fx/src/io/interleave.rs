//! Interleave/deinterleave utilities.
//!
//! Two layouts meet here:
//!
//! - **Interleaved blocks** as exchanged by sources, sinks and the stream
//!   pipe: frame after frame, one sample per channel, `[c0, c1, …, cN-1,
//!   c0, c1, …]`.
//! - **Packed stereo DMA words** as used by the I2S transmitter. Each `u32`
//!   holds one 16-bit stereo frame:
//!   - Lower 16 bits (bits 0–15): left channel sample (`i16`)
//!   - Upper 16 bits (bits 16–31): right channel sample (`i16`)
//!
//!   On little-endian ARM this is `[left, right]` as consecutive `i16`
//!   values in memory, matching the SAI I2S frame format.

use crate::sample::Sample;

/// Pack one stereo frame: `(right << 16) | (left & 0xFFFF)`.
#[inline(always)]
pub fn pack_lr(left: i16, right: i16) -> u32 {
    (left as u16 as u32) | ((right as u16 as u32) << 16)
}

/// Split a packed stereo frame into `(left, right)`.
#[inline(always)]
pub fn unpack_lr(word: u32) -> (i16, i16) {
    (word as i16, (word >> 16) as i16)
}

/// Pack interleaved stereo samples `[l, r, l, r, …]` into DMA words.
///
/// # Panics
///
/// Debug-asserts that `frames` holds exactly two samples per destination word.
pub fn pack_stereo(dest: &mut [u32], frames: &[i16]) {
    debug_assert_eq!(frames.len(), dest.len() * 2);

    for (word, frame) in dest.iter_mut().zip(frames.chunks_exact(2)) {
        *word = pack_lr(frame[0], frame[1]);
    }
}

/// Unpack DMA words into interleaved stereo samples.
///
/// # Panics
///
/// Debug-asserts that `frames` has room for two samples per source word.
pub fn unpack_stereo(src: &[u32], frames: &mut [i16]) {
    debug_assert_eq!(frames.len(), src.len() * 2);

    for (&word, frame) in src.iter().zip(frames.chunks_exact_mut(2)) {
        let (left, right) = unpack_lr(word);
        frame[0] = left;
        frame[1] = right;
    }
}

/// Fill a region of the DMA buffer with silence (zero for both channels).
pub fn silence(dest: &mut [u32]) {
    dest.fill(0);
}

/// Copy channel `channel` of an interleaved block into `dest`. Returns the
/// number of frames copied (the shorter of the two).
pub fn extract_channel<S: Sample>(
    block: &[S],
    channels: usize,
    channel: usize,
    dest: &mut [S],
) -> usize {
    debug_assert!(channel < channels);

    let mut copied = 0;
    for (frame, out) in block.chunks_exact(channels).zip(dest.iter_mut()) {
        *out = frame[channel];
        copied += 1;
    }
    copied
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_places_left_low() {
        let word = pack_lr(100, -600);
        assert_eq!(word as i16, 100);
        assert_eq!((word >> 16) as i16, -600);
        assert_eq!(unpack_lr(word), (100, -600));
    }

    #[test]
    fn pack_stereo_basic() {
        let frames = [100i16, 500, -200, -600];
        let mut dest = [0u32; 2];

        pack_stereo(&mut dest, &frames);

        assert_eq!(dest[0], (100u16 as u32) | ((500u16 as u32) << 16));
        assert_eq!(
            dest[1],
            ((-200i16 as u16) as u32) | (((-600i16 as u16) as u32) << 16)
        );
    }

    #[test]
    fn extreme_values_survive_packing() {
        let frames = [i16::MIN, i16::MAX, i16::MAX, i16::MIN, -1, 0, 0, -1];
        let mut packed = [0u32; 4];
        pack_stereo(&mut packed, &frames);

        let mut out = [0i16; 8];
        unpack_stereo(&packed, &mut out);
        assert_eq!(out, frames);
    }

    #[test]
    fn silence_zeroes_buffer() {
        let mut buf = [0xDEAD_BEEFu32; 8];
        silence(&mut buf);
        assert!(buf.iter().all(|&x| x == 0));
    }

    #[test]
    fn extract_channel_from_block() {
        // 3 channels, 3 frames
        let block = [1i16, 2, 3, 11, 12, 13, 21, 22, 23];
        let mut mid = [0i16; 3];
        assert_eq!(extract_channel(&block, 3, 1, &mut mid), 3);
        assert_eq!(mid, [2, 12, 22]);

        let mut last = [0i16; 2];
        assert_eq!(extract_channel(&block, 3, 2, &mut last), 2);
        assert_eq!(last, [3, 13]);
    }

    #[test]
    fn extract_ignores_trailing_partial_frame() {
        let block = [1i16, 2, 3, 4, 5];
        let mut left = [0i16; 4];
        assert_eq!(extract_channel(&block, 2, 0, &mut left), 2);
        assert_eq!(left[..2], [1, 3]);
    }
}
