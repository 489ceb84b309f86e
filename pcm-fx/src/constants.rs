/// Default pipeline sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default number of interleaved channels.
pub const DEFAULT_CHANNELS: usize = 2;

/// Default number of frames per working block.
pub const DEFAULT_BLOCK_FRAMES: usize = 128;

/// Consecutive zero-progress sink writes tolerated per pump before yielding.
pub const DEFAULT_WRITE_ATTEMPTS: u32 = 4;

/// Largest channel count a pipeline accepts.
pub const MAX_CHANNELS: usize = 16;

/// Largest working block, in frames.
pub const MAX_BLOCK_FRAMES: usize = 4096;

/// Largest IIR filter order (history length per direction).
pub const MAX_IIR_ORDER: usize = 16;

/// Upper bound on any delay line length, in samples (about 23.8 s at 44.1 kHz).
pub const MAX_DELAY_SAMPLES: usize = 1 << 20;

/// Frames per I2S DMA transfer.
pub const I2S_DMA_FRAMES: usize = 128;
