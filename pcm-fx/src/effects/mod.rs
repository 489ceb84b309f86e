//! Per-sample audio effects.
//!
//! Every effect implements [`Effect`]: one sample in, one sample out, with
//! whatever persistent state the effect needs held inside the instance. An
//! instance processes exactly one channel; multi-channel pipelines build one
//! instance per channel so no channel ever sees another's history.
//!
//! | Effect | State | Description |
//! |--------|-------|-------------|
//! | [`Delay`] | delay line | Fixed (possibly fractional) delay with feedback and dry/wet mix |
//! | [`Flanger`] | delay line + LFO | Sine-modulated delay (flanger / chorus) |
//! | [`IirFilter`] | input/output history | Direct-form I recursive filter |
//! | [`Gain`] | none | Fixed-point volume with saturation |
//! | [`Scaler`] | none | Offset, factor and symmetric clip limit |
//! | [`AutoCenter`] | running mean | Removes the DC offset measured over an opening window |
//!
//! All storage is allocated by the constructors. `process()` never allocates,
//! locks or blocks, and costs a bounded amount of work per call.

mod auto_center;
mod delay;
mod flanger;
mod gain;
mod iir;
mod scaler;

pub use auto_center::AutoCenter;
pub use delay::Delay;
pub use flanger::Flanger;
pub use gain::Gain;
pub use iir::IirFilter;
pub use scaler::Scaler;

use crate::sample::Sample;

/// One stage of sample-by-sample processing.
pub trait Effect<S: Sample>: Send {
    /// Transform one input sample, updating internal state.
    fn process(&mut self, sample: S) -> S;

    /// Return to the just-constructed state (silence in all history).
    fn reset(&mut self);

    /// Short human-readable name, used in logs.
    fn name(&self) -> &'static str;

    /// Transform a block of one channel's samples in place.
    fn process_block(&mut self, block: &mut [S]) {
        for sample in block.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}

impl<S: Sample, E: Effect<S> + ?Sized> Effect<S> for alloc::boxed::Box<E> {
    #[inline]
    fn process(&mut self, sample: S) -> S {
        (**self).process(sample)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn process_block(&mut self, block: &mut [S]) {
        (**self).process_block(block)
    }
}
