//! Ordered effect chain for one channel.
//!
//! An [`EffectChain`] applies its effects in insertion order, so processing a
//! sample is the composition `f_n ∘ … ∘ f_1`. Chains implement [`Effect`]
//! themselves and can be nested; grouping does not change the result, but
//! reordering generally does.
//!
//! Structural changes ([`add`](EffectChain::add),
//! [`remove`](EffectChain::remove), [`clear`](EffectChain::clear)) take
//! `&mut self`. Changing a chain from another execution context than the one
//! running the audio therefore needs external synchronization (a lock, or a
//! message handed to the audio context); the chain provides none itself.
//! Removal is abrupt: the next sample is processed without the effect, with
//! no crossfade.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::context::{ctx_debug, Context};
use crate::effects::Effect;
use crate::sample::Sample;

/// Handle returned by [`EffectChain::add`], used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u32);

impl EffectId {
    /// The numeric handle.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Effects applied to one channel, in order.
///
/// # Example
/// ```ignore
/// let mut chain = EffectChain::<i16>::new();
/// let echo = chain.add(Delay::new(4410.0, 4410.0, 0.4, 0.3)?);
/// chain.add(IirFilter::new(&[0.2, 0.2], &[1.0])?);
///
/// let y = chain.process(x);
/// chain.remove(echo);
/// ```
pub struct EffectChain<S: Sample> {
    effects: Vec<(EffectId, Box<dyn Effect<S>>)>,
    next_id: u32,
    ctx: Context,
}

impl<S: Sample> EffectChain<S> {
    /// Empty chain (identity), logging nothing.
    pub fn new() -> Self {
        Self::with_context(Context::silent())
    }

    /// Empty chain reporting structural changes through `ctx`.
    pub fn with_context(ctx: Context) -> Self {
        EffectChain {
            effects: Vec::new(),
            next_id: 0,
            ctx,
        }
    }

    /// Pre-allocate room for `capacity` effects so later `add` calls do not
    /// reallocate.
    pub fn with_capacity(ctx: Context, capacity: usize) -> Self {
        EffectChain {
            effects: Vec::with_capacity(capacity),
            next_id: 0,
            ctx,
        }
    }

    /// Append an effect at the end of the chain.
    pub fn add(&mut self, effect: impl Effect<S> + 'static) -> EffectId {
        self.add_boxed(Box::new(effect))
    }

    /// Append an already boxed effect.
    pub fn add_boxed(&mut self, effect: Box<dyn Effect<S>>) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        ctx_debug!(
            self.ctx,
            "chain: added {} {} at position {}",
            effect.name(),
            id,
            self.effects.len()
        );
        self.effects.push((id, effect));
        id
    }

    /// Remove the effect behind `id` and hand it back. Subsequent samples are
    /// processed without it.
    pub fn remove(&mut self, id: EffectId) -> Option<Box<dyn Effect<S>>> {
        let index = self.effects.iter().position(|(eid, _)| *eid == id)?;
        let (_, effect) = self.effects.remove(index);
        ctx_debug!(self.ctx, "chain: removed {} {}", effect.name(), id);
        Some(effect)
    }

    /// Remove every effect; the chain becomes the identity.
    pub fn clear(&mut self) {
        if !self.effects.is_empty() {
            ctx_debug!(self.ctx, "chain: cleared {} effects", self.effects.len());
        }
        self.effects.clear();
    }

    /// Number of effects in the chain.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// `true` when the chain passes samples through unchanged.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Whether `id` is still in the chain.
    pub fn contains(&self, id: EffectId) -> bool {
        self.effects.iter().any(|(eid, _)| *eid == id)
    }

    /// Handles in processing order.
    pub fn ids(&self) -> impl Iterator<Item = EffectId> + '_ {
        self.effects.iter().map(|(id, _)| *id)
    }

    /// Names in processing order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.effects.iter().map(|(_, e)| e.name())
    }
}

impl<S: Sample> Default for EffectChain<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sample> Effect<S> for EffectChain<S> {
    #[inline]
    fn process(&mut self, sample: S) -> S {
        self.effects
            .iter_mut()
            .fold(sample, |acc, (_, effect)| effect.process(acc))
    }

    fn reset(&mut self) {
        for (_, effect) in self.effects.iter_mut() {
            effect.reset();
        }
    }

    fn name(&self) -> &'static str {
        "chain"
    }

    /// Sample-major: each sample passes the whole chain before the next one
    /// enters, matching repeated [`process`](Effect::process) calls.
    fn process_block(&mut self, block: &mut [S]) {
        if self.effects.is_empty() {
            return;
        }
        for sample in block.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}

impl<S: Sample> fmt::Debug for EffectChain<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.effects.iter().map(|(id, e)| (id, e.name())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_logger::CaptureLogger;
    use crate::effects::{Delay, Gain, IirFilter};
    use alloc::vec;

    fn run(chain: &mut EffectChain<i16>, input: &[i16]) -> Vec<i16> {
        input.iter().map(|&x| chain.process(x)).collect()
    }

    fn feedback_delay() -> Delay<i16> {
        Delay::new(2.0, 2.0, 0.5, 1.0).unwrap()
    }

    fn averaging_lowpass() -> IirFilter<i16> {
        IirFilter::new(&[0.5, 0.5], &[1.0]).unwrap()
    }

    #[test]
    fn empty_chain_is_identity() {
        let mut chain = EffectChain::<i16>::new();
        let input = [0, 1, -1, i16::MAX, i16::MIN, 1234];
        assert_eq!(run(&mut chain, &input), input.to_vec());
        assert!(chain.is_empty());
    }

    #[test]
    fn ids_are_unique_and_ordered() {
        let mut chain = EffectChain::<i16>::new();
        let a = chain.add(Gain::unity());
        let b = chain.add(Gain::unity());
        assert_ne!(a, b);
        assert_eq!(chain.ids().collect::<Vec<_>>(), vec![a, b]);
        chain.remove(a);
        let c = chain.add(Gain::unity());
        assert_ne!(c, a, "removed ids are not reused");
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn order_matters() {
        let ramp: [i16; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

        let mut delay_then_filter = EffectChain::new();
        delay_then_filter.add(feedback_delay());
        delay_then_filter.add(averaging_lowpass());

        let mut filter_then_delay = EffectChain::new();
        filter_then_delay.add(averaging_lowpass());
        filter_then_delay.add(feedback_delay());

        // Delay stores w = x + 0.5 d, rounded: 1 2 4 5 7 9 11 13
        let a = run(&mut delay_then_filter, &ramp);
        assert_eq!(a, [0, 0, 1, 2, 3, 5, 6, 8]);

        // Averaging the ramp rounds half away from zero and returns the ramp
        let b = run(&mut filter_then_delay, &ramp);
        assert_eq!(b, [0, 0, 1, 2, 4, 5, 7, 9]);

        assert_ne!(a, b);
    }

    #[test]
    fn grouping_does_not_matter() {
        let input: Vec<i16> = (0..64).map(|i| ((i * 731) % 4000) as i16 - 2000).collect();

        // A, (B, C)
        let mut inner = EffectChain::new();
        inner.add(averaging_lowpass());
        inner.add(Gain::new(0.5).unwrap());
        let mut right = EffectChain::new();
        right.add(feedback_delay());
        right.add(inner);

        // (A, B), C
        let mut inner = EffectChain::new();
        inner.add(feedback_delay());
        inner.add(averaging_lowpass());
        let mut left = EffectChain::new();
        left.add(inner);
        left.add(Gain::new(0.5).unwrap());

        assert_eq!(run(&mut right, &input), run(&mut left, &input));
    }

    #[test]
    fn removing_last_effect_mid_stream() {
        let mut chain = EffectChain::new();
        chain.add(Delay::new(2.0, 2.0, 0.0, 1.0).unwrap());
        let gain = chain.add(Gain::new(3.0).unwrap());

        assert_eq!(run(&mut chain, &[10, 20, 30, 40]), [0, 0, 30, 60]);
        let removed = chain.remove(gain).expect("gain was in the chain");
        assert_eq!(removed.name(), "gain");
        assert_eq!(run(&mut chain, &[50, 60]), [30, 40]);
        assert!(chain.remove(gain).is_none());
    }

    #[test]
    fn removing_stateful_effect_mid_stream() {
        let mut chain = EffectChain::new();
        let delay = chain.add(Delay::new(2.0, 2.0, 0.9, 1.0).unwrap());
        chain.add(Gain::new(3.0).unwrap());

        assert_eq!(run(&mut chain, &[10, 20, 30]), [0, 0, 30]);
        chain.remove(delay);
        // No delayed energy survives the removal
        assert_eq!(run(&mut chain, &[0, 0, 5]), [0, 0, 15]);
        assert!(!chain.contains(delay));
    }

    #[test]
    fn clear_restores_identity() {
        let mut chain = EffectChain::new();
        chain.add(Gain::new(2.0).unwrap());
        chain.add(feedback_delay());
        chain.clear();
        assert!(chain.is_empty());
        assert_eq!(run(&mut chain, &[7, 8, 9]), [7, 8, 9]);
    }

    #[test]
    fn block_processing_matches_per_sample() {
        let input: Vec<i16> = (0..32).map(|i| (i * 100) as i16).collect();

        let mut per_sample = EffectChain::new();
        per_sample.add(feedback_delay());
        per_sample.add(averaging_lowpass());
        let expected = run(&mut per_sample, &input);

        let mut per_block = EffectChain::new();
        per_block.add(feedback_delay());
        per_block.add(averaging_lowpass());
        let mut block = input.clone();
        per_block.process_block(&mut block[..13]);
        per_block.process_block(&mut block[13..]);

        assert_eq!(block, expected);
    }

    #[test]
    fn reset_reaches_every_effect() {
        let mut chain = EffectChain::new();
        chain.add(feedback_delay());
        chain.add(IirFilter::new(&[1.0], &[1.0, -0.5]).unwrap());
        run(&mut chain, &[1000, 1000, 1000]);
        chain.reset();
        assert_eq!(run(&mut chain, &[0, 0, 0, 0]), [0, 0, 0, 0]);
    }

    #[test]
    fn structural_changes_are_logged() {
        static LOGGER: CaptureLogger = CaptureLogger::new();
        let ctx = Context::new(&LOGGER)
            .with_target("chain-log")
            .with_max_level(log::LevelFilter::Debug);

        let mut chain = EffectChain::<i16>::with_context(ctx);
        let id = chain.add(Gain::unity());
        chain.remove(id);
        chain.add(feedback_delay());
        chain.clear();

        let messages: Vec<_> = LOGGER
            .messages("chain-log")
            .into_iter()
            .map(|(_, m)| m)
            .collect();
        assert_eq!(
            messages,
            vec![
                "chain: added gain #0 at position 0",
                "chain: removed gain #0",
                "chain: added delay #1 at position 0",
                "chain: cleared 1 effects",
            ]
        );
    }
}
