//! DSP math shared by the effects.
//!
//! - [`intrinsics`]: saturation primitives with ARM `SSAT` fast paths
//! - [`helpers`]: dry/wet mixing, interpolation and time conversion
//! - [`lfo`]: phase-accumulator sine oscillator for modulated delays

pub mod helpers;
pub mod intrinsics;
pub mod lfo;
