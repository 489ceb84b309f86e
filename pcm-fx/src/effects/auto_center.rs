//! DC offset removal.
//!
//! [`AutoCenter`] measures the mean of the first `window` samples it sees and
//! subtracts that mean from everything after. The samples inside the window
//! pass through unchanged, so the effect stays causal and adds no latency.

use crate::error::{Error, Result};
use crate::sample::Sample;

use super::Effect;

/// Centers a channel on zero using the mean of its opening samples.
#[derive(Debug, Clone)]
pub struct AutoCenter {
    window: u32,
    seen: u32,
    sum: i64,
    /// Measured offset; `None` while the window is still filling.
    offset: Option<i64>,
}

impl AutoCenter {
    /// Measure the offset over the first `window` samples.
    pub fn new(window: u32) -> Result<Self> {
        if window == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(AutoCenter {
            window,
            seen: 0,
            sum: 0,
            offset: None,
        })
    }

    /// Samples averaged before correction starts.
    pub fn window(&self) -> u32 {
        self.window
    }

    /// The offset being removed, once measured.
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }
}

impl<S: Sample> Effect<S> for AutoCenter {
    #[inline]
    fn process(&mut self, sample: S) -> S {
        let x = sample.to_i64();
        match self.offset {
            Some(offset) => S::saturate_from_i64(x - offset),
            None => {
                self.sum = self.sum.saturating_add(x);
                self.seen += 1;
                if self.seen == self.window {
                    let mean = libm::round(self.sum as f64 / self.window as f64);
                    self.offset = Some(mean as i64);
                }
                sample
            }
        }
    }

    /// Forget the measured offset and start a new window.
    fn reset(&mut self) {
        self.seen = 0;
        self.sum = 0;
        self.offset = None;
    }

    fn name(&self) -> &'static str {
        "auto_center"
    }
}
