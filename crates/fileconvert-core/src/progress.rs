//! Progress reporting contract.
//!
//! A conversion reports integer percentages in [0,100]. Within one
//! conversion the delivered sequence is monotonically non-decreasing; the
//! router enforces this by wrapping the caller's sink in [`MonotonicProgress`].

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

/// Narrow sink for conversion progress. Implementations must not panic.
pub trait ProgressSink: Sync {
    fn report(&self, percent: u8);
}

/// Discards all progress reports.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _percent: u8) {}
}

/// Adapts a closure to a [`ProgressSink`].
pub struct FnProgress<F: Fn(u8) + Sync>(pub F);

impl<F: Fn(u8) + Sync> ProgressSink for FnProgress<F> {
    fn report(&self, percent: u8) {
        (self.0)(percent);
    }
}

/// Records every reported value; test spy.
#[derive(Default)]
pub struct CollectingProgress {
    values: Mutex<Vec<u8>>,
}

impl CollectingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Vec<u8> {
        self.values.lock().unwrap().clone()
    }
}

impl ProgressSink for CollectingProgress {
    fn report(&self, percent: u8) {
        self.values.lock().unwrap().push(percent);
    }
}

/// Clamps reports to [0,100] and suppresses regressions, so a misbehaving
/// strategy cannot violate the monotonicity contract downstream.
pub struct MonotonicProgress<'a> {
    inner: &'a dyn ProgressSink,
    high_water: AtomicU8,
}

impl<'a> MonotonicProgress<'a> {
    pub fn new(inner: &'a dyn ProgressSink) -> Self {
        Self {
            inner,
            high_water: AtomicU8::new(0),
        }
    }
}

impl ProgressSink for MonotonicProgress<'_> {
    fn report(&self, percent: u8) {
        let percent = percent.min(100);
        let prev = self.high_water.fetch_max(percent, Ordering::Relaxed);
        if percent >= prev {
            self.inner.report(percent);
        }
    }
}
