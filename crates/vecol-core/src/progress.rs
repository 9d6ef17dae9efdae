//! Progress reporting and cooperative cancellation seams.
//!
//! Both are injected by the caller. The samplers never touch global
//! state: a [`ProgressSink`] receives ticks from the collecting thread
//! only, and a [`CancelToken`] is polled before each unit of work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receiver for progress ticks.
///
/// Called from the thread that assembles results, never from workers, so
/// implementations need not be `Sync`. Ticks have no effect on output.
pub trait ProgressSink {
    /// A run of `total` units is starting.
    fn begin(&mut self, total: usize);

    /// One more unit has completed.
    fn tick(&mut self);

    /// All units completed.
    fn finish(&mut self) {}
}

/// Progress sink that ignores everything. The default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn begin(&mut self, _total: usize) {}
    fn tick(&mut self) {}
}

/// Adapts a closure `(done, total)` into a [`ProgressSink`].
pub struct ProgressFn<F: FnMut(usize, usize)> {
    f: F,
    done: usize,
    total: usize,
}

impl<F: FnMut(usize, usize)> ProgressFn<F> {
    /// Wrap a callback invoked after every tick.
    pub fn new(f: F) -> Self {
        Self { f, done: 0, total: 0 }
    }
}

impl<F: FnMut(usize, usize)> ProgressSink for ProgressFn<F> {
    fn begin(&mut self, total: usize) {
        self.done = 0;
        self.total = total;
    }

    fn tick(&mut self) {
        self.done += 1;
        (self.f)(self.done, self.total);
    }
}

/// Shared cooperative cancellation flag.
///
/// Clones observe the same flag. Once cancelled, a run in progress stops
/// at the next unit boundary and returns no rows.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancel: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }
}
