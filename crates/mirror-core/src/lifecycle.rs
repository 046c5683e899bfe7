//! Request timing.

use std::time::{Duration, Instant};

/// Timing context for a single request.
#[derive(Debug, Clone, Copy)]
pub struct TimingContext {
    start: Instant,
}

impl TimingContext {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time since the request started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed whole milliseconds since the request started.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}
