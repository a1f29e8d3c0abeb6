//! Optional region instrumentation.
//!
//! The benchmark brackets its work with marker calls in the style of hardware-counter APIs:
//! process-wide `init`/`close` around the whole run, one `thread_init` per worker thread before any
//! timed work, and `start`/`stop` around each partition of each kernel invocation. Every hook
//! defaults to a no-op, so a profiling backend only overrides what it needs.

use log::trace;

use std::time::Instant;

/// Marker API injected into the driver and kernels.
pub trait Instrumentation: Send + Sync {
    /// Called once before any benchmark work.
    fn init(&self) {}

    /// Called once after the whole sweep.
    fn close(&self) {}

    /// Called once on each worker thread, before it runs any kernel work.
    fn thread_init(&self, _thread_id: usize) {}

    /// Opens `region` on the calling thread.
    fn start(&self, _region: &str) {}

    /// Closes `region` on the calling thread.
    fn stop(&self, _region: &str) {}
}

/// Instrumentation that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInstrumentation;

impl Instrumentation for NoInstrumentation {}

/// Instrumentation that traces region spans through the `log` facade.
#[derive(Debug)]
pub struct LogInstrumentation {
    epoch: Instant,
}

impl LogInstrumentation {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    fn stamp(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

impl Default for LogInstrumentation {
    fn default() -> Self {
        Self::new()
    }
}

impl Instrumentation for LogInstrumentation {
    fn init(&self) {
        trace!("[{:.6}] instrumentation initialized", self.stamp());
    }

    fn close(&self) {
        trace!("[{:.6}] instrumentation closed", self.stamp());
    }

    fn thread_init(&self, thread_id: usize) {
        trace!("[{:.6}] thread {thread_id} registered", self.stamp());
    }

    fn start(&self, region: &str) {
        trace!(
            "[{:.6}] start `{region}` on thread {:?}",
            self.stamp(),
            rayon::current_thread_index()
        );
    }

    fn stop(&self, region: &str) {
        trace!(
            "[{:.6}] stop `{region}` on thread {:?}",
            self.stamp(),
            rayon::current_thread_index()
        );
    }
}
