//! Process-wide thread team.
//!
//! The team is a fixed-size [`rayon`][1] thread pool built once and reused by every kernel
//! invocation of the sweep. Each worker registers itself with the instrumentation backend as it
//! starts, before it can pick up any kernel work.
//!
//! [1]: https://crates.io/crates/rayon

use crate::{error::Result, instrument::Instrumentation};

use log::info;
use rayon::{ThreadPool, ThreadPoolBuilder};

use std::sync::Arc;

pub struct Team {
    pool: ThreadPool,
    instrumentation: Arc<dyn Instrumentation>,
}

impl Team {
    /// Builds a team of `threads` workers, or as many as the environment provides if `None`.
    pub fn new(threads: Option<usize>, instrumentation: Arc<dyn Instrumentation>) -> Result<Self> {
        let hook = Arc::clone(&instrumentation);
        let mut builder = ThreadPoolBuilder::new()
            .thread_name(|i| format!("dgemm-worker-{i}"))
            .start_handler(move |i| hook.thread_init(i));
        if let Some(threads) = threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;
        info!("Thread team ready with {} threads", pool.current_num_threads());

        Ok(Self {
            pool,
            instrumentation,
        })
    }

    /// Number of workers in the team.
    pub fn size(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn instrumentation(&self) -> &dyn Instrumentation {
        self.instrumentation.as_ref()
    }

    /// Runs `op` inside the team.
    ///
    /// Returns only once every parallel task spawned by `op` has completed, which makes the call
    /// the barrier closing the parallel region.
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }
}
