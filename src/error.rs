//! Error types.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that abort a benchmark run.
///
/// Accuracy mismatches are not errors: they are recorded in the results and the sweep goes on.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("failed to allocate {count} values for a {n}x{n} problem: {source}")]
    Allocation {
        n: usize,
        count: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("a {n}x{n} problem does not fit in the address space")]
    SizeOverflow { n: usize },

    #[error("failed to build thread team: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;
