//! dgemm-bench - Square DGEMM benchmark harness
//!
//! # About
//! dgemm-bench times candidate implementations of the dense square matrix product
//! `C := C + A * B` (double precision, column-major) over a sweep of problem sizes and checks every
//! result against a reference DGEMM.
//!
//! The following candidate kernels are available:
//! - `naive`: serial triple loop;
//! - `parallel`: triple loop with output columns partitioned over a thread team;
//! - `blocked`: cache-blocked kernel, swept over block sizes, column tiles distributed over the
//!   thread team;
//! - `reference`: the reference DGEMM itself, as a baseline.
//!
//! # Quickstart
//! ## Build
//! ```sh
//! cargo build --release
//! ```
//!
//! ## Help
//! ```sh
//! cargo run --release -- --help
//! ```
//!
//! ## Example runs
//! Sweep the default problem sizes (128, 512, 2048) and block sizes (4, 16, 64) with the blocked
//! kernel:
//! ```sh
//! cargo run --release
//! ```
//!
//! Benchmark the parallel kernel on a single 1024x1024 problem with 8 threads, and write a CSV
//! report:
//! ```sh
//! cargo run --release -- -k parallel -N 1024 -t 8 -o report.csv
//! ```
//!
//! ## Logging
//! Diagnostics go to `stderr` through [`env_logger`][1], at the `info` level by default. Use
//! `RUST_LOG=debug` for per-configuration details, or `RUST_LOG=trace --trace-regions` to trace
//! every instrumented kernel region.
//!
//! ## Exit status
//! The process exits with status `1` if any configuration diverged from the reference or if the
//! run could not complete, `0` otherwise.
//!
//! [1]: https://crates.io/crates/env_logger

pub mod cli;
pub mod config;
pub mod consts;
pub mod drivers;
pub mod error;
pub mod instrument;
pub mod kernels;
pub mod matrix;
pub mod perf_report;
pub mod team;
pub mod utils;

use crate::cli::CliArgs;

use clap::Parser;
use log::{error, info, warn};

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();

    match drivers::dgemm(&args) {
        Ok(results) => {
            let failures = results.iter().filter(|r| !r.passed).count();
            if failures == 0 {
                info!("All {} configurations match the reference", results.len());
                ExitCode::SUCCESS
            } else {
                warn!(
                    "{failures} of {} configurations diverged from the reference",
                    results.len()
                );
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
