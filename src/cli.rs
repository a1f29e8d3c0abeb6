//! Command-Line Interface related code.
//!
//! This module handles the parsing of CLI arguments using the [`clap`][1] crate.
//! It defines the availables runtime options.
//!
//! [1]: https://crates.io/crates/clap

use crate::{consts, perf_report::KernelVariant};

use clap::Parser;

use std::path::PathBuf;

/// Square DGEMM benchmark.
///
/// Times a candidate implementation of `C := C + A * B` over a sweep of problem sizes (and block
/// sizes for the blocked kernel) and verifies every result against a reference DGEMM.
#[derive(Clone, Debug, Parser)]
pub struct CliArgs {
    /// Problem size, replacing the default sweep (128, 512, 2048).
    // NOTE: Kept as a raw string so an invalid value falls back to the default sweep with a
    // warning instead of aborting the run.
    #[arg(short = 'N', value_name = "PROBLEM_SIZE", allow_hyphen_values = true)]
    pub problem_size: Option<String>,

    /// Block size for the blocked kernel, replacing the default sweep (4, 16, 64).
    #[arg(short = 'B', value_name = "BLOCK_SIZE", allow_hyphen_values = true)]
    pub block_size: Option<String>,

    /// Kernel variant to benchmark.
    #[arg(short, long, value_enum, default_value_t = KernelVariant::Blocked)]
    pub kernel: KernelVariant,

    /// Number of threads in the team, defaults to the available parallelism.
    #[arg(
        short,
        long,
        value_name = "THREADS",
        value_parser = clap::value_parser!(u16).range(1..),
    )]
    pub threads: Option<u16>,

    /// Number of timed repetitions of the kernel per configuration.
    #[arg(
        short,
        long,
        value_name = "META_REPS",
        default_value_t = consts::META_REPETITIONS,
        value_parser = clap::value_parser!(u8).range(1..),
    )]
    pub meta_repetitions: u8,

    /// Output file for a CSV performance report.
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,

    /// Seed for the random number generator (RNG).
    #[arg(short, long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Trace instrumented regions through the logger (visible with `RUST_LOG=trace`).
    #[arg(long)]
    pub trace_regions: bool,
}
