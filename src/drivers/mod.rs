//! Kernel drivers.
//!
//! This module provides the API for running the benchmark sweep: initializing the data for each
//! configuration, profiling the candidate kernel and checking its result against the reference.
//!
//! # High-level approach for kernel profiling
//! ## 1. Data initialization
//! Every `(problem size, block size)` configuration gets a freshly allocated problem: `A`, `B` and
//! `C` are filled with random values and snapshotted into separate buffers. Nothing is reused
//! across configurations, so no state leaks from one trial into the next.
//!
//! ## 2. Performance evaluation
//! The timer brackets exactly the kernel invocation, including the implicit barrier ending its
//! parallel region. The kernel may be timed several times in a "meta repetitions loop" (see
//! [`crate::consts`] for the default amount of meta repetitions and [`crate::cli`] for overriding
//! it from the command-line).
//!
//! ## 3. Verification
//! The reference runs on the snapshots, never on the buffers the candidate touched, and both
//! outputs are compared elementwise (see [`crate::utils::check_accuracy`]). A mismatch is reported
//! and the sweep moves on to the next configuration.
//!
//! ## 4. Post-processing
//! Each configuration prints its elapsed time as it completes. A CSV summary with runtime
//! statistics and GFLOP/s is written at the end if an output file is given (see [`crate::cli`]).

mod host;

pub use host::run_kernel;

use crate::{
    cli::CliArgs,
    config::BenchmarkConfig,
    error::Result,
    instrument::{Instrumentation, LogInstrumentation, NoInstrumentation},
    perf_report::*,
    team::Team,
    utils::ProblemGenerator,
};

use log::{debug, info, warn};

use std::{
    fs::OpenOptions,
    io::{stdout, BufWriter, Write},
    sync::Arc,
};

/// Driver function responsible for running the whole DGEMM benchmark described by `args`.
///
/// It sets up the instrumentation and the thread team, sweeps every configuration, prints the
/// per-configuration report to `stdout` and returns one result per configuration, in sweep order.
// NOTE: We use upper-case characters to designate matrices.
#[allow(non_snake_case)]
pub fn dgemm(args: &CliArgs) -> Result<Vec<BenchmarkResult>> {
    let instrumentation: Arc<dyn Instrumentation> = match args.trace_regions {
        true => Arc::new(LogInstrumentation::new()),
        false => Arc::new(NoInstrumentation),
    };
    instrumentation.init();

    let team = Team::new(args.threads.map(usize::from), Arc::clone(&instrumentation))?;

    let config =
        BenchmarkConfig::from_overrides(args.problem_size.as_deref(), args.block_size.as_deref());
    if args.block_size.is_some() && !args.kernel.is_blocked() {
        warn!("-B has no effect on the {} kernel", args.kernel);
    }
    debug!("Sweep configuration: {config:?}");

    // Open the CSV report up front so an unwritable path fails before the sweep runs.
    let mut csv_output = match args.output_file {
        Some(ref name) => Some(BufWriter::new(
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(name)?,
        )),
        None => None,
    };

    let mut generator = ProblemGenerator::new(args.seed);
    let variant = args.kernel;

    let reports = {
        let stdout = stdout();
        let mut output = stdout.lock();
        writeln!(output, "Description:\t{}\n", variant.description())?;
        sweep(
            variant,
            &config,
            args.meta_repetitions,
            &mut generator,
            &mut output,
            |n, block_size, A, B, C| run_kernel(&team, variant, n, block_size, A, B, C),
        )?
    };

    instrumentation.close();

    if let (Some(output), Some(name)) = (csv_output.as_mut(), args.output_file.as_ref()) {
        PerfReport::print_csv_header(output)?;
        for report in &reports {
            writeln!(output, "{report}")?;
        }
        output.flush()?;
        info!("Performance report written to {}", name.display());
    }

    Ok(reports.iter().map(PerfReport::result).collect())
}

/// Runs every configuration of `config` through `kernel`, strictly one after the other.
///
/// Writes the human-readable report to `output` as it goes and returns one performance report per
/// configuration, in sweep order. A configuration whose result diverges from the reference is
/// reported and does not stop the sweep.
// NOTE: We use upper-case characters to designate matrices.
#[allow(non_snake_case)]
pub fn sweep<K>(
    variant: KernelVariant,
    config: &BenchmarkConfig,
    meta_reps: u8,
    generator: &mut ProblemGenerator,
    output: &mut dyn Write,
    mut kernel: K,
) -> Result<Vec<PerfReport>>
where
    K: FnMut(usize, Option<usize>, &[f64], &[f64], &mut [f64]),
{
    let configurations = config.configurations(variant.is_blocked());
    let mut reports = Vec::with_capacity(configurations.len());
    let mut current_size = None;

    for (n, block_size) in configurations {
        if current_size != Some(n) {
            info!("Working on problem size N={n}");
            writeln!(output, "Working on problem size N={n} ")?;
            if variant.is_blocked() {
                writeln!(output, "Blocked DGEMM ")?;
            }
            current_size = Some(n);
        }
        if let Some(b) = block_size {
            writeln!(output, " Working on Block size = {b} ")?;
        }

        let report = host::dgemm(variant, n, block_size, meta_reps, generator, &mut kernel)?;
        let result = report.result();

        writeln!(
            output,
            " Elapsed time is : {:.4} (sec) ",
            result.elapsed_seconds
        )?;
        if !result.passed {
            writeln!(
                output,
                " Error: your answer is not the same as that computed by the reference. "
            )?;
        }
        debug!(
            "{variant} N={n}{}: {:.3} GFLOP/s",
            block_size.map_or_else(String::new, |b| format!(" B={b}")),
            report.gflops()
        );
        reports.push(report);
    }

    Ok(reports)
}
