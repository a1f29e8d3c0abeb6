//! Benchmark result and performance report related structures and functions.
//!
//! This module defines the record the driver appends for every configuration of the sweep, and
//! the performance report derived from the recorded execution times.

use statistical::{mean, standard_deviation};

use std::{fmt, io::Write, mem::size_of};

/// Candidate kernel implementations, selectable at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum KernelVariant {
    /// Serial triple loop.
    Naive,
    /// Triple loop with output columns partitioned over the thread team.
    Parallel,
    /// Cache-blocked kernel, column tiles distributed over the thread team.
    Blocked,
    /// The reference DGEMM itself, as a performance baseline.
    Reference,
}

impl KernelVariant {
    /// Whether the variant is swept over block sizes.
    pub fn is_blocked(self) -> bool {
        self == Self::Blocked
    }

    /// One-line description printed at the top of the report.
    pub fn description(self) -> &'static str {
        match self {
            Self::Naive => "Basic implementation, three-loop dgemm.",
            Self::Parallel => "Basic implementation, thread-parallel, three-loop dgemm.",
            Self::Blocked => "Blocked dgemm, thread-parallel over column tiles.",
            Self::Reference => "Reference dgemm.",
        }
    }
}

impl fmt::Display for KernelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Naive => write!(f, "naive"),
            Self::Parallel => write!(f, "parallel"),
            Self::Blocked => write!(f, "blocked"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

/// Outcome of one configuration of the sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BenchmarkResult {
    /// Problem size.
    pub n: usize,
    /// Block size, for blocked kernels only.
    pub block_size: Option<usize>,
    /// Elapsed wall-clock time of the candidate kernel, in seconds.
    pub elapsed_seconds: f64,
    /// Whether the candidate agreed with the reference.
    pub passed: bool,
}

/// Performance information and statistics of one configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct PerfReport {
    /// Benchmarked kernel variant.
    variant: KernelVariant,
    /// Pass/fail record of the configuration.
    result: BenchmarkResult,
    /// Size in bytes of the three operands.
    nb_bytes: usize,
    /// Number of floating-point operations.
    nb_flops: usize,
    /// Minimum recorded runtime in milliseconds.
    min_time: f64,
    /// Median recorded runtime in milliseconds.
    median_time: f64,
    /// Maximum recorded runtime in milliseconds.
    max_time: f64,
    /// Average runtime in milliseconds.
    avg_time: f64,
    /// Runtime standard deviation in milliseconds.
    stddev_time: f64,
    /// Computational performance in GFLOP/s.
    computational_performance: f64,
}

impl PerfReport {
    pub fn print_csv_header(output: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            output,
            "kernel,n,block_size,Bytes,FLOPs,min_runtime,median_runtime,max_runtime,avg_runtime,stddev,GFLOP/s,passed"
        )
    }

    /// Creates a new `PerfReport` given a kernel variant, the configuration and the recorded
    /// execution times in seconds.
    ///
    /// The returned report's [`BenchmarkResult`] carries the median execution time.
    ///
    /// # Panics
    ///
    /// Panics if `durations` is empty.
    pub fn new(
        variant: KernelVariant,
        n: usize,
        block_size: Option<usize>,
        passed: bool,
        durations: &mut [f64],
    ) -> Self {
        assert!(!durations.is_empty(), "no recorded duration");

        // Sort durations to avoid having to do two passes to get both min and max elements
        durations.sort_by(f64::total_cmp);

        let min_time = durations[0];
        let median_time = durations[durations.len() / 2];
        let max_time = durations[durations.len() - 1];
        let avg_time = mean(durations);
        let stddev_time = match durations.len() {
            1 => 0.0,
            _ => standard_deviation(durations, Some(avg_time)),
        };

        let nb_bytes = 3 * size_of::<f64>() * n * n;
        let nb_flops = 2 * n * n * n;
        let computational_performance = match avg_time > 0.0 {
            true => nb_flops as f64 / (1e9 * avg_time),
            false => 0.0,
        };

        Self {
            variant,
            result: BenchmarkResult {
                n,
                block_size,
                elapsed_seconds: median_time,
                passed,
            },
            nb_bytes,
            nb_flops,
            min_time: min_time * 1e3,
            median_time: median_time * 1e3,
            max_time: max_time * 1e3,
            avg_time: avg_time * 1e3,
            stddev_time: stddev_time * 1e3,
            computational_performance,
        }
    }

    pub fn result(&self) -> BenchmarkResult {
        self.result
    }

    pub fn gflops(&self) -> f64 {
        self.computational_performance
    }
}

impl fmt::Display for PerfReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let block_size = self
            .result
            .block_size
            .map_or_else(String::new, |b| b.to_string());
        write!(
            f,
            "{},{},{},{},{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.4},{}",
            self.variant,
            self.result.n,
            block_size,
            self.nb_bytes,
            self.nb_flops,
            self.min_time,
            self.median_time,
            self.max_time,
            self.avg_time,
            self.stddev_time,
            self.computational_performance,
            self.result.passed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sample_report() {
        let report = PerfReport::new(KernelVariant::Naive, 4, None, true, &mut [0.5]);
        let result = report.result();
        assert_eq!(result.n, 4);
        assert_eq!(result.block_size, None);
        assert_eq!(result.elapsed_seconds, 0.5);
        assert!(result.passed);
        assert_eq!(report.stddev_time, 0.0);
        // 2 * 4^3 flops in half a second.
        assert!((report.gflops() - 256e-9).abs() < 1e-15);
    }

    #[test]
    fn median_of_repetitions() {
        let mut durations = [0.3, 0.1, 0.2];
        let report = PerfReport::new(KernelVariant::Blocked, 8, Some(4), false, &mut durations);
        assert_eq!(report.result().elapsed_seconds, 0.2);
        assert_eq!(report.min_time, 0.1 * 1e3);
        assert_eq!(report.max_time, 0.3 * 1e3);
        assert!(report.stddev_time > 0.0);
    }

    #[test]
    fn csv_row_matches_header() {
        let mut out = Vec::new();
        PerfReport::print_csv_header(&mut out).unwrap();
        let header = String::from_utf8(out).unwrap();
        let row =
            PerfReport::new(KernelVariant::Blocked, 2, Some(16), true, &mut [1.0, 2.0]).to_string();

        assert_eq!(header.trim_end().split(',').count(), row.split(',').count());
        assert!(row.starts_with("blocked,2,16,96,16,"));
        assert!(row.ends_with(",true"));
    }

    #[test]
    fn unblocked_row_has_empty_block_column() {
        let row = PerfReport::new(KernelVariant::Parallel, 2, None, true, &mut [1.0]).to_string();
        assert!(row.starts_with("parallel,2,,"));
    }
}
