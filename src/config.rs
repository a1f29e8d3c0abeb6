//! Sweep configuration.

use crate::consts::{DEFAULT_BLOCK_SIZES, DEFAULT_PROBLEM_SIZES};

use log::warn;

/// Problem sizes and block sizes swept by the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchmarkConfig {
    pub problem_sizes: Vec<usize>,
    pub block_sizes: Vec<usize>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            problem_sizes: DEFAULT_PROBLEM_SIZES.to_vec(),
            block_sizes: DEFAULT_BLOCK_SIZES.to_vec(),
        }
    }
}

impl BenchmarkConfig {
    /// Builds the configuration from raw `-N`/`-B` command-line values.
    ///
    /// A valid override replaces the whole default sequence with its single value. An override
    /// that is not a positive integer is reported and the default sequence is kept.
    pub fn from_overrides(problem_size: Option<&str>, block_size: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(n) = parse_override("-N", problem_size) {
            config.problem_sizes = vec![n];
        }
        if let Some(b) = parse_override("-B", block_size) {
            config.block_sizes = vec![b];
        }
        config
    }

    /// Every `(problem size, block size)` pair of the sweep, in sweep order.
    ///
    /// Block sizes only apply to blocked kernels; other kernels get one configuration per size.
    pub fn configurations(&self, blocked: bool) -> Vec<(usize, Option<usize>)> {
        self.problem_sizes
            .iter()
            .flat_map(|&n| match blocked {
                true => self.block_sizes.iter().map(|&b| (n, Some(b))).collect(),
                false => vec![(n, None)],
            })
            .collect()
    }
}

fn parse_override(flag: &str, raw: Option<&str>) -> Option<usize> {
    let raw = raw?;
    match raw.trim().parse::<usize>() {
        Ok(v) if v > 0 => Some(v),
        _ => {
            warn!("Ignoring invalid value `{raw}` for {flag}: expected a positive integer, using the default sweep");
            None
        }
    }
}
