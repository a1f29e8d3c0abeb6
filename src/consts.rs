//! Crate-level constants.

/// Problem sizes swept when no `-N` override is given.
pub const DEFAULT_PROBLEM_SIZES: [usize; 3] = [128, 512, 2048];

/// Block sizes swept by the blocked kernel when no `-B` override is given.
pub const DEFAULT_BLOCK_SIZES: [usize; 3] = [4, 16, 64];

/// Maximum absolute difference accepted between candidate and reference values.
pub const TOLERANCE: f64 = 1e-5;

/// Default number of timed repetitions of the candidate kernel per configuration.
pub const META_REPETITIONS: u8 = 1;

/// Name of the instrumented region wrapping each kernel invocation.
pub const REGION_NAME: &str = "dgemm";
