//! Host kernel drivers.
//!
//! This module implements the driver functions responsible for profiling one configuration of the
//! chosen kernel on the host (CPU) and verifying its result.

use crate::{
    consts::REGION_NAME,
    error::Result,
    kernels::{host, reference},
    matrix::ProblemInstance,
    perf_report::*,
    team::Team,
    utils::{check_accuracy, first_mismatch, ProblemGenerator},
};

use log::{debug, warn};

use std::time::Instant;

/// Runs the host kernel selected by `variant` once on `C`.
///
/// Serial variants run on the calling thread, wrapped in a single instrumented region; parallel
/// variants open one region per partition inside the team. A blocked run without a block size
/// uses a single `n x n` tile.
// NOTE: We use upper-case characters to designate matrices.
#[allow(non_snake_case, clippy::too_many_arguments)]
pub fn run_kernel(
    team: &Team,
    variant: KernelVariant,
    n: usize,
    block_size: Option<usize>,
    A: &[f64],
    B: &[f64],
    C: &mut [f64],
) {
    let instrumentation = team.instrumentation();
    match variant {
        KernelVariant::Naive => {
            instrumentation.start(REGION_NAME);
            host::square_dgemm(n, A, B, C);
            instrumentation.stop(REGION_NAME);
        }
        KernelVariant::Parallel => host::par_square_dgemm(team, n, A, B, C),
        KernelVariant::Blocked => {
            host::blocked_square_dgemm(team, n, block_size.unwrap_or(n.max(1)), A, B, C)
        }
        KernelVariant::Reference => {
            instrumentation.start(REGION_NAME);
            reference::dgemm(n, 1.0, A, B, C);
            instrumentation.stop(REGION_NAME);
        }
    }
}

/// Host driver for one `(n, block_size)` configuration.
///
/// Allocates and fills a fresh problem, times `kernel` on the live operands `meta_reps` times,
/// runs the reference on the snapshots and compares both outputs. Before every repetition but the
/// first, the live `C` is restored from its snapshot so the checked output is the result of a
/// single kernel application.
// NOTE: We use upper-case characters to designate matrices.
#[allow(non_snake_case)]
pub fn dgemm<K>(
    variant: KernelVariant,
    n: usize,
    block_size: Option<usize>,
    meta_reps: u8,
    generator: &mut ProblemGenerator,
    kernel: &mut K,
) -> Result<PerfReport>
where
    K: FnMut(usize, Option<usize>, &[f64], &[f64], &mut [f64]),
{
    let mut problem = ProblemInstance::generate(n, generator)?;
    debug!("Generated fresh {0}x{0} operands", problem.n);

    // Measure execution time of host kernel
    let reps = usize::from(meta_reps.max(1));
    let mut durations = Vec::with_capacity(reps);
    for rep in 0..reps {
        if rep > 0 {
            problem.reset_output();
        }
        let ProblemInstance { A, B, C, .. } = &mut problem;
        let dur = Instant::now();
        kernel(n, block_size, A.as_slice(), B.as_slice(), C.as_mut_slice());
        durations.push(dur.elapsed().as_secs_f64());
    }

    let ProblemInstance {
        A_copy,
        B_copy,
        C_copy,
        C,
        ..
    } = &mut problem;
    reference::dgemm(
        n,
        1.0,
        A_copy.as_slice(),
        B_copy.as_slice(),
        C_copy.as_mut_slice(),
    );

    let passed = check_accuracy(C_copy.as_slice(), C.as_slice());
    if !passed {
        if let Some((idx, expected, actual)) = first_mismatch(C_copy.as_slice(), C.as_slice()) {
            warn!(
                "{variant} kernel diverges from the reference for N={n}{}: C[{}, {}] = {actual}, expected {expected}",
                block_size.map_or_else(String::new, |b| format!(", B={b}")),
                idx % n,
                idx / n,
            );
        }
    }
    debug!("N={n} block={block_size:?} durations={durations:?} passed={passed}");

    Ok(PerfReport::new(
        variant,
        n,
        block_size,
        passed,
        &mut durations,
    ))
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::instrument::{Instrumentation, NoInstrumentation};

    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn team(threads: usize, instrumentation: Arc<dyn Instrumentation>) -> Team {
        Team::new(Some(threads), instrumentation).unwrap()
    }

    #[test]
    fn every_variant_passes() {
        let team = team(3, Arc::new(NoInstrumentation));
        let mut generator = ProblemGenerator::new(Some(1));
        for variant in [
            KernelVariant::Naive,
            KernelVariant::Parallel,
            KernelVariant::Blocked,
            KernelVariant::Reference,
        ] {
            let block = variant.is_blocked().then_some(4);
            let mut kernel = |n: usize, b: Option<usize>, A: &[f64], B: &[f64], C: &mut [f64]| {
                run_kernel(&team, variant, n, b, A, B, C)
            };
            let report = dgemm(variant, 21, block, 1, &mut generator, &mut kernel).unwrap();
            let result = report.result();
            assert!(result.passed, "{variant}");
            assert_eq!(result.n, 21);
            assert_eq!(result.block_size, block);
            assert!(result.elapsed_seconds >= 0.0);
        }
    }

    #[test]
    fn faulty_kernel_is_reported_not_fatal() {
        let mut generator = ProblemGenerator::new(Some(1));
        let mut kernel =
            |_n: usize, _b: Option<usize>, _A: &[f64], _B: &[f64], C: &mut [f64]| C[0] += 1.0;
        let report = dgemm(KernelVariant::Naive, 4, None, 1, &mut generator, &mut kernel).unwrap();
        assert!(!report.result().passed);
    }

    #[test]
    fn repetitions_reuse_live_buffers() {
        let mut generator = ProblemGenerator::new(Some(1));
        let mut seen = Vec::new();
        let mut kernel = |n: usize, _b: Option<usize>, A: &[f64], B: &[f64], C: &mut [f64]| {
            seen.push((A.as_ptr(), B.as_ptr(), C.as_ptr()));
            host::square_dgemm(n, A, B, C);
        };
        let report = dgemm(KernelVariant::Naive, 6, None, 3, &mut generator, &mut kernel).unwrap();

        // Repetitions restart from the snapshot of C, so the result still verifies.
        assert!(report.result().passed);
        assert_eq!(seen.len(), 3);
        assert!(seen.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn serial_and_parallel_variants_open_regions() {
        #[derive(Default)]
        struct Regions {
            started: AtomicUsize,
            stopped: AtomicUsize,
        }

        impl Instrumentation for Regions {
            fn start(&self, region: &str) {
                assert_eq!(region, REGION_NAME);
                self.started.fetch_add(1, Ordering::SeqCst);
            }

            fn stop(&self, _region: &str) {
                self.stopped.fetch_add(1, Ordering::SeqCst);
            }
        }

        let regions = Arc::new(Regions::default());
        let team = team(2, regions.clone());
        let a = vec![1.0; 16];
        let b = vec![1.0; 16];

        let mut c = vec![0.0; 16];
        run_kernel(&team, KernelVariant::Naive, 4, None, &a, &b, &mut c);
        assert_eq!(regions.started.load(Ordering::SeqCst), 1);

        let mut c = vec![0.0; 16];
        run_kernel(&team, KernelVariant::Parallel, 4, None, &a, &b, &mut c);
        // One region per column partition: 4 columns over 2 threads.
        assert_eq!(regions.started.load(Ordering::SeqCst), 3);
        assert_eq!(
            regions.started.load(Ordering::SeqCst),
            regions.stopped.load(Ordering::SeqCst)
        );
        assert!(c.iter().all(|&x| x == 4.0));
    }
}
