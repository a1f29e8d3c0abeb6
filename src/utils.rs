//! Problem generation and result verification.

use crate::consts::TOLERANCE;

use rand::{distributions::Uniform, prelude::*};

/// Source of pseudo-random operands for benchmark problems.
///
/// Holds a single generator instance for the whole run: successive calls to [`fill`] continue the
/// same stream instead of re-seeding, so every buffer of every configuration gets fresh values.
/// Values are drawn uniformly from the closed interval `[-1.0, 1.0]`.
///
/// [`fill`]: ProblemGenerator::fill
#[derive(Clone, Debug)]
pub struct ProblemGenerator {
    rng: SmallRng,
    between: Uniform<f64>,
}

impl ProblemGenerator {
    /// Creates a generator seeded with `seed`, or from OS entropy if `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            rng,
            between: Uniform::new_inclusive(-1.0_f64, 1.0_f64),
        }
    }

    /// Overwrites every element of `buffer` with the next values of the stream.
    pub fn fill(&mut self, buffer: &mut [f64]) {
        buffer
            .iter_mut()
            .for_each(|x| *x = self.between.sample(&mut self.rng));
    }
}

/// Returns the index and values of the first pair differing by more than [`TOLERANCE`].
///
/// A `NaN` on either side counts as a mismatch.
pub fn first_mismatch(reference: &[f64], candidate: &[f64]) -> Option<(usize, f64, f64)> {
    assert_eq!(reference.len(), candidate.len(), "length mismatch");
    reference
        .iter()
        .zip(candidate)
        .position(|(r, c)| !((r - c).abs() <= TOLERANCE))
        .map(|i| (i, reference[i], candidate[i]))
}

/// Checks that `candidate` agrees with `reference` elementwise within [`TOLERANCE`].
pub fn check_accuracy(reference: &[f64], candidate: &[f64]) -> bool {
    first_mismatch(reference, candidate).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_stay_in_closed_unit_interval() {
        let mut generator = ProblemGenerator::new(Some(42));
        let mut buf = vec![0.0; 100_000];
        generator.fill(&mut buf);

        assert!(buf.iter().all(|x| (-1.0..=1.0).contains(x)));
        // Uniform on [-1, 1]: both halves are populated and the mean sits near zero.
        assert!(buf.iter().any(|&x| x < -0.9));
        assert!(buf.iter().any(|&x| x > 0.9));
        let mean = buf.iter().sum::<f64>() / buf.len() as f64;
        assert!(mean.abs() < 0.02, "mean {mean} too far from 0");
    }

    #[test]
    fn same_seed_reproduces_stream() {
        let mut a = ProblemGenerator::new(Some(5));
        let mut b = ProblemGenerator::new(Some(5));
        let mut x = vec![0.0; 64];
        let mut y = vec![0.0; 64];
        a.fill(&mut x);
        b.fill(&mut y);
        assert_eq!(x, y);
    }

    #[test]
    fn successive_fills_continue_the_stream() {
        let mut generator = ProblemGenerator::new(Some(5));
        let mut x = vec![0.0; 64];
        let mut y = vec![0.0; 64];
        generator.fill(&mut x);
        generator.fill(&mut y);
        assert_ne!(x, y);
    }

    #[test]
    fn exact_copy_passes() {
        let mut generator = ProblemGenerator::new(Some(1));
        let mut x = vec![0.0; 256];
        generator.fill(&mut x);
        let y = x.clone();
        assert!(check_accuracy(&x, &y));
    }

    #[test]
    fn single_perturbation_fails() {
        let mut generator = ProblemGenerator::new(Some(1));
        let mut x = vec![0.0; 256];
        generator.fill(&mut x);
        let mut y = x.clone();
        y[137] += 2.0 * TOLERANCE;

        assert!(!check_accuracy(&x, &y));
        assert_eq!(first_mismatch(&x, &y).map(|(i, _, _)| i), Some(137));
    }

    #[test]
    fn perturbation_within_tolerance_passes() {
        let x = vec![0.5; 16];
        let mut y = x.clone();
        y[3] += TOLERANCE / 2.0;
        assert!(check_accuracy(&x, &y));
    }

    #[test]
    fn nan_is_a_mismatch() {
        let x = vec![1.0; 4];
        let mut y = x.clone();
        y[2] = f64::NAN;
        assert!(!check_accuracy(&x, &y));
    }

    #[test]
    fn empty_buffers_agree() {
        assert!(check_accuracy(&[], &[]));
    }
}
