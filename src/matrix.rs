//! Dense square matrices and benchmark problem instances.
//!
//! All matrices are stored in column-major order: element `(i, j)` of an `n x n` matrix lives at
//! offset `i + j * n`.

use crate::{
    error::{BenchError, Result},
    utils::ProblemGenerator,
};

use std::ops::{Index, IndexMut};

/// Owned `n x n` column-major matrix of `f64`.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Allocates a zero-filled `n x n` matrix.
    ///
    /// Allocation goes through `try_reserve_exact` so that a problem too large for the available
    /// memory surfaces as a [`BenchError::Allocation`] instead of an abort. A size whose element
    /// count does not fit in a `usize` is a [`BenchError::SizeOverflow`].
    pub fn zeros(n: usize) -> Result<Self> {
        let count = n.checked_mul(n).ok_or(BenchError::SizeOverflow { n })?;
        let mut data = Vec::new();
        data.try_reserve_exact(count)
            .map_err(|source| BenchError::Allocation { n, count, source })?;
        data.resize(count, 0.0);
        Ok(Self { n, data })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Fallible deep copy into a new allocation.
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = Self::zeros(self.n)?;
        copy.data.copy_from_slice(&self.data);
        Ok(copy)
    }
}

#[cfg(test)]
impl Matrix {
    /// Builds a matrix from column-major values.
    pub fn from_col_major(n: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), n * n, "expected {n}x{n}={} elements", n * n);
        Self { n, data }
    }

    /// The `n x n` identity matrix.
    pub fn identity(n: usize) -> Result<Self> {
        let mut m = Self::zeros(n)?;
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        Ok(m)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i + j * self.n]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i + j * self.n]
    }
}

/// One benchmark problem: the live operands handed to the candidate kernel and the snapshots
/// handed to the reference.
///
/// The snapshots are separate allocations, so the candidate and the reference never share a
/// buffer.
// NOTE: We use upper-case characters to designate matrices.
#[allow(non_snake_case)]
#[derive(Debug)]
pub struct ProblemInstance {
    pub n: usize,
    pub A: Matrix,
    pub B: Matrix,
    pub C: Matrix,
    pub A_copy: Matrix,
    pub B_copy: Matrix,
    pub C_copy: Matrix,
}

impl ProblemInstance {
    /// Allocates a fresh instance of size `n`, fills `A`, `B` and `C` from `generator` and
    /// snapshots them.
    #[allow(non_snake_case)]
    pub fn generate(n: usize, generator: &mut ProblemGenerator) -> Result<Self> {
        let mut A = Matrix::zeros(n)?;
        let mut B = Matrix::zeros(n)?;
        let mut C = Matrix::zeros(n)?;

        generator.fill(A.as_mut_slice());
        generator.fill(B.as_mut_slice());
        generator.fill(C.as_mut_slice());

        let A_copy = A.try_clone()?;
        let B_copy = B.try_clone()?;
        let C_copy = C.try_clone()?;

        Ok(Self {
            n,
            A,
            B,
            C,
            A_copy,
            B_copy,
            C_copy,
        })
    }

    /// Restores the live `C` from its snapshot.
    ///
    /// Only valid before the reference has run, since the reference accumulates into `C_copy`.
    pub fn reset_output(&mut self) {
        self.C.as_mut_slice().copy_from_slice(self.C_copy.as_slice());
    }
}
