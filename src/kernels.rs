//! Kernel implementations.
//!
//! This modules contains the candidate DGEMM kernels and the reference used to verify them. Every
//! kernel computes `C := C + A * B` in place on `n x n` column-major matrices and leaves `A` and
//! `B` untouched.

pub mod reference {
    //! Reference DGEMM.
    //!
    //! Wraps the [`matrixmultiply`][1] crate, which is trusted to return correct results for any
    //! valid input and is never verified by the benchmark itself.
    //!
    //! [1]: https://crates.io/crates/matrixmultiply

    use super::check_dims;

    /// Computes `C := alpha * A * B + C` for `n x n` column-major matrices.
    #[allow(non_snake_case)]
    pub fn dgemm(n: usize, alpha: f64, A: &[f64], B: &[f64], C: &mut [f64]) {
        check_dims(n, A, B, C);
        if n == 0 {
            return;
        }

        // Column-major: unit row stride, column stride of `n`.
        let cs = n as isize;
        // SAFETY: all three slices hold exactly `n * n` elements (checked above) and the strides
        // address only elements within them; `C` is exclusively borrowed.
        unsafe {
            matrixmultiply::dgemm(
                n,
                n,
                n,
                alpha,
                A.as_ptr(),
                1,
                cs,
                B.as_ptr(),
                1,
                cs,
                1.0,
                C.as_mut_ptr(),
                1,
                cs,
            );
        }
    }
}

pub mod host {
    //! Candidate host kernel implementations.
    //!
    //! The parallel implementations rely on the [`rayon`][1] crate. Output columns are split into
    //! disjoint contiguous chunks (a column of a column-major matrix is contiguous), so threads
    //! never write to the same element and no locking is needed.
    //!
    //! [1]: https://crates.io/crates/rayon

    use rayon::prelude::*;

    use super::check_dims;
    use crate::{consts::REGION_NAME, team::Team};

    // Naive triple-loop implementation of the DGEMM kernel.
    #[allow(non_snake_case)]
    pub fn square_dgemm(n: usize, A: &[f64], B: &[f64], C: &mut [f64]) {
        check_dims(n, A, B, C);
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    C[i + j * n] += A[i + k * n] * B[k + j * n];
                }
            }
        }
    }

    // Parallel implementation: each worker owns one contiguous range of output columns.
    #[allow(non_snake_case)]
    pub fn par_square_dgemm(team: &Team, n: usize, A: &[f64], B: &[f64], C: &mut [f64]) {
        check_dims(n, A, B, C);
        if n == 0 {
            return;
        }

        let cols_per_part = n.div_ceil(team.size());
        let instrumentation = team.instrumentation();

        team.install(|| {
            C.par_chunks_mut(cols_per_part * n)
                .enumerate()
                .for_each(|(part, c_cols)| {
                    instrumentation.start(REGION_NAME);
                    let first_col = part * cols_per_part;
                    for (jl, c_col) in c_cols.chunks_exact_mut(n).enumerate() {
                        let j = first_col + jl;
                        for k in 0..n {
                            let b_kj = B[k + j * n];
                            c_col
                                .iter_mut()
                                .zip(&A[k * n..(k + 1) * n])
                                .for_each(|(c_ij, a_ik)| *c_ij += a_ik * b_kj);
                        }
                    }
                    instrumentation.stop(REGION_NAME);
                })
        });
    }

    /// Cache-blocked implementation with `block x block` tiles.
    ///
    /// Column tiles of `C` are handed to the team as independent tasks. Within a column tile, the
    /// kernel walks row tiles (`ii`) and, for each, accumulates the products of the matching
    /// `A` and `B` tiles along the shared dimension (`kk`). Tiles on the right and bottom edges
    /// are clamped to `min(block, n - offset)`, so `block` does not need to divide `n`.
    ///
    /// # Panics
    ///
    /// Panics if `block` is zero.
    #[allow(non_snake_case)]
    pub fn blocked_square_dgemm(
        team: &Team,
        n: usize,
        block: usize,
        A: &[f64],
        B: &[f64],
        C: &mut [f64],
    ) {
        check_dims(n, A, B, C);
        assert!(block > 0, "block size must be positive");
        if n == 0 {
            return;
        }

        // Tiles never extend past the matrix, so larger blocks are a single tile.
        let block = block.min(n);
        let instrumentation = team.instrumentation();

        team.install(|| {
            C.par_chunks_mut(block * n)
                .enumerate()
                .for_each(|(tile_col, c_cols)| {
                    instrumentation.start(REGION_NAME);
                    let jj = tile_col * block;
                    let nb_j = c_cols.len() / n;
                    for ii in (0..n).step_by(block) {
                        let nb_i = block.min(n - ii);
                        for kk in (0..n).step_by(block) {
                            let nb_k = block.min(n - kk);
                            tile_dgemm(n, (ii, jj, kk), (nb_i, nb_j, nb_k), A, B, c_cols);
                        }
                    }
                    instrumentation.stop(REGION_NAME);
                })
        });
    }

    // Accumulates the `nb_i x nb_k` tile of `A` at `(ii, kk)` times the `nb_k x nb_j` tile of `B`
    // at `(kk, jj)` into `c_cols`, which holds columns `jj..jj + nb_j` of `C`.
    #[allow(non_snake_case)]
    fn tile_dgemm(
        n: usize,
        (ii, jj, kk): (usize, usize, usize),
        (nb_i, nb_j, nb_k): (usize, usize, usize),
        A: &[f64],
        B: &[f64],
        c_cols: &mut [f64],
    ) {
        for jl in 0..nb_j {
            let j = jj + jl;
            let c_tile_col = &mut c_cols[jl * n + ii..jl * n + ii + nb_i];
            for k in kk..kk + nb_k {
                let b_kj = B[k + j * n];
                c_tile_col
                    .iter_mut()
                    .zip(&A[k * n + ii..k * n + ii + nb_i])
                    .for_each(|(c_ij, a_ik)| *c_ij += a_ik * b_kj);
            }
        }
    }
}

#[allow(non_snake_case)]
fn check_dims(n: usize, A: &[f64], B: &[f64], C: &[f64]) {
    let count = n.checked_mul(n);
    assert!(count.is_some(), "{n}x{n} elements overflow usize");
    assert_eq!(Some(A.len()), count, "A: expected {n}x{n} elements");
    assert_eq!(Some(B.len()), count, "B: expected {n}x{n} elements");
    assert_eq!(Some(C.len()), count, "C: expected {n}x{n} elements");
}
