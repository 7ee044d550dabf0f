//! Dense Gaussian elimination with full pivoting, plus three-plane intersection.
//!
//! Notes
//! - `min_pivot = 0.0` reports failure only for an exactly zero pivot. Nearly
//!   parallel planes then come back as huge (but finite) points, and callers
//!   re-check candidates against their own half-spaces.

use nalgebra::{Matrix3, SMatrix, SVector};

use super::types::{HalfSpace, Vec3};

/// Solve `A x = b` for small square `A` by full-pivot elimination.
///
/// Returns `None` if any pivot magnitude is `<= min_pivot`.
pub fn solve_full_pivot<const N: usize>(
    a: &SMatrix<f64, N, N>,
    b: &SVector<f64, N>,
    min_pivot: f64,
) -> Option<SVector<f64, N>> {
    if N == 0 {
        return Some(*b);
    }
    let mut a = *a;
    let mut x = *b;
    let mut col_swap = [0usize; N];

    for k in 0..N - 1 {
        // Largest magnitude over the unprocessed block.
        let mut best = 0.0;
        let mut row = k;
        col_swap[k] = k;
        for i in k..N {
            for j in k..N {
                let t = a[(i, j)].abs();
                if t > best {
                    best = t;
                    col_swap[k] = j;
                    row = i;
                }
            }
        }
        if best <= min_pivot {
            return None;
        }
        if col_swap[k] != k {
            a.swap_columns(k, col_swap[k]);
        }
        if row != k {
            for j in k..N {
                a.swap((k, j), (row, j));
            }
            x.swap_rows(k, row);
        }

        let p = a[(k, k)];
        for j in k + 1..N {
            a[(k, j)] /= p;
        }
        x[k] /= p;
        for i in k + 1..N {
            let f = a[(i, k)];
            for j in k + 1..N {
                a[(i, j)] -= f * a[(k, j)];
            }
            x[i] -= f * x[k];
        }
    }

    let last = a[(N - 1, N - 1)];
    if last.abs() <= min_pivot {
        return None;
    }
    x[N - 1] /= last;
    for i in (0..N - 1).rev() {
        let mut acc = 0.0;
        for j in i + 1..N {
            acc += a[(i, j)] * x[j];
        }
        x[i] -= acc;
    }

    col_swap[N - 1] = N - 1;
    for k in (0..N).rev() {
        if col_swap[k] != k {
            x.swap_rows(k, col_swap[k]);
        }
    }
    Some(x)
}

/// Common point of three planes, if the 3×3 system is solvable.
pub fn intersect_planes(
    h1: &HalfSpace,
    h2: &HalfSpace,
    h3: &HalfSpace,
    min_pivot: f64,
) -> Option<Vec3> {
    let a = Matrix3::from_rows(&[h1.n.transpose(), h2.n.transpose(), h3.n.transpose()]);
    let b = Vec3::new(h1.d, h2.d, h3.d);
    solve_full_pivot(&a, &b, min_pivot)
}
