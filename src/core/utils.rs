//! Matrix helpers for the single-qubit backend.
//!
//! This module contains helper functions for:
//! - Trace, conjugate transpose and outer products.
//! - Conjugation of a density matrix by an operator ($M \rho M^\dagger$).
//! - Completeness checks for measurement operators.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Computes the trace of a matrix (sum of diagonal elements).
pub fn trace(matrix: &Array2<Complex64>) -> Complex64 {
    matrix.diag().sum()
}

/// Conjugate transpose $M^\dagger$.
pub fn dagger(matrix: &Array2<Complex64>) -> Array2<Complex64> {
    matrix.t().mapv(|c| c.conj())
}

/// Computes $M \rho M^\dagger$.
pub fn sandwich(op: &Array2<Complex64>, rho: &Array2<Complex64>) -> Array2<Complex64> {
    op.dot(rho).dot(&dagger(op))
}

/// Computes the outer product of two vectors $|a\rangle\langle b|$.
pub fn outer_product(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Array2<Complex64> {
    let n = a.len();
    let m = b.len();
    let mut res = Array2::zeros((n, m));

    for i in 0..n {
        for j in 0..m {
            res[[i, j]] = a[i] * b[j].conj();
        }
    }
    res
}

/// Checks completeness relation for measurement operators.
///
/// Verifies if $\sum M_k^\dagger M_k = I$.
pub fn check_completeness(ops: &[Array2<Complex64>], dim: usize) -> bool {
    let eye = Array2::<Complex64>::eye(dim);
    let sum = ops
        .iter()
        .fold(Array2::<Complex64>::zeros((dim, dim)), |acc, op| {
            acc + dagger(op).dot(op)
        });
    sum.iter()
        .zip(eye.iter())
        .all(|(a, b)| (a - b).norm() < 1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn outer_product_of_basis_vectors_is_projector() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let v0: Array1<Complex64> = array![one, zero];

        let p0 = outer_product(&v0, &v0);

        assert_eq!(p0, array![[one, zero], [zero, zero]]);
        assert_eq!(trace(&p0), one);
    }

    #[test]
    fn incomplete_operators_are_detected() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let p0 = array![[one, zero], [zero, zero]];
        let p1 = array![[zero, zero], [zero, one]];

        assert!(check_completeness(&[p0.clone(), p1], 2));
        assert!(!check_completeness(&[p0], 2));
    }
}
