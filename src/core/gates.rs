use crate::core::errors::GateError;
use crate::core::utils;
use ndarray::{Array2, arr2};
use num_complex::Complex64;

/// Represents a single-qubit quantum gate.
///
/// A gate is defined by its 2x2 unitary matrix.
#[derive(Debug, Clone)]
pub struct Gate {
    /// The unitary matrix of the gate.
    pub matrix: Array2<Complex64>,
}

impl Gate {
    /// Creates a new `Gate` from a unitary matrix.
    ///
    /// # Errors
    ///
    /// Returns a `GateError` if:
    /// - The matrix is not square.
    /// - The matrix is not 2x2.
    /// - The matrix is not unitary.
    pub fn new(matrix: Array2<Complex64>) -> Result<Self, GateError> {
        let (rows, cols) = matrix.dim();

        if rows != cols {
            return Err(GateError::NotSquareMatrix);
        }

        if rows != 2 {
            return Err(GateError::NotSingleQubit(rows));
        }

        if !Self::check_unitary(&matrix) {
            return Err(GateError::NonUnitary);
        }

        Ok(Self { matrix })
    }

    /// Checks if a given matrix is unitary
    fn check_unitary(matrix: &Array2<Complex64>) -> bool {
        let (rows, _) = matrix.dim();
        let eye = Array2::<Complex64>::eye(rows);

        let product = matrix.dot(&utils::dagger(matrix));

        product
            .iter()
            .zip(eye.iter())
            .all(|(a, b)| (*a - *b).norm() < 1e-6)
    }

    /// Creates a Pauli-X gate (NOT gate), used to encode bit 1.
    pub fn x() -> Gate {
        Gate {
            matrix: arr2(&[
                [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
                [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            ]),
        }
    }

    /// Creates a Hadamard gate, which maps the rectilinear basis onto the diagonal one.
    pub fn h() -> Gate {
        let factor = 1.0 / 2.0_f64.sqrt();
        Gate {
            matrix: arr2(&[
                [Complex64::new(factor, 0.0), Complex64::new(factor, 0.0)],
                [Complex64::new(factor, 0.0), Complex64::new(-factor, 0.0)],
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_gates_are_unitary() {
        assert!(Gate::new(Gate::x().matrix).is_ok());
        assert!(Gate::new(Gate::h().matrix).is_ok());
    }

    #[test]
    fn rejects_invalid_matrices() {
        let c = |re: f64| Complex64::new(re, 0.0);

        let scaled = arr2(&[[c(2.0), c(0.0)], [c(0.0), c(2.0)]]);
        assert!(matches!(Gate::new(scaled), Err(GateError::NonUnitary)));

        let rectangular = Array2::<Complex64>::zeros((2, 3));
        assert!(matches!(
            Gate::new(rectangular),
            Err(GateError::NotSquareMatrix)
        ));

        let two_qubit = Array2::<Complex64>::eye(4);
        assert!(matches!(
            Gate::new(two_qubit),
            Err(GateError::NotSingleQubit(4))
        ));
    }
}
