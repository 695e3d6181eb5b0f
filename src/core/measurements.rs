use crate::core::errors::MeasurementError;
use crate::core::types::{Basis, Bit};
use crate::core::utils;
use ndarray::{Array1, Array2, array};
use num_complex::Complex64;

/// A projective single-qubit measurement.
#[derive(Clone, Debug)]
pub struct Measurement {
    /// List of measurement operators
    pub operators: Vec<Array2<Complex64>>,
    /// Classical bit reported for each operator
    pub outcomes: Vec<Bit>,
}

impl Measurement {
    pub fn new(
        operators: Vec<Array2<Complex64>>,
        outcomes: Vec<Bit>,
    ) -> Result<Self, MeasurementError> {
        if operators.len() != outcomes.len() {
            return Err(MeasurementError::CountMismatch {
                ops: operators.len(),
                vals: outcomes.len(),
            });
        }

        if operators.is_empty() {
            return Err(MeasurementError::InvalidDimensions);
        }

        if operators.iter().any(|op| op.dim() != (2, 2)) {
            return Err(MeasurementError::InvalidDimensions);
        }

        if !utils::check_completeness(&operators, 2) {
            return Err(MeasurementError::NotComplete);
        }

        Ok(Self {
            operators,
            outcomes,
        })
    }

    /// Builds the two-outcome projective measurement onto `|v0>` (bit 0) and `|v1>` (bit 1).
    fn projective(v0: Array1<Complex64>, v1: Array1<Complex64>) -> Measurement {
        Measurement {
            operators: vec![
                utils::outer_product(&v0, &v0),
                utils::outer_product(&v1, &v1),
            ],
            outcomes: vec![Bit::Zero, Bit::One],
        }
    }

    /// Z basis (Computational) -> {|0>, |1>}.
    pub fn z_basis() -> Measurement {
        let v0: Array1<Complex64> = array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
        let v1: Array1<Complex64> = array![Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)];

        Self::projective(v0, v1)
    }

    /// X basis (Hadamard) -> {|+>, |->}.
    pub fn x_basis() -> Measurement {
        let inv_sqrt2 = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);

        let v_plus: Array1<Complex64> = array![inv_sqrt2, inv_sqrt2];
        let v_minus: Array1<Complex64> = array![inv_sqrt2, -inv_sqrt2];

        Self::projective(v_plus, v_minus)
    }

    pub fn for_basis(basis: Basis) -> Measurement {
        match basis {
            Basis::Rectilinear => Self::z_basis(),
            Basis::Diagonal => Self::x_basis(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementResult {
    /// Applied measurment operator index
    pub index: usize,
    /// Classical outcome
    pub outcome: Bit,
}
