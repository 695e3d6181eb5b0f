use num_complex::Complex64;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum GateError {
    #[error("Matrix is not Unitary (U†U != I)")]
    NonUnitary,

    #[error("Matrix must be square")]
    NotSquareMatrix,

    #[error("Gate must act on a single qubit, got a {0}x{0} matrix")]
    NotSingleQubit(usize),
}

#[derive(Error, Debug, Clone)]
pub enum MeasurementError {
    #[error("Number of operators ({ops}) does not match number of outcomes ({vals})")]
    CountMismatch { ops: usize, vals: usize },

    #[error("Measurement operators do not sum to Identity (Completeness relation failed)")]
    NotComplete,

    #[error("Invalid operator dimensions: single-qubit operators must be 2x2")]
    InvalidDimensions,
}

#[derive(Error, Debug, Clone)]
pub enum StateError {
    #[error("Trace is not unity: {0}")]
    InvalidTrace(Complex64),

    #[error("Outcome {index} has zero probability and cannot be selected")]
    ImpossibleOutcome { index: usize },

    #[error("Measurement error: {0}")]
    MeasurementError(#[from] MeasurementError),

    #[error("Gate error: {0}")]
    GateError(#[from] GateError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("qubit_count must be positive")]
    ZeroQubitCount,

    #[error("trial_count must be positive")]
    ZeroTrialCount,

    #[error("Invalid bit value {0}: expected 0 or 1")]
    InvalidBit(u8),
}

#[derive(Error, Debug, Clone)]
pub enum ProtocolError {
    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Expected {expected} {field}, got {got}")]
    ChoiceLengthMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },
}
