//! BB84 quantum key distribution simulator.
//!
//! A sender prepares qubits in random bases, an optional intercept-resend
//! eavesdropper disturbs them, the receiver measures in random bases, and
//! both sides sift the key and estimate its QBER.

mod channel;
mod config;
mod core;
pub mod protocols;
mod sampler;
pub mod trials;

pub use crate::channel::{
    ClassicalChannel, ClassicalQubit, DensityMatrixChannel, Qubit, QubitChannel,
};
pub use crate::config::{Backend, SimulationConfig, simulate, simulate_trial};
pub use crate::core::{
    Basis, Bit, Gate, Measurement, MeasurementResult, QuantumState, errors, types, utils,
};
pub use crate::protocols::bb84::{
    Bb84, SiftedKey, TransmissionRecord, TrialChoices, TrialResult,
};
pub use crate::protocols::eavesdropper::{InterceptResend, Interception, ResendPolicy};
pub use crate::sampler::{OutcomeCounts, Sampler};
pub use crate::trials::{QberStats, Summary, TrialPair, TrialRunner};
