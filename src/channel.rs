//! Single-qubit preparation and measurement.
//!
//! [`QubitChannel`] is the only boundary between the protocol and a quantum
//! backend. Any implementation must honour the BB84 contract:
//!
//! - measuring `prepare(bit, basis)` in `basis` always returns `bit`;
//! - measuring it in the other basis returns either bit with probability 1/2,
//!   independently on every call.
//!
//! States are moved into [`QubitChannel::measure`], so a qubit can be
//! measured only once.

use crate::core::errors::StateError;
use crate::core::{Basis, Bit, Gate, Measurement, QuantumState};
use rand::Rng;

pub trait QubitChannel {
    /// In-flight qubit. Deliberately not `Clone`.
    type State;

    /// Encodes `bit` in `basis`.
    fn prepare(&self, bit: Bit, basis: Basis) -> Result<Self::State, StateError>;

    /// Measures `state` in `basis`, consuming it.
    fn measure<R: Rng>(
        &self,
        state: Self::State,
        basis: Basis,
        rng: &mut R,
    ) -> Result<Bit, StateError>;
}

/// A qubit held by [`DensityMatrixChannel`].
#[derive(Debug)]
pub struct Qubit {
    state: QuantumState,
}

impl Qubit {
    pub fn state(&self) -> &QuantumState {
        &self.state
    }
}

/// Backend that evolves a 2x2 density matrix.
///
/// Preparation applies X for bit 1 and then H for the diagonal basis to |0>;
/// measurement projects onto the Z or X eigenbasis.
#[derive(Debug, Clone)]
pub struct DensityMatrixChannel {
    x: Gate,
    h: Gate,
    z_basis: Measurement,
    x_basis: Measurement,
}

impl Default for DensityMatrixChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl DensityMatrixChannel {
    pub fn new() -> Self {
        Self {
            x: Gate::x(),
            h: Gate::h(),
            z_basis: Measurement::z_basis(),
            x_basis: Measurement::x_basis(),
        }
    }

    fn measurement(&self, basis: Basis) -> &Measurement {
        match basis {
            Basis::Rectilinear => &self.z_basis,
            Basis::Diagonal => &self.x_basis,
        }
    }
}

impl QubitChannel for DensityMatrixChannel {
    type State = Qubit;

    fn prepare(&self, bit: Bit, basis: Basis) -> Result<Qubit, StateError> {
        let mut state = QuantumState::new();

        if bit.is_one() {
            state.apply(&self.x);
        }
        if basis == Basis::Diagonal {
            state.apply(&self.h);
        }

        Ok(Qubit { state })
    }

    fn measure<R: Rng>(
        &self,
        qubit: Qubit,
        basis: Basis,
        rng: &mut R,
    ) -> Result<Bit, StateError> {
        let mut state = qubit.state;
        let result = state.measure(self.measurement(basis), rng)?;
        Ok(result.outcome)
    }
}

/// A qubit held by [`ClassicalChannel`]: just the encoding.
#[derive(Debug)]
pub struct ClassicalQubit {
    bit: Bit,
    basis: Basis,
}

/// Classical stand-in for a quantum backend.
///
/// BB84 only ever needs the two outcome distributions of the contract above,
/// so a matched measurement returns the encoded bit and a mismatched one
/// returns a fresh uniform bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicalChannel;

impl QubitChannel for ClassicalChannel {
    type State = ClassicalQubit;

    fn prepare(&self, bit: Bit, basis: Basis) -> Result<ClassicalQubit, StateError> {
        Ok(ClassicalQubit { bit, basis })
    }

    fn measure<R: Rng>(
        &self,
        qubit: ClassicalQubit,
        basis: Basis,
        rng: &mut R,
    ) -> Result<Bit, StateError> {
        if qubit.basis == basis {
            Ok(qubit.bit)
        } else {
            Ok(rng.random())
        }
    }
}
