use crate::core::Gate;
use crate::core::errors::StateError;
use crate::core::measurements::{Measurement, MeasurementResult};
use crate::core::utils::{sandwich, trace};
use ndarray::Array2;
use num_complex::Complex64;
use rand::Rng;

/// Probabilities below this are treated as exactly zero.
const PROBABILITY_FLOOR: f64 = 1e-12;

/// Density matrix of a single qubit.
#[derive(Clone, Debug)]
pub struct QuantumState {
    density_matrix: Array2<Complex64>,
}

impl Default for QuantumState {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantumState {
    /// Creates a new quantum state initialized to |0>.
    pub fn new() -> Self {
        let mut density_matrix = Array2::<Complex64>::zeros((2, 2));
        density_matrix[[0, 0]] = Complex64::new(1.0, 0.0);

        Self { density_matrix }
    }

    pub fn density_matrix(&self) -> &Array2<Complex64> {
        &self.density_matrix
    }

    /// Checks the trace of the density matrix.
    pub fn is_valid(&self) -> Result<(), StateError> {
        let tr = trace(&self.density_matrix);
        if (tr - Complex64::new(1.0, 0.0)).norm() > 1e-12 {
            return Err(StateError::InvalidTrace(tr));
        }
        Ok(())
    }

    /// Applies a gate: rho -> U rho U†
    pub fn apply(&mut self, gate: &Gate) {
        self.density_matrix = sandwich(&gate.matrix, &self.density_matrix);
    }

    /// Returns the probability of each measurement operator.
    ///
    /// Probabilities under `PROBABILITY_FLOOR` are snapped to zero before
    /// renormalisation, so an eigenstate of the measurement gives a
    /// deterministic outcome.
    pub fn probabilities(&self, measurement: &Measurement) -> Result<Vec<f64>, StateError> {
        let mut probs: Vec<f64> = measurement
            .operators
            .iter()
            .map(|op| {
                let p_k = trace(&sandwich(op, &self.density_matrix)).re;
                if p_k < PROBABILITY_FLOOR { 0.0 } else { p_k }
            })
            .collect();

        let sum_probs: f64 = probs.iter().sum();
        if sum_probs < PROBABILITY_FLOOR {
            return Err(StateError::InvalidTrace(trace(&self.density_matrix)));
        }

        // Due to float, renormalazation of probabilities to ensure completeness
        for p in &mut probs {
            *p /= sum_probs;
        }

        Ok(probs)
    }

    /// Randomly selects operator index ponderating using `probs`
    fn pick_outcome<R: Rng>(probs: &[f64], rng: &mut R) -> usize {
        let roll: f64 = rng.random();

        let mut cumulative = 0.0;
        for (i, &p) in probs.iter().enumerate() {
            cumulative += p;
            if roll < cumulative {
                return i;
            }
        }
        // Rounding left the last bucket short; fall back to the last possible outcome.
        probs.iter().rposition(|&p| p > 0.0).unwrap_or(0)
    }

    /// Physical measurement which changes the state irretrievably.
    ///
    /// rho' = (M_k rho M_k†) / tr(M_k rho M_k†)
    pub fn measure<R: Rng>(
        &mut self,
        measurement: &Measurement,
        rng: &mut R,
    ) -> Result<MeasurementResult, StateError> {
        let probs = self.probabilities(measurement)?;

        let index = Self::pick_outcome(&probs, rng);
        let p_selected = probs[index];
        if p_selected <= 0.0 {
            return Err(StateError::ImpossibleOutcome { index });
        }

        // Normalise by the unrenormalised p_k so the trace stays at 1.
        let numerator = sandwich(&measurement.operators[index], &self.density_matrix);
        let p_k = trace(&numerator);
        self.density_matrix = numerator.mapv(|val| val / p_k);

        Ok(MeasurementResult {
            index,
            outcome: measurement.outcomes[index],
        })
    }
}
