//! Simulation settings.
//!
//! ```
//! use bb84_sim::{SimulationConfig, simulate};
//!
//! let config = SimulationConfig::new()
//!     .with_qubit_count(100)
//!     .with_trial_count(3)
//!     .with_seed(42);
//!
//! let pairs = simulate(&config).unwrap();
//! assert_eq!(pairs.len(), 3);
//! ```

use crate::channel::{ClassicalChannel, DensityMatrixChannel, QubitChannel};
use crate::core::errors::{ConfigError, ProtocolError};
use crate::protocols::qkd::bb84::{Bb84, TrialResult};
use crate::protocols::qkd::eavesdropper::{InterceptResend, ResendPolicy};
use crate::trials::{TrialPair, TrialRunner};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Which qubit backend to simulate with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Density-matrix evolution with projective measurements.
    #[default]
    DensityMatrix,
    /// Classical random-number stand-in.
    Classical,
}

/// Configuration for BB84 simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Qubits sent per trial
    pub qubit_count: usize,

    /// Iterations run by [`simulate`]; each one is a clean and an eavesdropped trial
    pub trial_count: usize,

    /// Whether [`simulate_trial`] runs with the eavesdropper
    pub eavesdrop: bool,

    /// Random seed for reproducibility
    pub seed: Option<u64>,

    pub resend: ResendPolicy,

    pub backend: Backend,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            qubit_count: 10,
            trial_count: 10,
            eavesdrop: false,
            seed: None,
            resend: ResendPolicy::default(),
            backend: Backend::default(),
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_qubit_count(mut self, qubit_count: usize) -> Self {
        self.qubit_count = qubit_count;
        self
    }

    pub fn with_trial_count(mut self, trial_count: usize) -> Self {
        self.trial_count = trial_count;
        self
    }

    pub fn with_eavesdrop(mut self, eavesdrop: bool) -> Self {
        self.eavesdrop = eavesdrop;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_resend(mut self, resend: ResendPolicy) -> Self {
        self.resend = resend;
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.qubit_count == 0 {
            return Err(ConfigError::ZeroQubitCount);
        }
        if self.trial_count == 0 {
            return Err(ConfigError::ZeroTrialCount);
        }
        Ok(())
    }

    /// Seeded generator when `seed` is set, OS entropy otherwise.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Builds a protocol engine over `channel` with the configured eavesdropper.
    pub fn protocol<C: QubitChannel>(&self, channel: C) -> Bb84<C> {
        Bb84::new(channel).with_eavesdropper(InterceptResend::new(self.resend))
    }
}

/// Runs `trial_count` clean/eavesdropped pairs as configured.
pub fn simulate(config: &SimulationConfig) -> Result<Vec<TrialPair>, ProtocolError> {
    config.validate()?;
    let mut rng = config.rng();

    match config.backend {
        Backend::DensityMatrix => {
            let runner = TrialRunner::new(config.protocol(DensityMatrixChannel::new()));
            runner.run_many(config.trial_count, config.qubit_count, &mut rng)
        }
        Backend::Classical => {
            let runner = TrialRunner::new(config.protocol(ClassicalChannel));
            runner.run_many(config.trial_count, config.qubit_count, &mut rng)
        }
    }
}

/// Runs a single trial with the configured `eavesdrop` flag.
pub fn simulate_trial(config: &SimulationConfig) -> Result<TrialResult, ProtocolError> {
    config.validate()?;
    let mut rng = config.rng();

    match config.backend {
        Backend::DensityMatrix => config
            .protocol(DensityMatrixChannel::new())
            .run_trial(config.qubit_count, config.eavesdrop, &mut rng),
        Backend::Classical => config
            .protocol(ClassicalChannel)
            .run_trial(config.qubit_count, config.eavesdrop, &mut rng),
    }
}
