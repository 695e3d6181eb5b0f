//! Intercept-resend eavesdropping.
//!
//! The eavesdropper sits on the quantum channel between sender and receiver.
//! For every qubit it picks a basis at random, measures (destroying the
//! sender's state) and forwards a freshly prepared qubit in that same basis.
//! Its classical observations are never compared with anyone's key.

use crate::channel::QubitChannel;
use crate::core::errors::StateError;
use crate::core::{Basis, Bit};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Which bit the eavesdropper encodes on the qubit it forwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResendPolicy {
    /// Forward an independent uniform bit; the measured bit is thrown away.
    ///
    /// The receiver's sifted bits end up independent of the sender's, so the
    /// sifted QBER tends to 1/2.
    #[default]
    FreshBit,
    /// Forward the bit just measured (textbook intercept-resend).
    ///
    /// Errors only appear when the eavesdropper guessed the wrong basis, so
    /// the sifted QBER tends to 1/4.
    MeasuredBit,
}

/// Result of intercepting one qubit.
#[derive(Debug)]
pub struct Interception<S> {
    /// The replacement qubit forwarded to the receiver.
    pub state: S,
    /// Basis the eavesdropper measured and re-prepared in.
    pub basis: Basis,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptResend {
    pub policy: ResendPolicy,
}

impl InterceptResend {
    pub fn new(policy: ResendPolicy) -> Self {
        Self { policy }
    }

    /// Measures `state` in a random basis and returns a new qubit prepared in
    /// the same basis.
    ///
    /// # Errors
    ///
    /// Propagates any `StateError` raised by the channel.
    pub fn intercept<C: QubitChannel, R: Rng>(
        &self,
        channel: &C,
        state: C::State,
        rng: &mut R,
    ) -> Result<Interception<C::State>, StateError> {
        let basis: Basis = rng.random();
        let measured = channel.measure(state, basis, rng)?;

        let resent = match self.policy {
            ResendPolicy::FreshBit => rng.random::<Bit>(),
            ResendPolicy::MeasuredBit => measured,
        };
        trace!(%basis, %measured, %resent, "intercepted qubit");

        Ok(Interception {
            state: channel.prepare(resent, basis)?,
            basis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ClassicalChannel, DensityMatrixChannel};
    use crate::core::Measurement;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const RUNS: usize = 20_000;

    /// Fraction of qubits whose receiver bit differs from the sender bit when
    /// the receiver measures in the sender's basis.
    fn disturbance<C: QubitChannel>(channel: &C, eve: InterceptResend, seed: u64) -> f64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut errors = 0;
        for _ in 0..RUNS {
            let bit: Bit = rng.random();
            let basis: Basis = rng.random();
            let state = channel.prepare(bit, basis).unwrap();
            let intercepted = eve.intercept(channel, state, &mut rng).unwrap();
            if channel.measure(intercepted.state, basis, &mut rng).unwrap() != bit {
                errors += 1;
            }
        }
        errors as f64 / RUNS as f64
    }

    #[test]
    fn default_policy_resends_fresh_bit() {
        assert_eq!(InterceptResend::default().policy, ResendPolicy::FreshBit);
    }

    #[test]
    fn measured_bit_policy_disturbs_a_quarter() {
        let eve = InterceptResend::new(ResendPolicy::MeasuredBit);
        let rate = disturbance(&DensityMatrixChannel::new(), eve, 21);
        assert!((rate - 0.25).abs() < 0.02, "rate = {rate}");
    }

    #[test]
    fn fresh_bit_policy_decorrelates_receiver() {
        let eve = InterceptResend::new(ResendPolicy::FreshBit);
        let rate = disturbance(&ClassicalChannel, eve, 22);
        assert!((rate - 0.5).abs() < 0.02, "rate = {rate}");
    }

    #[test]
    fn measured_bit_survives_a_matching_guess() {
        let channel = DensityMatrixChannel::new();
        let eve = InterceptResend::new(ResendPolicy::MeasuredBit);
        let mut rng = StdRng::seed_from_u64(23);

        for _ in 0..200 {
            let state = channel.prepare(Bit::One, Basis::Rectilinear).unwrap();
            let intercepted = eve.intercept(&channel, state, &mut rng).unwrap();
            if intercepted.basis == Basis::Rectilinear {
                // Matching guess: the measured bit is the sender's bit.
                let bit = channel
                    .measure(intercepted.state, Basis::Rectilinear, &mut rng)
                    .unwrap();
                assert_eq!(bit, Bit::One);
            }
        }
    }

    #[test]
    fn forwarded_qubit_is_an_eigenstate_of_eavesdropper_basis() {
        let channel = DensityMatrixChannel::new();
        let mut rng = StdRng::seed_from_u64(24);

        for policy in [ResendPolicy::FreshBit, ResendPolicy::MeasuredBit] {
            let eve = InterceptResend::new(policy);
            for _ in 0..200 {
                let bit: Bit = rng.random();
                let basis: Basis = rng.random();
                let state = channel.prepare(bit, basis).unwrap();
                let intercepted = eve.intercept(&channel, state, &mut rng).unwrap();

                let probs = intercepted
                    .state
                    .state()
                    .probabilities(&Measurement::for_basis(intercepted.basis))
                    .unwrap();
                assert!(
                    probs == [1.0, 0.0] || probs == [0.0, 1.0],
                    "{policy:?}: resend in {} gave {probs:?}",
                    intercepted.basis
                );
            }
        }
    }
}
