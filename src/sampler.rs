use crate::channel::QubitChannel;
use crate::core::errors::StateError;
use crate::core::{Basis, Bit};
use rand::Rng;
use serde::Serialize;

/// Outcome histogram of a single-qubit experiment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub zeros: usize,
    pub ones: usize,
}

impl OutcomeCounts {
    pub fn shots(&self) -> usize {
        self.zeros + self.ones
    }

    /// Fraction of shots that returned `bit` (0.0 for an empty histogram).
    pub fn frequency(&self, bit: Bit) -> f64 {
        let shots = self.shots();
        if shots == 0 {
            return 0.0;
        }
        let hits = match bit {
            Bit::Zero => self.zeros,
            Bit::One => self.ones,
        };
        hits as f64 / shots as f64
    }

    fn record(&mut self, bit: Bit) {
        match bit {
            Bit::Zero => self.zeros += 1,
            Bit::One => self.ones += 1,
        }
    }
}

/// Repeats prepare-then-measure experiments on a channel.
///
/// The `Sampler` prepares a fresh qubit for every shot, so the histogram
/// estimates the channel's outcome distribution for one encoding and one
/// measurement basis.
#[derive(Debug, Clone, Default)]
pub struct Sampler<C> {
    channel: C,
}

impl<C: QubitChannel> Sampler<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Prepares `bit` in `prepare_basis` and measures it in `measure_basis`,
    /// `num_shots` times.
    ///
    /// # Errors
    ///
    /// Propagates any `StateError` raised by the channel.
    pub fn run<R: Rng>(
        &self,
        bit: Bit,
        prepare_basis: Basis,
        measure_basis: Basis,
        num_shots: usize,
        rng: &mut R,
    ) -> Result<OutcomeCounts, StateError> {
        let mut counts = OutcomeCounts::default();

        for _ in 0..num_shots {
            let state = self.channel.prepare(bit, prepare_basis)?;
            counts.record(self.channel.measure(state, measure_basis, rng)?);
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::DensityMatrixChannel;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn matched_basis_histogram_is_a_single_spike() {
        let sampler = Sampler::new(DensityMatrixChannel::new());
        let mut rng = StdRng::seed_from_u64(5);

        let counts = sampler
            .run(Bit::One, Basis::Diagonal, Basis::Diagonal, 2_000, &mut rng)
            .unwrap();

        assert_eq!(counts, OutcomeCounts { zeros: 0, ones: 2_000 });
        assert_eq!(counts.frequency(Bit::One), 1.0);
    }

    #[test]
    fn mismatched_basis_histogram_is_flat() {
        let sampler = Sampler::new(DensityMatrixChannel::new());
        let mut rng = StdRng::seed_from_u64(6);

        let counts = sampler
            .run(Bit::Zero, Basis::Rectilinear, Basis::Diagonal, 10_000, &mut rng)
            .unwrap();

        assert_eq!(counts.shots(), 10_000);
        assert!((counts.frequency(Bit::Zero) - 0.5).abs() < 0.05);
    }

    #[test]
    fn empty_histogram_has_zero_frequency() {
        assert_eq!(OutcomeCounts::default().frequency(Bit::One), 0.0);
    }
}
