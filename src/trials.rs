//! Repeated BB84 trials with and without an eavesdropper.
//!
//! Every protocol run gets its own `StdRng`, seeded from the caller's RNG, so
//! no two runs share a random stream while a seeded caller RNG still makes a
//! whole batch reproducible. Seeds are drawn in iteration order (clean run
//! first), which is what lets the parallel runner reproduce the sequential one.

use crate::channel::QubitChannel;
use crate::core::errors::ProtocolError;
use crate::protocols::qkd::bb84::{Bb84, TrialResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

/// One iteration: the same settings with and without eavesdropping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialPair {
    pub iteration: usize,
    pub clean: TrialResult,
    pub eavesdropped: TrialResult,
}

#[derive(Debug, Clone, Copy)]
struct IterationSeeds {
    clean: u64,
    eavesdropped: u64,
}

impl IterationSeeds {
    fn draw<R: Rng>(rng: &mut R) -> Self {
        Self {
            clean: rng.random(),
            eavesdropped: rng.random(),
        }
    }
}

/// Drives many independent runs of a [`Bb84`] engine.
#[derive(Debug, Clone, Default)]
pub struct TrialRunner<C> {
    protocol: Bb84<C>,
}

impl<C: QubitChannel> TrialRunner<C> {
    pub fn new(protocol: Bb84<C>) -> Self {
        Self { protocol }
    }

    fn run_iteration(
        &self,
        iteration: usize,
        seeds: IterationSeeds,
        qubit_count: usize,
    ) -> Result<TrialPair, ProtocolError> {
        let mut clean_rng = StdRng::seed_from_u64(seeds.clean);
        let mut eve_rng = StdRng::seed_from_u64(seeds.eavesdropped);

        Ok(TrialPair {
            iteration,
            clean: self.protocol.run_trial(qubit_count, false, &mut clean_rng)?,
            eavesdropped: self.protocol.run_trial(qubit_count, true, &mut eve_rng)?,
        })
    }

    /// Lazily yields `trial_count` pairs in iteration order.
    pub fn iter<'a, R: Rng>(
        &'a self,
        trial_count: usize,
        qubit_count: usize,
        rng: &'a mut R,
    ) -> impl Iterator<Item = Result<TrialPair, ProtocolError>> + 'a {
        (0..trial_count).map(move |iteration| {
            let seeds = IterationSeeds::draw(&mut *rng);
            self.run_iteration(iteration, seeds, qubit_count)
        })
    }

    /// Runs `trial_count` iterations and collects the pairs.
    pub fn run_many<R: Rng>(
        &self,
        trial_count: usize,
        qubit_count: usize,
        rng: &mut R,
    ) -> Result<Vec<TrialPair>, ProtocolError> {
        let pairs = self
            .iter(trial_count, qubit_count, rng)
            .collect::<Result<Vec<_>, _>>()?;
        log_batch(&pairs, qubit_count);
        Ok(pairs)
    }
}

#[cfg(feature = "parallel")]
impl<C> TrialRunner<C>
where
    C: QubitChannel + Sync,
{
    /// Same output as [`TrialRunner::run_many`] for the same `rng`, computed on
    /// the rayon thread pool.
    pub fn run_many_par<R: Rng>(
        &self,
        trial_count: usize,
        qubit_count: usize,
        rng: &mut R,
    ) -> Result<Vec<TrialPair>, ProtocolError> {
        use rayon::prelude::*;

        let seeds: Vec<IterationSeeds> = (0..trial_count)
            .map(|_| IterationSeeds::draw(&mut *rng))
            .collect();

        let pairs = seeds
            .into_par_iter()
            .enumerate()
            .map(|(iteration, seeds)| self.run_iteration(iteration, seeds, qubit_count))
            .collect::<Result<Vec<_>, _>>()?;
        log_batch(&pairs, qubit_count);
        Ok(pairs)
    }
}

fn log_batch(pairs: &[TrialPair], qubit_count: usize) {
    if let Some(summary) = Summary::from_pairs(pairs) {
        info!(
            trials = summary.trials,
            qubit_count,
            clean_mean_qber = summary.clean.mean_qber,
            eavesdropped_mean_qber = summary.eavesdropped.mean_qber,
            "bb84 batch finished"
        );
    }
}

/// QBER statistics for one flavour of run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QberStats {
    pub mean_qber: f64,
    pub min_qber: f64,
    pub max_qber: f64,
    pub mean_sifted_length: f64,
}

impl QberStats {
    fn from_results<'a>(results: impl Iterator<Item = &'a TrialResult>) -> Option<Self> {
        let mut count = 0usize;
        let mut qber_sum = 0.0;
        let mut sifted_sum = 0usize;
        let mut min_qber = f64::INFINITY;
        let mut max_qber = f64::NEG_INFINITY;

        for result in results {
            count += 1;
            qber_sum += result.qber();
            sifted_sum += result.sifted_length();
            min_qber = min_qber.min(result.qber());
            max_qber = max_qber.max(result.qber());
        }

        if count == 0 {
            return None;
        }
        Some(Self {
            mean_qber: qber_sum / count as f64,
            min_qber,
            max_qber,
            mean_sifted_length: sifted_sum as f64 / count as f64,
        })
    }
}

/// Aggregate view of a batch of [`TrialPair`]s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub trials: usize,
    pub clean: QberStats,
    pub eavesdropped: QberStats,
}

impl Summary {
    /// Returns `None` for an empty batch.
    pub fn from_pairs(pairs: &[TrialPair]) -> Option<Self> {
        Some(Self {
            trials: pairs.len(),
            clean: QberStats::from_results(pairs.iter().map(|p| &p.clean))?,
            eavesdropped: QberStats::from_results(pairs.iter().map(|p| &p.eavesdropped))?,
        })
    }

    /// How much the eavesdropper raised the mean QBER.
    pub fn qber_gap(&self) -> f64 {
        self.eavesdropped.mean_qber - self.clean.mean_qber
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ClassicalChannel, DensityMatrixChannel};

    fn runner() -> TrialRunner<DensityMatrixChannel> {
        TrialRunner::new(Bb84::new(DensityMatrixChannel::new()))
    }

    #[test]
    fn produces_one_pair_per_iteration() {
        let mut rng = StdRng::seed_from_u64(10);
        let pairs = runner().run_many(10, 10, &mut rng).unwrap();

        assert_eq!(pairs.len(), 10);
        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(pair.iteration, i);
            assert!(!pair.clean.eavesdropped());
            assert!(pair.eavesdropped.eavesdropped());
            assert_eq!(pair.clean.raw_length(), 10);
            assert_eq!(pair.eavesdropped.raw_length(), 10);
        }
    }

    #[test]
    fn zero_trials_is_an_empty_batch() {
        let mut rng = StdRng::seed_from_u64(11);
        let pairs = runner().run_many(0, 10, &mut rng).unwrap();
        assert!(pairs.is_empty());
        assert!(Summary::from_pairs(&pairs).is_none());
    }

    #[test]
    fn seeded_batches_are_reproducible() {
        let a = runner()
            .run_many(5, 50, &mut StdRng::seed_from_u64(12))
            .unwrap();
        let b = runner()
            .run_many(5, 50, &mut StdRng::seed_from_u64(12))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn runs_do_not_share_randomness() {
        let mut rng = StdRng::seed_from_u64(13);
        let pairs = runner().run_many(4, 200, &mut rng).unwrap();

        let sender_bits = |r: &TrialResult| {
            r.records()
                .iter()
                .map(|x| x.sender_bit)
                .collect::<Vec<_>>()
        };
        for pair in &pairs {
            assert_ne!(sender_bits(&pair.clean), sender_bits(&pair.eavesdropped));
        }
        assert_ne!(sender_bits(&pairs[0].clean), sender_bits(&pairs[1].clean));
    }

    #[test]
    fn lazy_iterator_matches_eager_run() {
        let runner = TrialRunner::new(Bb84::new(ClassicalChannel));
        let eager = runner
            .run_many(3, 40, &mut StdRng::seed_from_u64(14))
            .unwrap();

        let mut rng = StdRng::seed_from_u64(14);
        let lazy: Vec<_> = runner
            .iter(3, 40, &mut rng)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(eager, lazy);
    }

    #[test]
    fn summary_separates_clean_and_eavesdropped_runs() {
        let mut rng = StdRng::seed_from_u64(15);
        let pairs = runner().run_many(10, 500, &mut rng).unwrap();
        let summary = Summary::from_pairs(&pairs).unwrap();

        assert_eq!(summary.trials, 10);
        assert_eq!(summary.clean.max_qber, 0.0);
        assert!(summary.eavesdropped.min_qber > 0.0);
        assert!(summary.qber_gap() > 0.2);
        assert!(summary.clean.mean_sifted_length > 200.0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_runner_matches_sequential() {
        let sequential = runner()
            .run_many(8, 100, &mut StdRng::seed_from_u64(16))
            .unwrap();
        let parallel = runner()
            .run_many_par(8, 100, &mut StdRng::seed_from_u64(16))
            .unwrap();
        assert_eq!(sequential, parallel);
    }
}
