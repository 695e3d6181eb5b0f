//! BB84 Quantum Key Distribution Protocol.
//!
//! The sender encodes random bits in random bases, the receiver measures in
//! bases of its own choosing, and both keep only the positions where the
//! bases agree (sifting). The error rate on the sifted key (QBER) reveals an
//! intercept-resend eavesdropper.

use crate::channel::{DensityMatrixChannel, QubitChannel};
use crate::core::errors::{ConfigError, ProtocolError};
use crate::core::types::{bases_from_u8, bits_from_u8};
use crate::core::{Basis, Bit};
use crate::protocols::qkd::eavesdropper::InterceptResend;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// What happened to one qubit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransmissionRecord {
    pub index: usize,
    pub sender_bit: Bit,
    pub sender_basis: Basis,
    /// `None` when the qubit was not intercepted.
    pub eavesdropper_basis: Option<Basis>,
    pub receiver_basis: Basis,
    pub receiver_bit: Bit,
}

impl TransmissionRecord {
    pub fn bases_match(&self) -> bool {
        self.sender_basis == self.receiver_basis
    }
}

/// Sender and receiver keys after sifting. Both sides always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiftedKey {
    positions: Vec<usize>,
    sender: Vec<Bit>,
    receiver: Vec<Bit>,
}

impl SiftedKey {
    /// Transmission indices that survived sifting, ascending.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn sender(&self) -> &[Bit] {
        &self.sender
    }

    pub fn receiver(&self) -> &[Bit] {
        &self.receiver
    }

    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}

/// Keeps the positions where sender and receiver chose the same basis, in order.
pub fn sift(records: &[TransmissionRecord]) -> SiftedKey {
    let mut key = SiftedKey::default();
    for record in records.iter().filter(|r| r.bases_match()) {
        key.positions.push(record.index);
        key.sender.push(record.sender_bit);
        key.receiver.push(record.receiver_bit);
    }
    key
}

/// Counts disagreeing sifted positions and returns `(errors, qber)`.
///
/// An empty sifted key has a QBER of 0.0.
pub fn qber(key: &SiftedKey) -> (usize, f64) {
    let errors = key
        .sender
        .iter()
        .zip(&key.receiver)
        .filter(|(a, b)| a != b)
        .count();

    let rate = if key.is_empty() {
        0.0
    } else {
        errors as f64 / key.len() as f64
    };
    (errors, rate)
}

/// Outcome of one BB84 trial: the per-qubit records, the sifted key and its
/// error count and QBER.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialResult {
    records: Vec<TransmissionRecord>,
    sifted: SiftedKey,
    errors: usize,
    qber: f64,
    eavesdropped: bool,
}

impl TrialResult {
    fn from_records(records: Vec<TransmissionRecord>, eavesdropped: bool) -> Self {
        let sifted = sift(&records);
        let (errors, qber) = qber(&sifted);
        Self {
            records,
            sifted,
            errors,
            qber,
            eavesdropped,
        }
    }

    pub fn records(&self) -> &[TransmissionRecord] {
        &self.records
    }

    pub fn sifted(&self) -> &SiftedKey {
        &self.sifted
    }

    pub fn raw_length(&self) -> usize {
        self.records.len()
    }

    pub fn sifted_length(&self) -> usize {
        self.sifted.len()
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn qber(&self) -> f64 {
        self.qber
    }

    /// QBER rounded to 4 decimal places, as usually reported.
    pub fn qber_rounded(&self) -> f64 {
        (self.qber * 10_000.0).round() / 10_000.0
    }

    pub fn eavesdropped(&self) -> bool {
        self.eavesdropped
    }

    /// True when the observed QBER is strictly above `threshold`.
    pub fn exceeds_qber(&self, threshold: f64) -> bool {
        self.qber > threshold
    }
}

/// Caller-chosen bits and bases for a reproducible trial.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialChoices {
    pub sender_bits: Vec<Bit>,
    pub sender_bases: Vec<Basis>,
    pub receiver_bases: Vec<Basis>,
}

impl TrialChoices {
    /// Builds choices from raw 0/1 values (0 = rectilinear, 1 = diagonal for bases).
    pub fn from_u8(
        sender_bits: &[u8],
        sender_bases: &[u8],
        receiver_bases: &[u8],
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            sender_bits: bits_from_u8(sender_bits)?,
            sender_bases: bases_from_u8(sender_bases)?,
            receiver_bases: bases_from_u8(receiver_bases)?,
        })
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        let expected = self.sender_bits.len();
        for (field, got) in [
            ("sender bases", self.sender_bases.len()),
            ("receiver bases", self.receiver_bases.len()),
        ] {
            if got != expected {
                return Err(ProtocolError::ChoiceLengthMismatch {
                    field,
                    expected,
                    got,
                });
            }
        }
        Ok(())
    }
}

/// Qubits in flight to the receiver, with the eavesdropper's basis per qubit.
struct Transmission<S> {
    states: Vec<S>,
    eavesdropper_bases: Vec<Option<Basis>>,
}

/// The BB84 protocol engine over a qubit channel.
#[derive(Debug, Clone, Default)]
pub struct Bb84<C> {
    channel: C,
    eavesdropper: InterceptResend,
}

impl<C: QubitChannel> Bb84<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            eavesdropper: InterceptResend::default(),
        }
    }

    /// Sets the eavesdropper used when a trial runs with `eavesdrop = true`.
    pub fn with_eavesdropper(mut self, eavesdropper: InterceptResend) -> Self {
        self.eavesdropper = eavesdropper;
        self
    }

    pub fn eavesdropper(&self) -> &InterceptResend {
        &self.eavesdropper
    }

    /// Runs one trial of `qubit_count` qubits.
    ///
    /// Randomness is consumed in protocol order: sender bits, sender bases,
    /// eavesdropping (if any), receiver bases, then measurement. A
    /// `qubit_count` of zero yields an empty trial with QBER 0.0.
    pub fn run_trial<R: Rng>(
        &self,
        qubit_count: usize,
        eavesdrop: bool,
        rng: &mut R,
    ) -> Result<TrialResult, ProtocolError> {
        let sender_bits: Vec<Bit> = (0..qubit_count).map(|_| rng.random()).collect();
        let sender_bases: Vec<Basis> = (0..qubit_count).map(|_| rng.random()).collect();

        let sent = self.transmit(&sender_bits, &sender_bases, eavesdrop, rng)?;

        let choices = TrialChoices {
            sender_bits,
            sender_bases,
            receiver_bases: (0..qubit_count).map(|_| rng.random()).collect(),
        };
        self.receive(sent, &choices, eavesdrop, rng)
    }

    /// Runs one trial with caller-supplied bits and bases.
    ///
    /// `rng` still drives measurement outcomes and the eavesdropper.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::ChoiceLengthMismatch` if the three sequences
    /// differ in length.
    pub fn run_with_choices<R: Rng>(
        &self,
        choices: &TrialChoices,
        eavesdrop: bool,
        rng: &mut R,
    ) -> Result<TrialResult, ProtocolError> {
        choices.validate()?;

        let sent = self.transmit(&choices.sender_bits, &choices.sender_bases, eavesdrop, rng)?;
        self.receive(sent, choices, eavesdrop, rng)
    }

    /// Prepares every qubit and, if requested, passes it through the eavesdropper.
    fn transmit<R: Rng>(
        &self,
        bits: &[Bit],
        bases: &[Basis],
        eavesdrop: bool,
        rng: &mut R,
    ) -> Result<Transmission<C::State>, ProtocolError> {
        let mut states = Vec::with_capacity(bits.len());
        let mut eavesdropper_bases = Vec::with_capacity(bits.len());

        for (&bit, &basis) in bits.iter().zip(bases) {
            let state = self.channel.prepare(bit, basis)?;

            if eavesdrop {
                let interception = self.eavesdropper.intercept(&self.channel, state, rng)?;
                states.push(interception.state);
                eavesdropper_bases.push(Some(interception.basis));
            } else {
                states.push(state);
                eavesdropper_bases.push(None);
            }
        }

        Ok(Transmission {
            states,
            eavesdropper_bases,
        })
    }

    /// Measures every forwarded qubit in the receiver's basis and records it.
    fn receive<R: Rng>(
        &self,
        sent: Transmission<C::State>,
        choices: &TrialChoices,
        eavesdrop: bool,
        rng: &mut R,
    ) -> Result<TrialResult, ProtocolError> {
        let mut records = Vec::with_capacity(sent.states.len());

        for (index, state) in sent.states.into_iter().enumerate() {
            let receiver_basis = choices.receiver_bases[index];
            let receiver_bit = self.channel.measure(state, receiver_basis, rng)?;

            records.push(TransmissionRecord {
                index,
                sender_bit: choices.sender_bits[index],
                sender_basis: choices.sender_bases[index],
                eavesdropper_basis: sent.eavesdropper_bases[index],
                receiver_basis,
                receiver_bit,
            });
        }

        let result = TrialResult::from_records(records, eavesdrop);
        debug!(
            qubits = result.raw_length(),
            sifted = result.sifted_length(),
            errors = result.errors(),
            qber = result.qber(),
            eavesdrop,
            "bb84 trial finished"
        );
        Ok(result)
    }
}

/// Runs one BB84 trial on the density-matrix backend with the thread RNG.
pub fn run(qubit_count: usize, eavesdrop: bool) -> Result<TrialResult, ProtocolError> {
    let mut rng = rand::rng();
    Bb84::new(DensityMatrixChannel::new()).run_trial(qubit_count, eavesdrop, &mut rng)
}
