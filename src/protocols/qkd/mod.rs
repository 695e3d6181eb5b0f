//! Quantum Key Distribution (QKD).
//!
//! - **bb84**: the BB84 protocol engine, sifting and QBER estimation.
//! - **eavesdropper**: intercept-resend attack on the quantum channel.

pub mod bb84;
pub mod eavesdropper;
