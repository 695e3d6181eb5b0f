//! Classical values exchanged by the protocol.
//!
//! A [`Bit`] carries key material, a [`Basis`] says how a bit is encoded on a
//! qubit. The two are distinct types so a basis selector can never end up in
//! a key by accident; the 0/1 selector view of a basis is only reachable
//! through [`Basis::selector`] and [`Basis::from_selector`].

use crate::core::errors::ConfigError;
use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A classical bit, serialized as `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Bit {
    Zero,
    One,
}

impl Bit {
    pub fn as_u8(self) -> u8 {
        match self {
            Bit::Zero => 0,
            Bit::One => 1,
        }
    }

    pub fn is_one(self) -> bool {
        self == Bit::One
    }

    pub fn flip(self) -> Bit {
        match self {
            Bit::Zero => Bit::One,
            Bit::One => Bit::Zero,
        }
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value { Bit::One } else { Bit::Zero }
    }
}

impl From<Bit> for bool {
    fn from(bit: Bit) -> Self {
        bit.is_one()
    }
}

impl From<Bit> for u8 {
    fn from(bit: Bit) -> Self {
        bit.as_u8()
    }
}

impl TryFrom<u8> for Bit {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Bit::Zero),
            1 => Ok(Bit::One),
            other => Err(ConfigError::InvalidBit(other)),
        }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl Distribution<Bit> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Bit {
        Bit::from(rng.random::<bool>())
    }
}

/// One of the two mutually unbiased single-qubit bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Basis {
    /// Computational (Z) basis: |0>, |1>.
    Rectilinear,
    /// Hadamard (X) basis: |+>, |->.
    Diagonal,
}

impl Basis {
    /// Maps selector 0 to rectilinear and 1 to diagonal.
    pub fn from_selector(selector: Bit) -> Self {
        match selector {
            Bit::Zero => Basis::Rectilinear,
            Bit::One => Basis::Diagonal,
        }
    }

    pub fn selector(self) -> Bit {
        match self {
            Basis::Rectilinear => Bit::Zero,
            Basis::Diagonal => Bit::One,
        }
    }

    /// The conjugate basis.
    pub fn other(self) -> Basis {
        match self {
            Basis::Rectilinear => Basis::Diagonal,
            Basis::Diagonal => Basis::Rectilinear,
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::Rectilinear => f.write_str("+"),
            Basis::Diagonal => f.write_str("x"),
        }
    }
}

impl Distribution<Basis> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Basis {
        Basis::from_selector(rng.random::<Bit>())
    }
}

/// Parses a slice of raw 0/1 values into bits.
pub fn bits_from_u8(values: &[u8]) -> Result<Vec<Bit>, ConfigError> {
    values.iter().map(|&v| Bit::try_from(v)).collect()
}

/// Parses a slice of raw 0/1 selectors into bases.
pub fn bases_from_u8(values: &[u8]) -> Result<Vec<Basis>, ConfigError> {
    values
        .iter()
        .map(|&v| Bit::try_from(v).map(Basis::from_selector))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn bit_conversions() {
        assert_eq!(Bit::try_from(0), Ok(Bit::Zero));
        assert_eq!(Bit::try_from(1), Ok(Bit::One));
        assert_eq!(Bit::try_from(2), Err(ConfigError::InvalidBit(2)));
        assert_eq!(Bit::from(true), Bit::One);
        assert!(!bool::from(Bit::Zero));
        assert_eq!(Bit::One.flip(), Bit::Zero);
    }

    #[test]
    fn basis_selector_is_explicit() {
        assert_eq!(Basis::from_selector(Bit::Zero), Basis::Rectilinear);
        assert_eq!(Basis::from_selector(Bit::One), Basis::Diagonal);
        assert_eq!(Basis::Diagonal.selector(), Bit::One);
        assert_eq!(Basis::Rectilinear.other(), Basis::Diagonal);
    }

    #[test]
    fn parse_raw_sequences() {
        assert_eq!(
            bases_from_u8(&[0, 1]).unwrap(),
            vec![Basis::Rectilinear, Basis::Diagonal]
        );
        assert_eq!(bits_from_u8(&[1, 0, 3]), Err(ConfigError::InvalidBit(3)));
    }

    #[test]
    fn sampling_covers_both_values() {
        let mut rng = StdRng::seed_from_u64(7);
        let ones = (0..10_000).filter(|_| rng.random::<Bit>().is_one()).count();
        let diagonal = (0..10_000)
            .filter(|_| rng.random::<Basis>() == Basis::Diagonal)
            .count();

        assert!((4_500..5_500).contains(&ones), "ones = {ones}");
        assert!((4_500..5_500).contains(&diagonal), "diagonal = {diagonal}");
    }

    #[test]
    fn bits_serialize_as_integers() {
        let json = serde_json::to_string(&vec![Bit::Zero, Bit::One]).unwrap();
        assert_eq!(json, "[0,1]");
        let basis: Basis = serde_json::from_str("\"diagonal\"").unwrap();
        assert_eq!(basis, Basis::Diagonal);
    }
}
