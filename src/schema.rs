use std::fmt;
use std::str::FromStr;

use crate::{HeError, Result};

/// Describes the homomorphic encryption scheme behind a context.
///
/// A schema is resolvable from the enum itself or from any of its
/// case-insensitive aliases (see [SchemaType::aliases]). The first alias is
/// the display name.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, serde::Serialize, serde::Deserialize)]
pub enum SchemaType {
    /// Non-cryptographic stand-in that keeps plaintexts in the clear. For tests only.
    Mock,
    /// Okamoto–Uchiyama.
    /// - The original paper: [A New Public-Key Cryptosystem as Secure as Factoring](https://doi.org/10.1007/BFb0054135)
    OU,
    /// Paillier with a fixed-base randomizer `h_s^r`, decrypting through CRT.
    #[default]
    ZPaillier,
    /// Textbook Paillier with `g = n + 1` and a fresh `r^n` per encryption.
    /// - The original paper: [Public-Key Cryptosystems Based on Composite Degree Residuosity Classes](https://doi.org/10.1007/3-540-48910-X_16)
    IcPaillier,
    /// Damgård–Jurik, the `n^(s+1)` generalization of Paillier.
    /// - The original paper: [A Generalisation, a Simplification and Some Applications of Paillier's Probabilistic Public-Key System](https://doi.org/10.1007/3-540-44586-2_9)
    DJ,
}

const MOCK_ALIASES: &[&str] = &["none", "mock", "plain"];
const OU_ALIASES: &[&str] = &["ou", "okamoto-uchiyama"];
const ZPAILLIER_ALIASES: &[&str] = &["z-paillier", "zpaillier", "paillier", "paillier_z", "paillier_zahlen"];
const ICPAILLIER_ALIASES: &[&str] = &["ic-paillier", "icpaillier", "ic_paillier", "paillier_ic", "paillier-interconnection"];
const DJ_ALIASES: &[&str] = &["dj", "damgard-jurik", "damgard_jurik"];

impl SchemaType {

    /// Largest key size accepted by key generation and deserialization.
    pub const MAX_KEY_SIZE: usize = 1 << 15;

    /// Every supported schema.
    pub fn all() -> &'static [SchemaType] {
        &[SchemaType::Mock, SchemaType::OU, SchemaType::ZPaillier, SchemaType::IcPaillier, SchemaType::DJ]
    }

    /// Every accepted alias for this schema, display name first.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            SchemaType::Mock => MOCK_ALIASES,
            SchemaType::OU => OU_ALIASES,
            SchemaType::ZPaillier => ZPAILLIER_ALIASES,
            SchemaType::IcPaillier => ICPAILLIER_ALIASES,
            SchemaType::DJ => DJ_ALIASES,
        }
    }

    /// Human readable name.
    pub fn name(&self) -> &'static str {
        self.aliases()[0]
    }

    /// Smallest key size accepted by key generation.
    ///
    /// Every real scheme at its minimum key size still has a plaintext bound
    /// above `2^128`.
    pub fn min_key_size(&self) -> usize {
        match self {
            SchemaType::Mock => 256,
            SchemaType::OU => 1024,
            SchemaType::ZPaillier | SchemaType::IcPaillier | SchemaType::DJ => 512,
        }
    }

    /// Key size used when none is specified.
    pub fn default_key_size(&self) -> usize {
        2048
    }

}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SchemaType {
    type Err = HeError;
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        SchemaType::all().iter()
            .find(|schema| schema.aliases().contains(&lowered.as_str()))
            .copied()
            .ok_or_else(|| HeError::UnknownSchema(s.to_string()))
    }
}

impl From<SchemaType> for u8 {
    fn from(val: SchemaType) -> Self {
        match val {
            SchemaType::Mock => 0,
            SchemaType::OU => 1,
            SchemaType::ZPaillier => 2,
            SchemaType::IcPaillier => 3,
            SchemaType::DJ => 4,
        }
    }
}

impl TryFrom<u8> for SchemaType {
    type Error = HeError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(SchemaType::Mock),
            1 => Ok(SchemaType::OU),
            2 => Ok(SchemaType::ZPaillier),
            3 => Ok(SchemaType::IcPaillier),
            4 => Ok(SchemaType::DJ),
            _ => Err(HeError::UnknownSchema(format!("schema tag {}", value))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("paillier".parse::<SchemaType>().unwrap(), SchemaType::ZPaillier);
        assert_eq!("Z-Paillier".parse::<SchemaType>().unwrap(), SchemaType::ZPaillier);
        assert_eq!("PLAIN".parse::<SchemaType>().unwrap(), SchemaType::Mock);
        assert_eq!("none".parse::<SchemaType>().unwrap(), SchemaType::Mock);
        assert_eq!("mock".parse::<SchemaType>().unwrap(), SchemaType::Mock);
        assert_eq!("okamoto-uchiyama".parse::<SchemaType>().unwrap(), SchemaType::OU);
        assert_eq!("Paillier_IC".parse::<SchemaType>().unwrap(), SchemaType::IcPaillier);
        assert_eq!("damgard_jurik".parse::<SchemaType>().unwrap(), SchemaType::DJ);
        let err = "rsa".parse::<SchemaType>().unwrap_err();
        assert!(matches!(err, HeError::UnknownSchema(_)));
        assert!(err.to_string().contains("z-paillier"));
    }

    #[test]
    fn test_names_and_tags() {
        for schema in SchemaType::all() {
            assert_eq!(schema.to_string().parse::<SchemaType>().unwrap(), *schema);
            for alias in schema.aliases() {
                assert_eq!(alias.parse::<SchemaType>().unwrap(), *schema);
            }
            let tag: u8 = (*schema).into();
            assert_eq!(SchemaType::try_from(tag).unwrap(), *schema);
        }
        assert!(SchemaType::try_from(9).is_err());
        assert_eq!(SchemaType::default(), SchemaType::ZPaillier);
    }

}
