//! Concrete partially homomorphic schemes.
//!
//! Every bundled scheme represents a ciphertext as one residue, so the
//! capability traits work on bare [BigInt]s; key binding and schema tags are
//! handled one level up by [Ciphertext](crate::Ciphertext) and
//! [Plaintext](crate::Plaintext).

pub(crate) mod dj;
pub(crate) mod mock;
pub(crate) mod ou;
pub(crate) mod paillier_ic;
pub(crate) mod paillier_z;

use std::ops::RangeInclusive;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed};

use crate::{HeError, Result, SchemaType};

pub use dj::{DjPublicKey, DjSecretKey};
pub use mock::{MockPublicKey, MockSecretKey};
pub use ou::{OuPublicKey, OuSecretKey};
pub use paillier_ic::{IcPaillierPublicKey, IcPaillierSecretKey};
pub use paillier_z::{ZPaillierPublicKey, ZPaillierSecretKey};

/// Public-key capabilities of a scheme: everything that needs no secret.
///
/// Implementations are pure functions of their arguments and the
/// (immutable) key, so one key may serve any number of threads.
pub trait PheScheme: Send + Sync {
    /// The scheme behind this key.
    fn schema(&self) -> SchemaType;
    /// Key size in bits, as requested at key generation.
    fn key_size(&self) -> usize;
    /// Exclusive bound of the symmetric plaintext range: valid plaintexts
    /// satisfy `|m| < bound`.
    fn plaintext_bound(&self) -> &BigInt;
    /// Encrypt a plaintext in range, [HeError::Domain] otherwise.
    fn encrypt(&self, m: &BigInt) -> Result<BigInt>;
    /// Encrypt and describe the randomness used.
    fn encrypt_with_audit(&self, m: &BigInt) -> Result<(BigInt, String)>;
    /// Encryption of zero with fresh randomness.
    fn encrypt_zero(&self) -> BigInt;
    /// Ciphertext of `a + b`.
    fn add(&self, a: &BigInt, b: &BigInt) -> BigInt;
    /// Ciphertext of `a + p` for a plaintext `p` in range.
    fn add_plain(&self, a: &BigInt, p: &BigInt) -> Result<BigInt>;
    /// Ciphertext of `-a`.
    fn negate(&self, a: &BigInt) -> Result<BigInt>;
    /// Ciphertext of `a * p` for any integer `p`.
    fn mul_plain(&self, a: &BigInt, p: &BigInt) -> Result<BigInt>;
    /// Same plaintext, fresh randomness.
    fn randomize(&self, a: &BigInt) -> BigInt {
        self.add(a, &self.encrypt_zero())
    }
    /// Does `c` lie in the ciphertext space of this key?
    fn is_valid_ciphertext(&self, c: &BigInt) -> bool;
}

/// Secret-key capability of a scheme.
pub trait PheDecrypt: Send + Sync {
    /// Recover the signed plaintext of a ciphertext.
    fn decrypt(&self, c: &BigInt) -> Result<BigInt>;
}

/// Flat view of a key, used by the binary serialization: the key size plus
/// the independent big integers the key is rebuilt from.
pub(crate) trait KeyParts: Sized {
    fn bits(&self) -> usize;
    fn parts(&self) -> Vec<BigInt>;
    fn from_parts(key_size: usize, parts: Vec<BigInt>) -> Result<Self>;
}

pub(crate) fn take_parts<const N: usize>(parts: Vec<BigInt>, schema: SchemaType) -> Result<[BigInt; N]> {
    let count = parts.len();
    parts.try_into().map_err(|_| HeError::Serialization(format!(
        "{} key expects {} components, got {}", schema, N, count
    )))
}

/// Key components read from bytes must be positive and `bits` long.
pub(crate) fn check_key_part(part: &BigInt, bits: RangeInclusive<u64>, name: &str, schema: SchemaType) -> Result<()> {
    if !part.is_positive() || !bits.contains(&part.bits()) {
        return Err(HeError::Serialization(format!(
            "malformed {} key: {} has {} bits, expected {:?}", schema, name, part.bits(), bits
        )));
    }
    Ok(())
}

/// Key components that are residues must lie in `(0, modulus)`.
pub(crate) fn check_key_residue(part: &BigInt, modulus: &BigInt, name: &str, schema: SchemaType) -> Result<()> {
    if !part.is_positive() || part >= modulus {
        return Err(HeError::Serialization(format!("malformed {} key: {} out of range", schema, name)));
    }
    Ok(())
}

pub(crate) fn check_plaintext_range(m: &BigInt, bound: &BigInt, schema: SchemaType) -> Result<()> {
    if &m.abs() >= bound {
        return Err(HeError::Domain(format!(
            "plaintext {:x} out of range for {}, max (abs) is {:x}", m, schema, bound - 1u32
        )));
    }
    Ok(())
}

pub(crate) fn check_ciphertext_range(c: &BigInt, modulus: &BigInt, schema: SchemaType) -> Result<()> {
    if !c.is_positive() || c >= modulus {
        return Err(HeError::Domain(format!(
            "ciphertext is not a valid {} residue", schema
        )));
    }
    Ok(())
}

/// `(1 + n)^m mod n^2`, computed directly as `1 + n * (m mod n)`.
pub(crate) fn paillier_gm(m: &BigInt, n: &BigInt, n_square: &BigInt) -> BigInt {
    (BigInt::one() + n * m.mod_floor(n)) % n_square
}

/// Paillier `L(x) = (x - 1) / n`.
pub(crate) fn paillier_l(x: &BigInt, n: &BigInt) -> BigInt {
    (x - 1u32) / n
}
