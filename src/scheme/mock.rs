use num_bigint::{BigInt, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Signed};

use super::{check_plaintext_range, take_parts, KeyParts, PheDecrypt, PheScheme};
use crate::{util, HeError, Result, SchemaType};

/// Bits of the random nonce that tells two mock key pairs apart.
const NONCE_BITS: u64 = 128;

/// Public key of the mock scheme: the size of the plaintext ring plus a
/// random nonce, so independently generated keys get distinct
/// [KeyId](crate::KeyId)s.
///
/// Ciphertexts are the plaintexts themselves, reduced into
/// `[-2^(key_size-1), 2^(key_size-1))`, so every homomorphic operation wraps
/// exactly like a real scheme would.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MockPublicKey {
    key_size: usize,
    nonce: BigInt,
    modulus: BigInt,
    bound: BigInt,
}

/// Secret key of the mock scheme.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MockSecretKey {
    key_size: usize,
    bound: BigInt,
}

pub(crate) fn keygen(key_size: usize) -> (MockPublicKey, MockSecretKey) {
    let nonce = BigInt::from(util::key_material_rng().gen_biguint(NONCE_BITS));
    let pk = MockPublicKey::new(key_size, nonce);
    let sk = MockSecretKey::new(key_size);
    (pk, sk)
}

fn mock_bound(key_size: usize) -> (BigInt, BigInt) {
    let modulus = BigInt::one() << key_size;
    let bound = &modulus >> 1u32;
    (modulus, bound)
}

impl MockPublicKey {
    fn new(key_size: usize, nonce: BigInt) -> Self {
        let (modulus, bound) = mock_bound(key_size);
        MockPublicKey { key_size, nonce, modulus, bound }
    }

    fn reduce(&self, value: BigInt) -> BigInt {
        let r = value.mod_floor(&self.modulus);
        if r >= self.bound {
            r - &self.modulus
        } else {
            r
        }
    }
}

impl MockSecretKey {
    fn new(key_size: usize) -> Self {
        MockSecretKey { key_size, bound: mock_bound(key_size).1 }
    }
}

impl KeyParts for MockPublicKey {
    fn bits(&self) -> usize {
        self.key_size
    }

    fn parts(&self) -> Vec<BigInt> {
        vec![self.nonce.clone()]
    }

    fn from_parts(key_size: usize, parts: Vec<BigInt>) -> Result<Self> {
        let [nonce] = take_parts(parts, SchemaType::Mock)?;
        if nonce.is_negative() || nonce.bits() > NONCE_BITS {
            return Err(HeError::Serialization("mock key nonce out of range".into()));
        }
        Ok(MockPublicKey::new(key_size, nonce))
    }
}

impl KeyParts for MockSecretKey {
    fn bits(&self) -> usize {
        self.key_size
    }

    fn parts(&self) -> Vec<BigInt> {
        vec![]
    }

    fn from_parts(key_size: usize, parts: Vec<BigInt>) -> Result<Self> {
        take_parts::<0>(parts, SchemaType::Mock)?;
        Ok(MockSecretKey::new(key_size))
    }
}

impl PheScheme for MockPublicKey {
    fn schema(&self) -> SchemaType {
        SchemaType::Mock
    }

    fn key_size(&self) -> usize {
        self.key_size
    }

    fn plaintext_bound(&self) -> &BigInt {
        &self.bound
    }

    fn encrypt(&self, m: &BigInt) -> Result<BigInt> {
        check_plaintext_range(m, &self.bound, SchemaType::Mock)?;
        Ok(m.clone())
    }

    fn encrypt_with_audit(&self, m: &BigInt) -> Result<(BigInt, String)> {
        let c = self.encrypt(m)?;
        Ok((c, format!("mock:{}", m)))
    }

    fn encrypt_zero(&self) -> BigInt {
        BigInt::default()
    }

    fn add(&self, a: &BigInt, b: &BigInt) -> BigInt {
        self.reduce(a + b)
    }

    fn add_plain(&self, a: &BigInt, p: &BigInt) -> Result<BigInt> {
        check_plaintext_range(p, &self.bound, SchemaType::Mock)?;
        Ok(self.reduce(a + p))
    }

    fn negate(&self, a: &BigInt) -> Result<BigInt> {
        Ok(self.reduce(-a))
    }

    fn mul_plain(&self, a: &BigInt, p: &BigInt) -> Result<BigInt> {
        Ok(self.reduce(a * p))
    }

    fn randomize(&self, a: &BigInt) -> BigInt {
        a.clone()
    }

    fn is_valid_ciphertext(&self, c: &BigInt) -> bool {
        c >= &-&self.bound && c < &self.bound
    }
}

impl PheDecrypt for MockSecretKey {
    fn decrypt(&self, c: &BigInt) -> Result<BigInt> {
        if c < &-&self.bound || c >= &self.bound {
            return Err(HeError::Domain(format!("mock ciphertext {} out of range", c)));
        }
        Ok(c.clone())
    }
}
