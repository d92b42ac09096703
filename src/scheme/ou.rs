use std::ops::RangeInclusive;

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};

use super::{check_ciphertext_range, check_key_part, check_key_residue, check_plaintext_range, take_parts, KeyParts, PheDecrypt, PheScheme};
use crate::{util, HeError, Result, SchemaType};

/// Public key of Okamoto–Uchiyama over `n = p^2 * q`.
///
/// `G = g^u mod n` and `H = g'^(n*u) mod n` where `p = t*u + 1` for a prime
/// `t` much smaller than `p`; encryption is `c = G^m * H^r mod n` with a
/// short random exponent `r`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OuPublicKey {
    key_size: usize,
    n: BigInt,
    capital_g: BigInt,
    capital_h: BigInt,
    max_plaintext: BigInt,
    random_bits: u64,
}

/// Secret key of [OuPublicKey].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OuSecretKey {
    key_size: usize,
    p: BigInt,
    p_half: BigInt,
    p_square: BigInt,
    t: BigInt,
    gp_inv: BigInt,
    n: BigInt,
}

fn prime_factor_bits(key_size: usize) -> u64 {
    if key_size < 2048 {
        160
    } else if key_size < 3072 {
        224
    } else {
        256
    }
}

fn random_exponent_bits(key_size: usize) -> u64 {
    if key_size < 1536 {
        80
    } else if key_size < 2560 {
        110
    } else {
        128
    }
}

fn secret_size(key_size: usize) -> u64 {
    ((key_size + 2) / 3) as u64
}

/// Bit length of `n = p^2 q` for two primes of [secret_size] bits.
fn modulus_bits(key_size: usize) -> RangeInclusive<u64> {
    let secret_bits = secret_size(key_size);
    3 * secret_bits - 2..=3 * secret_bits
}

pub(crate) fn keygen(key_size: usize) -> Result<(OuPublicKey, OuSecretKey)> {
    let mut rng = util::key_material_rng();
    let secret_bits = secret_size(key_size);
    let factor_bits = prime_factor_bits(key_size);
    if secret_bits < 2 * factor_bits {
        return Err(HeError::InvalidArgument(format!(
            "key size {} too small for okamoto-uchiyama", key_size
        )));
    }
    let t = util::random_prime(factor_bits, &mut rng);
    let one = BigUint::one();
    // p = t * u + 1
    let (p, u) = loop {
        let u = rng.gen_biguint(secret_bits - factor_bits) | (&one << (secret_bits - factor_bits - 1));
        let p = &t * &u + 1u32;
        if p.bits() == secret_bits && util::is_prime(&p, &mut rng) {
            break (p, u);
        }
    };
    let q = loop {
        let q = util::random_prime(secret_bits, &mut rng);
        if q != p {
            break q;
        }
    };
    let p_square = &p * &p;
    let n = &p_square * &q;

    // g of maximal order mod p^2: L(g^(p-1) mod p^2) must be invertible mod p
    let p_minus_one = &p - 1u32;
    let (g, gp) = loop {
        let g = util::random_coprime(&n, &mut rng);
        let gp = g.modpow(&p_minus_one, &p_square);
        if !((&gp - 1u32) / &p % &p).is_zero() {
            break (g, gp);
        }
    };
    let g_prime = util::random_coprime(&n, &mut rng);

    let n = BigInt::from(n);
    let u = BigInt::from(u);
    let capital_g = BigInt::from(g).modpow(&u, &n);
    let capital_h = BigInt::from(g_prime).modpow(&(&n * &u), &n);
    let p = BigInt::from(p);
    let gp_inv = util::mod_inverse(&((BigInt::from(gp) - 1u32) / &p), &p)?;

    let pk = OuPublicKey::new(key_size, n.clone(), capital_g, capital_h);
    let sk = OuSecretKey::new(key_size, p, BigInt::from(t), gp_inv, n);
    Ok((pk, sk))
}

impl OuPublicKey {
    fn new(key_size: usize, n: BigInt, capital_g: BigInt, capital_h: BigInt) -> Self {
        // 2^(|p/2| - 1)
        let max_plaintext = BigInt::one() << (secret_size(key_size) - 2);
        OuPublicKey {
            key_size, n, capital_g, capital_h, max_plaintext,
            random_bits: random_exponent_bits(key_size),
        }
    }

    fn random_hr(&self) -> BigInt {
        let r = rand::thread_rng().gen_biguint(self.random_bits);
        self.capital_h.modpow(&BigInt::from(r), &self.n)
    }

    fn encode(&self, m: &BigInt) -> Result<BigInt> {
        util::mod_pow_signed(&self.capital_g, m, &self.n)
    }
}

impl OuSecretKey {
    fn new(key_size: usize, p: BigInt, t: BigInt, gp_inv: BigInt, n: BigInt) -> Self {
        let p_half = &p >> 1u32;
        let p_square = &p * &p;
        OuSecretKey { key_size, p, p_half, p_square, t, gp_inv, n }
    }
}

impl KeyParts for OuPublicKey {
    fn bits(&self) -> usize {
        self.key_size
    }

    fn parts(&self) -> Vec<BigInt> {
        vec![self.n.clone(), self.capital_g.clone(), self.capital_h.clone()]
    }

    fn from_parts(key_size: usize, parts: Vec<BigInt>) -> Result<Self> {
        let [n, capital_g, capital_h] = take_parts(parts, SchemaType::OU)?;
        check_key_part(&n, modulus_bits(key_size), "n", SchemaType::OU)?;
        check_key_residue(&capital_g, &n, "G", SchemaType::OU)?;
        check_key_residue(&capital_h, &n, "H", SchemaType::OU)?;
        Ok(OuPublicKey::new(key_size, n, capital_g, capital_h))
    }
}

impl KeyParts for OuSecretKey {
    fn bits(&self) -> usize {
        self.key_size
    }

    fn parts(&self) -> Vec<BigInt> {
        vec![self.p.clone(), self.t.clone(), self.gp_inv.clone(), self.n.clone()]
    }

    fn from_parts(key_size: usize, parts: Vec<BigInt>) -> Result<Self> {
        let [p, t, gp_inv, n] = take_parts(parts, SchemaType::OU)?;
        let secret_bits = secret_size(key_size);
        check_key_part(&p, secret_bits..=secret_bits, "p", SchemaType::OU)?;
        check_key_part(&t, 2..=secret_bits - 1, "t", SchemaType::OU)?;
        check_key_residue(&gp_inv, &p, "gp_inv", SchemaType::OU)?;
        check_key_part(&n, modulus_bits(key_size), "n", SchemaType::OU)?;
        Ok(OuSecretKey::new(key_size, p, t, gp_inv, n))
    }
}

impl PheScheme for OuPublicKey {
    fn schema(&self) -> SchemaType {
        SchemaType::OU
    }

    fn key_size(&self) -> usize {
        self.key_size
    }

    fn plaintext_bound(&self) -> &BigInt {
        &self.max_plaintext
    }

    fn encrypt(&self, m: &BigInt) -> Result<BigInt> {
        Ok(self.encrypt_with_audit(m)?.0)
    }

    fn encrypt_with_audit(&self, m: &BigInt) -> Result<(BigInt, String)> {
        check_plaintext_range(m, &self.max_plaintext, SchemaType::OU)?;
        let hr = self.random_hr();
        let c = self.encode(m)? * &hr % &self.n;
        let audit = format!("p:{:x},hr:{:x},c:{:x}", m, hr, c);
        Ok((c, audit))
    }

    fn encrypt_zero(&self) -> BigInt {
        self.random_hr()
    }

    fn add(&self, a: &BigInt, b: &BigInt) -> BigInt {
        a * b % &self.n
    }

    fn add_plain(&self, a: &BigInt, p: &BigInt) -> Result<BigInt> {
        check_plaintext_range(p, &self.max_plaintext, SchemaType::OU)?;
        Ok(a * self.encode(p)? % &self.n)
    }

    fn negate(&self, a: &BigInt) -> Result<BigInt> {
        util::mod_inverse(a, &self.n)
    }

    fn mul_plain(&self, a: &BigInt, p: &BigInt) -> Result<BigInt> {
        util::mod_pow_signed(a, p, &self.n)
    }

    fn is_valid_ciphertext(&self, c: &BigInt) -> bool {
        check_ciphertext_range(c, &self.n, SchemaType::OU).is_ok()
    }
}

impl PheDecrypt for OuSecretKey {
    fn decrypt(&self, c: &BigInt) -> Result<BigInt> {
        check_ciphertext_range(c, &self.n, SchemaType::OU)?;
        let c = (c % &self.p_square).modpow(&self.t, &self.p_square);
        let m = ((c - 1u32) / &self.p * &self.gp_inv).mod_floor(&self.p);
        Ok(util::center(m, &self.p, &self.p_half))
    }
}
