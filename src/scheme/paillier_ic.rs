use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;

use super::{check_ciphertext_range, check_key_part, check_key_residue, check_plaintext_range, paillier_gm, paillier_l, take_parts, KeyParts, PheDecrypt, PheScheme};
use crate::{util, Result, SchemaType};

/// Public key of textbook Paillier (`g = n + 1`).
///
/// Every encryption draws a fresh `r` from `Z_n^*`, so this variant is slower
/// than [ZPaillierPublicKey](super::ZPaillierPublicKey) but interoperates
/// with any standard Paillier implementation.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IcPaillierPublicKey {
    key_size: usize,
    n: BigInt,
    n_square: BigInt,
    n_half: BigInt,
}

/// Secret key of [IcPaillierPublicKey]: `lambda = lcm(p-1, q-1)` and `mu = lambda^-1 mod n`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IcPaillierSecretKey {
    key_size: usize,
    n: BigInt,
    n_square: BigInt,
    n_half: BigInt,
    lambda: BigInt,
    mu: BigInt,
}

pub(crate) fn keygen(key_size: usize) -> Result<(IcPaillierPublicKey, IcPaillierSecretKey)> {
    let mut rng = util::key_material_rng();
    let half = (key_size / 2) as u64;
    let (p, q) = loop {
        let p = util::random_prime(half, &mut rng);
        let q = util::random_prime(key_size as u64 - half, &mut rng);
        if p == q {
            continue;
        }
        let n = &p * &q;
        if n.bits() as usize != key_size {
            continue;
        }
        if !n.gcd(&((&p - 1u32) * (&q - 1u32))).is_one() {
            continue;
        }
        break (BigInt::from(p), BigInt::from(q));
    };
    let n = &p * &q;
    let lambda = (&p - 1u32).lcm(&(&q - 1u32));
    let pk = IcPaillierPublicKey::new(key_size, n.clone());
    let sk = IcPaillierSecretKey::new(key_size, n, lambda)?;
    Ok((pk, sk))
}

impl IcPaillierPublicKey {
    fn new(key_size: usize, n: BigInt) -> Self {
        let n_square = &n * &n;
        let n_half = &n >> 1u32;
        IcPaillierPublicKey { key_size, n, n_square, n_half }
    }

    fn random_rn(&self) -> BigInt {
        let r = BigInt::from(util::random_coprime(self.n.magnitude(), &mut rand::thread_rng()));
        r.modpow(&self.n, &self.n_square)
    }
}

impl IcPaillierSecretKey {
    fn new(key_size: usize, n: BigInt, lambda: BigInt) -> Result<Self> {
        let n_square = &n * &n;
        let n_half = &n >> 1u32;
        let mu = util::mod_inverse(&lambda, &n)?;
        Ok(IcPaillierSecretKey { key_size, n, n_square, n_half, lambda, mu })
    }
}

impl KeyParts for IcPaillierPublicKey {
    fn bits(&self) -> usize {
        self.key_size
    }

    fn parts(&self) -> Vec<BigInt> {
        vec![self.n.clone()]
    }

    fn from_parts(key_size: usize, parts: Vec<BigInt>) -> Result<Self> {
        let [n] = take_parts(parts, SchemaType::IcPaillier)?;
        let bits = key_size as u64;
        check_key_part(&n, bits..=bits, "n", SchemaType::IcPaillier)?;
        Ok(IcPaillierPublicKey::new(key_size, n))
    }
}

impl KeyParts for IcPaillierSecretKey {
    fn bits(&self) -> usize {
        self.key_size
    }

    fn parts(&self) -> Vec<BigInt> {
        vec![self.n.clone(), self.lambda.clone()]
    }

    fn from_parts(key_size: usize, parts: Vec<BigInt>) -> Result<Self> {
        let [n, lambda] = take_parts(parts, SchemaType::IcPaillier)?;
        let bits = key_size as u64;
        check_key_part(&n, bits..=bits, "n", SchemaType::IcPaillier)?;
        check_key_residue(&lambda, &n, "lambda", SchemaType::IcPaillier)?;
        IcPaillierSecretKey::new(key_size, n, lambda)
    }
}

impl PheScheme for IcPaillierPublicKey {
    fn schema(&self) -> SchemaType {
        SchemaType::IcPaillier
    }

    fn key_size(&self) -> usize {
        self.key_size
    }

    fn plaintext_bound(&self) -> &BigInt {
        &self.n_half
    }

    fn encrypt(&self, m: &BigInt) -> Result<BigInt> {
        Ok(self.encrypt_with_audit(m)?.0)
    }

    fn encrypt_with_audit(&self, m: &BigInt) -> Result<(BigInt, String)> {
        check_plaintext_range(m, &self.n_half, SchemaType::IcPaillier)?;
        let rn = self.random_rn();
        let c = paillier_gm(m, &self.n, &self.n_square) * &rn % &self.n_square;
        let audit = format!("p:{:x},rn:{:x},c:{:x}", m, rn, c);
        Ok((c, audit))
    }

    fn encrypt_zero(&self) -> BigInt {
        self.random_rn()
    }

    fn add(&self, a: &BigInt, b: &BigInt) -> BigInt {
        a * b % &self.n_square
    }

    fn add_plain(&self, a: &BigInt, p: &BigInt) -> Result<BigInt> {
        check_plaintext_range(p, &self.n_half, SchemaType::IcPaillier)?;
        Ok(a * paillier_gm(p, &self.n, &self.n_square) % &self.n_square)
    }

    fn negate(&self, a: &BigInt) -> Result<BigInt> {
        util::mod_inverse(a, &self.n_square)
    }

    fn mul_plain(&self, a: &BigInt, p: &BigInt) -> Result<BigInt> {
        util::mod_pow_signed(a, p, &self.n_square)
    }

    fn is_valid_ciphertext(&self, c: &BigInt) -> bool {
        check_ciphertext_range(c, &self.n_square, SchemaType::IcPaillier).is_ok()
    }
}

impl PheDecrypt for IcPaillierSecretKey {
    fn decrypt(&self, c: &BigInt) -> Result<BigInt> {
        check_ciphertext_range(c, &self.n_square, SchemaType::IcPaillier)?;
        let x = c.modpow(&self.lambda, &self.n_square);
        let m = (paillier_l(&x, &self.n) * &self.mu).mod_floor(&self.n);
        Ok(util::center(m, &self.n, &self.n_half))
    }
}
