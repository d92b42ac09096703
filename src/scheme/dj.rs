use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::One;

use super::{check_ciphertext_range, check_key_part, check_key_residue, check_plaintext_range, take_parts, KeyParts, PheDecrypt, PheScheme};
use crate::{util, Result, SchemaType};

/// Exponent `s` of the Damgård–Jurik generalization: plaintexts live in
/// `Z_{n^s}` and ciphertexts in `Z_{n^(s+1)}`.
pub const DJ_EXPONENT: u32 = 2;

/// Public key of Damgård–Jurik with `s = 2`.
///
/// The plaintext space is `n^2`, twice as many bits as Paillier for the same
/// key, at the price of ciphertexts one `n` longer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DjPublicKey {
    key_size: usize,
    n: BigInt,
    plain_modulus: BigInt,
    cipher_modulus: BigInt,
    half_plain_modulus: BigInt,
    h_s: BigInt,
}

/// Secret key of [DjPublicKey].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DjSecretKey {
    key_size: usize,
    n: BigInt,
    lambda: BigInt,
    mu: BigInt,
    n_powers: Vec<BigInt>,
    factorial_inverses: Vec<BigInt>,
}

pub(crate) fn keygen(key_size: usize) -> Result<(DjPublicKey, DjSecretKey)> {
    let mut rng = util::key_material_rng();
    let half = (key_size / 2) as u64;
    let two = BigUint::from(2u32);
    let (p, q) = loop {
        let p = util::random_blum_prime(half, &mut rng);
        let q = util::random_blum_prime(key_size as u64 - half, &mut rng);
        if p == q {
            continue;
        }
        if (&p - 1u32).gcd(&(&q - 1u32)) != two {
            continue;
        }
        if (&p * &q).bits() as usize != key_size {
            continue;
        }
        break (BigInt::from(p), BigInt::from(q));
    };
    let n = &p * &q;
    let x = BigInt::from(util::random_coprime(n.magnitude(), &mut rng));
    let h = (&n - &x * &x % &n) % &n;
    let cipher_modulus = n.pow(DJ_EXPONENT + 1);
    let h_s = h.modpow(&n.pow(DJ_EXPONENT), &cipher_modulus);
    let lambda = (&p - 1u32).lcm(&(&q - 1u32));
    let pk = DjPublicKey::new(key_size, n.clone(), h_s);
    let sk = DjSecretKey::new(key_size, n, lambda)?;
    Ok((pk, sk))
}

impl DjPublicKey {
    fn new(key_size: usize, n: BigInt, h_s: BigInt) -> Self {
        let plain_modulus = n.pow(DJ_EXPONENT);
        let cipher_modulus = n.pow(DJ_EXPONENT + 1);
        let half_plain_modulus = &plain_modulus >> 1u32;
        DjPublicKey { key_size, n, plain_modulus, cipher_modulus, half_plain_modulus, h_s }
    }

    fn random_rn(&self) -> BigInt {
        let r = rand::thread_rng().gen_biguint((self.key_size / 2) as u64);
        self.h_s.modpow(&BigInt::from(r), &self.cipher_modulus)
    }

    /// `(1 + n)^m mod n^(s+1)`
    fn encode(&self, m: &BigInt) -> BigInt {
        (BigInt::one() + &self.n).modpow(&m.mod_floor(&self.plain_modulus), &self.cipher_modulus)
    }
}

impl DjSecretKey {
    fn new(key_size: usize, n: BigInt, lambda: BigInt) -> Result<Self> {
        // n_powers[j] = n^j for j in 0..=s+1
        let n_powers: Vec<BigInt> = (0..=DJ_EXPONENT + 1).map(|j| n.pow(j)).collect();
        let plain_modulus = &n_powers[DJ_EXPONENT as usize];
        let mu = util::mod_inverse(&lambda, plain_modulus)?;
        let mut factorial = BigInt::one();
        let mut factorial_inverses = vec![BigInt::one(), BigInt::one()];
        for k in 2..=DJ_EXPONENT {
            factorial *= k;
            factorial_inverses.push(util::mod_inverse(&factorial, plain_modulus)?);
        }
        Ok(DjSecretKey { key_size, n, lambda, mu, n_powers, factorial_inverses })
    }

    /// Recover `i` from `a = (1 + n)^i mod n^(s+1)`, one power of `n` at a time.
    fn extract_exponent(&self, a: &BigInt) -> BigInt {
        let s = DJ_EXPONENT as usize;
        let mut i = BigInt::from(0);
        for j in 1..=s {
            let modulus = &self.n_powers[j];
            let mut t1 = (a % &self.n_powers[j + 1] - 1u32) / &self.n;
            let mut t2 = i.clone();
            for k in 2..=j {
                i -= 1;
                t2 = (t2 * &i).mod_floor(modulus);
                t1 -= &t2 * &self.n_powers[k - 1] * &self.factorial_inverses[k];
            }
            i = t1.mod_floor(modulus);
        }
        i
    }
}

impl KeyParts for DjPublicKey {
    fn bits(&self) -> usize {
        self.key_size
    }

    fn parts(&self) -> Vec<BigInt> {
        vec![self.n.clone(), self.h_s.clone()]
    }

    fn from_parts(key_size: usize, parts: Vec<BigInt>) -> Result<Self> {
        let [n, h_s] = take_parts(parts, SchemaType::DJ)?;
        let bits = key_size as u64;
        check_key_part(&n, bits..=bits, "n", SchemaType::DJ)?;
        check_key_residue(&h_s, &n.pow(DJ_EXPONENT + 1), "h_s", SchemaType::DJ)?;
        Ok(DjPublicKey::new(key_size, n, h_s))
    }
}

impl KeyParts for DjSecretKey {
    fn bits(&self) -> usize {
        self.key_size
    }

    fn parts(&self) -> Vec<BigInt> {
        vec![self.n.clone(), self.lambda.clone()]
    }

    fn from_parts(key_size: usize, parts: Vec<BigInt>) -> Result<Self> {
        let [n, lambda] = take_parts(parts, SchemaType::DJ)?;
        let bits = key_size as u64;
        check_key_part(&n, bits..=bits, "n", SchemaType::DJ)?;
        check_key_residue(&lambda, &n, "lambda", SchemaType::DJ)?;
        DjSecretKey::new(key_size, n, lambda)
    }
}

impl PheScheme for DjPublicKey {
    fn schema(&self) -> SchemaType {
        SchemaType::DJ
    }

    fn key_size(&self) -> usize {
        self.key_size
    }

    fn plaintext_bound(&self) -> &BigInt {
        &self.half_plain_modulus
    }

    fn encrypt(&self, m: &BigInt) -> Result<BigInt> {
        Ok(self.encrypt_with_audit(m)?.0)
    }

    fn encrypt_with_audit(&self, m: &BigInt) -> Result<(BigInt, String)> {
        check_plaintext_range(m, &self.half_plain_modulus, SchemaType::DJ)?;
        let rn = self.random_rn();
        let c = self.encode(m) * &rn % &self.cipher_modulus;
        let audit = format!("p:{:x},rn:{:x},c:{:x}", m, rn, c);
        Ok((c, audit))
    }

    fn encrypt_zero(&self) -> BigInt {
        self.random_rn()
    }

    fn add(&self, a: &BigInt, b: &BigInt) -> BigInt {
        a * b % &self.cipher_modulus
    }

    fn add_plain(&self, a: &BigInt, p: &BigInt) -> Result<BigInt> {
        check_plaintext_range(p, &self.half_plain_modulus, SchemaType::DJ)?;
        Ok(a * self.encode(p) % &self.cipher_modulus)
    }

    fn negate(&self, a: &BigInt) -> Result<BigInt> {
        util::mod_inverse(a, &self.cipher_modulus)
    }

    fn mul_plain(&self, a: &BigInt, p: &BigInt) -> Result<BigInt> {
        util::mod_pow_signed(a, p, &self.cipher_modulus)
    }

    fn is_valid_ciphertext(&self, c: &BigInt) -> bool {
        check_ciphertext_range(c, &self.cipher_modulus, SchemaType::DJ).is_ok()
    }
}

impl PheDecrypt for DjSecretKey {
    fn decrypt(&self, c: &BigInt) -> Result<BigInt> {
        let s = DJ_EXPONENT as usize;
        let cipher_modulus = &self.n_powers[s + 1];
        let plain_modulus = &self.n_powers[s];
        check_ciphertext_range(c, cipher_modulus, SchemaType::DJ)?;
        let a = c.modpow(&self.lambda, cipher_modulus);
        let m = (self.extract_exponent(&a) * &self.mu).mod_floor(plain_modulus);
        Ok(util::center(m, plain_modulus, &(plain_modulus >> 1u32)))
    }
}
