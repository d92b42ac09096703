use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::One;

use super::{check_ciphertext_range, check_key_part, check_key_residue, check_plaintext_range, paillier_gm, take_parts, KeyParts, PheDecrypt, PheScheme};
use crate::{util, Result, SchemaType};

/// Public key of the Paillier variant with a fixed randomizer base.
///
/// Instead of computing a fresh `r^n mod n^2` for every encryption, the key
/// carries `h_s = (-x^2)^n mod n^2` and encryption raises it to a random
/// exponent of `key_size / 2` bits: `c = (1 + n*m) * h_s^r mod n^2`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ZPaillierPublicKey {
    key_size: usize,
    n: BigInt,
    n_square: BigInt,
    n_half: BigInt,
    h_s: BigInt,
}

/// Secret key of [ZPaillierPublicKey]; decrypts through CRT over `p^2` and `q^2`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ZPaillierSecretKey {
    key_size: usize,
    n: BigInt,
    n_half: BigInt,
    p: BigInt,
    q: BigInt,
    p_square: BigInt,
    q_square: BigInt,
    hp: BigInt,
    hq: BigInt,
    p_inv_mod_q: BigInt,
}

pub(crate) fn keygen(key_size: usize) -> Result<(ZPaillierPublicKey, ZPaillierSecretKey)> {
    let mut rng = util::key_material_rng();
    let half = (key_size / 2) as u64;
    let two = BigUint::from(2u32);
    let (p, q) = loop {
        let p = util::random_blum_prime(half, &mut rng);
        let q = util::random_blum_prime(key_size as u64 - half, &mut rng);
        if p == q {
            continue;
        }
        // gcd(p-1, q-1) = 2 keeps h = -x^2 in a subgroup of maximal order
        if (&p - 1u32).gcd(&(&q - 1u32)) != two {
            continue;
        }
        if (&p * &q).bits() as usize != key_size {
            continue;
        }
        break (p, q);
    };
    let n = BigInt::from(&p * &q);
    let x = BigInt::from(util::random_coprime(n.magnitude(), &mut rng));
    let h = (&n - &x * &x % &n) % &n;
    let n_square = &n * &n;
    let h_s = h.modpow(&n, &n_square);
    let pk = ZPaillierPublicKey::new(key_size, n, h_s);
    let sk = ZPaillierSecretKey::new(key_size, BigInt::from(p), BigInt::from(q))?;
    Ok((pk, sk))
}

impl ZPaillierPublicKey {
    fn new(key_size: usize, n: BigInt, h_s: BigInt) -> Self {
        let n_square = &n * &n;
        let n_half = &n >> 1u32;
        ZPaillierPublicKey { key_size, n, n_square, n_half, h_s }
    }

    fn random_hs_r(&self) -> BigInt {
        let r = rand::thread_rng().gen_biguint((self.key_size / 2) as u64);
        self.h_s.modpow(&BigInt::from(r), &self.n_square)
    }
}

impl ZPaillierSecretKey {
    fn new(key_size: usize, p: BigInt, q: BigInt) -> Result<Self> {
        let n = &p * &q;
        let n_half = &n >> 1u32;
        let p_square = &p * &p;
        let q_square = &q * &q;
        // hp = L_p((1 + n)^(p - 1) mod p^2)^-1 mod p
        let hp = Self::h_function(&n, &p, &p_square)?;
        let hq = Self::h_function(&n, &q, &q_square)?;
        let p_inv_mod_q = util::mod_inverse(&p, &q)?;
        Ok(ZPaillierSecretKey { key_size, n, n_half, p, q, p_square, q_square, hp, hq, p_inv_mod_q })
    }

    fn h_function(n: &BigInt, prime: &BigInt, prime_square: &BigInt) -> Result<BigInt> {
        let g = (BigInt::one() + n).modpow(&(prime - 1u32), prime_square);
        util::mod_inverse(&((g - 1u32) / prime), prime)
    }

    fn decrypt_mod(&self, c: &BigInt, prime: &BigInt, prime_square: &BigInt, h: &BigInt) -> BigInt {
        let x = c.modpow(&(prime - 1u32), prime_square);
        ((x - 1u32) / prime * h).mod_floor(prime)
    }
}

impl KeyParts for ZPaillierPublicKey {
    fn bits(&self) -> usize {
        self.key_size
    }

    fn parts(&self) -> Vec<BigInt> {
        vec![self.n.clone(), self.h_s.clone()]
    }

    fn from_parts(key_size: usize, parts: Vec<BigInt>) -> Result<Self> {
        let [n, h_s] = take_parts(parts, SchemaType::ZPaillier)?;
        let bits = key_size as u64;
        check_key_part(&n, bits..=bits, "n", SchemaType::ZPaillier)?;
        check_key_residue(&h_s, &(&n * &n), "h_s", SchemaType::ZPaillier)?;
        Ok(ZPaillierPublicKey::new(key_size, n, h_s))
    }
}

impl KeyParts for ZPaillierSecretKey {
    fn bits(&self) -> usize {
        self.key_size
    }

    fn parts(&self) -> Vec<BigInt> {
        vec![self.p.clone(), self.q.clone()]
    }

    fn from_parts(key_size: usize, parts: Vec<BigInt>) -> Result<Self> {
        let [p, q] = take_parts(parts, SchemaType::ZPaillier)?;
        let bits = key_size as u64;
        check_key_part(&p, 2..=bits, "p", SchemaType::ZPaillier)?;
        check_key_part(&q, 2..=bits, "q", SchemaType::ZPaillier)?;
        check_key_part(&(&p * &q), bits..=bits, "n", SchemaType::ZPaillier)?;
        ZPaillierSecretKey::new(key_size, p, q)
    }
}

impl PheScheme for ZPaillierPublicKey {
    fn schema(&self) -> SchemaType {
        SchemaType::ZPaillier
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
        check_plaintext_range(m, &self.n_half, SchemaType::ZPaillier)?;
        let hs_r = self.random_hs_r();
        let c = paillier_gm(m, &self.n, &self.n_square) * &hs_r % &self.n_square;
        let audit = format!("p:{:x},hs_r:{:x},c:{:x}", m, hs_r, c);
        Ok((c, audit))
    }

    fn encrypt_zero(&self) -> BigInt {
        self.random_hs_r()
    }

    fn add(&self, a: &BigInt, b: &BigInt) -> BigInt {
        a * b % &self.n_square
    }

    fn add_plain(&self, a: &BigInt, p: &BigInt) -> Result<BigInt> {
        check_plaintext_range(p, &self.n_half, SchemaType::ZPaillier)?;
        Ok(a * paillier_gm(p, &self.n, &self.n_square) % &self.n_square)
    }

    fn negate(&self, a: &BigInt) -> Result<BigInt> {
        util::mod_inverse(a, &self.n_square)
    }

    fn mul_plain(&self, a: &BigInt, p: &BigInt) -> Result<BigInt> {
        util::mod_pow_signed(a, p, &self.n_square)
    }

    fn is_valid_ciphertext(&self, c: &BigInt) -> bool {
        check_ciphertext_range(c, &self.n_square, SchemaType::ZPaillier).is_ok()
    }
}

impl PheDecrypt for ZPaillierSecretKey {
    fn decrypt(&self, c: &BigInt) -> Result<BigInt> {
        check_ciphertext_range(c, &(&self.n * &self.n), SchemaType::ZPaillier)?;
        let mp = self.decrypt_mod(c, &self.p, &self.p_square, &self.hp);
        let mq = self.decrypt_mod(c, &self.q, &self.q_square, &self.hq);
        // CRT: m = mp + p * ((mq - mp) * p^-1 mod q)
        let m = &mp + &self.p * ((mq - &mp) * &self.p_inv_mod_q).mod_floor(&self.q);
        Ok(util::center(m, &self.n, &self.n_half))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zpaillier_basic() {
        let (pk, sk) = keygen(512).unwrap();
        assert_eq!(pk.n.bits(), 512);
        let bound = pk.plaintext_bound().clone();
        assert!(bound > BigInt::one() << 128u32);
        for m in [0i64, 1, -1, 123456789, -987654321] {
            let c = pk.encrypt(&BigInt::from(m)).unwrap();
            assert_eq!(sk.decrypt(&c).unwrap(), BigInt::from(m));
        }
        let max = &bound - 1u32;
        let c = pk.encrypt(&max).unwrap();
        assert_eq!(sk.decrypt(&c).unwrap(), max);
        assert_eq!(sk.decrypt(&pk.negate(&c).unwrap()).unwrap(), -&max);
        assert!(pk.encrypt(&bound).is_err());

        let a = pk.encrypt(&BigInt::from(100)).unwrap();
        let b = pk.encrypt(&BigInt::from(-30)).unwrap();
        assert_eq!(sk.decrypt(&pk.add(&a, &b)).unwrap(), BigInt::from(70));
        assert_eq!(sk.decrypt(&pk.add_plain(&a, &BigInt::from(5)).unwrap()).unwrap(), BigInt::from(105));
        assert_eq!(sk.decrypt(&pk.mul_plain(&b, &BigInt::from(-3)).unwrap()).unwrap(), BigInt::from(90));
        assert_eq!(sk.decrypt(&pk.mul_plain(&b, &BigInt::from(0)).unwrap()).unwrap(), BigInt::from(0));
        let r = pk.randomize(&a);
        assert_ne!(r, a);
        assert_eq!(sk.decrypt(&r).unwrap(), BigInt::from(100));

        let (c, audit) = pk.encrypt_with_audit(&BigInt::from(255)).unwrap();
        assert!(audit.starts_with("p:ff,hs_r:"));
        assert!(audit.ends_with(&format!(",c:{:x}", c)));
        assert!(sk.decrypt(&BigInt::from(0)).is_err());
    }

    #[test]
    fn test_zpaillier_parts() {
        let (pk, sk) = keygen(512).unwrap();
        let pk2 = ZPaillierPublicKey::from_parts(512, pk.parts()).unwrap();
        let sk2 = ZPaillierSecretKey::from_parts(512, sk.parts()).unwrap();
        assert_eq!(pk, pk2);
        assert_eq!(sk, sk2);
        assert!(ZPaillierPublicKey::from_parts(512, vec![]).is_err());
    }
}
