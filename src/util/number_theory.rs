use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

use crate::{HeError, Result};

const IS_PRIME_NUM_ROUNDS: usize = 24;

const SMALL_PRIMES: [u32; 53] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73,
    79, 83, 89, 97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179,
    181, 191, 193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

pub fn is_prime<R: Rng + ?Sized>(value: &BigUint, rng: &mut R) -> bool {
    // First check the simplest cases.
    let two = BigUint::from(2u32);
    if value < &two {
        return false;
    }
    if value == &two {
        return true;
    }
    if value.is_even() {
        return false;
    }
    for p in SMALL_PRIMES {
        if value == &BigUint::from(p) {
            return true;
        }
        if (value % p).is_zero() {
            return false;
        }
    }
    // Second, Miller-Rabin test.
    // Find r and odd d that satisfy value = 2^r * d + 1.
    let minus_one = value - 1u32;
    let r = minus_one.trailing_zeros().unwrap_or(0);
    let d = &minus_one >> r;
    let lower = BigUint::from(3u32);
    for i in 0..IS_PRIME_NUM_ROUNDS {
        let a = if i == 0 { two.clone() } else { rng.gen_biguint_range(&lower, &minus_one) };
        let mut x = a.modpow(&d, value);
        if x.is_one() || x == minus_one {
            continue;
        }
        let mut composite = true;
        for _ in 1..r {
            x = &x * &x % value;
            if x == minus_one {
                composite = false;
                break;
            }
        }
        if composite {
            return false;
        }
    }
    true
}

/// Random prime with exactly `bits` bits whose two top bits are set, so the
/// product of two such primes has exactly `2 * bits` bits.
pub fn random_prime<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> BigUint {
    random_prime_with_low_bits(bits, 1, rng)
}

/// Random prime congruent to 3 mod 4.
pub fn random_blum_prime<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> BigUint {
    random_prime_with_low_bits(bits, 3, rng)
}

fn random_prime_with_low_bits<R: Rng + ?Sized>(bits: u64, low_bits: u32, rng: &mut R) -> BigUint {
    debug_assert!(bits >= 8, "prime size too small");
    let top = (BigUint::one() << (bits - 1)) | (BigUint::one() << (bits - 2));
    let mut attempts = 0usize;
    loop {
        attempts += 1;
        let candidate = rng.gen_biguint(bits) | &top | BigUint::from(low_bits);
        if is_prime(&candidate, rng) {
            log::trace!("found {}-bit prime after {} candidates", bits, attempts);
            return candidate;
        }
    }
}

/// Uniform element of `Z_n^*`.
pub fn random_coprime<R: Rng + ?Sized>(n: &BigUint, rng: &mut R) -> BigUint {
    let one = BigUint::one();
    loop {
        let x = rng.gen_biguint_range(&one, n);
        if x.gcd(n).is_one() {
            return x;
        }
    }
}

pub fn mod_inverse(value: &BigInt, modulus: &BigInt) -> Result<BigInt> {
    value.modinv(modulus).ok_or_else(|| HeError::Domain(
        format!("{} is not invertible modulo a {}-bit modulus", value, modulus.bits())
    ))
}

/// `base^exponent mod modulus` for any signed exponent; negative exponents
/// go through the modular inverse.
pub fn mod_pow_signed(base: &BigInt, exponent: &BigInt, modulus: &BigInt) -> Result<BigInt> {
    if exponent.sign() == num_bigint::Sign::Minus {
        let inverse = mod_inverse(base, modulus)?;
        Ok(inverse.modpow(&-exponent, modulus))
    } else {
        Ok(base.modpow(exponent, modulus))
    }
}

/// Maps `value` from `[0, modulus)` into the symmetric range around zero.
pub fn center(value: BigInt, modulus: &BigInt, half: &BigInt) -> BigInt {
    if &value > half {
        value - modulus
    } else {
        value
    }
}
