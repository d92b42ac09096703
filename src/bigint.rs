use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero, Num};

use crate::{HeError, Result};

/// Byte order used by [BigSignedInteger::to_bytes] and [BigSignedInteger::from_bytes].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Endian {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

/// Arbitrary-precision signed integer.
///
/// This is the numeric substrate of the crate: plaintext values, plaintext
/// bounds and encoded application values are all [BigSignedInteger]s.
/// String conversion is the canonical decimal representation (leading `-`
/// for negative values, no leading zeros). Byte conversion uses two's
/// complement with an explicit width and [Endian].
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BigSignedInteger(pub(crate) BigInt);

macro_rules! impl_from_native {
    ($($t:ty),*) => {$(
        impl From<$t> for BigSignedInteger {
            fn from(value: $t) -> Self {
                BigSignedInteger(BigInt::from(value))
            }
        }
    )*};
}

impl_from_native!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<BigInt> for BigSignedInteger {
    fn from(value: BigInt) -> Self {
        BigSignedInteger(value)
    }
}

impl From<&BigInt> for BigSignedInteger {
    fn from(value: &BigInt) -> Self {
        BigSignedInteger(value.clone())
    }
}

impl From<BigSignedInteger> for BigInt {
    fn from(value: BigSignedInteger) -> Self {
        value.0
    }
}

impl FromStr for BigSignedInteger {
    type Err = HeError;
    fn from_str(s: &str) -> Result<Self> {
        BigInt::from_str(s.trim())
            .map(BigSignedInteger)
            .map_err(|_| HeError::InvalidArgument(format!("'{}' is not a decimal integer", s)))
    }
}

impl BigSignedInteger {

    /// Zero.
    pub fn zero() -> Self {
        BigSignedInteger(BigInt::zero())
    }

    /// Parse a string in the given radix (2..=36), e.g. 16 for hex.
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self> {
        let trimmed = s.trim();
        let digits = if radix == 16 {
            trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")).unwrap_or(trimmed)
        } else {
            trimmed
        };
        BigInt::from_str_radix(digits, radix)
            .map(BigSignedInteger)
            .map_err(|_| HeError::InvalidArgument(format!("'{}' is not a base-{} integer", s, radix)))
    }

    /// Interpret a byte buffer as a two's-complement signed integer.
    pub fn from_bytes(bytes: &[u8], endian: Endian) -> Self {
        let value = match endian {
            Endian::Big => BigInt::from_signed_bytes_be(bytes),
            Endian::Little => BigInt::from_signed_bytes_le(bytes),
        };
        BigSignedInteger(value)
    }

    /// Interpret a byte buffer as an unsigned magnitude.
    pub fn from_unsigned_bytes(bytes: &[u8], endian: Endian) -> Self {
        let value = match endian {
            Endian::Big => BigInt::from_bytes_be(num_bigint::Sign::Plus, bytes),
            Endian::Little => BigInt::from_bytes_le(num_bigint::Sign::Plus, bytes),
        };
        BigSignedInteger(value)
    }

    /// Two's-complement encoding, sign extended to exactly `len` bytes.
    ///
    /// Fails with [HeError::Range] if the value needs more than `len` bytes.
    pub fn to_bytes(&self, len: usize, endian: Endian) -> Result<Vec<u8>> {
        let mut bytes = if self.0.is_zero() {
            vec![]
        } else {
            self.0.to_signed_bytes_le()
        };
        if bytes.len() > len {
            return Err(HeError::Range(format!(
                "{} needs {} bytes, but only {} available", self, bytes.len(), len
            )));
        }
        let fill = if self.0.is_negative() { 0xff } else { 0x00 };
        bytes.resize(len, fill);
        if endian == Endian::Big {
            bytes.reverse();
        }
        Ok(bytes)
    }

    /// Borrow the inner [BigInt].
    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    /// Lower-case hex representation, with a leading `-` for negative values.
    pub fn to_hex_string(&self) -> String {
        format!("{:x}", self.0)
    }

    /// Number of bits of the magnitude.
    pub fn bit_count(&self) -> u64 {
        self.0.bits()
    }

    /// Is the value negative?
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Is the value zero?
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// -1, 0 or 1.
    pub fn signum(&self) -> i32 {
        if self.0.is_zero() { 0 } else if self.0.is_negative() { -1 } else { 1 }
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        BigSignedInteger(self.0.abs())
    }

    /// Raise to a small power.
    pub fn pow(&self, exponent: u32) -> Self {
        BigSignedInteger(num_traits::pow(self.0.clone(), exponent as usize))
    }

    /// Power of two.
    pub fn two_pow(bits: u64) -> Self {
        BigSignedInteger(BigInt::from(1) << bits)
    }

    fn narrow<T>(&self, converted: Option<T>, name: &str) -> Result<T> {
        converted.ok_or_else(|| HeError::Range(format!("{} does not fit into {}", self, name)))
    }

    /// Convert to `i64`, failing with [HeError::Range] on overflow.
    pub fn to_i64(&self) -> Result<i64> {
        self.narrow(self.0.to_i64(), "i64")
    }

    /// Convert to `u64`, failing with [HeError::Range] on overflow.
    pub fn to_u64(&self) -> Result<u64> {
        self.narrow(self.0.to_u64(), "u64")
    }

    /// Convert to `i128`, failing with [HeError::Range] on overflow.
    pub fn to_i128(&self) -> Result<i128> {
        self.narrow(self.0.to_i128(), "i128")
    }

    /// Nearest `f64`; infinite if out of range.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(if self.is_negative() { f64::NEG_INFINITY } else { f64::INFINITY })
    }

}

impl fmt::Display for BigSignedInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! impl_binary_op {
    ($op_trait:ident, $op:ident, $assign_trait:ident, $assign:ident) => {
        impl std::ops::$op_trait for BigSignedInteger {
            type Output = BigSignedInteger;
            fn $op(self, rhs: BigSignedInteger) -> BigSignedInteger {
                BigSignedInteger(std::ops::$op_trait::$op(self.0, rhs.0))
            }
        }
        impl<'a> std::ops::$op_trait<&'a BigSignedInteger> for BigSignedInteger {
            type Output = BigSignedInteger;
            fn $op(self, rhs: &'a BigSignedInteger) -> BigSignedInteger {
                BigSignedInteger(std::ops::$op_trait::$op(self.0, &rhs.0))
            }
        }
        impl<'a, 'b> std::ops::$op_trait<&'b BigSignedInteger> for &'a BigSignedInteger {
            type Output = BigSignedInteger;
            fn $op(self, rhs: &'b BigSignedInteger) -> BigSignedInteger {
                BigSignedInteger(std::ops::$op_trait::$op(&self.0, &rhs.0))
            }
        }
        impl std::ops::$assign_trait for BigSignedInteger {
            fn $assign(&mut self, rhs: BigSignedInteger) {
                std::ops::$assign_trait::$assign(&mut self.0, rhs.0)
            }
        }
        impl<'a> std::ops::$assign_trait<&'a BigSignedInteger> for BigSignedInteger {
            fn $assign(&mut self, rhs: &'a BigSignedInteger) {
                std::ops::$assign_trait::$assign(&mut self.0, &rhs.0)
            }
        }
    };
}

impl_binary_op!(Add, add, AddAssign, add_assign);
impl_binary_op!(Sub, sub, SubAssign, sub_assign);
impl_binary_op!(Mul, mul, MulAssign, mul_assign);
// truncating, and panics on a zero divisor like the primitive integers
impl_binary_op!(Div, div, DivAssign, div_assign);
impl_binary_op!(Rem, rem, RemAssign, rem_assign);

impl std::ops::Neg for BigSignedInteger {
    type Output = BigSignedInteger;
    fn neg(self) -> BigSignedInteger {
        BigSignedInteger(-self.0)
    }
}

impl std::ops::Neg for &BigSignedInteger {
    type Output = BigSignedInteger;
    fn neg(self) -> BigSignedInteger {
        BigSignedInteger(-&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_round_trip() {
        let cases = [
            "0", "1", "-1",
            "2147483647", "-2147483648",
            "9223372036854775807", "-9223372036854775808",
            "18446744073709551615",
            "170141183460469231731687303715884105727",
            "-170141183460469231731687303715884105728",
            "4750957760024162919943151703318005370147509577600241629199431517033180053701",
        ];
        for s in cases {
            let x: BigSignedInteger = s.parse().unwrap();
            assert_eq!(x.to_string(), s);
        }
        assert_eq!(BigSignedInteger::from(i128::MIN).to_string(), "-170141183460469231731687303715884105728");
        assert_eq!(BigSignedInteger::from(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!("+0042".parse::<BigSignedInteger>().unwrap().to_string(), "42");
        assert!("12a".parse::<BigSignedInteger>().is_err());
        assert!("".parse::<BigSignedInteger>().is_err());
    }

    #[test]
    fn test_to_bytes() {
        let x = BigSignedInteger::from(1);
        let mut expected = vec![0u8; 16];
        expected[15] = 1;
        assert_eq!(x.to_bytes(16, Endian::Big).unwrap(), expected);
        expected.reverse();
        assert_eq!(x.to_bytes(16, Endian::Little).unwrap(), expected);

        let x = BigSignedInteger::from(-2);
        let mut expected = vec![0xffu8; 16];
        expected[15] = 0xfe;
        assert_eq!(x.to_bytes(16, Endian::Big).unwrap(), expected);

        for v in [i128::MAX, i128::MIN, -1, 0, 255, -256] {
            let x = BigSignedInteger::from(v);
            assert_eq!(x.to_bytes(16, Endian::Big).unwrap(), v.to_be_bytes().to_vec());
            assert_eq!(x.to_bytes(16, Endian::Little).unwrap(), v.to_le_bytes().to_vec());
            let back = BigSignedInteger::from_bytes(&v.to_le_bytes(), Endian::Little);
            assert_eq!(back, x);
        }

        let too_big = BigSignedInteger::from(i128::MAX) + BigSignedInteger::from(1);
        assert!(matches!(too_big.to_bytes(16, Endian::Big), Err(HeError::Range(_))));
        assert!(BigSignedInteger::from(128).to_bytes(1, Endian::Big).is_err());
        assert_eq!(BigSignedInteger::from(-128).to_bytes(1, Endian::Big).unwrap(), vec![0x80]);
        assert_eq!(BigSignedInteger::zero().to_bytes(0, Endian::Big).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_arithmetic() {
        let a = BigSignedInteger::from(47509577600241629199431517033180053701i128);
        let b = BigSignedInteger::from(-47509577600241629199431517033402775166i128);
        assert_eq!((&a + &b).to_string(), "-222721465");
        assert_eq!((&a - &a), BigSignedInteger::zero());
        assert_eq!((BigSignedInteger::from(-3) * BigSignedInteger::from(7)).to_i64().unwrap(), -21);
        assert_eq!(-BigSignedInteger::from(5), BigSignedInteger::from(-5));
        let mut c = BigSignedInteger::from(10);
        c += &BigSignedInteger::from(5);
        c -= BigSignedInteger::from(1);
        c *= BigSignedInteger::from(2);
        assert_eq!(c, BigSignedInteger::from(28));
        assert!(BigSignedInteger::from(-1) < BigSignedInteger::zero());
        assert!(BigSignedInteger::from(u64::MAX) > BigSignedInteger::from(i64::MAX));
        assert_eq!(BigSignedInteger::two_pow(128).bit_count(), 129);
        assert_eq!(BigSignedInteger::from(-255).to_hex_string(), "-ff");
        assert_eq!(BigSignedInteger::from_str_radix("0xff", 16).unwrap(), BigSignedInteger::from(255));
        assert!(BigSignedInteger::two_pow(64).to_i64().is_err());
        assert_eq!(BigSignedInteger::from(i128::MIN).to_i128().unwrap(), i128::MIN);
        assert_eq!(BigSignedInteger::from(-7) / BigSignedInteger::from(2), BigSignedInteger::from(-3));
        assert_eq!(BigSignedInteger::from(-7) % BigSignedInteger::from(2), BigSignedInteger::from(-1));
    }

}
