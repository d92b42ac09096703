use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed};

use crate::{context::HeContext, BigSignedInteger, HeError, Plaintext, Result, SchemaType};

/// Converts application values of type `V` to and from [Plaintext]s.
///
/// Encoders hold the [HeContext] so an encoded value that does not fit the
/// scheme's plaintext range is rejected with [HeError::EncodingOverflow]
/// at encoding time, not discovered after decryption.
pub trait PlainEncoder<V> {
    /// Encode a value.
    fn encode(&self, value: V) -> Result<Plaintext>;
    /// Decode a plaintext produced by [Self::encode] or by decryption.
    fn decode(&self, plain: &Plaintext) -> Result<V>;
    /// Schema of the produced plaintexts.
    fn schema(&self) -> SchemaType;
}

pub(crate) fn checked_plaintext(context: &HeContext, value: BigInt) -> Result<Plaintext> {
    if &value.abs() >= context.plaintext_bound() {
        return Err(HeError::EncodingOverflow(format!(
            "encoded value {} exceeds the {} plaintext bound", value, context.schema()
        )));
    }
    Ok(Plaintext::new(context.schema(), value))
}

/// Encodes signed integers as `value * scale`.
///
/// Decoding divides by the scale, truncating toward zero; it is exact for
/// every plaintext produced by [PlainEncoder::encode].
#[derive(Clone)]
pub struct IntegerEncoder {
    context: Arc<HeContext>,
    scale: i128,
}

impl IntegerEncoder {

    /// Default scale: integers are embedded unchanged.
    pub const DEFAULT_SCALE: i128 = 1;

    /// Create an encoder with the given scale, which must be positive.
    pub fn new(context: Arc<HeContext>, scale: i128) -> Result<Self> {
        if scale <= 0 {
            return Err(HeError::InvalidArgument(format!("integer encoder scale must be positive, got {}", scale)));
        }
        Ok(IntegerEncoder { context, scale })
    }

    /// The scale.
    pub fn scale(&self) -> i128 {
        self.scale
    }
}

impl PlainEncoder<i128> for IntegerEncoder {
    fn encode(&self, value: i128) -> Result<Plaintext> {
        checked_plaintext(&self.context, BigInt::from(value) * self.scale)
    }

    fn decode(&self, plain: &Plaintext) -> Result<i128> {
        let value = BigSignedInteger::from(plain.as_bigint() / self.scale);
        value.to_i128()
    }

    fn schema(&self) -> SchemaType {
        self.context.schema()
    }
}

impl fmt::Display for IntegerEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntegerEncoder(schema={}, scale={})", self.context.schema(), self.scale)
    }
}

/// Encodes reals as fixed-point integers `round(value * scale)`.
///
/// A round trip loses at most `1 / scale` in absolute value. NaN and
/// infinities cannot be encoded.
#[derive(Clone)]
pub struct FloatEncoder {
    context: Arc<HeContext>,
    scale: f64,
}

impl FloatEncoder {

    /// Default scale: six decimal digits.
    pub const DEFAULT_SCALE: f64 = 1e6;

    /// Create an encoder with the given scale, which must be finite and positive.
    pub fn new(context: Arc<HeContext>, scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(HeError::InvalidArgument(format!("float encoder scale must be finite and positive, got {}", scale)));
        }
        Ok(FloatEncoder { context, scale })
    }

    /// The scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl PlainEncoder<f64> for FloatEncoder {
    fn encode(&self, value: f64) -> Result<Plaintext> {
        let scaled = (value * self.scale).round();
        let scaled = BigInt::from_f64(scaled).filter(|_| scaled.is_finite()).ok_or_else(|| {
            HeError::EncodingOverflow(format!("cannot encode non-finite value {}", value))
        })?;
        checked_plaintext(&self.context, scaled)
    }

    fn decode(&self, plain: &Plaintext) -> Result<f64> {
        Ok(plain.value().to_f64() / self.scale)
    }

    fn schema(&self) -> SchemaType {
        self.context.schema()
    }
}

impl fmt::Display for FloatEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FloatEncoder(schema={}, scale={})", self.context.schema(), self.scale)
    }
}

/// Identity encoder for arbitrary-precision integers.
#[derive(Clone)]
pub struct BigintEncoder {
    context: Arc<HeContext>,
}

impl BigintEncoder {

    /// Create an encoder.
    pub fn new(context: Arc<HeContext>) -> Self {
        BigintEncoder { context }
    }
}

impl PlainEncoder<BigSignedInteger> for BigintEncoder {
    fn encode(&self, value: BigSignedInteger) -> Result<Plaintext> {
        checked_plaintext(&self.context, value.into())
    }

    fn decode(&self, plain: &Plaintext) -> Result<BigSignedInteger> {
        Ok(plain.value().clone())
    }

    fn schema(&self) -> SchemaType {
        self.context.schema()
    }
}

impl fmt::Display for BigintEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigintEncoder(schema={}, max_bits={})", self.context.schema(), self.context.plaintext_bound().bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Decryptor, Encryptor, Evaluate, Evaluator, KeyGenerator};

    fn mock_context() -> Arc<HeContext> {
        HeContext::new(KeyGenerator::new(SchemaType::Mock, 256).unwrap().public_key().clone())
    }

    #[test]
    fn test_integer_encoder() {
        let encoder = IntegerEncoder::new(mock_context(), IntegerEncoder::DEFAULT_SCALE).unwrap();
        for v in [0, 1, -1, i64::MAX as i128, i128::MIN, i128::MAX] {
            assert_eq!(encoder.decode(&encoder.encode(v).unwrap()).unwrap(), v);
        }
        let scaled = IntegerEncoder::new(mock_context(), 1000).unwrap();
        let plain = scaled.encode(-42).unwrap();
        assert_eq!(plain.value(), &BigSignedInteger::from(-42000));
        assert_eq!(scaled.decode(&plain).unwrap(), -42);
        assert_eq!(scaled.to_string(), "IntegerEncoder(schema=none, scale=1000)");
        assert!(matches!(IntegerEncoder::new(mock_context(), 0), Err(HeError::InvalidArgument(_))));

        // 2^255 is the mock plaintext bound
        let big = IntegerEncoder::new(mock_context(), i128::MAX).unwrap();
        assert!(big.encode(i128::MAX).is_ok());
        let decoded = big.decode(&Plaintext::new(SchemaType::Mock, BigSignedInteger::two_pow(254)));
        assert!(matches!(decoded, Err(HeError::Range(_))));
    }

    #[test]
    fn test_float_encoder() {
        let encoder = FloatEncoder::new(mock_context(), FloatEncoder::DEFAULT_SCALE).unwrap();
        for v in [0.0, 1.5, -3.1415926535, 1e12, -2.5e-7] {
            let decoded = encoder.decode(&encoder.encode(v).unwrap()).unwrap();
            assert!((decoded - v).abs() <= 1.0 / encoder.scale(), "{} vs {}", decoded, v);
        }
        assert_eq!(encoder.encode(0.1234564).unwrap().value(), &BigSignedInteger::from(123456));
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(encoder.encode(v), Err(HeError::EncodingOverflow(_))));
        }
        assert!(matches!(encoder.encode(1e300), Err(HeError::EncodingOverflow(_))));
        assert!(FloatEncoder::new(mock_context(), -1.0).is_err());
    }

    #[test]
    fn test_float_encoder_homomorphic() {
        let keygen = KeyGenerator::new(SchemaType::ZPaillier, 512).unwrap();
        let context = HeContext::new(keygen.public_key().clone());
        let encoder = FloatEncoder::new(context.clone(), 1e6).unwrap();
        let encryptor = Encryptor::new(context.clone());
        let decryptor = Decryptor::new(context.clone(), keygen.secret_key().clone()).unwrap();
        let evaluator = Evaluator::new(context);

        let a = encryptor.encrypt(&encoder.encode(1.25).unwrap()).unwrap();
        let b = encryptor.encrypt(&encoder.encode(-0.5).unwrap()).unwrap();
        let sum = evaluator.add(&a, &b).unwrap();
        let decoded = encoder.decode(&decryptor.decrypt(&sum).unwrap()).unwrap();
        assert!((decoded - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_bigint_encoder() {
        let context = mock_context();
        let encoder = BigintEncoder::new(context.clone());
        let values = ["0", "-1", "47509577600241629199431517033180053701", "-47509577600241629199431517033402775166"];
        for s in values {
            let v: BigSignedInteger = s.parse().unwrap();
            assert_eq!(encoder.decode(&encoder.encode(v.clone()).unwrap()).unwrap(), v);
        }
        let bound = context.public_key().plaintext_bound();
        assert!(encoder.encode(&bound - &BigSignedInteger::from(1)).is_ok());
        assert!(matches!(encoder.encode(bound), Err(HeError::EncodingOverflow(_))));
        assert_eq!(encoder.to_string(), "BigintEncoder(schema=none, max_bits=256)");
    }
}
