use std::fmt;
use std::sync::Arc;

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed};

use crate::{
    context::HeContext,
    encoder::{checked_plaintext, PlainEncoder},
    HeError, Plaintext, Result, SchemaType,
};

/// Packs two 64-bit integers into one plaintext.
///
/// The plaintext is `(b << (64 + padding_bits)) + a`, where `a` and `b` are
/// the scaled values reinterpreted as unsigned 64-bit words. The padding
/// bits between the slots absorb carries, so adding packed plaintexts or
/// ciphertexts adds both slots independently.
///
/// ## Caller responsibility
/// The slots are only independent while every intermediate component stays
/// non-negative and within 64 bits. Subtracting into a negative component
/// borrows from the neighbouring slot and corrupts both values without any
/// error.
///
/// ```rust
/// use hekit::*;
/// let kit = HeKit::new(KitParameters::new(SchemaType::Mock)).unwrap();
/// let encoder = kit.batch_encoder(1, 32).unwrap();
/// let a = kit.encryptor().encrypt(&encoder.encode((123, 456)).unwrap()).unwrap();
/// let b = kit.encryptor().encrypt(&encoder.encode((789, 101112)).unwrap()).unwrap();
/// let sum = kit.evaluator().add(&a, &b).unwrap();
/// assert_eq!(encoder.decode(&kit.decryptor().decrypt(&sum).unwrap()).unwrap(), (912, 101568));
/// ```
#[derive(Clone)]
pub struct BatchEncoder {
    context: Arc<HeContext>,
    scale: i64,
    padding_bits: u32,
}

const SLOT_BITS: u32 = 64;

impl BatchEncoder {

    /// Default scale.
    pub const DEFAULT_SCALE: i64 = 1;
    /// Default padding between the two slots.
    pub const DEFAULT_PADDING_BITS: u32 = 32;

    /// Creates a BatchEncoder. The scale must be positive and the packed
    /// width `128 + padding_bits` must fit the plaintext range.
    pub fn new(context: Arc<HeContext>, scale: i64, padding_bits: u32) -> Result<Self> {
        if scale <= 0 {
            return Err(HeError::InvalidArgument(format!("batch encoder scale must be positive, got {}", scale)));
        }
        let packed_bits = 2 * SLOT_BITS as u64 + padding_bits as u64;
        if packed_bits >= context.plaintext_bound().bits() {
            return Err(HeError::InvalidArgument(format!(
                "packing needs {} bits, the {} plaintext range only has {}",
                packed_bits, context.schema(), context.plaintext_bound().bits() - 1
            )));
        }
        Ok(BatchEncoder { context, scale, padding_bits })
    }

    /// The scale applied to both components.
    pub fn scale(&self) -> i64 {
        self.scale
    }

    /// Padding between the slots.
    pub fn padding_bits(&self) -> u32 {
        self.padding_bits
    }

    fn shift(&self) -> u32 {
        SLOT_BITS + self.padding_bits
    }

    fn scaled(&self, value: i64) -> Result<u64> {
        value.checked_mul(self.scale).map(|v| v as u64).ok_or_else(|| {
            HeError::EncodingOverflow(format!("{} * {} overflows a 64-bit slot", value, self.scale))
        })
    }
}

fn low_word(value: &BigUint) -> u64 {
    value.iter_u64_digits().next().unwrap_or(0)
}

impl PlainEncoder<(i64, i64)> for BatchEncoder {
    fn encode(&self, value: (i64, i64)) -> Result<Plaintext> {
        let (a, b) = (self.scaled(value.0)?, self.scaled(value.1)?);
        let packed = (BigInt::from(b) << self.shift()) + BigInt::from(a);
        checked_plaintext(&self.context, packed)
    }

    fn decode(&self, plain: &Plaintext) -> Result<(i64, i64)> {
        let value = plain.as_bigint();
        let magnitude = value.magnitude();
        let mask = (BigUint::one() << SLOT_BITS) - 1u32;
        let mut a = low_word(&(magnitude & &mask)) as i64;
        let mut b = low_word(&((magnitude >> self.shift()) & &mask)) as i64;
        if value.is_negative() {
            a = a.wrapping_neg();
            b = b.wrapping_neg();
        }
        Ok((a / self.scale, b / self.scale))
    }

    fn schema(&self) -> SchemaType {
        self.context.schema()
    }
}

impl fmt::Display for BatchEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BatchEncoder(schema={}, scale={}, padding_bits={})", self.context.schema(), self.scale, self.padding_bits)
    }
}
