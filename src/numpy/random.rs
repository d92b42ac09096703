//! Random plaintext arrays.

use num_bigint::{BigInt, RandBigInt};
use rand_distr::{Distribution, Uniform};

use crate::{util::BlakeRngFactory, HeError, Plaintext, Result, SchemaType};

use super::DenseMatrix;

/// Array of `shape` with values drawn uniformly from `[low, high)`.
/// Fails with [HeError::KeyMismatch] if the bounds have different schemas
/// and with [HeError::InvalidArgument] if `low >= high`.
/// ```rust
/// use hekit::*;
/// let low = Plaintext::new(SchemaType::Mock, -10);
/// let high = Plaintext::new(SchemaType::Mock, 10);
/// let array = random::randint(&low, &high, &[3, 4]).unwrap();
/// assert!(array.iter().all(|p| p >= &low && p < &high));
/// ```
pub fn randint(low: &Plaintext, high: &Plaintext, shape: &[usize]) -> Result<DenseMatrix<Plaintext>> {
    if low.schema() != high.schema() {
        return Err(HeError::KeyMismatch(format!(
            "range bounds belong to {} and {}", low.schema(), high.schema()
        )));
    }
    if low >= high {
        return Err(HeError::InvalidArgument(format!("empty range [{}, {})", low, high)));
    }
    let schema = low.schema();
    let distribution: Uniform<BigInt> = Uniform::new(low.as_bigint(), high.as_bigint());
    let mut rng = BlakeRngFactory::new().get_rng();
    DenseMatrix::from_shape_fn(shape, |_, _| Plaintext::new(schema, distribution.sample(&mut rng)))
}

/// Array of `shape` with values drawn uniformly from `[0, 2^bits)`.
pub fn randbits(schema: SchemaType, bits: u64, shape: &[usize]) -> Result<DenseMatrix<Plaintext>> {
    let mut rng = BlakeRngFactory::new().get_rng();
    DenseMatrix::from_shape_fn(shape, |_, _| Plaintext::new(schema, BigInt::from(rng.gen_biguint(bits))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numpy::Shape;
    use crate::BigSignedInteger;

    #[test]
    fn test_randint() {
        let low = Plaintext::new(SchemaType::ZPaillier, -3);
        let high = Plaintext::new(SchemaType::ZPaillier, 3);
        let array = randint(&low, &high, &[20, 30]).unwrap();
        assert_eq!(array.shape(), Shape::new(vec![20, 30]));
        assert!(array.iter().all(|p| p >= &low && p < &high && p.schema() == SchemaType::ZPaillier));
        // 600 draws from 6 values hit both ends
        assert!(array.iter().any(|p| p == &low));
        assert!(array.iter().any(|p| p.value() == &BigSignedInteger::from(2)));

        let vector = randint(&low, &high, &[5]).unwrap();
        assert_eq!(vector.shape(), Shape::new(vec![5]));
        let scalar = randint(&low, &high, &[]).unwrap();
        assert_eq!(scalar.ndim(), 0);

        assert!(matches!(randint(&high, &low, &[2]), Err(HeError::InvalidArgument(_))));
        assert!(matches!(randint(&low, &low, &[2]), Err(HeError::InvalidArgument(_))));
        assert!(randint(&low, &high, &[2, 2, 2]).is_err());
    }

    #[test]
    fn test_randint_mixed_schemas() {
        let low = Plaintext::new(SchemaType::ZPaillier, 0);
        let high = Plaintext::new(SchemaType::Mock, 100);
        assert!(matches!(randint(&low, &high, &[2]), Err(HeError::KeyMismatch(_))));
        // a range that is empty by value still reports the schema mismatch
        let high = Plaintext::new(SchemaType::OU, -100);
        assert!(matches!(randint(&low, &high, &[2]), Err(HeError::KeyMismatch(_))));
        assert!(matches!(randint(&high, &low, &[2]), Err(HeError::KeyMismatch(_))));
    }

    #[test]
    fn test_randbits() {
        let array = randbits(SchemaType::Mock, 200, &[4, 8]).unwrap();
        assert_eq!(array.shape(), Shape::new(vec![4, 8]));
        let bound = BigSignedInteger::two_pow(200);
        assert!(array.iter().all(|p| !p.value().is_negative() && p.value() < &bound));
        assert!(array.iter().any(|p| p.value().bit_count() > 190));
    }
}
