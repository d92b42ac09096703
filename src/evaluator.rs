use std::sync::Arc;

use crate::{
    context::HeContext,
    Ciphertext, HeError, Plaintext, Result,
};

/// Provides operations on [Ciphertext] and [Plaintext] objects.
///
/// Due to the additive homomorphism of every bundled scheme, adding two
/// ciphertexts adds the underlying plaintexts, and multiplying a ciphertext
/// with a plaintext scales the underlying plaintext. Results reduce into
/// the symmetric plaintext range of the key, so overflowing sums wrap
/// silently; use [Decryptor::decrypt_in_range](crate::Decryptor::decrypt_in_range)
/// where wrapping must be detected.
///
/// ## Operand combinations
/// | left \ right | [Plaintext] | [Ciphertext] |
/// |---|---|---|
/// | [Plaintext] | exact integer arithmetic | `add`, `sub`, `mul` |
/// | [Ciphertext] | `add`, `sub`, `mul` | `add`, `sub` |
///
/// Multiplying two ciphertexts is not supported by a partially homomorphic
/// scheme and fails with [HeError::UnsupportedOperation].
///
/// ## Keys
/// Every ciphertext operand must belong to the evaluator's public key and
/// every plaintext operand to its schema, otherwise the operation fails
/// with [HeError::KeyMismatch].
///
/// The same operations on [DenseMatrix](crate::DenseMatrix) operands run
/// elementwise and in parallel, see [Evaluator::matmul] and [Evaluator::sum]
/// for the reductions.
pub struct Evaluator {
    pub(crate) context: Arc<HeContext>,
}

/// Binary operations producing a new value.
pub trait Evaluate<L, R> {
    /// Type of the result.
    type Output;
    /// `a + b`.
    fn add(&self, a: &L, b: &R) -> Result<Self::Output>;
    /// `a - b`, equivalent to `a + (-b)`.
    fn sub(&self, a: &L, b: &R) -> Result<Self::Output>;
    /// `a * b`.
    fn mul(&self, a: &L, b: &R) -> Result<Self::Output>;
}

/// Binary operations updating the left operand.
///
/// The accumulator is borrowed exclusively for the duration of the call;
/// sharing one accumulator between threads needs a lock around it.
pub trait EvaluateInplace<L, R> {
    /// `a += b`.
    fn add_inplace(&self, a: &mut L, b: &R) -> Result<()>;
    /// `a -= b`.
    fn sub_inplace(&self, a: &mut L, b: &R) -> Result<()>;
    /// `a *= b`.
    fn mul_inplace(&self, a: &mut L, b: &R) -> Result<()>;
}

/// Negation.
pub trait Negate<T> {
    /// `-a`.
    fn negate(&self, a: &T) -> Result<T>;
    /// `a = -a`.
    fn negate_inplace(&self, a: &mut T) -> Result<()>;
}

impl Evaluator {

    /// Create an evaluator with the specified [HeContext].
    /// ```rust
    /// use hekit::*;
    /// let keygen = KeyGenerator::new(SchemaType::Mock, 256).unwrap();
    /// let context = HeContext::new(keygen.public_key().clone());
    /// let encryptor = Encryptor::new(context.clone());
    /// let evaluator = Evaluator::new(context);
    /// let a = encryptor.encrypt_raw(123).unwrap();
    /// let b = encryptor.encrypt_raw(456).unwrap();
    /// let c = evaluator.add(&a, &b).unwrap();
    /// ```
    pub fn new(context: Arc<HeContext>) -> Self {
        Evaluator { context }
    }

    /// The [HeContext] of the evaluator.
    pub fn context(&self) -> &Arc<HeContext> {
        &self.context
    }

    /// Re-randomize a ciphertext in place: same plaintext, fresh randomness,
    /// so the result cannot be linked to the input.
    pub fn randomize(&self, cipher: &mut Ciphertext) -> Result<()> {
        self.context.check_ciphertext(cipher)?;
        let value = self.context.scheme().randomize(cipher.value());
        cipher.set_value(value);
        Ok(())
    }

    fn check_plaintexts(&self, a: &Plaintext, b: &Plaintext) -> Result<()> {
        self.context.check_plaintext(a)?;
        self.context.check_plaintext(b)
    }

    fn check_mixed(&self, c: &Ciphertext, p: &Plaintext) -> Result<()> {
        self.context.check_ciphertext(c)?;
        self.context.check_plaintext(p)
    }

    fn cipher(&self, value: num_bigint::BigInt) -> Ciphertext {
        Ciphertext::new(*self.context.key_id(), value)
    }
}

impl Evaluate<Plaintext, Plaintext> for Evaluator {
    type Output = Plaintext;

    fn add(&self, a: &Plaintext, b: &Plaintext) -> Result<Plaintext> {
        self.check_plaintexts(a, b)?;
        Ok(Plaintext::new(a.schema(), a.value() + b.value()))
    }

    fn sub(&self, a: &Plaintext, b: &Plaintext) -> Result<Plaintext> {
        self.check_plaintexts(a, b)?;
        Ok(Plaintext::new(a.schema(), a.value() - b.value()))
    }

    fn mul(&self, a: &Plaintext, b: &Plaintext) -> Result<Plaintext> {
        self.check_plaintexts(a, b)?;
        Ok(Plaintext::new(a.schema(), a.value() * b.value()))
    }
}

impl Evaluate<Ciphertext, Plaintext> for Evaluator {
    type Output = Ciphertext;

    fn add(&self, a: &Ciphertext, b: &Plaintext) -> Result<Ciphertext> {
        self.check_mixed(a, b)?;
        Ok(self.cipher(self.context.scheme().add_plain(a.value(), b.as_bigint())?))
    }

    fn sub(&self, a: &Ciphertext, b: &Plaintext) -> Result<Ciphertext> {
        self.check_mixed(a, b)?;
        Ok(self.cipher(self.context.scheme().add_plain(a.value(), &-b.as_bigint())?))
    }

    fn mul(&self, a: &Ciphertext, b: &Plaintext) -> Result<Ciphertext> {
        self.check_mixed(a, b)?;
        Ok(self.cipher(self.context.scheme().mul_plain(a.value(), b.as_bigint())?))
    }
}

impl Evaluate<Plaintext, Ciphertext> for Evaluator {
    type Output = Ciphertext;

    fn add(&self, a: &Plaintext, b: &Ciphertext) -> Result<Ciphertext> {
        Evaluate::<Ciphertext, Plaintext>::add(self, b, a)
    }

    fn sub(&self, a: &Plaintext, b: &Ciphertext) -> Result<Ciphertext> {
        let negated = self.negate(b)?;
        Evaluate::<Ciphertext, Plaintext>::add(self, &negated, a)
    }

    fn mul(&self, a: &Plaintext, b: &Ciphertext) -> Result<Ciphertext> {
        Evaluate::<Ciphertext, Plaintext>::mul(self, b, a)
    }
}

impl Evaluate<Ciphertext, Ciphertext> for Evaluator {
    type Output = Ciphertext;

    fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.context.check_ciphertexts(a, b)?;
        Ok(self.cipher(self.context.scheme().add(a.value(), b.value())))
    }

    fn sub(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.context.check_ciphertexts(a, b)?;
        let negated = self.context.scheme().negate(b.value())?;
        Ok(self.cipher(self.context.scheme().add(a.value(), &negated)))
    }

    fn mul(&self, _a: &Ciphertext, _b: &Ciphertext) -> Result<Ciphertext> {
        Err(HeError::UnsupportedOperation(format!(
            "{} cannot multiply two ciphertexts", self.context.schema()
        )))
    }
}

impl EvaluateInplace<Plaintext, Plaintext> for Evaluator {

    fn add_inplace(&self, a: &mut Plaintext, b: &Plaintext) -> Result<()> {
        self.check_plaintexts(a, b)?;
        *a.value_mut() += b.value();
        Ok(())
    }

    fn sub_inplace(&self, a: &mut Plaintext, b: &Plaintext) -> Result<()> {
        self.check_plaintexts(a, b)?;
        *a.value_mut() -= b.value();
        Ok(())
    }

    fn mul_inplace(&self, a: &mut Plaintext, b: &Plaintext) -> Result<()> {
        self.check_plaintexts(a, b)?;
        *a.value_mut() *= b.value();
        Ok(())
    }
}

impl EvaluateInplace<Ciphertext, Plaintext> for Evaluator {

    fn add_inplace(&self, a: &mut Ciphertext, b: &Plaintext) -> Result<()> {
        let result = self.add(&*a, b)?;
        *a = result;
        Ok(())
    }

    fn sub_inplace(&self, a: &mut Ciphertext, b: &Plaintext) -> Result<()> {
        let result = self.sub(&*a, b)?;
        *a = result;
        Ok(())
    }

    fn mul_inplace(&self, a: &mut Ciphertext, b: &Plaintext) -> Result<()> {
        let result = self.mul(&*a, b)?;
        *a = result;
        Ok(())
    }
}

impl EvaluateInplace<Ciphertext, Ciphertext> for Evaluator {

    fn add_inplace(&self, a: &mut Ciphertext, b: &Ciphertext) -> Result<()> {
        let result = self.add(&*a, b)?;
        *a = result;
        Ok(())
    }

    fn sub_inplace(&self, a: &mut Ciphertext, b: &Ciphertext) -> Result<()> {
        let result = self.sub(&*a, b)?;
        *a = result;
        Ok(())
    }

    fn mul_inplace(&self, a: &mut Ciphertext, b: &Ciphertext) -> Result<()> {
        let result = self.mul(&*a, b)?;
        *a = result;
        Ok(())
    }
}

impl Negate<Plaintext> for Evaluator {

    fn negate(&self, a: &Plaintext) -> Result<Plaintext> {
        self.context.check_plaintext(a)?;
        Ok(Plaintext::new(a.schema(), -a.value()))
    }

    fn negate_inplace(&self, a: &mut Plaintext) -> Result<()> {
        *a = self.negate(&*a)?;
        Ok(())
    }
}

impl Negate<Ciphertext> for Evaluator {

    fn negate(&self, a: &Ciphertext) -> Result<Ciphertext> {
        self.context.check_ciphertext(a)?;
        Ok(self.cipher(self.context.scheme().negate(a.value())?))
    }

    fn negate_inplace(&self, a: &mut Ciphertext) -> Result<()> {
        let value = self.negate(&*a)?.value().clone();
        a.set_value(value);
        Ok(())
    }
}
