use std::sync::Arc;

use num_bigint::BigInt;

use crate::{
    key::{KeyId, PublicKey},
    scheme::PheScheme,
    Ciphertext, HeError, Plaintext, Result, SchemaType,
};

/// Everything the encryptor, evaluator and encoders need to know about a key:
/// the schema, the public key and its fingerprint.
///
/// A context is immutable and shared through an [Arc], so role objects built
/// on the same context can run on any number of threads.
///
/// ```rust
/// use hekit::*;
/// let keygen = KeyGenerator::new(SchemaType::Mock, 256).unwrap();
/// let context = HeContext::new(keygen.public_key().clone());
/// assert_eq!(context.schema(), SchemaType::Mock);
/// ```
#[derive(Debug)]
pub struct HeContext {
    public_key: PublicKey,
    key_id: KeyId,
}

impl HeContext {

    /// Create a context around a public key.
    pub fn new(public_key: PublicKey) -> Arc<Self> {
        let key_id = public_key.key_id();
        log::debug!("created {} context ({} bits, key {})", public_key.schema(), public_key.key_size(), key_id);
        Arc::new(HeContext { public_key, key_id })
    }

    /// The schema of the context.
    pub fn schema(&self) -> SchemaType {
        self.public_key.schema()
    }

    /// The public key of the context.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Fingerprint of [Self::public_key].
    pub fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    /// Key size in bits.
    pub fn key_size(&self) -> usize {
        self.public_key.key_size()
    }

    pub(crate) fn scheme(&self) -> &dyn PheScheme {
        self.public_key.scheme()
    }

    /// Exclusive bound of the signed plaintext range.
    pub(crate) fn plaintext_bound(&self) -> &BigInt {
        self.scheme().plaintext_bound()
    }

    /// Fails with [HeError::KeyMismatch] if the ciphertext was not produced
    /// under this context's public key.
    pub(crate) fn check_ciphertext(&self, ciphertext: &Ciphertext) -> Result<()> {
        if ciphertext.key_id() != &self.key_id {
            return Err(HeError::KeyMismatch(format!(
                "ciphertext of key {} used with key {}", ciphertext.key_id(), self.key_id
            )));
        }
        Ok(())
    }

    /// Fails with [HeError::KeyMismatch] if the plaintext is tagged with
    /// another schema.
    pub(crate) fn check_plaintext(&self, plaintext: &Plaintext) -> Result<()> {
        if plaintext.schema() != self.schema() {
            return Err(HeError::KeyMismatch(format!(
                "{} plaintext used with a {} context", plaintext.schema(), self.schema()
            )));
        }
        Ok(())
    }

    /// Fails with [HeError::KeyMismatch] if the two ciphertexts belong to
    /// different keys, or to a key other than this context's.
    pub(crate) fn check_ciphertexts(&self, a: &Ciphertext, b: &Ciphertext) -> Result<()> {
        if a.key_id() != b.key_id() {
            return Err(HeError::KeyMismatch(format!(
                "operands belong to different keys {} and {}", a.key_id(), b.key_id()
            )));
        }
        self.check_ciphertext(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyGenerator;

    #[test]
    fn test_context() {
        let keygen = KeyGenerator::new(SchemaType::Mock, 512).unwrap();
        let context = HeContext::new(keygen.public_key().clone());
        assert_eq!(context.key_size(), 512);
        assert_eq!(context.key_id(), keygen.secret_key().key_id());
        assert_eq!(context.plaintext_bound(), &(BigInt::from(1) << 511u32));

        let other = KeyGenerator::new(SchemaType::Mock, 256).unwrap();
        let other = HeContext::new(other.public_key().clone());
        let c = Ciphertext::new(*other.key_id(), BigInt::from(3));
        assert!(matches!(context.check_ciphertext(&c), Err(HeError::KeyMismatch(_))));
        assert!(other.check_ciphertext(&c).is_ok());
        let d = Ciphertext::new(*context.key_id(), BigInt::from(3));
        assert!(matches!(other.check_ciphertexts(&c, &d), Err(HeError::KeyMismatch(_))));
        assert!(context.check_plaintext(&Plaintext::new(SchemaType::Mock, 1)).is_ok());
        assert!(context.check_plaintext(&Plaintext::new(SchemaType::OU, 1)).is_err());
    }
}
