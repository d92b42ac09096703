use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::Signed;
use rayon::prelude::*;

use crate::{
    context::HeContext,
    key::SecretKey,
    numpy::DenseMatrix,
    AuditRecord, BigSignedInteger, Ciphertext, HeError, Plaintext, Result,
};

/// Encrypts [Plaintext] objects into [Ciphertext] objects.
///
/// Constructing an Encryptor requires only a [HeContext]: encryption needs
/// nothing but the public key, so an evaluating party without the secret
/// key can encrypt its own inputs as well.
///
/// Encryption consumes fresh randomness on every call and never mutates
/// shared state, so one encryptor may be used from many threads.
pub struct Encryptor {
    context: Arc<HeContext>,
}

impl Encryptor {

    /// Creates a new Encryptor object.
    /// ```rust
    /// use hekit::*;
    /// let keygen = KeyGenerator::new(SchemaType::Mock, 256).unwrap();
    /// let context = HeContext::new(keygen.public_key().clone());
    /// let encryptor = Encryptor::new(context.clone());
    /// let cipher = encryptor.encrypt_raw(123).unwrap();
    /// ```
    pub fn new(context: Arc<HeContext>) -> Self {
        Encryptor { context }
    }

    /// The [HeContext] of the encryptor.
    pub fn context(&self) -> &Arc<HeContext> {
        &self.context
    }

    /// Encrypt a plaintext. Fails with [HeError::Domain] if it lies outside
    /// the plaintext range.
    pub fn encrypt(&self, plain: &Plaintext) -> Result<Ciphertext> {
        self.context.check_plaintext(plain)?;
        let value = self.context.scheme().encrypt(plain.as_bigint())?;
        Ok(Ciphertext::new(*self.context.key_id(), value))
    }

    /// Encrypt a raw integer, embedded unchanged.
    pub fn encrypt_raw(&self, value: impl Into<BigSignedInteger>) -> Result<Ciphertext> {
        self.encrypt(&Plaintext::new(self.context.schema(), value))
    }

    /// Encrypt and record the randomness used.
    pub fn encrypt_with_audit(&self, plain: &Plaintext) -> Result<(Ciphertext, AuditRecord)> {
        self.context.check_plaintext(plain)?;
        let (value, audit) = self.context.scheme().encrypt_with_audit(plain.as_bigint())?;
        Ok((Ciphertext::new(*self.context.key_id(), value), AuditRecord::new(audit)))
    }

    /// A fresh encryption of zero.
    pub fn encrypt_zero(&self) -> Ciphertext {
        Ciphertext::new(*self.context.key_id(), self.context.scheme().encrypt_zero())
    }

    /// Encrypt every element of a plaintext array, in parallel.
    pub fn encrypt_array(&self, plains: &DenseMatrix<Plaintext>) -> Result<DenseMatrix<Ciphertext>> {
        log::debug!("encrypting array of shape {}", plains.shape());
        plains.par_try_map(|plain| self.encrypt(plain))
    }

    /// Encrypt every element of a plaintext array and return the audit
    /// records in an array of the same shape.
    pub fn encrypt_array_with_audit(&self, plains: &DenseMatrix<Plaintext>) -> Result<(DenseMatrix<Ciphertext>, DenseMatrix<AuditRecord>)> {
        let pairs = plains.par_try_map(|plain| self.encrypt_with_audit(plain))?;
        Ok(pairs.unzip())
    }
}

/// Decrypts [Ciphertext] objects into [Plaintext] objects.
///
/// Constructing a Decryptor requires a [HeContext] and the [SecretKey]
/// generated together with the context's public key.
pub struct Decryptor {
    context: Arc<HeContext>,
    secret_key: SecretKey,
}

impl Decryptor {

    /// Creates a new Decryptor object.
    /// Fails with [HeError::KeyMismatch] if the secret key does not belong to
    /// the context's public key.
    /// ```rust
    /// use hekit::*;
    /// let keygen = KeyGenerator::new(SchemaType::Mock, 256).unwrap();
    /// let context = HeContext::new(keygen.public_key().clone());
    /// let decryptor = Decryptor::new(context.clone(), keygen.secret_key().clone()).unwrap();
    /// ```
    pub fn new(context: Arc<HeContext>, secret_key: SecretKey) -> Result<Self> {
        if secret_key.key_id() != context.key_id() {
            return Err(HeError::KeyMismatch(format!(
                "secret key of key {} does not match context key {}", secret_key.key_id(), context.key_id()
            )));
        }
        Ok(Decryptor { context, secret_key })
    }

    /// The [HeContext] of the decryptor.
    pub fn context(&self) -> &Arc<HeContext> {
        &self.context
    }

    /// Decrypt a ciphertext into its signed plaintext.
    pub fn decrypt(&self, cipher: &Ciphertext) -> Result<Plaintext> {
        self.context.check_ciphertext(cipher)?;
        let value = self.secret_key.decrypter().decrypt(cipher.value())?;
        Ok(Plaintext::new(self.context.schema(), value))
    }

    /// Inverse of [Encryptor::encrypt_raw]. Fails with [HeError::Range] if the
    /// plaintext does not fit an `i128`.
    pub fn decrypt_raw(&self, cipher: &Ciphertext) -> Result<i128> {
        self.decrypt(cipher)?.value().to_i128()
    }

    /// Decrypt and check that `|m| < 2^bits`, failing with [HeError::Domain]
    /// otherwise. Useful to detect wrapped results.
    pub fn decrypt_in_range(&self, cipher: &Ciphertext, bits: u64) -> Result<Plaintext> {
        let plain = self.decrypt(cipher)?;
        if plain.as_bigint().abs() >= BigInt::from(1) << bits {
            return Err(HeError::Domain(format!("decrypted value {} exceeds {} bits", plain, bits)));
        }
        Ok(plain)
    }

    /// Decrypt every element of a ciphertext array, in parallel.
    pub fn decrypt_array(&self, ciphers: &DenseMatrix<Ciphertext>) -> Result<DenseMatrix<Plaintext>> {
        log::debug!("decrypting array of shape {}", ciphers.shape());
        ciphers.par_try_map(|cipher| self.decrypt(cipher))
    }
}
