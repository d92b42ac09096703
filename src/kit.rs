use std::sync::Arc;

use crate::{
    encoder::checked_plaintext,
    numpy::{ArrayLike, DenseMatrix},
    BatchEncoder, BigSignedInteger, BigintEncoder, Decryptor, Encryptor, Evaluator, FloatEncoder,
    HeContext, IntegerEncoder, KeyGenerator, Plaintext, PublicKey, Result, SchemaType, SecretKey,
};

/// Schema and key size of a [HeKit].
///
/// ```rust
/// use hekit::*;
/// let params = KitParameters::new(SchemaType::IcPaillier).set_key_size(1024);
/// assert_eq!(params.key_size(), 1024);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct KitParameters {
    schema: SchemaType,
    key_size: usize,
}

impl KitParameters {

    /// Parameters for `schema` with its default key size.
    pub fn new(schema: SchemaType) -> Self {
        KitParameters { schema, key_size: schema.default_key_size() }
    }

    /// Set the key size in bits.
    pub fn set_key_size(mut self, key_size: usize) -> Self {
        self.key_size = key_size;
        self
    }

    /// The schema.
    pub fn schema(&self) -> SchemaType {
        self.schema
    }

    /// The key size in bits.
    pub fn key_size(&self) -> usize {
        self.key_size
    }
}

/// What both kits offer: everything that only needs the public key.
pub trait KitBase {

    /// The shared context.
    fn context(&self) -> &Arc<HeContext>;

    /// The encryptor.
    fn encryptor(&self) -> &Encryptor;

    /// The evaluator.
    fn evaluator(&self) -> &Evaluator;

    /// The schema of the kit.
    fn schema(&self) -> SchemaType {
        self.context().schema()
    }

    /// The public key of the kit, safe to send to other parties.
    fn public_key(&self) -> &PublicKey {
        self.context().public_key()
    }

    /// A new [IntegerEncoder].
    fn integer_encoder(&self, scale: i128) -> Result<IntegerEncoder> {
        IntegerEncoder::new(self.context().clone(), scale)
    }

    /// A new [FloatEncoder].
    fn float_encoder(&self, scale: f64) -> Result<FloatEncoder> {
        FloatEncoder::new(self.context().clone(), scale)
    }

    /// A new [BigintEncoder].
    fn bigint_encoder(&self) -> BigintEncoder {
        BigintEncoder::new(self.context().clone())
    }

    /// A new [BatchEncoder].
    fn batch_encoder(&self, scale: i64, padding_bits: u32) -> Result<BatchEncoder> {
        BatchEncoder::new(self.context().clone(), scale, padding_bits)
    }

    /// Plaintext of an integer, checked against the plaintext bound.
    fn plaintext(&self, value: impl Into<BigSignedInteger>) -> Result<Plaintext> {
        checked_plaintext(self.context(), value.into().into())
    }

    /// Plaintext array of integers, encoded with the default
    /// [IntegerEncoder].
    fn array(&self, values: impl Into<ArrayLike<i128>>) -> Result<DenseMatrix<Plaintext>> {
        let encoder = self.integer_encoder(IntegerEncoder::DEFAULT_SCALE)?;
        DenseMatrix::encode(values, &encoder)
    }
}

/// Full kit of the key owner: generates or holds the key pair and can
/// decrypt.
///
/// ```rust
/// use hekit::*;
/// let kit = HeKit::new(KitParameters::new(SchemaType::Mock)).unwrap();
/// let a = kit.encryptor().encrypt_raw(123).unwrap();
/// let b = kit.encryptor().encrypt_raw(456).unwrap();
/// let c = kit.evaluator().add(&a, &b).unwrap();
/// assert_eq!(kit.decryptor().decrypt_raw(&c).unwrap(), 579);
/// ```
pub struct HeKit {
    context: Arc<HeContext>,
    secret_key: SecretKey,
    encryptor: Encryptor,
    evaluator: Evaluator,
    decryptor: Decryptor,
}

impl HeKit {

    /// Generate a fresh key pair for the parameters.
    pub fn new(params: KitParameters) -> Result<Self> {
        let (public_key, secret_key) = KeyGenerator::new(params.schema(), params.key_size())?.into_keys();
        Self::from_keys(public_key, secret_key)
    }

    /// Rebuild a kit from a stored key pair.
    /// Fails with [HeError::KeyMismatch](crate::HeError::KeyMismatch) if
    /// the keys were not generated together.
    pub fn from_keys(public_key: PublicKey, secret_key: SecretKey) -> Result<Self> {
        let context = HeContext::new(public_key);
        let decryptor = Decryptor::new(context.clone(), secret_key.clone())?;
        log::debug!("created {} kit with key {}", context.schema(), context.key_id());
        Ok(HeKit {
            encryptor: Encryptor::new(context.clone()),
            evaluator: Evaluator::new(context.clone()),
            context,
            secret_key,
            decryptor,
        })
    }

    /// The secret key. Never send it to another party.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// The decryptor.
    pub fn decryptor(&self) -> &Decryptor {
        &self.decryptor
    }
}

impl KitBase for HeKit {
    fn context(&self) -> &Arc<HeContext> {
        &self.context
    }

    fn encryptor(&self) -> &Encryptor {
        &self.encryptor
    }

    fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }
}

/// Kit of an evaluating party that only holds the public key: it can
/// encode, encrypt and evaluate, but not decrypt.
pub struct PublicKit {
    context: Arc<HeContext>,
    encryptor: Encryptor,
    evaluator: Evaluator,
}

impl PublicKit {

    /// Create a kit around a public key received from the key owner.
    pub fn new(public_key: PublicKey) -> Self {
        let context = HeContext::new(public_key);
        log::debug!("created public {} kit with key {}", context.schema(), context.key_id());
        PublicKit {
            encryptor: Encryptor::new(context.clone()),
            evaluator: Evaluator::new(context.clone()),
            context,
        }
    }
}

impl KitBase for PublicKit {
    fn context(&self) -> &Arc<HeContext> {
        &self.context
    }

    fn encryptor(&self) -> &Encryptor {
        &self.encryptor
    }

    fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }
}
