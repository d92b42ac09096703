use std::fmt;
use std::time::Instant;

use num_bigint::BigInt;

use crate::{
    scheme::{
        self,
        KeyParts, PheDecrypt, PheScheme,
        DjPublicKey, DjSecretKey,
        MockPublicKey, MockSecretKey,
        OuPublicKey, OuSecretKey,
        IcPaillierPublicKey, IcPaillierSecretKey,
        ZPaillierPublicKey, ZPaillierSecretKey,
    },
    util::hash::{self, HashBlock},
    BigSignedInteger, HeError, Result, SchemaType,
};

/// Fingerprint of a [PublicKey]: SHA-256 over its canonical serialized form.
///
/// Every [Ciphertext](crate::Ciphertext) and [SecretKey] carries the id of
/// the public key it belongs to, so operands from different keys are
/// rejected instead of silently producing garbage.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct KeyId(pub HashBlock);

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // first 64 bits are enough to tell keys apart in messages
        write!(f, "{:016x}", self.0[0])
    }
}

/// Public key of any supported scheme.
///
/// Immutable after creation and freely shareable; it is the only key
/// material an evaluating party ever needs.
///
/// - See [SecretKey] for the matching secret.
/// - See [KeyGenerator] for creating a key pair.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PublicKey {
    /// Cleartext stand-in.
    Mock(MockPublicKey),
    /// Okamoto–Uchiyama.
    OU(OuPublicKey),
    /// Paillier with a fixed randomizer base.
    ZPaillier(ZPaillierPublicKey),
    /// Textbook Paillier.
    IcPaillier(IcPaillierPublicKey),
    /// Damgård–Jurik.
    DJ(DjPublicKey),
}

impl PublicKey {

    /// The scheme operations bound to this key.
    pub fn scheme(&self) -> &dyn PheScheme {
        match self {
            PublicKey::Mock(pk) => pk,
            PublicKey::OU(pk) => pk,
            PublicKey::ZPaillier(pk) => pk,
            PublicKey::IcPaillier(pk) => pk,
            PublicKey::DJ(pk) => pk,
        }
    }

    /// The scheme of the key.
    pub fn schema(&self) -> SchemaType {
        self.scheme().schema()
    }

    /// Key size in bits.
    pub fn key_size(&self) -> usize {
        self.scheme().key_size()
    }

    /// Exclusive bound of the signed plaintext range.
    pub fn plaintext_bound(&self) -> BigSignedInteger {
        BigSignedInteger::from(self.scheme().plaintext_bound())
    }

    /// Fingerprint of the key.
    pub fn key_id(&self) -> KeyId {
        KeyId(hash::hash(&self.canonical_bytes()))
    }

    fn parts(&self) -> Vec<BigInt> {
        match self {
            PublicKey::Mock(pk) => pk.parts(),
            PublicKey::OU(pk) => pk.parts(),
            PublicKey::ZPaillier(pk) => pk.parts(),
            PublicKey::IcPaillier(pk) => pk.parts(),
            PublicKey::DJ(pk) => pk.parts(),
        }
    }

    /// Layout: schema tag, key size, then the key components.
    pub(crate) fn canonical_bytes(&self) -> Vec<u8> {
        encode_key(self.schema(), self.key_size(), &self.parts())
    }

    pub(crate) fn from_parts(schema: SchemaType, key_size: usize, parts: Vec<BigInt>) -> Result<Self> {
        check_stored_key_size(schema, key_size)?;
        Ok(match schema {
            SchemaType::Mock => PublicKey::Mock(MockPublicKey::from_parts(key_size, parts)?),
            SchemaType::OU => PublicKey::OU(OuPublicKey::from_parts(key_size, parts)?),
            SchemaType::ZPaillier => PublicKey::ZPaillier(ZPaillierPublicKey::from_parts(key_size, parts)?),
            SchemaType::IcPaillier => PublicKey::IcPaillier(IcPaillierPublicKey::from_parts(key_size, parts)?),
            SchemaType::DJ => PublicKey::DJ(DjPublicKey::from_parts(key_size, parts)?),
        })
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
enum SecretKeyKind {
    Mock(MockSecretKey),
    OU(OuSecretKey),
    ZPaillier(ZPaillierSecretKey),
    IcPaillier(IcPaillierSecretKey),
    DJ(DjSecretKey),
}

/// Secret key of any supported scheme, tagged with the [KeyId] of its
/// public key.
///
/// Serializable for local persistence; no kit API ever hands it to another
/// party.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SecretKey {
    key_id: KeyId,
    kind: SecretKeyKind,
}

impl SecretKey {

    /// The id of the public key this secret belongs to.
    pub fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    /// The scheme of the key.
    pub fn schema(&self) -> SchemaType {
        match &self.kind {
            SecretKeyKind::Mock(_) => SchemaType::Mock,
            SecretKeyKind::OU(_) => SchemaType::OU,
            SecretKeyKind::ZPaillier(_) => SchemaType::ZPaillier,
            SecretKeyKind::IcPaillier(_) => SchemaType::IcPaillier,
            SecretKeyKind::DJ(_) => SchemaType::DJ,
        }
    }

    /// Key size in bits.
    pub fn key_size(&self) -> usize {
        match &self.kind {
            SecretKeyKind::Mock(sk) => sk.bits(),
            SecretKeyKind::OU(sk) => sk.bits(),
            SecretKeyKind::ZPaillier(sk) => sk.bits(),
            SecretKeyKind::IcPaillier(sk) => sk.bits(),
            SecretKeyKind::DJ(sk) => sk.bits(),
        }
    }

    /// The decryption operation of this key.
    pub fn decrypter(&self) -> &dyn PheDecrypt {
        match &self.kind {
            SecretKeyKind::Mock(sk) => sk,
            SecretKeyKind::OU(sk) => sk,
            SecretKeyKind::ZPaillier(sk) => sk,
            SecretKeyKind::IcPaillier(sk) => sk,
            SecretKeyKind::DJ(sk) => sk,
        }
    }

    fn parts(&self) -> Vec<BigInt> {
        match &self.kind {
            SecretKeyKind::Mock(sk) => sk.parts(),
            SecretKeyKind::OU(sk) => sk.parts(),
            SecretKeyKind::ZPaillier(sk) => sk.parts(),
            SecretKeyKind::IcPaillier(sk) => sk.parts(),
            SecretKeyKind::DJ(sk) => sk.parts(),
        }
    }

    /// Layout: schema tag, key size, then the secret components.
    /// The key id is written separately.
    pub(crate) fn canonical_bytes(&self) -> Vec<u8> {
        encode_key(self.schema(), self.key_size(), &self.parts())
    }

    pub(crate) fn from_parts(key_id: KeyId, schema: SchemaType, key_size: usize, parts: Vec<BigInt>) -> Result<Self> {
        check_stored_key_size(schema, key_size)?;
        let kind = match schema {
            SchemaType::Mock => SecretKeyKind::Mock(MockSecretKey::from_parts(key_size, parts)?),
            SchemaType::OU => SecretKeyKind::OU(OuSecretKey::from_parts(key_size, parts)?),
            SchemaType::ZPaillier => SecretKeyKind::ZPaillier(ZPaillierSecretKey::from_parts(key_size, parts)?),
            SchemaType::IcPaillier => SecretKeyKind::IcPaillier(IcPaillierSecretKey::from_parts(key_size, parts)?),
            SchemaType::DJ => SecretKeyKind::DJ(DjSecretKey::from_parts(key_size, parts)?),
        };
        Ok(SecretKey { key_id, kind })
    }
}

fn check_stored_key_size(schema: SchemaType, key_size: usize) -> Result<()> {
    if key_size < schema.min_key_size() || key_size > SchemaType::MAX_KEY_SIZE {
        return Err(HeError::Serialization(format!("malformed {} key: key size {}", schema, key_size)));
    }
    Ok(())
}

pub(crate) fn encode_key(schema: SchemaType, key_size: usize, parts: &[BigInt]) -> Vec<u8> {
    let mut bytes = vec![u8::from(schema)];
    bytes.extend_from_slice(&(key_size as u64).to_le_bytes());
    bytes.extend_from_slice(&(parts.len() as u64).to_le_bytes());
    for part in parts {
        let part = part.to_signed_bytes_le();
        bytes.extend_from_slice(&(part.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&part);
    }
    bytes
}

/// Generates a matching [PublicKey] and [SecretKey].
///
/// ```rust
/// use hekit::*;
/// let keygen = KeyGenerator::new(SchemaType::Mock, 256).unwrap();
/// let context = HeContext::new(keygen.public_key().clone());
/// let decryptor = Decryptor::new(context, keygen.secret_key().clone()).unwrap();
/// ```
pub struct KeyGenerator {
    public_key: PublicKey,
    secret_key: SecretKey,
}

impl KeyGenerator {

    /// Create a fresh key pair. Fails with [HeError::InvalidArgument] if
    /// `key_size` is below [SchemaType::min_key_size] or above
    /// [SchemaType::MAX_KEY_SIZE].
    pub fn new(schema: SchemaType, key_size: usize) -> Result<Self> {
        if key_size < schema.min_key_size() {
            return Err(HeError::InvalidArgument(format!(
                "key size {} is below the minimum {} of {}", key_size, schema.min_key_size(), schema
            )));
        }
        if key_size > SchemaType::MAX_KEY_SIZE {
            return Err(HeError::InvalidArgument(format!(
                "key size {} is above the maximum {}", key_size, SchemaType::MAX_KEY_SIZE
            )));
        }
        let timer = Instant::now();
        let (public_key, kind) = match schema {
            SchemaType::Mock => {
                let (pk, sk) = scheme::mock::keygen(key_size);
                (PublicKey::Mock(pk), SecretKeyKind::Mock(sk))
            },
            SchemaType::OU => {
                let (pk, sk) = scheme::ou::keygen(key_size)?;
                (PublicKey::OU(pk), SecretKeyKind::OU(sk))
            },
            SchemaType::ZPaillier => {
                let (pk, sk) = scheme::paillier_z::keygen(key_size)?;
                (PublicKey::ZPaillier(pk), SecretKeyKind::ZPaillier(sk))
            },
            SchemaType::IcPaillier => {
                let (pk, sk) = scheme::paillier_ic::keygen(key_size)?;
                (PublicKey::IcPaillier(pk), SecretKeyKind::IcPaillier(sk))
            },
            SchemaType::DJ => {
                let (pk, sk) = scheme::dj::keygen(key_size)?;
                (PublicKey::DJ(pk), SecretKeyKind::DJ(sk))
            },
        };
        let key_id = public_key.key_id();
        log::info!("generated {} key pair ({} bits, id {}) in {:?}", schema, key_size, key_id, timer.elapsed());
        Ok(KeyGenerator { public_key, secret_key: SecretKey { key_id, kind } })
    }

    /// The generated public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The generated secret key.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Take both keys.
    pub fn into_keys(self) -> (PublicKey, SecretKey) {
        (self.public_key, self.secret_key)
    }
}
