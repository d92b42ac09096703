use std::fmt;

use num_bigint::BigInt;

use crate::{key::KeyId, BigSignedInteger, SchemaType};

/// Struct to store a plaintext element.
///
/// A plaintext is a signed big integer tagged with the schema it is meant
/// for. Plaintexts are produced by the encoders (see
/// [PlainEncoder](crate::PlainEncoder)) and by decryption. Arithmetic on two
/// plaintexts is exact; only encryption and homomorphic evaluation reduce
/// into the scheme's plaintext range.
///
/// Equality and ordering compare the value first.
///
/// See [Ciphertext] for the struct that stores ciphertexts.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct Plaintext {
    value: BigSignedInteger,
    schema: SchemaType,
}

impl Plaintext {

    /// Creates a plaintext holding `value` as is.
    pub fn new(schema: SchemaType, value: impl Into<BigSignedInteger>) -> Self {
        Plaintext { value: value.into(), schema }
    }

    /// The schema this plaintext is meant for.
    pub fn schema(&self) -> SchemaType {
        self.schema
    }

    /// The signed value.
    pub fn value(&self) -> &BigSignedInteger {
        &self.value
    }

    /// Take the signed value.
    pub fn into_value(self) -> BigSignedInteger {
        self.value
    }

    pub(crate) fn as_bigint(&self) -> &BigInt {
        self.value.as_bigint()
    }

    pub(crate) fn value_mut(&mut self) -> &mut BigSignedInteger {
        &mut self.value
    }
}

impl fmt::Display for Plaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Struct to store a ciphertext element.
///
/// Every bundled scheme represents a ciphertext as one residue modulo the
/// ciphertext modulus of its public key. The ciphertext remembers the
/// [KeyId] of that key, and any operation mixing ciphertexts of different
/// keys fails with [HeError::KeyMismatch](crate::HeError::KeyMismatch).
#[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct Ciphertext {
    key_id: KeyId,
    value: BigInt,
}

impl Ciphertext {

    pub(crate) fn new(key_id: KeyId, value: BigInt) -> Self {
        Ciphertext { key_id, value }
    }

    /// Fingerprint of the public key this ciphertext was produced under.
    pub fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    /// The raw residue.
    pub fn value(&self) -> &BigInt {
        &self.value
    }

    pub(crate) fn set_value(&mut self, value: BigInt) {
        self.value = value;
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = format!("{:x}", self.value);
        if hex.len() > 16 {
            write!(f, "Ciphertext({}..)", &hex[..16])
        } else {
            write!(f, "Ciphertext({})", hex)
        }
    }
}

/// Description of the randomness used by one encryption, for audit logs.
///
/// The content is scheme specific, e.g. `p:<hex>,hs_r:<hex>,c:<hex>` for
/// [SchemaType::ZPaillier].
#[derive(Clone, Default, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct AuditRecord(String);

impl AuditRecord {

    /// Wrap an audit string.
    pub fn new(record: String) -> Self {
        AuditRecord(record)
    }

    /// The audit string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
