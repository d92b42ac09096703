use std::io::{ErrorKind, Read, Write};

use num_bigint::BigInt;

use crate::{
    key::KeyId,
    numpy::{DenseMatrix, Shape},
    AuditRecord, BigSignedInteger, Ciphertext, HeError, Plaintext, PublicKey, Result, SchemaType,
    SecretKey,
};

/// Largest length prefix accepted when reading, in bytes or elements.
const MAX_LENGTH: u64 = 1 << 32;

/// Binary serialization of HE objects to and from byte streams.
///
/// Every format is little-endian and length-prefixed. Keys are written in
/// their canonical form: schema tag, key size, then each component as
/// length-prefixed two's-complement bytes. The [KeyId] of a public key is
/// the SHA-256 of exactly these bytes.
pub trait Serializable {
    /// Serialize the object into a stream.
    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize>;
    /// Deserialize the object from a stream.
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> where Self: Sized;
    /// Get the size (bytes) of the object if serialized.
    fn serialized_size(&self) -> usize;

    /// Serialize into a new buffer.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut stream = Vec::with_capacity(self.serialized_size());
        self.serialize(&mut stream)?;
        Ok(stream)
    }

    /// Deserialize from a buffer holding exactly one object.
    fn from_bytes(bytes: &[u8]) -> Result<Self> where Self: Sized {
        let mut stream = bytes;
        let value = Self::deserialize(&mut stream)?;
        if !stream.is_empty() {
            return Err(HeError::Serialization(format!("{} trailing bytes", stream.len())));
        }
        Ok(value)
    }
}

fn read_exact<R: Read>(stream: &mut R, buf: &mut [u8]) -> Result<()> {
    stream.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => HeError::Serialization("unexpected end of input".into()),
        _ => HeError::Io(e),
    })
}

fn write_all<W: Write>(stream: &mut W, bytes: &[u8]) -> Result<usize> {
    stream.write_all(bytes)?;
    Ok(bytes.len())
}

fn read_length<R: Read>(stream: &mut R) -> Result<usize> {
    let len = u64::deserialize(stream)?;
    if len > MAX_LENGTH {
        return Err(HeError::Serialization(format!("length prefix {} is too large", len)));
    }
    Ok(len as usize)
}

/// Buffers grow with the bytes actually read, never with the length prefix.
fn read_bytes<R: Read>(stream: &mut R) -> Result<Vec<u8>> {
    let len = read_length(stream)?;
    let mut bytes = Vec::new();
    stream.by_ref().take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(HeError::Serialization("unexpected end of input".into()));
    }
    Ok(bytes)
}

fn read_items<R: Read, I: Serializable>(stream: &mut R, count: u64) -> Result<Vec<I>> {
    let mut items = Vec::new();
    for _ in 0..count {
        items.push(I::deserialize(stream)?);
    }
    Ok(items)
}

impl Serializable for u8 {
    #[inline]
    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize> {
        write_all(stream, &[*self])
    }
    #[inline]
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> {
        let mut buf = [0u8; 1];
        read_exact(stream, &mut buf)?;
        Ok(buf[0])
    }
    fn serialized_size(&self) -> usize {
        std::mem::size_of::<u8>()
    }
}

impl Serializable for u64 {
    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize> {
        write_all(stream, &self.to_le_bytes())
    }
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> {
        let mut buf = [0u8; 8];
        read_exact(stream, &mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }
    fn serialized_size(&self) -> usize {
        std::mem::size_of::<u64>()
    }
}

impl Serializable for BigInt {
    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize> {
        let bytes = self.to_signed_bytes_le();
        Ok((bytes.len() as u64).serialize(stream)? + write_all(stream, &bytes)?)
    }
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> {
        Ok(BigInt::from_signed_bytes_le(&read_bytes(stream)?))
    }
    fn serialized_size(&self) -> usize {
        std::mem::size_of::<u64>() + self.to_signed_bytes_le().len()
    }
}

impl Serializable for BigSignedInteger {
    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize> {
        self.as_bigint().serialize(stream)
    }
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> {
        Ok(BigInt::deserialize(stream)?.into())
    }
    fn serialized_size(&self) -> usize {
        self.as_bigint().serialized_size()
    }
}

impl<I: Serializable> Serializable for Vec<I> {

    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize> {
        let mut bytes_written = (self.len() as u64).serialize(stream)?;
        for item in self {
            bytes_written += item.serialize(stream)?;
        }
        Ok(bytes_written)
    }

    fn deserialize<R: Read>(stream: &mut R) -> Result<Vec<I>> {
        let len = read_length(stream)?;
        read_items(stream, len as u64)
    }

    fn serialized_size(&self) -> usize {
        std::mem::size_of::<u64>() + self.iter().map(|item| item.serialized_size()).sum::<usize>()
    }
}

impl Serializable for SchemaType {
    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize> {
        u8::from(*self).serialize(stream)
    }
    fn deserialize<R: Read>(stream: &mut R) -> Result<SchemaType> {
        SchemaType::try_from(u8::deserialize(stream)?)
    }
    fn serialized_size(&self) -> usize {
        std::mem::size_of::<u8>()
    }
}

impl Serializable for KeyId {
    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize> {
        let mut bytes_written = 0;
        for word in &self.0 {
            bytes_written += word.serialize(stream)?;
        }
        Ok(bytes_written)
    }
    fn deserialize<R: Read>(stream: &mut R) -> Result<KeyId> {
        let mut id = KeyId::default();
        for word in id.0.iter_mut() {
            *word = u64::deserialize(stream)?;
        }
        Ok(id)
    }
    fn serialized_size(&self) -> usize {
        std::mem::size_of_val(&self.0)
    }
}

/// Reads the canonical key layout written by `key::encode_key`.
fn read_key<R: Read>(stream: &mut R) -> Result<(SchemaType, usize, Vec<BigInt>)> {
    let schema = SchemaType::deserialize(stream)?;
    let key_size = u64::deserialize(stream)? as usize;
    let parts = Vec::<BigInt>::deserialize(stream)?;
    Ok((schema, key_size, parts))
}

impl Serializable for PublicKey {
    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize> {
        write_all(stream, &self.canonical_bytes())
    }
    fn deserialize<R: Read>(stream: &mut R) -> Result<PublicKey> {
        let (schema, key_size, parts) = read_key(stream)?;
        PublicKey::from_parts(schema, key_size, parts)
    }
    fn serialized_size(&self) -> usize {
        self.canonical_bytes().len()
    }
}

impl Serializable for SecretKey {
    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize> {
        Ok(self.key_id().serialize(stream)? + write_all(stream, &self.canonical_bytes())?)
    }
    fn deserialize<R: Read>(stream: &mut R) -> Result<SecretKey> {
        let key_id = KeyId::deserialize(stream)?;
        let (schema, key_size, parts) = read_key(stream)?;
        SecretKey::from_parts(key_id, schema, key_size, parts)
    }
    fn serialized_size(&self) -> usize {
        self.key_id().serialized_size() + self.canonical_bytes().len()
    }
}

impl Serializable for Plaintext {
    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize> {
        Ok(self.schema().serialize(stream)? + self.value().serialize(stream)?)
    }
    fn deserialize<R: Read>(stream: &mut R) -> Result<Plaintext> {
        let schema = SchemaType::deserialize(stream)?;
        Ok(Plaintext::new(schema, BigSignedInteger::deserialize(stream)?))
    }
    fn serialized_size(&self) -> usize {
        self.schema().serialized_size() + self.value().serialized_size()
    }
}

impl Serializable for Ciphertext {
    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize> {
        Ok(self.key_id().serialize(stream)? + self.value().serialize(stream)?)
    }
    fn deserialize<R: Read>(stream: &mut R) -> Result<Ciphertext> {
        let key_id = KeyId::deserialize(stream)?;
        Ok(Ciphertext::new(key_id, BigInt::deserialize(stream)?))
    }
    fn serialized_size(&self) -> usize {
        self.key_id().serialized_size() + self.value().serialized_size()
    }
}

impl Serializable for AuditRecord {
    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize> {
        let bytes = self.as_str().as_bytes();
        Ok((bytes.len() as u64).serialize(stream)? + write_all(stream, bytes)?)
    }
    fn deserialize<R: Read>(stream: &mut R) -> Result<AuditRecord> {
        let record = String::from_utf8(read_bytes(stream)?)
            .map_err(|e| HeError::Serialization(format!("audit record is not UTF-8: {}", e)))?;
        Ok(AuditRecord::new(record))
    }
    fn serialized_size(&self) -> usize {
        std::mem::size_of::<u64>() + self.as_str().len()
    }
}

impl Serializable for Shape {
    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize> {
        let dims: Vec<u64> = self.dims().iter().map(|&d| d as u64).collect();
        dims.serialize(stream)
    }
    fn deserialize<R: Read>(stream: &mut R) -> Result<Shape> {
        let dims = Vec::<u64>::deserialize(stream)?;
        Ok(Shape::new(dims.into_iter().map(|d| d as usize).collect()))
    }
    fn serialized_size(&self) -> usize {
        std::mem::size_of::<u64>() * (1 + self.ndim())
    }
}

impl<T: Serializable> Serializable for DenseMatrix<T> {

    fn serialize<W: Write>(&self, stream: &mut W) -> Result<usize> {
        let mut bytes_written = self.shape().serialize(stream)?;
        for item in self.iter() {
            bytes_written += item.serialize(stream)?;
        }
        Ok(bytes_written)
    }

    fn deserialize<R: Read>(stream: &mut R) -> Result<DenseMatrix<T>> {
        let shape = Shape::deserialize(stream)?;
        let count = shape.dims().iter().try_fold(1u64, |acc, &d| acc.checked_mul(d as u64))
            .filter(|&count| count <= MAX_LENGTH)
            .ok_or_else(|| HeError::Serialization(format!("array shape {} is too large", shape)))?;
        let data = read_items(stream, count)?;
        DenseMatrix::from_raw(&shape, data)
            .map_err(|e| HeError::Serialization(e.to_string()))
    }

    fn serialized_size(&self) -> usize {
        self.shape().serialized_size() + self.iter().map(|item| item.serialized_size()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{key::encode_key, HeKit, KitBase, KitParameters, PublicKit, Evaluate};

    fn serialize_simple<T: Serializable>(obj: &T) -> Vec<u8> {
        let mut stream = Vec::new();
        let bytes_len = obj.serialize(&mut stream).unwrap();
        assert_eq!(bytes_len, obj.serialized_size());
        assert_eq!(stream.len(), obj.serialized_size());
        stream
    }

    fn deserialize_simple<T: Serializable>(stream: &[u8]) -> T {
        T::from_bytes(stream).unwrap()
    }

    #[test]
    fn test_primitives() {
        for value in [BigSignedInteger::from(0), BigSignedInteger::from(-1), BigSignedInteger::two_pow(200), -BigSignedInteger::two_pow(127)] {
            let bytes = serialize_simple(&value);
            assert_eq!(deserialize_simple::<BigSignedInteger>(&bytes), value);
        }
        let bytes = serialize_simple(&BigSignedInteger::from(-2));
        assert_eq!(bytes, vec![1, 0, 0, 0, 0, 0, 0, 0, 0xfe]);
        for schema in SchemaType::all() {
            assert_eq!(deserialize_simple::<SchemaType>(&serialize_simple(schema)), *schema);
        }
        assert!(matches!(SchemaType::from_bytes(&[9]), Err(HeError::UnknownSchema(_))));
        let record = AuditRecord::new("p:1f,rn:abc".into());
        assert_eq!(deserialize_simple::<AuditRecord>(&serialize_simple(&record)), record);
        let shape = Shape::new(vec![3, 7]);
        assert_eq!(deserialize_simple::<Shape>(&serialize_simple(&shape)), shape);
    }

    #[test]
    fn test_malformed_input() {
        let bytes = serialize_simple(&BigSignedInteger::from(12345));
        assert!(matches!(<BigSignedInteger as Serializable>::from_bytes(&bytes[..bytes.len() - 1]), Err(HeError::Serialization(_))));
        let mut extended = bytes.clone();
        extended.push(0);
        assert!(matches!(<BigSignedInteger as Serializable>::from_bytes(&extended), Err(HeError::Serialization(_))));
        let huge = u64::MAX.to_le_bytes();
        assert!(matches!(<BigSignedInteger as Serializable>::from_bytes(&huge), Err(HeError::Serialization(_))));
        // three dimensions
        let shape = Shape::new(vec![1, 1, 1]);
        let mut bytes = serialize_simple(&shape);
        bytes.extend(serialize_simple(&7u64));
        assert!(matches!(DenseMatrix::<u64>::from_bytes(&bytes), Err(HeError::Serialization(_))));
    }

    #[test]
    fn test_length_prefix_beyond_input() {
        // claims 4 GiB of payload but carries one byte
        let mut bytes = serialize_simple(&MAX_LENGTH);
        bytes.push(1);
        assert!(matches!(<BigSignedInteger as Serializable>::from_bytes(&bytes), Err(HeError::Serialization(_))));
        assert!(matches!(AuditRecord::from_bytes(&bytes), Err(HeError::Serialization(_))));
        assert!(matches!(Vec::<u64>::from_bytes(&bytes), Err(HeError::Serialization(_))));
        let mut bytes = serialize_simple(&Shape::new(vec![1 << 16, 1 << 16]));
        bytes.extend(serialize_simple(&7u64));
        assert!(matches!(DenseMatrix::<u64>::from_bytes(&bytes), Err(HeError::Serialization(_))));
    }

    #[test]
    fn test_malformed_keys() {
        let three = vec![BigInt::from(5); 3];
        let bytes = encode_key(SchemaType::OU, 0, &three);
        assert!(matches!(PublicKey::from_bytes(&bytes), Err(HeError::Serialization(_))));
        let bytes = encode_key(SchemaType::OU, 2048, &three);
        assert!(matches!(PublicKey::from_bytes(&bytes), Err(HeError::Serialization(_))));
        let bytes = encode_key(SchemaType::ZPaillier, 2048, &[BigInt::from(0), BigInt::from(0)]);
        assert!(matches!(PublicKey::from_bytes(&bytes), Err(HeError::Serialization(_))));
        let bytes = encode_key(SchemaType::Mock, usize::MAX, &[BigInt::from(1)]);
        assert!(matches!(PublicKey::from_bytes(&bytes), Err(HeError::Serialization(_))));

        let kit = HeKit::new(KitParameters::new(SchemaType::IcPaillier).set_key_size(512)).unwrap();
        let mut bytes = kit.secret_key().to_bytes().unwrap();
        // drop the last component
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(SecretKey::from_bytes(&bytes), Err(HeError::Serialization(_))));
    }

    #[test]
    fn test_keys() {
        for schema in SchemaType::all() {
            let kit = HeKit::new(KitParameters::new(*schema).set_key_size(schema.min_key_size())).unwrap();
            let bytes = serialize_simple(kit.public_key());
            let public_key: PublicKey = deserialize_simple(&bytes);
            assert_eq!(&public_key, kit.public_key());
            assert_eq!(public_key.key_id(), *kit.context().key_id());
            let bytes = serialize_simple(kit.secret_key());
            let secret_key: SecretKey = deserialize_simple(&bytes);
            assert_eq!(&secret_key, kit.secret_key());

            let restored = HeKit::from_keys(public_key, secret_key).unwrap();
            let cipher = kit.encryptor().encrypt_raw(-99).unwrap();
            assert_eq!(restored.decryptor().decrypt_raw(&cipher).unwrap(), -99, "{}", schema);
        }
    }

    #[test]
    fn test_server_client() {
        // client
        let client = HeKit::new(KitParameters::new(SchemaType::ZPaillier).set_key_size(512)).unwrap();
        let x = client.array(vec![vec![1, 2], vec![3, 4]]).unwrap();
        let x = client.encryptor().encrypt_array(&x).unwrap();
        let public_key_bytes = client.public_key().to_bytes().unwrap();
        let x_bytes = x.to_bytes().unwrap();
        assert_eq!(x_bytes.len(), x.serialized_size());

        // server
        let server = PublicKit::new(PublicKey::from_bytes(&public_key_bytes).unwrap());
        let x = DenseMatrix::<Ciphertext>::from_bytes(&x_bytes).unwrap();
        let w = server.array(vec![vec![10, 0], vec![0, -1]]).unwrap();
        let y = server.evaluator().matmul(&x, &w).unwrap();
        let y = server.evaluator().add(&y, &server.array(vec![vec![5, 5], vec![5, 5]]).unwrap()).unwrap();
        let y_bytes = y.to_bytes().unwrap();

        // client
        let y = DenseMatrix::<Ciphertext>::from_bytes(&y_bytes).unwrap();
        let y = client.decryptor().decrypt_array(&y).unwrap();
        assert_eq!(y, client.array(vec![vec![15, 3], vec![35, 1]]).unwrap());
    }
}
