use std::marker::PhantomData;

use serde::{Serialize, Deserialize, Deserializer, Serializer, de::{self, Visitor}, ser::{self, SerializeStruct}};
use num_bigint::BigInt;

use crate::{
    numpy::{DenseMatrix, Shape},
    BigSignedInteger, PublicKey, SecretKey, Serializable,
};

impl Serialize for BigSignedInteger {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer
    {
        serializer.serialize_bytes(&self.as_bigint().to_signed_bytes_le())
    }
}

impl<'de> Deserialize<'de> for BigSignedInteger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: Deserializer<'de>
    {
        struct BytesVisitor;
        impl<'de> Visitor<'de> for BytesVisitor {
            type Value = BigSignedInteger;
            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("little-endian two's complement bytes")
            }
            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where E: de::Error,
            {
                Ok(BigInt::from_signed_bytes_le(v).into())
            }
            fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
            where E: de::Error,
            {
                self.visit_bytes(&v)
            }
            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where A: de::SeqAccess<'de>,
            {
                let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(byte) = seq.next_element::<u8>()? {
                    bytes.push(byte);
                }
                self.visit_bytes(&bytes)
            }
        }
        deserializer.deserialize_bytes(BytesVisitor)
    }
}

/// Keys travel as their canonical bytes, so serde input is validated the
/// same way as [Serializable] input.
struct CanonicalBytesVisitor<T>(PhantomData<T>);

impl<'de, T: Serializable> Visitor<'de> for CanonicalBytesVisitor<T> {
    type Value = T;
    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("canonical key bytes")
    }
    fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
    where E: de::Error,
    {
        T::from_bytes(v).map_err(de::Error::custom)
    }
    fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
    where E: de::Error,
    {
        self.visit_bytes(&v)
    }
    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where A: de::SeqAccess<'de>,
    {
        let mut bytes = Vec::new();
        while let Some(byte) = seq.next_element::<u8>()? {
            bytes.push(byte);
        }
        self.visit_bytes(&bytes)
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer
    {
        serializer.serialize_bytes(&self.to_bytes().map_err(ser::Error::custom)?)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: Deserializer<'de>
    {
        deserializer.deserialize_bytes(CanonicalBytesVisitor(PhantomData))
    }
}

impl Serialize for SecretKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer
    {
        serializer.serialize_bytes(&self.to_bytes().map_err(ser::Error::custom)?)
    }
}

impl<'de> Deserialize<'de> for SecretKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: Deserializer<'de>
    {
        deserializer.deserialize_bytes(CanonicalBytesVisitor(PhantomData))
    }
}

impl<T: Serialize> Serialize for DenseMatrix<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer
    {
        let mut s = serializer.serialize_struct("DenseMatrix", 2)?;
        s.serialize_field("shape", &self.shape())?;
        s.serialize_field("data", self.data())?;
        s.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DenseMatrix<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: Deserializer<'de>
    {
        struct DenseMatrixVisitor<T>(PhantomData<T>);
        impl<'de, T: Deserialize<'de>> Visitor<'de> for DenseMatrixVisitor<T> {
            type Value = DenseMatrix<T>;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("struct DenseMatrix")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where A: de::SeqAccess<'de>,
            {
                let shape = seq.next_element::<Shape>()?.ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let data = seq.next_element::<Vec<T>>()?.ok_or_else(|| de::Error::invalid_length(1, &self))?;
                DenseMatrix::from_raw(&shape, data).map_err(de::Error::custom)
            }
        }
        deserializer.deserialize_struct(
            "DenseMatrix",
            &["shape", "data"],
            DenseMatrixVisitor(PhantomData),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Ciphertext, Evaluate, HeKit, KitBase, KitParameters, Plaintext, PublicKey, PublicKit,
        SchemaType, SecretKey, AuditRecord,
    };

    fn serialize<T: Serialize>(obj: &T) -> Vec<u8> {
        bincode::serialize(obj).unwrap()
    }

    fn deserialize<T: for<'a> Deserialize<'a>>(bytes: &[u8]) -> T {
        bincode::deserialize(bytes).unwrap()
    }

    #[test]
    fn test_big_signed_integer() {
        for value in [BigSignedInteger::from(0), BigSignedInteger::from(-129), BigSignedInteger::two_pow(130)] {
            let recovered: BigSignedInteger = deserialize(&serialize(&value));
            assert_eq!(recovered, value);
        }
        let plain = Plaintext::new(SchemaType::DJ, -7);
        let recovered: Plaintext = deserialize(&serialize(&plain));
        assert_eq!(recovered, plain);
    }

    #[test]
    fn test_dense_matrix() {
        let m = DenseMatrix::from_rows(vec![vec![1u32, 2, 3], vec![4, 5, 6]]).unwrap();
        let recovered: DenseMatrix<u32> = deserialize(&serialize(&m));
        assert_eq!(recovered, m);
        let s = DenseMatrix::new_scalar(AuditRecord::new("mock:1".into()));
        let recovered: DenseMatrix<AuditRecord> = deserialize(&serialize(&s));
        assert_eq!(recovered, s);

        // element count does not match the shape
        let bad = (Shape::new(vec![2, 2]), vec![1u32, 2, 3]);
        assert!(bincode::deserialize::<DenseMatrix<u32>>(&serialize(&bad)).is_err());
    }

    #[test]
    fn test_keys() {
        let kit = HeKit::new(KitParameters::new(SchemaType::OU).set_key_size(1024)).unwrap();
        let public_key: PublicKey = deserialize(&serialize(kit.public_key()));
        assert_eq!(&public_key, kit.public_key());
        let secret_key: SecretKey = deserialize(&serialize(kit.secret_key()));
        assert_eq!(&secret_key, kit.secret_key());

        // a zero-sized OU key is rejected instead of reaching the scheme
        let malformed = crate::key::encode_key(SchemaType::OU, 0, &[BigInt::from(5), BigInt::from(5), BigInt::from(5)]);
        assert!(bincode::deserialize::<PublicKey>(&serialize(&malformed)).is_err());
    }

    #[test]
    fn test_server_client() {
        let client = HeKit::new(KitParameters::new(SchemaType::IcPaillier).set_key_size(512)).unwrap();
        let public_key_bytes = serialize(client.public_key());
        let secret_key_bytes = serialize(client.secret_key());
        let x = client.encryptor().encrypt_array(&client.array(vec![3, -4, 5]).unwrap()).unwrap();
        let x_bytes = serialize(&x);

        let server = PublicKit::new(deserialize::<PublicKey>(&public_key_bytes));
        let x: DenseMatrix<Ciphertext> = deserialize(&x_bytes);
        let w = server.array(vec![2, 2, 2]).unwrap();
        let dot = server.evaluator().matmul(&x, &w).unwrap();
        let shifted = server.evaluator().add(dot.scalar().unwrap(), &server.plaintext(100).unwrap()).unwrap();
        let result_bytes = serialize(&shifted);

        let restored = HeKit::from_keys(client.public_key().clone(), deserialize::<SecretKey>(&secret_key_bytes)).unwrap();
        let result: Ciphertext = deserialize(&result_bytes);
        assert_eq!(restored.decryptor().decrypt_raw(&result).unwrap(), 108);
    }
}
