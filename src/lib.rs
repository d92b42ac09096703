//! Partially homomorphic encryption toolkit.
//!
//! Provides additively homomorphic schemes (Paillier, Okamoto–Uchiyama,
//! Damgård–Jurik and a cleartext mock) behind one set of role objects:
//! [KeyGenerator], [Encryptor], [Decryptor] and [Evaluator] share a
//! [HeContext] built around a [PublicKey]. Encoders map integers, reals,
//! big integers and packed pairs onto [Plaintext]s, and [DenseMatrix]
//! carries the same operations over numpy-like arrays.
//!
//! The quickest way in is a kit:
//! ```rust
//! use hekit::*;
//! let kit = HeKit::new(KitParameters::new(SchemaType::Mock)).unwrap();
//! let x = kit.encryptor().encrypt_array(&kit.array(vec![vec![1, 2], vec![3, 4]]).unwrap()).unwrap();
//! let w = kit.array(vec![vec![4, 5], vec![6, 7]]).unwrap();
//! let y = kit.evaluator().matmul(&x, &w).unwrap();
//! let y = kit.decryptor().decrypt_array(&y).unwrap();
//! assert_eq!(y.to_string(), "[[16 19]\n [36 43]]");
//! ```
//!
//! An evaluating party that must not decrypt uses [PublicKit] built from
//! the serialized public key alone.

#![warn(missing_docs)]

mod batch_encoder;
mod bigint;
mod context;
mod encoder;
mod encryptor;
mod error;
mod evaluator;
mod key;
mod kit;
pub mod numpy;
mod schema;
pub mod scheme;
mod serialize;
mod serialize_serde;
mod text;
pub mod util;

pub use batch_encoder::BatchEncoder;
pub use bigint::{BigSignedInteger, Endian};
pub use context::HeContext;
pub use encoder::{BigintEncoder, FloatEncoder, IntegerEncoder, PlainEncoder};
pub use encryptor::{Decryptor, Encryptor};
pub use error::{HeError, Result};
pub use evaluator::{Evaluate, EvaluateInplace, Evaluator, Negate};
pub use key::{KeyGenerator, KeyId, PublicKey, SecretKey};
pub use kit::{HeKit, KitBase, KitParameters, PublicKit};
pub use numpy::{random, ArrayLike, AxisIndex, DenseMatrix, Shape, SliceKey};
pub use schema::SchemaType;
pub use serialize::Serializable;
pub use text::{AuditRecord, Ciphertext, Plaintext};
