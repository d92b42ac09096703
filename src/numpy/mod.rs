//! Numpy-like arrays of plaintexts and ciphertexts.
//!
//! [DenseMatrix] holds up to two dimensions of any element type. Index
//! resolution ([SliceKey] into flat offsets) does not depend on the element
//! type, so slicing works the same for [Plaintext](crate::Plaintext) and
//! [Ciphertext](crate::Ciphertext) arrays. The evaluator gains elementwise
//! operations, [Evaluator::matmul](crate::Evaluator::matmul) and
//! [Evaluator::sum](crate::Evaluator::sum) on arrays.

mod evaluate;
mod index;
mod matrix;
pub mod random;
mod shape;

pub use index::{AxisIndex, SliceKey};
pub use matrix::{ArrayLike, DenseMatrix};
pub use shape::Shape;
