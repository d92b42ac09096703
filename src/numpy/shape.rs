use std::fmt;
use std::ops::Index;
use std::slice::SliceIndex;

use itertools::Itertools;

/// Ordered list of array dimensions.
///
/// Displays like a Python tuple: `()`, `(7,)`, `(3, 4)`.
#[derive(Clone, Default, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct Shape(Vec<usize>);

impl Shape {

    /// Create a shape from its dimensions.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape(dims)
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.0.iter().product()
    }

    /// The dimensions.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// A sub-shape.
    pub fn slice<R: SliceIndex<[usize], Output = [usize]>>(&self, range: R) -> Shape {
        Shape(self.0[range].to_vec())
    }
}

impl Index<usize> for Shape {
    type Output = usize;
    fn index(&self, index: usize) -> &usize {
        &self.0[index]
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape(dims.to_vec())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.len() {
            1 => write!(f, "({},)", self.0[0]),
            _ => write!(f, "({})", self.0.iter().join(", ")),
        }
    }
}
