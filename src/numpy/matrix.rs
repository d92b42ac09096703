use std::fmt;

use itertools::Itertools;
use rayon::prelude::*;

use crate::{HeError, Plaintext, PlainEncoder, Result};

use super::index::{self, SliceKey};
use super::Shape;

/// Dense array of up to two dimensions, stored row-major.
///
/// - A 0-D (scalar) array has `rows == cols == 1`.
/// - A 1-D array of length `n` has `rows == n` and `cols == 1`.
/// - A 2-D array has `rows * cols` elements.
///
/// The element type is usually [Plaintext](crate::Plaintext) or
/// [Ciphertext](crate::Ciphertext); indexing, slicing and layout
/// operations do not depend on it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DenseMatrix<T> {
    ndim: usize,
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

/// Nested values to build an array from.
#[derive(Clone, PartialEq, Debug)]
pub enum ArrayLike<V> {
    /// 0-D.
    Scalar(V),
    /// 1-D.
    Vector(Vec<V>),
    /// 2-D, must not be ragged.
    Matrix(Vec<Vec<V>>),
}

impl<V> From<Vec<V>> for ArrayLike<V> {
    fn from(values: Vec<V>) -> Self {
        ArrayLike::Vector(values)
    }
}

impl<V> From<Vec<Vec<V>>> for ArrayLike<V> {
    fn from(values: Vec<Vec<V>>) -> Self {
        ArrayLike::Matrix(values)
    }
}

impl<T> DenseMatrix<T> {

    pub(crate) fn from_raw(shape: &Shape, data: Vec<T>) -> Result<Self> {
        let (ndim, rows, cols) = match shape.dims() {
            [] => (0, 1, 1),
            [n] => (1, *n, 1),
            [r, c] => (2, *r, *c),
            _ => return Err(HeError::Shape(format!("arrays have at most 2 dimensions, got shape {}", shape))),
        };
        if data.len() != rows * cols {
            return Err(HeError::Shape(format!("{} elements cannot fill shape {}", data.len(), shape)));
        }
        Ok(DenseMatrix { ndim, rows, cols, data })
    }

    /// 0-D array.
    pub fn new_scalar(value: T) -> Self {
        DenseMatrix { ndim: 0, rows: 1, cols: 1, data: vec![value] }
    }

    /// 1-D array.
    pub fn from_vec(values: Vec<T>) -> Self {
        DenseMatrix { ndim: 1, rows: values.len(), cols: 1, data: values }
    }

    /// 2-D array from rows of equal length, [HeError::Shape] otherwise.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let cols = rows.first().map(|row| row.len()).unwrap_or(0);
        if let Some(row) = rows.iter().find(|row| row.len() != cols) {
            return Err(HeError::Shape(format!(
                "irregular nesting: expected rows of length {}, found {}", cols, row.len()
            )));
        }
        let count = rows.len();
        Ok(DenseMatrix { ndim: 2, rows: count, cols, data: rows.into_iter().flatten().collect() })
    }

    /// Array of the given shape (at most two dimensions) with `f(row, col)`
    /// at each position; 1-D arrays call `f(i, 0)`.
    pub fn from_shape_fn<F: FnMut(usize, usize) -> T>(shape: &[usize], mut f: F) -> Result<Self> {
        let shape = Shape::from(shape);
        let (rows, cols) = match shape.dims() {
            [] => (1, 1),
            [n] => (*n, 1),
            [r, c] => (*r, *c),
            _ => (0, 0),
        };
        let data = (0..rows).cartesian_product(0..cols).map(|(r, c)| f(r, c)).collect();
        Self::from_raw(&shape, data)
    }

    /// Array from nested values.
    pub fn from_array_like(values: ArrayLike<T>) -> Result<Self> {
        match values {
            ArrayLike::Scalar(value) => Ok(Self::new_scalar(value)),
            ArrayLike::Vector(values) => Ok(Self::from_vec(values)),
            ArrayLike::Matrix(rows) => Self::from_rows(rows),
        }
    }

    /// The shape: `()`, `(n,)` or `(rows, cols)`.
    pub fn shape(&self) -> Shape {
        match self.ndim {
            0 => Shape::default(),
            1 => Shape::new(vec![self.rows]),
            _ => Shape::new(vec![self.rows, self.cols]),
        }
    }

    /// Number of dimensions, 0 to 2.
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Elements in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Take the elements in row-major order.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Element at `(row, col)`; 1-D arrays use `col == 0`.
    pub fn get(&self, row: usize, col: usize) -> Result<&T> {
        if row >= self.rows || col >= self.cols {
            return Err(HeError::Shape(format!("index ({}, {}) is out of bounds for shape {}", row, col, self.shape())));
        }
        Ok(&self.data[row * self.cols + col])
    }

    /// The single element of a 0-D array.
    pub fn scalar(&self) -> Result<&T> {
        if self.ndim != 0 {
            return Err(HeError::Shape(format!("array of shape {} is not a scalar", self.shape())));
        }
        Ok(&self.data[0])
    }

    /// Iterate the elements in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Apply `f` to every element.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> DenseMatrix<U> {
        DenseMatrix { ndim: self.ndim, rows: self.rows, cols: self.cols, data: self.data.iter().map(f).collect() }
    }

    /// Apply a fallible `f` to every element in parallel.
    pub fn par_try_map<U, F>(&self, f: F) -> Result<DenseMatrix<U>>
    where T: Sync, U: Send, F: Fn(&T) -> Result<U> + Sync + Send
    {
        let data = self.data.par_iter().map(f).collect::<Result<Vec<U>>>()?;
        Ok(DenseMatrix { ndim: self.ndim, rows: self.rows, cols: self.cols, data })
    }

    /// Same layout, new elements.
    pub(crate) fn with_data<U>(&self, data: Vec<U>) -> DenseMatrix<U> {
        debug_assert_eq!(data.len(), self.data.len());
        DenseMatrix { ndim: self.ndim, rows: self.rows, cols: self.cols, data }
    }

    /// Swap rows and columns of a 2-D array.
    /// Fails with [HeError::UnsupportedOperation] on 0-D and 1-D arrays.
    pub fn transpose(&self) -> Result<Self> where T: Clone {
        if self.ndim != 2 {
            return Err(HeError::UnsupportedOperation(format!(
                "transpose needs a 2-D array, got shape {}", self.shape()
            )));
        }
        let data = (0..self.cols).cartesian_product(0..self.rows)
            .map(|(c, r)| self.data[r * self.cols + c].clone())
            .collect();
        Ok(DenseMatrix { ndim: 2, rows: self.cols, cols: self.rows, data })
    }

    /// Same elements in a new shape with the same element count.
    pub fn reshape(self, shape: &[usize]) -> Result<Self> {
        let shape = Shape::from(shape);
        if shape.numel() != self.data.len() {
            return Err(HeError::Shape(format!(
                "cannot reshape array of size {} into shape {}", self.data.len(), shape
            )));
        }
        Self::from_raw(&shape, self.data)
    }

    /// Read a selection, like numpy's `arr[key]`.
    ///
    /// Integer axes are removed from the result; indexing every axis with an
    /// integer yields a 0-D array. Two list axes select the sub-matrix of
    /// the listed rows and columns.
    pub fn get_item(&self, key: impl Into<SliceKey>) -> Result<Self> where T: Clone {
        let selection = index::resolve(&key.into(), &self.shape())?;
        let data = selection.offsets.iter().map(|&i| self.data[i].clone()).collect();
        Self::from_raw(&selection.shape, data)
    }

    /// Write a selection, like numpy's `arr[key] = patch`.
    ///
    /// The patch is broadcast to the shape of the selection with numpy's
    /// rules: dimensions are aligned from the right and each must either
    /// match or be 1. Anything else fails with [HeError::Broadcast].
    pub fn set_item(&mut self, key: impl Into<SliceKey>, patch: &DenseMatrix<T>) -> Result<()> where T: Clone {
        let selection = index::resolve(&key.into(), &self.shape())?;
        let target = selection.shape.dims();
        let source = patch.shape();
        let source = source.dims();
        let incompatible = || HeError::Broadcast(format!(
            "could not broadcast input array from shape {} into shape {}", patch.shape(), selection.shape
        ));
        if source.len() > target.len() && source[..source.len() - target.len()].iter().any(|&d| d != 1) {
            return Err(incompatible());
        }
        // patch dimensions aligned to the target, 1 where missing
        let aligned: Vec<usize> = (0..target.len()).map(|i| {
            let offset = target.len() - i;
            if offset <= source.len() { source[source.len() - offset] } else { 1 }
        }).collect();
        if aligned.iter().zip(target).any(|(&s, &t)| s != t && s != 1) {
            return Err(incompatible());
        }
        let (target_cols, aligned_cols) = match target.len() {
            2 => (target[1], aligned[1]),
            _ => (1, 1),
        };
        let aligned_rows = aligned.first().copied().unwrap_or(1);
        for (k, &offset) in selection.offsets.iter().enumerate() {
            let (r, c) = (k / target_cols, k % target_cols);
            let (r, c) = (if aligned_rows == 1 { 0 } else { r }, if aligned_cols == 1 { 0 } else { c });
            self.data[offset] = patch.data[r * aligned_cols + c].clone();
        }
        Ok(())
    }

    /// Write one value to every selected position.
    pub fn fill_item(&mut self, key: impl Into<SliceKey>, value: T) -> Result<()> where T: Clone {
        self.set_item(key, &DenseMatrix::new_scalar(value))
    }
}

impl<A, B> DenseMatrix<(A, B)> {

    /// Split an array of pairs into two arrays of the same shape.
    pub fn unzip(self) -> (DenseMatrix<A>, DenseMatrix<B>) {
        let (ndim, rows, cols) = (self.ndim, self.rows, self.cols);
        let (a, b): (Vec<A>, Vec<B>) = self.data.into_iter().unzip();
        (DenseMatrix { ndim, rows, cols, data: a }, DenseMatrix { ndim, rows, cols, data: b })
    }
}

impl DenseMatrix<Plaintext> {

    /// Encode nested values into a plaintext array.
    /// ```rust
    /// use hekit::*;
    /// let kit = HeKit::new(KitParameters::new(SchemaType::Mock)).unwrap();
    /// let encoder = kit.integer_encoder(1).unwrap();
    /// let array = DenseMatrix::encode(vec![vec![1, 2, 3], vec![4, 5, 6]], &encoder).unwrap();
    /// assert_eq!(array.to_string(), "[[1 2 3]\n [4 5 6]]");
    /// ```
    pub fn encode<V, E: PlainEncoder<V>>(values: impl Into<ArrayLike<V>>, encoder: &E) -> Result<Self> {
        let array = DenseMatrix::from_array_like(values.into())?;
        let data = array.data.into_iter().map(|v| encoder.encode(v)).collect::<Result<Vec<_>>>()?;
        Ok(DenseMatrix { ndim: array.ndim, rows: array.rows, cols: array.cols, data })
    }

    /// Decode every element, the inverse of [Self::encode].
    pub fn to_numpy<V, E: PlainEncoder<V>>(&self, encoder: &E) -> Result<DenseMatrix<V>> {
        let data = self.data.iter().map(|p| encoder.decode(p)).collect::<Result<Vec<_>>>()?;
        Ok(self.with_data(data))
    }
}

impl<T: fmt::Display> fmt::Display for DenseMatrix<T> {
    /// Same layout as numpy: `[[1 2 3]\n [4 5 6]]`, elements right-aligned.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self.data.iter().map(|x| x.to_string()).collect();
        let width = cells.iter().map(|s| s.len()).max().unwrap_or(0);
        let row = |cells: &[String]| format!("[{}]", cells.iter().map(|s| format!("{:>width$}", s, width = width)).join(" "));
        match self.ndim {
            0 => write!(f, "{}", cells[0]),
            1 => write!(f, "{}", row(&cells)),
            _ if self.cols == 0 => write!(f, "[{}]", (0..self.rows).map(|_| "[]").join("\n ")),
            _ => write!(f, "[{}]", cells.chunks(self.cols).map(row).join("\n ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numpy::AxisIndex;

    fn arange(rows: usize, cols: usize) -> DenseMatrix<i64> {
        DenseMatrix::from_shape_fn(&[rows, cols], |r, c| (r * cols + c) as i64).unwrap()
    }

    #[test]
    fn test_construction() {
        let m = DenseMatrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(m.shape(), Shape::new(vec![2, 3]));
        assert_eq!(*m.get(1, 2).unwrap(), 6);
        assert!(m.get(2, 0).is_err());
        assert!(m.scalar().is_err());
        assert!(matches!(DenseMatrix::from_rows(vec![vec![1, 2], vec![3]]), Err(HeError::Shape(_))));

        let v = DenseMatrix::from_vec(vec![1, 2, 3]);
        assert_eq!((v.ndim(), v.rows(), v.cols()), (1, 3, 1));
        let s = DenseMatrix::new_scalar(9);
        assert_eq!(*s.scalar().unwrap(), 9);
        assert_eq!(s.shape(), Shape::default());
        assert!(DenseMatrix::from_shape_fn(&[1, 2, 3], |_, _| 0).is_err());
        let m = DenseMatrix::from_array_like(ArrayLike::<i32>::from(vec![vec![1, 2], vec![3, 4]])).unwrap();
        assert_eq!(m.ndim(), 2);
    }

    #[test]
    fn test_display() {
        let m = DenseMatrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(m.to_string(), "[[1 2 3]\n [4 5 6]]");
        assert_eq!(DenseMatrix::from_vec(vec![-1, 20]).to_string(), "[-1 20]");
        assert_eq!(DenseMatrix::new_scalar(7).to_string(), "7");
        assert_eq!(arange(2, 6).to_string(), "[[ 0  1  2  3  4  5]\n [ 6  7  8  9 10 11]]");
    }

    #[test]
    fn test_transpose_reshape() {
        let m = arange(2, 3);
        let t = m.transpose().unwrap();
        assert_eq!(t, DenseMatrix::from_rows(vec![vec![0, 3], vec![1, 4], vec![2, 5]]).unwrap());
        assert!(matches!(DenseMatrix::from_vec(vec![1]).transpose(), Err(HeError::UnsupportedOperation(_))));
        let v = m.clone().reshape(&[6]).unwrap();
        assert_eq!(v.data(), &[0, 1, 2, 3, 4, 5]);
        assert!(matches!(m.reshape(&[4]), Err(HeError::Shape(_))));
    }

    #[test]
    fn test_get_item() {
        let a = arange(7, 7);
        assert_eq!(a.get_item(3i64).unwrap().data(), &[21, 22, 23, 24, 25, 26, 27]);
        assert_eq!(*a.get_item((3i64, -1i64)).unwrap().scalar().unwrap(), 27);
        let sub = a.get_item((1i64..5, vec![0i64, 1, 5, 6])).unwrap();
        assert_eq!(sub, DenseMatrix::from_rows(vec![
            vec![7, 8, 12, 13], vec![14, 15, 19, 20], vec![21, 22, 26, 27], vec![28, 29, 33, 34],
        ]).unwrap());
        let col = a.get_item((.., 2i64)).unwrap();
        assert_eq!(col.shape(), Shape::new(vec![7]));
        assert_eq!(col.data(), &[2, 9, 16, 23, 30, 37, 44]);
        let rev = a.get_item((AxisIndex::slice(None, None, Some(-3)), AxisIndex::slice(Some(-2), None, None))).unwrap();
        assert_eq!(rev, DenseMatrix::from_rows(vec![vec![47, 48], vec![26, 27], vec![5, 6]]).unwrap());
        let rows = a.get_item(vec![6i64, 0]).unwrap();
        assert_eq!(rows.shape(), Shape::new(vec![2, 7]));
        assert_eq!(*rows.get(1, 6).unwrap(), 6);
        assert!(matches!(a.get_item((7i64, 0i64)), Err(HeError::Shape(_))));

        let v = DenseMatrix::from_vec((0..10).collect::<Vec<i64>>());
        assert_eq!(v.get_item(AxisIndex::slice(Some(1), None, Some(3))).unwrap().data(), &[1, 4, 7]);
        assert_eq!(*v.get_item(-1i64).unwrap().scalar().unwrap(), 9);
    }

    #[test]
    fn test_set_item() {
        // numpy: a = np.arange(49).reshape(7, 7); a[1:5, [0, 1, 5, 6]] = patch
        let mut a = arange(7, 7);
        let patch = DenseMatrix::from_shape_fn(&[4, 4], |r, c| -((r * 4 + c) as i64) - 1).unwrap();
        a.set_item((1i64..5, vec![0i64, 1, 5, 6]), &patch).unwrap();
        assert_eq!(a.get_item(1i64).unwrap().data(), &[-1, -2, 9, 10, 11, -3, -4]);
        assert_eq!(a.get_item(4i64).unwrap().data(), &[-13, -14, 30, 31, 32, -15, -16]);
        assert_eq!(a.get_item(0i64).unwrap().data(), &[0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(a.get_item(5i64).unwrap().data(), &[35, 36, 37, 38, 39, 40, 41]);

        // scalar broadcast
        let mut a = arange(7, 7);
        a.fill_item((.., 0i64), 100).unwrap();
        assert_eq!(a.get_item((.., 0i64)).unwrap().data(), &[100; 7]);
        assert_eq!(*a.get(0, 1).unwrap(), 1);

        // a row broadcast over several rows
        let mut a = arange(7, 7);
        let row = DenseMatrix::from_vec(vec![-1, -2, -3]);
        a.set_item((2i64..4, 1i64..4), &row).unwrap();
        assert_eq!(a.get_item((2i64..4, 1i64..4)).unwrap(), DenseMatrix::from_rows(vec![vec![-1, -2, -3], vec![-1, -2, -3]]).unwrap());

        // a column broadcast over several columns
        let mut a = arange(3, 3);
        let column = DenseMatrix::from_rows(vec![vec![7], vec![8], vec![9]]).unwrap();
        a.set_item((.., 1i64..), &column).unwrap();
        assert_eq!(a, DenseMatrix::from_rows(vec![vec![0, 7, 7], vec![3, 8, 8], vec![6, 9, 9]]).unwrap());

        // leading unit dimensions are dropped
        let mut a = arange(3, 3);
        let patch = DenseMatrix::from_rows(vec![vec![-5, -6, -7]]).unwrap();
        a.set_item(0i64, &patch).unwrap();
        assert_eq!(a.get_item(0i64).unwrap().data(), &[-5, -6, -7]);

        let mut a = arange(7, 7);
        let bad = DenseMatrix::from_vec(vec![1, 2, 3]);
        assert!(matches!(a.set_item((1i64..5, vec![0i64, 1, 5, 6]), &bad), Err(HeError::Broadcast(_))));
        let bad = DenseMatrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        assert!(matches!(a.set_item(0i64, &bad), Err(HeError::Broadcast(_))));
    }

    #[test]
    fn test_unzip_and_map() {
        let pairs = DenseMatrix::from_vec(vec![(1, 'a'), (2, 'b')]);
        let (numbers, letters) = pairs.unzip();
        assert_eq!(numbers.data(), &[1, 2]);
        assert_eq!(letters.data(), &['a', 'b']);
        assert_eq!(numbers.map(|x| x * 10).data(), &[10, 20]);
        let doubled = numbers.par_try_map(|x| Ok(x * 2)).unwrap();
        assert_eq!(doubled.data(), &[2, 4]);
    }
}
