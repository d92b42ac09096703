//! Element-type independent index resolution.
//!
//! A [SliceKey] is first resolved against an array layout into flat
//! row-major offsets plus the shape of the selection; gathering and
//! scattering then work on those offsets for any element type.

use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};

use crate::{HeError, Result};

use super::Shape;

/// Selection along one axis.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AxisIndex {
    /// Single position, negative counts from the end. The axis is removed
    /// from the result.
    Int(i64),
    /// Python slice `start:stop:step`.
    Slice {
        /// First position, default depends on the step sign.
        start: Option<i64>,
        /// Exclusive end, default depends on the step sign.
        stop: Option<i64>,
        /// Step, default 1, never 0.
        step: Option<i64>,
    },
    /// Fancy indexing: explicit list of positions, in order.
    List(Vec<i64>),
    /// The whole axis, `:`.
    Full,
}

impl AxisIndex {

    /// Shorthand for [AxisIndex::Slice].
    pub fn slice(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        AxisIndex::Slice { start, stop, step }
    }
}

impl From<i64> for AxisIndex {
    fn from(index: i64) -> Self {
        AxisIndex::Int(index)
    }
}

impl From<Vec<i64>> for AxisIndex {
    fn from(indices: Vec<i64>) -> Self {
        AxisIndex::List(indices)
    }
}

impl From<&[i64]> for AxisIndex {
    fn from(indices: &[i64]) -> Self {
        AxisIndex::List(indices.to_vec())
    }
}

impl From<Range<i64>> for AxisIndex {
    fn from(range: Range<i64>) -> Self {
        AxisIndex::slice(Some(range.start), Some(range.end), None)
    }
}

impl From<RangeInclusive<i64>> for AxisIndex {
    fn from(range: RangeInclusive<i64>) -> Self {
        let (start, end) = range.into_inner();
        // `a..=-1` means "up to and including the last element"
        let stop = if end == -1 { None } else { Some(end + 1) };
        AxisIndex::slice(Some(start), stop, None)
    }
}

impl From<RangeFrom<i64>> for AxisIndex {
    fn from(range: RangeFrom<i64>) -> Self {
        AxisIndex::slice(Some(range.start), None, None)
    }
}

impl From<RangeTo<i64>> for AxisIndex {
    fn from(range: RangeTo<i64>) -> Self {
        AxisIndex::slice(None, Some(range.end), None)
    }
}

impl From<RangeFull> for AxisIndex {
    fn from(_: RangeFull) -> Self {
        AxisIndex::Full
    }
}

/// Index of one or two axes, e.g. `SliceKey::from((1..5, vec![0, 1, 5, 6]))`
/// for numpy's `arr[1:5, [0, 1, 5, 6]]`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SliceKey(Vec<AxisIndex>);

impl SliceKey {

    /// Key over the given axes.
    pub fn new(axes: Vec<AxisIndex>) -> Self {
        SliceKey(axes)
    }

    /// The per-axis indices.
    pub fn axes(&self) -> &[AxisIndex] {
        &self.0
    }
}

impl From<AxisIndex> for SliceKey {
    fn from(axis: AxisIndex) -> Self {
        SliceKey(vec![axis])
    }
}

macro_rules! impl_key_from_single {
    ($($t:ty),*) => {$(
        impl From<$t> for SliceKey {
            fn from(axis: $t) -> Self {
                SliceKey(vec![axis.into()])
            }
        }
    )*};
}

impl_key_from_single!(i64, Vec<i64>, Range<i64>, RangeInclusive<i64>, RangeFrom<i64>, RangeTo<i64>, RangeFull);

impl<A: Into<AxisIndex>, B: Into<AxisIndex>> From<(A, B)> for SliceKey {
    fn from((rows, cols): (A, B)) -> Self {
        SliceKey(vec![rows.into(), cols.into()])
    }
}

/// Concrete positions selected along one axis.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct ResolvedAxis {
    pub(crate) positions: Vec<usize>,
    pub(crate) squeeze: bool,
}

fn normalize(index: i64, len: usize) -> Result<usize> {
    let len_i = len as i64;
    let resolved = if index < 0 { index + len_i } else { index };
    if resolved < 0 || resolved >= len_i {
        return Err(HeError::Shape(format!("index {} is out of bounds for axis with size {}", index, len)));
    }
    Ok(resolved as usize)
}

fn slice_positions(start: Option<i64>, stop: Option<i64>, step: Option<i64>, len: usize) -> Result<Vec<usize>> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(HeError::Shape("slice step cannot be zero".into()));
    }
    let len = len as i64;
    let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
    let adjust = |bound: i64| {
        let bound = if bound < 0 { bound + len } else { bound };
        bound.clamp(lower, upper)
    };
    let start = start.map(adjust).unwrap_or(if step < 0 { upper } else { lower });
    let stop = stop.map(adjust).unwrap_or(if step < 0 { lower } else { upper });
    let mut positions = vec![];
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        positions.push(i as usize);
        i += step;
    }
    Ok(positions)
}

pub(crate) fn resolve_axis(index: &AxisIndex, len: usize) -> Result<ResolvedAxis> {
    Ok(match index {
        AxisIndex::Int(i) => ResolvedAxis { positions: vec![normalize(*i, len)?], squeeze: true },
        AxisIndex::Slice { start, stop, step } => ResolvedAxis {
            positions: slice_positions(*start, *stop, *step, len)?,
            squeeze: false,
        },
        AxisIndex::List(indices) => ResolvedAxis {
            positions: indices.iter().map(|&i| normalize(i, len)).collect::<Result<_>>()?,
            squeeze: false,
        },
        AxisIndex::Full => ResolvedAxis { positions: (0..len).collect(), squeeze: false },
    })
}

/// Flat row-major offsets of a selection and the shape of the result.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct Selection {
    pub(crate) offsets: Vec<usize>,
    pub(crate) shape: Shape,
}

/// Resolve `key` against an array of `shape` (at most two dimensions).
///
/// A one-axis key on a matrix selects rows. Integer axes are squeezed. Two
/// list axes select the outer product of rows and columns.
pub(crate) fn resolve(key: &SliceKey, shape: &Shape) -> Result<Selection> {
    let axes = key.axes();
    if axes.is_empty() {
        return Err(HeError::Shape("empty index".into()));
    }
    if axes.len() > shape.ndim() {
        return Err(HeError::Shape(format!(
            "too many indices: array is {}-dimensional, but {} were indexed", shape.ndim(), axes.len()
        )));
    }
    let rows = resolve_axis(&axes[0], shape[0])?;
    if shape.ndim() == 1 {
        let dims = if rows.squeeze { vec![] } else { vec![rows.positions.len()] };
        return Ok(Selection { offsets: rows.positions, shape: Shape::new(dims) });
    }
    let cols = match axes.get(1) {
        Some(axis) => resolve_axis(axis, shape[1])?,
        None => resolve_axis(&AxisIndex::Full, shape[1])?,
    };
    let width = shape[1];
    let offsets = rows.positions.iter()
        .flat_map(|r| cols.positions.iter().map(move |c| r * width + c))
        .collect();
    let mut dims = vec![];
    if !rows.squeeze {
        dims.push(rows.positions.len());
    }
    if !cols.squeeze {
        dims.push(cols.positions.len());
    }
    Ok(Selection { offsets, shape: Shape::new(dims) })
}
