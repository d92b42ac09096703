//! Evaluator operations on arrays.
//!
//! Elementwise operations require identical shapes and run over the
//! elements with rayon. `matmul` and `sum` reduce with the scalar
//! operations, so they work for plaintext, ciphertext and mixed operands.

use rayon::prelude::*;

use crate::{Evaluate, EvaluateInplace, Evaluator, HeError, Negate, Result};

use super::{index, DenseMatrix, Shape, SliceKey};

/// Element type of `L op R`.
type Product<L, R> = <Evaluator as Evaluate<L, R>>::Output;

fn check_same_shape<L, R>(a: &DenseMatrix<L>, b: &DenseMatrix<R>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(HeError::Shape(format!(
            "operands could not be combined with shapes {} {}", a.shape(), b.shape()
        )));
    }
    Ok(())
}

fn zip_with<L, R, U, F>(a: &DenseMatrix<L>, b: &DenseMatrix<R>, f: F) -> Result<DenseMatrix<U>>
where L: Sync, R: Sync, U: Send, F: Fn(&L, &R) -> Result<U> + Sync + Send
{
    check_same_shape(a, b)?;
    let data = a.data().par_iter().zip(b.data().par_iter())
        .map(|(x, y)| f(x, y))
        .collect::<Result<Vec<U>>>()?;
    Ok(a.with_data(data))
}

impl<L, R, O> Evaluate<DenseMatrix<L>, DenseMatrix<R>> for Evaluator
where Evaluator: Evaluate<L, R, Output = O>, L: Sync, R: Sync, O: Send
{
    type Output = DenseMatrix<O>;

    fn add(&self, a: &DenseMatrix<L>, b: &DenseMatrix<R>) -> Result<DenseMatrix<O>> {
        zip_with(a, b, |x, y| Evaluate::<L, R>::add(self, x, y))
    }

    fn sub(&self, a: &DenseMatrix<L>, b: &DenseMatrix<R>) -> Result<DenseMatrix<O>> {
        zip_with(a, b, |x, y| Evaluate::<L, R>::sub(self, x, y))
    }

    fn mul(&self, a: &DenseMatrix<L>, b: &DenseMatrix<R>) -> Result<DenseMatrix<O>> {
        zip_with(a, b, |x, y| Evaluate::<L, R>::mul(self, x, y))
    }
}

impl<L, R> EvaluateInplace<DenseMatrix<L>, DenseMatrix<R>> for Evaluator
where Evaluator: EvaluateInplace<L, R>, L: Send, R: Sync
{
    fn add_inplace(&self, a: &mut DenseMatrix<L>, b: &DenseMatrix<R>) -> Result<()> {
        check_same_shape(a, b)?;
        a.data_mut().par_iter_mut().zip(b.data().par_iter())
            .try_for_each(|(x, y)| EvaluateInplace::<L, R>::add_inplace(self, x, y))
    }

    fn sub_inplace(&self, a: &mut DenseMatrix<L>, b: &DenseMatrix<R>) -> Result<()> {
        check_same_shape(a, b)?;
        a.data_mut().par_iter_mut().zip(b.data().par_iter())
            .try_for_each(|(x, y)| EvaluateInplace::<L, R>::sub_inplace(self, x, y))
    }

    fn mul_inplace(&self, a: &mut DenseMatrix<L>, b: &DenseMatrix<R>) -> Result<()> {
        check_same_shape(a, b)?;
        a.data_mut().par_iter_mut().zip(b.data().par_iter())
            .try_for_each(|(x, y)| EvaluateInplace::<L, R>::mul_inplace(self, x, y))
    }
}

impl<T> Negate<DenseMatrix<T>> for Evaluator
where Evaluator: Negate<T>, T: Send + Sync
{
    fn negate(&self, a: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        a.par_try_map(|x| Negate::<T>::negate(self, x))
    }

    fn negate_inplace(&self, a: &mut DenseMatrix<T>) -> Result<()> {
        a.data_mut().par_iter_mut().try_for_each(|x| Negate::<T>::negate_inplace(self, x))
    }
}

impl Evaluator {

    /// Matrix product with numpy's rules for 1-D operands: a 1-D left
    /// operand is a row vector and a 1-D right operand a column vector, and
    /// the added dimension is removed from the result. Two 1-D operands give
    /// their dot product as a 0-D array.
    ///
    /// Each output cell is the first product plus the remaining products
    /// accumulated in place. Cells are computed in parallel.
    ///
    /// Fails with [HeError::Shape] on 0-D operands, mismatched inner
    /// dimensions or an empty inner dimension.
    pub fn matmul<L, R>(&self, a: &DenseMatrix<L>, b: &DenseMatrix<R>) -> Result<DenseMatrix<Product<L, R>>>
    where
        Evaluator: Evaluate<L, R> + EvaluateInplace<Product<L, R>, Product<L, R>>,
        Product<L, R>: Send,
        L: Sync,
        R: Sync,
    {
        if a.ndim() == 0 || b.ndim() == 0 {
            return Err(HeError::Shape("matmul: input operand does not have enough dimensions".into()));
        }
        let (m, k) = if a.ndim() == 1 { (1, a.rows()) } else { (a.rows(), a.cols()) };
        let (k2, n) = (b.rows(), if b.ndim() == 1 { 1 } else { b.cols() });
        if k != k2 {
            return Err(HeError::Shape(format!(
                "matmul: mismatch in core dimension, {} is different from {} (shapes {} and {})",
                k, k2, a.shape(), b.shape()
            )));
        }
        if k == 0 {
            return Err(HeError::Shape("matmul: empty core dimension".into()));
        }
        log::debug!("matmul {} @ {}", a.shape(), b.shape());
        let (lhs, rhs) = (a.data(), b.data());
        let data = (0..m * n).into_par_iter().map(|cell| {
            let (i, j) = (cell / n, cell % n);
            let mut acc = Evaluate::<L, R>::mul(self, &lhs[i * k], &rhs[j])?;
            for t in 1..k {
                let product = Evaluate::<L, R>::mul(self, &lhs[i * k + t], &rhs[t * n + j])?;
                EvaluateInplace::<Product<L, R>, Product<L, R>>::add_inplace(self, &mut acc, &product)?;
            }
            Ok(acc)
        }).collect::<Result<Vec<_>>>()?;
        let dims = match (a.ndim(), b.ndim()) {
            (1, 1) => vec![],
            (1, _) => vec![n],
            (_, 1) => vec![m],
            _ => vec![m, n],
        };
        DenseMatrix::from_raw(&Shape::new(dims), data)
    }

    /// Sum of all elements, reduced in parallel.
    /// Fails with [HeError::Shape] on an empty array.
    pub fn sum<T>(&self, a: &DenseMatrix<T>) -> Result<T>
    where Evaluator: EvaluateInplace<T, T>, T: Clone + Send + Sync
    {
        log::debug!("sum over array of shape {}", a.shape());
        a.data().par_iter()
            .map(|x| Ok::<T, HeError>(x.clone()))
            .try_reduce_with(|mut x, y| {
                EvaluateInplace::<T, T>::add_inplace(self, &mut x, &y)?;
                Ok(x)
            })
            .unwrap_or_else(|| Err(HeError::Shape("cannot sum an empty array".into())))
    }

    /// An additive zero of the element type: the first element minus itself.
    fn zero_like<T>(&self, x: &DenseMatrix<T>) -> Result<T>
    where Evaluator: EvaluateInplace<T, T>, T: Clone
    {
        let first = x.data().first()
            .ok_or_else(|| HeError::Shape("cannot sum over an empty array".into()))?;
        let mut zero = first.clone();
        EvaluateInplace::<T, T>::sub_inplace(self, &mut zero, first)?;
        Ok(zero)
    }

    /// Sum of the elements `x[key]` selects. An empty selection sums to zero.
    ///
    /// Fails with [HeError::Shape] on an empty `x` or a key that does not
    /// fit its shape.
    pub fn select_sum<T>(&self, x: &DenseMatrix<T>, key: impl Into<SliceKey>) -> Result<T>
    where Evaluator: EvaluateInplace<T, T>, T: Clone + Send + Sync
    {
        let zero = self.zero_like(x)?;
        let selection = index::resolve(&key.into(), &x.shape())?;
        let data = x.data();
        selection.offsets.par_iter()
            .map(|&i| Ok::<T, HeError>(data[i].clone()))
            .try_reduce_with(|mut acc, y| {
                EvaluateInplace::<T, T>::add_inplace(self, &mut acc, &y)?;
                Ok(acc)
            })
            .unwrap_or(Ok(zero))
    }

    /// [Evaluator::select_sum] for each key, as a 1-D array in key order.
    pub fn batch_select_sum<T>(&self, x: &DenseMatrix<T>, keys: &[SliceKey]) -> Result<DenseMatrix<T>>
    where Evaluator: EvaluateInplace<T, T>, T: Clone + Send + Sync
    {
        let sums = keys.par_iter()
            .map(|key| self.select_sum(x, key.clone()))
            .collect::<Result<Vec<T>>>()?;
        Ok(DenseMatrix::from_vec(sums))
    }

    /// Per-feature bucket sums of the rows of `x`, as used for histogram
    /// building in gradient boosting.
    ///
    /// `order_map` has one row per row of `x` and one column per feature;
    /// `order_map[i, j] == k` puts row `i` into bucket `k` of feature `j`.
    /// Only rows with `subgroup_map[i]` set contribute. Row
    /// `j * bucket_num + k` of the result holds the sum of the rows in bucket
    /// `k` of feature `j`, so the result has shape
    /// `(bucket_num * features, x.cols())`. With `cumsum` each bucket also
    /// includes all lower buckets of the same feature. Empty buckets are zero.
    ///
    /// Fails with [HeError::Shape] on an empty `x` or maps whose row counts
    /// differ from `x`, and with [HeError::InvalidArgument] on a zero
    /// `bucket_num` or a bucket index outside it.
    pub fn feature_wise_bucket_sum<T>(
        &self,
        x: &DenseMatrix<T>,
        subgroup_map: &[bool],
        order_map: &DenseMatrix<usize>,
        bucket_num: usize,
        cumsum: bool,
    ) -> Result<DenseMatrix<T>>
    where Evaluator: EvaluateInplace<T, T>, T: Clone + Send + Sync
    {
        let zero = self.zero_like(x)?;
        let (rows, cols) = (x.rows(), x.cols());
        if subgroup_map.len() != rows || order_map.rows() != rows {
            return Err(HeError::Shape(format!(
                "bucket sum: x has {} rows, subgroup map {} and order map {}",
                rows, subgroup_map.len(), order_map.rows()
            )));
        }
        if bucket_num == 0 {
            return Err(HeError::InvalidArgument("bucket sum: bucket_num must be positive".into()));
        }
        let features = order_map.cols();
        log::debug!("bucket sum of {} rows over {} features into {} buckets", rows, features, bucket_num);
        let data = x.data();
        let per_feature = (0..features).into_par_iter().map(|j| {
            let mut buckets = vec![zero.clone(); bucket_num * cols];
            for i in (0..rows).filter(|&i| subgroup_map[i]) {
                let k = *order_map.get(i, j)?;
                if k >= bucket_num {
                    return Err(HeError::InvalidArgument(format!(
                        "bucket sum: order map puts row {} of feature {} into bucket {}, but there are {} buckets",
                        i, j, k, bucket_num
                    )));
                }
                for c in 0..cols {
                    EvaluateInplace::<T, T>::add_inplace(self, &mut buckets[k * cols + c], &data[i * cols + c])?;
                }
            }
            if cumsum {
                for k in 1..bucket_num {
                    let (lower, upper) = buckets.split_at_mut(k * cols);
                    for c in 0..cols {
                        EvaluateInplace::<T, T>::add_inplace(self, &mut upper[c], &lower[(k - 1) * cols + c])?;
                    }
                }
            }
            Ok(buckets)
        }).collect::<Result<Vec<Vec<T>>>>()?;
        let data = per_feature.into_iter().flatten().collect();
        DenseMatrix::from_raw(&Shape::new(vec![bucket_num * features, cols]), data)
    }

    /// [Evaluator::feature_wise_bucket_sum] for each subgroup map, in order.
    pub fn batch_feature_wise_bucket_sum<T>(
        &self,
        x: &DenseMatrix<T>,
        subgroup_maps: &[Vec<bool>],
        order_map: &DenseMatrix<usize>,
        bucket_num: usize,
        cumsum: bool,
    ) -> Result<Vec<DenseMatrix<T>>>
    where Evaluator: EvaluateInplace<T, T>, T: Clone + Send + Sync
    {
        subgroup_maps.par_iter()
            .map(|subgroup_map| self.feature_wise_bucket_sum(x, subgroup_map, order_map, bucket_num, cumsum))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Ciphertext, Decryptor, Encryptor, HeContext, IntegerEncoder, KeyGenerator, PlainEncoder,
        Plaintext, SchemaType,
    };

    struct Suite {
        encoder: IntegerEncoder,
        encryptor: Encryptor,
        evaluator: Evaluator,
        decryptor: Decryptor,
    }

    fn suite(schema: SchemaType, key_size: usize) -> Suite {
        let keygen = KeyGenerator::new(schema, key_size).unwrap();
        let context = HeContext::new(keygen.public_key().clone());
        Suite {
            encoder: IntegerEncoder::new(context.clone(), 1).unwrap(),
            encryptor: Encryptor::new(context.clone()),
            evaluator: Evaluator::new(context.clone()),
            decryptor: Decryptor::new(context, keygen.secret_key().clone()).unwrap(),
        }
    }

    impl Suite {
        fn plain(&self, rows: Vec<Vec<i128>>) -> DenseMatrix<Plaintext> {
            DenseMatrix::encode(rows, &self.encoder).unwrap()
        }

        fn decode(&self, ciphers: &DenseMatrix<Ciphertext>) -> DenseMatrix<i128> {
            self.decryptor.decrypt_array(ciphers).unwrap().to_numpy(&self.encoder).unwrap()
        }
    }

    #[test]
    fn test_elementwise() {
        let s = suite(SchemaType::IcPaillier, 512);
        let a = s.plain(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        let b = s.plain(vec![vec![-1, 0, 7], vec![10, -20, 2]]);
        let ca = s.encryptor.encrypt_array(&a).unwrap();
        let cb = s.encryptor.encrypt_array(&b).unwrap();

        let sum = s.evaluator.add(&ca, &cb).unwrap();
        assert_eq!(s.decode(&sum), DenseMatrix::from_rows(vec![vec![0, 2, 10], vec![14, -15, 8]]).unwrap());
        let diff = s.evaluator.sub(&ca, &b).unwrap();
        assert_eq!(s.decode(&diff), DenseMatrix::from_rows(vec![vec![2, 2, -4], vec![-6, 25, 4]]).unwrap());
        let product = s.evaluator.mul(&a, &cb).unwrap();
        assert_eq!(s.decode(&product), DenseMatrix::from_rows(vec![vec![-1, 0, 21], vec![40, -100, 12]]).unwrap());
        let plain = s.evaluator.mul(&a, &b).unwrap();
        assert_eq!(plain.to_numpy(&s.encoder).unwrap().data(), &[-1, 0, 21, 40, -100, 12]);
        let negated = s.evaluator.negate(&ca).unwrap();
        assert_eq!(s.decode(&negated).data(), &[-1, -2, -3, -4, -5, -6]);
        assert!(matches!(s.evaluator.mul(&ca, &cb), Err(HeError::UnsupportedOperation(_))));

        let wrong = s.plain(vec![vec![1, 2], vec![3, 4]]);
        assert!(matches!(s.evaluator.add(&ca, &wrong), Err(HeError::Shape(_))));
    }

    #[test]
    fn test_elementwise_inplace() {
        let s = suite(SchemaType::Mock, 256);
        let a = s.plain(vec![vec![1, 2], vec![3, 4]]);
        let mut acc = s.encryptor.encrypt_array(&a).unwrap();
        s.evaluator.add_inplace(&mut acc, &a).unwrap();
        s.evaluator.mul_inplace(&mut acc, &a).unwrap();
        let ca = s.encryptor.encrypt_array(&a).unwrap();
        s.evaluator.sub_inplace(&mut acc, &ca).unwrap();
        s.evaluator.negate_inplace(&mut acc).unwrap();
        // -(2a * a - a)
        assert_eq!(s.decode(&acc).data(), &[-1, -6, -15, -28]);
        let wrong = DenseMatrix::from_vec(vec![ca.get(0, 0).unwrap().clone()]);
        assert!(matches!(s.evaluator.add_inplace(&mut acc, &wrong), Err(HeError::Shape(_))));
    }

    #[test]
    fn test_matmul_2x2() {
        let s = suite(SchemaType::ZPaillier, 512);
        let a = s.plain(vec![vec![1, 2], vec![3, 4]]);
        let b = s.plain(vec![vec![4, 5], vec![6, 7]]);
        let expected = DenseMatrix::from_rows(vec![vec![16, 19], vec![36, 43]]).unwrap();

        let plain = s.evaluator.matmul(&a, &b).unwrap();
        assert_eq!(plain.to_numpy(&s.encoder).unwrap(), expected);
        let ca = s.encryptor.encrypt_array(&a).unwrap();
        let cipher = s.evaluator.matmul(&ca, &b).unwrap();
        assert_eq!(s.decode(&cipher), expected);
        let cb = s.encryptor.encrypt_array(&b).unwrap();
        let cipher = s.evaluator.matmul(&a, &cb).unwrap();
        assert_eq!(s.decode(&cipher), expected);
    }

    #[test]
    fn test_matmul_vector_rules() {
        let s = suite(SchemaType::Mock, 256);
        let v: DenseMatrix<Plaintext> = DenseMatrix::encode((0..64).collect::<Vec<i128>>(), &s.encoder).unwrap();
        let m = DenseMatrix::from_shape_fn(&[64, 256], |_, j| s.encoder.encode(j as i128).unwrap()).unwrap();
        let cv = s.encryptor.encrypt_array(&v).unwrap();
        let result = s.evaluator.matmul(&cv, &m).unwrap();
        assert_eq!(result.shape(), Shape::new(vec![256]));
        let decoded = s.decode(&result);
        assert_eq!(*decoded.get(0, 0).unwrap(), 0);
        assert_eq!(*decoded.get(255, 0).unwrap(), 2016 * 255);

        let dot = s.evaluator.matmul(&v, &v).unwrap();
        assert_eq!(dot.ndim(), 0);
        assert_eq!(dot.to_numpy(&s.encoder).unwrap().scalar().unwrap(), &(0..64).map(|x| x * x).sum::<i128>());

        let mt = m.transpose().unwrap();
        let column = s.evaluator.matmul(&mt, &v).unwrap();
        assert_eq!(column.shape(), Shape::new(vec![256]));
        assert_eq!(column.to_numpy(&s.encoder).unwrap().get(3, 0).unwrap(), &(2016 * 3));

        assert!(matches!(s.evaluator.matmul(&m, &m), Err(HeError::Shape(_))));
        let scalar = DenseMatrix::new_scalar(s.encoder.encode(1).unwrap());
        assert!(matches!(s.evaluator.matmul(&scalar, &v), Err(HeError::Shape(_))));
        let empty: DenseMatrix<Plaintext> = DenseMatrix::from_vec(vec![]);
        assert!(matches!(s.evaluator.matmul(&empty, &empty), Err(HeError::Shape(_))));
    }

    #[test]
    fn test_sum() {
        let s = suite(SchemaType::DJ, 512);
        let values: DenseMatrix<Plaintext> = DenseMatrix::encode((1..=100).collect::<Vec<i128>>(), &s.encoder).unwrap();
        let ciphers = s.encryptor.encrypt_array(&values).unwrap();
        let total = s.evaluator.sum(&ciphers).unwrap();
        assert_eq!(s.decryptor.decrypt_raw(&total).unwrap(), 5050);
        assert_eq!(s.evaluator.sum(&values).unwrap().value().to_i128().unwrap(), 5050);
        let empty: DenseMatrix<Ciphertext> = DenseMatrix::from_vec(vec![]);
        assert!(matches!(s.evaluator.sum(&empty), Err(HeError::Shape(_))));
    }

    fn grid(rows: usize, cols: usize) -> Vec<Vec<i128>> {
        (0..rows).map(|i| (0..cols).map(|j| (i * cols + j) as i128).collect()).collect()
    }

    #[test]
    fn test_select_sum() {
        let s = suite(SchemaType::Mock, 256);
        let ciphers = s.encryptor.encrypt_array(&s.plain(grid(30, 30))).unwrap();
        let total = |key: SliceKey| s.decryptor.decrypt_raw(&s.evaluator.select_sum(&ciphers, key).unwrap()).unwrap();

        assert_eq!(total(SliceKey::from((Vec::<i64>::new(), Vec::<i64>::new()))), 0);
        assert_eq!(total(SliceKey::from((vec![0, 1], vec![0, 1]))), 1 + 30 + 31);
        assert_eq!(total(SliceKey::from((2, ..))), (60..90).sum::<i128>());
        assert_eq!(total(SliceKey::from((-1, -1))), 899);

        let column = s.plain(vec![vec![1_000_000], vec![-500], vec![500], vec![7]]);
        let picked = s.evaluator.select_sum(&column, (vec![0, 1, 2], vec![0])).unwrap();
        assert_eq!(picked.value().to_i128().unwrap(), 1_000_000);

        let empty: DenseMatrix<Ciphertext> = DenseMatrix::from_vec(vec![]);
        assert!(matches!(s.evaluator.select_sum(&empty, ..), Err(HeError::Shape(_))));
        assert!(matches!(s.evaluator.select_sum(&ciphers, (30, 0)), Err(HeError::Shape(_))));
    }

    #[test]
    fn test_batch_select_sum() {
        let s = suite(SchemaType::IcPaillier, 512);
        let ciphers = s.encryptor.encrypt_array(&s.plain(grid(4, 3))).unwrap();
        let keys = vec![
            SliceKey::from(0),
            SliceKey::from((.., 2)),
            SliceKey::from(Vec::<i64>::new()),
        ];
        let sums = s.evaluator.batch_select_sum(&ciphers, &keys).unwrap();
        assert_eq!(sums.shape(), Shape::new(vec![3]));
        let values: Vec<i128> = sums.iter().map(|c| s.decryptor.decrypt_raw(c).unwrap()).collect();
        assert_eq!(values, vec![3, 2 + 5 + 8 + 11, 0]);
    }

    #[test]
    fn test_feature_wise_bucket_sum() {
        let s = suite(SchemaType::OU, 1024);
        let ciphers = s.encryptor.encrypt_array(&s.plain(grid(5, 2))).unwrap();
        let subgroup = vec![false, false, true, true, true];
        // feature 0 buckets rows by index, feature 1 puts rows 2..5 together
        let order = DenseMatrix::from_rows(vec![
            vec![0, 0], vec![1, 0], vec![2, 1], vec![3, 1], vec![4, 1],
        ]).unwrap();

        let bins = s.evaluator.feature_wise_bucket_sum(&ciphers, &subgroup, &order, 5, false).unwrap();
        assert_eq!(bins.shape(), Shape::new(vec![10, 2]));
        let bins = s.decode(&bins);
        assert_eq!(*bins.get(2, 0).unwrap(), 4);
        assert_eq!(*bins.get(4, 1).unwrap(), 9);
        assert_eq!(*bins.get(0, 0).unwrap(), 0);
        assert_eq!(*bins.get(6, 0).unwrap(), 4 + 6 + 8);
        assert_eq!(*bins.get(6, 1).unwrap(), 5 + 7 + 9);
        assert_eq!(*bins.get(5, 0).unwrap(), 0);

        let cumulative = s.evaluator.feature_wise_bucket_sum(&ciphers, &subgroup, &order, 5, true).unwrap();
        let cumulative = s.decode(&cumulative);
        assert_eq!(*cumulative.get(1, 0).unwrap(), 0);
        assert_eq!(*cumulative.get(3, 0).unwrap(), 4 + 6);
        assert_eq!(*cumulative.get(4, 1).unwrap(), 5 + 7 + 9);
        assert_eq!(*cumulative.get(9, 0).unwrap(), 4 + 6 + 8);
    }

    #[test]
    fn test_bucket_sum_rejects_bad_maps() {
        let s = suite(SchemaType::Mock, 256);
        let x = s.plain(grid(3, 2));
        let order = DenseMatrix::from_rows(vec![vec![0], vec![1], vec![2]]).unwrap();
        let all = vec![true; 3];

        assert!(matches!(
            s.evaluator.feature_wise_bucket_sum(&x, &all[..2], &order, 3, false),
            Err(HeError::Shape(_))
        ));
        assert!(matches!(
            s.evaluator.feature_wise_bucket_sum(&x, &all, &order, 0, false),
            Err(HeError::InvalidArgument(_))
        ));
        assert!(matches!(
            s.evaluator.feature_wise_bucket_sum(&x, &all, &order, 2, false),
            Err(HeError::InvalidArgument(_))
        ));
        // rows left out of the subgroup are never looked up
        let sums = s.evaluator.feature_wise_bucket_sum(&x, &[true, true, false], &order, 2, true).unwrap();
        assert_eq!(sums.get(1, 1).unwrap().value().to_i128().unwrap(), 1 + 3);

        let maps = vec![vec![true, false, false], vec![false, true, true]];
        let batch = s.evaluator.batch_feature_wise_bucket_sum(&x, &maps, &order, 3, false).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].get(0, 0).unwrap().value().to_i128().unwrap(), 0);
        assert_eq!(batch[1].get(2, 1).unwrap().value().to_i128().unwrap(), 5);
    }
}
