// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Shaped outputs and scalar-or-array parameters.
//!
//! Shapes follow the usual broadcasting rule: align trailing dimensions, a
//! dimension of length 1 stretches to match the other side, anything else
//! must be equal. All sampler entry points resolve their output shape through
//! [`Broadcast::new`] before a single value is drawn.

use crate::errors::{RandomError, Result};
use crate::utils::format_shape;

/// Dense row-major n-dimensional array.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T> NdArray<T> {
    pub fn from_shape_vec(shape: Vec<usize>, data: Vec<T>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(RandomError::ShapeMismatch {
                shapes: format!("{} holds {} values, got {}", format_shape(&shape), expected, data.len()),
            });
        }
        Ok(NdArray { shape, data })
    }

    /// Array of `shape` filled in row-major order by calling `f` once per slot.
    pub fn from_fn(shape: &[usize], mut f: impl FnMut() -> T) -> Self {
        let len: usize = shape.iter().product();
        let mut data = Vec::with_capacity(len);
        for _ in 0..len {
            data.push(f());
        }
        NdArray {
            shape: shape.to_vec(),
            data,
        }
    }

    /// Zero-dimensional array holding one value.
    pub fn scalar(value: T) -> Self {
        NdArray {
            shape: Vec::new(),
            data: vec![value],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Element at a multi-index, `None` when out of bounds.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for (&i, &dim) in index.iter().zip(&self.shape) {
            if i >= dim {
                return None;
            }
            flat = flat * dim + i;
        }
        self.data.get(flat)
    }
}

impl<T> From<Vec<T>> for NdArray<T> {
    fn from(data: Vec<T>) -> Self {
        NdArray {
            shape: vec![data.len()],
            data,
        }
    }
}

/// A distribution parameter: one value, or an array broadcast elementwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Param<T> {
    Scalar(T),
    Array(NdArray<T>),
}

impl<T: Copy> Param<T> {
    pub fn shape(&self) -> &[usize] {
        match self {
            Param::Scalar(_) => &[],
            Param::Array(a) => a.shape(),
        }
    }

    pub fn values(&self) -> &[T] {
        match self {
            Param::Scalar(v) => std::slice::from_ref(v),
            Param::Array(a) => a.as_slice(),
        }
    }

    /// Run `check` on every element, stopping at the first failure.
    pub fn validate(&self, check: impl Fn(T) -> Result<()>) -> Result<()> {
        self.values().iter().try_for_each(|&v| check(v))
    }

    fn at(&self, offset: usize) -> T {
        match self {
            Param::Scalar(v) => *v,
            Param::Array(a) => a.as_slice()[offset],
        }
    }
}

macro_rules! scalar_param {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Param<$t> {
                fn from(value: $t) -> Self {
                    Param::Scalar(value)
                }
            }
        )*
    };
}

scalar_param!(f64, i64);

impl<T> From<Vec<T>> for Param<T> {
    fn from(values: Vec<T>) -> Self {
        Param::Array(NdArray::from(values))
    }
}

impl<T: Copy> From<&[T]> for Param<T> {
    fn from(values: &[T]) -> Self {
        Param::Array(NdArray::from(values.to_vec()))
    }
}

impl<T: Copy, const N: usize> From<[T; N]> for Param<T> {
    fn from(values: [T; N]) -> Self {
        Param::Array(NdArray::from(values.to_vec()))
    }
}

impl<T> From<NdArray<T>> for Param<T> {
    fn from(values: NdArray<T>) -> Self {
        Param::Array(values)
    }
}

/// Number of elements in `shape`, or `ShapeMismatch` when it does not fit in `usize`.
pub fn checked_len(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| RandomError::ShapeMismatch {
            shapes: format!("{} has too many elements", format_shape(shape)),
        })
}

/// Broadcast any number of shapes against each other.
pub fn broadcast_shapes(shapes: &[&[usize]]) -> Result<Vec<usize>> {
    let ndim = shapes.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut out = vec![1usize; ndim];
    for shape in shapes {
        let lead = ndim - shape.len();
        for (d, &dim) in shape.iter().enumerate() {
            let slot = &mut out[lead + d];
            if *slot == 1 {
                *slot = dim;
            } else if dim != 1 && dim != *slot {
                return Err(mismatch(shapes));
            }
        }
    }
    Ok(out)
}

fn mismatch(shapes: &[&[usize]]) -> RandomError {
    let listed: Vec<String> = shapes.iter().map(|s| format_shape(s)).collect();
    RandomError::ShapeMismatch {
        shapes: listed.join(", "),
    }
}

/// Output shape plus, for every parameter, the stride of each output
/// dimension into that parameter's data (0 where the parameter is stretched).
#[derive(Debug, Clone)]
pub struct Broadcast {
    shape: Vec<usize>,
    strides: Vec<Vec<usize>>,
}

impl Broadcast {
    /// Resolve the output shape for `params`.
    /// With `size` given, the parameters must broadcast to exactly `size`.
    pub fn new(size: Option<&[usize]>, params: &[&[usize]]) -> Result<Self> {
        let shape = match size {
            None => broadcast_shapes(params)?,
            Some(size) => {
                let mut all: Vec<&[usize]> = Vec::with_capacity(params.len() + 1);
                all.push(size);
                all.extend_from_slice(params);
                let shape = broadcast_shapes(&all)?;
                if shape != size {
                    return Err(mismatch(&all));
                }
                shape
            }
        };
        checked_len(&shape)?;
        let strides = params.iter().map(|p| strides_for(&shape, p)).collect();
        Ok(Broadcast { shape, strides })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset into parameter `param` for the output element at `flat`.
    pub fn offset(&self, param: usize, flat: usize) -> usize {
        let strides = &self.strides[param];
        let mut rem = flat;
        let mut offset = 0;
        for d in (0..self.shape.len()).rev() {
            let dim = self.shape[d];
            offset += (rem % dim) * strides[d];
            rem /= dim;
        }
        offset
    }
}

fn strides_for(out: &[usize], param: &[usize]) -> Vec<usize> {
    let lead = out.len() - param.len();
    let mut strides = vec![0usize; out.len()];
    let mut step = 1;
    for d in (0..param.len()).rev() {
        if param[d] != 1 {
            strides[lead + d] = step;
        }
        step *= param[d];
    }
    strides
}

/// Draw one output per broadcast slot from a single parameter.
pub fn map1<A: Copy, T>(
    a: &Param<A>,
    size: Option<&[usize]>,
    mut draw: impl FnMut(A) -> T,
) -> Result<NdArray<T>> {
    let b = Broadcast::new(size, &[a.shape()])?;
    let data = (0..b.len()).map(|i| draw(a.at(b.offset(0, i)))).collect();
    NdArray::from_shape_vec(b.shape, data)
}

/// Draw one output per broadcast slot from two parameters.
pub fn map2<A: Copy, B: Copy, T>(
    a: &Param<A>,
    b: &Param<B>,
    size: Option<&[usize]>,
    mut draw: impl FnMut(A, B) -> T,
) -> Result<NdArray<T>> {
    let bc = Broadcast::new(size, &[a.shape(), b.shape()])?;
    let data = (0..bc.len())
        .map(|i| draw(a.at(bc.offset(0, i)), b.at(bc.offset(1, i))))
        .collect();
    NdArray::from_shape_vec(bc.shape, data)
}

/// Draw one output per broadcast slot from three parameters.
pub fn map3<A: Copy, B: Copy, C: Copy, T>(
    a: &Param<A>,
    b: &Param<B>,
    c: &Param<C>,
    size: Option<&[usize]>,
    mut draw: impl FnMut(A, B, C) -> T,
) -> Result<NdArray<T>> {
    let bc = Broadcast::new(size, &[a.shape(), b.shape(), c.shape()])?;
    let data = (0..bc.len())
        .map(|i| {
            draw(
                a.at(bc.offset(0, i)),
                b.at(bc.offset(1, i)),
                c.at(bc.offset(2, i)),
            )
        })
        .collect();
    NdArray::from_shape_vec(bc.shape, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn shapes_broadcast_from_the_right() {
        assert_eq!(broadcast_shapes(&[&[3], &[]]).unwrap(), vec![3]);
        assert_eq!(broadcast_shapes(&[&[2, 1], &[3]]).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shapes(&[&[4, 1, 5], &[2, 1]]).unwrap(), vec![4, 2, 5]);
        assert_eq!(broadcast_shapes(&[]).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn incompatible_shapes_are_rejected() {
        let err = broadcast_shapes(&[&[3], &[2]]).unwrap_err();
        assert!(matches!(err, RandomError::ShapeMismatch { .. }));
        assert!(err.to_string().contains("(3,), (2,)"));
    }

    #[test]
    fn size_must_be_the_result() {
        assert_eq!(Broadcast::new(Some(&[2, 3]), &[&[3], &[]]).unwrap().shape(), &[2, 3]);
        // (3,) cannot grow to size (2,)
        assert!(Broadcast::new(Some(&[2]), &[&[3]]).is_err());
        // size (3,) cannot be stretched by a (2, 3) parameter
        assert!(Broadcast::new(Some(&[3]), &[&[2, 3]]).is_err());
    }

    #[test]
    fn map2_pairs_elements() {
        let a = Param::from(vec![1.0, 2.0, 3.0]);
        let b = Param::from(NdArray::from_shape_vec(vec![2, 1], vec![10.0, 20.0]).unwrap());
        let out = map2(&a, &b, None, |x, y| x + y).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(out.as_slice(), &[11.0, 12.0, 13.0, 21.0, 22.0, 23.0]);
        assert_eq!(out.get(&[1, 2]), Some(&23.0));
        assert_eq!(out.get(&[2, 0]), None);
    }

    #[test]
    fn scalars_without_size_give_zero_dim() {
        let out = map1(&Param::Scalar(4i64), None, |x| x * 2).unwrap();
        assert_eq!(out.ndim(), 0);
        assert_eq!(out.as_slice(), &[8]);
    }

    #[test]
    fn scalar_with_size_repeats() {
        let mut calls = 0;
        let out = map3(
            &Param::Scalar(1i64),
            &Param::Scalar(2i64),
            &Param::Scalar(3i64),
            Some(&[2, 2]),
            |a, b, c| {
                calls += 1;
                a + b + c
            },
        )
        .unwrap();
        assert_eq!(calls, 4);
        assert_eq!(out.into_vec(), vec![6, 6, 6, 6]);
    }

    #[test]
    fn mismatch_draws_nothing() {
        let mut calls = 0;
        let res = map2(
            &Param::from(vec![1.0, 2.0]),
            &Param::from(vec![1.0, 2.0, 3.0]),
            None,
            |_, _| calls += 1,
        );
        assert!(res.is_err());
        assert_eq!(calls, 0);
    }

    #[test]
    fn bad_data_length_is_rejected() {
        assert!(NdArray::from_shape_vec(vec![2, 2], vec![1, 2, 3]).is_err());
    }

    proptest! {
        #[test]
        fn broadcasting_against_self_is_identity(shape in proptest::collection::vec(1usize..5, 0..4)) {
            prop_assert_eq!(broadcast_shapes(&[&shape, &shape]).unwrap(), shape.clone());
            let ones = vec![1usize; shape.len()];
            prop_assert_eq!(broadcast_shapes(&[&ones, &shape]).unwrap(), shape);
        }

        #[test]
        fn offsets_stay_in_bounds(shape in proptest::collection::vec(1usize..4, 1..4)) {
            let param: Vec<usize> = shape.iter().map(|&d| if d % 2 == 0 { 1 } else { d }).collect();
            let b = Broadcast::new(None, &[&param]).unwrap();
            let n: usize = param.iter().product();
            for i in 0..b.len() {
                prop_assert!(b.offset(0, i) < n);
            }
        }
    }
}
