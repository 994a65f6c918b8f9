use super::FloatT;
use itertools::izip;
use std::iter::zip;

/// Math operations on slices of [`FloatT`](crate::algebra::FloatT) values.
pub trait VectorMath {
    type T;

    /// Copy values from `src`
    fn copy_from(&mut self, src: &Self) -> &mut Self;

    /// Set all elements to the same value
    fn set(&mut self, c: Self::T) -> &mut Self;

    /// Multiply all elements by a constant
    fn scale(&mut self, c: Self::T) -> &mut Self;

    /// Negate all elements
    fn negate(&mut self) -> &mut Self;

    /// Dot product
    fn dot(&self, y: &Self) -> Self::T;

    /// Infinity norm
    fn norm_inf(&self) -> Self::T;

    /// Maximum absolute elementwise difference (used for unit testing)
    fn norm_inf_diff(&self, b: &Self) -> Self::T;

    /// self = a*x + b*self
    fn axpby(&mut self, a: Self::T, x: &Self, b: Self::T) -> &mut Self;

    /// self = a*x + b*y
    fn waxpby(&mut self, a: Self::T, x: &Self, b: Self::T, y: &Self) -> &mut Self;
}

impl<T: FloatT> VectorMath for [T] {
    type T = T;

    fn copy_from(&mut self, src: &[T]) -> &mut Self {
        self.copy_from_slice(src);
        self
    }

    fn set(&mut self, c: T) -> &mut Self {
        for x in &mut *self {
            *x = c;
        }
        self
    }

    fn scale(&mut self, c: T) -> &mut Self {
        for x in &mut *self {
            *x *= c;
        }
        self
    }

    fn negate(&mut self) -> &mut Self {
        for x in &mut *self {
            *x = -*x;
        }
        self
    }

    fn dot(&self, y: &[T]) -> T {
        assert_eq!(self.len(), y.len());
        zip(self, y).fold(T::zero(), |acc, (&x, &y)| acc + x * y)
    }

    fn norm_inf(&self) -> T {
        let mut out = T::zero();
        for v in self.iter().map(|v| v.abs()) {
            if v.is_nan() {
                return T::nan();
            }
            out = if v > out { v } else { out };
        }
        out
    }

    fn norm_inf_diff(&self, b: &[T]) -> T {
        zip(self, b).fold(T::zero(), |acc, (x, y)| T::max(acc, T::abs(*x - *y)))
    }

    fn axpby(&mut self, a: T, x: &[T], b: T) -> &mut Self {
        assert_eq!(self.len(), x.len());
        zip(&mut *self, x).for_each(|(y, x)| *y = a * (*x) + b * (*y));
        self
    }

    fn waxpby(&mut self, a: T, x: &[T], b: T, y: &[T]) -> &mut Self {
        assert_eq!(self.len(), x.len());
        assert_eq!(self.len(), y.len());
        for (w, x, y) in izip!(&mut *self, x, y) {
            *w = a * (*x) + b * (*y);
        }
        self
    }
}

#[test]
fn test_dot_product() {
    let x = vec![1., 2., 3., 4.];
    let y = vec![4., 5., 6., 7.];
    assert_eq!(x.dot(&y), 60.);
}

#[test]
fn test_axpby() {
    let mut y = vec![1., 2., 3.];
    let x = vec![3., 2., 1.];
    y.axpby(2., &x, -1.);
    assert_eq!(y, vec![5., 2., -1.]);

    let mut w = vec![0.; 3];
    w.waxpby(1., &x, 2., &[1., 1., 1.]);
    assert_eq!(w, vec![5., 4., 3.]);
}

#[test]
fn test_norm_inf() {
    let x = vec![1., -7., 3.];
    assert_eq!(x.norm_inf(), 7.);
    assert!(vec![1., f64::NAN].norm_inf().is_nan());
}
