use super::{FloatT, VectorMath};
use std::ops::{Index, IndexMut};

/// Dense matrix in column major order.
///
/// The backing storage is grow-only: [`resize`](Matrix::resize) reuses the
/// existing allocation whenever the new shape fits its capacity, which is
/// what allows the solver to honor its no-allocation resolve contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// vector of data in column major format
    pub data: Vec<T>,
}

impl<T> Matrix<T>
where
    T: FloatT,
{
    pub fn zeros(size: (usize, usize)) -> Self {
        let (m, n) = size;
        let data = vec![T::zero(); m * n];
        Self { m, n, data }
    }

    pub fn identity(n: usize) -> Self {
        let mut mat = Matrix::zeros((n, n));
        for i in 0..n {
            mat[(i, i)] = T::one();
        }
        mat
    }

    /// New matrix from a column major data slice.
    pub fn new_from_slice(size: (usize, usize), src: &[T]) -> Self {
        let (m, n) = size;
        assert!(m * n == src.len());
        Self {
            m,
            n,
            data: src.to_vec(),
        }
    }

    pub fn nrows(&self) -> usize {
        self.m
    }
    pub fn ncols(&self) -> usize {
        self.n
    }
    pub fn size(&self) -> (usize, usize) {
        (self.m, self.n)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    fn index_linear(&self, idx: (usize, usize)) -> usize {
        debug_assert!(idx.0 < self.m && idx.1 < self.n);
        idx.0 + self.m * idx.1
    }

    pub fn col_slice(&self, col: usize) -> &[T] {
        assert!(col < self.n);
        &self.data[(col * self.m)..(col + 1) * self.m]
    }

    pub fn col_slice_mut(&mut self, col: usize) -> &mut [T] {
        assert!(col < self.n);
        &mut self.data[(col * self.m)..(col + 1) * self.m]
    }

    /// Mutable views of two distinct columns.
    pub fn col_slices_mut(&mut self, col1: usize, col2: usize) -> (&mut [T], &mut [T]) {
        assert!(col1 != col2 && col1 < self.n && col2 < self.n);
        let m = self.m;
        if col1 < col2 {
            let (lo, hi) = self.data.split_at_mut(col2 * m);
            (&mut lo[(col1 * m)..(col1 + 1) * m], &mut hi[..m])
        } else {
            let (lo, hi) = self.data.split_at_mut(col1 * m);
            (&mut hi[..m], &mut lo[(col2 * m)..(col2 + 1) * m])
        }
    }

    /// Reshape in place, zeroing all entries.   Never shrinks the backing
    /// capacity, and never allocates if the new shape fits it.
    pub fn resize(&mut self, size: (usize, usize)) {
        let (m, n) = size;
        self.m = m;
        self.n = n;
        self.data.clear();
        self.data.resize(m * n, T::zero());
    }

    /// Dot product of row `row` with a vector.
    pub fn row_dot(&self, row: usize, x: &[T]) -> T {
        assert!(row < self.m && x.len() == self.n);
        let mut out = T::zero();
        for (c, &xc) in x.iter().enumerate() {
            out += self.data[row + c * self.m] * xc;
        }
        out
    }

    /// y = A*x
    pub fn mul_vec(&self, y: &mut [T], x: &[T]) {
        assert!(y.len() == self.m && x.len() == self.n);
        y.set(T::zero());
        for (c, &xc) in x.iter().enumerate() {
            y.axpby(xc, self.col_slice(c), T::one());
        }
    }

    /// Copy row `row` into `dst`.
    pub fn row_into(&self, dst: &mut [T], row: usize) {
        assert!(row < self.m && dst.len() == self.n);
        for (c, d) in dst.iter_mut().enumerate() {
            *d = self.data[row + c * self.m];
        }
    }

    pub fn is_triu(&self) -> bool {
        // check lower triangle for any nonzero entries
        for c in 0..self.ncols() {
            for r in (c + 1)..self.nrows() {
                if self[(r, c)] != T::zero() {
                    return false;
                }
            }
        }
        true
    }
}

impl<T> Index<(usize, usize)> for Matrix<T>
where
    T: FloatT,
{
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &Self::Output {
        &self.data[self.index_linear(idx)]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T>
where
    T: FloatT,
{
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut Self::Output {
        let lidx = self.index_linear(idx);
        &mut self.data[lidx]
    }
}

impl<'a, T, const R: usize, const C: usize> From<&'a [[T; C]; R]> for Matrix<T>
where
    T: FloatT,
{
    fn from(rows: &[[T; C]; R]) -> Matrix<T> {
        let mut mat = Matrix::zeros((R, C));
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                mat[(r, c)] = v;
            }
        }
        mat
    }
}

impl<T> std::fmt::Display for Matrix<T>
where
    T: FloatT,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f)?;
        for i in 0..self.nrows() {
            write!(f, "[ ")?;
            for j in 0..self.ncols() {
                write!(f, " {:?}", self[(i, j)])?;
            }
            writeln!(f, "]")?;
        }
        writeln!(f)?;
        Ok(())
    }
}
