use super::{FloatT, Matrix};
use thiserror::Error;

/// Error type returned by the dense factorization kernels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DenseFactorizationError {
    /// Matrix dimension fields and/or array lengths are incompatible
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    /// Matrix is not positive definite
    #[error("Matrix is not positive definite")]
    NotPositiveDefinite,
}

/// In-place lower triangular Cholesky factorization of a symmetric positive
/// definite matrix, reading and writing the lower triangle only.
///
/// Fails with an explicit error on a non-positive pivot rather than letting
/// a NaN propagate out of the square root.
pub fn cholesky_factorize<T>(M: &mut Matrix<T>) -> Result<(), DenseFactorizationError>
where
    T: FloatT,
{
    let n = M.nrows();
    if n == 0 || n != M.ncols() {
        return Err(DenseFactorizationError::IncompatibleDimension);
    }

    if M[(0, 0)] <= T::zero() {
        return Err(DenseFactorizationError::NotPositiveDefinite);
    }
    M[(0, 0)] = M[(0, 0)].sqrt();

    for i in 1..n {
        // normalize the tail of the previous column by its pivot
        let d = M[(i - 1, i - 1)];
        for r in i..n {
            M[(r, i - 1)] /= d;
        }

        // subtract the outer product contribution of columns 0..i
        // from the tail of column i
        for c in 0..i {
            let f = M[(i, c)];
            if f == T::zero() {
                continue;
            }
            for r in i..n {
                let v = M[(r, c)] * f;
                M[(r, i)] -= v;
            }
        }

        if M[(i, i)] <= T::zero() {
            return Err(DenseFactorizationError::NotPositiveDefinite);
        }
        M[(i, i)] = M[(i, i)].sqrt();
    }

    Ok(())
}

/// Solve LL'x = v given the lower triangular factor `L`, by forward then
/// backward substitution.
pub fn cholesky_solve<T>(x: &mut [T], L: &Matrix<T>, v: &[T])
where
    T: FloatT,
{
    let n = L.nrows();
    assert!(x.len() == n && v.len() == n);

    // Lw = v
    for i in 0..n {
        let mut sum = v[i];
        for j in 0..i {
            sum -= L[(i, j)] * x[j];
        }
        x[i] = sum / L[(i, i)];
    }

    // L'x = w
    for i in (0..n).rev() {
        let mut sum = x[i];
        for j in (i + 1)..n {
            sum -= L[(j, i)] * x[j];
        }
        x[i] = sum / L[(i, i)];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::VectorMath;

    #[test]
    fn test_cholesky() {
        #[rustfmt::skip]
        let mut S = Matrix::from(
            &[[ 8., -2., 4.],
              [-2., 12., 2.],
              [ 4.,  2., 6.]]);

        let Scopy = S.clone(); //S is corrupted after factorization

        assert!(cholesky_factorize(&mut S).is_ok());

        // reconstruct LL' over the lower triangle and compare
        let n = 3;
        let mut M = Matrix::<f64>::zeros((n, n));
        for r in 0..n {
            for c in 0..n {
                for k in 0..=r.min(c) {
                    M[(r, c)] += S[(r, k)] * S[(c, k)];
                }
            }
        }
        assert!(M.data().norm_inf_diff(Scopy.data()) < 1e-8);
    }

    #[test]
    fn test_cholesky_solve() {
        #[rustfmt::skip]
        let mut S = Matrix::from(
            &[[ 8., -2., 4.],
              [-2., 12., 2.],
              [ 4.,  2., 6.]]);
        let Scopy = S.clone();

        cholesky_factorize(&mut S).unwrap();

        let v = vec![1., -2., 3.];
        let mut x = vec![0.; 3];
        cholesky_solve(&mut x, &S, &v);

        let mut r = vec![0.; 3];
        for i in 0..3 {
            r[i] = Scopy.row_dot(i, &x);
        }
        assert!(r.norm_inf_diff(&v) < 1e-10);
    }

    #[test]
    fn test_cholesky_not_positive_definite() {
        // zero on the diagonal
        let mut S = Matrix::from(&[[1., 0.], [0., 0.]]);
        assert_eq!(
            cholesky_factorize(&mut S),
            Err(DenseFactorizationError::NotPositiveDefinite)
        );

        let mut S = Matrix::from(&[[1., 2.], [2., 1.]]);
        assert_eq!(
            cholesky_factorize(&mut S),
            Err(DenseFactorizationError::NotPositiveDefinite)
        );
    }
}
