use super::{FloatT, Matrix};

/// Computes J = (L')⁻¹ for a lower triangular `L`, writing the upper
/// triangle of `J` column by column through back substitution on already
/// computed columns.   The strictly lower triangle of `J` is left untouched
/// and is expected to be zero.
///
/// When `L` is the Cholesky factor of H, the result satisfies JJ' = H⁻¹,
/// which is the metric the active-set machinery works in.
pub fn invert_cholesky_factor<T>(J: &mut Matrix<T>, L: &Matrix<T>)
where
    T: FloatT,
{
    let n = L.nrows();
    assert!(J.size() == (n, n) && L.ncols() == n);

    for i in 0..n {
        J[(i, i)] = T::one() / L[(i, i)];
        for j in (0..i).rev() {
            let mut tmp = T::zero();
            for k in (j + 1)..=i {
                tmp += L[(k, j)] * J[(k, i)];
            }
            J[(j, i)] = -tmp / L[(j, j)];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{cholesky_factorize, VectorMath};

    #[test]
    fn test_inverse_identity() {
        #[rustfmt::skip]
        let mut L = Matrix::from(
            &[[ 8., -2., 4.],
              [-2., 12., 2.],
              [ 4.,  2., 6.]]);
        let H = L.clone();
        cholesky_factorize(&mut L).unwrap();

        let mut J = Matrix::zeros((3, 3));
        invert_cholesky_factor(&mut J, &L);
        assert!(J.is_triu());

        // H * (JJ') should recover the identity
        let mut JJt = Matrix::<f64>::zeros((3, 3));
        for r in 0..3 {
            for c in 0..3 {
                for k in 0..3 {
                    JJt[(r, c)] += J[(r, k)] * J[(c, k)];
                }
            }
        }
        let mut M = Matrix::<f64>::zeros((3, 3));
        for r in 0..3 {
            for c in 0..3 {
                for k in 0..3 {
                    M[(r, c)] += H[(r, k)] * JJt[(k, c)];
                }
            }
        }
        assert!(M.data().norm_inf_diff(Matrix::identity(3).data()) < 1e-10);
    }
}
