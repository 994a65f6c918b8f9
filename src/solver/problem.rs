use super::SolverError;
use crate::algebra::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which factor form a [`Hessian`] artifact currently holds.
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HessianKind {
    /// Raw symmetric Hessian; only the lower triangle is read
    LowerTriangular,
    /// Lower triangular L with H = LL'
    CholeskyFactor,
    /// Upper triangular U = L⁻ᵀ with UU' = H⁻¹
    InvertedCholeskyFactor,
}

/// The Hessian together with a tag describing which factor form it holds.
///
/// The solver factorizes in place and re-tags the artifact, so that a
/// second solve with an unchanged Hessian starts from the factor form the
/// first one produced and skips refactorization.   This makes the
/// warm-start cache an explicit value rather than a silent overwrite of a
/// raw input matrix.
#[derive(Debug, Clone)]
pub struct Hessian<T = f64> {
    matrix: Matrix<T>,
    kind: HessianKind,
}

impl<T> Hessian<T>
where
    T: FloatT,
{
    /// Wrap a raw symmetric Hessian; only its lower triangle is read.
    pub fn lower_triangular(matrix: Matrix<T>) -> Self {
        Self {
            matrix,
            kind: HessianKind::LowerTriangular,
        }
    }

    /// Wrap a precomputed lower Cholesky factor of the Hessian.
    pub fn cholesky_factor(matrix: Matrix<T>) -> Self {
        Self {
            matrix,
            kind: HessianKind::CholeskyFactor,
        }
    }

    /// Wrap a precomputed inverted Cholesky factor (upper triangular).
    pub fn inverted_cholesky_factor(matrix: Matrix<T>) -> Self {
        Self {
            matrix,
            kind: HessianKind::InvertedCholeskyFactor,
        }
    }

    /// The factor form currently held.
    pub fn kind(&self) -> HessianKind {
        self.kind
    }

    pub fn matrix(&self) -> &Matrix<T> {
        &self.matrix
    }

    pub fn into_matrix(self) -> Matrix<T> {
        self.matrix
    }

    pub(crate) fn matrix_mut(&mut self) -> &mut Matrix<T> {
        &mut self.matrix
    }

    pub(crate) fn set_kind(&mut self, kind: HessianKind) {
        self.kind = kind;
    }
}

/// Simple per-variable bounds lb ≤ x ≤ ub.
#[derive(Debug, Clone, Copy)]
pub struct Bounds<'a, T = f64> {
    pub lb: &'a [T],
    pub ub: &'a [T],
}

/// The general constraint matrix, dense or CSC sparse.  A sparse matrix is
/// densified on entry; sparsity is never exploited algorithmically.
#[derive(Debug, Clone, Copy)]
pub enum ConstraintMatrix<'a, T = f64> {
    Dense(&'a Matrix<T>),
    Sparse(&'a CscMatrix<T>),
}

impl<T> ConstraintMatrix<'_, T>
where
    T: FloatT,
{
    pub fn nrows(&self) -> usize {
        match self {
            ConstraintMatrix::Dense(A) => A.nrows(),
            ConstraintMatrix::Sparse(A) => A.m,
        }
    }

    pub fn ncols(&self) -> usize {
        match self {
            ConstraintMatrix::Dense(A) => A.ncols(),
            ConstraintMatrix::Sparse(A) => A.n,
        }
    }
}

/// General two-sided constraints Alb ≤ Ax ≤ Aub.
#[derive(Debug, Clone, Copy)]
pub struct Constraints<'a, T = f64> {
    pub A: ConstraintMatrix<'a, T>,
    pub lb: &'a [T],
    pub ub: &'a [T],
}

/// One solve's worth of problem data, borrowed from the caller.
///
/// Every part other than the Hessian is optional: an absent objective means
/// h = 0, and absent bounds or constraints simply mean none of that kind.
/// Encode a missing individual bound as ±∞.
#[derive(Debug, Clone, Copy, Default)]
pub struct QpProblem<'a, T = f64> {
    pub objective: Option<&'a [T]>,
    pub bounds: Option<Bounds<'a, T>>,
    pub constraints: Option<Constraints<'a, T>>,
}

/// Validated problem dimensions.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Dims {
    /// primal size n
    pub n: usize,
    /// number of simple bounds (0 or n)
    pub num_simple: usize,
    /// number of general constraints
    pub num_general: usize,
}

impl Dims {
    pub fn num_constraints(&self) -> usize {
        self.num_simple + self.num_general
    }
}

/// Shape-checks the full problem before any numeric work.
pub(crate) fn validate_problem<T>(
    hessian: &Hessian<T>,
    problem: &QpProblem<'_, T>,
) -> Result<Dims, SolverError>
where
    T: FloatT,
{
    let n = hessian.matrix().nrows();
    if n == 0 || hessian.matrix().ncols() != n {
        return Err(SolverError::DimensionMismatch(
            "Hessian must be square and nonempty",
        ));
    }

    if let Some(h) = problem.objective {
        if h.len() != n {
            return Err(SolverError::DimensionMismatch(
                "objective vector length must match the Hessian",
            ));
        }
    }

    let mut num_simple = 0;
    if let Some(Bounds { lb, ub }) = problem.bounds {
        if lb.len() != n || ub.len() != n {
            return Err(SolverError::DimensionMismatch(
                "simple bound vectors must have the primal length",
            ));
        }
        num_simple = n;
    }

    let mut num_general = 0;
    if let Some(Constraints { A, lb, ub }) = problem.constraints {
        num_general = A.nrows();
        if num_general > 0 && A.ncols() != n {
            return Err(SolverError::DimensionMismatch(
                "constraint matrix column count must match the primal length",
            ));
        }
        if lb.len() != num_general || ub.len() != num_general {
            return Err(SolverError::DimensionMismatch(
                "constraint bound vectors must match the constraint row count",
            ));
        }
    }

    Ok(Dims {
        n,
        num_simple,
        num_general,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_shapes() {
        let H = Hessian::lower_triangular(Matrix::<f64>::identity(2));

        let ok = validate_problem(&H, &QpProblem::default()).unwrap();
        assert_eq!((ok.n, ok.num_simple, ok.num_general), (2, 0, 0));

        let h = vec![1.0; 3];
        let bad = QpProblem {
            objective: Some(&h),
            ..QpProblem::default()
        };
        assert!(validate_problem(&H, &bad).is_err());

        let lb = vec![0.0; 2];
        let ub = vec![1.0; 3];
        let bad = QpProblem {
            bounds: Some(Bounds { lb: &lb, ub: &ub }),
            ..QpProblem::default()
        };
        assert!(validate_problem(&H, &bad).is_err());

        let A = Matrix::from(&[[1.0, 2.0, 3.0]]);
        let alb = vec![0.0];
        let aub = vec![1.0];
        let bad = QpProblem {
            constraints: Some(Constraints {
                A: ConstraintMatrix::Dense(&A),
                lb: &alb,
                ub: &aub,
            }),
            ..QpProblem::default()
        };
        assert!(validate_problem(&H, &bad).is_err());
    }
}
