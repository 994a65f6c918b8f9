use crate::algebra::{DenseFactorizationError, SparseFormatError};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of a solve.
///
/// Infeasibility is a normal, expected optimization outcome and is reported
/// here; [`SolverError`](crate::solver::SolverError) is reserved for
/// malformed inputs and numerical defects.
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolverStatus {
    /// Solver terminated with a solution
    Converged,
    /// Iteration limit reached before a solution was found.  The primal
    /// output holds the best iterate obtained so far.
    MaxIterations,
    /// Some constraint has lb > ub beyond tolerance.  No primal output.
    Inconsistent,
    /// Equality constraints cannot be satisfied simultaneously.  No primal
    /// output.
    InfeasibleEquality,
    /// No admissible step exists for some inequality constraint.  No primal
    /// output.
    InfeasibleInequality,
}

impl SolverStatus {
    /// True for any of the infeasible outcomes.
    pub fn is_infeasible(&self) -> bool {
        matches!(
            *self,
            SolverStatus::Inconsistent
                | SolverStatus::InfeasibleEquality
                | SolverStatus::InfeasibleInequality
        )
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Failures that indicate a defective problem description or a broken
/// numerical invariant, as opposed to an infeasible but well-posed problem.
#[derive(Error, Debug)]
pub enum SolverError {
    /// Input shapes are inconsistent with each other
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(&'static str),
    /// The Hessian is not positive definite
    #[error("Hessian is not positive definite")]
    NotPositiveDefinite,
    /// An internal numerical invariant was violated
    #[error("numerical defect: {0}")]
    NumericalDefect(&'static str),
    /// A settings field holds an unusable value
    #[error("bad settings: {0}")]
    BadSettings(&'static str),
    /// The sparse constraint matrix is malformed
    #[error("malformed sparse constraint matrix: {0}")]
    SparseFormat(#[from] SparseFormatError),
}

impl From<DenseFactorizationError> for SolverError {
    fn from(e: DenseFactorizationError) -> Self {
        match e {
            DenseFactorizationError::NotPositiveDefinite => SolverError::NotPositiveDefinite,
            DenseFactorizationError::IncompatibleDimension => {
                SolverError::DimensionMismatch("Hessian must be square and nonempty")
            }
        }
    }
}
