//! The QP solver itself: problem description, settings, statuses and the
//! active-set iteration.

mod active_set;
mod constraints;
mod factorization;
mod problem;
mod settings;
mod solver;
mod status;

pub use constraints::ConstraintStatus;
pub use problem::{Bounds, ConstraintMatrix, Constraints, Hessian, HessianKind, QpProblem};
pub use settings::{Settings, SettingsBuilder, SettingsBuilderError};
pub use solver::QpSolver;
pub use status::{SolverError, SolverStatus};
