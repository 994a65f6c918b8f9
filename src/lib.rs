//!  __qpgi__ is a dense active-set solver for convex quadratic programs
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \frac{1}{2}x^T H x + h^T x\\\\\[2ex\]
//!  \text{subject to} & lb \leq x \leq ub \\\\\[1ex\]
//!         & Alb \leq Ax \leq Aub
//!  \end{array}
//! $$
//!
//! with decision variables $x \in \mathbb{R}^n$ and data
//! $H = H^\top \succ 0$, $h \in \mathbb{R}^n$ and $A \in \mathbb{R}^{k \times n}$,
//! using the Goldfarb-Idnani dual active-set method.   Constraints are
//! activated and deactivated through Givens-rotation updates and downdates
//! of a triangular factorization, so each iteration costs $O(n^2)$ rather
//! than a fresh factorization.
//!
//! The solver targets real-time control loops: after a call to
//! [`QpSolver::reserve`](crate::solver::QpSolver::reserve), repeated calls to
//! [`QpSolver::solve`](crate::solver::QpSolver::solve) on problems
//! within the reserved capacity perform no dynamic allocation, and the
//! Cholesky factorization of an unchanged Hessian can be reused across
//! solves through the [`Hessian`](crate::solver::Hessian) artifact.
//!
//! ## Features
//!
//! * __Two-sided constraints__: simple bounds and general linear constraints
//!   are both two-sided; a constraint with equal bounds is treated as an
//!   equality and held active for the whole solve.
//!
//! * __Warm-started resolve__: the Hessian artifact is rewritten in place
//!   with the factor form actually computed, and subsequent solves with an
//!   unchanged Hessian skip refactorization entirely.
//!
//! * __Infeasibility as data__: inconsistent or infeasible problems are
//!   reported through [`SolverStatus`](crate::solver::SolverStatus), not
//!   through panics or errors; errors are reserved for malformed inputs and
//!   numerical defects.

// Math notation (H, A, J, R) is used throughout.
#![allow(non_snake_case)]

pub mod algebra;
pub mod solver;
