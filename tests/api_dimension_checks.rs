#![allow(non_snake_case)]

use qpgi::algebra::*;
use qpgi::solver::*;

fn try_solve(hessian: &mut Hessian<f64>, problem: &QpProblem<'_, f64>) -> Result<SolverStatus, SolverError> {
    let mut solver = QpSolver::default();
    let mut x = Vec::new();
    solver.solve(&mut x, hessian, problem, &Settings::default())
}

#[test]
fn test_empty_hessian() {
    let mut hessian = Hessian::lower_triangular(Matrix::zeros((0, 0)));
    let result = try_solve(&mut hessian, &QpProblem::default());
    assert!(matches!(result, Err(SolverError::DimensionMismatch(_))));
}

#[test]
fn test_objective_length() {
    let mut hessian = Hessian::lower_triangular(Matrix::identity(2));
    let h = [1.0; 3];
    let problem = QpProblem {
        objective: Some(&h),
        ..QpProblem::default()
    };
    let result = try_solve(&mut hessian, &problem);
    assert!(matches!(result, Err(SolverError::DimensionMismatch(_))));
}

#[test]
fn test_bound_lengths() {
    let mut hessian = Hessian::lower_triangular(Matrix::identity(2));
    let lb = [0.0; 2];
    let ub = [1.0; 3];
    let problem = QpProblem {
        bounds: Some(Bounds { lb: &lb, ub: &ub }),
        ..QpProblem::default()
    };
    let result = try_solve(&mut hessian, &problem);
    assert!(matches!(result, Err(SolverError::DimensionMismatch(_))));
}

#[test]
fn test_constraint_matrix_width() {
    let mut hessian = Hessian::lower_triangular(Matrix::identity(2));
    let A = Matrix::from(&[[1.0, 2.0, 3.0]]);
    let alb = [0.0];
    let aub = [1.0];
    let problem = QpProblem {
        constraints: Some(Constraints {
            A: ConstraintMatrix::Dense(&A),
            lb: &alb,
            ub: &aub,
        }),
        ..QpProblem::default()
    };
    let result = try_solve(&mut hessian, &problem);
    assert!(matches!(result, Err(SolverError::DimensionMismatch(_))));
}

#[test]
fn test_constraint_bound_lengths() {
    let mut hessian = Hessian::lower_triangular(Matrix::identity(2));
    let A = Matrix::from(&[[1.0, 2.0]]);
    let alb = [0.0; 2];
    let aub = [1.0];
    let problem = QpProblem {
        constraints: Some(Constraints {
            A: ConstraintMatrix::Dense(&A),
            lb: &alb,
            ub: &aub,
        }),
        ..QpProblem::default()
    };
    let result = try_solve(&mut hessian, &problem);
    assert!(matches!(result, Err(SolverError::DimensionMismatch(_))));
}

#[test]
fn test_malformed_sparse_matrix() {
    // colptr claims two entries in one column but rowval is out of order
    let A = CscMatrix {
        m: 2,
        n: 2,
        colptr: vec![0, 2, 2],
        rowval: vec![1, 0],
        nzval: vec![1.0, 1.0],
    };
    assert!(A.check_format().is_err());

    let mut hessian = Hessian::lower_triangular(Matrix::identity(2));
    let alb = [0.0; 2];
    let aub = [1.0; 2];
    let problem = QpProblem {
        constraints: Some(Constraints {
            A: ConstraintMatrix::Sparse(&A),
            lb: &alb,
            ub: &aub,
        }),
        ..QpProblem::default()
    };
    let result = try_solve(&mut hessian, &problem);
    assert!(matches!(result, Err(SolverError::SparseFormat(_))));
}

#[test]
fn test_bad_settings_rejected() {
    let mut hessian = Hessian::lower_triangular(Matrix::identity(2));
    let settings = Settings::<f64> {
        tolerance: -1.0,
        ..Settings::default()
    };
    let mut solver = QpSolver::default();
    let mut x = Vec::new();
    let result = solver.solve(&mut x, &mut hessian, &QpProblem::default(), &settings);
    assert!(matches!(result, Err(SolverError::BadSettings(_))));
}
