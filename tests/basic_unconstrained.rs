#![allow(non_snake_case)]

use qpgi::algebra::*;
use qpgi::solver::*;

#[test]
fn test_no_objective_no_constraints() {
    let mut solver = QpSolver::<f64>::default();
    let mut hessian = Hessian::lower_triangular(Matrix::identity(3));

    let mut x = Vec::new();
    let status = solver
        .solve(&mut x, &mut hessian, &QpProblem::default(), &Settings::default())
        .unwrap();
    assert_eq!(status, SolverStatus::Converged);
    assert_eq!(x, vec![0.0; 3]);
    assert_eq!(solver.inequality_iteration_count(), 0);
}

#[test]
fn test_stationarity() {
    #[rustfmt::skip]
    let H = Matrix::from(
        &[[ 6., 2., 1.],
          [ 2., 5., 2.],
          [ 1., 2., 4.]]);
    let h = [-8.0, -3.0, -3.0];

    let mut solver = QpSolver::<f64>::default();
    let mut hessian = Hessian::lower_triangular(H.clone());
    let problem = QpProblem {
        objective: Some(&h),
        ..QpProblem::default()
    };

    let mut x = Vec::new();
    let status = solver
        .solve(&mut x, &mut hessian, &problem, &Settings::default())
        .unwrap();
    assert_eq!(status, SolverStatus::Converged);

    // Hx + h = 0
    let mut gradient = vec![0.0; 3];
    H.mul_vec(&mut gradient, &x);
    gradient.axpby(1.0, &h, 1.0);
    assert!(gradient.norm_inf() < 1e-12);
}

#[test]
fn test_inactive_constraints_keep_unconstrained_optimum() {
    let H = Matrix::identity(2);
    let h = [-1.0, -2.0];
    let lb = [-100.0, -100.0];
    let ub = [100.0, 100.0];

    let mut solver = QpSolver::<f64>::default();
    let mut hessian = Hessian::lower_triangular(H);
    let problem = QpProblem {
        objective: Some(&h),
        bounds: Some(Bounds { lb: &lb, ub: &ub }),
        ..QpProblem::default()
    };

    let mut x = Vec::new();
    let status = solver
        .solve(&mut x, &mut hessian, &problem, &Settings::default())
        .unwrap();
    assert_eq!(status, SolverStatus::Converged);
    assert_eq!(x, vec![1.0, 2.0]);
    // the active-set machinery was never needed
    assert_eq!(solver.inequality_iteration_count(), 0);
}
