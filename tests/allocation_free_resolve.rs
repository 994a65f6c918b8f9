#![allow(non_snake_case)]

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

use qpgi::algebra::*;
use qpgi::solver::*;

struct CountingAllocator;

static ALLOCATION_COUNT: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        ALLOCATION_COUNT.fetch_add(1, Ordering::SeqCst);
        System.alloc(layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        ALLOCATION_COUNT.fetch_add(1, Ordering::SeqCst);
        System.realloc(ptr, layout, new_size)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

fn allocations_during<R>(f: impl FnOnce() -> R) -> (usize, R) {
    let before = ALLOCATION_COUNT.load(Ordering::SeqCst);
    let result = f();
    (ALLOCATION_COUNT.load(Ordering::SeqCst) - before, result)
}

// single test so no concurrent test thread can touch the counter
#[test]
fn test_reserved_solves_allocate_nothing() {
    let n = 8;
    let h = vec![1.0; n];
    let lb = vec![-0.5; n];
    let ub = vec![0.5; n];
    let A = Matrix::new_from_slice((1, n), &vec![1.0; n]);
    let alb = vec![-2.0];
    let aub = vec![2.0];

    let problem = QpProblem {
        objective: Some(&h),
        bounds: Some(Bounds { lb: &lb, ub: &ub }),
        constraints: Some(Constraints {
            A: ConstraintMatrix::Dense(&A),
            lb: &alb,
            ub: &aub,
        }),
    };
    let settings = Settings::default();

    let mut solver = QpSolver::default();
    solver.reserve(n, n, 1);
    let mut x: Vec<f64> = Vec::with_capacity(n);
    let mut hessian = Hessian::lower_triangular(Matrix::identity(n));

    // first solve, machinery built entirely out of reserved storage
    let (allocations, status) = allocations_during(|| {
        solver.solve(&mut x, &mut hessian, &problem, &settings).unwrap()
    });
    assert_eq!(status, SolverStatus::Converged);
    assert_eq!(allocations, 0);

    // a rejected sparse matrix must leave the densification storage in
    // place for later solves
    let bad = CscMatrix {
        m: 1,
        n,
        colptr: vec![0, 1, 0, 1, 1, 1, 1, 1, 1],
        rowval: vec![0],
        nzval: vec![1.0],
    };
    let bad_problem = QpProblem {
        constraints: Some(Constraints {
            A: ConstraintMatrix::Sparse(&bad),
            lb: &alb,
            ub: &aub,
        }),
        ..problem
    };
    let err = solver.solve(&mut x, &mut hessian, &bad_problem, &settings);
    assert!(matches!(err, Err(SolverError::SparseFormat(_))));

    let A_sparse = CscMatrix::new(1, n, (0..=n).collect(), vec![0; n], vec![1.0; n]);
    let sparse_problem = QpProblem {
        constraints: Some(Constraints {
            A: ConstraintMatrix::Sparse(&A_sparse),
            lb: &alb,
            ub: &aub,
        }),
        ..problem
    };
    let (allocations, status) = allocations_during(|| {
        solver
            .solve(&mut x, &mut hessian, &sparse_problem, &settings)
            .unwrap()
    });
    assert_eq!(status, SolverStatus::Converged);
    assert_eq!(allocations, 0);

    // resolve reusing the factored Hessian artifact
    let (allocations, status) = allocations_during(|| {
        solver.solve(&mut x, &mut hessian, &problem, &settings).unwrap()
    });
    assert_eq!(status, SolverStatus::Converged);
    assert_eq!(allocations, 0);

    // bounds-only problem within the same reserved capacity
    let smaller = QpProblem {
        objective: Some(&h[..6]),
        bounds: Some(Bounds {
            lb: &lb[..6],
            ub: &ub[..6],
        }),
        ..QpProblem::default()
    };
    let mut small_hessian = Hessian::lower_triangular(Matrix::identity(6));
    let (allocations, status) = allocations_during(|| {
        solver
            .solve(&mut x, &mut small_hessian, &smaller, &settings)
            .unwrap()
    });
    assert_eq!(status, SolverStatus::Converged);
    assert_eq!(allocations, 0);
}
