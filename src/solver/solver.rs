use super::active_set::ActiveSet;
use super::constraints::{ChosenConstraint, ConstraintStatus};
use super::factorization::FactorizationData;
use super::problem::{validate_problem, ConstraintMatrix, Dims, Hessian, HessianKind, QpProblem};
use super::settings::Settings;
use super::status::{SolverStatus, SolverError};
use crate::algebra::*;

/// Goldfarb-Idnani dual active-set QP solver.
///
/// The solver owns all of its working storage and reuses it across solves.
/// After a call to [`reserve`](QpSolver::reserve), any solve whose problem
/// fits the reserved capacity performs no dynamic allocation, so a single
/// `QpSolver` can sit inside a real-time loop and be fed a fresh problem on
/// every tick.
///
/// ```
/// use qpgi::algebra::Matrix;
/// use qpgi::solver::{Hessian, QpSolver, QpProblem, Settings, SolverStatus};
///
/// let mut solver = QpSolver::default();
/// let mut hessian = Hessian::lower_triangular(Matrix::identity(2));
/// let h = [-1.0, -1.0];
/// let problem = QpProblem {
///     objective: Some(&h),
///     ..QpProblem::default()
/// };
///
/// let mut x = Vec::new();
/// let status = solver
///     .solve(&mut x, &mut hessian, &problem, &Settings::default())
///     .unwrap();
/// assert_eq!(status, SolverStatus::Converged);
/// assert_eq!(x, vec![1.0, 1.0]);
/// ```
#[derive(Debug, Default)]
pub struct QpSolver<T = f64> {
    active_set: ActiveSet,
    factorization: FactorizationData<T>,

    primal: Vec<T>,
    dual: Vec<T>,
    primal_step: Vec<T>,
    dual_step: Vec<T>,
    /// A x, refreshed once per constraint selection
    ctr_dot_primal: Vec<T>,
    constraint_status: Vec<ConstraintStatus>,
    /// densification target for sparse constraint matrices
    dense_A: Matrix<T>,

    chosen: ChosenConstraint<T>,
    iter_count: usize,
    machinery_initialized: bool,
    hessian_kind: Option<HessianKind>,
}

impl<T> QpSolver<T>
where
    T: FloatT,
{
    /// Grow the working storage for problems with up to `primal_capacity`
    /// variables, `num_simple_capacity` simple bounds and
    /// `num_general_capacity` general constraint rows.
    ///
    /// Solves within these limits allocate nothing.
    pub fn reserve(
        &mut self,
        primal_capacity: usize,
        num_simple_capacity: usize,
        num_general_capacity: usize,
    ) {
        grow(&mut self.primal, primal_capacity);
        grow(&mut self.dual, primal_capacity);
        grow(&mut self.primal_step, primal_capacity);
        grow(&mut self.dual_step, primal_capacity);
        grow(&mut self.ctr_dot_primal, num_general_capacity);

        let num_constraints = num_simple_capacity + num_general_capacity;
        if self.constraint_status.len() < num_constraints {
            self.constraint_status
                .resize(num_constraints, ConstraintStatus::Undefined);
        }

        self.active_set.reserve(primal_capacity);
        self.factorization.reserve(primal_capacity);
        if self.dense_A.size() < (num_general_capacity, primal_capacity) {
            self.dense_A
                .resize((num_general_capacity, primal_capacity));
        }
    }

    /// Solve a QP.
    ///
    /// On `Converged` and `MaxIterations` the primal solution (respectively
    /// the best iterate found) is written to `x`; the infeasible statuses
    /// leave `x` untouched.   The Hessian artifact is factorized in place
    /// and re-tagged, so passing it back unchanged skips refactorization.
    pub fn solve(
        &mut self,
        x: &mut Vec<T>,
        hessian: &mut Hessian<T>,
        problem: &QpProblem<'_, T>,
        settings: &Settings<T>,
    ) -> Result<SolverStatus, SolverError> {
        settings.validate()?;
        let dims = validate_problem(hessian, problem)?;

        // a sparse constraint matrix is densified up front; from here on
        // the algorithm only ever sees a dense row-accessed matrix
        let mut dense_A = std::mem::take(&mut self.dense_A);
        let A: &Matrix<T> = match problem.constraints.map(|c| c.A) {
            Some(ConstraintMatrix::Sparse(S)) => {
                if let Err(e) = S.check_format() {
                    self.dense_A = dense_A;
                    return Err(e.into());
                }
                dense_A.resize((S.m, S.n));
                S.to_dense_into(&mut dense_A);
                &dense_A
            }
            Some(ConstraintMatrix::Dense(M)) => M,
            None => {
                dense_A.resize((0, 0));
                &dense_A
            }
        };

        let result = self.solve_dense(x, hessian, problem, A, dims, settings);
        self.dense_A = dense_A;
        result
    }

    /// Factor form held by the Hessian artifact after the latest solve.
    pub fn hessian_kind(&self) -> Option<HessianKind> {
        self.hessian_kind
    }

    /// Number of inequality iterations performed by the latest solve.
    /// Zero when the active set never changed after the equality phase.
    pub fn inequality_iteration_count(&self) -> usize {
        self.iter_count
    }

    /// Lagrange multipliers of the active inequality constraints after a
    /// solve that returned `Converged`.
    ///
    /// `indices` receives global constraint indices: simple bounds first
    /// when present, then general constraint rows.   `is_lower` flags which
    /// side of the constraint is binding.
    pub fn active_inequality_duals(
        &self,
        dual: &mut Vec<T>,
        indices: &mut Vec<usize>,
        is_lower: &mut Vec<bool>,
    ) {
        dual.clear();
        indices.clear();
        is_lower.clear();

        for position in self.active_set.num_equalities..self.active_set.size {
            let index = self.active_set.index(position);
            dual.push(self.dual[position]);
            indices.push(index);
            is_lower.push(self.constraint_status[index] == ConstraintStatus::ActiveLowerBound);
        }
    }

    fn solve_dense(
        &mut self,
        x: &mut Vec<T>,
        hessian: &mut Hessian<T>,
        problem: &QpProblem<'_, T>,
        A: &Matrix<T>,
        dims: Dims,
        settings: &Settings<T>,
    ) -> Result<SolverStatus, SolverError> {
        let n = dims.n;
        let num_simple = dims.num_simple;
        let num_constraints = dims.num_constraints();
        let tolerance = settings.tolerance;

        self.machinery_initialized = false;
        self.iter_count = 0;
        self.hessian_kind = None;

        let (lb, ub) = match problem.bounds {
            Some(b) => (b.lb, b.ub),
            None => (&[][..], &[][..]),
        };
        let (alb, aub) = match problem.constraints {
            Some(c) => (c.lb, c.ub),
            None => (&[][..], &[][..]),
        };
        let h = problem.objective;

        if settings.verbose {
            print_banner(n, num_simple, dims.num_general);
        }

        self.primal.clear();
        self.primal.resize(n, T::zero());

        if h.is_none() && num_constraints == 0 {
            // the origin is trivially optimal
            self.hessian_kind = Some(hessian.kind());
            return self.finish(x, SolverStatus::Converged, settings);
        }

        // bring the artifact to a factor form and take the unconstrained
        // optimum as the starting iterate
        match hessian.kind() {
            HessianKind::LowerTriangular | HessianKind::CholeskyFactor => {
                if hessian.kind() == HessianKind::LowerTriangular {
                    cholesky_factorize(hessian.matrix_mut())?;
                    hessian.set_kind(HessianKind::CholeskyFactor);
                }
                if let Some(h) = h {
                    cholesky_solve(&mut self.primal, hessian.matrix(), h);
                    self.primal.negate();
                }
            }
            HessianKind::InvertedCholeskyFactor => {
                if let Some(h) = h {
                    self.primal_step.clear();
                    self.primal_step.resize(n, T::zero());
                    // x = -U U' h  with  U U' = H⁻¹
                    upper_transpose_mul_vec(&mut self.primal_step, hessian.matrix(), h);
                    self.primal_step.negate();
                    upper_mul_vec(&mut self.primal, hessian.matrix(), &self.primal_step);
                }
            }
        }
        self.hessian_kind = Some(hessian.kind());

        if num_constraints == 0 {
            return self.finish(x, SolverStatus::Converged, settings);
        }

        // classify constraints, activating equalities as they are found
        self.constraint_status.clear();
        self.constraint_status
            .resize(num_constraints, ConstraintStatus::Undefined);
        let mut num_equalities = 0;

        for i in 0..num_constraints {
            self.chosen.is_simple = i < num_simple;

            let (lb_i, ub_i) = if self.chosen.is_simple {
                (lb[i], ub[i])
            } else {
                self.chosen.general_index = i - num_simple;
                (alb[self.chosen.general_index], aub[self.chosen.general_index])
            };

            if lb_i - tolerance > ub_i {
                self.constraint_status[i] = ConstraintStatus::Inconsistent;
                return self.finish(x, SolverStatus::Inconsistent, settings);
            }

            if (lb_i - ub_i).abs() > tolerance {
                self.constraint_status[i] = ConstraintStatus::Inactive;
                continue;
            }

            self.constraint_status[i] = ConstraintStatus::Equality;
            num_equalities += 1;

            self.chosen.violation = if self.chosen.is_simple {
                lb_i - self.primal[i]
            } else {
                lb_i - A.row_dot(self.chosen.general_index, &self.primal)
            };

            self.initialize_machinery(hessian, dims, settings.return_inverted_factor);

            // once n constraints are active every further gradient is
            // linearly dependent on the active ones
            if self.active_set.has_free_capacity() {
                let ctr_dot_step = if self.chosen.is_simple {
                    self.factorization.compute_equality_primal_step_simple(
                        &mut self.primal_step,
                        i,
                        self.active_set.size,
                    );
                    self.primal_step[i]
                } else {
                    self.factorization.compute_equality_primal_step_general(
                        &mut self.primal_step,
                        A,
                        self.chosen.general_index,
                        self.active_set.size,
                    );
                    A.row_dot(self.chosen.general_index, &self.primal_step)
                };

                // a zero step direction means linear dependence
                if ctr_dot_step < -tolerance {
                    let step_length = self.chosen.violation / ctr_dot_step;
                    self.primal.axpby(step_length, &self.primal_step, T::one());

                    if !self
                        .factorization
                        .update(self.active_set.size, self.chosen.is_simple, tolerance)
                    {
                        return Err(SolverError::NumericalDefect(
                            "equality activation failed after a nonzero step projection",
                        ));
                    }
                    self.active_set.add_equality(i);
                    continue;
                }
            }

            // dependent equality: admissible only if already satisfied
            if self.chosen.violation.abs() > tolerance {
                self.constraint_status[i] = ConstraintStatus::Inconsistent;
                return self.finish(x, SolverStatus::InfeasibleEquality, settings);
            }
        }

        if num_equalities == num_constraints {
            return self.finish(x, SolverStatus::Converged, settings);
        }

        // the general-row scan needs its product buffer sized even when the
        // equality phase activated nothing and the machinery is still lazy
        self.ctr_dot_primal.clear();
        self.ctr_dot_primal.resize(dims.num_general, T::zero());

        self.choose_constraint(lb, ub, alb, aub, A, num_simple, tolerance);

        if self.chosen.violation.abs() < tolerance {
            // all inequalities hold at the equality-constrained optimum
            return self.finish(x, SolverStatus::Converged, settings);
        }

        self.initialize_machinery(hessian, dims, settings.return_inverted_factor);
        self.dual.clear();
        self.dual.resize(n, T::zero());
        self.dual_step.clear();
        self.dual_step.resize(n, T::zero());

        let mut status = SolverStatus::MaxIterations;
        let mut ctr_dot_step = T::zero();

        self.factorization.compute_inequality_dual_step(
            &mut self.dual_step,
            &self.chosen,
            A,
            &self.active_set,
        );
        if self.active_set.has_free_capacity() {
            self.factorization
                .compute_inequality_primal_step(&mut self.primal_step, &self.active_set);
            ctr_dot_step = self.constraint_dot_primal_step(A);
        }

        self.iter_count = 1;
        loop {
            if let Some(max_iterations) = settings.max_iterations {
                if self.iter_count > max_iterations {
                    break;
                }
            }

            if settings.verbose {
                println!(
                    "iter {:>4}: chosen = {:>4}, violation = {:+.3e}, active = {}",
                    self.iter_count, self.chosen.index, self.chosen.violation, self.active_set.size
                );
            }

            // largest admissible growth of the chosen constraint's
            // multiplier before some active dual hits zero
            let mut blocking_position = n;
            let mut dual_step_length = T::infinity();
            for i in self.active_set.num_equalities..self.active_set.size {
                if self.dual_step[i] < -tolerance {
                    let dual_step_length_i = -self.dual[i] / self.dual_step[i];
                    if dual_step_length_i < dual_step_length {
                        dual_step_length = dual_step_length_i;
                        blocking_position = i;
                    }
                }
            }

            if self.active_set.has_free_capacity() && ctr_dot_step.abs() > tolerance {
                let mut step_length = -self.chosen.violation / ctr_dot_step;

                let mut partial_step = false;
                if dual_step_length <= step_length {
                    step_length = dual_step_length;
                    partial_step = true;
                }

                self.primal.axpby(step_length, &self.primal_step, T::one());

                let eq = self.active_set.num_equalities;
                let size = self.active_set.size;
                self.dual[eq..size].axpby(step_length, &self.dual_step[eq..size], T::one());
                self.chosen.dual += step_length;
                self.chosen.violation += step_length * ctr_dot_step;

                // a partial step that happens to clear the violation counts
                // as a full step
                if partial_step && self.chosen.violation.abs() > tolerance {
                    self.drop_blocking_constraint(blocking_position);
                    self.factorization.update_steps_after_partial_step(
                        &mut self.primal_step,
                        &mut self.dual_step,
                        &self.active_set,
                    );
                    ctr_dot_step = self.constraint_dot_primal_step(A);
                } else {
                    if !self
                        .factorization
                        .update(self.active_set.size, self.chosen.is_simple, tolerance)
                    {
                        return Err(SolverError::NumericalDefect(
                            "inequality activation failed after a nonzero step projection",
                        ));
                    }

                    self.constraint_status[self.chosen.index] = if self.chosen.is_lower {
                        ConstraintStatus::ActiveLowerBound
                    } else {
                        ConstraintStatus::ActiveUpperBound
                    };
                    self.dual[self.active_set.size] = self.chosen.dual;
                    self.active_set.add_inequality(self.chosen.index);

                    self.choose_constraint(lb, ub, alb, aub, A, num_simple, tolerance);

                    if self.chosen.violation.abs() < tolerance {
                        status = SolverStatus::Converged;
                        break;
                    }

                    ctr_dot_step = T::zero();
                    self.factorization.compute_inequality_dual_step(
                        &mut self.dual_step,
                        &self.chosen,
                        A,
                        &self.active_set,
                    );
                    if self.active_set.has_free_capacity() {
                        self.factorization
                            .compute_inequality_primal_step(&mut self.primal_step, &self.active_set);
                        ctr_dot_step = self.constraint_dot_primal_step(A);
                    }
                }
            } else {
                // no primal progress is possible; either some active dual
                // can absorb the chosen multiplier, or the problem is
                // infeasible
                if blocking_position == n {
                    return self.finish(x, SolverStatus::InfeasibleInequality, settings);
                }

                let eq = self.active_set.num_equalities;
                let size = self.active_set.size;
                self.dual[eq..size].axpby(dual_step_length, &self.dual_step[eq..size], T::one());
                self.chosen.dual += dual_step_length;

                self.drop_blocking_constraint(blocking_position);
                self.factorization.update_steps_after_pure_dual_step(
                    &mut self.primal_step,
                    &mut self.dual_step,
                    &self.active_set,
                );
                ctr_dot_step = self.constraint_dot_primal_step(A);
            }

            self.iter_count += 1;
        }

        self.finish(x, status, settings)
    }

    fn initialize_machinery(&mut self, hessian: &mut Hessian<T>, dims: Dims, return_inverted: bool) {
        if !self.machinery_initialized {
            self.active_set.initialize(dims.n);
            self.primal_step.clear();
            self.primal_step.resize(dims.n, T::zero());
            self.ctr_dot_primal.clear();
            self.ctr_dot_primal.resize(dims.num_general, T::zero());

            self.factorization
                .initialize(hessian, dims.n, return_inverted);
            self.hessian_kind = Some(hessian.kind());

            self.machinery_initialized = true;
        }
    }

    /// Scan all inactive constraints for the most violated one, simple
    /// bounds first.   General rows are only consulted when no simple bound
    /// is violated beyond tolerance, which skips the matrix-vector product
    /// on iterations resolved by bounds alone.
    fn choose_constraint(
        &mut self,
        lb: &[T],
        ub: &[T],
        alb: &[T],
        aub: &[T],
        A: &Matrix<T>,
        num_simple: usize,
        tolerance: T,
    ) {
        self.chosen.reset();

        for i in 0..num_simple {
            if self.constraint_status[i] == ConstraintStatus::Inactive {
                self.check_constraint_violation(i, lb[i], ub[i], self.primal[i]);
            }
        }

        let num_general = A.nrows();
        if self.chosen.violation.abs() < tolerance && num_general > 0 {
            A.mul_vec(&mut self.ctr_dot_primal, &self.primal);
            for i in num_simple..(num_simple + num_general) {
                if self.constraint_status[i] == ConstraintStatus::Inactive {
                    let row = i - num_simple;
                    self.check_constraint_violation(i, alb[row], aub[row], self.ctr_dot_primal[row]);
                }
            }
            if self.chosen.index >= num_simple {
                self.chosen.general_index = self.chosen.index - num_simple;
            }
        }

        self.chosen.is_lower = self.chosen.violation < T::zero();
        self.chosen.is_simple = self.chosen.index < num_simple;
    }

    /// Keep the candidate whose violation has the strictly largest
    /// magnitude; on a tie the earlier index survives.   A violated lower
    /// bound is kept as a negative violation.
    fn check_constraint_violation(&mut self, i: usize, lb_i: T, ub_i: T, value: T) {
        let mut violation = value - lb_i;
        if violation < -self.chosen.violation.abs() {
            self.chosen.violation = violation;
            self.chosen.index = i;
        } else {
            violation = value - ub_i;
            if violation > self.chosen.violation.abs() {
                self.chosen.violation = violation;
                self.chosen.index = i;
            }
        }
    }

    fn constraint_dot_primal_step(&self, A: &Matrix<T>) -> T {
        if self.chosen.is_simple {
            self.primal_step[self.chosen.index]
        } else {
            A.row_dot(self.chosen.general_index, &self.primal_step)
        }
    }

    /// Deactivate the active inequality at `position`, dropping its dual
    /// and downdating the factorization.
    fn drop_blocking_constraint(&mut self, position: usize) {
        let size = self.active_set.size;
        self.constraint_status[self.active_set.index(position)] = ConstraintStatus::Inactive;
        self.dual.copy_within((position + 1)..size, position);
        self.factorization.downdate(position, size);
        self.active_set.remove_inequality(position);
    }

    fn finish(
        &mut self,
        x: &mut Vec<T>,
        status: SolverStatus,
        settings: &Settings<T>,
    ) -> Result<SolverStatus, SolverError> {
        if settings.verbose {
            println!("terminated with status = {status}");
        }
        if !status.is_infeasible() {
            x.clear();
            x.extend_from_slice(&self.primal);
        }
        Ok(status)
    }
}

fn grow<T: FloatT>(buffer: &mut Vec<T>, capacity: usize) {
    if buffer.len() < capacity {
        buffer.resize(capacity, T::zero());
    }
}

// w = U' v over the stored upper triangle of U
fn upper_transpose_mul_vec<T: FloatT>(w: &mut [T], U: &Matrix<T>, v: &[T]) {
    for (j, wj) in w.iter_mut().enumerate() {
        *wj = U.col_slice(j)[..=j].dot(&v[..=j]);
    }
}

// x = U w over the stored upper triangle of U
fn upper_mul_vec<T: FloatT>(x: &mut [T], U: &Matrix<T>, w: &[T]) {
    x.set(T::zero());
    for (j, &wj) in w.iter().enumerate() {
        x[..=j].axpby(wj, &U.col_slice(j)[..=j], T::one());
    }
}

fn print_banner(n: usize, num_simple: usize, num_general: usize) {
    println!("---------------------------------------------------------");
    println!(
        "  qpgi v{}  -  dual active-set QP solver",
        env!("CARGO_PKG_VERSION")
    );
    println!("---------------------------------------------------------");
    println!(
        "variables = {}, simple bounds = {}, general constraints = {}",
        n, num_simple, num_general
    );
}
