use super::active_set::ActiveSet;
use super::constraints::ChosenConstraint;
use super::problem::{Hessian, HessianKind};
use crate::algebra::*;

/// Incrementally maintained factorization of the active constraint
/// gradients, expressed in the metric of the Hessian.
///
/// `J = L⁻ᵀ` (so JJ' = H⁻¹) and `R` holds, in its leading
/// active-set-size square block, the upper triangular factor of J'N where
/// N collects the active constraint gradients.   Column `active_set.size`
/// of `R` is scratch (the vector "d") for the constraint currently being
/// processed.   Columns of `J` beyond the active-set size span the null
/// space of the active gradients; rotations applied to `R` are co-applied
/// to `J` to keep this invariant.
#[derive(Debug, Default)]
pub(crate) struct FactorizationData<T> {
    J: Matrix<T>,
    R: Matrix<T>,
    primal_size: usize,
    /// rows of the scratch column d at and beyond this index are zero;
    /// lets the simple-bound fast path skip structural zeros
    nonzero_head: usize,
}

impl<T> FactorizationData<T>
where
    T: FloatT,
{
    pub fn reserve(&mut self, primal_capacity: usize) {
        if self.J.nrows() < primal_capacity {
            self.J.resize((primal_capacity, primal_capacity));
            self.R.resize((primal_capacity, primal_capacity + 1));
        }
    }

    /// Derive `J` from the Hessian artifact and size `R`.
    ///
    /// The artifact must already hold a factor form.   When asked to, the
    /// freshly inverted factor is written back into the artifact so a
    /// resolve can start from it directly.
    pub fn initialize(
        &mut self,
        hessian: &mut Hessian<T>,
        primal_size: usize,
        return_inverted_factor: bool,
    ) {
        self.primal_size = primal_size;
        self.J.resize((primal_size, primal_size));

        match hessian.kind() {
            HessianKind::CholeskyFactor => {
                invert_cholesky_factor(&mut self.J, hessian.matrix());
                if return_inverted_factor {
                    let H = hessian.matrix_mut();
                    for c in 0..primal_size {
                        for r in 0..=c {
                            H[(r, c)] = self.J[(r, c)];
                        }
                    }
                    hessian.set_kind(HessianKind::InvertedCholeskyFactor);
                }
            }
            HessianKind::InvertedCholeskyFactor => {
                let H = hessian.matrix();
                for c in 0..primal_size {
                    for r in 0..=c {
                        self.J[(r, c)] = H[(r, c)];
                    }
                }
            }
            HessianKind::LowerTriangular => {
                // the orchestrator factorizes before initializing machinery
                unreachable!("factorization machinery requires a factored Hessian");
            }
        }

        self.R.resize((primal_size, primal_size + 1));
        self.nonzero_head = primal_size;
    }

    /// Incorporate the pending gradient (already placed in the scratch
    /// column) into `R` at column `r_col`, zeroing the column below its
    /// diagonal with a cascade of rotations co-applied to `J`.
    ///
    /// Returns false when the new diagonal entry is below tolerance, which
    /// means the candidate is linearly dependent on the active set.
    pub fn update(&mut self, r_col: usize, is_simple: bool, tolerance: T) -> bool {
        let n = self.primal_size;
        if is_simple {
            // d is sparse here: hop between its nonzero entries
            let mut i = self.nonzero_head - 1;
            while i > r_col {
                let mut j = i - 1;
                while self.R[(j, r_col)] == T::zero() && j > r_col {
                    j -= 1;
                }
                let givens = self.rotate_in_r((j, r_col), (i, r_col));
                givens.apply_column_wise(&mut self.J, 0, n, j, i);
                i = j;
            }
        } else {
            let mut i = self.nonzero_head - 1;
            while i > r_col {
                let givens = self.rotate_in_r((i - 1, r_col), (i, r_col));
                givens.apply_column_wise(&mut self.J, 0, n, i - 1, i);
                i -= 1;
            }
        }

        self.R[(r_col, r_col)].abs() > tolerance
    }

    /// Remove the active constraint at position `r_col_index`, restoring
    /// `R` to triangular form and compacting the surviving columns.   The
    /// scratch column moves left along with them.
    pub fn downdate(&mut self, r_col_index: usize, r_cols: usize) {
        let n = self.primal_size;
        for i in (r_col_index + 1)..r_cols {
            let givens = self.rotate_in_r((i - 1, i), (i, i));
            givens.apply_column_wise(&mut self.J, 0, n, i - 1, i);
            // 'r_cols + 1' -- the scratch column rotates as well
            givens.apply_row_wise(&mut self.R, i + 1, r_cols + 1, i - 1, i);

            let (dst, src) = self.R.col_slices_mut(i - 1, i);
            dst[..i].copy_from(&src[..i]);
        }
        let (dst, src) = self.R.col_slices_mut(r_cols - 1, r_cols);
        dst.copy_from(src);
    }

    /// Primal step direction for a pending simple-bound equality.
    pub fn compute_equality_primal_step_simple(
        &mut self,
        step_direction: &mut [T],
        bound_index: usize,
        active_set_size: usize,
    ) {
        self.set_scratch_from_simple(bound_index, active_set_size, false);
        self.compute_primal_step_direction(step_direction, active_set_size);
    }

    /// Primal step direction for a pending general equality with gradient
    /// in row `ctr_index` of `A`.
    pub fn compute_equality_primal_step_general(
        &mut self,
        step_direction: &mut [T],
        A: &Matrix<T>,
        ctr_index: usize,
        active_set_size: usize,
    ) {
        self.set_scratch_from_general(A, ctr_index, active_set_size, false);
        self.compute_primal_step_direction(step_direction, active_set_size);
    }

    /// Primal step direction for the chosen inequality, from the scratch
    /// column prepared by [`compute_inequality_dual_step`].
    pub fn compute_inequality_primal_step(
        &mut self,
        primal_step_direction: &mut [T],
        active_set: &ActiveSet,
    ) {
        self.compute_primal_step_direction(primal_step_direction, active_set.size);
    }

    /// Rate of change of the active inequality multipliers as the chosen
    /// constraint's multiplier grows.   Also (re)loads the scratch column
    /// with the chosen gradient, sign-flipped for a lower-bound violation.
    pub fn compute_inequality_dual_step(
        &mut self,
        dual_step_direction: &mut [T],
        chosen: &ChosenConstraint<T>,
        A: &Matrix<T>,
        active_set: &ActiveSet,
    ) {
        if chosen.is_simple {
            self.set_scratch_from_simple(chosen.index, active_set.size, chosen.is_lower);

            // d has a single nonzero beyond the rotated head; find it
            let mut head = self.primal_size - 1;
            while self.R[(head, active_set.size)] == T::zero() && head > active_set.size {
                head -= 1;
            }
            self.nonzero_head = head + 1;
        } else {
            self.set_scratch_from_general(A, chosen.general_index, active_set.size, chosen.is_lower);
            self.nonzero_head = self.primal_size;
        }

        self.compute_dual_step_direction(dual_step_direction, active_set);
    }

    /// Refresh both directions after a partial step deactivated a blocking
    /// constraint: the primal direction picks up the contribution of the
    /// column freed by the downdate.
    pub fn update_steps_after_partial_step(
        &mut self,
        primal_step_direction: &mut [T],
        dual_step_direction: &mut [T],
        active_set: &ActiveSet,
    ) {
        let s = active_set.size;
        let scale = self.R[(s, s)];
        primal_step_direction.axpby(-scale, self.J.col_slice(s), T::one());
        self.compute_dual_step_direction(dual_step_direction, active_set);
    }

    /// Refresh both directions after a pure dual step: the primal
    /// direction restarts from the single freed column.
    pub fn update_steps_after_pure_dual_step(
        &mut self,
        primal_step_direction: &mut [T],
        dual_step_direction: &mut [T],
        active_set: &ActiveSet,
    ) {
        let s = active_set.size;
        let scale = self.R[(s, s)];
        primal_step_direction.set(T::zero());
        primal_step_direction.axpby(-scale, self.J.col_slice(s), T::one());
        self.compute_dual_step_direction(dual_step_direction, active_set);
    }

    // d = ±J' e_i, i.e. a (possibly negated) row of J
    fn set_scratch_from_simple(&mut self, index: usize, active_set_size: usize, negate: bool) {
        let m = self.R.nrows();
        let d = self.R.col_slice_mut(active_set_size);
        self.J.row_into(&mut d[..m], index);
        if negate {
            d.negate();
        }
    }

    // d = ±J' a for a general constraint gradient a (a row of A)
    fn set_scratch_from_general(
        &mut self,
        A: &Matrix<T>,
        ctr_index: usize,
        active_set_size: usize,
        negate: bool,
    ) {
        let n = self.primal_size;
        let sign = if negate { -T::one() } else { T::one() };
        for j in 0..n {
            let mut dj = T::zero();
            for (i, &Jij) in self.J.col_slice(j).iter().enumerate() {
                dj += Jij * A[(ctr_index, i)];
            }
            self.R[(j, active_set_size)] = sign * dj;
        }
    }

    // step = -J[:, size..head] * d[size..head]
    fn compute_primal_step_direction(&self, step_direction: &mut [T], active_set_size: usize) {
        let d = self.R.col_slice(active_set_size);
        step_direction.set(T::zero());
        for j in active_set_size..self.nonzero_head {
            step_direction.axpby(-d[j], self.J.col_slice(j), T::one());
        }
    }

    // solve R[eq..size, eq..size] * y = -d[eq..size] over the upper
    // triangular active-inequality block, writing y into the same span of
    // the output
    fn compute_dual_step_direction(&self, step_direction: &mut [T], active_set: &ActiveSet) {
        let eq = active_set.num_equalities;
        let size = active_set.size;
        let d = self.R.col_slice(size);

        for i in (eq..size).rev() {
            let mut sum = -d[i];
            for j in (i + 1)..size {
                sum -= self.R[(i, j)] * step_direction[j];
            }
            step_direction[i] = sum / self.R[(i, i)];
        }
    }

    // rotate the pair of R entries zeroing the second, returning the
    // transform for replay against J and other R ranges
    fn rotate_in_r(&mut self, first: (usize, usize), second: (usize, usize)) -> GivensRotation<T> {
        let mut a = self.R[first];
        let mut b = self.R[second];
        let givens = GivensRotation::compute_and_apply(&mut a, &mut b, T::zero());
        self.R[first] = a;
        self.R[second] = b;
        givens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // activate the two coordinate axes of a 3-variable identity-Hessian
    // problem and verify R stays triangular and J tracks the null space
    #[test]
    fn test_update_and_downdate() {
        let n = 3;
        let mut L = Matrix::<f64>::identity(n);
        cholesky_factorize(&mut L).unwrap();
        let mut hessian = Hessian::cholesky_factor(L);

        let mut active_set = ActiveSet::default();
        active_set.initialize(n);

        let mut fac = FactorizationData::<f64>::default();
        fac.initialize(&mut hessian, n, false);

        let mut chosen = ChosenConstraint::<f64>::default();
        chosen.reset();
        chosen.index = 0;
        chosen.is_simple = true;
        chosen.is_lower = false;

        let mut dual_step = vec![0.0; n];
        fac.compute_inequality_dual_step(&mut dual_step, &chosen, &Matrix::zeros((0, 0)), &active_set);
        assert!(fac.update(0, true, 1e-12));
        active_set.add_inequality(0);

        chosen.index = 1;
        fac.compute_inequality_dual_step(&mut dual_step, &chosen, &Matrix::zeros((0, 0)), &active_set);
        assert!(fac.update(1, true, 1e-12));
        active_set.add_inequality(1);

        // re-activating a dependent gradient must fail the pivot test
        chosen.index = 0;
        fac.compute_inequality_dual_step(&mut dual_step, &chosen, &Matrix::zeros((0, 0)), &active_set);
        assert!(!fac.update(2, true, 1e-12));

        // drop the first and the factor block stays usable
        fac.downdate(0, active_set.size);
        active_set.remove_inequality(0);
        assert!(fac.R[(0, 0)].abs() > 1e-12);
    }
}
