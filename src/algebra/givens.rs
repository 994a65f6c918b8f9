use super::{FloatT, Matrix};

/// Outcome of a Givens rotation computation.
///
/// The degenerate cases avoid both needless arithmetic and division by a
/// near-zero pivot: when `b` is already (numerically) zero nothing needs to
/// be done, and when only `a` is zero an exchange of the two components
/// zeroes `b` exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GivensType {
    /// General rotation
    Nontrivial,
    /// |b| ≤ eps: identity
    Copy,
    /// |a| ≤ eps < |b|: exchange components
    Swap,
}

/// A Givens rotation
///
/// ```text
///  [  cos, sin ]       [ a ]       [ d ]
///  [           ]   *   [   ]   =   [   ]
///  [ -sin, cos ]       [ b ]       [ 0 ]
/// ```
///
/// computed once for a pair (a, b) and then replayed against arbitrary row
/// or column ranges of a matrix.
#[derive(Debug, Clone, Copy)]
pub struct GivensRotation<T> {
    kind: GivensType,
    cos: T,
    sin: T,
}

impl<T> GivensRotation<T>
where
    T: FloatT,
{
    /// Compute the transform zeroing `b`, applying it to (a, b) in place.
    ///
    /// The rotation is formed with a scaled hypotenuse to avoid overflow,
    /// and its sign is matched to `a` so the new leading component keeps
    /// the sign of the old one.
    pub fn compute_and_apply(a: &mut T, b: &mut T, eps: T) -> Self {
        let abs_b = b.abs();

        if abs_b > eps {
            let abs_a = a.abs();

            if abs_a > eps {
                let mut t;
                if abs_a > abs_b {
                    t = abs_b / abs_a;
                    t = abs_a * (T::one() + t * t).sqrt();
                } else {
                    t = abs_a / abs_b;
                    t = abs_b * (T::one() + t * t).sqrt();
                }
                t = t.copysign(*a);

                let cos = *a / t;
                let sin = *b / t;

                *a = t;
                *b = T::zero();

                Self {
                    kind: GivensType::Nontrivial,
                    cos,
                    sin,
                }
            } else {
                std::mem::swap(a, b);
                Self {
                    kind: GivensType::Swap,
                    cos: T::zero(),
                    sin: T::one(),
                }
            }
        } else {
            Self {
                kind: GivensType::Copy,
                cos: T::one(),
                sin: T::zero(),
            }
        }
    }

    pub fn kind(&self) -> GivensType {
        self.kind
    }

    /// Replay the transform against a single pair.
    pub fn apply(&self, a: &mut T, b: &mut T) {
        match self.kind {
            GivensType::Copy => (),
            GivensType::Swap => std::mem::swap(a, b),
            GivensType::Nontrivial => self.apply_nontrivial(a, b),
        }
    }

    /// Replay the transform against rows `start..end` of two columns of `M`.
    pub fn apply_column_wise(
        &self,
        M: &mut Matrix<T>,
        start: usize,
        end: usize,
        column_1: usize,
        column_2: usize,
    ) {
        if self.kind == GivensType::Copy {
            return;
        }
        let (c1, c2) = M.col_slices_mut(column_1, column_2);
        match self.kind {
            GivensType::Copy => (),
            GivensType::Swap => c1[start..end].swap_with_slice(&mut c2[start..end]),
            GivensType::Nontrivial => {
                for (a, b) in c1[start..end].iter_mut().zip(c2[start..end].iter_mut()) {
                    self.apply_nontrivial(a, b);
                }
            }
        }
    }

    /// Replay the transform against columns `start..end` of two rows of `M`.
    pub fn apply_row_wise(
        &self,
        M: &mut Matrix<T>,
        start: usize,
        end: usize,
        row_1: usize,
        row_2: usize,
    ) {
        if self.kind == GivensType::Copy {
            return;
        }
        for col in start..end {
            let mut a = M[(row_1, col)];
            let mut b = M[(row_2, col)];
            self.apply(&mut a, &mut b);
            M[(row_1, col)] = a;
            M[(row_2, col)] = b;
        }
    }

    #[inline]
    fn apply_nontrivial(&self, a: &mut T, b: &mut T) {
        let t1 = *a;
        let t2 = *b;
        *a = t1 * self.cos + t2 * self.sin;
        *b = self.cos * t2 - self.sin * t1;
    }
}
