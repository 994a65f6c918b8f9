use crate::algebra::FloatT;

/// Classification of every constraint, indexed by global constraint index
/// (simple bounds first, then general constraint rows).
///
/// A constraint is anything other than `Inactive` exactly when its index
/// appears in the active-set registry; equalities stay active for the whole
/// solve.
#[repr(u8)]
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum ConstraintStatus {
    /// Not yet classified
    #[default]
    Undefined,
    /// lb > ub beyond tolerance
    Inconsistent,
    /// lb ≈ ub, activated permanently
    Equality,
    /// Inequality, currently not binding
    Inactive,
    /// Inequality binding at its lower bound
    ActiveLowerBound,
    /// Inequality binding at its upper bound
    ActiveUpperBound,
}

/// Per-iteration scratch describing the constraint currently being worked
/// on.   Reset at the start of each selection; the sign of `violation`
/// encodes which side is violated (negative = below the lower bound).
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ChosenConstraint<T> {
    /// signed excess beyond the nearest violated bound
    pub violation: T,
    /// dual value accumulated over partial steps before activation
    pub dual: T,
    /// global constraint index
    pub index: usize,
    /// row in the general constraint matrix, when not a simple bound
    pub general_index: usize,
    pub is_lower: bool,
    pub is_simple: bool,
}

impl<T> ChosenConstraint<T>
where
    T: FloatT,
{
    pub fn reset(&mut self) {
        self.violation = T::zero();
        self.dual = T::zero();
        self.index = 0;
        self.general_index = 0;
        self.is_lower = true;
        self.is_simple = false;
    }
}
