/// Ordered registry of active constraint indices.
///
/// Capacity equals the primal dimension: independent constraint gradients
/// in ℝⁿ number at most n.   Entries are partitioned into a permanent
/// equality prefix followed by a removable inequality suffix; removal
/// preserves the relative order of survivors.
#[derive(Debug, Default)]
pub(crate) struct ActiveSet {
    indices: Vec<usize>,
    pub size: usize,
    pub num_equalities: usize,
    pub num_inequalities: usize,
}

impl ActiveSet {
    pub fn initialize(&mut self, max_size: usize) {
        self.indices.clear();
        self.indices.resize(max_size, 0);
        self.size = 0;
        self.num_equalities = 0;
        self.num_inequalities = 0;
    }

    pub fn reserve(&mut self, max_size: usize) {
        if self.indices.len() < max_size {
            self.indices.resize(max_size, 0);
        }
    }

    pub fn index(&self, position: usize) -> usize {
        self.indices[position]
    }

    pub fn has_free_capacity(&self) -> bool {
        self.size < self.indices.len()
    }

    pub fn add_equality(&mut self, index: usize) {
        self.indices[self.size] = index;
        self.size += 1;
        self.num_equalities += 1;
    }

    pub fn add_inequality(&mut self, index: usize) {
        self.indices[self.size] = index;
        self.size += 1;
        self.num_inequalities += 1;
    }

    /// `position` must refer to an inequality, i.e. lie in the suffix.
    pub fn remove_inequality(&mut self, position: usize) {
        debug_assert!(position >= self.num_equalities && position < self.size);
        if self.size - position > 1 {
            // deactivated constraint is not the last one added
            self.indices.copy_within((position + 1)..self.size, position);
        }
        self.size -= 1;
        self.num_inequalities -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_and_removal() {
        let mut set = ActiveSet::default();
        set.initialize(4);
        assert!(set.has_free_capacity());

        set.add_equality(7);
        set.add_inequality(2);
        set.add_inequality(5);
        set.add_inequality(9);
        assert_eq!(set.size, 4);
        assert_eq!(set.num_equalities + set.num_inequalities, set.size);
        assert!(!set.has_free_capacity());

        // remove from the middle of the inequality suffix
        set.remove_inequality(2);
        assert_eq!(set.size, 3);
        assert_eq!(
            (set.index(0), set.index(1), set.index(2)),
            (7, 2, 9) // survivor order preserved
        );

        // remove the last entry
        set.remove_inequality(2);
        assert_eq!((set.index(0), set.index(1)), (7, 2));
        assert_eq!(set.num_equalities, 1);
        assert_eq!(set.num_inequalities, 1);
        assert!(set.has_free_capacity());
    }

    #[test]
    fn test_reinitialize_clears() {
        let mut set = ActiveSet::default();
        set.initialize(3);
        set.add_equality(1);
        set.initialize(3);
        assert_eq!(set.size, 0);
        assert_eq!(set.num_equalities, 0);
    }
}
