use super::{FloatT, Matrix};
use thiserror::Error;

/// Error type returned by sparse matrix checking operations.
#[derive(Error, Debug)]
pub enum SparseFormatError {
    /// Matrix dimension fields and/or array lengths are incompatible
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    /// Data is not sorted by row index within each column
    #[error("Data is not sorted by row index within each column")]
    BadRowOrdering,
    /// Row value exceeds the matrix row dimension
    #[error("Row value exceeds the matrix row dimension")]
    BadRowval,
    /// Matrix column pointer values are defective
    #[error("Bad column pointer values")]
    BadColptr,
}

/// Sparse matrix in standard Compressed Sparse Column (CSC) format.
///
/// Accepted as an input form for the general constraint matrix only.  The
/// solver densifies it on entry and exploits no sparsity.
#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// CSC format column pointer, length `n+1`
    pub colptr: Vec<usize>,
    /// vector of row indices
    pub rowval: Vec<usize>,
    /// vector of non-zero matrix elements
    pub nzval: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        let out = CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        };
        debug_assert!(out.check_format().is_ok());
        out
    }

    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// Sanity check the matrix contents.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.colptr.len() != self.n + 1 {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr[0] != 0
            || self.rowval.len() != self.nnz()
            || self.nzval.len() != self.nnz()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        // check for colptr monotonicity
        if self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        // check for row values exceeding row count
        if self.rowval.iter().any(|&r| r >= self.m) {
            return Err(SparseFormatError::BadRowval);
        }

        // check for row values strictly increasing within each column
        for col in self.colptr.windows(2) {
            let rng = col[0]..col[1];
            if self.rowval[rng].windows(2).any(|r| r[0] >= r[1]) {
                return Err(SparseFormatError::BadRowOrdering);
            }
        }

        Ok(())
    }

    /// Write the dense equivalent into `M`, which is resized to match.
    pub fn to_dense_into(&self, M: &mut Matrix<T>) {
        M.resize((self.m, self.n));
        for col in 0..self.n {
            for idx in self.colptr[col]..self.colptr[col + 1] {
                M[(self.rowval[idx], col)] = self.nzval[idx];
            }
        }
    }
}
