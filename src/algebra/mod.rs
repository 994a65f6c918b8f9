//! Numeric substrate for the solver: scalar traits, slice math, dense and
//! sparse matrix containers and the dense factorization kernels.

mod cholesky;
mod floats;
mod givens;
mod inverse;
mod matrix;
mod sparse;
mod vecmath;

pub use cholesky::*;
pub use floats::*;
pub use givens::*;
pub use inverse::*;
pub use matrix::*;
pub use sparse::*;
pub use vecmath::*;
