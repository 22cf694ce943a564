//! Dense matrix routines in the style of a vendor BLAS handle.
//!
//! Only `geam` (`C = alpha * op(A) + beta * op(B)`) is provided. Matrices are column-major and
//! described by their leading dimension, like the routines they stand in for. The routine is a
//! [cubecl](cubecl) kernel, so it runs on any cubecl runtime.

mod base;
mod error;
mod float;
mod kernel;

pub use base::*;
pub use error::*;
pub use float::*;
