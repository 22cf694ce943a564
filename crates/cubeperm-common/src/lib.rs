//! # Common utilities for `cubeperm`
//!
//! Shape and stride containers and element types shared by the runtime, the matrix routines
//! and the permutation kernels.

mod dtype;
mod shape;

pub use dtype::*;
pub use shape::*;

/// Reexport for use in macros
pub use smallvec::{SmallVec, smallvec};
