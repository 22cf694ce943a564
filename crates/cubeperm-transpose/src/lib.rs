//! Permutes the axes of dense row-major tensors.
//!
//! A permutation first tries the matrix transpose fast path, which hands 2D-equivalent problems
//! to [`BlasHandle::geam`](cubeperm_blas::BlasHandle::geam). Every other problem is
//! [coalesced](coalesce()) into its lowest equivalent rank, then executed by the kernel the
//! [selector](select_plan) picks for it: a vectorized rank-4 kernel, a shared memory tiled
//! rank-3 kernel, or the generic strided kernel.

#[macro_use]
extern crate derive_new;

mod base;
mod coalesce;
mod error;
mod fast_path;
mod op;
mod options;
mod strategy;
mod tensor;

/// Permutation kernels.
pub mod kernels;

pub use base::*;
pub use coalesce::*;
pub use error::*;
pub use fast_path::*;
pub use op::*;
pub use options::*;
pub use strategy::*;
pub use tensor::*;
