/// Launch config module.
pub mod launch;
/// Transpose config module.
pub mod transpose;

mod base;
mod logger;

pub use base::*;
pub use logger::*;
