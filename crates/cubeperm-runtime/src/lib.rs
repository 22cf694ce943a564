#![warn(missing_docs)]

//! Launch plumbing shared by cubeperm kernels.
//!
//! Kernels are written and launched with [cubecl](cubecl). This crate holds what sits around a
//! launch: the [global configuration](config::GlobalConfig), the [logger](EngineLogger), and the
//! [limits](LaunchLimits) a launch geometry is checked against before anything is enqueued.

/// Global configuration module.
pub mod config;

mod logging;
mod properties;
mod validation;

pub use logging::*;
pub use properties::*;
pub use validation::*;
