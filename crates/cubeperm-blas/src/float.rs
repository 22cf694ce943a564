use cubecl::prelude::Float;
use cubeperm_common::Element;
use half::f16;
use num_traits::{One, Zero};

/// Floating point types supported by the BLAS routines.
pub trait BlasFloat: Float + Element + Zero + One {
    /// Name of the `geam` routine for this type.
    const GEAM: &'static str;
}

impl BlasFloat for f32 {
    const GEAM: &'static str = "Sgeam";
}

impl BlasFloat for f64 {
    const GEAM: &'static str = "Dgeam";
}

impl BlasFloat for f16 {
    const GEAM: &'static str = "Hgeam";
}
