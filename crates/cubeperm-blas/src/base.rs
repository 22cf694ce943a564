use cubecl::prelude::*;
use cubecl::server::Handle;
use cubeperm_runtime::{
    EngineLogger, LaunchLimits, config::launch::LaunchLogLevel, validate_index, validate_launch,
};
use num_traits::Zero;

use crate::{BlasError, BlasFloat, kernel::geam_kernel};

const GEAM_CUBE_DIM_X: u32 = 32;
const GEAM_CUBE_DIM_Y: u32 = 8;

/// Operation applied to a matrix operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Use the matrix as is (`N`).
    NoTranspose,
    /// Use the transposed matrix (`T`).
    Transpose,
}

impl Operation {
    // Rows and columns of the stored matrix holding an `m x n` operand.
    fn stored_dims(self, m: usize, n: usize) -> (usize, usize) {
        match self {
            Operation::NoTranspose => (m, n),
            Operation::Transpose => (n, m),
        }
    }

    fn is_transposed(self) -> bool {
        matches!(self, Operation::Transpose)
    }
}

/// Handle to the BLAS routines of one client.
pub struct BlasHandle<R: Runtime> {
    client: ComputeClient<R::Server>,
    limits: LaunchLimits,
}

impl<R: Runtime> Clone for BlasHandle<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            limits: self.limits,
        }
    }
}

impl<R: Runtime> core::fmt::Debug for BlasHandle<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BlasHandle")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl<R: Runtime> BlasHandle<R> {
    /// Create a handle launching on the given client.
    pub fn new(client: ComputeClient<R::Server>) -> Self {
        let limits = LaunchLimits::from_client::<R>(&client);

        Self { client, limits }
    }

    /// Create a handle sizing its launches for the given limits instead of the device ones.
    pub fn with_limits(client: ComputeClient<R::Server>, limits: LaunchLimits) -> Self {
        Self { client, limits }
    }

    /// The client the routines launch on.
    pub fn client(&self) -> &ComputeClient<R::Server> {
        &self.client
    }

    /// The limits launches are sized for.
    pub fn limits(&self) -> &LaunchLimits {
        &self.limits
    }

    /// Computes `C = alpha * op(A) + beta * op(B)` where `C` is `m x n`, column-major.
    ///
    /// `lda`, `ldb` and `ldc` are the leading dimensions of the stored matrices. When `beta` is
    /// zero `B` isn't read, so it may be any buffer, including `A`. `C` must not overlap an
    /// operand that is read.
    ///
    /// Like the routine it models, the call is asynchronous: it returns once the work is queued.
    #[allow(clippy::too_many_arguments)]
    pub fn geam<F: BlasFloat>(
        &self,
        transa: Operation,
        transb: Operation,
        m: usize,
        n: usize,
        alpha: F,
        a: &Handle,
        lda: usize,
        beta: F,
        b: &Handle,
        ldb: usize,
        c: &Handle,
        ldc: usize,
    ) -> Result<(), BlasError> {
        check_leading_dim("lda", transa, m, n, lda)?;
        check_leading_dim("ldb", transb, m, n, ldb)?;
        check_leading_dim("ldc", Operation::NoTranspose, m, n, ldc)?;

        if m == 0 || n == 0 {
            return Ok(());
        }

        let read_b = !Zero::is_zero(&beta);

        let len_a = check_buffer::<F>("a", a, transa, m, n, lda)?;
        let len_c = check_buffer::<F>("c", c, Operation::NoTranspose, m, n, ldc)?;
        let len_b = match read_b {
            true => check_buffer::<F>("b", b, transb, m, n, ldb)?,
            false => len_a,
        };

        let (cube_count, cube_dim) = self.geometry(m, n);
        validate_launch(&self.limits, cube_count, cube_dim, 0)?;

        log::trace!(
            "{} m={m} n={n} transa={transa:?} transb={transb:?} read_b={read_b}",
            F::GEAM
        );
        EngineLogger::global().log_launch(LaunchLogLevel::Basic, || {
            format!("[Launch] {} cube_count={cube_count:?} cube_dim={cube_dim:?}", F::GEAM)
        });

        // `B` isn't read without `beta`, `A` is bound in its place.
        let b = if read_b { b } else { a };

        // Every buffer was checked to hold the elements its operation reaches.
        let (a, b, c) = unsafe {
            (
                ArrayArg::from_raw_parts::<F>(a, len_a, 1),
                ArrayArg::from_raw_parts::<F>(b, len_b, 1),
                ArrayArg::from_raw_parts::<F>(c, len_c, 1),
            )
        };

        geam_kernel::launch::<F, R>(
            &self.client,
            CubeCount::Static(cube_count.0, cube_count.1, cube_count.2),
            CubeDim::new(cube_dim.0, cube_dim.1, cube_dim.2),
            a,
            b,
            c,
            ScalarArg::new(alpha),
            ScalarArg::new(beta),
            ScalarArg::new(m as u32),
            ScalarArg::new(n as u32),
            ScalarArg::new(lda as u32),
            ScalarArg::new(ldb as u32),
            ScalarArg::new(ldc as u32),
            transa.is_transposed(),
            transb.is_transposed(),
            read_b,
        );

        Ok(())
    }

    fn geometry(&self, m: usize, n: usize) -> ((u32, u32, u32), (u32, u32, u32)) {
        let limits = &self.limits;
        let max_units = Ord::max(limits.max_units_per_cube, 1);

        let dim_x = Ord::max(
            Ord::min(Ord::min(GEAM_CUBE_DIM_X, limits.max_cube_dim.0), max_units),
            1,
        );
        let dim_y = Ord::max(
            Ord::min(Ord::min(GEAM_CUBE_DIM_Y, limits.max_cube_dim.1), max_units / dim_x),
            1,
        );

        let count = |len: usize, dim: u32, max: u32| {
            let cubes = len.div_ceil(dim as usize);
            Ord::max(Ord::min(u32::try_from(cubes).unwrap_or(u32::MAX), max), 1)
        };

        (
            (
                count(m, dim_x, limits.max_cube_count.0),
                count(n, dim_y, limits.max_cube_count.1),
                1,
            ),
            (dim_x, dim_y, 1),
        )
    }
}

fn check_leading_dim(
    argument: &'static str,
    op: Operation,
    m: usize,
    n: usize,
    ld: usize,
) -> Result<(), BlasError> {
    let (rows, _) = op.stored_dims(m, n);
    let min = rows.max(1);

    if ld < min {
        return Err(BlasError::invalid(
            argument,
            format!("got {ld}, must be at least {min}"),
        ));
    }

    Ok(())
}

// Returns the number of elements the buffer holds.
fn check_buffer<F: BlasFloat>(
    argument: &'static str,
    handle: &Handle,
    op: Operation,
    m: usize,
    n: usize,
    ld: usize,
) -> Result<usize, BlasError> {
    let (rows, cols) = op.stored_dims(m, n);
    let required = (cols - 1) * ld + rows;
    let available = handle.size() as usize / size_of::<F>();

    if available < required {
        return Err(BlasError::invalid(
            argument,
            format!("buffer holds {available} elements, {required} required"),
        ));
    }

    validate_index(required)?;

    Ok(available.min(u32::MAX as usize))
}
