mod generic;
mod tiled;
mod vectorized;

pub use generic::{FAST_DIVMOD_MAX_ELEMENTS, launch_generic};
pub use tiled::*;
pub use vectorized::*;

use cubecl::prelude::*;
use cubecl::server::Handle;
use cubeperm_common::ElemWidth;
use cubeperm_runtime::{
    EngineLogger, LaunchError, LaunchLimits, config::launch::LaunchLogLevel, validate_index,
    validate_launch,
};

use crate::{CoalescedProblem, ExecutionPlan};

// Only the width of an element matters to a copy, so every element moves as the unsigned
// integer of its width.
macro_rules! dispatch_width {
    ($width:expr, $word:ident => $body:expr) => {
        match $width {
            ElemWidth::Bits8 => {
                type $word = u8;
                $body
            }
            ElemWidth::Bits16 => {
                type $word = u16;
                $body
            }
            ElemWidth::Bits32 => {
                type $word = u32;
                $body
            }
            ElemWidth::Bits64 => {
                type $word = u64;
                $body
            }
        }
    };
}

/// Launch the kernel of `plan` copying `input` to `output`.
///
/// The geometry is checked against `limits` first, so an error means nothing was enqueued.
pub fn launch_plan<R: Runtime>(
    client: &ComputeClient<R::Server>,
    limits: &LaunchLimits,
    plan: &ExecutionPlan,
    problem: &CoalescedProblem,
    width: ElemWidth,
    input: &Handle,
    output: &Handle,
) -> Result<(), LaunchError> {
    validate_index(problem.num_elements())?;
    validate_launch(
        limits,
        plan.cube_count(),
        plan.cube_dim(),
        plan.shared_memory(width),
    )?;

    let logger = EngineLogger::global();
    logger.log_launch(LaunchLogLevel::Basic, || {
        format!(
            "[Launch] {} cube_count={:?} cube_dim={:?}",
            plan.strategy(),
            plan.cube_count(),
            plan.cube_dim(),
        )
    });
    logger.log_launch(LaunchLogLevel::Full, || {
        format!(
            "[Launch] {} shape={:?} perm={:?} width={} bytes",
            plan.strategy(),
            &problem.in_shape[..],
            problem.perm.as_slice(),
            width.size(),
        )
    });

    let (x, y, z) = plan.cube_count();
    let cube_count = CubeCount::Static(x, y, z);
    let (x, y, z) = plan.cube_dim();
    let cube_dim = CubeDim::new(x, y, z);

    match plan {
        ExecutionPlan::Vectorized4D { vectorization, .. } => launch_vectorized_4d::<R>(
            client,
            cube_count,
            cube_dim,
            problem,
            *vectorization,
            input,
            output,
        ),
        ExecutionPlan::Tiled3D { .. } => dispatch_width!(width, W => {
            launch_tiled_3d::<W, R>(client, cube_count, cube_dim, problem, input, output)
        }),
        ExecutionPlan::Generic { .. } => dispatch_width!(width, W => {
            launch_generic::<W, R>(client, cube_count, cube_dim, problem, input, output)
        }),
    }

    Ok(())
}
