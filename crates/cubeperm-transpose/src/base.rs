use cubecl::{Runtime, client::ComputeClient};
use cubeperm_blas::BlasHandle;
use cubeperm_common::MAX_RANK;
use cubeperm_runtime::{EngineLogger, LaunchLimits};

use crate::{
    TensorHandle, TransposeError, TransposeOptions, TransposeStrategy, coalesce,
    fast_path::launch_matrix_transpose, kernels::launch_plan, select_plan, try_matrix_transpose,
};

/// A submitted permutation.
///
/// The copy may still be running when this is returned, [wait](TransposeExecution::wait) or sync
/// the client before reading the output.
pub struct TransposeExecution<R: Runtime> {
    strategy: TransposeStrategy,
    client: Option<ComputeClient<R::Server>>,
}

impl<R: Runtime> core::fmt::Debug for TransposeExecution<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransposeExecution")
            .field("strategy", &self.strategy)
            .field("submitted", &self.client.is_some())
            .finish()
    }
}

impl<R: Runtime> TransposeExecution<R> {
    fn noop() -> Self {
        Self {
            strategy: TransposeStrategy::Noop,
            client: None,
        }
    }

    fn submitted(strategy: TransposeStrategy, client: &ComputeClient<R::Server>) -> Self {
        Self {
            strategy,
            client: Some(client.clone()),
        }
    }

    /// How the permutation is executed.
    pub fn strategy(&self) -> TransposeStrategy {
        self.strategy
    }

    /// Whether work was enqueued on the client.
    pub fn is_submitted(&self) -> bool {
        self.client.is_some()
    }

    /// Block until the copy finished.
    pub fn wait(self) {
        if let Some(client) = self.client {
            cubecl::future::block_on(client.sync());
        }
    }
}

/// Permute the axes of `input` into `output`: output axis `i` is input axis `perm[i]`.
///
/// `output` must already be allocated with the permuted input shape and must not overlap
/// `input`. Options are read from the global configuration, see [`transpose_with_options`].
pub fn transpose<R: Runtime>(
    client: &ComputeClient<R::Server>,
    blas: &BlasHandle<R>,
    perm: &[usize],
    input: &TensorHandle,
    output: &TensorHandle,
) -> Result<TransposeExecution<R>, TransposeError> {
    transpose_with_options(
        client,
        blas,
        perm,
        input,
        output,
        &TransposeOptions::from_config(),
    )
}

/// Permute the axes of `input` into `output` with explicit options.
///
/// Every check happens before anything is submitted, so an error means nothing was launched.
pub fn transpose_with_options<R: Runtime>(
    client: &ComputeClient<R::Server>,
    blas: &BlasHandle<R>,
    perm: &[usize],
    input: &TensorHandle,
    output: &TensorHandle,
    options: &TransposeOptions,
) -> Result<TransposeExecution<R>, TransposeError> {
    input.shape.check_rank(MAX_RANK)?;
    let expected = input.shape.permuted(perm)?;

    if output.shape != expected {
        return Err(TransposeError::ShapeMismatch {
            expected,
            actual: output.shape.clone(),
        });
    }

    if input.dtype != output.dtype {
        return Err(TransposeError::DTypeMismatch {
            input: input.dtype,
            output: output.dtype,
        });
    }

    input.check_layout()?;
    output.check_layout()?;

    if input.numel() == 0 {
        log::trace!("Transpose of empty tensor {:?} skipped", &input.shape[..]);
        return Ok(TransposeExecution::noop());
    }

    if options.matrix_fast_path {
        if let Some(shape) = try_matrix_transpose(perm, &input.shape) {
            if launch_matrix_transpose(blas, shape, input, output)? {
                let strategy = TransposeStrategy::from(shape);
                log_strategy(perm, input, strategy);

                return Ok(TransposeExecution::submitted(strategy, client));
            }
        }
    }

    let width = input
        .dtype
        .width()
        .ok_or(TransposeError::UnsupportedElementSize {
            size: input.elem_size(),
        })?;

    let limits = LaunchLimits::from_client::<R>(client);
    let problem = coalesce(perm, &input.shape, &output.shape);
    let plan = select_plan(&problem, width, &limits, options);
    log::debug!(
        "Coalesced {:?} with perm {:?} into {:?} with perm {:?}, {:?}",
        &input.shape[..],
        perm,
        &problem.in_shape[..],
        problem.perm.as_slice(),
        plan,
    );

    launch_plan::<R>(
        client,
        &limits,
        &plan,
        &problem,
        width,
        &input.handle,
        &output.handle,
    )?;

    let strategy = plan.strategy();
    log_strategy(perm, input, strategy);

    Ok(TransposeExecution::submitted(strategy, client))
}

fn log_strategy(perm: &[usize], input: &TensorHandle, strategy: TransposeStrategy) {
    EngineLogger::global().log_transpose(|| {
        format!(
            "[Transpose] {} {:?} perm {:?} => {strategy}",
            input.dtype,
            &input.shape[..],
            perm,
        )
    });
}
