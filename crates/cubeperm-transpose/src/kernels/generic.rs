use cubecl::prelude::*;
use cubecl::server::Handle;
use cubecl_std::{FastDivmod, FastDivmodArgs};

use crate::CoalescedProblem;

/// Largest element count the fast division is exact for.
///
/// Beyond it the wide kernel divides with plain integer division.
pub const FAST_DIVMOD_MAX_ELEMENTS: usize = i32::MAX as usize;

/// Copies one output element per unit, for any rank.
///
/// The flat output index is split into coordinates by the output strides, most significant axis
/// first, and each coordinate moves the input index by the stride of the input axis it came
/// from. Units stride by the grid size, so any grid covers the output.
#[cube(launch)]
fn transpose_generic_kernel<E: CubePrimitive>(
    input: &Array<E>,
    output: &mut Array<E>,
    out_strides: Sequence<FastDivmod>,
    in_strides: Sequence<u32>,
    num_elements: u32,
) {
    let rank = comptime![out_strides.len()];
    let step = CUBE_COUNT * CUBE_DIM;
    let mut index = ABSOLUTE_POS;

    while index < num_elements {
        let mut remainder = index;
        let mut offset = 0;

        #[unroll]
        for axis in 0..rank {
            let (coordinate, rest) = out_strides.index(axis).div_mod(remainder);
            offset += coordinate * *in_strides.index(axis);
            remainder = rest;
        }

        output[index] = input[offset];

        if step >= num_elements - index {
            break;
        }
        index += step;
    }
}

/// Same walk as [`transpose_generic_kernel`] with plain integer division.
#[cube(launch)]
fn transpose_generic_wide_kernel<E: CubePrimitive>(
    input: &Array<E>,
    output: &mut Array<E>,
    out_strides: Sequence<u32>,
    in_strides: Sequence<u32>,
    num_elements: u32,
) {
    let rank = comptime![out_strides.len()];
    let step = CUBE_COUNT * CUBE_DIM;
    let mut index = ABSOLUTE_POS;

    while index < num_elements {
        let mut remainder = index;
        let mut offset = 0;

        #[unroll]
        for axis in 0..rank {
            let stride = *out_strides.index(axis);
            offset += remainder / stride * *in_strides.index(axis);
            remainder %= stride;
        }

        output[index] = input[offset];

        if step >= num_elements - index {
            break;
        }
        index += step;
    }
}

/// Launch the generic kernel moving elements of type `E`.
///
/// Every index and stride of `problem` must fit in `u32`.
pub fn launch_generic<E: CubePrimitive, R: Runtime>(
    client: &ComputeClient<R::Server>,
    cube_count: CubeCount,
    cube_dim: CubeDim,
    problem: &CoalescedProblem,
    input: &Handle,
    output: &Handle,
) {
    let num_elements = problem.num_elements();
    let in_strides = strides_arg(&problem.permuted_in_strides());

    // Both handles were checked to hold `num_elements` elements of `E`.
    let (input, output) = unsafe {
        (
            ArrayArg::from_raw_parts::<E>(input, num_elements, 1),
            ArrayArg::from_raw_parts::<E>(output, num_elements, 1),
        )
    };

    if num_elements > FAST_DIVMOD_MAX_ELEMENTS {
        transpose_generic_wide_kernel::launch::<E, R>(
            client,
            cube_count,
            cube_dim,
            input,
            output,
            strides_arg(&problem.out_strides),
            in_strides,
            ScalarArg::new(num_elements as u32),
        );
    } else {
        let out_strides = problem
            .out_strides
            .iter()
            .map(|&stride| FastDivmodArgs::new(client, stride as u32))
            .collect();

        transpose_generic_kernel::launch::<E, R>(
            client,
            cube_count,
            cube_dim,
            input,
            output,
            SequenceArg {
                values: out_strides,
            },
            in_strides,
            ScalarArg::new(num_elements as u32),
        );
    }
}

pub(crate) fn strides_arg<'a, R: Runtime>(strides: &[usize]) -> SequenceArg<'a, R, u32> {
    SequenceArg {
        values: strides
            .iter()
            .map(|&stride| ScalarArg::new(stride as u32))
            .collect(),
    }
}
