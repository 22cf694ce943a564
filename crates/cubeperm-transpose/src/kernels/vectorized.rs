use cubecl::prelude::*;
use cubecl::server::Handle;

use super::generic::strides_arg;
use crate::CoalescedProblem;

/// Lanes of the 16-byte line the vectorized kernel moves, whatever the element width.
const LINE_SIZE: u8 = 4;

/// Copies 16-byte vectors of a rank-4 problem whose innermost axis stays in place.
///
/// Cube `(x, y)` covers input coordinates `(y, x, .., ..)` and unit `(x, y)` the vector `x` of
/// row `y` of that plane. Strides are in elements, so offsets are divided by the vectorization.
#[cube(launch)]
fn transpose_vectorized_4d_kernel(
    input: &Array<Line<u32>>,
    output: &mut Array<Line<u32>>,
    in_strides: Sequence<u32>,
    out_strides: Sequence<u32>,
    num_vectors: u32,
    #[comptime] vectorization: u32,
) {
    let input_index = (CUBE_POS_Y * *in_strides.index(0)
        + CUBE_POS_X * *in_strides.index(1)
        + UNIT_POS_Y * *in_strides.index(2))
        / vectorization
        + UNIT_POS_X * *in_strides.index(3);

    let output_index = (CUBE_POS_Y * *out_strides.index(0)
        + CUBE_POS_X * *out_strides.index(1)
        + UNIT_POS_Y * *out_strides.index(2))
        / vectorization
        + UNIT_POS_X * *out_strides.index(3);

    if input_index < num_vectors && output_index < num_vectors {
        output[output_index] = input[input_index];
    }
}

/// Launch the vectorized kernel on a rank-4 problem with `vectorization` elements per vector.
pub fn launch_vectorized_4d<R: Runtime>(
    client: &ComputeClient<R::Server>,
    cube_count: CubeCount,
    cube_dim: CubeDim,
    problem: &CoalescedProblem,
    vectorization: usize,
    input: &Handle,
    output: &Handle,
) {
    let num_vectors = problem.num_elements() / vectorization;
    let num_words = num_vectors * LINE_SIZE as usize;

    // Both handles were checked to hold the problem, which is a whole number of vectors.
    let (input, output) = unsafe {
        (
            ArrayArg::from_raw_parts::<u32>(input, num_words, LINE_SIZE),
            ArrayArg::from_raw_parts::<u32>(output, num_words, LINE_SIZE),
        )
    };

    transpose_vectorized_4d_kernel::launch::<R>(
        client,
        cube_count,
        cube_dim,
        input,
        output,
        strides_arg(&problem.in_strides),
        strides_arg(&problem.inverse_out_strides()),
        ScalarArg::new(num_vectors as u32),
        vectorization as u32,
    );
}
