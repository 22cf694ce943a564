use cubecl::prelude::*;
use cubecl::server::Handle;

use crate::{BLOCK_ROWS, CoalescedProblem, TILE_DIM};

const TILE: u32 = TILE_DIM as u32;
const ROWS: u32 = BLOCK_ROWS as u32;
const PASSES: u32 = TILE / ROWS;
// One padding element per row keeps a tile column off a single shared memory bank.
const TILE_STRIDE: u32 = TILE + 1;
const TILE_SIZE: u32 = TILE * TILE_STRIDE;

/// Swaps the two inner axes of a rank-3 problem through shared memory tiles.
///
/// Cube `(x, y, z)` transposes the tile at column block `x` and row block `y` of slice `z`. The
/// tile is loaded with coalesced reads in the first phase and written back transposed with
/// coalesced writes in the second.
#[cube(launch)]
fn transpose_tiled_3d_kernel<E: CubePrimitive>(
    input: &Array<E>,
    output: &mut Array<E>,
    rows: u32,
    cols: u32,
) {
    let mut tile = SharedMemory::<E>::new(TILE_SIZE);

    let slice = CUBE_POS_Z * rows * cols;
    let block_row = CUBE_POS_Y * TILE;
    let block_col = CUBE_POS_X * TILE;

    #[unroll]
    for pass in 0..PASSES {
        let row = UNIT_POS_Y + pass * ROWS;
        tile[row * TILE_STRIDE + UNIT_POS_X] =
            input[slice + (block_row + row) * cols + block_col + UNIT_POS_X];
    }

    sync_cube();

    #[unroll]
    for pass in 0..PASSES {
        let row = UNIT_POS_Y + pass * ROWS;
        output[slice + (block_col + row) * rows + block_row + UNIT_POS_X] =
            tile[UNIT_POS_X * TILE_STRIDE + row];
    }
}

/// Launch the tiled kernel moving elements of type `E`.
pub fn launch_tiled_3d<E: CubePrimitive, R: Runtime>(
    client: &ComputeClient<R::Server>,
    cube_count: CubeCount,
    cube_dim: CubeDim,
    problem: &CoalescedProblem,
    input: &Handle,
    output: &Handle,
) {
    let num_elements = problem.num_elements();
    let dims = &problem.in_shape;

    // Both handles were checked to hold `num_elements` elements of `E`.
    let (input, output) = unsafe {
        (
            ArrayArg::from_raw_parts::<E>(input, num_elements, 1),
            ArrayArg::from_raw_parts::<E>(output, num_elements, 1),
        )
    };

    transpose_tiled_3d_kernel::launch::<E, R>(
        client,
        cube_count,
        cube_dim,
        input,
        output,
        ScalarArg::new(dims[1] as u32),
        ScalarArg::new(dims[2] as u32),
    );
}
