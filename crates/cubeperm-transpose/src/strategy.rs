use cubeperm_common::ElemWidth;
use cubeperm_runtime::LaunchLimits;

use crate::{CoalescedProblem, MatrixTransposeShape, TransposeOptions};

/// Edge of the square tile staged in shared memory by the tiled kernel.
pub const TILE_DIM: usize = 32;
/// Rows of a tile each unit of the tiled kernel moves per pass.
pub const BLOCK_ROWS: usize = 8;
/// Units per cube of the generic kernel, when the hardware allows it.
pub const GENERIC_CUBE_DIM: u32 = 256;

/// How a permutation was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TransposeStrategy {
    /// Nothing to copy.
    #[display("noop")]
    Noop,
    /// Handed to the matrix transpose routine.
    #[display("matrix_transpose({m}x{n})")]
    MatrixTranspose {
        /// Rows of the input matrix.
        m: usize,
        /// Columns of the input matrix.
        n: usize,
    },
    /// 16-byte vectors over a rank-4 problem.
    #[display("vectorized_4d")]
    Vectorized4D,
    /// Shared memory tiles over a rank-3 problem.
    #[display("tiled_3d")]
    Tiled3D,
    /// One unit per output element.
    #[display("generic")]
    Generic,
}

impl From<MatrixTransposeShape> for TransposeStrategy {
    fn from(MatrixTransposeShape { m, n }: MatrixTransposeShape) -> Self {
        Self::MatrixTranspose { m, n }
    }
}

/// A kernel and the launch geometry it runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionPlan {
    /// One cube per `(axis 1, axis 0)` pair, one unit per `(vector of axis 3, axis 2)` pair.
    Vectorized4D {
        /// Number of cubes.
        cube_count: (u32, u32, u32),
        /// Units per cube.
        cube_dim: (u32, u32, u32),
        /// Elements per 16-byte vector.
        vectorization: usize,
    },
    /// One cube per tile of the two inner axes of each outer slice.
    Tiled3D {
        /// Number of cubes.
        cube_count: (u32, u32, u32),
        /// Units per cube.
        cube_dim: (u32, u32, u32),
    },
    /// Flat grid with one unit per output element.
    Generic {
        /// Number of cubes.
        cube_count: (u32, u32, u32),
        /// Units per cube.
        cube_dim: (u32, u32, u32),
    },
}

impl ExecutionPlan {
    /// The strategy this plan implements.
    pub fn strategy(&self) -> TransposeStrategy {
        match self {
            Self::Vectorized4D { .. } => TransposeStrategy::Vectorized4D,
            Self::Tiled3D { .. } => TransposeStrategy::Tiled3D,
            Self::Generic { .. } => TransposeStrategy::Generic,
        }
    }

    /// Number of cubes launched.
    pub fn cube_count(&self) -> (u32, u32, u32) {
        match self {
            Self::Vectorized4D { cube_count, .. }
            | Self::Tiled3D { cube_count, .. }
            | Self::Generic { cube_count, .. } => *cube_count,
        }
    }

    /// Bytes of shared memory each cube uses when moving elements of the given width.
    pub fn shared_memory(&self, width: ElemWidth) -> usize {
        match self {
            Self::Tiled3D { .. } => TILE_DIM * (TILE_DIM + 1) * width.size(),
            Self::Vectorized4D { .. } | Self::Generic { .. } => 0,
        }
    }

    /// Units per cube.
    pub fn cube_dim(&self) -> (u32, u32, u32) {
        match self {
            Self::Vectorized4D { cube_dim, .. }
            | Self::Tiled3D { cube_dim, .. }
            | Self::Generic { cube_dim, .. } => *cube_dim,
        }
    }
}

/// Pick the kernel for a coalesced problem.
///
/// The vectorized kernel is preferred, then the tiled kernel when `options` allow it. The
/// generic kernel accepts every problem, so selection never fails.
pub fn select_plan(
    problem: &CoalescedProblem,
    width: ElemWidth,
    limits: &LaunchLimits,
    options: &TransposeOptions,
) -> ExecutionPlan {
    if let Some(plan) = vectorized_4d_plan(problem, width, limits) {
        return plan;
    }

    if options.tiled_3d {
        if let Some(plan) = tiled_3d_plan(problem, width, limits) {
            return plan;
        }
    }

    generic_plan(problem.num_elements(), limits)
}

/// Whether the vectorized rank-4 kernel can run the problem.
pub fn can_use_vectorized_4d(
    problem: &CoalescedProblem,
    width: ElemWidth,
    limits: &LaunchLimits,
) -> bool {
    vectorized_4d_plan(problem, width, limits).is_some()
}

/// Whether the tiled rank-3 kernel can run the problem.
pub fn can_use_tiled_3d(
    problem: &CoalescedProblem,
    width: ElemWidth,
    limits: &LaunchLimits,
) -> bool {
    tiled_3d_plan(problem, width, limits).is_some()
}

fn vectorized_4d_plan(
    problem: &CoalescedProblem,
    width: ElemWidth,
    limits: &LaunchLimits,
) -> Option<ExecutionPlan> {
    if problem.rank() != 4 || problem.perm[3] != 3 {
        return None;
    }

    let dims = &problem.in_shape;
    let vectorization = width.vectorization();
    if dims[3] % vectorization != 0 {
        return None;
    }

    // A cube covers one (axis 2, axis 3) plane, so it must be made of full planes.
    let units_x = dims[3] / vectorization;
    let units = dims[2].checked_mul(units_x)?;
    let plane_size = limits.plane_size.max(1) as usize;
    if units == 0 || units > limits.max_units_per_cube as usize || units % plane_size != 0 {
        return None;
    }

    let cube_dim = (to_u32(units_x)?, to_u32(dims[2])?, 1);
    let cube_count = (to_u32(dims[1])?, to_u32(dims[0])?, 1);

    fits(limits, cube_count, cube_dim).then_some(ExecutionPlan::Vectorized4D {
        cube_count,
        cube_dim,
        vectorization,
    })
}

fn tiled_3d_plan(
    problem: &CoalescedProblem,
    width: ElemWidth,
    limits: &LaunchLimits,
) -> Option<ExecutionPlan> {
    if problem.perm.as_slice() != [0, 2, 1] {
        return None;
    }

    let dims = &problem.in_shape;
    if dims[1] % TILE_DIM != 0 || dims[2] % TILE_DIM != 0 {
        return None;
    }

    let cube_dim = (TILE_DIM as u32, BLOCK_ROWS as u32, 1);
    let cube_count = (
        to_u32(dims[2] / TILE_DIM)?,
        to_u32(dims[1] / TILE_DIM)?,
        to_u32(dims[0])?,
    );
    let plan = ExecutionPlan::Tiled3D {
        cube_count,
        cube_dim,
    };

    let shared_memory = plan.shared_memory(width);
    (shared_memory <= limits.max_shared_memory_size && fits(limits, cube_count, cube_dim))
        .then_some(plan)
}

/// Flat launch geometry for the generic kernel.
///
/// When the grid can't cover every element, units stride over the output by the grid size.
pub fn generic_plan(num_elements: usize, limits: &LaunchLimits) -> ExecutionPlan {
    let cube_dim = GENERIC_CUBE_DIM
        .min(limits.max_units_per_cube)
        .min(limits.max_cube_dim.0)
        .max(1);

    let num_cubes = num_elements.div_ceil(cube_dim as usize).max(1);
    let num_cubes = u32::try_from(num_cubes).unwrap_or(u32::MAX);
    let max = limits.max_cube_count;
    let (x, y, z) = limits.cube_count_spread(num_cubes);

    ExecutionPlan::Generic {
        cube_count: (x.min(max.0), y.min(max.1), z.min(max.2)),
        cube_dim: (cube_dim, 1, 1),
    }
}

fn fits(limits: &LaunchLimits, cube_count: (u32, u32, u32), cube_dim: (u32, u32, u32)) -> bool {
    let (count, dim) = (limits.max_cube_count, limits.max_cube_dim);
    let units = cube_dim.0 as u64 * cube_dim.1 as u64 * cube_dim.2 as u64;

    cube_count.0 <= count.0
        && cube_count.1 <= count.1
        && cube_count.2 <= count.2
        && cube_dim.0 <= dim.0
        && cube_dim.1 <= dim.1
        && cube_dim.2 <= dim.2
        && units <= limits.max_units_per_cube as u64
}

fn to_u32(value: usize) -> Option<u32> {
    u32::try_from(value).ok()
}
