use cubecl::prelude::*;
use serde::{Deserialize, Serialize};

/// Largest plane size used to shape cubes. Runtimes without planes report `u32::MAX`.
const MAX_PLANE_SIZE: u32 = 32;

/// Limits of the device a kernel is launched on.
///
/// This is the capability descriptor kernels use to pick their launch geometry. It is read once
/// from a client and then passed around as a plain value, so geometry selection can be tested
/// against any device shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaunchLimits {
    /// Number of units executing in lockstep (warp size on CUDA).
    pub plane_size: u32,
    /// Maximum number of units in a cube (threads per block on CUDA).
    pub max_units_per_cube: u32,
    /// Maximum cube count per axis.
    pub max_cube_count: (u32, u32, u32),
    /// Maximum cube dim per axis.
    pub max_cube_dim: (u32, u32, u32),
    /// Maximum bytes of shared memory per cube.
    pub max_shared_memory_size: usize,
}

impl Default for LaunchLimits {
    fn default() -> Self {
        Self {
            plane_size: 32,
            max_units_per_cube: 1024,
            max_cube_count: (i32::MAX as u32, u16::MAX as u32, u16::MAX as u32),
            max_cube_dim: (1024, 1024, 64),
            max_shared_memory_size: 48 * 1024,
        }
    }
}

impl LaunchLimits {
    /// Read the limits of the device behind `client`.
    pub fn from_client<R: Runtime>(client: &ComputeClient<R::Server>) -> Self {
        let hardware = &client.properties().hardware;
        let defaults = Self::default();

        let max_cube_count = match hardware.max_cube_count {
            CubeCount::Static(x, y, z) => (x, y, z),
            CubeCount::Dynamic(_) => defaults.max_cube_count,
        };
        let max_cube_dim = hardware.max_cube_dim;

        Self {
            plane_size: hardware.plane_size_max.clamp(1, MAX_PLANE_SIZE),
            max_units_per_cube: hardware.max_units_per_cube,
            max_cube_count,
            max_cube_dim: (max_cube_dim.x, max_cube_dim.y, max_cube_dim.z),
            max_shared_memory_size: hardware.max_shared_memory_size,
        }
    }

    /// Spread `num_cubes` over the three cube count axes while respecting the per axis limits.
    ///
    /// Axis `x` is halved until it fits, doubling axis `y`, and so on. The result may hold more
    /// cubes than requested, kernels launched with it must check their bounds.
    pub fn cube_count_spread(&self, num_cubes: u32) -> (u32, u32, u32) {
        let (max_x, max_y, max_z) = self.max_cube_count;
        let max_cube_counts = [max_x, max_y, max_z];
        let mut num_cubes = [num_cubes, 1, 1];
        let base = 2;

        let mut reduce_count = |i: usize| {
            if num_cubes[i] <= max_cube_counts[i] {
                return true;
            }

            loop {
                num_cubes[i] = num_cubes[i].div_ceil(base);
                num_cubes[i + 1] *= base;

                if num_cubes[i] <= max_cube_counts[i] {
                    return false;
                }
            }
        };

        for i in 0..2 {
            if reduce_count(i) {
                break;
            }
        }

        (num_cubes[0], num_cubes[1], num_cubes[2])
    }
}
