use thiserror::Error;

use crate::LaunchLimits;

/// Kernel launch errors, raised synchronously before anything is enqueued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    /// Too many resources were requested.
    #[error("Too many resources were requested during launch\n{0}")]
    TooManyResources(#[from] ResourceLimitError),

    /// A buffer holds more elements than a kernel can index.
    #[error("Buffer of {len} elements can't be indexed by a kernel, at most {max} elements")]
    IndexOverflow {
        /// Number of elements of the buffer.
        len: u64,
        /// Maximum number of elements.
        max: u64,
    },
}

/// Resource limit errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceLimitError {
    /// Shared memory exceeds maximum.
    #[error(
        "Too much shared memory requested.\nRequested {requested} bytes, maximum {max} bytes available."
    )]
    SharedMemory {
        /// Value requested.
        requested: usize,
        /// Maximum value.
        max: usize,
    },
    /// Total units exceeds maximum.
    #[error("Total unit count exceeds maximum.\nRequested {requested} units, max units is {max}.")]
    Units {
        /// Requested value.
        requested: u32,
        /// Maximum value.
        max: u32,
    },
    /// `CubeDim` exceeds maximum.
    #[error("Cube dim exceeds maximum bounds.\nRequested {requested:?}, max is {max:?}.")]
    CubeDim {
        /// Requested value.
        requested: (u32, u32, u32),
        /// Maximum value.
        max: (u32, u32, u32),
    },
    /// `CubeCount` exceeds maximum.
    #[error("Cube count exceeds maximum bounds.\nRequested {requested:?}, max is {max:?}.")]
    CubeCount {
        /// Requested value.
        requested: (u32, u32, u32),
        /// Maximum value.
        max: (u32, u32, u32),
    },
}

/// Check a launch geometry against the device limits.
pub fn validate_launch(
    limits: &LaunchLimits,
    cube_count: (u32, u32, u32),
    cube_dim: (u32, u32, u32),
    shared_memory: usize,
) -> Result<(), LaunchError> {
    validate_cube_dim(limits, cube_dim)?;
    validate_cube_count(limits, cube_count)?;
    validate_shared_memory(limits, shared_memory)
}

/// Check that a buffer of `len` elements can be indexed with 32-bit unsigned indices.
pub fn validate_index(len: usize) -> Result<(), LaunchError> {
    let max = u32::MAX as u64;
    let len = len as u64;

    if len > max {
        Err(LaunchError::IndexOverflow { len, max })
    } else {
        Ok(())
    }
}

fn contains(max: (u32, u32, u32), requested: (u32, u32, u32)) -> bool {
    requested.0 <= max.0 && requested.1 <= max.1 && requested.2 <= max.2
}

fn validate_cube_dim(limits: &LaunchLimits, requested: (u32, u32, u32)) -> Result<(), LaunchError> {
    let max = limits.max_cube_dim;
    if !contains(max, requested) {
        return Err(ResourceLimitError::CubeDim { requested, max }.into());
    }

    let units = requested.0 as u64 * requested.1 as u64 * requested.2 as u64;
    if units > limits.max_units_per_cube as u64 {
        return Err(ResourceLimitError::Units {
            requested: units.min(u32::MAX as u64) as u32,
            max: limits.max_units_per_cube,
        }
        .into());
    }

    Ok(())
}

fn validate_cube_count(
    limits: &LaunchLimits,
    requested: (u32, u32, u32),
) -> Result<(), LaunchError> {
    let max = limits.max_cube_count;
    if !contains(max, requested) {
        Err(ResourceLimitError::CubeCount { requested, max }.into())
    } else {
        Ok(())
    }
}

fn validate_shared_memory(limits: &LaunchLimits, requested: usize) -> Result<(), LaunchError> {
    let max = limits.max_shared_memory_size;
    if requested > max {
        Err(ResourceLimitError::SharedMemory { requested, max }.into())
    } else {
        Ok(())
    }
}
