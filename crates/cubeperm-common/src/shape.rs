use core::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// The maximum rank the permutation kernels index over.
///
/// Shapes can hold more axes, but launching a kernel on a problem whose rank exceeds this
/// value is rejected with [`ShapeError::RankOverflow`].
pub const MAX_RANK: usize = 8;

/// Errors raised while validating shapes, strides and axis permutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// Two ranks that should be equal are not.
    #[error("Rank mismatch: {left} != {right}")]
    RankMismatch {
        /// Left hand side rank.
        left: usize,
        /// Right hand side rank.
        right: usize,
    },

    /// The axes are not a bijection over `0..rank`.
    #[error("Invalid permutation {axes:?} for rank {rank}")]
    InvalidPermutation {
        /// The offending axes.
        axes: Vec<usize>,
        /// The rank of the permuted shape.
        rank: usize,
    },

    /// The rank is larger than what the fixed-capacity kernel arguments can hold.
    #[error("Rank {rank} exceeds the maximum supported rank of {max}")]
    RankOverflow {
        /// Requested rank.
        rank: usize,
        /// Maximum rank.
        max: usize,
    },
}

/// Ordered axis lengths of a tensor, axis 0 being the outermost.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct Shape {
    dims: SmallVec<[usize; MAX_RANK]>,
}

impl Shape {
    /// Create a shape from its axis lengths.
    pub fn new(dims: impl AsRef<[usize]>) -> Self {
        Self {
            dims: SmallVec::from_slice(dims.as_ref()),
        }
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements. A rank-0 shape holds a single element.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Reorder the axes, output axis `i` taking input axis `axes[i]`.
    pub fn permuted(&self, axes: &[usize]) -> Result<Self, ShapeError> {
        validate_permutation(axes, self.rank())?;

        Ok(Self {
            dims: axes.iter().map(|&axis| self.dims[axis]).collect(),
        })
    }

    /// Dense row-major strides for this shape.
    pub fn contiguous_strides(&self) -> Strides {
        row_major_strides(&self.dims)
    }

    /// Fail when the rank does not fit in `max` axes.
    pub fn check_rank(&self, max: usize) -> Result<(), ShapeError> {
        match self.rank() > max {
            true => Err(ShapeError::RankOverflow {
                rank: self.rank(),
                max,
            }),
            false => Ok(()),
        }
    }
}

impl Deref for Shape {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.dims
    }
}

impl DerefMut for Shape {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.dims
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims)
    }
}

impl FromIterator<usize> for Shape {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self {
            dims: iter.into_iter().collect(),
        }
    }
}

/// Linear-memory step, in elements, for a unit increase along each axis.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct Strides {
    dims: SmallVec<[usize; MAX_RANK]>,
}

impl Strides {
    /// Create strides from raw values.
    pub fn new(dims: impl AsRef<[usize]>) -> Self {
        Self {
            dims: SmallVec::from_slice(dims.as_ref()),
        }
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }
}

impl Deref for Strides {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.dims
    }
}

impl DerefMut for Strides {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.dims
    }
}

impl FromIterator<usize> for Strides {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self {
            dims: iter.into_iter().collect(),
        }
    }
}

/// Construct row-major contiguous strides for a shape.
///
/// This will return strides such that:
/// - ``strides.len() == shape.len()``
/// - ``strides[rank - 1] == 1``
/// - ``for i in 0..rank - 1 { strides[i] == strides[i + 1] * shape[i + 1] }``
///
/// If ``rank == 0``, this will return empty strides.
pub fn row_major_strides(shape: &[usize]) -> Strides {
    let rank = shape.len();
    let mut dims: SmallVec<[usize; MAX_RANK]> = smallvec::smallvec![1; rank];

    if rank > 1 {
        for i in (0..rank - 1).rev() {
            dims[i] = dims[i + 1] * shape[i + 1];
        }
    }

    Strides { dims }
}

/// Check that `axes` is a bijection over `0..rank`.
pub fn validate_permutation(axes: &[usize], rank: usize) -> Result<(), ShapeError> {
    if axes.len() != rank {
        return Err(ShapeError::RankMismatch {
            left: rank,
            right: axes.len(),
        });
    }

    let mut seen: SmallVec<[bool; MAX_RANK]> = smallvec::smallvec![false; rank];
    for &axis in axes {
        if axis >= rank || seen[axis] {
            return Err(ShapeError::InvalidPermutation {
                axes: axes.to_vec(),
                rank,
            });
        }
        seen[axis] = true;
    }

    Ok(())
}

/// The permutation undoing `axes`: `inverse[axes[i]] == i`.
///
/// `axes` must be a valid permutation.
pub fn inverse_permutation(axes: &[usize]) -> SmallVec<[usize; MAX_RANK]> {
    let mut inverse: SmallVec<[usize; MAX_RANK]> = smallvec::smallvec![0; axes.len()];
    for (i, &axis) in axes.iter().enumerate() {
        inverse[axis] = i;
    }
    inverse
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_row_major_strides() {
        assert_eq!(&*row_major_strides(&[]), &[] as &[usize]);
        assert_eq!(&*row_major_strides(&[1, 2, 3]), &[6, 3, 1]);
        assert_eq!(&*row_major_strides(&[4, 0, 5]), &[0, 5, 1]);
    }

    #[test]
    fn permuted_shape_follows_axes() {
        let shape = Shape::new([2, 3, 4]);

        assert_eq!(shape.permuted(&[2, 0, 1]).unwrap(), Shape::new([4, 2, 3]));
        assert_eq!(shape.num_elements(), 24);
        assert_eq!(Shape::default().num_elements(), 1);
    }

    #[test]
    fn rejects_duplicate_axes() {
        let err = validate_permutation(&[0, 0, 1], 3).unwrap_err();

        assert_eq!(
            err,
            ShapeError::InvalidPermutation {
                axes: vec![0, 0, 1],
                rank: 3
            }
        );
    }

    #[test]
    fn rejects_out_of_range_axes() {
        assert!(validate_permutation(&[0, 3, 1], 3).is_err());
        assert!(matches!(
            validate_permutation(&[0, 1], 3),
            Err(ShapeError::RankMismatch { left: 3, right: 2 })
        ));
    }

    #[test]
    fn inverse_undoes_permutation() {
        let axes = [2, 0, 3, 1];
        let inverse = inverse_permutation(&axes);

        for (i, &axis) in axes.iter().enumerate() {
            assert_eq!(inverse[axis], i);
        }
    }

    #[test]
    fn rank_overflow_is_reported() {
        let shape = Shape::new([1; MAX_RANK + 1]);

        assert_eq!(
            shape.check_rank(MAX_RANK),
            Err(ShapeError::RankOverflow {
                rank: MAX_RANK + 1,
                max: MAX_RANK
            })
        );
    }
}
