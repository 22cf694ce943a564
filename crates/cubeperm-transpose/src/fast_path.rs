use cubecl::Runtime;
use cubeperm_blas::{BlasFloat, BlasHandle, Operation};
use cubeperm_common::DType;
use half::f16;
use num_traits::{One, Zero};

use crate::{TensorHandle, TransposeError};

/// A permutation equivalent to transposing a dense `m x n` row-major matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixTransposeShape {
    /// Rows of the input matrix.
    pub m: usize,
    /// Columns of the input matrix.
    pub n: usize,
}

/// Recognize the permutations that are a single matrix transpose without coalescing.
///
/// Only two families qualify: the rank-2 transpose `[1, 0]`, and on rank-4 tensors with a unit
/// leading axis, moving the channel axis last (`[0, 2, 3, 1]`, NCHW to NHWC) or first
/// (`[0, 3, 1, 2]`, NHWC to NCHW).
pub fn try_matrix_transpose(perm: &[usize], shape: &[usize]) -> Option<MatrixTransposeShape> {
    let (m, n) = match (perm, shape) {
        ([1, 0], [rows, cols]) => (*rows, *cols),
        ([0, 2, 3, 1], [1, c, h, w]) => (*c, h * w),
        ([0, 3, 1, 2], [1, h, w, c]) => (h * w, *c),
        _ => return None,
    };

    match m == 0 || n == 0 {
        true => None,
        false => Some(MatrixTransposeShape { m, n }),
    }
}

/// Transpose with the matrix routine, `false` when the element type isn't supported by it.
pub(crate) fn launch_matrix_transpose<R: Runtime>(
    blas: &BlasHandle<R>,
    shape: MatrixTransposeShape,
    input: &TensorHandle,
    output: &TensorHandle,
) -> Result<bool, TransposeError> {
    match input.dtype {
        DType::F32 => geam_transpose::<f32, R>(blas, shape, input, output)?,
        DType::F64 => geam_transpose::<f64, R>(blas, shape, input, output)?,
        DType::F16 => geam_transpose::<f16, R>(blas, shape, input, output)?,
        _ => return Ok(false),
    };

    Ok(true)
}

// Row-major `m x n` is column-major `n x m` with leading dimension `n`. Transposing it gives a
// column-major `m x n` with leading dimension `m`, which is the row-major `n x m` output.
fn geam_transpose<F: BlasFloat, R: Runtime>(
    blas: &BlasHandle<R>,
    MatrixTransposeShape { m, n }: MatrixTransposeShape,
    input: &TensorHandle,
    output: &TensorHandle,
) -> Result<(), TransposeError> {
    blas.geam::<F>(
        Operation::Transpose,
        Operation::Transpose,
        m,
        n,
        <F as One>::one(),
        &input.handle,
        n,
        <F as Zero>::zero(),
        &input.handle,
        n,
        &output.handle,
        m,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_transpose_is_recognized() {
        assert_eq!(
            try_matrix_transpose(&[1, 0], &[4, 6]),
            Some(MatrixTransposeShape { m: 4, n: 6 })
        );
        assert_eq!(try_matrix_transpose(&[0, 1], &[4, 6]), None);
    }

    #[test]
    fn channel_moves_with_unit_batch_are_recognized() {
        assert_eq!(
            try_matrix_transpose(&[0, 2, 3, 1], &[1, 3, 4, 5]),
            Some(MatrixTransposeShape { m: 3, n: 20 })
        );
        assert_eq!(
            try_matrix_transpose(&[0, 3, 1, 2], &[1, 4, 5, 3]),
            Some(MatrixTransposeShape { m: 20, n: 3 })
        );
    }

    #[test]
    fn other_rank_4_permutations_miss() {
        assert_eq!(try_matrix_transpose(&[0, 2, 3, 1], &[2, 3, 4, 5]), None);
        assert_eq!(try_matrix_transpose(&[0, 2, 1, 3], &[1, 3, 4, 5]), None);
        assert_eq!(try_matrix_transpose(&[1, 0, 2], &[3, 4, 5]), None);
    }

    #[test]
    fn empty_matrices_miss() {
        assert_eq!(try_matrix_transpose(&[1, 0], &[0, 6]), None);
    }
}
