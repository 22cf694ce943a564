use cubecl::prelude::*;

/// `C = alpha * op(A) + beta * op(B)` over an `m x n` column-major output.
///
/// Units stride over the output by the grid size in both axes, so any grid covers the matrix.
/// `B` is only read when `read_b` is set.
#[cube(launch)]
pub(crate) fn geam_kernel<F: Float>(
    a: &Array<F>,
    b: &Array<F>,
    c: &mut Array<F>,
    alpha: F,
    beta: F,
    m: u32,
    n: u32,
    lda: u32,
    ldb: u32,
    ldc: u32,
    #[comptime] transa: bool,
    #[comptime] transb: bool,
    #[comptime] read_b: bool,
) {
    let step_row = CUBE_COUNT_X * CUBE_DIM_X;
    let step_col = CUBE_COUNT_Y * CUBE_DIM_Y;
    let mut col = ABSOLUTE_POS_Y;

    while col < n {
        let mut row = ABSOLUTE_POS_X;

        while row < m {
            let mut value = alpha * a[operand_offset(row, col, lda, transa)];

            if read_b {
                value = value + beta * b[operand_offset(row, col, ldb, transb)];
            }

            c[row + col * ldc] = value;
            row += step_row;
        }

        col += step_col;
    }
}

/// Offset of element `(row, col)` of `op(X)` stored column-major with leading dimension `ld`.
#[cube]
fn operand_offset(row: u32, col: u32, ld: u32, #[comptime] transposed: bool) -> u32 {
    if transposed {
        col + row * ld
    } else {
        row + col * ld
    }
}
