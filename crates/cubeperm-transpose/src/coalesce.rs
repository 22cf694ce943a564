use cubeperm_common::{MAX_RANK, Shape, SmallVec, Strides, row_major_strides, smallvec};

/// A permutation rewritten with the fewest axes that describe the same element copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoalescedProblem {
    /// Output axis `i` takes input axis `perm[i]`.
    pub perm: SmallVec<[usize; MAX_RANK]>,
    /// Coalesced input shape.
    pub in_shape: Shape,
    /// Coalesced output shape, `out_shape[i] == in_shape[perm[i]]`.
    pub out_shape: Shape,
    /// Row-major strides of the coalesced input.
    pub in_strides: Strides,
    /// Row-major strides of the coalesced output.
    pub out_strides: Strides,
}

impl CoalescedProblem {
    /// Number of axes left after coalescing.
    pub fn rank(&self) -> usize {
        self.perm.len()
    }

    /// Number of elements copied.
    pub fn num_elements(&self) -> usize {
        self.in_shape.num_elements()
    }

    /// Input stride of every output axis.
    pub fn permuted_in_strides(&self) -> SmallVec<[usize; MAX_RANK]> {
        self.perm.iter().map(|&axis| self.in_strides[axis]).collect()
    }

    /// Output stride of every input axis.
    pub fn inverse_out_strides(&self) -> SmallVec<[usize; MAX_RANK]> {
        let mut strides: SmallVec<[usize; MAX_RANK]> = smallvec![0; self.rank()];
        for (i, &axis) in self.perm.iter().enumerate() {
            strides[axis] = self.out_strides[i];
        }
        strides
    }
}

/// Merge the axes that stay adjacent and in order through the permutation.
///
/// Output axes `i - 1` and `i` fold into one when `perm[i - 1] + 1 == perm[i]`: they read a
/// contiguous run of the input in order, so the pair behaves like a single axis of their
/// combined length. Axes are scanned from the innermost outward once, renumbering the
/// permutation after each fold, which merges every maximal run.
///
/// `perm` must be a valid permutation of the axes of `in_shape`, and `out_shape` the permuted
/// input shape.
pub fn coalesce(perm: &[usize], in_shape: &[usize], out_shape: &[usize]) -> CoalescedProblem {
    let mut perm: SmallVec<[usize; MAX_RANK]> = SmallVec::from_slice(perm);
    let mut in_dims: SmallVec<[usize; MAX_RANK]> = SmallVec::from_slice(in_shape);
    let mut out_dims: SmallVec<[usize; MAX_RANK]> = SmallVec::from_slice(out_shape);

    for i in (1..perm.len()).rev() {
        let prev = perm[i - 1];
        let curr = perm[i];

        if prev + 1 != curr {
            continue;
        }

        perm.remove(i);
        for axis in perm.iter_mut() {
            if *axis > curr {
                *axis -= 1;
            }
        }

        in_dims[prev] *= in_dims[curr];
        in_dims.remove(curr);

        out_dims[i - 1] *= out_dims[i];
        out_dims.remove(i);
    }

    let in_strides = row_major_strides(&in_dims);
    let out_strides = row_major_strides(&out_dims);

    CoalescedProblem {
        perm,
        in_shape: Shape::new(in_dims),
        out_shape: Shape::new(out_dims),
        in_strides,
        out_strides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn coalesce_perm(perm: &[usize], shape: &[usize]) -> CoalescedProblem {
        let out_shape: Vec<usize> = perm.iter().map(|&axis| shape[axis]).collect();
        coalesce(perm, shape, &out_shape)
    }

    #[test]
    fn identity_collapses_to_a_single_axis() {
        let problem = coalesce_perm(&[0, 1, 2], &[2, 3, 4]);

        assert_eq!(problem.perm.as_slice(), &[0]);
        assert_eq!(&problem.in_shape[..], &[24]);
        assert_eq!(&problem.out_shape[..], &[24]);
        assert_eq!(&problem.in_strides[..], &[1]);
    }

    #[test]
    fn block_swap_collapses_to_a_matrix_transpose() {
        let problem = coalesce_perm(&[2, 3, 0, 1], &[2, 3, 4, 5]);

        assert_eq!(problem.perm.as_slice(), &[1, 0]);
        assert_eq!(&problem.in_shape[..], &[6, 20]);
        assert_eq!(&problem.out_shape[..], &[20, 6]);
        assert_eq!(&problem.in_strides[..], &[20, 1]);
        assert_eq!(&problem.out_strides[..], &[6, 1]);
    }

    #[test]
    fn inner_run_is_kept_in_place() {
        let problem = coalesce_perm(&[1, 0, 2, 3], &[2, 3, 4, 5]);

        assert_eq!(problem.perm.as_slice(), &[1, 0, 2]);
        assert_eq!(&problem.in_shape[..], &[2, 3, 20]);
        assert_eq!(&problem.out_shape[..], &[3, 2, 20]);
    }

    #[test]
    fn renumbering_follows_earlier_folds() {
        // The innermost run folds first and renumbers the axes compared after it.
        let problem = coalesce_perm(&[5, 3, 4, 0, 1, 2], &[2, 3, 4, 5, 6, 7]);

        assert_eq!(problem.perm.as_slice(), &[2, 1, 0]);
        assert_eq!(&problem.in_shape[..], &[24, 30, 7]);
        assert_eq!(&problem.out_shape[..], &[7, 30, 24]);
    }

    #[test]
    fn nothing_folds_without_adjacent_axes() {
        let problem = coalesce_perm(&[2, 1, 0], &[2, 3, 4]);

        assert_eq!(problem.perm.as_slice(), &[2, 1, 0]);
        assert_eq!(&problem.in_shape[..], &[2, 3, 4]);
        assert_eq!(problem.num_elements(), 24);
    }

    #[test]
    fn inverse_out_strides_follow_input_axes() {
        let problem = coalesce_perm(&[2, 0, 3, 1], &[2, 3, 4, 5]);

        // Output shape [4, 2, 5, 3], strides [30, 15, 3, 1].
        assert_eq!(problem.inverse_out_strides().as_slice(), &[15, 1, 30, 3]);
        assert_eq!(problem.permuted_in_strides().as_slice(), &[5, 60, 1, 20]);
    }

    #[test]
    fn scalar_and_vector_are_left_untouched() {
        assert_eq!(coalesce_perm(&[], &[]).rank(), 0);
        assert_eq!(coalesce_perm(&[0], &[7]).rank(), 1);
    }
}
