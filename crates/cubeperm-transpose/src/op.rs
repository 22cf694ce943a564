use cubecl::{Runtime, client::ComputeClient};
use cubeperm_blas::BlasHandle;
use cubeperm_common::{MAX_RANK, Shape, SmallVec};

use crate::{TensorHandle, TransposeError, TransposeExecution, transpose};

/// Transpose operator with an optional permutation attribute.
///
/// Without a permutation the axes are reversed.
#[derive(new, Debug, Clone, Default, PartialEq, Eq)]
pub struct TransposeOp {
    /// Output axis `i` takes input axis `perm[i]`.
    pub perm: Option<Vec<usize>>,
}

impl TransposeOp {
    /// The permutation applied to an input of the given rank.
    pub fn permutation(&self, rank: usize) -> SmallVec<[usize; MAX_RANK]> {
        match &self.perm {
            Some(perm) => SmallVec::from_slice(perm),
            None => (0..rank).rev().collect(),
        }
    }

    /// Shape of the output for an input of the given shape.
    pub fn output_shape(&self, input: &Shape) -> Result<Shape, TransposeError> {
        Ok(input.permuted(&self.permutation(input.rank()))?)
    }

    /// Allocate the output of the first input and transpose into it.
    pub fn compute<R: Runtime>(
        &self,
        client: &ComputeClient<R::Server>,
        blas: &BlasHandle<R>,
        inputs: &[TensorHandle],
    ) -> Result<(TensorHandle, TransposeExecution<R>), TransposeError> {
        let input = inputs.first().ok_or(TransposeError::MissingInput)?;
        let perm = self.permutation(input.shape.rank());

        launch_alloc(client, blas, input, &perm)
    }
}

/// Allocate a tensor with the permuted shape of `input` and transpose into it.
pub fn launch_alloc<R: Runtime>(
    client: &ComputeClient<R::Server>,
    blas: &BlasHandle<R>,
    input: &TensorHandle,
    perm: &[usize],
) -> Result<(TensorHandle, TransposeExecution<R>), TransposeError> {
    let shape = input.shape.permuted(perm)?;
    let output = TensorHandle::empty::<R>(client, shape, input.dtype);
    let execution = transpose(client, blas, perm, input, &output)?;

    Ok((output, execution))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeperm_common::ShapeError;

    #[test]
    fn default_permutation_reverses_the_axes() {
        let op = TransposeOp::default();

        assert_eq!(op.permutation(4).as_slice(), &[3, 2, 1, 0]);
        assert_eq!(
            op.output_shape(&Shape::new([2, 3, 4])).unwrap(),
            Shape::new([4, 3, 2])
        );
    }

    #[test]
    fn explicit_permutation_is_validated() {
        let op = TransposeOp::new(Some(vec![0, 0, 1]));

        assert!(matches!(
            op.output_shape(&Shape::new([2, 3, 4])),
            Err(TransposeError::Shape(ShapeError::InvalidPermutation { .. }))
        ));
    }
}
