use cubeperm_blas::BlasError;
use cubeperm_common::{DType, Shape, ShapeError};
use cubeperm_runtime::LaunchError;

/// Errors raised by a permutation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransposeError {
    /// The operator was called without an input tensor.
    #[error("Transpose expects one input tensor, none was provided")]
    MissingInput,

    /// No kernel can move elements of this size.
    #[error("Unsupported element size of {size} bytes, expected 1, 2, 4 or 8")]
    UnsupportedElementSize {
        /// The element size in bytes.
        size: usize,
    },

    /// The permutation doesn't match the input shape.
    #[error("{0}")]
    Shape(#[from] ShapeError),

    /// The output shape isn't the permuted input shape.
    #[error("Output shape {actual:?} doesn't match the permuted input shape {expected:?}")]
    ShapeMismatch {
        /// The permuted input shape.
        expected: Shape,
        /// The output shape.
        actual: Shape,
    },

    /// Input and output don't hold the same element type.
    #[error("Input dtype {input} doesn't match output dtype {output}")]
    DTypeMismatch {
        /// Input element type.
        input: DType,
        /// Output element type.
        output: DType,
    },

    /// The tensor isn't laid out dense row-major.
    #[error("Tensor with shape {shape:?} isn't contiguous")]
    NonContiguous {
        /// Shape of the tensor.
        shape: Shape,
    },

    /// The buffer can't hold the elements of its tensor.
    #[error("Buffer of {available} bytes can't hold the {required} bytes of the tensor")]
    BufferTooSmall {
        /// Bytes needed by the tensor.
        required: usize,
        /// Bytes in the buffer.
        available: usize,
    },

    /// The kernel couldn't be launched.
    #[error("{0}")]
    Launch(#[from] LaunchError),

    /// The matrix transpose routine failed.
    #[error("{0}")]
    Blas(#[from] BlasError),
}
