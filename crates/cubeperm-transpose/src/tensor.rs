use cubecl::{Runtime, client::ComputeClient, server::Handle};
use cubeperm_common::{DType, Element, Shape, Strides};

use crate::TransposeError;

/// Tensor representation containing a [server handle](Handle) as well as basic tensor metadata.
#[derive(Clone)]
pub struct TensorHandle {
    /// The buffer where the data are stored.
    pub handle: Handle,
    /// Axis lengths, outermost first.
    pub shape: Shape,
    /// Step in elements along each axis.
    pub strides: Strides,
    /// The type of the elements.
    pub dtype: DType,
}

impl core::fmt::Debug for TensorHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!(
            "Tensor {{ shape: {:?}, strides: {:?}, dtype: {}}}",
            &self.shape[..],
            &self.strides[..],
            self.dtype,
        ))
    }
}

impl TensorHandle {
    /// Create a new tensor.
    pub fn new(handle: Handle, shape: impl Into<Shape>, strides: Strides, dtype: DType) -> Self {
        Self {
            handle,
            shape: shape.into(),
            strides,
            dtype,
        }
    }

    /// Create a new tensor with a contiguous memory layout.
    pub fn new_contiguous(shape: impl Into<Shape>, handle: Handle, dtype: DType) -> Self {
        let shape = shape.into();
        let strides = shape.contiguous_strides();

        Self {
            handle,
            shape,
            strides,
            dtype,
        }
    }

    /// Allocate a zeroed contiguous tensor.
    pub fn empty<R: Runtime>(
        client: &ComputeClient<R::Server>,
        shape: impl Into<Shape>,
        dtype: DType,
    ) -> Self {
        let shape = shape.into();
        let handle = client.empty(shape.num_elements() * dtype.size());

        Self::new_contiguous(shape, handle, dtype)
    }

    /// Upload `data` as a contiguous tensor of the given shape.
    pub fn from_data<E: Element, R: Runtime>(
        client: &ComputeClient<R::Server>,
        shape: impl Into<Shape>,
        data: &[E],
    ) -> Result<Self, TransposeError> {
        let shape = shape.into();
        let required = shape.num_elements() * size_of::<E>();
        let available = size_of_val(data);

        if required != available {
            return Err(TransposeError::BufferTooSmall {
                required,
                available,
            });
        }

        let handle = client.create(E::as_bytes(data));
        Ok(Self::new_contiguous(shape, handle, E::DTYPE))
    }

    /// Number of elements.
    pub fn numel(&self) -> usize {
        self.shape.num_elements()
    }

    /// Size of one element in bytes.
    pub fn elem_size(&self) -> usize {
        self.dtype.size()
    }

    /// Whether the tensor is laid out dense row-major.
    ///
    /// Strides of unit axes are ignored, as they never move through memory.
    pub fn is_contiguous(&self) -> bool {
        if self.strides.rank() != self.shape.rank() {
            return false;
        }

        let expected = self.shape.contiguous_strides();
        self.shape
            .iter()
            .zip(self.strides.iter().zip(expected.iter()))
            .all(|(&dim, (stride, expected))| dim <= 1 || stride == expected)
    }

    pub(crate) fn check_layout(&self) -> Result<(), TransposeError> {
        if !self.is_contiguous() {
            return Err(TransposeError::NonContiguous {
                shape: self.shape.clone(),
            });
        }

        let required = self.numel() * self.elem_size();
        let available = self.handle.size() as usize;
        if available < required {
            return Err(TransposeError::BufferTooSmall {
                required,
                available,
            });
        }

        Ok(())
    }
}
