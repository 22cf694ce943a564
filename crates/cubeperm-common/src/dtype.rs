use bytemuck::Pod;
use half::{bf16, f16};
use serde::{Deserialize, Serialize};

/// Element type tag of a tensor buffer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum DType {
    /// 64-bit float.
    #[display("f64")]
    F64,
    /// 32-bit float.
    #[display("f32")]
    F32,
    /// 16-bit IEEE float.
    #[display("f16")]
    F16,
    /// 16-bit brain float.
    #[display("bf16")]
    BF16,
    /// 64-bit signed integer.
    #[display("i64")]
    I64,
    /// 32-bit signed integer.
    #[display("i32")]
    I32,
    /// 16-bit signed integer.
    #[display("i16")]
    I16,
    /// 8-bit signed integer.
    #[display("i8")]
    I8,
    /// 64-bit unsigned integer.
    #[display("u64")]
    U64,
    /// 32-bit unsigned integer.
    #[display("u32")]
    U32,
    /// 16-bit unsigned integer.
    #[display("u16")]
    U16,
    /// 8-bit unsigned integer.
    #[display("u8")]
    U8,
    /// Boolean stored as one byte.
    #[display("bool")]
    Bool,
    /// Fixed-size record of the given number of bytes with no arithmetic meaning.
    #[display("opaque{_0}")]
    Opaque(usize),
}

impl DType {
    /// Size of one element in bytes.
    pub const fn size(&self) -> usize {
        match self {
            DType::F64 | DType::I64 | DType::U64 => 8,
            DType::F32 | DType::I32 | DType::U32 => 4,
            DType::F16 | DType::BF16 | DType::I16 | DType::U16 => 2,
            DType::I8 | DType::U8 | DType::Bool => 1,
            DType::Opaque(size) => *size,
        }
    }

    /// The copy width used to move elements of this type, if any.
    pub fn width(&self) -> Option<ElemWidth> {
        ElemWidth::from_size(self.size())
    }
}

/// Closed set of element widths a copy kernel can move in a single access.
///
/// Kernels only care about how many bytes an element occupies, so every element type is
/// moved as an unsigned integer of the same width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElemWidth {
    /// One byte.
    Bits8,
    /// Two bytes.
    Bits16,
    /// Four bytes.
    Bits32,
    /// Eight bytes.
    Bits64,
}

impl ElemWidth {
    /// Number of bytes in a single vectorized access.
    pub const VECTOR_BYTES: usize = 16;

    /// Width matching `size` bytes, `None` when no kernel can move it.
    pub const fn from_size(size: usize) -> Option<Self> {
        match size {
            1 => Some(Self::Bits8),
            2 => Some(Self::Bits16),
            4 => Some(Self::Bits32),
            8 => Some(Self::Bits64),
            _ => None,
        }
    }

    /// Size in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Bits8 => 1,
            Self::Bits16 => 2,
            Self::Bits32 => 4,
            Self::Bits64 => 8,
        }
    }

    /// Number of elements packed in one 16-byte vector.
    pub const fn vectorization(self) -> usize {
        Self::VECTOR_BYTES / self.size()
    }
}

/// A host type that can be stored in a tensor buffer.
pub trait Element: Pod + Send + Sync + core::fmt::Debug + 'static {
    /// The matching type tag.
    const DTYPE: DType;

    /// View a slice of elements as raw bytes.
    fn as_bytes(elems: &[Self]) -> &[u8] {
        bytemuck::cast_slice(elems)
    }

    /// Copy raw bytes into elements, the bytes don't need to be aligned.
    fn from_bytes(bytes: &[u8]) -> Vec<Self> {
        bytemuck::pod_collect_to_vec(bytes)
    }
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:expr),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = $dtype;
            }
        )*
    };
}

impl_element!(
    f64 => DType::F64,
    f32 => DType::F32,
    f16 => DType::F16,
    bf16 => DType::BF16,
    i64 => DType::I64,
    i32 => DType::I32,
    i16 => DType::I16,
    i8 => DType::I8,
    u64 => DType::U64,
    u32 => DType::U32,
    u16 => DType::U16,
    u8 => DType::U8,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_cover_supported_sizes() {
        assert_eq!(DType::F32.width(), Some(ElemWidth::Bits32));
        assert_eq!(DType::F16.width(), Some(ElemWidth::Bits16));
        assert_eq!(DType::Bool.width(), Some(ElemWidth::Bits8));
        assert_eq!(DType::Opaque(8).width(), Some(ElemWidth::Bits64));
        assert_eq!(DType::Opaque(3).width(), None);
        assert_eq!(DType::Opaque(16).width(), None);
    }

    #[test]
    fn vectorization_packs_sixteen_bytes() {
        assert_eq!(ElemWidth::Bits8.vectorization(), 16);
        assert_eq!(ElemWidth::Bits16.vectorization(), 8);
        assert_eq!(ElemWidth::Bits32.vectorization(), 4);
        assert_eq!(ElemWidth::Bits64.vectorization(), 2);
    }

    #[test]
    fn element_bytes_roundtrip_unaligned() {
        let values = [1.5f32, -2.0, 3.25];
        let mut bytes = vec![0u8];
        bytes.extend_from_slice(f32::as_bytes(&values));

        assert_eq!(f32::from_bytes(&bytes[1..]), values.to_vec());
    }

    #[test]
    fn display_names() {
        assert_eq!(DType::F16.to_string(), "f16");
        assert_eq!(DType::Opaque(3).to_string(), "opaque3");
    }
}
