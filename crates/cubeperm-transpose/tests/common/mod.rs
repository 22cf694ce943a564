#![allow(dead_code)]

use cubecl::{Runtime, client::ComputeClient, cpu::CpuRuntime};
use cubeperm_blas::BlasHandle;
use cubeperm_common::{DType, Element, Shape, row_major_strides};
use cubeperm_transpose::TensorHandle;

pub type TestRuntime = CpuRuntime;
pub type TestClient = ComputeClient<
    <TestRuntime as Runtime>::Server,
>;
pub type TestBlas = BlasHandle<TestRuntime>;

pub fn setup() -> (TestClient, TestBlas) {
    let client = TestRuntime::client(&Default::default());
    let blas = BlasHandle::new(client.clone());

    (client, blas)
}

pub fn tensor<E: Element>(client: &TestClient, shape: impl Into<Shape>, data: &[E]) -> TensorHandle {
    TensorHandle::from_data::<E, TestRuntime>(client, shape, data).unwrap()
}

pub fn empty(client: &TestClient, shape: impl Into<Shape>, dtype: DType) -> TensorHandle {
    TensorHandle::empty::<TestRuntime>(client, shape, dtype)
}

/// Values `0, 1, 2, ..` converted to the element type.
pub fn iota<E: Element>(len: usize, convert: impl Fn(usize) -> E) -> Vec<E> {
    (0..len).map(convert).collect()
}

pub fn permuted_shape(shape: &[usize], perm: &[usize]) -> Vec<usize> {
    perm.iter().map(|&axis| shape[axis]).collect()
}

/// Host permutation walking every output coordinate, without any coalescing.
pub fn permute_reference<E: Copy>(data: &[E], shape: &[usize], perm: &[usize]) -> Vec<E> {
    let out_shape = permuted_shape(shape, perm);
    let in_strides = row_major_strides(shape);

    (0..data.len())
        .map(|out_index| {
            let mut remainder = out_index;
            let mut in_index = 0;

            for axis in (0..out_shape.len()).rev() {
                let coord = remainder % out_shape[axis];
                remainder /= out_shape[axis];
                in_index += coord * in_strides[perm[axis]];
            }

            data[in_index]
        })
        .collect()
}

/// Every permutation of `0..rank`, in lexicographic order.
pub fn all_permutations(rank: usize) -> Vec<Vec<usize>> {
    fn extend(prefix: &mut Vec<usize>, used: &mut [bool], out: &mut Vec<Vec<usize>>) {
        if prefix.len() == used.len() {
            out.push(prefix.clone());
            return;
        }

        for axis in 0..used.len() {
            if used[axis] {
                continue;
            }
            used[axis] = true;
            prefix.push(axis);
            extend(prefix, used, out);
            prefix.pop();
            used[axis] = false;
        }
    }

    let mut out = Vec::new();
    extend(&mut Vec::new(), &mut vec![false; rank], &mut out);
    out
}

pub fn read<E: Element>(client: &TestClient, tensor: &TensorHandle) -> Vec<E> {
    let bytes = client.read_one(tensor.handle.clone().binding());
    E::from_bytes(&bytes)
}
