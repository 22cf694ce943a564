use cubecl::{Runtime, cpu::CpuRuntime, server::Handle};
use cubeperm_blas::{BlasError, BlasHandle, Operation};
use cubeperm_common::Element;
use cubeperm_runtime::LaunchLimits;
use half::f16;
use pretty_assertions::assert_eq;

type TestRuntime = CpuRuntime;

fn handle() -> BlasHandle<TestRuntime> {
    BlasHandle::new(TestRuntime::client(&Default::default()))
}

fn create<E: Element>(blas: &BlasHandle<TestRuntime>, data: &[E]) -> Handle {
    blas.client().create(E::as_bytes(data))
}

fn read<E: Element>(blas: &BlasHandle<TestRuntime>, handle: Handle) -> Vec<E> {
    let bytes = blas.client().read_one(handle.binding());
    E::from_bytes(&bytes)
}

#[test_log::test]
fn transpose_transpose_with_zero_beta_is_a_matrix_transpose() {
    let blas = handle();
    // Row-major 2 x 3, so column-major 3 x 2 with ld 3.
    let a = create(&blas, &[0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0]);
    let c = blas.client().empty(6 * size_of::<f32>());

    blas.geam(
        Operation::Transpose,
        Operation::Transpose,
        2,
        3,
        1.0f32,
        &a,
        3,
        0.0,
        &a,
        3,
        &c,
        2,
    )
    .unwrap();

    // Column-major 2 x 3 with ld 2 is row-major 3 x 2.
    assert_eq!(read::<f32>(&blas, c), vec![0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
}

#[test_log::test]
fn geam_adds_both_operands() {
    let blas = handle();
    let a = create(&blas, &[1.0f64, 2.0, 3.0, 4.0]);
    let b = create(&blas, &[10.0f64, 20.0, 30.0, 40.0]);
    let c = blas.client().empty(4 * size_of::<f64>());

    blas.geam(
        Operation::NoTranspose,
        Operation::Transpose,
        2,
        2,
        2.0f64,
        &a,
        2,
        1.0,
        &b,
        2,
        &c,
        2,
    )
    .unwrap();

    // c(i, j) = 2 * a(i, j) + b(j, i)
    assert_eq!(read::<f64>(&blas, c), vec![12.0, 34.0, 26.0, 48.0]);
}

#[test_log::test]
fn geam_supports_half_precision() {
    let blas = handle();
    let input: Vec<f16> = (0..6).map(|v| f16::from_f32(v as f32)).collect();
    let a = create(&blas, &input);
    let c = blas.client().empty(6 * size_of::<f16>());

    blas.geam(
        Operation::Transpose,
        Operation::Transpose,
        3,
        2,
        f16::ONE,
        &a,
        2,
        f16::ZERO,
        &a,
        2,
        &c,
        3,
    )
    .unwrap();

    let expected: Vec<f16> = [0.0, 2.0, 4.0, 1.0, 3.0, 5.0]
        .into_iter()
        .map(f16::from_f32)
        .collect();
    assert_eq!(read::<f16>(&blas, c), expected);
}

#[test_log::test]
fn small_grid_still_covers_the_matrix() {
    let client = TestRuntime::client(&Default::default());
    let blas = BlasHandle::<TestRuntime>::with_limits(
        client,
        LaunchLimits {
            max_units_per_cube: 4,
            max_cube_count: (1, 1, 1),
            ..Default::default()
        },
    );
    let input: Vec<f32> = (0..35).map(|v| v as f32).collect();
    let a = create(&blas, &input);
    let c = blas.client().empty(35 * size_of::<f32>());

    blas.geam(
        Operation::Transpose,
        Operation::Transpose,
        5,
        7,
        1.0f32,
        &a,
        7,
        0.0,
        &a,
        7,
        &c,
        5,
    )
    .unwrap();

    let output = read::<f32>(&blas, c);
    for row in 0..5 {
        for col in 0..7 {
            assert_eq!(output[row + col * 5], input[col + row * 7]);
        }
    }
}

#[test_log::test]
fn invalid_leading_dimension_is_rejected() {
    let blas = handle();
    let a = blas.client().empty(6 * size_of::<f32>());
    let c = blas.client().empty(6 * size_of::<f32>());

    let result = blas.geam(
        Operation::Transpose,
        Operation::Transpose,
        2,
        3,
        1.0f32,
        &a,
        2,
        0.0,
        &a,
        3,
        &c,
        2,
    );

    assert!(matches!(
        result,
        Err(BlasError::InvalidValue {
            argument: "lda",
            ..
        })
    ));
}

#[test_log::test]
fn too_small_output_is_rejected() {
    let blas = handle();
    let a = blas.client().empty(6 * size_of::<f32>());
    let c = blas.client().empty(5 * size_of::<f32>());

    let result = blas.geam(
        Operation::Transpose,
        Operation::Transpose,
        2,
        3,
        1.0f32,
        &a,
        3,
        0.0,
        &a,
        3,
        &c,
        2,
    );

    assert!(matches!(
        result,
        Err(BlasError::InvalidValue { argument: "c", .. })
    ));
}

#[test_log::test]
fn b_is_checked_only_when_read() {
    let blas = handle();
    let a = create(&blas, &[1.0f32, 2.0, 3.0, 4.0]);
    let small = blas.client().empty(size_of::<f32>());
    let c = blas.client().empty(4 * size_of::<f32>());

    let result = blas.geam(
        Operation::NoTranspose,
        Operation::NoTranspose,
        2,
        2,
        1.0f32,
        &a,
        2,
        1.0,
        &small,
        2,
        &c,
        2,
    );
    assert!(matches!(
        result,
        Err(BlasError::InvalidValue { argument: "b", .. })
    ));

    blas.geam(
        Operation::NoTranspose,
        Operation::NoTranspose,
        2,
        2,
        3.0f32,
        &a,
        2,
        0.0,
        &small,
        2,
        &c,
        2,
    )
    .unwrap();
    assert_eq!(read::<f32>(&blas, c), vec![3.0, 6.0, 9.0, 12.0]);
}

#[test_log::test]
fn empty_matrix_is_a_noop() {
    let blas = handle();
    let a = blas.client().empty(size_of::<f32>());
    let c = blas.client().empty(size_of::<f32>());

    let result = blas.geam(
        Operation::Transpose,
        Operation::Transpose,
        0,
        3,
        1.0f32,
        &a,
        3,
        0.0,
        &a,
        3,
        &c,
        1,
    );

    assert_eq!(result, Ok(()));
}
