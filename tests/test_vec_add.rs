// tests/test_vec_add.rs — integration tests through the public API.
//
// These run with `cargo test --test test_vec_add`. Unlike the unit
// tests inside each module, they only see the crate's public surface.
// Tests that need a real adapter are #[ignore]d; run them with:
//   cargo test --test test_vec_add -- --include-ignored

use std::path::Path;

use vecadd_bench::device::GpuContext;
use vecadd_bench::error::BenchError;
use vecadd_bench::kernel::{load_kernel_source, VecAddBuffers, VecAddKernel, KERNEL_PATH};
use vecadd_bench::stats::LapTimer;
use vecadd_bench::verify::verify_sum;

const A8: [f32; 8] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
const B8: [f32; 8] = [8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];

// ===== No adapter needed =====

#[test]
fn verification_accepts_host_reference() {
    let c: Vec<f32> = A8.iter().zip(B8.iter()).map(|(a, b)| a + b).collect();
    assert_eq!(c, vec![9.0f32; 8]);
    verify_sum(&A8, &B8, &c).expect("host reference must verify");
}

#[test]
fn verification_reports_corrupted_element() {
    let mut c = vec![9.0f32; 8];
    c[3] = 0.0;
    match verify_sum(&A8, &B8, &c) {
        Err(BenchError::Mismatch { index, got, lhs, rhs }) => {
            assert_eq!((index, got, lhs, rhs), (3, 0.0, 4.0, 5.0));
        }
        other => panic!("expected Mismatch, got {other:?}"),
    }
}

#[test]
fn timer_stats_survive_planted_outliers() {
    // The driver records 20 laps per phase; plant outliers in the 20%
    // tails and check they cannot move the trimmed mean.
    let mut laps = vec![2.0e-3; 12];
    laps.extend([0.5, 0.6, 0.7, 0.8]);
    laps.extend([1.0e-8, 2.0e-8, 3.0e-8, 4.0e-8]);
    let timer = LapTimer::from_laps(laps);
    assert_eq!(timer.lap_avg(), 2.0e-3);
    assert_eq!(timer.lap_std(), 0.0);
}

#[test]
fn kernel_source_path_is_valid_from_crate_root() {
    let source = load_kernel_source(Path::new(KERNEL_PATH)).expect("kernel source unreadable");
    assert!(!source.is_empty());
}

// ===== Adapter required =====

#[test]
#[ignore = "requires a GPU or CPU adapter"]
fn e2e_eight_elements_all_nines() {
    let ctx = GpuContext::new().expect("no adapter");
    let source = load_kernel_source(Path::new(KERNEL_PATH)).expect("kernel source");
    let kernel = VecAddKernel::new(&ctx, &source).expect("kernel build");
    let buffers = VecAddBuffers::new(&ctx, &A8, &B8).expect("buffer allocation");
    let bind_group = kernel.bind(&ctx, &buffers);

    kernel.dispatch(&ctx, &bind_group, buffers.len());
    let c = buffers.read_result(&ctx).expect("readback");

    assert_eq!(c, vec![9.0f32; 8]);
    verify_sum(&A8, &B8, &c).expect("verification must pass");
}

#[test]
#[ignore = "requires a GPU or CPU adapter"]
fn e2e_dispatch_is_idempotent() {
    // Two full dispatch-and-readback cycles over identical inputs must
    // produce bit-identical outputs: deterministic kernel, no hidden
    // state.
    let a: Vec<f32> = (0..1024).map(|i| (i as f32) * 0.25 + 0.125).collect();
    let b: Vec<f32> = (0..1024).map(|i| 1024.0 - i as f32).collect();

    let ctx = GpuContext::new().expect("no adapter");
    let source = load_kernel_source(Path::new(KERNEL_PATH)).expect("kernel source");
    let kernel = VecAddKernel::new(&ctx, &source).expect("kernel build");
    let buffers = VecAddBuffers::new(&ctx, &a, &b).expect("buffer allocation");
    let bind_group = kernel.bind(&ctx, &buffers);

    kernel.dispatch(&ctx, &bind_group, buffers.len());
    let first = buffers.read_result(&ctx).expect("first readback");

    kernel.dispatch(&ctx, &bind_group, buffers.len());
    let second = buffers.read_result(&ctx).expect("second readback");

    let first_bits: Vec<u32> = first.iter().map(|f| f.to_bits()).collect();
    let second_bits: Vec<u32> = second.iter().map(|f| f.to_bits()).collect();
    assert_eq!(first_bits, second_bits);

    verify_sum(&a, &b, &first).expect("verification must pass");
}

#[test]
#[ignore = "requires a GPU or CPU adapter"]
fn e2e_non_multiple_of_workgroup_size() {
    // 300 elements: the tail workgroup runs 84 out-of-range invocations
    // that the shader's bounds guard must drop.
    let a: Vec<f32> = (0..300).map(|i| i as f32).collect();
    let b: Vec<f32> = (0..300).map(|i| (300 - i) as f32).collect();

    let ctx = GpuContext::new().expect("no adapter");
    let source = load_kernel_source(Path::new(KERNEL_PATH)).expect("kernel source");
    let kernel = VecAddKernel::new(&ctx, &source).expect("kernel build");
    let buffers = VecAddBuffers::new(&ctx, &a, &b).expect("buffer allocation");
    let bind_group = kernel.bind(&ctx, &buffers);

    kernel.dispatch(&ctx, &bind_group, buffers.len());
    let c = buffers.read_result(&ctx).expect("readback");

    assert_eq!(c.len(), 300);
    assert!(c.iter().all(|&v| v == 300.0));
}
