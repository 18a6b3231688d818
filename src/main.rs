// main.rs — benchmark driver.
//
// Strictly linear: adapter selection → data generation → kernel build →
// timed dispatch loop → timed readback loop → verification. The first
// error aborts the run; wgpu resources are released by Drop on every
// exit path.
//
// USAGE
//   cargo run --release
//   RUST_LOG=debug cargo run --release   (logs every probed adapter)

use std::path::Path;
use std::process::ExitCode;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vecadd_bench::device::GpuContext;
use vecadd_bench::error::BenchError;
use vecadd_bench::kernel::{load_kernel_source, VecAddBuffers, VecAddKernel, KERNEL_PATH};
use vecadd_bench::stats::LapTimer;
use vecadd_bench::verify::verify_sum;

/// Elements per operand. A 1-D dispatch is capped at 65 535 workgroups
/// of 128 invocations (wgpu default limits), so n must stay below
/// 65 535 * 128 = 8 388 480. 8M elements is 32 MiB per buffer.
const N: u32 = 8_000_000;

/// Laps per timed phase.
const ITERS: u32 = 20;

const GIB: f64 = (1u64 << 30) as f64;

fn run() -> Result<(), BenchError> {
    let ctx = GpuContext::new()?;
    println!("Using device:");
    println!("    Platform name: {:?}", ctx.adapter.backend);
    println!("    Device name: {}", ctx.adapter.name);

    // Two pseudo-random operand arrays, seeded by n so reruns see the
    // same data.
    let mut rng = StdRng::seed_from_u64(N as u64);
    let a_host: Vec<f32> = (0..N).map(|_| rng.gen::<f32>()).collect();
    let b_host: Vec<f32> = (0..N).map(|_| rng.gen::<f32>()).collect();
    println!("Data generated for n={N}!");

    let source = load_kernel_source(Path::new(KERNEL_PATH))?;
    let kernel = VecAddKernel::new(&ctx, &source)?;
    let buffers = VecAddBuffers::new(&ctx, &a_host, &b_host)?;
    let bind_group = kernel.bind(&ctx, &buffers);

    let bytes = N as f64 * std::mem::size_of::<f32>() as f64;

    // Phase 1: kernel execution. Each lap is one dispatch plus the wait
    // for device-side completion.
    let mut timer = LapTimer::start();
    for _ in 0..ITERS {
        kernel.dispatch(&ctx, &bind_group, N);
        timer.next_lap();
    }
    println!(
        "Kernel average time: {}+-{} s",
        timer.lap_avg(),
        timer.lap_std()
    );
    println!("GFlops: {}", N as f64 / 1e9 / timer.lap_avg());
    println!(
        "VRAM bandwidth: {} GB/s",
        bytes * 3.0 / GIB / timer.lap_avg()
    );

    // Phase 2: result transfer. Each lap copies the full result buffer
    // back to host memory.
    let mut timer = LapTimer::start();
    let mut c_host = Vec::new();
    for _ in 0..ITERS {
        c_host = buffers.read_result(&ctx)?;
        timer.next_lap();
    }
    println!(
        "Result data transfer time: {}+-{} s",
        timer.lap_avg(),
        timer.lap_std()
    );
    println!(
        "VRAM -> RAM bandwidth: {} GB/s",
        bytes / GIB / timer.lap_avg()
    );

    verify_sum(&a_host, &b_host, &c_host)?;

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
