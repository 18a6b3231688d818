// error.rs — crate-wide error type.
//
// Two families, matching how failures actually occur here:
//   - API errors: a non-success condition reported by wgpu (validation,
//     out-of-memory, buffer mapping). Tagged with the originating call
//     site so the message names where things went wrong.
//   - Logic errors: no usable adapter, unreadable/empty kernel source,
//     shader build failure, result mismatch.
//
// Every variant is fatal. Nothing in this crate retries or degrades:
// errors unwind to main(), which prints the message and exits non-zero.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors from any phase of the benchmark.
#[derive(Debug)]
pub enum BenchError {
    /// No adapter classified as GPU or CPU was found on any backend.
    NoSuitableAdapter,
    /// wgpu device request failed on the selected adapter.
    DeviceRequest(wgpu::RequestDeviceError),
    /// The kernel source file could not be read.
    KernelSource { path: PathBuf, source: io::Error },
    /// The kernel source file exists but is empty.
    EmptyKernelSource { path: PathBuf },
    /// Shader module or pipeline creation was rejected; `log` carries
    /// the compiler diagnostic wgpu reported.
    ShaderBuild { log: String },
    /// A wgpu call failed; `call` names the originating call site.
    Api { call: &'static str, detail: String },
    /// Verification found an output that is not the exact sum of its
    /// inputs.
    Mismatch { index: usize, got: f32, lhs: f32, rhs: f32 },
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchError::NoSuitableAdapter => write!(
                f,
                "no suitable adapter found (no GPU or CPU device on any backend)"
            ),
            BenchError::DeviceRequest(e) => write!(f, "device request failed: {e}"),
            BenchError::KernelSource { path, source } => write!(
                f,
                "failed to read kernel source {}: {source}",
                path.display()
            ),
            BenchError::EmptyKernelSource { path } => write!(
                f,
                "kernel source {} is empty (working directory misconfigured?)",
                path.display()
            ),
            BenchError::ShaderBuild { log } => write!(f, "shader build failed:\n{log}"),
            BenchError::Api { call, detail } => write!(f, "{call} failed: {detail}"),
            BenchError::Mismatch { index, got, lhs, rhs } => write!(
                f,
                "result mismatch at index {index}: c = {got}, a = {lhs}, b = {rhs}"
            ),
        }
    }
}

impl std::error::Error for BenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BenchError::DeviceRequest(e) => Some(e),
            BenchError::KernelSource { source, .. } => Some(source),
            _ => None,
        }
    }
}
