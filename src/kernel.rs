// kernel.rs — kernel source loading, pipeline build, buffer triple,
// dispatch, and result readback.
//
// The kernel itself is WGSL loaded at runtime from KERNEL_PATH, the way
// the original tool shipped its kernel next to the binary — a missing
// or empty file is a startup error, not a silent fallback. Compilation
// runs inside a wgpu validation error scope so the compiler diagnostic
// ends up in the error instead of in an uncaptured-error panic.
//
// DISPATCH SHAPE
// One-dimensional: ceil(n / WORKGROUP_SIZE) workgroups of WORKGROUP_SIZE
// invocations, i.e. a global range of ceil(n / 128) * 128. The shader
// guards `i >= n` for the tail workgroup. Every dispatch is submitted
// and then waited on with `device.poll(Wait)` — fully synchronous.

use std::fs;
use std::path::Path;

use wgpu::util::DeviceExt;

use crate::device::GpuContext;
use crate::error::BenchError;

/// Fixed relative path of the kernel source, resolved against the
/// working directory.
pub const KERNEL_PATH: &str = "src/shaders/vec_add.wgsl";

/// Invocations per workgroup. Must match `@workgroup_size` in
/// `vec_add.wgsl`.
pub const WORKGROUP_SIZE: u32 = 128;

/// Number of workgroups needed to cover `n` elements: ceiling division,
/// so the last workgroup may run partially out of range.
pub fn workgroup_count(n: u32) -> u32 {
    (n + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE
}

/// Read the kernel source from `path`.
///
/// # Errors
/// [`BenchError::KernelSource`] if the file is unreadable,
/// [`BenchError::EmptyKernelSource`] if it is empty.
pub fn load_kernel_source(path: &Path) -> Result<String, BenchError> {
    let source = fs::read_to_string(path).map_err(|e| BenchError::KernelSource {
        path: path.to_path_buf(),
        source: e,
    })?;
    if source.is_empty() {
        return Err(BenchError::EmptyKernelSource {
            path: path.to_path_buf(),
        });
    }
    Ok(source)
}

// ---------------------------------------------------------------------------
// Uniform params (must match WGSL struct Params exactly)
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct VecAddParams {
    n: u32,
}

// ---------------------------------------------------------------------------
// VecAddKernel
// ---------------------------------------------------------------------------

/// The compiled element-wise addition pipeline.
///
/// Create once from loaded WGSL source; dispatch as many times as
/// needed. Binding order is fixed: A (0), B (1), C (2), params (3).
#[derive(Debug)]
pub struct VecAddKernel {
    pipeline: wgpu::ComputePipeline,
    bgl: wgpu::BindGroupLayout,
}

impl VecAddKernel {
    /// Compile `source` and build the compute pipeline.
    ///
    /// # Errors
    /// [`BenchError::ShaderBuild`] carrying the compiler diagnostic when
    /// wgpu rejects the module or pipeline.
    pub fn new(ctx: &GpuContext, source: &str) -> Result<Self, BenchError> {
        ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("vec_add.wgsl"),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        let bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("VecAdd BGL"),
                entries: &[
                    // 0 — operand A (storage, read-only)
                    storage_entry(0, true),
                    // 1 — operand B (storage, read-only)
                    storage_entry(1, true),
                    // 2 — result C (storage, read-write)
                    storage_entry(2, false),
                    // 3 — element count uniform
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("VecAdd pipeline layout"),
                bind_group_layouts: &[&bgl],
                push_constant_ranges: &[],
            });

        let pipeline = ctx
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("vec_add"),
                layout: Some(&layout),
                module: &shader,
                entry_point: "vec_add",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });

        if let Some(err) = pollster::block_on(ctx.device.pop_error_scope()) {
            return Err(BenchError::ShaderBuild {
                log: err.to_string(),
            });
        }

        Ok(VecAddKernel { pipeline, bgl })
    }

    /// Bind the buffer triple and element count in their fixed order.
    pub fn bind(&self, ctx: &GpuContext, buffers: &VecAddBuffers) -> wgpu::BindGroup {
        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("VecAdd BG"),
            layout: &self.bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffers.a.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.b.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffers.c.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: buffers.params.as_entire_binding(),
                },
            ],
        })
    }

    /// Submit one kernel dispatch over `n` elements and block until the
    /// device has finished it.
    pub fn dispatch(&self, ctx: &GpuContext, bind_group: &wgpu::BindGroup, n: u32) {
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("VecAdd dispatch"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("vec_add"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(workgroup_count(n), 1, 1);
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));
        ctx.device.poll(wgpu::Maintain::Wait);
    }
}

fn map_error(detail: String) -> BenchError {
    BenchError::Api {
        call: "staging map_async",
        detail,
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

// ---------------------------------------------------------------------------
// VecAddBuffers
// ---------------------------------------------------------------------------

/// The device-resident buffer triple plus the params uniform and a
/// reusable readback staging buffer.
///
/// A and B are populated from host data at creation and never written
/// again; C is written only by the kernel. All three hold exactly `n`
/// elements. Everything is released by `Drop`.
pub struct VecAddBuffers {
    a: wgpu::Buffer,
    b: wgpu::Buffer,
    c: wgpu::Buffer,
    params: wgpu::Buffer,
    staging: wgpu::Buffer,
    n: u32,
}

impl VecAddBuffers {
    /// Allocate the triple, uploading `a_host` and `b_host` into the
    /// operand buffers. The result buffer starts zero-filled.
    ///
    /// # Panics
    /// Panics if the operand slices differ in length — the equal-length
    /// invariant is a caller bug, not a runtime condition.
    ///
    /// # Errors
    /// [`BenchError::Api`] when the device reports out-of-memory during
    /// allocation.
    pub fn new(ctx: &GpuContext, a_host: &[f32], b_host: &[f32]) -> Result<Self, BenchError> {
        assert_eq!(
            a_host.len(),
            b_host.len(),
            "operand lengths differ: {} vs {}",
            a_host.len(),
            b_host.len()
        );
        let n = a_host.len() as u32;
        let byte_len = (a_host.len() * std::mem::size_of::<f32>()) as u64;

        ctx.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let a = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("VecAdd A"),
                contents: bytemuck::cast_slice(a_host),
                usage: wgpu::BufferUsages::STORAGE,
            });
        let b = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("VecAdd B"),
                contents: bytemuck::cast_slice(b_host),
                usage: wgpu::BufferUsages::STORAGE,
            });
        let c = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("VecAdd C"),
            size: byte_len,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let params = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("VecAdd params"),
                contents: bytemuck::bytes_of(&VecAddParams { n }),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("VecAdd staging"),
            size: byte_len,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        if let Some(err) = pollster::block_on(ctx.device.pop_error_scope()) {
            return Err(BenchError::Api {
                call: "buffer allocation",
                detail: err.to_string(),
            });
        }

        Ok(VecAddBuffers {
            a,
            b,
            c,
            params,
            staging,
            n,
        })
    }

    /// Element count of each buffer in the triple.
    pub fn len(&self) -> u32 {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Copy the result buffer back to host memory, blocking until the
    /// copy and the map have completed.
    ///
    /// Reuses the internal staging buffer, so repeated readbacks do not
    /// allocate.
    ///
    /// # Errors
    /// [`BenchError::Api`] when the buffer map fails.
    pub fn read_result(&self, ctx: &GpuContext) -> Result<Vec<f32>, BenchError> {
        let byte_len = self.n as u64 * std::mem::size_of::<f32>() as u64;

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("VecAdd readback"),
            });
        encoder.copy_buffer_to_buffer(&self.c, 0, &self.staging, 0, byte_len);
        ctx.queue.submit(std::iter::once(encoder.finish()));

        let slice = self.staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        ctx.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|e| map_error(e.to_string()))?
            .map_err(|e| map_error(e.to_string()))?;

        let mapped = slice.get_mapped_range();
        let out: Vec<f32> = bytemuck::cast_slice(&mapped).to_vec();
        drop(mapped);
        self.staging.unmap();

        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
