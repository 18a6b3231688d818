// device.rs — adapter enumeration, selection, and the GPU context.
//
// Responsibilities:
//   - Initialise the wgpu instance once and report failure explicitly;
//     nothing else in the crate touches the driver before this succeeds.
//   - Enumerate adapters backend-by-backend in a fixed order and pick
//     one according to the selection policy below.
//   - Own device and queue for the process lifetime (`GpuContext`).
//
// SELECTION POLICY
// Backends are the "platforms" of this program; within each backend,
// adapters come back in wgpu's enumeration order. The scan walks
// backends in BACKEND_ORDER and adapters within each:
//   - the first adapter classified GPU wins immediately;
//   - failing that, the *last* adapter classified CPU wins; later CPUs
//     override earlier ones, which decides the winner on multi-backend
//     machines where a software device shows up more than once;
//   - failing that, selection errors out.
// `DeviceType::Other` counts as neither class and is never selected.
// The policy is a pure function over device types (`pick`) so synthetic
// topologies are testable without a driver.

use std::fmt;

use crate::error::BenchError;

/// Backend scan order. Listed from the backend most likely to expose a
/// discrete GPU down to the GL fallback.
const BACKEND_ORDER: [wgpu::Backends; 4] = [
    wgpu::Backends::VULKAN,
    wgpu::Backends::METAL,
    wgpu::Backends::DX12,
    wgpu::Backends::GL,
];

/// Coarse adapter classification used by the selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceClass {
    Gpu,
    Cpu,
    Other,
}

fn classify(ty: wgpu::DeviceType) -> DeviceClass {
    match ty {
        wgpu::DeviceType::DiscreteGpu
        | wgpu::DeviceType::IntegratedGpu
        | wgpu::DeviceType::VirtualGpu => DeviceClass::Gpu,
        wgpu::DeviceType::Cpu => DeviceClass::Cpu,
        wgpu::DeviceType::Other => DeviceClass::Other,
    }
}

/// Index of the selected adapter: first GPU in scan order, else the
/// last CPU, else `None`.
fn pick(types: &[wgpu::DeviceType]) -> Option<usize> {
    let mut cpu = None;
    for (i, &ty) in types.iter().enumerate() {
        match classify(ty) {
            DeviceClass::Gpu => return Some(i),
            DeviceClass::Cpu => cpu = Some(i),
            DeviceClass::Other => {}
        }
    }
    cpu
}

/// Cached info about the selected adapter, for reporting.
#[derive(Debug, Clone)]
pub struct AdapterDesc {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
}

impl fmt::Display for AdapterDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?}, {:?})",
            self.name, self.backend, self.device_type
        )
    }
}

/// The one GPU context of the program: device, queue, and the info of
/// the adapter they were created on.
///
/// Created once at startup, dropped once at exit. wgpu resources are
/// released by `Drop` on every exit path, including the error paths.
///
/// # Field drop order
/// Rust drops struct fields in declaration order. `_instance` is
/// declared last so the `wgpu::Instance` outlives `device` and `queue`;
/// some drivers crash when the instance dies while device-level objects
/// still reference it.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter: AdapterDesc,
    _instance: wgpu::Instance,
}

impl GpuContext {
    /// Initialise the driver, scan adapters, select one, and request a
    /// device on it.
    ///
    /// # Errors
    /// [`BenchError::NoSuitableAdapter`] when no adapter classifies as
    /// GPU or CPU; [`BenchError::DeviceRequest`] when the device request
    /// on the selected adapter fails.
    pub fn new() -> Result<Self, BenchError> {
        pollster::block_on(Self::init_async())
    }

    async fn init_async() -> Result<Self, BenchError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Platform-then-device scan order: all adapters of BACKEND_ORDER[0]
        // before any adapter of BACKEND_ORDER[1], and so on.
        let mut adapters: Vec<wgpu::Adapter> = Vec::new();
        for backend in BACKEND_ORDER {
            adapters.extend(instance.enumerate_adapters(backend));
        }

        let types: Vec<wgpu::DeviceType> = adapters
            .iter()
            .map(|a| {
                let info = a.get_info();
                log::debug!(
                    "adapter: {} ({:?}, {:?})",
                    info.name,
                    info.backend,
                    info.device_type
                );
                info.device_type
            })
            .collect();

        let selected = pick(&types).ok_or(BenchError::NoSuitableAdapter)?;
        let adapter = adapters.swap_remove(selected);

        let info = adapter.get_info();
        let desc = AdapterDesc {
            name: info.name,
            backend: info.backend,
            device_type: info.device_type,
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("vecadd-bench"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(BenchError::DeviceRequest)?;

        Ok(GpuContext {
            device,
            queue,
            adapter: desc,
            _instance: instance,
        })
    }
}

impl fmt::Display for GpuContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GpuContext {{ adapter: {} }}", self.adapter)
    }
}
