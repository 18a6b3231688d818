// vecadd-bench: element-wise f32 addition benchmark on the best
// available wgpu adapter.
//
// The binary (src/main.rs) drives one linear pass: select an adapter,
// upload two random operand arrays, time 20 kernel dispatches and 20
// result readbacks, then verify the output against a host reference.

pub mod device;
pub mod error;
pub mod kernel;
pub mod stats;
pub mod verify;
