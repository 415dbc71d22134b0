pub use burn::{
    backend::wgpu::{WgpuDevice, WgpuRuntime},
    tensor::backend::Backend,
};
pub use burn_jit::{BoolElement, FloatElement, IntElement, JitBackend, JitRuntime};

pub type Wgpu = JitBackend<WgpuRuntime, f32, i32, u32>;
