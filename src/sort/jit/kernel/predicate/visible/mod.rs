//! Marking the culled splats.

pub use super::*;

use bytemuck::{bytes_of, Pod, Zeroable};

/// Arguments.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Arguments {
    /// `M_p[col][row]`
    pub projection_transform: [[f32; 4]; 4],
    /// `M_v[col][row]`
    pub view_transform: [[f32; 4]; 4],
    pub cull_distance_max: f32,
    /// `N`
    pub count: u32,
    pub _padding: [u32; 2],
}

/// Inputs.
#[derive(Clone, Debug)]
pub struct Inputs<'a, R: JitRuntime> {
    /// `[N]`
    pub colors: &'a JitTensor<R>,
    /// `[N]`
    pub indices: &'a JitTensor<R>,
    /// The first level, `[N]`
    pub level: &'a ScanLevel<JitTensor<R>>,
    /// `[N, 3]`
    pub positions: &'a JitTensor<R>,
}

/// Marking whether `index[i]` is outside the frustum.
pub fn main<R: JitRuntime>(
    arguments: Arguments,
    inputs: Inputs<R>,
) {
    impl_kernel_source!(Kernel, "kernel.wgsl");

    let client = &inputs.positions.client;

    client.execute(
        Box::new(SourceKernel::new(Kernel, CUBE_DIM)),
        group_count(arguments.count),
        vec![
            client.create(bytes_of(&arguments)).binding(),
            inputs.colors.handle.to_owned().binding(),
            inputs.indices.handle.to_owned().binding(),
            inputs.positions.handle.to_owned().binding(),
            inputs.level.counts_false.handle.to_owned().binding(),
            inputs.level.counts_true.handle.to_owned().binding(),
        ],
    );
}
