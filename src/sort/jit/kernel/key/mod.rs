//! Extracting the sort keys.

pub use super::*;

use bytemuck::{bytes_of, Pod, Zeroable};

/// Arguments.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Arguments {
    /// `D`
    pub direction: [f32; 3],
    /// `N`
    pub count: u32,
}

/// Inputs.
#[derive(Clone, Debug)]
pub struct Inputs<'a, R: JitRuntime> {
    /// `[N, 3]`
    pub positions: &'a JitTensor<R>,
    /// `[N]`
    pub keys: &'a JitTensor<R>,
}

/// `key[i] = dot(D, position[i])`
pub fn main<R: JitRuntime>(
    arguments: Arguments,
    inputs: Inputs<R>,
) {
    impl_kernel_source!(Kernel, "kernel.wgsl");

    let client = &inputs.keys.client;

    client.execute(
        Box::new(SourceKernel::new(Kernel, CUBE_DIM)),
        group_count(arguments.count),
        vec![
            client.create(bytes_of(&arguments)).binding(),
            inputs.positions.handle.to_owned().binding(),
            inputs.keys.handle.to_owned().binding(),
        ],
    );
}
