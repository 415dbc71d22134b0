//! Publishing the instance count of the indirect draw.

pub use super::*;

use bytemuck::{bytes_of, Pod, Zeroable};

/// Arguments.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Arguments {
    /// `N`
    pub count: u32,
    /// Whether to publish the visible count instead of `N`.
    pub is_culled: u32,
}

/// Inputs.
#[derive(Clone, Debug)]
pub struct Inputs<'a, R: JitRuntime> {
    /// `[4]`
    pub draw_indirect: &'a JitTensor<R>,
    /// The scanned first level of the cull, `[N]`
    pub level: &'a ScanLevel<JitTensor<R>>,
}

/// Writing the instance count.
pub fn main<R: JitRuntime>(
    arguments: Arguments,
    inputs: Inputs<R>,
) {
    impl_kernel_source!(Kernel, "kernel.wgsl");

    let client = &inputs.draw_indirect.client;

    client.execute(
        Box::new(SourceKernel::new(Kernel, CUBE_DIM)),
        group_count(1),
        vec![
            client.create(bytes_of(&arguments)).binding(),
            inputs.level.counts_false.handle.to_owned().binding(),
            inputs.draw_indirect.handle.to_owned().binding(),
        ],
    );
}
