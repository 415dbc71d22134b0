//! Scattering the indices into the stable partition.

pub use super::*;

use bytemuck::{bytes_of, Pod, Zeroable};

/// Arguments.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Arguments {
    /// `N`
    pub count: u32,
}

/// Inputs.
#[derive(Clone, Debug)]
pub struct Inputs<'a, R: JitRuntime> {
    /// `[N]`
    pub indices: &'a JitTensor<R>,
    /// The scanned first level, `[N]`
    pub level: &'a ScanLevel<JitTensor<R>>,
    /// `[N]`
    pub indices_output: &'a JitTensor<R>,
}

/// Writing the false indices first and the true indices after.
pub fn main<R: JitRuntime>(
    arguments: Arguments,
    inputs: Inputs<R>,
) {
    impl_kernel_source!(Kernel, "kernel.wgsl");

    let client = &inputs.indices.client;

    client.execute(
        Box::new(SourceKernel::new(Kernel, CUBE_DIM)),
        group_count(arguments.count),
        vec![
            client.create(bytes_of(&arguments)).binding(),
            inputs.indices.handle.to_owned().binding(),
            inputs.level.counts_false.handle.to_owned().binding(),
            inputs.level.counts_true.handle.to_owned().binding(),
            inputs.indices_output.handle.to_owned().binding(),
        ],
    );
}
