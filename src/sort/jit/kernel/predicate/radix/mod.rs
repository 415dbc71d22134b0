//! Marking a bit of the quantized keys.

pub use super::*;

use bytemuck::{bytes_of, Pod, Zeroable};

/// Arguments.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Arguments {
    /// The key bit of the predicate.
    pub bit: u32,
    /// `N`
    pub count: u32,
}

/// Inputs.
#[derive(Clone, Debug)]
pub struct Inputs<'a, R: JitRuntime> {
    /// `[N]`
    pub indices: &'a JitTensor<R>,
    /// `[2]`
    pub key_range: &'a JitTensor<R>,
    /// `[N]`
    pub keys: &'a JitTensor<R>,
    /// The first level, `[N]`
    pub level: &'a ScanLevel<JitTensor<R>>,
}

/// Marking bit `b` of `quantize(key[index[i]])`.
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
            inputs.indices.handle.to_owned().binding(),
            inputs.key_range.handle.to_owned().binding(),
            inputs.keys.handle.to_owned().binding(),
            inputs.level.counts_false.handle.to_owned().binding(),
            inputs.level.counts_true.handle.to_owned().binding(),
        ],
    );
}
