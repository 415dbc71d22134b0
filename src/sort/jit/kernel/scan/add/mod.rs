//! Adding the scanned block totals.

pub use super::*;

use bytemuck::{bytes_of, Pod, Zeroable};

/// Arguments.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Arguments {
    /// `S_k`
    pub count: u32,
}

/// Inputs.
#[derive(Clone, Debug)]
pub struct Inputs<'a, R: JitRuntime> {
    /// `[S_k]`
    pub level: &'a ScanLevel<JitTensor<R>>,
    /// The scanned totals, `[S_k / B]`
    pub level_next: &'a ScanLevel<JitTensor<R>>,
}

/// `level[i] += level_next[i / B - 1]` for `i >= B`
pub fn main<R: JitRuntime>(
    arguments: Arguments,
    inputs: Inputs<R>,
) {
    impl_kernel_source!(Kernel, "kernel.wgsl");

    let client = &inputs.level.counts_false.client;

    client.execute(
        Box::new(SourceKernel::new(Kernel, CUBE_DIM)),
        group_count(arguments.count),
        vec![
            client.create(bytes_of(&arguments)).binding(),
            inputs.level.counts_false.handle.to_owned().binding(),
            inputs.level.counts_true.handle.to_owned().binding(),
            inputs.level_next.counts_false.handle.to_owned().binding(),
            inputs.level_next.counts_true.handle.to_owned().binding(),
        ],
    );
}
