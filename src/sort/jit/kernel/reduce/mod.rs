//! Reducing the key range.

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
    pub keys: &'a JitTensor<R>,
    /// `[S_k, 2]` for every level of the reduction
    pub ranges: &'a [JitTensor<R>],
}

/// Reducing the keys to `[min, max]` in the last level of `ranges`.
///
/// The level sizes should be [`reduction_sizes`](crate::sort::reduction_sizes)
/// of `N`.
pub fn main<R: JitRuntime>(
    arguments: Arguments,
    inputs: Inputs<R>,
) {
    impl_kernel_source!(Kernel1, "kernel.1.wgsl");
    impl_kernel_source!(Kernel2, "kernel.2.wgsl");

    let client = &inputs.keys.client;
    let mut count = arguments.count;

    // Launching the kernel 1 from the keys

    let Some((first, rest)) = inputs.ranges.split_first() else {
        return;
    };
    client.execute(
        Box::new(SourceKernel::new(Kernel1, CUBE_DIM)),
        group_count_by_block(count.div_ceil(BLOCK_SIZE)),
        vec![
            client.create(bytes_of(&Arguments { count })).binding(),
            inputs.keys.handle.to_owned().binding(),
            first.handle.to_owned().binding(),
        ],
    );
    count = count.div_ceil(BLOCK_SIZE);

    // Launching the kernel 2 from the previous level

    let mut previous = first;
    for ranges in rest {
        client.execute(
            Box::new(SourceKernel::new(Kernel2, CUBE_DIM)),
            group_count_by_block(count.div_ceil(BLOCK_SIZE)),
            vec![
                client.create(bytes_of(&Arguments { count })).binding(),
                previous.handle.to_owned().binding(),
                ranges.handle.to_owned().binding(),
            ],
        );
        count = count.div_ceil(BLOCK_SIZE);
        previous = ranges;
    }
}
