//! Scanning the blocks of a level.

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
    /// `[S_k / B]`, used with [`Propagation::WithGroupPropagation`]
    pub level_next: Option<&'a ScanLevel<JitTensor<R>>>,
}

/// Scanning every block of `2 * T` counts inclusively in place.
///
/// The block totals are written to the next level if it propagates.
pub fn main<R: JitRuntime>(
    arguments: Arguments,
    inputs: Inputs<R>,
) {
    impl_kernel_source!(Kernel1, "kernel.1.wgsl");
    impl_kernel_source!(Kernel2, "kernel.2.wgsl");

    let client = &inputs.level.counts_false.client;
    let level = inputs.level;
    let group_count = group_count_by_block(arguments.count.div_ceil(BLOCK_SIZE));
    let mut bindings = vec![
        client.create(bytes_of(&arguments)).binding(),
        level.counts_false.handle.to_owned().binding(),
        level.counts_true.handle.to_owned().binding(),
    ];

    match (Propagation::of(arguments.count as usize), inputs.level_next) {
        (Propagation::WithGroupPropagation, Some(level_next)) => {
            // Launching the kernel 1

            bindings.push(level_next.counts_false.handle.to_owned().binding());
            bindings.push(level_next.counts_true.handle.to_owned().binding());
            client.execute(
                Box::new(SourceKernel::new(Kernel1, CUBE_DIM)),
                group_count,
                bindings,
            );
        },
        _ => {
            // Launching the kernel 2

            client.execute(
                Box::new(SourceKernel::new(Kernel2, CUBE_DIM)),
                group_count,
                bindings,
            );
        },
    }
}
