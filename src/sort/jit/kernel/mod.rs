//! JIT kernels.

pub mod indirect;
pub mod key;
pub mod predicate;
pub mod reduce;
pub mod reset;
pub mod scan;
pub mod scatter;

pub use crate::{
    backend::{BoolElement, FloatElement, IntElement, JitBackend, JitRuntime},
    preset::sort::*,
    sort::{Propagation, ScanLevel, ScanPyramid},
};
pub use burn_jit::{
    cubecl::KernelId,
    template::{KernelSource, SourceTemplate},
    tensor::JitTensor,
};

use burn_jit::{
    cubecl::{CubeCount, CubeDim},
    template::SourceKernel,
};

macro_rules! impl_kernel_source {
    ($kernel: ident, $source_path: expr) => {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $kernel;

        impl KernelSource for $kernel {
            fn source(&self) -> SourceTemplate {
                SourceTemplate::new(include_str!($source_path))
            }

            fn id(&self) -> KernelId {
                KernelId::new::<Self>()
            }
        }
    };
}

pub(crate) use impl_kernel_source;

/// `(T, 1, 1)`
pub const CUBE_DIM: CubeDim = CubeDim {
    x: GROUP_SIZE,
    y: 1,
    z: 1,
};

/// The groups of `T` threads covering `invocation_count` invocations.
///
/// The grid is folded into `y` once `x` exceeds [`GROUP_COUNT_X_MAX`].
/// The kernels flatten it as `(y * X + x) * T + t`.
pub fn group_count(invocation_count: u32) -> CubeCount {
    let count = invocation_count.div_ceil(GROUP_SIZE).max(1);
    let count_x = count.min(GROUP_COUNT_X_MAX);
    let count_y = count.div_ceil(count_x);
    CubeCount::Static(count_x, count_y, 1)
}

/// The groups of `T` threads covering `block_count` blocks of `2 * T` elements.
pub fn group_count_by_block(block_count: u32) -> CubeCount {
    group_count(block_count.saturating_mul(GROUP_SIZE))
}

#[cfg(test)]
mod tests {
    #[test]
    fn group_count_folds_large_grids() {
        use super::*;

        let dims = |count| match group_count(count) {
            CubeCount::Static(x, y, z) => (x, y, z),
            _ => unreachable!(),
        };

        assert_eq!(dims(0), (1, 1, 1));
        assert_eq!(dims(1), (1, 1, 1));
        assert_eq!(dims(65), (2, 1, 1));
        assert_eq!(dims(GROUP_SIZE * GROUP_COUNT_X_MAX), (GROUP_COUNT_X_MAX, 1, 1));
        assert_eq!(
            dims(GROUP_SIZE * GROUP_COUNT_X_MAX + 1),
            (GROUP_COUNT_X_MAX, 2, 1)
        );
        assert_eq!(dims(1 << 30).1, (1_u32 << 24).div_ceil(GROUP_COUNT_X_MAX));
    }
}
