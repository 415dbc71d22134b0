//! Sorting and culling with JIT kernels.

pub mod kernel;

pub use super::*;
pub use crate::backend::{
    BoolElement, FloatElement, IntElement, JitBackend, JitRuntime, WgpuRuntime,
};
pub use burn_jit::tensor::JitTensor;

use crate::view::to_f32_matrix;
use burn::tensor::{
    ops::{FloatTensorOps, IntTensorOps},
    TensorData,
};
use bytemuck::{cast_slice, pod_read_unaligned};
use humansize::{format_size, BINARY};
use std::marker::PhantomData;

/// [`JitSorter`] on wgpu.
pub type WgpuSorter = JitSorter<WgpuRuntime, f32, i32, u32>;

/// A [`SplatSorter`] whose buffers reside in the accelerator.
///
/// Every stage is enqueued without waiting.
/// The buffers are owned by one sorter, so it is not [`Clone`].
#[derive(Debug)]
pub struct JitSorter<R: JitRuntime, F: FloatElement, I: IntElement, B: BoolElement>
{
    pub options: SplatSorterOptions,
    /// `[N]`
    colors: JitTensor<R>,
    /// `[N, 6]`
    covariances: JitTensor<R>,
    /// `[4]`
    draw_indirect: JitTensor<R>,
    /// `[N]` for both
    indices: IndexBuffers<JitTensor<R>>,
    /// `[N]`
    keys: JitTensor<R>,
    /// `[N, 3]`
    positions: JitTensor<R>,
    pyramid: ScanPyramid<JitTensor<R>>,
    /// `[S_k, 2]` for every level of the reduction
    ranges: Vec<JitTensor<R>>,
    sorted: IndexRole,
    splat_count: u32,
    __phantom: PhantomData<(F, I, B)>,
}

impl<R: JitRuntime, F: FloatElement, I: IntElement, B: BoolElement>
    JitSorter<R, F, I, B>
{
    /// Uploading the `scene` to the `device`.
    pub fn new(
        scene: &SplatScene,
        options: SplatSorterOptions,
        device: &R::Device,
    ) -> Result<Self, Error> {
        let count = scene.splat_count();
        if count == 0 || count > u32::MAX as usize {
            return Err(Error::Validation(
                format!("splat count ({count})"),
                format!("in [1, {}]", u32::MAX),
            ));
        }
        let splat_count = count as u32;

        // Uploading the attributes

        let positions = JitBackend::<R, F, I, B>::float_from_data(
            TensorData::new(scene.positions.to_owned(), [count, 3]),
            device,
        );
        let covariances = JitBackend::<R, F, I, B>::float_from_data(
            TensorData::new(scene.covariances.to_owned(), [count, 6]),
            device,
        );
        let colors = JitBackend::<R, F, I, B>::int_from_data(
            TensorData::new(cast_slice::<u32, i32>(&scene.colors).to_vec(), [count]),
            device,
        );
        let draw_indirect = JitBackend::<R, F, I, B>::int_from_data(
            TensorData::new(
                cast_slice::<DrawIndirect, i32>(&[DrawIndirect::new(splat_count)]).to_vec(),
                [4],
            ),
            device,
        );

        // Allocating the working buffers

        let int_empty =
            |size: usize| JitBackend::<R, F, I, B>::int_empty([size].into(), device);
        let indices = IndexBuffers::new(int_empty(count), int_empty(count));
        let keys = JitBackend::<R, F, I, B>::float_empty([count].into(), device);
        let pyramid = ScanPyramid::new(count, |size| Ok(int_empty(size)))?;
        let ranges = reduction_sizes(count)
            .into_iter()
            .map(|size| JitBackend::<R, F, I, B>::float_zeros([size, 2].into(), device))
            .collect();

        let sorted = IndexRole::A;
        kernel::reset::main(
            kernel::reset::Arguments { count: splat_count },
            kernel::reset::Inputs {
                indices: indices.get(sorted),
            },
        );

        log::info!(
            target: "gausplat::sorter::jit",
            "new > splat_count ({splat_count}), scene ({}), buffers ({})",
            scene.size_readable(),
            format_size(
                size_of::<u32>() * count * 4
                    + size_of::<u32>() * pyramid.sizes().iter().sum::<usize>() * 2,
                BINARY.decimal_places(1),
            ),
        );

        Ok(Self {
            options,
            colors,
            covariances,
            draw_indirect,
            indices,
            keys,
            positions,
            pyramid,
            ranges,
            sorted,
            splat_count,
            __phantom: PhantomData,
        })
    }

    /// The published indices, `[N]`.
    #[inline]
    pub fn indices(&self) -> &JitTensor<R> {
        self.indices.current()
    }

    /// The arguments of the indirect draw, `[4]`.
    #[inline]
    pub fn draw_indirect(&self) -> &JitTensor<R> {
        &self.draw_indirect
    }

    /// The colors packed as `r | g << 8 | b << 16 | a << 24`, `[N]`.
    #[inline]
    pub fn colors(&self) -> &JitTensor<R> {
        &self.colors
    }

    /// The upper triangles of covariances, `[N, 6]`.
    #[inline]
    pub fn covariances(&self) -> &JitTensor<R> {
        &self.covariances
    }

    /// The centers, `[N, 3]`.
    #[inline]
    pub fn positions(&self) -> &JitTensor<R> {
        &self.positions
    }

    /// Reading the published indices back.
    pub fn read_indices(&self) -> Vec<u32> {
        read_u32(self.indices.current(), self.splat_count as usize)
    }

    /// Reading `[min, max]` of the keys back.
    ///
    /// It is `[0.0, 0.0]` before the first sort.
    pub fn read_key_range(&self) -> [f32; 2] {
        let key_range = self.key_range();
        let bytes = key_range
            .client
            .read_one(key_range.handle.to_owned().binding());
        pod_read_unaligned(&bytes[..size_of::<[f32; 2]>()])
    }

    /// Reading the arguments of the indirect draw back.
    pub fn read_draw_indirect(&self) -> DrawIndirect {
        let bytes = self
            .draw_indirect
            .client
            .read_one(self.draw_indirect.handle.to_owned().binding());
        pod_read_unaligned(&bytes[..size_of::<DrawIndirect>()])
    }

    /// `[2]`
    #[inline]
    fn key_range(&self) -> &JitTensor<R> {
        // The reduction always has a level of one slot
        &self.ranges[self.ranges.len() - 1]
    }
}

impl<R: JitRuntime, F: FloatElement, I: IntElement, B: BoolElement> SplatSorter
    for JitSorter<R, F, I, B>
{
    #[inline]
    fn splat_count(&self) -> usize {
        self.splat_count as usize
    }

    fn set_sort_direction(
        &mut self,
        direction: [f32; 3],
    ) {
        let count = self.splat_count;

        #[cfg(debug_assertions)]
        log::debug!(
            target: "gausplat::sorter::jit",
            "set_sort_direction > direction ({direction:?})",
        );

        // Extracting the keys

        kernel::key::main(
            kernel::key::Arguments { direction, count },
            kernel::key::Inputs {
                positions: &self.positions,
                keys: &self.keys,
            },
        );

        // Reducing the key range

        kernel::reduce::main(
            kernel::reduce::Arguments { count },
            kernel::reduce::Inputs {
                keys: &self.keys,
                ranges: &self.ranges,
            },
        );

        // Sorting the indices bit by bit

        let mut pass = Some(RadixPass::first(self.sorted));
        while let Some(current) = pass {
            let indices = self.indices.get(current.reading);
            let level = &self.pyramid.levels[0];

            kernel::predicate::radix::main(
                kernel::predicate::radix::Arguments {
                    bit: current.bit,
                    count,
                },
                kernel::predicate::radix::Inputs {
                    indices,
                    key_range: self.key_range(),
                    keys: &self.keys,
                    level,
                },
            );
            kernel::scan::main(&self.pyramid);
            kernel::scatter::main(
                kernel::scatter::Arguments { count },
                kernel::scatter::Inputs {
                    indices,
                    level,
                    indices_output: self.indices.get(current.writing()),
                },
            );

            pass = current.next();
        }

        // Publishing all the sorted indices

        self.indices.publish(self.sorted);
        kernel::indirect::main(
            kernel::indirect::Arguments {
                count,
                is_culled: false as u32,
            },
            kernel::indirect::Inputs {
                draw_indirect: &self.draw_indirect,
                level: &self.pyramid.levels[0],
            },
        );
    }

    fn cull(
        &mut self,
        view: &View,
    ) {
        let count = self.splat_count;
        let level = &self.pyramid.levels[0];
        let indices = self.indices.get(self.sorted);

        #[cfg(debug_assertions)]
        log::debug!(
            target: "gausplat::sorter::jit",
            "cull > view_position ({:?})",
            view.view_position,
        );

        // Marking and scanning the culled splats

        kernel::predicate::visible::main(
            kernel::predicate::visible::Arguments {
                projection_transform: to_f32_matrix(&view.projection_transform()),
                view_transform: to_f32_matrix(&view.view_transform),
                cull_distance_max: self.options.cull_distance_max,
                count,
                _padding: [0; 2],
            },
            kernel::predicate::visible::Inputs {
                colors: &self.colors,
                indices,
                level,
                positions: &self.positions,
            },
        );
        kernel::scan::main(&self.pyramid);

        // Publishing the visible indices first

        let culled = self.sorted.other();
        kernel::scatter::main(
            kernel::scatter::Arguments { count },
            kernel::scatter::Inputs {
                indices,
                level,
                indices_output: self.indices.get(culled),
            },
        );
        kernel::indirect::main(
            kernel::indirect::Arguments {
                count,
                is_culled: true as u32,
            },
            kernel::indirect::Inputs {
                draw_indirect: &self.draw_indirect,
                level,
            },
        );
        self.indices.publish(culled);
    }
}

/// Reading `count` words of the `tensor` back.
fn read_u32<R: JitRuntime>(
    tensor: &JitTensor<R>,
    count: usize,
) -> Vec<u32> {
    let bytes = tensor.client.read_one(tensor.handle.to_owned().binding());
    bytes
        .chunks_exact(size_of::<u32>())
        .take(count)
        .map(pod_read_unaligned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{SplatScene, View};

    /// A scene whose splats lie on the x axis at `xs`.
    fn scene_on_axis(xs: &[f32]) -> SplatScene {
        let positions = xs.iter().flat_map(|&x| [x, 0.0, 0.0]).collect();
        SplatScene::new(positions, vec![1e-3; xs.len() * 6], &vec![255; xs.len() * 4])
            .unwrap()
    }

    #[test]
    fn new_resets_indices() {
        use super::*;
        use crate::backend::WgpuDevice;

        let device = &WgpuDevice::default();
        let sorter =
            WgpuSorter::new(&scene_on_axis(&[0.0; 300]), Default::default(), device)
                .unwrap();

        assert_eq!(sorter.read_indices(), (0..300_u32).collect::<Vec<_>>());
        assert_eq!(sorter.read_draw_indirect(), DrawIndirect::new(300));
        assert_eq!(sorter.read_key_range(), [0.0, 0.0]);
    }

    #[test]
    fn single_splat_is_kept_by_sort_and_cull() {
        use super::*;
        use crate::backend::WgpuDevice;

        let device = &WgpuDevice::default();
        let scene =
            SplatScene::new(vec![0.0, 0.0, -5.0], vec![1e-3; 6], &[255; 4]).unwrap();
        let mut sorter = WgpuSorter::new(&scene, Default::default(), device).unwrap();

        sorter.set_sort_direction([0.0, 0.0, 1.0]);
        assert_eq!(sorter.read_indices(), [0]);
        assert_eq!(sorter.read_key_range(), [-5.0, -5.0]);
        assert_eq!(sorter.read_draw_indirect().instance_count, 1);

        sorter.cull(&View::default());
        assert_eq!(sorter.read_indices(), [0]);
        assert_eq!(sorter.read_draw_indirect().instance_count, 1);

        sorter.set_sort_direction([0.0, 0.0, 1.0]);
        assert_eq!(sorter.read_indices(), [0]);
        assert_eq!(sorter.read_draw_indirect(), DrawIndirect::new(1));
    }

    #[test]
    fn set_sort_direction_reduces_exact_range() {
        use super::*;
        use crate::backend::WgpuDevice;
        use rand::{rngs::StdRng, SeedableRng};
        use rand_distr::{Distribution, Uniform};

        let device = &WgpuDevice::default();
        let count = 20000;
        let mut xs = Uniform::new(-4.0_f32, 7.0)
            .sample_iter(StdRng::seed_from_u64(0x5EED))
            .take(count)
            .collect::<Vec<_>>();
        xs[1234] = -5.0;
        xs[17777] = 7.25;

        let mut sorter =
            WgpuSorter::new(&scene_on_axis(&xs), Default::default(), device).unwrap();
        sorter.set_sort_direction([1.0, 0.0, 0.0]);

        assert_eq!(sorter.read_key_range(), [-5.0, 7.25]);
    }

    #[test]
    fn set_sort_direction_matches_stable_sort_on_codes() {
        use super::*;
        use crate::backend::WgpuDevice;
        use rand::{rngs::StdRng, Rng, SeedableRng};
        use rayon::slice::ParallelSliceMut;

        let device = &WgpuDevice::default();
        [1, 127, 128, 129, 300, 10000, 16385, 1 << 18]
            .into_iter()
            .for_each(|count| {
                // Integral keys in [0, KEY_CODE_MAX] are their own codes
                let mut xs = StdRng::seed_from_u64(count as u64)
                    .sample_iter(rand_distr::Uniform::new_inclusive(0, KEY_CODE_MAX))
                    .take(count)
                    .map(|x| x as f32)
                    .collect::<Vec<_>>();
                xs[0] = 0.0;
                if count > 1 {
                    xs[count / 2] = KEY_CODE_MAX as f32;
                }
                let mut sorter =
                    WgpuSorter::new(&scene_on_axis(&xs), Default::default(), device)
                        .unwrap();
                sorter.set_sort_direction([1.0, 0.0, 0.0]);

                let key_range = sorter.read_key_range();
                let mut indices_target = (0..count as u32).collect::<Vec<_>>();
                indices_target.par_sort_by_key(|&index| {
                    quantize_key(xs[index as usize], key_range)
                });

                if count > 1 {
                    assert_eq!(key_range, [0.0, KEY_CODE_MAX as f32], "count: {count}");
                }
                assert_eq!(sorter.read_indices(), indices_target, "count: {count}");
                assert_eq!(
                    sorter.read_draw_indirect().instance_count,
                    count as u32,
                    "count: {count}"
                );
            });
    }

    #[test]
    fn set_sort_direction_is_idempotent() {
        use super::*;
        use crate::backend::WgpuDevice;

        let device = &WgpuDevice::default();
        let scene = SplatScene::random(3000, 0x1D).unwrap();
        let mut sorter = WgpuSorter::new(&scene, Default::default(), device).unwrap();

        sorter.set_sort_direction([0.0, 0.6, 0.8]);
        let indices_first = sorter.read_indices();
        sorter.set_sort_direction([0.0, 0.6, 0.8]);

        assert_eq!(sorter.read_indices(), indices_first);
    }

    #[test]
    fn cull_keeps_visible_splats_first() {
        use super::*;
        use crate::backend::WgpuDevice;

        let device = &WgpuDevice::default();
        let positions = vec![
            0.0, 0.0, 5.0, //
            0.0, 0.0, -5.0, //
            100.0, 0.0, -5.0, //
            0.0, 0.0, -5.0,
        ];
        let colors = [
            [255, 0, 0, 255],
            [0, 255, 0, 0],
            [0, 0, 255, 255],
            [255, 255, 255, 255],
        ]
        .concat();
        let scene = SplatScene::new(positions, vec![1e-3; 4 * 6], &colors).unwrap();

        let mut sorter = WgpuSorter::new(&scene, Default::default(), device).unwrap();
        sorter.cull(&View::default());

        assert_eq!(sorter.read_draw_indirect().instance_count, 1);
        assert_eq!(sorter.read_indices(), [3, 0, 1, 2]);

        sorter.set_sort_direction([0.0, 0.0, 1.0]);
        assert_eq!(sorter.read_draw_indirect(), DrawIndirect::new(4));
    }

    #[test]
    fn sorters_of_one_scene_keep_their_own_indices() {
        use super::*;
        use crate::backend::WgpuDevice;

        let device = &WgpuDevice::default();
        let positions = vec![
            1.0, 0.0, -5.0, //
            -1.0, 0.0, -5.0, //
            0.0, 0.0, -5.0,
        ];
        let scene = SplatScene::new(positions, vec![1e-3; 3 * 6], &[255; 3 * 4]).unwrap();
        let view_front = View::default();
        let view_back = View::look_at(
            [0.0, 0.0, -10.0],
            [0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0],
            10.0_f64.to_radians(),
            1.0,
        );

        let mut sorter_front = WgpuSorter::new(&scene, Default::default(), device).unwrap();
        let mut sorter_back = WgpuSorter::new(&scene, Default::default(), device).unwrap();
        sorter_front.cull(&view_front);
        sorter_back.cull(&view_back);

        assert_eq!(sorter_front.read_indices(), [0, 1, 2]);
        assert_eq!(sorter_front.read_draw_indirect().instance_count, 3);
        assert_eq!(sorter_back.read_indices(), [2, 0, 1]);
        assert_eq!(sorter_back.read_draw_indirect().instance_count, 1);
    }

    #[test]
    fn cull_matches_host() {
        use super::*;
        use crate::backend::WgpuDevice;

        let device = &WgpuDevice::default();
        let scene = SplatScene::random(50000, 0xC011).unwrap();
        let view = View::look_at(
            [-1.5, -0.5, -0.5],
            [1.0, 1.0, 0.0],
            [0.0, -1.0, -0.17],
            50.0_f64.to_radians(),
            16.0 / 9.0,
        );

        let mut sorter_host = HostSorter::new(scene.to_owned(), Default::default()).unwrap();
        let mut sorter_jit = WgpuSorter::new(&scene, Default::default(), device).unwrap();
        sorter_host.cull(&view);
        sorter_jit.cull(&view);

        let count_host = sorter_host.draw_indirect().instance_count;
        let count_jit = sorter_jit.read_draw_indirect().instance_count;
        assert!(count_host > 0 && count_host < 50000, "{count_host}");
        assert!(count_host.abs_diff(count_jit) <= 2, "{count_host} != {count_jit}");
    }
}
