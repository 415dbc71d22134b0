//! ## Usage
//!
//! To run the benchmarks, execute the following command in the console:
//!
//! ```sh
//! cargo bench --bench sort
//! ```

use divan::Bencher;
use gausplat_sorter::{
    backend::{Backend, Wgpu, WgpuDevice},
    scene::SplatScene,
    sort::{jit::WgpuSorter, HostSorter, SplatSorter},
    view::View,
};

fn main() {
    divan::main();
}

mod cpu {
    use super::*;

    #[divan::bench(sample_count = 20, sample_size = 1)]
    fn set_sort_direction(bencher: Bencher) {
        bencher
            .with_inputs(|| {
                HostSorter::new(data::scene(), Default::default()).unwrap()
            })
            .bench_local_refs(|sorter| {
                sorter.set_sort_direction(data::DIRECTION);
            });
    }

    #[divan::bench(sample_count = 100, sample_size = 1)]
    fn cull(bencher: Bencher) {
        let view = data::view();

        bencher
            .with_inputs(|| {
                HostSorter::new(data::scene(), Default::default()).unwrap()
            })
            .bench_local_refs(|sorter| sorter.cull(&view));
    }
}

mod gpu {
    use super::*;

    #[divan::bench(sample_count = 20, sample_size = 1)]
    fn set_sort_direction(bencher: Bencher) {
        let device = WgpuDevice::default();

        bencher
            .with_inputs(|| {
                WgpuSorter::new(&data::scene(), Default::default(), &device)
                    .unwrap()
            })
            .bench_local_refs(|sorter| {
                sorter.set_sort_direction(data::DIRECTION);
                Wgpu::sync(&device);
            });
    }

    #[divan::bench(sample_count = 100, sample_size = 1)]
    fn cull(bencher: Bencher) {
        let device = WgpuDevice::default();
        let view = data::view();

        bencher
            .with_inputs(|| {
                WgpuSorter::new(&data::scene(), Default::default(), &device)
                    .unwrap()
            })
            .bench_local_refs(|sorter| {
                sorter.cull(&view);
                Wgpu::sync(&device);
            });
    }
}

mod data {
    use super::*;

    pub const DIRECTION: [f32; 3] = [0.0, 0.6, 0.8];

    pub fn scene() -> SplatScene {
        SplatScene::random(1 << 20, 0x5EED).unwrap()
    }

    pub fn view() -> View {
        View::look_at(
            [-5.0, -1.0, -1.0],
            [1.0, 1.0, 0.0],
            [0.0, -1.0, -0.17],
            50.0_f64.to_radians(),
            16.0 / 9.0,
        )
    }
}
