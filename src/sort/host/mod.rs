//! Sorting and culling on the CPU.

pub mod key;
pub mod reduce;
pub mod reset;
pub mod scan;
pub mod scatter;
pub mod visible;

pub use super::*;
pub use visible::Frustum;

use rayon::prelude::*;

/// A [`SplatSorter`] running the block algorithm with rayon.
#[derive(Clone)]
pub struct HostSorter {
    pub options: SplatSorterOptions,
    draw_indirect: DrawIndirect,
    indices: IndexBuffers<Vec<u32>>,
    key_range: [f32; 2],
    keys: Vec<f32>,
    pyramid: ScanPyramid<Vec<u32>>,
    ranges: Vec<Vec<[f32; 2]>>,
    scene: SplatScene,
    sorted: IndexRole,
}

impl HostSorter {
    pub fn new(
        scene: SplatScene,
        options: SplatSorterOptions,
    ) -> Result<Self, Error> {
        let splat_count = scene.splat_count();
        if splat_count == 0 || splat_count > u32::MAX as usize {
            return Err(Error::Validation(
                format!("splat count ({splat_count})"),
                format!("in [1, {}]", u32::MAX),
            ));
        }

        let mut indices = IndexBuffers::new(
            allocate::<u32>(splat_count)?,
            allocate::<u32>(splat_count)?,
        );
        let keys = allocate(splat_count)?;
        let pyramid = ScanPyramid::new(splat_count, allocate)?;
        let ranges = reduction_sizes(splat_count)
            .into_iter()
            .map(allocate)
            .collect::<Result<Vec<_>, _>>()?;

        let sorted = IndexRole::A;
        let (_, writing) = indices.split(sorted.other());
        reset::main(writing);
        indices.publish(sorted);

        #[cfg(debug_assertions)]
        log::debug!(
            target: "gausplat::sorter::host",
            "new > splat_count ({splat_count}), scene ({})",
            scene.size_readable(),
        );

        Ok(Self {
            options,
            draw_indirect: DrawIndirect::new(splat_count as u32),
            indices,
            key_range: [0.0; 2],
            keys,
            pyramid,
            ranges,
            scene,
            sorted,
        })
    }

    /// The published indices.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        self.indices.current()
    }

    #[inline]
    pub fn draw_indirect(&self) -> DrawIndirect {
        self.draw_indirect
    }

    /// `[min, max]` of the keys.
    #[inline]
    pub fn key_range(&self) -> [f32; 2] {
        self.key_range
    }

    #[inline]
    pub fn keys(&self) -> &[f32] {
        &self.keys
    }

    #[inline]
    pub fn scene(&self) -> &SplatScene {
        &self.scene
    }
}

impl SplatSorter for HostSorter {
    #[inline]
    fn splat_count(&self) -> usize {
        self.scene.splat_count()
    }

    fn set_sort_direction(
        &mut self,
        direction: [f32; 3],
    ) {
        key::main(direction, &self.scene.positions, &mut self.keys);
        self.key_range = reduce::main(&self.keys, &mut self.ranges);

        #[cfg(debug_assertions)]
        log::debug!(
            target: "gausplat::sorter::host",
            "set_sort_direction > key_range ({:?})",
            self.key_range,
        );

        let keys = &self.keys;
        let key_range = self.key_range;
        let mut pass = Some(RadixPass::first(self.sorted));
        while let Some(current) = pass {
            let (reading, writing) = self.indices.split(current.reading);
            let mask = 1 << current.bit;
            scan::mark(reading, &mut self.pyramid.levels[0], |index| {
                quantize_key(keys[index as usize], key_range) & mask != 0
            });
            scan::main(&mut self.pyramid);
            scatter::main(reading, &self.pyramid.levels[0], writing);
            pass = current.next();
        }

        self.indices.publish(self.sorted);
        self.draw_indirect.instance_count = self.splat_count() as u32;
    }

    fn cull(
        &mut self,
        view: &View,
    ) {
        let frustum = Frustum::new(view, self.options.cull_distance_max);
        let scene = &self.scene;
        let (reading, writing) = self.indices.split(self.sorted);
        scan::mark(reading, &mut self.pyramid.levels[0], |index| {
            let index = index as usize;
            !frustum.is_visible(scene.position(index), scene.colors[index])
        });
        scan::main(&mut self.pyramid);
        scatter::main(reading, &self.pyramid.levels[0], writing);

        self.indices.publish(self.sorted.other());
        self.draw_indirect.instance_count = self.pyramid.levels[0]
            .counts_false
            .last()
            .copied()
            .unwrap_or_default();

        #[cfg(debug_assertions)]
        log::debug!(
            target: "gausplat::sorter::host",
            "cull > instance_count ({})",
            self.draw_indirect.instance_count,
        );
    }
}

impl std::fmt::Debug for HostSorter {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("HostSorter")
            .field("options", &self.options)
            .field("draw_indirect", &self.draw_indirect)
            .field("key_range", &self.key_range)
            .field("level_sizes", &self.pyramid.sizes())
            .field("scene", &self.scene)
            .finish()
    }
}

/// Allocating `size` default values.
fn allocate<T: Clone + Default>(size: usize) -> Result<Vec<T>, Error> {
    let mut values = Vec::new();
    values.try_reserve_exact(size)?;
    values.resize(size, T::default());
    Ok(values)
}
