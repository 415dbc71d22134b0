//! Sorting and culling the splats.

pub mod host;
pub mod jit;
pub mod pyramid;

pub use crate::{
    error::Error,
    preset::sort::*,
    schedule::{FramePlan, FrameSchedule},
    scene::SplatScene,
    view::View,
};
pub use host::HostSorter;
pub use jit::JitSorter;
pub use pyramid::{
    level_sizes, reduction_sizes, Propagation, ScanLevel, ScanPyramid,
};

use burn::config::Config;
use bytemuck::{Pod, Zeroable};

/// A sorter of splats, which publishes the back-to-front and visible indices.
pub trait SplatSorter {
    /// `N`
    fn splat_count(&self) -> usize;

    /// Extracting the keys along the unit `direction`,
    /// reducing the key range and sorting the indices by the keys.
    ///
    /// The published indices are all the splats in ascending key order.
    fn set_sort_direction(
        &mut self,
        direction: [f32; 3],
    );

    /// Partitioning the sorted indices into the visible and the culled
    /// in the `view`, and publishing the visible count.
    fn cull(
        &mut self,
        view: &View,
    );

    /// Running the stages planned by the `schedule` for the `view`.
    fn update(
        &mut self,
        schedule: &mut FrameSchedule,
        view: &View,
    ) -> FramePlan {
        let plan = schedule.plan(view);

        if plan.sort {
            self.set_sort_direction(view.sort_direction().map(|v| v as f32));
        }
        if plan.cull {
            self.cull(view);
        }

        plan
    }
}

#[derive(Config, Debug, PartialEq)]
pub struct SplatSorterOptions {
    /// Maximum view-space distance of a visible splat.
    #[config(default = "CULL_DISTANCE_MAX")]
    pub cull_distance_max: f32,
}

impl Default for SplatSorterOptions {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// The arguments of an indirect draw call.
#[repr(C)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Pod, Zeroable)]
pub struct DrawIndirect {
    pub vertex_count: u32,
    /// The visible splat count.
    pub instance_count: u32,
    pub first_vertex: u32,
    pub first_instance: u32,
}

impl DrawIndirect {
    /// Drawing all `splat_count` splats.
    #[inline]
    pub const fn new(splat_count: u32) -> Self {
        Self {
            vertex_count: VERTEX_COUNT_PER_SPLAT,
            instance_count: splat_count,
            first_vertex: 0,
            first_instance: 0,
        }
    }
}

/// The role of an index buffer.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum IndexRole {
    #[default]
    A,
    B,
}

impl IndexRole {
    #[inline]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Two index buffers, one of which is published as current.
#[derive(Clone, Debug)]
pub struct IndexBuffers<T> {
    a: T,
    b: T,
    current: IndexRole,
}

impl<T> IndexBuffers<T> {
    #[inline]
    pub fn new(
        a: T,
        b: T,
    ) -> Self {
        Self {
            a,
            b,
            current: IndexRole::A,
        }
    }

    /// The published buffer.
    #[inline]
    pub fn current(&self) -> &T {
        self.get(self.current)
    }

    #[inline]
    pub fn current_role(&self) -> IndexRole {
        self.current
    }

    #[inline]
    pub fn get(
        &self,
        role: IndexRole,
    ) -> &T {
        match role {
            IndexRole::A => &self.a,
            IndexRole::B => &self.b,
        }
    }

    /// The `reading` buffer and the other one for writing.
    #[inline]
    pub fn split(
        &mut self,
        reading: IndexRole,
    ) -> (&T, &mut T) {
        match reading {
            IndexRole::A => (&self.a, &mut self.b),
            IndexRole::B => (&self.b, &mut self.a),
        }
    }

    #[inline]
    pub fn publish(
        &mut self,
        role: IndexRole,
    ) {
        self.current = role;
    }
}

/// A pass of the radix sort.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RadixPass {
    /// The key bit of the predicate.
    pub bit: u32,
    /// The role of the buffer to scan.
    pub reading: IndexRole,
}

impl RadixPass {
    /// The pass of the least significant bit.
    #[inline]
    pub const fn first(reading: IndexRole) -> Self {
        Self { bit: 0, reading }
    }

    /// The role of the buffer to scatter into.
    #[inline]
    pub const fn writing(&self) -> IndexRole {
        self.reading.other()
    }

    /// The pass reading what this pass writes, or none after the last bit.
    #[inline]
    pub const fn next(self) -> Option<Self> {
        if self.bit + 1 < KEY_BIT_COUNT {
            Some(Self {
                bit: self.bit + 1,
                reading: self.writing(),
            })
        } else {
            None
        }
    }
}

/// Quantizing the key into `[0, KEY_CODE_MAX]`.
///
/// `floor((key - min) / (max - min) * KEY_CODE_MAX + 0.5)`
#[inline]
pub fn quantize_key(
    key: f32,
    key_range: [f32; 2],
) -> u32 {
    let [min, max] = key_range;
    let range = max - min;
    if range <= 0.0 {
        return 0;
    }
    let code = ((key - min) / range * KEY_CODE_MAX as f32 + 0.5).floor();
    (code.max(0.0) as u32).min(KEY_CODE_MAX)
}
