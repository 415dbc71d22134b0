//! Geometry and buffers of the hierarchical scan.

pub use super::*;

/// The level sizes of `count` elements.
///
/// `size(0) = count`, `size(k + 1) = ceil(size(k) / BLOCK_SIZE)`,
/// continuing while `size(k) > 1`.
pub fn level_sizes(count: usize) -> Vec<usize> {
    let mut sizes = vec![count];
    let mut size = count;
    while size > 1 {
        size = size.div_ceil(BLOCK_SIZE as usize);
        sizes.push(size);
    }
    sizes
}

/// The level sizes of the key-range reduction of `count` keys.
///
/// It is `level_sizes(count)` without the keys, and ends in one slot.
pub fn reduction_sizes(count: usize) -> Vec<usize> {
    match level_sizes(count).split_first() {
        Some((_, sizes)) if !sizes.is_empty() => sizes.to_vec(),
        _ => vec![1],
    }
}

/// How the block scan of a level ends.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Propagation {
    /// The block totals are written to the next level.
    WithGroupPropagation,
    /// The level fits in one block.
    Leaf,
}

impl Propagation {
    #[inline]
    pub fn of(size: usize) -> Self {
        if size > BLOCK_SIZE as usize {
            Self::WithGroupPropagation
        } else {
            Self::Leaf
        }
    }
}

/// The counters of a level.
#[derive(Clone, Debug)]
pub struct ScanLevel<T> {
    /// The element count.
    pub size: usize,
    /// The count of false predicates.
    pub counts_false: T,
    /// The count of true predicates.
    pub counts_true: T,
}

/// The levels of the scan.
#[derive(Clone, Debug)]
pub struct ScanPyramid<T> {
    pub levels: Vec<ScanLevel<T>>,
}

impl<T> ScanPyramid<T> {
    /// Allocating the counters of every level with `allocate(size)`.
    pub fn new(
        count: usize,
        mut allocate: impl FnMut(usize) -> Result<T, Error>,
    ) -> Result<Self, Error> {
        let sizes = level_sizes(count);
        let mut levels = Vec::new();
        levels.try_reserve_exact(sizes.len())?;

        for size in sizes {
            levels.push(ScanLevel {
                size,
                counts_false: allocate(size)?,
                counts_true: allocate(size)?,
            });
        }

        #[cfg(debug_assertions)]
        log::debug!(
            target: "gausplat::sorter::pyramid",
            "new > level_sizes ({:?})",
            levels.iter().map(|level| level.size).collect::<Vec<_>>(),
        );

        Ok(Self { levels })
    }

    /// The levels visited by a scan, up to the first one fitting in a block.
    #[inline]
    pub fn active_level_count(&self) -> usize {
        self.levels
            .iter()
            .position(|level| Propagation::of(level.size) == Propagation::Leaf)
            .map_or(self.levels.len(), |index| index + 1)
    }

    /// The level at `index` and the next level.
    #[inline]
    pub fn level_pair_mut(
        &mut self,
        index: usize,
    ) -> (&mut ScanLevel<T>, Option<&mut ScanLevel<T>>) {
        let (head, tail) = self.levels.split_at_mut(index + 1);
        (&mut head[index], tail.first_mut())
    }

    /// The level sizes.
    #[inline]
    pub fn sizes(&self) -> Vec<usize> {
        self.levels.iter().map(|level| level.size).collect()
    }
}
