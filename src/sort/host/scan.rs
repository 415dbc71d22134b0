//! Scanning the predicates.

pub use super::*;

use rayon::prelude::*;

/// Evaluating the `predicate` of every index into the first level.
pub fn mark(
    indices: &[u32],
    level: &mut ScanLevel<Vec<u32>>,
    predicate: impl Fn(u32) -> bool + Sync,
) {
    level
        .counts_false
        .par_iter_mut()
        .zip(level.counts_true.par_iter_mut())
        .zip(indices.par_iter())
        .for_each(|((count_false, count_true), &index)| {
            let is_true = predicate(index);
            *count_false = !is_true as u32;
            *count_true = is_true as u32;
        });
}

/// Scanning the marked first level inclusively.
pub fn main(pyramid: &mut ScanPyramid<Vec<u32>>) {
    let level_count = pyramid.active_level_count();

    // Scanning the blocks of each level upwards

    for index in 0..level_count {
        let (level, next) = pyramid.level_pair_mut(index);
        let next = match Propagation::of(level.size) {
            Propagation::WithGroupPropagation => next,
            Propagation::Leaf => None,
        };
        scan_level(level, next);
    }

    // Adding the scanned totals of previous blocks downwards

    for index in (0..level_count.saturating_sub(1)).rev() {
        if let (level, Some(next)) = pyramid.level_pair_mut(index) {
            add_level(&mut level.counts_false, &next.counts_false);
            add_level(&mut level.counts_true, &next.counts_true);
        }
    }
}

fn scan_level(
    level: &mut ScanLevel<Vec<u32>>,
    next: Option<&mut ScanLevel<Vec<u32>>>,
) {
    let block_size = BLOCK_SIZE as usize;
    let blocks = level
        .counts_false
        .par_chunks_mut(block_size)
        .zip(level.counts_true.par_chunks_mut(block_size));

    match next {
        Some(next) => blocks
            .zip(
                next.counts_false
                    .par_iter_mut()
                    .zip(next.counts_true.par_iter_mut()),
            )
            .for_each(|((block_false, block_true), (total_false, total_true))| {
                *total_false = scan_block(block_false);
                *total_true = scan_block(block_true);
            }),
        None => blocks.for_each(|(block_false, block_true)| {
            scan_block(block_false);
            scan_block(block_true);
        }),
    }
}

/// Returning the block total.
fn scan_block(counts: &mut [u32]) -> u32 {
    counts.iter_mut().fold(0, |total, count| {
        *count += total;
        *count
    })
}

fn add_level(
    counts: &mut [u32],
    totals: &[u32],
) {
    counts
        .par_chunks_mut(BLOCK_SIZE as usize)
        .skip(1)
        .zip(totals.par_iter())
        .for_each(|(block, &total)| {
            block.iter_mut().for_each(|count| *count += total);
        });
}
