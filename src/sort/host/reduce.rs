//! Reducing the key range.

pub use super::*;

use rayon::prelude::*;

/// Reducing the `keys` to `[min, max]` through the `levels`.
///
/// The level sizes should be [`reduction_sizes`] of the key count.
pub fn main(
    keys: &[f32],
    levels: &mut [Vec<[f32; 2]>],
) -> [f32; 2] {
    let block_size = BLOCK_SIZE as usize;

    if let Some(first) = levels.first_mut() {
        first
            .par_iter_mut()
            .zip(keys.par_chunks(block_size))
            .for_each(|(range, keys)| {
                *range = keys
                    .iter()
                    .fold([f32::INFINITY, f32::NEG_INFINITY], |[min, max], &key| {
                        [min.min(key), max.max(key)]
                    });
            });
    }

    for index in 1..levels.len() {
        let (head, tail) = levels.split_at_mut(index);
        tail[0]
            .par_iter_mut()
            .zip(head[index - 1].par_chunks(block_size))
            .for_each(|(range, ranges)| {
                *range = ranges.iter().fold(
                    [f32::INFINITY, f32::NEG_INFINITY],
                    |[min, max], &[min_next, max_next]| {
                        [min.min(min_next), max.max(max_next)]
                    },
                );
            });
    }

    levels
        .last()
        .and_then(|level| level.first())
        .copied()
        .unwrap_or_default()
}
