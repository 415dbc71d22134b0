//! Extracting the sort keys.

pub use super::*;

use rayon::prelude::*;

/// `key[i] = dot(direction, position[i])`
pub fn main(
    direction: [f32; 3],
    positions: &[f32],
    keys: &mut [f32],
) {
    keys.par_iter_mut()
        .zip(positions.par_chunks_exact(3))
        .for_each(|(key, position)| {
            *key = direction[0] * position[0]
                + direction[1] * position[1]
                + direction[2] * position[2];
        });
}
