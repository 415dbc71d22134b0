//! Resetting the indices.

pub use super::*;

use rayon::prelude::*;

/// Filling the identity permutation.
pub fn main(indices: &mut [u32]) {
    indices
        .par_iter_mut()
        .enumerate()
        .for_each(|(position, index)| *index = position as u32);
}
