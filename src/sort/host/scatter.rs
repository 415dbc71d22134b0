//! Scattering the indices into the stable partition.

pub use super::*;

use rayon::prelude::*;

/// Writing the false indices first and the true indices after.
///
/// Each block writes its own slices of both partitions.
pub fn main(
    indices: &[u32],
    level: &ScanLevel<Vec<u32>>,
    output: &mut [u32],
) {
    let block_size = BLOCK_SIZE as usize;
    let counts_false = &level.counts_false;
    let counts_true = &level.counts_true;
    let total_false = counts_false.last().copied().unwrap_or_default();

    let (output_false, output_true) = output.split_at_mut(total_false as usize);
    let outputs_false = split_by_block(output_false, counts_false, block_size);
    let outputs_true = split_by_block(output_true, counts_true, block_size);

    indices
        .par_chunks(block_size)
        .zip(outputs_false)
        .zip(outputs_true)
        .enumerate()
        .for_each(|(block, ((indices, output_false), output_true))| {
            let start = block * block_size;
            let mut slots_false = output_false.iter_mut();
            let mut slots_true = output_true.iter_mut();

            indices.iter().enumerate().for_each(|(offset, &index)| {
                let position = start + offset;
                let is_false = match position {
                    0 => counts_false[0] > 0,
                    _ => counts_false[position] > counts_false[position - 1],
                };
                let slot = if is_false {
                    slots_false.next()
                } else {
                    slots_true.next()
                };
                if let Some(slot) = slot {
                    *slot = index;
                }
            });
        });
}

/// Splitting the `output` into the slices written by each block.
fn split_by_block<'a>(
    mut output: &'a mut [u32],
    counts: &[u32],
    block_size: usize,
) -> Vec<&'a mut [u32]> {
    let mut total_previous = 0;
    counts
        .chunks(block_size)
        .map(|block| {
            let total = block.last().copied().unwrap_or(total_previous);
            let (head, tail) = std::mem::take(&mut output)
                .split_at_mut((total - total_previous) as usize);
            output = tail;
            total_previous = total;
            head
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #[test]
    fn split_by_block_follows_block_totals() {
        use super::*;

        let mut counts = vec![0; 300];
        counts[..128].iter_mut().enumerate().for_each(|(i, c)| *c = i as u32 / 2);
        counts[128..256].fill(70);
        counts[256..].fill(75);
        let mut output = vec![0; 75];

        let sizes = split_by_block(&mut output, &counts, 128)
            .iter()
            .map(|slice| slice.len())
            .collect::<Vec<_>>();
        assert_eq!(sizes, [63, 7, 5]);
    }
}
