//! Scanning the predicates through the pyramid.

pub mod add;
pub mod block;

pub use super::*;

/// Scanning the marked first level of the `pyramid` inclusively.
pub fn main<R: JitRuntime>(pyramid: &ScanPyramid<JitTensor<R>>) {
    let level_count = pyramid.active_level_count();
    let levels = &pyramid.levels;

    // Scanning the blocks of each level upwards

    for index in 0..level_count {
        block::main(
            block::Arguments {
                count: levels[index].size as u32,
            },
            block::Inputs {
                level: &levels[index],
                level_next: levels.get(index + 1),
            },
        );
    }

    // Adding the scanned totals of previous blocks downwards

    for index in (0..level_count.saturating_sub(1)).rev() {
        add::main(
            add::Arguments {
                count: levels[index].size as u32,
            },
            add::Inputs {
                level: &levels[index],
                level_next: &levels[index + 1],
            },
        );
    }
}
