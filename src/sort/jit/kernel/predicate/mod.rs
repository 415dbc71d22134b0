//! Marking the predicates into the first scan level.

pub mod radix;
pub mod visible;

pub use super::*;
