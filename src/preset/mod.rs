pub mod schedule;
pub mod sort;
