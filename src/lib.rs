#![allow(missing_docs)]

pub mod backend;
pub mod error;
pub mod preset;
pub mod schedule;
pub mod scene;
pub mod sort;
pub mod view;
