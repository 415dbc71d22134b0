pub mod splat;

pub use splat::{AttributeSource, SplatScene};
