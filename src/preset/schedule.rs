use std::f64::consts::PI;

/// Minimum camera rotation (in radians) that triggers a cull.
pub const CULL_ANGLE_THRESHOLD: f64 = 0.01;
/// Minimum camera translation that triggers a cull.
pub const CULL_DISTANCE_THRESHOLD: f64 = 0.01;
/// Rotation of the sort direction (in radians, widened by the half field of view)
/// that triggers a sort.
pub const SORT_ANGLE_THRESHOLD: f64 = PI * 0.333;
