/// Maximum view-space distance of a visible splat.
pub const CULL_DISTANCE_MAX: f32 = 125.0;
/// `2 * T`
pub const BLOCK_SIZE: u32 = GROUP_SIZE * 2;
/// Maximum of the first dimension of a dispatched grid.
pub const GROUP_COUNT_X_MAX: u32 = (1 << 16) - 1;
/// `T`
pub const GROUP_SIZE: u32 = 64;
/// `|Key|`
pub const KEY_BIT_COUNT: u32 = 16;
/// `2 ^ |Key| - 1`
pub const KEY_CODE_MAX: u32 = (1 << KEY_BIT_COUNT) - 1;
/// Vertices of the quad drawn for every splat.
pub const VERTEX_COUNT_PER_SPLAT: u32 = 6;
