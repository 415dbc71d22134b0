//! Testing the visibility of splats.

pub use super::*;

use crate::view::to_f32_matrix;

/// The view volume with a distance limit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    pub cull_distance_max: f32,
    /// `M[col][row]`
    pub projection_transform: [[f32; 4]; 4],
    /// `M[col][row]`
    pub view_transform: [[f32; 4]; 4],
}

impl Frustum {
    pub fn new(
        view: &View,
        cull_distance_max: f32,
    ) -> Self {
        Self {
            cull_distance_max,
            projection_transform: to_f32_matrix(&view.projection_transform()),
            view_transform: to_f32_matrix(&view.view_transform),
        }
    }

    /// Whether the splat is opaque at some degree, close enough
    /// and strictly inside the view volume.
    pub fn is_visible(
        &self,
        position: [f32; 3],
        color: u32,
    ) -> bool {
        if color >> 24 == 0 {
            return false;
        }

        let position_view = transform(
            &self.view_transform,
            [position[0], position[1], position[2], 1.0],
        );
        let distance = (position_view[0] * position_view[0]
            + position_view[1] * position_view[1]
            + position_view[2] * position_view[2])
            .sqrt();
        if distance > self.cull_distance_max {
            return false;
        }

        let position_clip = transform(&self.projection_transform, position_view);
        let w = position_clip[3];
        w > 0.0
            && position_clip[..3].iter().all(|&c| {
                let ndc = c / w;
                ndc > -1.0 && ndc < 1.0
            })
    }
}

/// `M * v`
#[inline]
fn transform(
    m: &[[f32; 4]; 4],
    v: [f32; 4],
) -> [f32; 4] {
    [0, 1, 2, 3].map(|r| {
        m[0][r] * v[0] + m[1][r] * v[1] + m[2][r] * v[2] + m[3][r] * v[3]
    })
}
