/// A perspective view in 3D space.
///
/// The view space is right-handed and looks down `-Z`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    /// Distance of the far clipping plane.
    pub clip_far: f64,
    /// Distance of the near clipping plane.
    pub clip_near: f64,
    /// The horizontal field of view in radians.
    pub field_of_view_x: f64,
    /// The vertical field of view in radians.
    pub field_of_view_y: f64,
    /// Position in world space.
    pub view_position: [f64; 3],
    /// Affine transformation from world space to view space.
    ///
    /// It is in **column-major order**, i.e., `M[col][row]`.
    ///
    /// # Format
    ///
    /// ```plaintext
    /// [R_v   | T_v]
    /// [...   | ...]
    /// [0 0 0 | 1  ]
    /// ```
    pub view_transform: [[f64; 4]; 4],
}

impl Default for View {
    fn default() -> Self {
        let field_of_view_y = 60.0_f64.to_radians();
        Self {
            clip_far: 1000.0,
            clip_near: 0.1,
            field_of_view_x: field_of_view_y,
            field_of_view_y,
            view_position: [0.0; 3],
            view_transform: Self::transform(
                &[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
                &[0.0; 3],
            ),
        }
    }
}

/// Constructors
impl View {
    /// A view at `eye` looking at `target`.
    ///
    /// `aspect_ratio` is `width / height`.
    pub fn look_at(
        eye: [f64; 3],
        target: [f64; 3],
        up: [f64; 3],
        field_of_view_y: f64,
        aspect_ratio: f64,
    ) -> Self {
        // Z_v <- normalize(eye - target)
        let axis_z = normalize(sub(eye, target));
        // X_v <- normalize(up x Z_v)
        let axis_x = normalize(cross(up, axis_z));
        // Y_v <- Z_v x X_v
        let axis_y = cross(axis_z, axis_x);

        // R_v's rows are the axes, and T_v <- -R_v * eye
        let rotation = [0, 1, 2].map(|c| [axis_x[c], axis_y[c], axis_z[c]]);
        let translation =
            [axis_x, axis_y, axis_z].map(|axis| -dot(axis, eye));

        let field_of_view_x =
            ((field_of_view_y / 2.0).tan() * aspect_ratio).atan() * 2.0;

        Self {
            field_of_view_x,
            field_of_view_y,
            view_position: eye,
            view_transform: Self::transform(&rotation, &translation),
            ..Default::default()
        }
    }
}

/// Linear transformations.
impl View {
    /// Returns the affine transformation matrix.
    ///
    /// It is in **column-major order**, i.e., `M[col][row]`.
    #[inline]
    pub const fn transform(
        rotation: &[[f64; 3]; 3],
        translation: &[f64; 3],
    ) -> [[f64; 4]; 4] {
        let r = rotation;
        let t = [translation];
        [
            [r[0][0], r[0][1], r[0][2], 0.0],
            [r[1][0], r[1][1], r[1][2], 0.0],
            [r[2][0], r[2][1], r[2][2], 0.0],
            [t[0][0], t[0][1], t[0][2], 1.0],
        ]
    }

    /// Perspective projection from view space to clip space.
    ///
    /// It is in **column-major order**, i.e., `M[col][row]`.
    /// The visible depth range maps to `[-1, 1]` in NDC.
    pub fn projection_transform(&self) -> [[f64; 4]; 4] {
        let f_x = 1.0 / (self.field_of_view_x / 2.0).tan();
        let f_y = 1.0 / (self.field_of_view_y / 2.0).tan();
        let n = self.clip_near;
        let f = self.clip_far;
        [
            [f_x, 0.0, 0.0, 0.0],
            [0.0, f_y, 0.0, 0.0],
            [0.0, 0.0, (f + n) / (n - f), -1.0],
            [0.0, 0.0, 2.0 * f * n / (n - f), 0.0],
        ]
    }

    /// The rotation from world space to view space, `M[col][row]`.
    #[inline]
    pub fn rotation(&self) -> [[f64; 3]; 3] {
        let m = &self.view_transform;
        [0, 1, 2].map(|c| [m[c][0], m[c][1], m[c][2]])
    }

    /// The backward axis of the view in world space.
    ///
    /// Sorting the keys along it in ascending order yields back-to-front order.
    #[inline]
    pub fn sort_direction(&self) -> [f64; 3] {
        let m = &self.view_transform;
        normalize([m[0][2], m[1][2], m[2][2]])
    }

    /// `max(Fov_x, Fov_y) / 2`
    #[inline]
    pub fn field_of_view_half_max(&self) -> f64 {
        self.field_of_view_x.max(self.field_of_view_y) / 2.0
    }
}

#[inline]
pub(crate) fn cross(
    a: [f64; 3],
    b: [f64; 3],
) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub(crate) fn dot(
    a: [f64; 3],
    b: [f64; 3],
) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub(crate) fn normalize(a: [f64; 3]) -> [f64; 3] {
    let norm = dot(a, a).sqrt();
    if norm > 0.0 {
        a.map(|c| c / norm)
    } else {
        a
    }
}

#[inline]
pub(crate) fn sub(
    a: [f64; 3],
    b: [f64; 3],
) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Casting a column-major matrix for kernels.
#[inline]
pub(crate) fn to_f32_matrix(m: &[[f64; 4]; 4]) -> [[f32; 4]; 4] {
    m.map(|c| c.map(|v| v as f32))
}

#[cfg(test)]
mod tests {
    #[test]
    fn transform() {
        use super::*;

        let target = [
            [0.0, 0.0, -1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.5, -0.25, 2.0, 1.0],
        ];
        let output = View::transform(
            &[[0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
            &[0.5, -0.25, 2.0],
        );
        assert_eq!(output, target);
    }

    #[test]
    fn look_at_places_target_on_negative_z() {
        use super::*;

        let view = View::look_at(
            [-5.0, -1.0, -1.0],
            [1.0, 1.0, 0.0],
            [0.0, -1.0, -0.17],
            50.0_f64.to_radians(),
            16.0 / 9.0,
        );
        let m = &view.view_transform;
        let apply = |p: [f64; 3]| {
            [0, 1, 2].map(|r| m[0][r] * p[0] + m[1][r] * p[1] + m[2][r] * p[2] + m[3][r])
        };

        let eye = apply([-5.0, -1.0, -1.0]);
        eye.iter().for_each(|c| assert!(c.abs() < 1e-9, "eye: {eye:?}"));

        let target = apply([1.0, 1.0, 0.0]);
        let distance = (6.0_f64 * 6.0 + 2.0 * 2.0 + 1.0).sqrt();
        assert!(target[0].abs() < 1e-9, "target: {target:?}");
        assert!(target[1].abs() < 1e-9, "target: {target:?}");
        assert!((target[2] + distance).abs() < 1e-9, "target: {target:?}");

        let direction = view.sort_direction();
        let backward = normalize(sub([-5.0, -1.0, -1.0], [1.0, 1.0, 0.0]));
        direction.iter().zip(backward).for_each(|(output, target)| {
            assert!((output - target).abs() < 1e-9);
        });
        assert!(view.field_of_view_x > view.field_of_view_y);
    }

    #[test]
    fn projection_maps_clip_planes() {
        use super::*;

        let view = View::default();
        let p = view.projection_transform();
        let project = |z: f64| {
            let clip_z = p[2][2] * z + p[3][2];
            let clip_w = p[2][3] * z;
            clip_z / clip_w
        };

        assert!((project(-view.clip_near) + 1.0).abs() < 1e-9);
        assert!((project(-view.clip_far) - 1.0).abs() < 1e-9);
    }
}
