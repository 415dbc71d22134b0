//! Deciding which stages run in a frame.

pub use crate::{preset::schedule::*, view::View};

use crate::view::{dot, sub};
use burn::config::Config;

/// The thresholds of [`FrameSchedule`].
#[derive(Config, Debug, PartialEq)]
pub struct SchedulePolicy {
    /// Minimum camera rotation (in radians) that triggers a cull.
    #[config(default = "CULL_ANGLE_THRESHOLD")]
    pub cull_angle_threshold: f64,
    /// Minimum camera translation that triggers a cull.
    #[config(default = "CULL_DISTANCE_THRESHOLD")]
    pub cull_distance_threshold: f64,
    /// The sort is triggered once the angle between sort directions
    /// plus the half field of view reaches it.
    #[config(default = "SORT_ANGLE_THRESHOLD")]
    pub sort_angle_threshold: f64,
}

/// The stages to run in a frame.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FramePlan {
    /// Re-sorting along the view's sort direction.
    pub sort: bool,
    /// Re-culling with the view.
    pub cull: bool,
}

/// The state of the frame policy across frames.
#[derive(Clone, Debug, Default)]
pub struct FrameSchedule {
    pub policy: SchedulePolicy,
    last_sort_direction: Option<[f64; 3]>,
    last_cull_pose: Option<([f64; 3], [[f64; 3]; 3])>,
}

impl Default for SchedulePolicy {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSchedule {
    pub fn new(policy: SchedulePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Planning the stages for the `view` and remembering it.
    pub fn plan(
        &mut self,
        view: &View,
    ) -> FramePlan {
        let direction = view.sort_direction();
        let sort = match self.last_sort_direction {
            None => true,
            Some(last) => {
                let angle = dot(direction, last).min(1.0).acos();
                angle + view.field_of_view_half_max()
                    >= self.policy.sort_angle_threshold
            },
        };
        if sort {
            self.last_sort_direction = Some(direction);
        }

        let position = view.view_position;
        let rotation = view.rotation();
        let cull = sort
            || match &self.last_cull_pose {
                None => true,
                Some((last_position, last_rotation)) => {
                    let offset = sub(position, *last_position);
                    let distance = dot(offset, offset).sqrt();
                    let angle = rotation_angle(&rotation, last_rotation);
                    distance >= self.policy.cull_distance_threshold
                        || angle >= self.policy.cull_angle_threshold
                },
            };
        if cull {
            self.last_cull_pose = Some((position, rotation));
        }

        #[cfg(debug_assertions)]
        log::debug!(
            target: "gausplat::sorter::schedule",
            "plan > sort ({sort}), cull ({cull})",
        );

        FramePlan { sort, cull }
    }

    /// Forgetting the last frames, so the next plan runs every stage.
    pub fn reset(&mut self) {
        self.last_sort_direction = None;
        self.last_cull_pose = None;
    }
}

/// The angle of the rotation from `b` to `a`, both `M[col][row]`.
///
/// `acos((tr(A * B^T) - 1) / 2)`
fn rotation_angle(
    a: &[[f64; 3]; 3],
    b: &[[f64; 3]; 3],
) -> f64 {
    let trace = (0..3)
        .map(|c| dot(a[c], b[c]))
        .sum::<f64>();
    ((trace - 1.0) / 2.0).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    #[test]
    fn plan_first_frame_runs_every_stage() {
        use super::*;

        let mut schedule = FrameSchedule::default();
        let plan = schedule.plan(&View::default());
        assert_eq!(plan, FramePlan { sort: true, cull: true });
    }

    #[test]
    fn plan_still_camera_skips_every_stage() {
        use super::*;

        let mut schedule = FrameSchedule::default();
        let view = View::look_at(
            [-5.0, -1.0, -1.0],
            [1.0, 1.0, 0.0],
            [0.0, -1.0, -0.17],
            50.0_f64.to_radians(),
            1.0,
        );
        schedule.plan(&view);

        let plan = schedule.plan(&view);
        assert_eq!(plan, FramePlan::default());

        schedule.reset();
        let plan = schedule.plan(&view);
        assert_eq!(plan, FramePlan { sort: true, cull: true });
    }

    #[test]
    fn plan_moving_camera_culls_without_sorting() {
        use super::*;

        let mut schedule = FrameSchedule::default();
        let fov = 30.0_f64.to_radians();
        schedule.plan(&View::look_at(
            [0.0, 0.0, 5.0],
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            fov,
            1.0,
        ));

        let plan = schedule.plan(&View::look_at(
            [0.5, 0.0, 5.0],
            [0.5, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            fov,
            1.0,
        ));
        assert_eq!(plan, FramePlan { sort: false, cull: true });

        let plan = schedule.plan(&View::look_at(
            [0.5, 0.0, 5.0],
            [0.5, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            fov,
            1.0,
        ));
        assert_eq!(plan, FramePlan::default());
    }

    #[test]
    fn plan_turning_camera_sorts() {
        use super::*;

        let mut schedule = FrameSchedule::default();
        let fov = 30.0_f64.to_radians();
        schedule.plan(&View::look_at(
            [0.0, 0.0, 5.0],
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            fov,
            1.0,
        ));

        // Turning by 45 degrees, and 45 + 15 >= 0.333 * 180
        let plan = schedule.plan(&View::look_at(
            [0.0, 0.0, 5.0],
            [-5.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            fov,
            1.0,
        ));
        assert_eq!(plan, FramePlan { sort: true, cull: true });
    }

    #[test]
    fn rotation_angle_of_quarter_turn() {
        use super::*;

        let identity = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let quarter = [[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];

        let angle = rotation_angle(&quarter, &identity);
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-9, "{angle}");
        assert_eq!(rotation_angle(&identity, &identity), 0.0);
    }
}
