// ==============================================================================
// interpolation.rs — RENDER POSE FROM FIXED-TICK SNAPSHOTS
// ------------------------------------------------------------------------------
// The simulation advances in fixed ticks; rendering runs at whatever rate the
// host manages. Each fixed tick records the post-step pose (and velocity).
// Each render tick runs two ordered phases:
//
//   1) blend(now):     t = (now - last_fixed_time) / fixed_dt   (NOT clamped)
//                      position    = lerp or a constant-acceleration curve
//                      orientation = shortest-arc slerp
//      -> consumers (camera, animators) read `rendered()`
//   2) finish_frame(): snap the rendered pose to the latest simulated pose
//
// t > 1 extrapolates past the last tick instead of freezing.
// ==============================================================================

use rapier3d::prelude::Real;
use serde::{Deserialize, Serialize};

use crate::kart::types::{slerp_unclamped, Pose, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    /// Straight blend between the two latest positions.
    #[default]
    Linear,
    /// `p0 + v0·s + ½·a·s²`, `a = 2·(p1 − p0 − v0·dt) / dt²`, so the curve
    /// leaves `p0` with the recorded velocity and lands on `p1` at t = 1.
    Kinematic,
}

/// One fixed-tick sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationSnapshot {
    pub pose: Pose,
    pub velocity: Vec3,
}

#[derive(Debug, Clone)]
pub struct PoseInterpolator {
    pub mode: InterpolationMode,
    fixed_dt: Real,
    previous: SimulationSnapshot,
    latest: SimulationSnapshot,
    last_fixed_time: f64,
    rendered: Pose,
    correction_pending: bool,
}

impl PoseInterpolator {
    pub fn new(mode: InterpolationMode, fixed_dt: Real, initial: Pose) -> Self {
        let snapshot = SimulationSnapshot { pose: initial, velocity: Vec3::zeros() };
        Self {
            mode,
            fixed_dt,
            previous: snapshot,
            latest: snapshot,
            last_fixed_time: 0.0,
            rendered: initial,
            correction_pending: false,
        }
    }

    pub fn latest(&self) -> &SimulationSnapshot {
        &self.latest
    }

    pub fn previous(&self) -> &SimulationSnapshot {
        &self.previous
    }

    /// Pose consumers should draw this frame.
    pub fn rendered(&self) -> Pose {
        self.rendered
    }

    pub fn correction_pending(&self) -> bool {
        self.correction_pending
    }

    /// Fixed-tick phase: call right after the physics step.
    pub fn record(&mut self, pose: Pose, velocity: Vec3, time: f64) {
        self.previous = self.latest;
        self.latest = SimulationSnapshot { pose, velocity };
        self.last_fixed_time = time;
    }

    /// Progress through the current fixed tick; may exceed 1.
    pub fn progress(&self, now: f64) -> Real {
        if self.fixed_dt <= 0.0 {
            return 1.0;
        }
        ((now - self.last_fixed_time) / self.fixed_dt as f64) as Real
    }

    /// Pose at progress `t` between the previous and latest snapshot.
    pub fn sample(&self, t: Real) -> Pose {
        let p0 = self.previous.pose.position;
        let p1 = self.latest.pose.position;

        let position = match self.mode {
            InterpolationMode::Linear => p0 + (p1 - p0) * t,
            InterpolationMode::Kinematic => {
                if self.fixed_dt <= 0.0 {
                    p1
                } else {
                    let dt = self.fixed_dt;
                    let v0 = self.previous.velocity;
                    let a = (p1 - p0 - v0 * dt) * (2.0 / (dt * dt));
                    let s = t * dt;
                    p0 + v0 * s + a * (0.5 * s * s)
                }
            }
        };

        let orientation =
            slerp_unclamped(&self.previous.pose.orientation, &self.latest.pose.orientation, t);

        Pose { position, orientation }
    }

    /// Render phase 1.
    pub fn blend(&mut self, now: f64) -> Pose {
        self.rendered = self.sample(self.progress(now));
        self.correction_pending = true;
        self.rendered
    }

    /// Render phase 2 (end of frame).
    pub fn finish_frame(&mut self) -> Pose {
        self.rendered = self.latest.pose;
        self.correction_pending = false;
        self.rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kart::types::Quat;
    use rapier3d::na::Vector3;

    const DT: Real = 0.02;

    fn pose(x: Real, yaw: Real) -> Pose {
        Pose {
            position: Vec3::new(x, 0.0, 0.0),
            orientation: Quat::from_axis_angle(&Vector3::y_axis(), yaw),
        }
    }

    fn two_ticks(mode: InterpolationMode) -> PoseInterpolator {
        let mut interp = PoseInterpolator::new(mode, DT, pose(0.0, 0.0));
        interp.record(pose(1.0, 0.0), Vec3::new(50.0, 0.0, 0.0), 1.0);
        interp.record(pose(2.0, 0.4), Vec3::new(50.0, 0.0, 0.0), 1.02);
        interp
    }

    #[test]
    fn endpoints_match_snapshots() {
        let interp = two_ticks(InterpolationMode::Linear);
        let at0 = interp.sample(0.0);
        let at1 = interp.sample(1.0);
        assert_eq!(at0.position, interp.previous().pose.position);
        assert_eq!(at1.position, interp.latest().pose.position);
        assert!(at0.orientation.angle_to(&interp.previous().pose.orientation) < 1e-5);
        assert!(at1.orientation.angle_to(&interp.latest().pose.orientation) < 1e-5);
    }

    #[test]
    fn progress_is_not_clamped() {
        let interp = two_ticks(InterpolationMode::Linear);
        let t = interp.progress(1.02 + 0.03);
        assert!((t - 1.5).abs() < 1e-4);
        let p = interp.sample(t);
        assert!((p.position.x - 2.5).abs() < 1e-3);
        let expected = Quat::from_axis_angle(&Vector3::y_axis(), 0.6);
        assert!(p.orientation.angle_to(&expected) < 1e-3);
    }

    #[test]
    fn kinematic_matches_linear_at_constant_velocity() {
        let interp = two_ticks(InterpolationMode::Kinematic);
        let p = interp.sample(0.5);
        // v = 50 m/s over half a 20 ms tick
        assert!((p.position.x - 1.5).abs() < 1e-4);
    }

    fn accelerating() -> PoseInterpolator {
        // rest to 10 m/s in one tick; the host integrates p1 = p0 + v1·dt
        let mut interp = PoseInterpolator::new(InterpolationMode::Kinematic, DT, pose(0.0, 0.0));
        interp.record(pose(0.0, 0.0), Vec3::zeros(), 0.0);
        interp.record(pose(0.2, 0.0), Vec3::new(10.0, 0.0, 0.0), DT as f64);
        interp
    }

    #[test]
    fn kinematic_endpoints_match_snapshots() {
        let interp = accelerating();
        assert_eq!(interp.sample(0.0).position, interp.previous().pose.position);
        let at1 = interp.sample(1.0);
        assert!((at1.position - interp.latest().pose.position).norm() < 1e-5);
    }

    #[test]
    fn kinematic_eases_out_of_rest() {
        let interp = accelerating();
        // a = 2·0.2 / 0.0004 = 1000 m/s², s = 0.01 -> ½·a·s² = 0.05
        let p = interp.sample(0.5);
        assert!((p.position.x - 0.05).abs() < 1e-4);
    }

    #[test]
    fn correction_pass_snaps_to_latest() {
        let mut interp = two_ticks(InterpolationMode::Linear);
        let blended = interp.blend(1.02 + 0.01);
        assert!(interp.correction_pending());
        assert!((blended.position.x - 1.5).abs() < 1e-3);

        let snapped = interp.finish_frame();
        assert!(!interp.correction_pending());
        assert_eq!(snapped, interp.latest().pose);
        assert_eq!(interp.rendered(), interp.latest().pose);
    }

    #[test]
    fn zero_fixed_dt_shows_latest() {
        let mut interp = PoseInterpolator::new(InterpolationMode::Kinematic, 0.0, pose(0.0, 0.0));
        interp.record(pose(3.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 0.0);
        let p = interp.blend(5.0);
        assert_eq!(p.position, Vec3::new(3.0, 0.0, 0.0));
    }
}
