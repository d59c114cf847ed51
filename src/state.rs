use rapier3d::prelude::Real;
use serde::Serialize;

use crate::kart::{KartBody, Pose, Vec3};
use crate::vehicle::Kart;

#[inline] fn v3(v: Vec3) -> [Real; 3] { [v.x, v.y, v.z] }

/// Per-tick telemetry for logging and downstream consumers.
#[derive(Debug, Clone, Serialize)]
pub struct KartSnapshot {
    pub tick: u64,
    pub position: [Real; 3],
    pub rotation: [Real; 4], // [x, y, z, w]
    pub velocity: [Real; 3],
    pub grounded: bool,
    pub ground_normal: [Real; 3],
    pub drifting: bool,
    pub drift_direction: Option<Real>,
    pub boosting: bool,
    pub engine_speed: Real,
}

impl KartSnapshot {
    pub fn capture<B: KartBody + ?Sized>(tick: u64, kart: &Kart, body: &B) -> Self {
        Self::from_pose(tick, kart, Pose::of(body), body.linear_velocity())
    }

    /// Snapshot with an externally supplied pose, e.g. the interpolated one.
    pub fn from_pose(tick: u64, kart: &Kart, pose: Pose, velocity: Vec3) -> Self {
        let q = pose.orientation.quaternion();
        Self {
            tick,
            position: v3(pose.position),
            rotation: [q.i, q.j, q.k, q.w],
            velocity: v3(velocity),
            grounded: kart.is_grounded(),
            ground_normal: v3(kart.ground_normal()),
            drifting: kart.is_drifting(),
            drift_direction: kart.drift_direction(),
            boosting: kart.is_boosting(),
            engine_speed: kart.engine_speed(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
