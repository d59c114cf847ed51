// ==============================================================================
// steering.rs — YAW RATE, AIR AUTHORITY, GROUND ALIGNMENT
// ==============================================================================
// Responsibilities:
// - Convert driver steering intent (and drift state) into a yaw rate (deg/s)
// - Fade steering authority while airborne
// - Re-align the body "up" axis to the ground normal, then apply the yaw
// ------------------------------------------------------------------------------
// yaw rate:
//   normal: steering_angle * steering
//   drift:  lerp(drift_min, drift_max, inverse_lerp(-1, 1, steering * dir)) * dir
//
// air authority (t = seconds since leaving the ground):
//   lerp(1, air_multiplier, (t - delay) / transition)      (clamped to [0, 1])
//
// orientation update:
//   rot = from_to(rot * up, ground_normal) * rot
//   rot = rot * axis_angle(up, yaw_rate * dt)
// Aligning first and yawing second keeps steering from fighting the alignment.
// ==============================================================================

use rapier3d::na::Vector3;
use rapier3d::prelude::Real;

use crate::kart::types::{from_to_rotation, inverse_lerp, lerp, up, Quat, Vec3};

/// Steering configuration (per kart)
#[derive(Clone, Copy, Debug)]
pub struct SteeringConfig {
    pub steering_angle: Real,                   // deg/s at full lock
    pub drift_angle_min: Real,                  // deg/s, steering against the drift
    pub drift_angle_max: Real,                  // deg/s, steering into the drift
    pub air_steering_angle_multiplier: Real,    // 0..1 authority once fully airborne
    pub air_steering_delay: Real,               // s of full authority after take-off
    pub air_steering_transition_duration: Real, // s to fade to the air multiplier
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            steering_angle: 60.0,
            drift_angle_min: 10.0,
            drift_angle_max: 90.0,
            air_steering_angle_multiplier: 0.25,
            air_steering_delay: 0.3,
            air_steering_transition_duration: 0.5,
        }
    }
}

/// Yaw rate in deg/s for the current input. `drift_direction` is `Some(±1)`
/// while drifting.
pub fn steering_rate(cfg: &SteeringConfig, steering: Real, drift_direction: Option<Real>) -> Real {
    match drift_direction {
        Some(dir) => {
            let t = inverse_lerp(-1.0, 1.0, steering * dir);
            lerp(cfg.drift_angle_min, cfg.drift_angle_max, t) * dir
        }
        None => cfg.steering_angle * steering,
    }
}

/// Steering authority after `air_time` seconds airborne.
pub fn air_steering_multiplier(cfg: &SteeringConfig, air_time: Real) -> Real {
    let elapsed = air_time - cfg.air_steering_delay;
    let t = if cfg.air_steering_transition_duration > 0.0 {
        elapsed / cfg.air_steering_transition_duration
    } else if elapsed >= 0.0 {
        1.0
    } else {
        0.0
    };
    lerp(1.0, cfg.air_steering_angle_multiplier, t)
}

/// Align the body's up axis to `ground_normal`, then yaw by `yaw_deg` around
/// the aligned up axis.
pub fn align_and_yaw(rotation: &Quat, ground_normal: &Vec3, yaw_deg: Real) -> Quat {
    let current_up = rotation * up();
    let aligned = from_to_rotation(&current_up, ground_normal) * rotation;
    let yaw = Quat::from_axis_angle(&Vector3::y_axis(), yaw_deg.to_radians());
    aligned * yaw
}
