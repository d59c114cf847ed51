// ==============================================================================
// hop.rs — HOP REDUCTION (COLLISION IMPULSE FILTER)
// ------------------------------------------------------------------------------
// Small terrain bumps make the solver kick the kart along the ground normal,
// which reads as a pogo bounce. For each collision we take back:
//
//   rb_up  = v · n                 (current normal speed)
//   imp_up = (J · n) / m           (normal speed the impulse added)
//   used   = min(rb_up, imp_up)    (never remove more than either)
//
//   v -= n * used
//   v -= (J - proj_n J) / m * clamp01(used / imp_up) * horizontal_damping
//
// Only the share of the horizontal kick that came with the removed hop is
// damped, and only partially, so the kart keeps its horizontal momentum.
// ==============================================================================

use rapier3d::prelude::Real;

use crate::kart::types::{project_on_plane, Vec3};

/// Velocity after hop reduction. `normal` is the last ground normal (unit).
pub fn reduce_hop(
    velocity: Vec3,
    impulse: &Vec3,
    normal: &Vec3,
    mass: Real,
    horizontal_damping: Real,
) -> Vec3 {
    if mass <= 0.0 {
        return velocity;
    }

    let rb_up = velocity.dot(normal);
    let imp_up = impulse.dot(normal) / mass;
    let used = rb_up.min(imp_up);
    if used <= 0.0 {
        return velocity;
    }

    let mut v = velocity - normal * used;

    let ratio = (used / imp_up).clamp(0.0, 1.0);
    let horizontal = project_on_plane(*impulse, normal);
    v -= horizontal / mass * ratio * horizontal_damping;
    v
}
