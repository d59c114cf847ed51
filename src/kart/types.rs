//! Core shared types for `kart` (engine-agnostic).
// kart/types.rs
use rapier3d::na::{Unit, UnitQuaternion, Vector3};
use rapier3d::prelude::Real;

pub type Vec3 = Vector3<Real>;
pub type Quat = UnitQuaternion<Real>;

// ----- small scalar / vector helpers -----
#[inline] pub fn up() -> Vec3 { Vec3::new(0.0, 1.0, 0.0) }
#[inline] pub fn forward() -> Vec3 { Vec3::new(0.0, 0.0, 1.0) } // +Z is forward
#[inline] pub fn right() -> Vec3 { Vec3::new(1.0, 0.0, 0.0) }   // +X is right

#[inline]
pub fn lerp(a: Real, b: Real, t: Real) -> Real {
    a + (b - a) * t.clamp(0.0, 1.0)
}

#[inline]
pub fn inverse_lerp(a: Real, b: Real, v: Real) -> Real {
    if (b - a).abs() < Real::EPSILON {
        return 0.0;
    }
    ((v - a) / (b - a)).clamp(0.0, 1.0)
}

/// Step `current` toward `target` by at most `max_delta` (never overshoots).
#[inline]
pub fn move_towards(current: Real, target: Real, max_delta: Real) -> Real {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Unit vector or `fallback` when `v` is too short to normalize.
#[inline]
pub fn safe_normalize(v: Vec3, fallback: Vec3) -> Vec3 {
    let n = v.norm();
    if n > 1e-6 { v / n } else { fallback }
}

/// Unsigned angle between two directions, in degrees.
#[inline]
pub fn angle_deg(a: &Vec3, b: &Vec3) -> Real {
    let denom = (a.norm_squared() * b.norm_squared()).sqrt();
    if denom < 1e-12 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Component of `v` perpendicular to the unit `normal`.
#[inline]
pub fn project_on_plane(v: Vec3, normal: &Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}

/// Shortest-arc rotation carrying direction `from` onto direction `to`.
///
/// Opposite directions have no unique shortest arc; we turn half a revolution
/// around any axis perpendicular to `from`.
pub fn from_to_rotation(from: &Vec3, to: &Vec3) -> Quat {
    if let Some(q) = UnitQuaternion::rotation_between(from, to) {
        return q;
    }
    if from.norm_squared() < 1e-12 || to.norm_squared() < 1e-12 {
        return Quat::identity();
    }
    let axis = if from.x.abs() < 0.9 { from.cross(&right()) } else { from.cross(&up()) };
    Quat::from_axis_angle(&Unit::new_normalize(axis), std::f32::consts::PI as Real)
}

/// Shortest-arc spherical blend that accepts `t` outside `[0, 1]`.
pub fn slerp_unclamped(a: &Quat, b: &Quat, t: Real) -> Quat {
    let qa = a.into_inner().coords;
    let mut qb = b.into_inner().coords;
    let mut cos = qa.dot(&qb);
    if cos < 0.0 {
        qb = -qb;
        cos = -cos;
    }

    // nearly parallel: normalized lerp is exact enough and avoids sin(0)
    let coords = if cos > 0.9995 {
        qa + (qb - qa) * t
    } else {
        let theta = cos.clamp(-1.0, 1.0).acos();
        let sin = theta.sin();
        qa * (((1.0 - t) * theta).sin() / sin) + qb * ((t * theta).sin() / sin)
    };

    let q = rapier3d::na::Quaternion::from(coords);
    if q.norm() < 1e-9 {
        return *a;
    }
    UnitQuaternion::new_normalize(q)
}

// ============================================
// ----- host rigid body ----------------------
// ============================================

/// How a force vector is interpreted by the host body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceMode {
    /// Continuous, mass-independent: the vector is an acceleration (m/s²).
    Acceleration,
    /// Instantaneous, mass-independent: the vector is a velocity change (m/s).
    VelocityChange,
}

/// The rigid body the kart drives. Owned by the host physics engine.
pub trait KartBody {
    fn position(&self) -> Vec3;
    fn orientation(&self) -> Quat;
    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn mass(&self) -> Real;
    fn add_force(&mut self, force: Vec3, mode: ForceMode);
    fn set_orientation(&mut self, orientation: Quat);
    fn set_gravity_enabled(&mut self, enabled: bool);
}

// ============================================
// ----- contacts -----------------------------
// ============================================

/// One contact point reported by the host for this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub normal: Vec3,         // unit, pointing from the touched surface toward the kart
    pub point: Vec3,          // world space
    pub other_velocity: Vec3, // touched body's velocity at `point` (zero for static geometry)
}

impl ContactPoint {
    pub fn on_static(normal: Vec3, point: Vec3) -> Self {
        Self { normal, point, other_velocity: Vec3::zeros() }
    }
}

/// Every contact point between the kart and one other collider, plus the total
/// impulse the solver applied to the kart for that pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collision {
    pub contacts: Vec<ContactPoint>,
    pub impulse: Vec3, // N*s, world space
}

// ============================================
// ----- pose ---------------------------------
// ============================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self { position: Vec3::zeros(), orientation: Quat::identity() }
    }
}

impl Pose {
    pub fn of<B: KartBody + ?Sized>(body: &B) -> Self {
        Self { position: body.position(), orientation: body.orientation() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_towards_stops_on_target() {
        assert_eq!(move_towards(0.0, 1.0, 5.0), 1.0);
        assert_eq!(move_towards(0.0, 1.0, 0.25), 0.25);
        assert_eq!(move_towards(1.0, -1.0, 0.5), 0.5);
        assert_eq!(move_towards(3.0, 7.0, 0.0), 3.0);
    }

    #[test]
    fn lerp_clamps_and_inverse_lerp_handles_flat_range() {
        assert_eq!(lerp(1.0, 0.25, 2.0), 0.25);
        assert_eq!(lerp(1.0, 0.25, -1.0), 1.0);
        assert_eq!(inverse_lerp(-1.0, 1.0, 0.0), 0.5);
        assert_eq!(inverse_lerp(2.0, 2.0, 5.0), 0.0);
    }

    #[test]
    fn from_to_rotation_maps_up_onto_target() {
        let target = Vec3::new(1.0, 1.0, 0.0).normalize();
        let q = from_to_rotation(&up(), &target);
        assert!((q * up() - target).norm() < 1e-5);

        let flipped = from_to_rotation(&up(), &-up());
        assert!((flipped * up() + up()).norm() < 1e-5);
    }

    #[test]
    fn slerp_hits_endpoints_and_extrapolates() {
        let a = Quat::identity();
        let b = Quat::from_axis_angle(&Vector3::y_axis(), 0.5);
        assert!(slerp_unclamped(&a, &b, 0.0).angle_to(&a) < 1e-4);
        assert!(slerp_unclamped(&a, &b, 1.0).angle_to(&b) < 1e-4);

        let beyond = slerp_unclamped(&a, &b, 2.0);
        let expected = Quat::from_axis_angle(&Vector3::y_axis(), 1.0);
        assert!(beyond.angle_to(&expected) < 1e-4);
    }

    #[test]
    fn angle_between_up_and_wall_is_ninety() {
        assert!((angle_deg(&up(), &right()) - 90.0).abs() < 1e-4);
        assert_eq!(angle_deg(&up(), &Vec3::zeros()), 0.0);
    }
}
