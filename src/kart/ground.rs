// ==============================================================================
// ground.rs — MULTI-CONTACT GROUND DETECTION
// ------------------------------------------------------------------------------
// Accumulates every contact point reported this tick (possibly from several
// simultaneous collisions) into:
//   - contact count (accepted contacts only)
//   - average ground normal  (arithmetic mean, renormalized)
//   - average ground velocity (touched body's point velocity; moving platforms)
//
// A contact steeper than `slope_angle_limit` relative to `base_normal` is a
// wall, not ground, and is ignored entirely.
//
// With no accepted contacts the normal reads as `base_normal` and the velocity
// as zero; callers must check `contact_count()` to tell "no ground" apart.
// ==============================================================================

use rapier3d::prelude::Real;

use crate::kart::types::{angle_deg, up, safe_normalize, Collision, ContactPoint, Vec3};

#[derive(Debug, Clone)]
pub struct GroundDetector {
    pub slope_angle_limit: Real, // degrees
    pub base_normal: Vec3,
    contact_count: usize,
    total_normals: Vec3,
    total_velocities: Vec3,
}

impl Default for GroundDetector {
    fn default() -> Self {
        Self::new(45.0)
    }
}

impl GroundDetector {
    pub fn new(slope_angle_limit: Real) -> Self {
        Self {
            slope_angle_limit,
            base_normal: up(),
            contact_count: 0,
            total_normals: Vec3::zeros(),
            total_velocities: Vec3::zeros(),
        }
    }

    pub fn contact_count(&self) -> usize {
        self.contact_count
    }

    /// Returns whether the contact was accepted as ground.
    pub fn register_contact(&mut self, contact: &ContactPoint) -> bool {
        if angle_deg(&self.base_normal, &contact.normal) > self.slope_angle_limit {
            return false;
        }

        self.contact_count += 1;
        self.total_normals += contact.normal;
        self.total_velocities += contact.other_velocity;
        true
    }

    pub fn register_collision(&mut self, collision: &Collision) -> usize {
        collision
            .contacts
            .iter()
            .filter(|c| self.register_contact(c))
            .count()
    }

    pub fn clear(&mut self) {
        self.contact_count = 0;
        self.total_normals = Vec3::zeros();
        self.total_velocities = Vec3::zeros();
    }

    pub fn ground_normal(&self) -> Vec3 {
        if self.contact_count == 0 {
            return self.base_normal;
        }
        let average = self.total_normals / self.contact_count as Real;
        safe_normalize(average, self.base_normal)
    }

    pub fn ground_velocity(&self) -> Vec3 {
        if self.contact_count == 0 {
            return Vec3::zeros();
        }
        self.total_velocities / self.contact_count as Real
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(normal: Vec3, velocity: Vec3) -> ContactPoint {
        ContactPoint { normal, point: Vec3::zeros(), other_velocity: velocity }
    }

    #[test]
    fn empty_reads_up_and_still() {
        let g = GroundDetector::default();
        assert_eq!(g.contact_count(), 0);
        assert_eq!(g.ground_normal(), up());
        assert_eq!(g.ground_velocity(), Vec3::zeros());
    }

    #[test]
    fn single_contact_passes_through() {
        let mut g = GroundDetector::default();
        let n = Vec3::new(0.0, 2.0, 1.0); // not unit on purpose
        let v = Vec3::new(3.0, 0.0, -1.0);
        assert!(g.register_contact(&contact(n, v)));
        assert_eq!(g.contact_count(), 1);
        assert!((g.ground_normal() - n.normalize()).norm() < 1e-6);
        assert_eq!(g.ground_velocity(), v);
    }

    #[test]
    fn contacts_blend_linearly() {
        let mut g = GroundDetector::new(60.0);
        let a = Vec3::new(0.5, 1.0, 0.0).normalize();
        let b = Vec3::new(-0.5, 1.0, 0.0).normalize();
        g.register_contact(&contact(a, Vec3::new(2.0, 0.0, 0.0)));
        g.register_contact(&contact(b, Vec3::zeros()));
        assert_eq!(g.contact_count(), 2);
        assert!((g.ground_normal() - up()).norm() < 1e-6);
        assert_eq!(g.ground_velocity(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn opposite_contacts_degenerate_to_base_normal() {
        let mut g = GroundDetector::new(91.0);
        g.register_contact(&contact(Vec3::new(1.0, 0.0, 0.0), Vec3::zeros()));
        g.register_contact(&contact(Vec3::new(-1.0, 0.0, 0.0), Vec3::zeros()));
        assert_eq!(g.contact_count(), 2);
        let n = g.ground_normal();
        assert!(n.iter().all(|c| c.is_finite()));
        assert_eq!(n, up());
    }

    #[test]
    fn walls_are_rejected() {
        let mut g = GroundDetector::default();
        let wall = contact(Vec3::new(1.0, 0.2, 0.0).normalize(), Vec3::new(9.0, 0.0, 0.0));
        assert!(!g.register_contact(&wall));
        assert_eq!(g.contact_count(), 0);
        assert_eq!(g.ground_velocity(), Vec3::zeros());

        let floor = contact(up(), Vec3::zeros());
        let accepted = g.register_collision(&Collision {
            contacts: vec![wall, floor, floor],
            impulse: Vec3::zeros(),
        });
        assert_eq!(accepted, 2);
        assert_eq!(g.ground_normal(), up());
    }

    #[test]
    fn clear_resets_accumulator() {
        let mut g = GroundDetector::default();
        g.register_contact(&contact(up(), Vec3::new(1.0, 0.0, 0.0)));
        g.clear();
        assert_eq!(g.contact_count(), 0);
        assert_eq!(g.ground_velocity(), Vec3::zeros());
    }
}
