// ==============================================================================
// contact.rs — RAPIER NARROW PHASE -> KART COLLISIONS
// ------------------------------------------------------------------------------
// After each pipeline step, every active contact pair touching the kart
// collider becomes one `Collision`:
//
//   normal         manifold normal, flipped so it points toward the kart
//   point          solver contact point (world space)
//   other_velocity linvel + ω×r of the touched body at the point (0 if none)
//   impulse        Σ normal impulses of the manifold points · normal
//
// Rapier reports manifold normals from collider1 to collider2, so a kart that
// is collider1 sees the normal pointing away from itself.
//
// Notes:
// - This file does NOT touch the kart. It only measures contact data.
// - Sensor overlaps (boost pads) are intersection pairs and never show up here.
// ==============================================================================

use rapier3d::prelude::*;

use crate::kart::{Collision, ContactPoint, Vec3};

pub fn gather_collisions(
    narrow_phase: &NarrowPhase,
    colliders: &ColliderSet,
    bodies: &RigidBodySet,
    kart_collider: ColliderHandle,
) -> Vec<Collision> {
    let mut out = Vec::new();

    for pair in narrow_phase.contact_pairs_with(kart_collider) {
        if !pair.has_any_active_contact {
            continue;
        }

        let (other, sign) = if pair.collider1 == kart_collider {
            (pair.collider2, -1.0)
        } else {
            (pair.collider1, 1.0)
        };
        let other_body = colliders
            .get(other)
            .and_then(|c| c.parent())
            .and_then(|h| bodies.get(h));

        let mut collision = Collision::default();
        for manifold in &pair.manifolds {
            let normal: Vec3 = manifold.data.normal * sign;

            let normal_impulse: Real = manifold.points.iter().map(|p| p.data.impulse).sum();
            collision.impulse += normal * normal_impulse;

            for solver_contact in &manifold.data.solver_contacts {
                let point = solver_contact.point;
                let other_velocity = other_body
                    .map(|b| b.velocity_at_point(&point))
                    .unwrap_or_else(Vec3::zeros);
                collision.contacts.push(ContactPoint {
                    normal,
                    point: point.coords,
                    other_velocity,
                });
            }
        }

        if !collision.contacts.is_empty() {
            out.push(collision);
        }
    }

    out
}
