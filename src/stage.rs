// ==============================================================================
// stage.rs — STAGE PIECES THAT ACT ON THE KART
// ------------------------------------------------------------------------------
// Rotor:    kinematic body spun about +Y by a fixed rate each fixed tick.
//           Rapier derives its velocity from the next kinematic pose, so a
//           kart parked on it sees a moving ground velocity.
// BoostPad: sensor collider; the kart gets the pad's boost once per entry.
// ==============================================================================

use rapier3d::na::Vector3;
use rapier3d::prelude::*;

use crate::kart::Quat;
use crate::vehicle::{BoostParams, Kart};

#[derive(Debug, Clone)]
pub struct Rotor {
    pub body: RigidBodyHandle,
    pub speed: Real, // deg/s about +Y
    angle: Real,     // deg
}

impl Rotor {
    pub fn new(body: RigidBodyHandle, speed: Real) -> Self {
        Self { body, speed, angle: 0.0 }
    }

    pub fn angle(&self) -> Real {
        self.angle
    }

    /// Schedule the next rotation. Call before the pipeline step.
    pub fn fixed_update(&mut self, bodies: &mut RigidBodySet, dt: Real) {
        self.angle = (self.angle + self.speed * dt) % 360.0;
        if let Some(rb) = bodies.get_mut(self.body) {
            let rotation = Quat::from_axis_angle(&Vector3::y_axis(), self.angle.to_radians());
            rb.set_next_kinematic_rotation(rotation);
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoostPad {
    pub collider: ColliderHandle,
    pub params: BoostParams,
    inside: bool,
}

impl BoostPad {
    pub fn new(collider: ColliderHandle, params: BoostParams) -> Self {
        Self { collider, params, inside: false }
    }

    pub fn is_occupied(&self) -> bool {
        self.inside
    }

    /// Edge-triggered overlap check. Returns true on the tick the kart enters.
    pub fn update(&mut self, narrow_phase: &NarrowPhase, kart_collider: ColliderHandle) -> bool {
        let overlapping = narrow_phase.intersection_pair(self.collider, kart_collider) == Some(true);
        let entered = overlapping && !self.inside;
        self.inside = overlapping;
        entered
    }

    pub fn apply(&self, kart: &mut Kart) {
        let BoostParams { acceleration_multiplier, max_speed_multiplier, duration } = self.params;
        kart.boost(acceleration_multiplier, max_speed_multiplier, duration);
    }
}
