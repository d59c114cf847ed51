// ==============================================================================
// friction.rs — SINGLE-AXIS GRIP / SLIP MODEL (VELOCITY DOMAIN)
// ------------------------------------------------------------------------------
// Input is the velocity error along one axis (actual - desired, m/s).
// Output is the corrective velocity for that axis this tick.
//
//   threshold = slipping ? dynamic_friction : static_friction
//   |err| <  threshold  -> Grip:  corr = -err
//   |err| >= threshold  -> Slide: corr = -err * dynamic_friction
//
// The grip/slide flag is sticky: once sliding, the tire must fall under the
// (smaller) dynamic threshold before it grips again.
// ==============================================================================

use rapier3d::prelude::Real;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TireState {
    Grip,
    Slide,
}

#[derive(Debug, Clone, Copy)]
pub struct FrictionCalculator {
    pub static_friction: Real,  // m/s, grip threshold while gripping
    pub dynamic_friction: Real, // m/s threshold while sliding, and slide coefficient
    state: TireState,
    friction_velocity: Real,
}

impl Default for FrictionCalculator {
    fn default() -> Self {
        Self::new(1.0, 0.5)
    }
}

impl FrictionCalculator {
    pub fn new(static_friction: Real, dynamic_friction: Real) -> Self {
        Self {
            static_friction,
            dynamic_friction,
            state: TireState::Grip,
            friction_velocity: 0.0,
        }
    }

    pub fn state(&self) -> TireState {
        self.state
    }

    pub fn is_slipping(&self) -> bool {
        self.state == TireState::Slide
    }

    /// Corrective velocity computed by the last `update`.
    pub fn friction_velocity(&self) -> Real {
        self.friction_velocity
    }

    pub fn update(&mut self, error: Real) -> Real {
        let threshold = match self.state {
            TireState::Grip => self.static_friction,
            TireState::Slide => self.dynamic_friction,
        };

        if error.abs() < threshold {
            self.state = TireState::Grip;
            self.friction_velocity = -error;
        } else {
            self.state = TireState::Slide;
            self.friction_velocity = -error * self.dynamic_friction;
        }

        self.friction_velocity
    }
}
