// ==============================================================================
// engine.rs — TARGET FORWARD SPEED (CLAMPED LINEAR RAMP)
// ------------------------------------------------------------------------------
// The engine does not push the body. It only tracks the speed the forward
// friction should pull the kart toward:
//
//   target = max_speed * max_speed_multiplier * throttle
//   speed  = move_towards(speed, target, acceleration * acceleration_multiplier * dt)
//
// Multipliers are 1.0 except during a boost window.
// ==============================================================================

use rapier3d::prelude::Real;

use crate::kart::types::move_towards;

#[derive(Debug, Clone, Copy)]
pub struct EngineModel {
    pub max_speed: Real,               // m/s
    pub acceleration: Real,            // m/s²
    pub acceleration_multiplier: Real, // boost
    pub max_speed_multiplier: Real,    // boost
    throttle: Real,
    speed: Real,
}

impl Default for EngineModel {
    fn default() -> Self {
        Self::new(20.0, 10.0)
    }
}

impl EngineModel {
    pub fn new(max_speed: Real, acceleration: Real) -> Self {
        Self {
            max_speed,
            acceleration,
            acceleration_multiplier: 1.0,
            max_speed_multiplier: 1.0,
            throttle: 0.0,
            speed: 0.0,
        }
    }

    pub fn set_throttle(&mut self, throttle: Real) {
        self.throttle = throttle;
    }

    pub fn throttle(&self) -> Real {
        self.throttle
    }

    pub fn speed(&self) -> Real {
        self.speed
    }

    pub fn target_speed(&self) -> Real {
        self.max_speed * self.max_speed_multiplier * self.throttle
    }

    pub fn reset_multipliers(&mut self) {
        self.acceleration_multiplier = 1.0;
        self.max_speed_multiplier = 1.0;
    }

    pub fn update(&mut self, dt: Real) {
        let max_step = (self.acceleration * self.acceleration_multiplier * dt).max(0.0);
        self.speed = move_towards(self.speed, self.target_speed(), max_step);
    }
}
