// ==============================================================================
// vehicle.rs — KART CONTROLLER (FIXED-TICK STATE MACHINE)
// ------------------------------------------------------------------------------
// Host loop, once per fixed tick:
//
//   kart.fixed_update(body, input, dt)    forces, drift/jump/boost state
//   <host physics step>
//   kart.on_collision(body, c)            for every collision reported
//   kart.align(body, dt)                  ground alignment + steering yaw
//
// and optionally `kart.latch_input(input)` from the render phase so a drift
// tap between two fixed ticks still requests a jump.
//
// State axes are orthogonal: grounded/airborne, drifting/not, boosting/not.
// ==============================================================================

use rapier3d::prelude::Real;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::input::KartInput;
use crate::kart::hop::reduce_hop;
use crate::kart::steering::{air_steering_multiplier, align_and_yaw, steering_rate, SteeringConfig};
use crate::kart::{
    forward, right, up, Collision, EngineModel, ForceMode, FrictionCalculator, GroundDetector,
    KartBody, Vec3,
};

/// Steering above this magnitude is needed to start a drift.
pub const DRIFT_STEERING_THRESHOLD: Real = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostParams {
    pub acceleration_multiplier: Real,
    pub max_speed_multiplier: Real,
    pub duration: Real, // s
}

impl Default for BoostParams {
    fn default() -> Self {
        Self {
            acceleration_multiplier: 5.0,
            max_speed_multiplier: 1.5,
            duration: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KartConfig {
    // --- Basic ---
    pub max_speed: Real,         // m/s
    pub acceleration: Real,      // m/s²
    pub steering_angle: Real,    // deg/s at full lock
    pub drift_angle_min: Real,   // deg/s
    pub drift_angle_max: Real,   // deg/s
    pub slope_angle_limit: Real, // deg, steeper contacts are walls
    pub jump_on_drift: bool,     // drift button rising edge requests a hop
    pub jump_force: Real,        // m/s velocity change along the ground normal

    // --- Advanced ---
    pub wheel_dynamic_friction: Real,           // slide coefficient / re-grip threshold
    pub wheel_static_friction: Real,            // grip threshold (m/s)
    pub drift_friction_multiplier: Real,        // 0..1 lateral slide coefficient while drifting
    pub air_steering_angle_multiplier: Real,    // 0..1
    pub air_steering_delay: Real,               // s
    pub air_steering_transition_duration: Real, // s
    pub override_gravity: bool,
    pub gravity: [Real; 3],                     // m/s²
    pub hop_horizontal_damping: Real,           // 0..1 share of the horizontal kick removed

    // --- Stage ---
    pub boost: BoostParams, // what a boost pad hands out
}

impl Default for KartConfig {
    fn default() -> Self {
        Self {
            max_speed: 20.0,
            acceleration: 10.0,
            steering_angle: 60.0,
            drift_angle_min: 10.0,
            drift_angle_max: 90.0,
            slope_angle_limit: 45.0,
            jump_on_drift: true,
            jump_force: 2.0,

            wheel_dynamic_friction: 0.5,
            wheel_static_friction: 3.0,
            drift_friction_multiplier: 0.2,
            air_steering_angle_multiplier: 0.25,
            air_steering_delay: 0.3,
            air_steering_transition_duration: 0.5,
            override_gravity: true,
            gravity: [0.0, -9.81, 0.0],
            hop_horizontal_damping: 0.5,

            boost: BoostParams::default(),
        }
    }
}

impl KartConfig {
    pub fn steering(&self) -> SteeringConfig {
        SteeringConfig {
            steering_angle: self.steering_angle,
            drift_angle_min: self.drift_angle_min,
            drift_angle_max: self.drift_angle_max,
            air_steering_angle_multiplier: self.air_steering_angle_multiplier,
            air_steering_delay: self.air_steering_delay,
            air_steering_transition_duration: self.air_steering_transition_duration,
        }
    }

    pub fn gravity_vector(&self) -> Vec3 {
        Vec3::new(self.gravity[0], self.gravity[1], self.gravity[2])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriftState {
    NotDrifting,
    Drifting { direction: Real }, // -1 left, +1 right; fixed for the whole drift
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoostState {
    Inactive,
    Active { params: BoostParams, elapsed: Real },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpEvent {
    pub ground_normal: Vec3,
    pub velocity_change: Vec3,
}

pub struct Kart {
    pub config: KartConfig,
    engine: EngineModel,
    forward_friction: FrictionCalculator,
    sideways_friction: FrictionCalculator,
    ground: GroundDetector,
    grounded: bool,
    air_elapsed: Real,
    last_ground_normal: Vec3,
    steering: Real,
    drift: DriftState,
    drift_input_last: bool,
    jump_requested: bool,
    boost: BoostState,
    jump_listeners: Vec<Box<dyn FnMut(&JumpEvent)>>,
}

impl Kart {
    pub fn new(config: KartConfig) -> Self {
        Self {
            engine: EngineModel::new(config.max_speed, config.acceleration),
            forward_friction: FrictionCalculator::new(
                config.wheel_static_friction,
                config.wheel_dynamic_friction,
            ),
            sideways_friction: FrictionCalculator::new(
                config.wheel_static_friction,
                config.wheel_dynamic_friction,
            ),
            ground: GroundDetector::new(config.slope_angle_limit),
            grounded: false,
            air_elapsed: 0.0,
            last_ground_normal: up(),
            steering: 0.0,
            drift: DriftState::NotDrifting,
            drift_input_last: false,
            jump_requested: false,
            boost: BoostState::Inactive,
            jump_listeners: Vec::new(),
            config,
        }
    }

    // --------------------------------------------------
    // observers
    // --------------------------------------------------
    pub fn is_grounded(&self) -> bool { self.grounded }
    pub fn ground_normal(&self) -> Vec3 { self.last_ground_normal }
    pub fn drift_state(&self) -> DriftState { self.drift }
    pub fn is_drifting(&self) -> bool { matches!(self.drift, DriftState::Drifting { .. }) }
    pub fn boost_state(&self) -> BoostState { self.boost }
    pub fn is_boosting(&self) -> bool { matches!(self.boost, BoostState::Active { .. }) }
    pub fn steering(&self) -> Real { self.steering }
    pub fn engine(&self) -> &EngineModel { &self.engine }
    pub fn engine_speed(&self) -> Real { self.engine.speed() }
    pub fn air_time(&self) -> Real { self.air_elapsed }
    pub fn jump_requested(&self) -> bool { self.jump_requested }
    pub fn ground_detector(&self) -> &GroundDetector { &self.ground }
    pub fn forward_friction(&self) -> &FrictionCalculator { &self.forward_friction }
    pub fn sideways_friction(&self) -> &FrictionCalculator { &self.sideways_friction }

    pub fn drift_direction(&self) -> Option<Real> {
        match self.drift {
            DriftState::Drifting { direction } => Some(direction),
            DriftState::NotDrifting => None,
        }
    }

    /// Called synchronously inside `fixed_update`, after the jump impulse.
    pub fn on_jump(&mut self, listener: impl FnMut(&JumpEvent) + 'static) {
        self.jump_listeners.push(Box::new(listener));
    }

    /// Start (or restart) a boost window. Overwrites any running boost.
    pub fn boost(&mut self, acceleration_multiplier: Real, max_speed_multiplier: Real, duration: Real) {
        let params = BoostParams { acceleration_multiplier, max_speed_multiplier, duration };
        self.boost = BoostState::Active { params, elapsed: 0.0 };
        self.engine.acceleration_multiplier = acceleration_multiplier;
        self.engine.max_speed_multiplier = max_speed_multiplier;
        debug!(acceleration_multiplier, max_speed_multiplier, duration, "boost started");
    }

    /// Latch a jump request on the drift button's rising edge. Safe to call
    /// more than once per tick.
    pub fn latch_input(&mut self, input: &dyn KartInput) {
        if !self.config.jump_on_drift {
            return;
        }
        let drift = input.drift();
        self.jump_requested |= !self.drift_input_last && drift;
        self.drift_input_last = drift;
    }

    // ==================================================
    // fixed tick
    // ==================================================
    pub fn fixed_update<B: KartBody + ?Sized>(&mut self, body: &mut B, input: &dyn KartInput, dt: Real) {
        self.latch_input(input);

        let mut throttle = (input.throttle() - input.brake()).clamp(-1.0, 1.0);
        let steering = input.steering();
        let drift = input.drift();
        self.steering = steering;

        self.engine.max_speed = self.config.max_speed;
        self.engine.acceleration = self.config.acceleration;
        self.ground.slope_angle_limit = self.config.slope_angle_limit;

        // 1) Boost window
        if let BoostState::Active { params, elapsed } = &mut self.boost {
            throttle = 1.0;
            *elapsed += dt;
            if *elapsed >= params.duration {
                self.boost = BoostState::Inactive;
                self.engine.reset_multipliers();
                debug!("boost expired");
            }
        }

        // 2) Gravity (not persistent; re-applied every tick)
        if self.config.override_gravity {
            body.set_gravity_enabled(false);
            body.add_force(self.config.gravity_vector(), ForceMode::Acceleration);
        } else {
            body.set_gravity_enabled(true);
        }

        // 3) Ground from last step's contacts
        self.grounded = self.ground.contact_count() > 0;
        let (ground_normal, ground_velocity) = if self.grounded {
            (self.ground.ground_normal(), self.ground.ground_velocity())
        } else {
            (self.last_ground_normal, Vec3::zeros())
        };
        self.ground.clear();

        // 4) Engine target speed
        self.engine.set_throttle(throttle);
        self.engine.update(dt);
        let engine_speed = self.engine.speed();

        // 5) Wheel friction
        if self.grounded {
            self.apply_wheel_friction(body, ground_velocity, engine_speed);
        }

        // 6) Jump (request never waits for landing)
        if self.jump_requested {
            self.jump_requested = false;
            if self.grounded {
                let velocity_change = ground_normal * self.config.jump_force;
                body.add_force(velocity_change, ForceMode::VelocityChange);
                debug!(?ground_normal, "jump");
                let event = JumpEvent { ground_normal, velocity_change };
                for listener in self.jump_listeners.iter_mut() {
                    listener(&event);
                }
            }
        }

        // 7) Drift transitions
        match self.drift {
            DriftState::Drifting { .. } if !drift => {
                self.drift = DriftState::NotDrifting;
                debug!("drift ended");
            }
            DriftState::NotDrifting if drift && steering.abs() > DRIFT_STEERING_THRESHOLD => {
                let direction = steering.signum();
                self.drift = DriftState::Drifting { direction };
                debug!(direction, "drift started");
            }
            _ => {}
        }

        self.last_ground_normal = ground_normal;
    }

    fn apply_wheel_friction<B: KartBody + ?Sized>(&mut self, body: &mut B, ground_velocity: Vec3, engine_speed: Real) {
        let rotation = body.orientation();
        let mass = body.mass();
        let relative_velocity = body.linear_velocity() - ground_velocity;

        // forward: pull relative speed toward the engine speed
        let fwd = rotation * forward();
        let forward_error = relative_velocity.dot(&fwd) - engine_speed;
        self.forward_friction.static_friction = self.config.wheel_static_friction;
        self.forward_friction.dynamic_friction = self.config.wheel_dynamic_friction;
        let forward_correction = self.forward_friction.update(forward_error);
        body.add_force(fwd * forward_correction * mass, ForceMode::Acceleration);

        // sideways: pull relative speed toward zero, loosened while drifting
        let side = rotation * right();
        let sideways_error = relative_velocity.dot(&side);
        let (dynamic_scale, static_scale) = if self.is_drifting() {
            (self.config.drift_friction_multiplier, 0.0)
        } else {
            (1.0, 1.0)
        };
        self.sideways_friction.dynamic_friction = self.config.wheel_dynamic_friction * dynamic_scale;
        self.sideways_friction.static_friction = self.config.wheel_static_friction * static_scale;
        let sideways_correction = self.sideways_friction.update(sideways_error);
        body.add_force(side * sideways_correction * mass, ForceMode::Acceleration);
    }

    // ==================================================
    // contacts (after the host step)
    // ==================================================
    pub fn on_collision<B: KartBody + ?Sized>(&mut self, body: &mut B, collision: &Collision) {
        self.ground.register_collision(collision);

        let velocity = body.linear_velocity();
        let reduced = reduce_hop(
            velocity,
            &collision.impulse,
            &self.last_ground_normal,
            body.mass(),
            self.config.hop_horizontal_damping,
        );
        if reduced != velocity {
            body.set_linear_velocity(reduced);
        }
    }

    // ==================================================
    // alignment (after the host step)
    // ==================================================
    pub fn align<B: KartBody + ?Sized>(&mut self, body: &mut B, dt: Real) {
        let steering_cfg = self.config.steering();
        let mut rate = steering_rate(&steering_cfg, self.steering, self.drift_direction());

        if self.grounded {
            self.air_elapsed = 0.0;
        } else {
            self.air_elapsed += dt;
            rate *= air_steering_multiplier(&steering_cfg, self.air_elapsed);
        }

        let rotation = align_and_yaw(&body.orientation(), &self.last_ground_normal, rate * dt);
        body.set_orientation(rotation);
    }
}
