// src/physics.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rapier3d::prelude::*;
use rapier3d::prelude::{Group, InteractionGroups};
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::contact::gather_collisions;
use crate::input::KartInput;
use crate::kart::{Collision, ForceMode, KartBody, Quat, Vec3};
use crate::stage::{BoostPad, Rotor};
use crate::vehicle::Kart;

const GROUP_STAGE: Group = Group::from_bits_truncate(0b0001);
const GROUP_KART: Group = Group::from_bits_truncate(0b0010);

pub const KART_RADIUS: Real = 0.5;   // m
pub const KART_MASS: Real = 10.0;    // kg
pub const KILL_PLANE_Y: Real = -20.0; // m, below this the kart respawns

const BUMP_COUNT: usize = 24;
const ROTOR_SPEED: Real = 45.0; // deg/s

// ==============================================================================
// rapier body as the kart's host body
// ------------------------------------------------------------------------------
// Acceleration  -> add_force(a * m)      (persists until reset_forces)
// VelocityChange-> apply_impulse(dv * m)  (applied to linvel immediately)
// gravity toggle-> gravity scale 0 / 1
// ==============================================================================
impl KartBody for RigidBody {
    fn position(&self) -> Vec3 { *self.translation() }
    fn orientation(&self) -> Quat { *self.rotation() }
    fn linear_velocity(&self) -> Vec3 { *self.linvel() }
    fn set_linear_velocity(&mut self, velocity: Vec3) { self.set_linvel(velocity, true); }
    fn mass(&self) -> Real { RigidBody::mass(self) }

    fn add_force(&mut self, force: Vec3, mode: ForceMode) {
        let mass = RigidBody::mass(self);
        match mode {
            ForceMode::Acceleration => RigidBody::add_force(self, force * mass, true),
            ForceMode::VelocityChange => self.apply_impulse(force * mass, true),
        }
    }

    fn set_orientation(&mut self, orientation: Quat) { self.set_rotation(orientation, true); }

    fn set_gravity_enabled(&mut self, enabled: bool) {
        self.set_gravity_scale(if enabled { 1.0 } else { 0.0 }, true);
    }
}

pub struct PhysicsWorld {
    pub gravity: Vector<Real>, // host gravity; the kart usually overrides it
    pub pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub ccd: CCDSolver,
    pub query_pipeline: QueryPipeline,
    pub kart_body: RigidBodyHandle,
    pub kart_collider: ColliderHandle,
    pub rotor: Rotor,
    pub boost_pad: BoostPad,
    pub bumps: Vec<ColliderHandle>,
    spawn: Vec3,
    time: f64, // s of simulated time
}

impl PhysicsWorld {
    pub fn new(config: &SimulationConfig) -> Self {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let stage_groups = InteractionGroups::new(GROUP_STAGE, GROUP_KART);

        // === 1. Static ground, top surface at y = 0 ===
        // The stage body sits at the origin; every stage collider's translation
        // below is therefore in world space.
        let ground_handle = bodies.insert(RigidBodyBuilder::fixed().build());
        let ground_collider = ColliderBuilder::cuboid(100.0, 1.0, 100.0)
            .translation(vector![0.0, -1.0, 0.0])
            .collision_groups(stage_groups)
            .friction(0.0)
            .restitution(0.0)
            .build();
        colliders.insert_with_parent(ground_collider, ground_handle, &mut bodies);

        // === 2. Small bumps past the start line (seeded, reproducible) ===
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut bumps = Vec::with_capacity(BUMP_COUNT);
        for _ in 0..BUMP_COUNT {
            let x = rng.gen_range(-8.0..8.0);
            let z = rng.gen_range(25.0..60.0);
            let half_height = rng.gen_range(0.04..0.12);
            let half_width = rng.gen_range(0.3..1.2);
            let collider = ColliderBuilder::cuboid(half_width, half_height, half_width)
                .translation(vector![x, half_height * 0.5, z])
                .collision_groups(stage_groups)
                .friction(0.0)
                .restitution(0.0)
                .build();
            bumps.push(colliders.insert_with_parent(collider, ground_handle, &mut bodies));
        }

        // === 3. Rotating platform (kinematic) ===
        let rotor_handle = bodies.insert(
            RigidBodyBuilder::kinematic_position_based()
                .translation(vector![15.0, 0.0, 0.0])
                .build(),
        );
        let rotor_collider = ColliderBuilder::cylinder(0.1, 4.0)
            .collision_groups(stage_groups)
            .friction(0.0)
            .build();
        colliders.insert_with_parent(rotor_collider, rotor_handle, &mut bodies);

        // === 4. Boost pad (sensor) ===
        let pad_collider = ColliderBuilder::cuboid(2.0, 0.25, 2.0)
            .translation(vector![0.0, 0.25, 15.0])
            .sensor(true)
            .collision_groups(stage_groups)
            .build();
        let pad_handle = colliders.insert_with_parent(pad_collider, ground_handle, &mut bodies);

        // === 5. Kart: sphere with locked rotations; orientation is driven by the controller ===
        let spawn = Vec3::new(config.spawn[0], config.spawn[1], config.spawn[2]);
        let kart_rb = RigidBodyBuilder::dynamic()
            .translation(spawn)
            .lock_rotations()
            .ccd_enabled(true)
            .build();
        let kart_body = bodies.insert(kart_rb);
        let kart_collider = ColliderBuilder::ball(KART_RADIUS)
            .mass(KART_MASS)
            .collision_groups(InteractionGroups::new(GROUP_KART, GROUP_STAGE))
            .friction(0.0) // wheel friction is the controller's job
            .restitution(0.0)
            .build();
        let kart_collider = colliders.insert_with_parent(kart_collider, kart_body, &mut bodies);

        info!(bodies = bodies.len(), colliders = colliders.len(), seed = config.seed, "stage built");

        Self {
            gravity: vector![0.0, -9.81, 0.0],
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            kart_body,
            kart_collider,
            rotor: Rotor::new(rotor_handle, ROTOR_SPEED),
            boost_pad: BoostPad::new(pad_handle, config.kart.boost),
            bumps,
            spawn,
            time: 0.0,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn kart(&self) -> Option<&RigidBody> {
        self.bodies.get(self.kart_body)
    }

    pub fn collisions(&self) -> Vec<Collision> {
        gather_collisions(&self.narrow_phase, &self.colliders, &self.bodies, self.kart_collider)
    }

    /// One full fixed tick: controller forces, pipeline step, contact
    /// feedback, stage triggers, then alignment.
    pub fn fixed_tick(&mut self, kart: &mut Kart, input: &dyn KartInput, dt: Real) {
        let Some(rb) = self.bodies.get_mut(self.kart_body) else { return };
        kart.fixed_update(rb, input, dt);

        self.step(dt);

        let collisions = self.collisions();
        if self.boost_pad.update(&self.narrow_phase, self.kart_collider) {
            self.boost_pad.apply(kart);
        }

        let Some(rb) = self.bodies.get_mut(self.kart_body) else { return };
        for collision in &collisions {
            kart.on_collision(rb, collision);
        }
        kart.align(rb, dt);
    }

    pub fn step(&mut self, dt: Real) {
        let hooks = ();
        let mut events = ();

        self.rotor.fixed_update(&mut self.bodies, dt);

        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &mut events,
            &hooks,
        );

        // controller forces are per tick
        if let Some(rb) = self.bodies.get_mut(self.kart_body) {
            rb.reset_forces(false);
        }

        self.respawn_lost_bodies();
        self.time += dt as f64;
    }

    // Safety: bodies that fell off the stage or blew up go back to spawn
    fn respawn_lost_bodies(&mut self) {
        for (handle, body) in self.bodies.iter_mut() {
            if !body.is_dynamic() {
                continue;
            }
            let pos = *body.translation();
            let lost = !pos.iter().all(|c| c.is_finite())
                || pos.y < KILL_PLANE_Y
                || pos.x.abs() > 1_000.0
                || pos.z.abs() > 1_000.0;

            if lost {
                body.set_translation(self.spawn, true);
                body.set_rotation(Quat::identity(), true);
                body.set_linvel(Vec3::zeros(), true);
                body.set_angvel(Vec3::zeros(), true);
                warn!(?handle, ?pos, "body lost, respawned");
            }
        }
    }
}
