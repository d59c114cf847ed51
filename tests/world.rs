//! Drives the kart controller inside a real rapier world.

use std::cell::Cell;
use std::rc::Rc;

use kart_physics::input::Axes;
use kart_physics::kart::{KartBody, Vec3};
use kart_physics::{Kart, PhysicsWorld, SimulationConfig};

const DT: f32 = 0.02;

fn world_at(spawn: [f32; 3]) -> (PhysicsWorld, Kart) {
    let config = SimulationConfig { spawn, ..Default::default() };
    let world = PhysicsWorld::new(&config);
    let kart = Kart::new(config.kart.clone());
    (world, kart)
}

fn run(world: &mut PhysicsWorld, kart: &mut Kart, input: &Axes, ticks: usize) {
    for _ in 0..ticks {
        world.fixed_tick(kart, input, DT);
    }
}

fn kart_position(world: &PhysicsWorld) -> Vec3 {
    world.kart().map(|rb| *rb.translation()).unwrap_or_else(Vec3::zeros)
}

#[test]
fn kart_falls_and_settles_grounded() {
    let (mut world, mut kart) = world_at([0.0, 1.5, 0.0]);
    assert!(!kart.is_grounded());

    run(&mut world, &mut kart, &Axes::default(), 75);

    let mut grounded = 0;
    for _ in 0..25 {
        world.fixed_tick(&mut kart, &Axes::default(), DT);
        if kart.is_grounded() {
            grounded += 1;
        }
    }
    assert!(grounded >= 20, "grounded on {grounded}/25 ticks");

    let pos = kart_position(&world);
    assert!(pos.y > 0.3 && pos.y < 0.8, "resting height {}", pos.y);
    assert!((kart.ground_normal() - Vec3::y()).norm() < 0.05);
}

#[test]
fn throttle_drives_kart_forward() {
    let (mut world, mut kart) = world_at([0.0, 0.6, 0.0]);
    let input = Axes { throttle: 1.0, ..Default::default() };

    run(&mut world, &mut kart, &input, 100);

    let pos = kart_position(&world);
    let vel = world.kart().map(|rb| rb.linear_velocity()).unwrap_or_else(Vec3::zeros);
    assert!(pos.z > 3.0, "z = {}", pos.z);
    assert!(vel.z > 3.0, "vz = {}", vel.z);
    assert!(kart.engine_speed() > 10.0);
}

#[test]
fn boost_pad_boosts_on_entry() {
    let (mut world, mut kart) = world_at([0.0, 0.6, 15.0]);
    run(&mut world, &mut kart, &Axes::default(), 5);
    assert!(kart.is_boosting());
    assert!(world.boost_pad.is_occupied());
    assert_eq!(kart.engine().max_speed_multiplier, 1.5);
}

#[test]
fn bump_kick_is_reduced_on_contact() {
    let (world, _) = world_at([0.0, 0.6, 0.0]);
    let bump = world.bumps[0];
    let target = *world.colliders[bump].translation();
    let (mut world, mut kart) = world_at([target.x, 0.6, target.z - 6.0]);
    let input = Axes { throttle: 1.0, ..Default::default() };

    // the fixed tick spelled out, to watch velocity around each contact
    let mut reduced = 0;
    for _ in 0..100 {
        let kart_body = world.kart_body;
        kart.fixed_update(&mut world.bodies[kart_body], &input, DT);
        world.step(DT);

        let collisions = world.collisions();
        let rb = &mut world.bodies[kart_body];
        for collision in &collisions {
            let n = kart.ground_normal();
            let before = rb.linear_velocity().dot(&n);
            kart.on_collision(rb, collision);
            let after = rb.linear_velocity().dot(&n);
            if collision.impulse.dot(&n) > 1e-4 && before > 1e-4 {
                assert!(after < before, "{before} -> {after}");
                reduced += 1;
            }
        }
        kart.align(rb, DT);
    }

    assert!(reduced > 0, "no upward kick was ever reduced");
    assert!(kart_position(&world).z > target.z, "kart never got past the bump");
}

#[test]
fn drift_tap_hops_and_starts_drift() {
    let (mut world, mut kart) = world_at([0.0, 0.6, 0.0]);
    let jumps = Rc::new(Cell::new(0));
    let seen = Rc::clone(&jumps);
    kart.on_jump(move |_| seen.set(seen.get() + 1));

    run(&mut world, &mut kart, &Axes::default(), 50);
    assert!(kart.is_grounded());

    let input = Axes { throttle: 1.0, steering: 0.8, drift: true, ..Default::default() };
    world.fixed_tick(&mut kart, &input, DT);

    assert_eq!(jumps.get(), 1);
    assert_eq!(kart.drift_direction(), Some(1.0));
    let vy = world.kart().map(|rb| rb.linear_velocity().y).unwrap_or(0.0);
    assert!(vy > 1.0, "vy = {vy}");

    // holding the button is not another tap
    run(&mut world, &mut kart, &input, 10);
    assert_eq!(jumps.get(), 1);
}

#[test]
fn rotating_platform_carries_parked_kart() {
    let (mut world, mut kart) = world_at([15.0, 0.7, 2.0]);
    run(&mut world, &mut kart, &Axes::default(), 25);
    let before = kart_position(&world);

    run(&mut world, &mut kart, &Axes::default(), 100);
    let after = kart_position(&world);

    let moved = Vec3::new(after.x - before.x, 0.0, after.z - before.z).norm();
    assert!(moved > 0.3, "moved {moved}");
    assert!(world.rotor.angle() > 0.0);
}
