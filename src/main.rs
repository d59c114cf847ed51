use kart_physics::input::{Axes, Keyframe, ScriptedInput};
use kart_physics::kart::{KartBody, Pose, PoseInterpolator};
use kart_physics::{ConfigError, Kart, KartSnapshot, PhysicsWorld, SimulationConfig};

use rapier3d::prelude::Real;
use tokio::time::{interval, Duration, Instant};
use tracing::{info, trace, warn};

const SNAPSHOT_EVERY: u64 = 25; // fixed ticks between telemetry lines

/// Full throttle, a drift hop into a right-hand drift, release, then a gentle
/// left line over the bumps and a brake to finish.
fn demo_script() -> ScriptedInput {
    let key = |at: Real, throttle: Real, brake: Real, steering: Real, drift: bool| Keyframe {
        at,
        axes: Axes { throttle, brake, steering, drift },
    };
    ScriptedInput::new(vec![
        key(0.0, 1.0, 0.0, 0.0, false),
        key(3.0, 1.0, 0.0, 0.8, true),
        key(5.0, 1.0, 0.0, 0.0, false),
        key(6.0, 1.0, 0.0, -0.3, false),
        key(10.0, 0.0, 0.5, 0.0, false),
    ])
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ConfigError> {
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let path = std::env::args().nth(1).unwrap_or_else(|| "kart.json".to_string());
    let config = SimulationConfig::load(&path)?;
    info!(fixed_timestep = config.fixed_timestep, interpolation = ?config.interpolation, "starting kart simulation");

    let mut world = PhysicsWorld::new(&config);
    let mut kart = Kart::new(config.kart.clone());
    kart.on_jump(|e| info!(normal = ?e.ground_normal, "hop"));
    let mut input = demo_script();

    let dt = config.fixed_timestep;
    let initial = world.kart().map(|rb| Pose::of(rb)).unwrap_or_default();
    let mut interpolator = PoseInterpolator::new(config.interpolation, dt, initial);

    let mut fixed = interval(Duration::from_secs_f32(dt));
    let mut render = interval(Duration::from_secs_f32(config.render_interval));
    let total_ticks = (config.duration_secs / dt).ceil() as u64;
    let start = Instant::now();
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            _ = fixed.tick() => {
                input.advance(world.time() as Real);
                world.fixed_tick(&mut kart, &input, dt);
                tick += 1;

                let Some(rb) = world.kart() else { break };
                interpolator.record(Pose::of(rb), rb.linear_velocity(), start.elapsed().as_secs_f64());

                if tick % SNAPSHOT_EVERY == 0 {
                    match KartSnapshot::capture(tick, &kart, rb).to_json() {
                        Ok(json) => info!(target: "telemetry", "{json}"),
                        Err(e) => warn!(%e, "snapshot serialization failed"),
                    }
                }
                if tick >= total_ticks {
                    break;
                }
            }
            _ = render.tick() => {
                let pose = interpolator.blend(start.elapsed().as_secs_f64());
                trace!(position = ?pose.position, "render");
                interpolator.finish_frame();
            }
        }
    }

    info!(ticks = tick, sim_time = world.time(), "simulation finished");
    Ok(())
}
