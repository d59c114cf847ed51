//! Arcade kart dynamics: a velocity-domain friction model, contact-based
//! ground detection, a drift/jump/boost controller and fixed-tick pose
//! interpolation, with a rapier3d host.

pub mod kart;
pub mod input;
pub mod vehicle;
pub mod error;
pub mod config;
pub mod contact;
pub mod stage;
pub mod physics;
pub mod state;

pub use config::SimulationConfig;
pub use error::{ConfigError, Result};
pub use input::{ActionInput, Axes, KartAction, KartInput, Keyframe, ScriptedInput};
pub use physics::PhysicsWorld;
pub use state::KartSnapshot;
pub use vehicle::{BoostParams, BoostState, DriftState, JumpEvent, Kart, KartConfig};
