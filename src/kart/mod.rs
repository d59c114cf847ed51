//! kart - engine-agnostic kart dynamics helpers (pure types + models)

pub mod types;
pub mod friction;
pub mod engine;
pub mod ground;
pub mod steering;
pub mod hop;
pub mod interpolation;

pub use types::*;
pub use friction::{FrictionCalculator, TireState};
pub use engine::EngineModel;
pub use ground::GroundDetector;
pub use interpolation::{InterpolationMode, PoseInterpolator, SimulationSnapshot};
