// ==============================================================================
// config.rs — SIMULATION + KART TUNING (JSON)
// ------------------------------------------------------------------------------
// Every field has a default, so a config file only needs the values it
// changes:
//
//   { "fixed_timestep": 0.01, "kart": { "max_speed": 25.0 } }
//
// A missing file is not an error; it yields `SimulationConfig::default()`.
// ==============================================================================

use std::io::ErrorKind;
use std::path::Path;

use rapier3d::prelude::Real;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ConfigError, Result};
use crate::kart::InterpolationMode;
use crate::vehicle::KartConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub kart: KartConfig,
    pub fixed_timestep: Real,  // s per simulation tick
    pub render_interval: Real, // s per presentation frame
    pub duration_secs: Real,   // demo run length
    pub interpolation: InterpolationMode,
    pub seed: u64,             // stage bump layout
    pub spawn: [Real; 3],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            kart: KartConfig::default(),
            fixed_timestep: 0.02,
            render_interval: 1.0 / 60.0,
            duration_secs: 12.0,
            interpolation: InterpolationMode::Linear,
            seed: 7,
            spawn: [0.0, 1.5, 0.0],
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let config = Self::from_json_str(&json)?;
                info!(path = %path.display(), "loaded config");
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io { path: path.to_path_buf(), source }),
        }
    }

    pub fn validate(&self) -> Result<()> {
        positive("fixed_timestep", self.fixed_timestep)?;
        positive("render_interval", self.render_interval)?;
        non_negative("duration_secs", self.duration_secs)?;

        let k = &self.kart;
        positive("kart.max_speed", k.max_speed)?;
        positive("kart.acceleration", k.acceleration)?;
        non_negative("kart.wheel_static_friction", k.wheel_static_friction)?;
        non_negative("kart.wheel_dynamic_friction", k.wheel_dynamic_friction)?;
        non_negative("kart.jump_force", k.jump_force)?;
        non_negative("kart.air_steering_delay", k.air_steering_delay)?;
        non_negative("kart.air_steering_transition_duration", k.air_steering_transition_duration)?;
        non_negative("kart.boost.duration", k.boost.duration)?;

        if !(k.slope_angle_limit > 0.0 && k.slope_angle_limit <= 180.0) {
            return Err(ConfigError::invalid(
                "kart.slope_angle_limit",
                format!("{} is outside (0, 180]", k.slope_angle_limit),
            ));
        }
        unit_interval("kart.drift_friction_multiplier", k.drift_friction_multiplier)?;
        unit_interval("kart.hop_horizontal_damping", k.hop_horizontal_damping)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: Real) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be > 0")))
    }
}

fn non_negative(field: &'static str, value: Real) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be >= 0")))
    }
}

fn unit_interval(field: &'static str, value: Real) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is outside [0, 1]")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SimulationConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = SimulationConfig::from_json_str(
            r#"{ "fixed_timestep": 0.01, "interpolation": "kinematic", "kart": { "max_speed": 25.0 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.fixed_timestep, 0.01);
        assert_eq!(cfg.interpolation, InterpolationMode::Kinematic);
        assert_eq!(cfg.kart.max_speed, 25.0);
        assert_eq!(cfg.kart.acceleration, 10.0);
        assert_eq!(cfg.kart.boost.max_speed_multiplier, 1.5);
    }

    #[test]
    fn rejects_non_positive_timestep() {
        let err = SimulationConfig::from_json_str(r#"{ "fixed_timestep": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "fixed_timestep", .. }));
    }

    #[test]
    fn rejects_bad_slope_limit_and_multiplier() {
        let err = SimulationConfig::from_json_str(r#"{ "kart": { "slope_angle_limit": 200.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "kart.slope_angle_limit", .. }));

        let err =
            SimulationConfig::from_json_str(r#"{ "kart": { "drift_friction_multiplier": 1.5 } }"#)
                .unwrap_err();
        assert!(err.to_string().contains("drift_friction_multiplier"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SimulationConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_means_defaults() {
        let cfg = SimulationConfig::load("/definitely/not/here/kart.json").unwrap();
        assert_eq!(cfg, SimulationConfig::default());
    }
}
