// ==============================================================================
// input.rs — DRIVER INPUT PROVIDERS
// ------------------------------------------------------------------------------
// The kart samples four values once per fixed tick through `KartInput`.
// Providers here:
//   - Axes:          plain values (tests, network-free hosts)
//   - ScriptedInput: keyframed timeline sampled by simulation time
//   - ActionInput:   named action bindings fed by action events
// ==============================================================================

use std::collections::HashMap;

use rapier3d::prelude::Real;
use serde::{Deserialize, Serialize};

pub trait KartInput {
    fn throttle(&self) -> Real; // -1..1 (or 0..1)
    fn brake(&self) -> Real;    // 0..1
    fn steering(&self) -> Real; // -1 (left) .. 1 (right)
    fn drift(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub throttle: Real,
    pub brake: Real,
    pub steering: Real,
    pub drift: bool,
}

impl KartInput for Axes {
    fn throttle(&self) -> Real { self.throttle }
    fn brake(&self) -> Real { self.brake }
    fn steering(&self) -> Real { self.steering }
    fn drift(&self) -> bool { self.drift }
}

// ---------------------------------------------
// SCRIPTED TIMELINE
// ---------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub at: Real, // s, the axes hold from here until the next keyframe
    pub axes: Axes,
}

/// Step-held timeline; `advance` moves the read head.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptedInput {
    keyframes: Vec<Keyframe>,
    #[serde(skip)]
    current: Axes,
}

impl ScriptedInput {
    pub fn new(mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by(|a, b| a.at.total_cmp(&b.at));
        let mut script = Self { keyframes, current: Axes::default() };
        script.advance(0.0);
        script
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Select the keyframe active at `time`.
    pub fn advance(&mut self, time: Real) {
        self.current = self
            .keyframes
            .iter()
            .take_while(|k| k.at <= time)
            .last()
            .map(|k| k.axes)
            .unwrap_or_default();
    }

    pub fn current(&self) -> Axes {
        self.current
    }
}

impl KartInput for ScriptedInput {
    fn throttle(&self) -> Real { self.current.throttle }
    fn brake(&self) -> Real { self.current.brake }
    fn steering(&self) -> Real { self.current.steering }
    fn drift(&self) -> bool { self.current.drift }
}

// ---------------------------------------------
// ACTION BINDINGS
// ---------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KartAction {
    Throttle,
    Brake,
    Steering,
    Drift,
}

/// Maps host action names (e.g. "Accelerate", "Steer") onto kart actions and
/// keeps the last value each action reported. Unbound actions are ignored.
#[derive(Debug, Clone, Default)]
pub struct ActionInput {
    bindings: HashMap<String, KartAction>,
    values: HashMap<KartAction, Real>,
}

impl ActionInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, action_name: impl Into<String>, action: KartAction) -> Self {
        self.bindings.insert(action_name.into(), action);
        self
    }

    /// Feed one action event. Returns false when the name is not bound.
    pub fn on_action(&mut self, action_name: &str, value: Real) -> bool {
        let Some(&action) = self.bindings.get(action_name) else {
            return false;
        };
        self.values.insert(action, value);
        true
    }

    fn value(&self, action: KartAction) -> Real {
        self.values.get(&action).copied().unwrap_or(0.0)
    }
}

impl KartInput for ActionInput {
    fn throttle(&self) -> Real { self.value(KartAction::Throttle) }
    fn brake(&self) -> Real { self.value(KartAction::Brake) }
    fn steering(&self) -> Real { self.value(KartAction::Steering) }
    // button semantics: anything past half press counts
    fn drift(&self) -> bool { self.value(KartAction::Drift) > 0.5 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes(throttle: Real, steering: Real, drift: bool) -> Axes {
        Axes { throttle, brake: 0.0, steering, drift }
    }

    #[test]
    fn script_holds_each_keyframe() {
        let mut s = ScriptedInput::new(vec![
            Keyframe { at: 1.0, axes: axes(1.0, 0.8, true) },
            Keyframe { at: 0.0, axes: axes(1.0, 0.0, false) },
        ]);
        assert_eq!(s.keyframes()[0].at, 0.0);
        assert_eq!(s.current(), axes(1.0, 0.0, false));
        s.advance(0.99);
        assert!(!s.drift());
        s.advance(1.0);
        assert!(s.drift());
        assert_eq!(s.steering(), 0.8);
    }

    #[test]
    fn empty_script_is_neutral() {
        let s = ScriptedInput::new(Vec::new());
        assert_eq!(s.current(), Axes::default());
    }

    #[test]
    fn actions_route_through_bindings() {
        let mut input = ActionInput::new()
            .bind("Accelerate", KartAction::Throttle)
            .bind("Steer", KartAction::Steering)
            .bind("Drift", KartAction::Drift);

        assert!(input.on_action("Accelerate", 1.0));
        assert!(input.on_action("Steer", -0.6));
        assert!(!input.on_action("Honk", 1.0));
        assert_eq!(input.throttle(), 1.0);
        assert_eq!(input.steering(), -0.6);
        assert_eq!(input.brake(), 0.0);
        assert!(!input.drift());

        input.on_action("Drift", 1.0);
        assert!(input.drift());
    }
}
