//! User-authored particle specifications.
//!
//! A particle is described by a sparse, ordered list of transitions: each
//! transition names the property values the particle should reach by that
//! point of its timeline, optional Bezier control offsets for curved paths,
//! and how long the step to the *next* transition takes. Properties omitted
//! from a transition carry forward, interpolating smoothly across the gap to
//! wherever they are next specified.

use std::collections::BTreeMap;

use crate::ease::Ease;
use crate::foundation::core::Property;
use crate::foundation::error::{PlumeError, PlumeResult};

pub mod compile;
pub mod normalize;

/// A property target within one transition: the value to reach, and the
/// easing applied on the approach.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    pub value: f64,
    #[serde(default)]
    pub ease: Ease,
}

impl Target {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            ease: Ease::Linear,
        }
    }

    pub fn eased(value: f64, ease: Ease) -> Self {
        Self { value, ease }
    }
}

/// One sparse keyframe: property targets plus optional Bezier control offsets
/// (`bx`/`by` pair with the X/Y targets of this transition) and an optional
/// duration in seconds for the step to the next transition (default 1).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transition {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub targets: BTreeMap<Property, Target>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl Transition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, prop: Property, value: f64) -> Self {
        self.targets.insert(prop, Target::new(value));
        self
    }

    pub fn set_eased(mut self, prop: Property, value: f64, ease: Ease) -> Self {
        self.targets.insert(prop, Target::eased(value, ease));
        self
    }

    /// Position shorthand for the common case.
    pub fn at(self, x: f64, y: f64) -> Self {
        self.set(Property::X, x).set(Property::Y, y)
    }

    pub fn color(self, r: f64, g: f64, b: f64) -> Self {
        self.set(Property::R, r)
            .set(Property::G, g)
            .set(Property::B, b)
    }

    pub fn duration(mut self, secs: f64) -> Self {
        self.duration = Some(secs);
        self
    }

    /// Quadratic Bezier control point for the path arriving at this
    /// transition's position.
    pub fn control(mut self, bx: f64, by: f64) -> Self {
        self.bx = Some(bx);
        self.by = Some(by);
        self
    }

    pub fn control_x(mut self, bx: f64) -> Self {
        self.bx = Some(bx);
        self
    }

    pub fn control_y(mut self, by: f64) -> Self {
        self.by = Some(by);
        self
    }

    pub(crate) fn validate(&self) -> PlumeResult<()> {
        for (prop, target) in &self.targets {
            if !target.value.is_finite() {
                return Err(PlumeError::config(format!(
                    "transition target '{}' must be finite",
                    prop.name()
                )));
            }
        }
        for (name, v) in [("bx", self.bx), ("by", self.by)] {
            if let Some(v) = v
                && !v.is_finite()
            {
                return Err(PlumeError::config(format!("{name} must be finite")));
            }
        }
        if let Some(d) = self.duration
            && !(d.is_finite() && d >= 0.0)
        {
            return Err(PlumeError::config("duration must be finite and >= 0"));
        }
        Ok(())
    }
}

/// A transition list item: either one transition, or a repeat block expanded
/// into `count` independent copies of its body during normalization.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum TransitionEntry {
    Repeat { count: u32, block: Vec<Transition> },
    One(Transition),
}

impl From<Transition> for TransitionEntry {
    fn from(t: Transition) -> Self {
        Self::One(t)
    }
}

fn default_optimize_colors() -> u32 {
    16
}

fn default_z() -> i32 {
    30
}

/// Complete particle description: a transition list (or the `start`/`end`
/// endpoint shorthand) plus rendering options.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParticleSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<TransitionEntry>,

    /// Endpoint shorthand: initial state, held or interpolated over
    /// `lifespan` seconds toward `end` (if given). Ignored when
    /// `transitions` is non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Transition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Transition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifespan: Option<f64>,

    /// Color quantization step for r/g/b targets (0 disables). Coarser steps
    /// mean fewer distinct colors and better sheet-cell reuse.
    #[serde(default = "default_optimize_colors")]
    pub optimize_colors: u32,

    /// Sprite to stencil; `None` uses the built-in radial particle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Derive orientation from the instantaneous slope of the motion path.
    #[serde(default)]
    pub face_direction: bool,

    #[serde(default = "default_z")]
    pub z: i32,

    /// Seed for the particle's deterministic sample stream (`Random` easing).
    #[serde(default)]
    pub seed: u64,
}

impl Default for ParticleSpec {
    fn default() -> Self {
        Self {
            transitions: Vec::new(),
            start: None,
            end: None,
            lifespan: None,
            optimize_colors: default_optimize_colors(),
            image: None,
            face_direction: false,
            z: default_z(),
            seed: 0,
        }
    }
}

impl ParticleSpec {
    pub fn from_transitions(transitions: Vec<TransitionEntry>) -> Self {
        Self {
            transitions,
            ..Self::default()
        }
    }

    /// Endpoint shorthand: `start` held for `lifespan` seconds, then `end`
    /// (when given) as the final state.
    pub fn from_endpoints(start: Transition, end: Option<Transition>, lifespan: f64) -> Self {
        Self {
            start: Some(start),
            end,
            lifespan: Some(lifespan),
            ..Self::default()
        }
    }

    pub fn with_image(mut self, name: impl Into<String>) -> Self {
        self.image = Some(name.into());
        self
    }

    pub fn with_face_direction(mut self) -> Self {
        self.face_direction = true;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_optimize_colors(mut self, step: u32) -> Self {
        self.optimize_colors = step;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_targets_and_controls() {
        let t = Transition::new()
            .at(100.0, 500.0)
            .set_eased(Property::Alpha, 0.0, Ease::EaseOut)
            .control(150.0, 0.0)
            .duration(5.0);
        assert_eq!(t.targets[&Property::X].value, 100.0);
        assert_eq!(t.targets[&Property::Alpha].ease, Ease::EaseOut);
        assert_eq!(t.bx, Some(150.0));
        assert_eq!(t.by, Some(0.0));
        assert_eq!(t.duration, Some(5.0));
    }

    #[test]
    fn json_roundtrip() {
        let spec = ParticleSpec::from_transitions(vec![
            Transition::new().at(0.0, 1000.0).set(Property::R, 255.0).into(),
            TransitionEntry::Repeat {
                count: 2,
                block: vec![Transition::new().set(Property::Alpha, 0.0)],
            },
            Transition::new().at(1000.0, 0.0).control(0.0, 500.0).into(),
        ])
        .with_face_direction();

        let s = serde_json::to_string_pretty(&spec).unwrap();
        let de: ParticleSpec = serde_json::from_str(&s).unwrap();
        assert_eq!(de.transitions, spec.transitions);
        assert!(de.face_direction);
        assert_eq!(de.optimize_colors, 16);
    }

    #[test]
    fn repeat_entry_deserializes_untagged() {
        let de: TransitionEntry =
            serde_json::from_str(r#"{ "count": 3, "block": [ { "targets": { "x": { "value": 1.0 } } } ] }"#)
                .unwrap();
        match de {
            TransitionEntry::Repeat { count, block } => {
                assert_eq!(count, 3);
                assert_eq!(block.len(), 1);
            }
            TransitionEntry::One(_) => panic!("expected repeat block"),
        }
    }

    #[test]
    fn validate_rejects_non_finite_values() {
        let t = Transition::new().set(Property::X, f64::NAN);
        assert!(t.validate().is_err());

        let t = Transition::new().duration(f64::INFINITY);
        assert!(t.validate().is_err());

        let t = Transition::new().duration(-1.0);
        assert!(t.validate().is_err());

        let t = Transition::new().control_x(f64::NAN);
        assert!(t.validate().is_err());
    }
}
