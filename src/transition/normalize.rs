//! Normalization pass: expands the authored transition list into a flat,
//! validated, time-stamped sequence the compiler can consume.

use std::collections::BTreeMap;

use crate::foundation::core::{MIN_DURATION_SECS, Property};
use crate::foundation::error::{PlumeError, PlumeResult};
use crate::transition::{ParticleSpec, Target, Transition, TransitionEntry};

/// A transition after normalization: duration resolved, absolute start time
/// assigned (cumulative sum of prior durations; first transition is 0).
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TimedTransition {
    pub targets: BTreeMap<Property, Target>,
    pub bx: Option<f64>,
    pub by: Option<f64>,
    pub duration: f64,
    pub time: f64,
}

impl TimedTransition {
    pub fn target(&self, prop: Property) -> Option<&Target> {
        self.targets.get(&prop)
    }

    pub fn control_for(&self, prop: Property) -> Option<f64> {
        match prop {
            Property::X => self.bx,
            Property::Y => self.by,
            _ => None,
        }
    }
}

#[tracing::instrument(skip_all)]
pub fn normalize(spec: &ParticleSpec) -> PlumeResult<Vec<TimedTransition>> {
    let mut flat = flatten(spec)?;

    // A lone transition still needs a pair to span, so pad with an empty
    // end state: every property simply carries forward.
    if flat.len() == 1 {
        flat.push(Transition::new());
    }
    if flat.is_empty() {
        return Err(PlumeError::config(
            "particle spec must provide at least one transition or a start state",
        ));
    }

    for tran in &flat {
        tran.validate()?;
    }

    quantize_colors(&mut flat, spec.optimize_colors);

    let mut timed = Vec::with_capacity(flat.len());
    let mut clock = 0.0;
    for tran in flat {
        let mut duration = tran.duration.unwrap_or(1.0);
        if duration == 0.0 {
            duration = MIN_DURATION_SECS;
        }
        timed.push(TimedTransition {
            targets: tran.targets,
            bx: tran.bx,
            by: tran.by,
            duration,
            time: clock,
        });
        clock += duration;
    }

    tracing::debug!(transitions = timed.len(), lifespan = ?timed.last().map(|t| t.time), "normalized");
    Ok(timed)
}

fn flatten(spec: &ParticleSpec) -> PlumeResult<Vec<Transition>> {
    if spec.transitions.is_empty() {
        let Some(start) = &spec.start else {
            return Ok(Vec::new());
        };
        let mut start = start.clone();
        start.duration = Some(spec.lifespan.unwrap_or(1.0));
        let mut flat = vec![start];
        if let Some(end) = &spec.end {
            flat.push(end.clone());
        }
        return Ok(flat);
    }

    let mut flat = Vec::with_capacity(spec.transitions.len());
    for entry in &spec.transitions {
        match entry {
            TransitionEntry::One(tran) => flat.push(tran.clone()),
            TransitionEntry::Repeat { count, block } => {
                for _ in 0..*count {
                    flat.extend(block.iter().cloned());
                }
            }
        }
    }
    Ok(flat)
}

/// Round explicitly-set r/g/b targets to the nearest multiple of `step`.
/// Fewer distinct colors means more sheet-cell reuse in the batch renderer.
fn quantize_colors(transitions: &mut [Transition], step: u32) {
    if step == 0 {
        return;
    }
    let step = f64::from(step);
    for tran in transitions {
        for prop in Property::ALL.into_iter().filter(|p| p.is_color()) {
            if let Some(target) = tran.targets.get_mut(&prop) {
                target.value = (target.value / step).round() * step;
            }
        }
    }
}
