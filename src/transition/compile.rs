//! Delta-transition compiler.
//!
//! Converts a normalized transition sequence into one immutable
//! [`SegmentSet`] per adjacent pair. For each property the interpolation is
//! anchored on the transitions where the property was *last* and *next*
//! explicitly set, not merely the adjacent pair, so a property omitted for
//! several consecutive transitions still moves smoothly across the whole
//! gap. Each pair's segment records its fractional sub-range within that
//! larger span, letting the evaluator apply one global easing curve while
//! stepping pair by pair.

use crate::ease::Ease;
use crate::foundation::core::Property;
use crate::foundation::error::{PlumeError, PlumeResult};
use crate::transition::normalize::TimedTransition;

/// Compiled interpolation unit for one property across one adjacent pair.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Segment {
    /// Property value at the last transition that set it explicitly.
    pub initial: f64,
    /// Target minus initial across the full [last-seen, next-seen] span.
    pub delta: f64,
    /// This pair's sub-range within the span, both in `[0, 1]`.
    pub local_start: f64,
    pub local_end: f64,
    pub ease: Ease,
    /// Quadratic Bezier control value (X/Y only).
    pub bezier_ctrl: Option<f64>,
}

impl Segment {
    pub fn end_value(&self) -> f64 {
        self.initial + self.delta
    }
}

/// Per-pair segment lookup. A property absent here does not change on this
/// pair; the evaluator must skip it entirely, not apply a zero-valued
/// segment.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct SegmentSet {
    slots: [Option<Segment>; Property::COUNT],
}

impl SegmentSet {
    pub fn get(&self, prop: Property) -> Option<&Segment> {
        self.slots[prop.index()].as_ref()
    }

    pub fn insert(&mut self, prop: Property, segment: Segment) {
        self.slots[prop.index()] = Some(segment);
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, &Segment)> {
        Property::ALL
            .iter()
            .filter_map(|&prop| self.slots[prop.index()].as_ref().map(|seg| (prop, seg)))
    }
}

/// Compile the normalized sequence into `transitions.len() - 1` segment sets.
#[tracing::instrument(skip_all)]
pub fn compile(transitions: &[TimedTransition]) -> PlumeResult<Vec<SegmentSet>> {
    if transitions.len() < 2 {
        return Err(PlumeError::compile(
            "at least two transitions are required to form a segment",
        ));
    }

    let mut last_seen = [0usize; Property::COUNT];
    let mut sets = Vec::with_capacity(transitions.len() - 1);

    for i in 0..transitions.len() - 1 {
        let mut set = SegmentSet::default();
        for prop in Property::ALL {
            // Transition 0 counts as explicit for every property, backfilled
            // from the engine defaults when not authored.
            if i == 0 || transitions[i].target(prop).is_some() {
                last_seen[prop.index()] = i;
            }

            let Some((next_idx, target)) = (i + 1..transitions.len())
                .find_map(|k| transitions[k].target(prop).map(|t| (k, t)))
            else {
                // Never set again: frozen at its last value for the rest of
                // the particle's life.
                continue;
            };

            let last = &transitions[last_seen[prop.index()]];
            let next = &transitions[next_idx];
            let last_val = last
                .target(prop)
                .map(|t| t.value)
                .unwrap_or_else(|| prop.default_value());

            let delta = target.value - last_val;
            let span = next.time - last.time;
            if span <= 0.0 {
                return Err(PlumeError::compile(format!(
                    "zero time span for '{}' between transitions {} and {}",
                    prop.name(),
                    last_seen[prop.index()],
                    next_idx
                )));
            }

            let bezier_ctrl = next.control_for(prop);
            if delta == 0.0 && bezier_ctrl.is_none() {
                continue;
            }

            set.insert(
                prop,
                Segment {
                    initial: last_val,
                    delta,
                    local_start: (transitions[i].time - last.time) / span,
                    local_end: (transitions[i + 1].time - last.time) / span,
                    ease: target.ease,
                    bezier_ctrl,
                },
            );
        }
        sets.push(set);
    }

    tracing::debug!(pairs = sets.len(), "compiled segment sets");
    Ok(sets)
}
