//! One particle: construction compiles its transition list exactly once;
//! every tick the frame evaluator advances a fixed-step clock and writes the
//! interpolated property state back.

use std::f64::consts::PI;

use crate::ease::EaseNoise;
use crate::foundation::core::{Property, PropertyState, Rect, Rgb8, TICK_SECS};
use crate::foundation::error::PlumeResult;
use crate::render::sheet::BatchRenderer;
use crate::render::surface::Surface;
use crate::transition::ParticleSpec;
use crate::transition::compile::{Segment, SegmentSet, compile};
use crate::transition::normalize::{TimedTransition, normalize};

pub struct Particle {
    transitions: Vec<TimedTransition>,
    segments: Vec<SegmentSet>,
    current: usize,
    timer: f64,
    lifespan: f64,
    state: PropertyState,
    expired: bool,
    face_direction: bool,
    image: Option<String>,
    z: i32,
    noise: EaseNoise,
}

impl Particle {
    /// Normalize and compile the spec; a malformed spec is rejected here and
    /// never reaches the simulation.
    pub fn new(spec: ParticleSpec) -> PlumeResult<Self> {
        let transitions = normalize(&spec)?;
        let segments = compile(&transitions)?;

        // Lifespan is the absolute start time of the final transition: the
        // sum of every duration that precedes a following state.
        let lifespan = transitions.last().map(|t| t.time).unwrap_or(0.0);

        let mut state = PropertyState::default();
        for (prop, target) in &transitions[0].targets {
            state.set(*prop, target.value);
        }

        Ok(Self {
            transitions,
            segments,
            current: 0,
            timer: 0.0,
            lifespan,
            state,
            expired: false,
            face_direction: spec.face_direction,
            image: spec.image,
            z: spec.z,
            noise: EaseNoise::seeded(spec.seed),
        })
    }

    /// Advance the clock by one fixed simulation step and re-evaluate.
    ///
    /// If the clock crossed one or more transition boundaries since the last
    /// tick, each skipped segment is snapped to its exact final value before
    /// the current segment is evaluated, so no property ever jumps past its
    /// intended target under frame-rate variance.
    pub fn update(&mut self) {
        self.timer += TICK_SECS;

        while self.current + 1 < self.transitions.len()
            && self.timer > self.transitions[self.current + 1].time
        {
            apply_segments(
                &self.segments,
                self.current,
                &mut self.state,
                &mut self.noise,
                1.0,
                true,
            );
            self.current += 1;
        }

        if self.timer > self.lifespan {
            self.expired = true;
        }

        let tran = &self.transitions[self.current];
        let delta = (self.timer - tran.time) / tran.duration;
        apply_segments(
            &self.segments,
            self.current,
            &mut self.state,
            &mut self.noise,
            delta,
            false,
        );

        if self.face_direction {
            face_direction_of_motion(
                &self.segments,
                self.current,
                &mut self.state,
                &mut self.noise,
                delta,
            );
        }
    }

    /// Blit this particle's pre-stencilled sheet cell, scaled to its rect,
    /// alpha-modulated, rotated by its facing direction when set. A no-op if
    /// the particle was not queued in the renderer's current batch.
    pub fn draw(&self, surface: &mut Surface, sheets: &BatchRenderer) {
        sheets.draw(self, surface);
    }

    pub fn x(&self) -> f64 {
        self.state.x
    }

    pub fn y(&self) -> f64 {
        self.state.y
    }

    pub fn radius(&self) -> f64 {
        self.state.radius
    }

    pub fn alpha(&self) -> f64 {
        self.state.alpha
    }

    /// Orientation in radians (driven by `face_direction`, or animated
    /// directly through the `dir` property).
    pub fn dir(&self) -> f64 {
        self.state.dir
    }

    pub fn color(&self) -> Rgb8 {
        self.state.color8()
    }

    pub fn rect(&self) -> Rect {
        self.state.rect()
    }

    pub fn state(&self) -> &PropertyState {
        &self.state
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    pub fn timer(&self) -> f64 {
        self.timer
    }

    /// Total animation length in seconds.
    pub fn lifespan(&self) -> f64 {
        self.lifespan
    }

    /// Set once the clock passes the lifespan; the host scene drops the
    /// particle after its next render.
    pub fn expired(&self) -> bool {
        self.expired
    }
}

fn apply_segments(
    segments: &[SegmentSet],
    current: usize,
    state: &mut PropertyState,
    noise: &mut EaseNoise,
    delta: f64,
    snap: bool,
) {
    let Some(set) = segments.get(current) else {
        return;
    };
    for (prop, seg) in set.iter() {
        let frame_delta = if snap {
            1.0
        } else {
            eased_param(seg, noise, delta)
        };
        let value = match seg.bezier_ctrl {
            None => seg.initial + seg.delta * frame_delta,
            Some(ctrl) => quad_bezier(seg.initial, ctrl, seg.end_value(), frame_delta),
        };
        state.set(prop, value);
    }
}

/// Map pair-local progress into the segment's sub-range of the full span,
/// then ease it.
fn eased_param(seg: &Segment, noise: &mut EaseNoise, delta: f64) -> f64 {
    seg.ease
        .apply(delta * (seg.local_end - seg.local_start) + seg.local_start, noise)
}

/// Quadratic Bezier, canonical form.
fn quad_bezier(p0: f64, ctrl: f64, p1: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * p0 + 2.0 * t * u * ctrl + t * t * p1
}

/// First derivative of the quadratic Bezier at `t`.
fn quad_bezier_deriv(p0: f64, ctrl: f64, p1: f64, t: f64) -> f64 {
    2.0 * ((1.0 - t) * (ctrl - p0) + t * (p1 - ctrl))
}

/// Point the particle along its instantaneous direction of travel: the
/// arctangent of the path slope, flipped by π when the horizontal derivative
/// is non-positive so the facing vector follows the motion rather than its
/// mirror. Requires both axis segments on the active pair; orientation holds
/// otherwise.
fn face_direction_of_motion(
    segments: &[SegmentSet],
    current: usize,
    state: &mut PropertyState,
    noise: &mut EaseNoise,
    delta: f64,
) {
    let Some(set) = segments.get(current) else {
        return;
    };
    let (Some(sx), Some(sy)) = (set.get(Property::X), set.get(Property::Y)) else {
        return;
    };

    let tx = eased_param(sx, noise, delta);
    let ty = eased_param(sy, noise, delta);

    let run = match sx.bezier_ctrl {
        Some(ctrl) => quad_bezier_deriv(sx.initial, ctrl, sx.end_value(), tx),
        None => sx.delta,
    };
    let rise = match sy.bezier_ctrl {
        Some(ctrl) => quad_bezier_deriv(sy.initial, ctrl, sy.end_value(), ty),
        None => sy.delta,
    };

    let mut dir = (rise / run).atan();
    if run <= 0.0 {
        dir += PI;
    }
    state.dir = dir;
}
