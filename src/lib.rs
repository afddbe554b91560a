//! Plume is a declarative 2D particle engine.
//!
//! Particles are authored as sparse, time-stamped property targets
//! ("transitions"). Construction normalizes and compiles the list exactly
//! once into immutable per-segment interpolation plans; each fixed 1/60 s
//! tick the frame evaluator writes fresh property state; the sheet renderer
//! batches same-colored particles into shared off-screen bitmaps so a
//! particle draw is one cell blit.
#![forbid(unsafe_code)]

pub mod ease;
pub mod emitter;
pub mod foundation;
pub mod particle;
pub mod render;
pub mod transition;

pub use ease::{Ease, EaseNoise};
pub use emitter::Emitter;
pub use foundation::core::{Property, PropertyState, Rgb8, TICK_SECS};
pub use foundation::error::{PlumeError, PlumeResult};
pub use particle::Particle;
pub use render::sheet::{BatchRenderer, BatchStats, SheetOpts};
pub use render::surface::Surface;
pub use transition::{ParticleSpec, Target, Transition, TransitionEntry};
