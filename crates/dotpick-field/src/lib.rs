//! Particle choreography for dotpick.
//!
//! This crate owns the animated dots: the per-particle easing model, the
//! shape-to-particle assignment done on every shape switch, the settle check
//! that sequencing code waits on, and the firework bursts shown when a
//! winner is announced.

mod color;
mod field;
mod fireworks;
mod particle;
mod tween;

use thiserror::Error;

pub use color::{FIREWORK_COLORS, Palette};
pub use field::{Field, assign_targets};
pub use fireworks::{DISCS_PER_BURST, Fireworks};
pub use particle::{DEFAULT_SETTLE_THRESHOLD, Particle, SPAWN_DEPTH, SPAWN_EASE, Waypoint};
pub use tween::{Easing, Tween};

/// Errors from constructing or configuring particles.
#[derive(Debug, Error, PartialEq)]
pub enum ParticleError {
    #[error("easing rate must be in (0, 1], got {0}")]
    InvalidEase(f64),
    #[error("particle position must be finite, got ({x}, {y})")]
    NonFinitePosition { x: f64, y: f64 },
}
