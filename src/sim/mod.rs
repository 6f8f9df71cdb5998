//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per frame, per-frame constants only
//! - Object list is read-only; only the avatar is mutated
//! - Stable iteration order (object list order)
//! - No rendering or platform dependencies

pub mod catalog;
pub mod collision;
pub mod grid;
pub mod state;
pub mod tick;
pub mod vehicle;

pub use catalog::{Impulse, ObjectKind, Policy};
pub use grid::Rect;
pub use state::{AvatarState, EffectsConfig, GravityDir, LevelObject, Particle, Shockwave, Vehicle};
pub use tick::{Course, StepOutcome, TickInput, tick};
