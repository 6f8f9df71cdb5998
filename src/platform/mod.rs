//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard, pointer and touch all feed one jump signal)
//! - Storage (LocalStorage on web, see [`crate::settings`])

pub mod input;

pub use input::{JUMP_KEYS, JumpInput};
