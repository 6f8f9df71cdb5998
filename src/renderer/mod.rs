//! Rendering module
//!
//! `scene` turns the avatar and course into a flat draw list; `canvas` paints
//! that list on a browser 2D context.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;
pub use scene::{DrawCmd, SceneOptions, build_scene};
