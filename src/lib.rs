//! Dash Runner - grid level runtime for an auto-scrolling rhythm platformer
//!
//! Core modules:
//! - `sim`: Deterministic per-frame simulation (avatar physics, collisions, triggers)
//! - `attempt`: Attempt lifecycle (death, respawn timer, win freeze, retry)
//! - `level`: Level document, editor collection operations, JSON export
//! - `generate`: AI batch interface (prompt, response parsing)
//! - `renderer`: Draw list for the browser canvas
//! - `platform`: Browser/native input plumbing
//! - `settings`: User preferences

pub mod attempt;
pub mod generate;
pub mod level;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use attempt::{AttemptController, AttemptPhase, FrameReport};
pub use level::{Difficulty, LevelData, LevelError, LevelMetadata};
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
///
/// Simulation space is y-down pixels and every rate is per frame.
pub mod consts {
    /// Nominal display refresh rate the per-frame constants are tuned for
    pub const SIM_FPS: f32 = 60.0;

    /// Grid cell edge length (pixels)
    pub const CELL: f32 = 40.0;
    /// Playfield height in cells (y = 0..=11)
    pub const ROWS: i32 = 12;
    pub const PLAYFIELD_HEIGHT: f32 = ROWS as f32 * CELL;
    /// Visible view width (pixels)
    pub const VIEW_WIDTH: f32 = 1200.0;

    /// Avatar bounding box edge length
    pub const AVATAR_SIZE: f32 = 34.0;
    /// Attempt start pose: off-screen left, resting on the floor lane
    pub const START_X: f32 = -400.0;
    pub const START_Y: f32 = PLAYFIELD_HEIGHT - CELL - AVATAR_SIZE;

    /// Forward scroll speed before speed zones
    pub const BASE_SPEED: f32 = 9.0;
    pub const GRAVITY: f32 = 1.6;
    /// Ground jump velocity (negative = away from the floor under normal gravity)
    pub const JUMP_VELOCITY: f32 = -17.9;
    pub const SHIP_THRUST: f32 = -1.2;
    pub const SHIP_GRAVITY_SCALE: f32 = 0.7;
    pub const SHIP_MAX_SPEED: f32 = 12.0;
    pub const SWING_GRAVITY_SCALE: f32 = 0.8;
    /// UFO taps and robot jumps are weaker than the cube jump
    pub const UFO_ROBOT_JUMP_SCALE: f32 = 0.75;
    /// Frames a robot jump can be extended by holding
    pub const ROBOT_JUMP_WINDOW: u32 = 12;

    /// Spike lethal region inset on every side
    pub const SPIKE_MARGIN: f32 = 12.0;
    /// Orb activation region outset on every side
    pub const ORB_MARGIN: f32 = 10.0;
    /// How far past a solid's surface the previous frame may be and still count as landing
    pub const LANDING_TOLERANCE: f32 = 15.0;
    /// Side hits on solids only kill once the avatar has scrolled past this x
    pub const SIDE_DEATH_MIN_X: f32 = -150.0;

    /// Cells of runway appended after the right-most object
    pub const LEVEL_END_MARGIN: i32 = 15;
    /// Level length used when nothing is placed
    pub const EMPTY_LEVEL_END: f32 = 5000.0;

    /// Camera keeps the avatar this far from the left edge of the view
    pub const CAMERA_LEAD: f32 = VIEW_WIDTH * 0.28;
    pub const CAMERA_SMOOTHING: f32 = 0.15;

    /// Delay between death and the automatic reset
    pub const RESPAWN_DELAY_MS: f64 = 800.0;
}
