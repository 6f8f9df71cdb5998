//! AI batch interface
//!
//! The editor asks an external text model for a level section. This module
//! builds the request text and decodes the reply; the network call itself
//! belongs to the shell. Merging is [`crate::LevelData::merge_generated`].

use serde::{Deserialize, Serialize};

use crate::consts::ROWS;
use crate::level::LevelError;
use crate::sim::ObjectKind;
use crate::sim::grid::MAX_ROW;

/// Objects requested per section
const SECTION_SIZE: (u32, u32) = (15, 30);

/// One generated placement, before it gets an id
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratedObject {
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub x: i32,
    pub y: i32,
}

impl GeneratedObject {
    pub fn new(kind: ObjectKind, x: i32, y: i32) -> Self {
        Self { kind, x, y }
    }
}

/// Hints describing what each family of kinds does
const KIND_GUIDE: &[&str] = &[
    "PINK_ORB: low jump, ORB: normal jump, RED_ORB: high jump.",
    "BLUE_ORB: gravity flip in air. GREEN_ORB: jump + gravity flip.",
    "PINK_PAD: low bounce, YELLOW_PAD: normal, RED_PAD: high bounce.",
    "BLUE_PAD: instant gravity flip on contact.",
    "BALL_PORTAL: player flips gravity on click. UFO_PORTAL: jump in mid-air.",
    "WAVE_PORTAL: player moves diagonally up on click, down on release.",
    "ROBOT_PORTAL: variable jump based on hold length.",
    "SPIDER_PORTAL: instant teleport to ceiling/floor on click.",
    "SWING_PORTAL: toggles gravity on each click in mid-air.",
    "GRAVITY_UP/DOWN_PORTAL: changes gravity direction.",
    "SPEED_X05 to X3: changes movement speed.",
];

/// Request text for a section starting at column `start_x`
pub fn generation_prompt(prompt: &str, start_x: i32) -> String {
    let kinds = ObjectKind::ALL
        .iter()
        .map(ObjectKind::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let guide = KIND_GUIDE
        .iter()
        .map(|line| format!("- {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Generate a Geometry Dash level segment.\n\
         Context: {prompt}.\n\
         Start X coordinate: {start_x}.\n\
         Grid height is {ROWS} units (y from 0 to {MAX_ROW}).\n\
         Bottom (y=0) is the ground.\n\
         Provide a JSON array of objects with type, x and y.\n\
         Types available: {kinds}.\n\
         \n\
         Guidelines:\n\
         {guide}\n\
         - Create challenging rhythm-based sequences ({}-{} objects).",
        SECTION_SIZE.0, SECTION_SIZE.1
    )
}

/// Decode a `[{type, x, y}]` reply
///
/// Coordinates may arrive as JSON floats; they are floored onto the grid.
pub fn parse_section(json: &str) -> Result<Vec<GeneratedObject>, LevelError> {
    #[derive(Deserialize)]
    struct Raw {
        #[serde(rename = "type")]
        kind: ObjectKind,
        x: f64,
        y: f64,
    }

    let raw: Vec<Raw> = serde_json::from_str(json)?;
    let batch: Vec<GeneratedObject> = raw
        .into_iter()
        .map(|r| GeneratedObject::new(r.kind, r.x.floor() as i32, r.y.floor() as i32))
        .collect();
    log::debug!("Parsed generated section with {} object(s)", batch.len());
    Ok(batch)
}
