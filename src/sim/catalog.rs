//! Object catalog and per-kind collision policy
//!
//! Every placeable kind maps to exactly one [`Policy`]. The simulation step
//! dispatches on the policy, never on the kind, so adding a kind only means
//! adding a row to [`ObjectKind::policy`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::grid::Rect;
use super::state::{GravityDir, Vehicle};
use crate::consts::*;

/// Placeable object kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObjectKind {
    #[default]
    Block,
    Spike,
    /// Default orb, behaves like the yellow orb
    Orb,
    YellowOrb,
    PinkOrb,
    RedOrb,
    BlueOrb,
    GreenOrb,
    /// Level exit
    Portal,
    Slab,
    YellowPad,
    PinkPad,
    RedPad,
    BluePad,
    ShipPortal,
    CubePortal,
    BallPortal,
    UfoPortal,
    WavePortal,
    RobotPortal,
    SpiderPortal,
    SwingPortal,
    GravityDownPortal,
    GravityUpPortal,
    SpeedX05,
    SpeedX1,
    SpeedX2,
    SpeedX3,
    /// Anything outside the catalog; never interacts
    Unknown,
}

impl ObjectKind {
    /// Every placeable kind, in palette order
    pub const ALL: [ObjectKind; 28] = [
        ObjectKind::Block,
        ObjectKind::Spike,
        ObjectKind::Orb,
        ObjectKind::YellowOrb,
        ObjectKind::PinkOrb,
        ObjectKind::RedOrb,
        ObjectKind::BlueOrb,
        ObjectKind::GreenOrb,
        ObjectKind::Portal,
        ObjectKind::Slab,
        ObjectKind::YellowPad,
        ObjectKind::PinkPad,
        ObjectKind::RedPad,
        ObjectKind::BluePad,
        ObjectKind::ShipPortal,
        ObjectKind::CubePortal,
        ObjectKind::BallPortal,
        ObjectKind::UfoPortal,
        ObjectKind::WavePortal,
        ObjectKind::RobotPortal,
        ObjectKind::SpiderPortal,
        ObjectKind::SwingPortal,
        ObjectKind::GravityDownPortal,
        ObjectKind::GravityUpPortal,
        ObjectKind::SpeedX05,
        ObjectKind::SpeedX1,
        ObjectKind::SpeedX2,
        ObjectKind::SpeedX3,
    ];

    /// Wire name used by level documents and the generation service
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Block => "BLOCK",
            ObjectKind::Spike => "SPIKE",
            ObjectKind::Orb => "ORB",
            ObjectKind::YellowOrb => "YELLOW_ORB",
            ObjectKind::PinkOrb => "PINK_ORB",
            ObjectKind::RedOrb => "RED_ORB",
            ObjectKind::BlueOrb => "BLUE_ORB",
            ObjectKind::GreenOrb => "GREEN_ORB",
            ObjectKind::Portal => "PORTAL",
            ObjectKind::Slab => "SLAB",
            ObjectKind::YellowPad => "YELLOW_PAD",
            ObjectKind::PinkPad => "PINK_PAD",
            ObjectKind::RedPad => "RED_PAD",
            ObjectKind::BluePad => "BLUE_PAD",
            ObjectKind::ShipPortal => "SHIP_PORTAL",
            ObjectKind::CubePortal => "CUBE_PORTAL",
            ObjectKind::BallPortal => "BALL_PORTAL",
            ObjectKind::UfoPortal => "UFO_PORTAL",
            ObjectKind::WavePortal => "WAVE_PORTAL",
            ObjectKind::RobotPortal => "ROBOT_PORTAL",
            ObjectKind::SpiderPortal => "SPIDER_PORTAL",
            ObjectKind::SwingPortal => "SWING_PORTAL",
            ObjectKind::GravityDownPortal => "GRAVITY_DOWN_PORTAL",
            ObjectKind::GravityUpPortal => "GRAVITY_UP_PORTAL",
            ObjectKind::SpeedX05 => "SPEED_X05",
            ObjectKind::SpeedX1 => "SPEED_X1",
            ObjectKind::SpeedX2 => "SPEED_X2",
            ObjectKind::SpeedX3 => "SPEED_X3",
            ObjectKind::Unknown => "UNKNOWN",
        }
    }

    /// Parse a wire name; anything unrecognised becomes [`ObjectKind::Unknown`]
    pub fn parse(s: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .unwrap_or(ObjectKind::Unknown)
    }

    /// Human-readable palette label
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Block => "Block",
            ObjectKind::Spike => "Spike",
            ObjectKind::Orb => "Orb",
            ObjectKind::YellowOrb => "Yellow Orb",
            ObjectKind::PinkOrb => "Pink Orb",
            ObjectKind::RedOrb => "Red Orb",
            ObjectKind::BlueOrb => "Blue Orb",
            ObjectKind::GreenOrb => "Green Orb",
            ObjectKind::Portal => "Exit Portal",
            ObjectKind::Slab => "Slab",
            ObjectKind::YellowPad => "Yellow Pad",
            ObjectKind::PinkPad => "Pink Pad",
            ObjectKind::RedPad => "Red Pad",
            ObjectKind::BluePad => "Blue Pad",
            ObjectKind::ShipPortal => "Ship Portal",
            ObjectKind::CubePortal => "Cube Portal",
            ObjectKind::BallPortal => "Ball Portal",
            ObjectKind::UfoPortal => "UFO Portal",
            ObjectKind::WavePortal => "Wave Portal",
            ObjectKind::RobotPortal => "Robot Portal",
            ObjectKind::SpiderPortal => "Spider Portal",
            ObjectKind::SwingPortal => "Swing Portal",
            ObjectKind::GravityDownPortal => "Normal Grav",
            ObjectKind::GravityUpPortal => "Flip Grav",
            ObjectKind::SpeedX05 => "Speed 0.5x",
            ObjectKind::SpeedX1 => "Speed 1x",
            ObjectKind::SpeedX2 => "Speed 2x",
            ObjectKind::SpeedX3 => "Speed 3x",
            ObjectKind::Unknown => "Unknown",
        }
    }

    /// The static collision/trigger policy for this kind
    pub fn policy(&self) -> Policy {
        match self {
            ObjectKind::Block => Policy::Solid { surface_offset: 0.0 },
            ObjectKind::Slab => Policy::Solid {
                surface_offset: CELL / 2.0,
            },
            ObjectKind::Spike => Policy::Lethal {
                margin: SPIKE_MARGIN,
            },
            ObjectKind::Orb | ObjectKind::YellowOrb => Policy::Orb(Impulse::jump(0.95)),
            ObjectKind::PinkOrb => Policy::Orb(Impulse::jump(0.7)),
            ObjectKind::RedOrb => Policy::Orb(Impulse::jump(1.4)),
            ObjectKind::BlueOrb => Policy::Orb(Impulse::flip(2.0)),
            ObjectKind::GreenOrb => Policy::Orb(Impulse::flip(JUMP_VELOCITY * 0.6)),
            ObjectKind::YellowPad => Policy::Pad(Impulse::jump(1.15)),
            ObjectKind::PinkPad => Policy::Pad(Impulse::jump(0.8)),
            ObjectKind::RedPad => Policy::Pad(Impulse::jump(1.65)),
            ObjectKind::BluePad => Policy::Pad(Impulse::flip(6.0)),
            ObjectKind::ShipPortal => Policy::Vehicle(Vehicle::Ship),
            ObjectKind::CubePortal => Policy::Vehicle(Vehicle::Cube),
            ObjectKind::BallPortal => Policy::Vehicle(Vehicle::Ball),
            ObjectKind::UfoPortal => Policy::Vehicle(Vehicle::Ufo),
            ObjectKind::WavePortal => Policy::Vehicle(Vehicle::Wave),
            ObjectKind::RobotPortal => Policy::Vehicle(Vehicle::Robot),
            ObjectKind::SpiderPortal => Policy::Vehicle(Vehicle::Spider),
            ObjectKind::SwingPortal => Policy::Vehicle(Vehicle::Swing),
            ObjectKind::GravityDownPortal => Policy::Gravity(GravityDir::Normal),
            ObjectKind::GravityUpPortal => Policy::Gravity(GravityDir::Flipped),
            ObjectKind::SpeedX05 => Policy::Speed(0.6),
            ObjectKind::SpeedX1 => Policy::Speed(1.0),
            ObjectKind::SpeedX2 => Policy::Speed(1.3),
            ObjectKind::SpeedX3 => Policy::Speed(1.6),
            ObjectKind::Portal => Policy::Exit,
            ObjectKind::Unknown => Policy::Inert,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ObjectKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ObjectKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ObjectKind::parse(&raw))
    }
}

/// A vertical velocity override, optionally preceded by a gravity flip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impulse {
    /// Flip gravity before applying `vy`
    pub flip_gravity: bool,
    /// Velocity in "normal gravity" terms; scaled by the gravity sign after any flip
    pub vy: f32,
}

impl Impulse {
    /// A jump of `scale` times the cube jump
    pub const fn jump(scale: f32) -> Self {
        Self {
            flip_gravity: false,
            vy: JUMP_VELOCITY * scale,
        }
    }

    /// Flip gravity, then push with `vy` relative to the new gravity
    pub const fn flip(vy: f32) -> Self {
        Self {
            flip_gravity: true,
            vy,
        }
    }
}

/// How an object interacts with the avatar
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy {
    /// Blocking platform; the solid region starts `surface_offset` below the cell top
    Solid { surface_offset: f32 },
    /// Kills when the avatar reaches the cell inset by `margin`
    Lethal { margin: f32 },
    /// One-shot, needs a fresh press while in range
    Orb(Impulse),
    /// One-shot, fires on contact
    Pad(Impulse),
    /// Switches vehicle on every overlapping frame
    Vehicle(Vehicle),
    /// Sets gravity on every overlapping frame
    Gravity(GravityDir),
    /// Sets the speed factor on every overlapping frame
    Speed(f32),
    /// Ends the attempt as a win
    Exit,
    /// No interaction
    Inert,
}

impl Policy {
    /// Region the avatar must touch before the policy is evaluated
    pub fn contact_rect(&self, cell: Rect) -> Rect {
        match self {
            Policy::Solid { surface_offset } => Rect {
                top: cell.top + surface_offset,
                ..cell
            },
            Policy::Orb(_) => cell.outset(ORB_MARGIN),
            _ => cell,
        }
    }

    /// Whether the policy is consumed once per grounded cycle
    pub fn is_one_shot(&self) -> bool {
        matches!(self, Policy::Orb(_) | Policy::Pad(_))
    }
}
