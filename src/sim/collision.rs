//! Collision detection and response against lanes and solid cells
//!
//! Solids are one-sided platforms: whether a contact is a landing or a
//! side hit is decided from where the avatar was *before* this frame's
//! integration, relative to the surface on the gravity-facing side.

use glam::Vec2;

use super::grid::{CEILING_Y, FLOOR_Y, Rect, cell_rect};
use super::state::{AvatarState, GravityDir, Vehicle};
use super::tick::Course;
use crate::consts::*;

/// Result of clamping the avatar to the playfield lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneContact {
    /// Not touching either lane
    Clear,
    /// Touching the lane gravity points at
    Grounded,
    /// Touching the lane gravity points away from
    Blocked,
    /// Wave touched a lane
    Lethal,
}

/// Clamp the avatar between the floor and ceiling lanes
pub fn resolve_lanes(state: &mut AvatarState) -> LaneContact {
    let floor = FLOOR_Y - AVATAR_SIZE;
    let mut contact = LaneContact::Clear;

    if state.pos.y >= floor {
        state.pos.y = floor;
        state.vel.y = 0.0;
        contact = lane_contact(state, GravityDir::Normal);
    }
    if state.pos.y <= CEILING_Y {
        state.pos.y = CEILING_Y;
        state.vel.y = 0.0;
        contact = lane_contact(state, GravityDir::Flipped);
    }
    contact
}

fn lane_contact(state: &AvatarState, facing: GravityDir) -> LaneContact {
    if state.vehicle == Vehicle::Wave {
        LaneContact::Lethal
    } else if state.gravity == facing {
        LaneContact::Grounded
    } else {
        LaneContact::Blocked
    }
}

/// Whether the avatar has reached the lethal inner region of a hazard cell
pub fn touches_lethal(avatar: &Rect, cell: &Rect, margin: f32) -> bool {
    avatar.overlaps(&cell.inset(margin))
}

/// Outcome of touching a solid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolidContact {
    /// Landed on the gravity-facing surface
    Landed,
    /// Ran into the solid from the side (or against gravity)
    Side,
}

/// Resolve contact with a solid region
///
/// `prev_pos` is the avatar position before this frame's integration.
pub fn resolve_solid(state: &mut AvatarState, prev_pos: Vec2, solid: &Rect) -> SolidContact {
    match state.gravity {
        GravityDir::Normal => {
            let prev_bottom = prev_pos.y + AVATAR_SIZE;
            if state.vel.y >= 0.0 && prev_bottom <= solid.top + LANDING_TOLERANCE {
                state.pos.y = solid.top - AVATAR_SIZE;
                state.vel.y = 0.0;
                return SolidContact::Landed;
            }
        }
        GravityDir::Flipped => {
            let prev_top = prev_pos.y;
            if state.vel.y <= 0.0 && prev_top >= solid.bottom - LANDING_TOLERANCE {
                state.pos.y = solid.bottom;
                state.vel.y = 0.0;
                return SolidContact::Landed;
            }
        }
    }
    SolidContact::Side
}

/// Side hits are forgiven until the avatar has scrolled onto the level
pub fn side_hit_is_lethal(state: &AvatarState) -> bool {
    state.pos.x > SIDE_DEATH_MIN_X
}

/// Landing height for a spider teleport toward the opposite lane
///
/// Scans solids sharing the avatar's column and stops short of the nearest one.
pub fn spider_target(state: &AvatarState, course: &Course) -> f32 {
    let left = state.pos.x;
    let right = left + AVATAR_SIZE;
    let top = state.pos.y;
    let bottom = top + AVATAR_SIZE;

    let mut target = match state.gravity {
        GravityDir::Normal => CEILING_Y,
        GravityDir::Flipped => FLOOR_Y - AVATAR_SIZE,
    };

    for obj in course.objects() {
        // Teleports stop at the whole cell, slabs included
        if !matches!(obj.kind.policy(), super::catalog::Policy::Solid { .. }) {
            continue;
        }
        let cell = cell_rect(obj.x, obj.y);
        if right < cell.left || left > cell.right {
            continue;
        }
        match state.gravity {
            GravityDir::Normal if cell.bottom <= top => target = target.max(cell.bottom),
            GravityDir::Flipped if cell.top >= bottom => {
                target = target.min(cell.top - AVATAR_SIZE)
            }
            _ => {}
        }
    }
    target
}
