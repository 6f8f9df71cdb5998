//! Per-frame simulation step
//!
//! Advances one avatar by one display frame against an immutable course.

use super::catalog::{Impulse, Policy};
use super::collision::{self, LaneContact, SolidContact};
use super::grid::{self, cell_rect};
use super::state::{AvatarState, LevelObject, Vehicle};
use super::vehicle;
use crate::consts::*;

/// Input signals for a single frame (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Jump input currently pressed
    pub held: bool,
    /// Jump input went down since the previous frame
    pub just_pressed: bool,
}

/// What a step did to the attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Still playing
    Running,
    /// Hit something lethal this frame
    Died,
    /// Reached the exit this frame
    Won,
    /// Avatar already frozen; only effects advanced
    Frozen,
}

/// The placed objects of a level, fixed for the duration of play
#[derive(Debug, Clone)]
pub struct Course {
    objects: Vec<LevelObject>,
    end_x: f32,
}

impl Course {
    pub fn new(objects: Vec<LevelObject>) -> Self {
        let end_x = grid::level_end(objects.iter().map(|o| o.x).max());
        Self { objects, end_x }
    }

    pub fn objects(&self) -> &[LevelObject] {
        &self.objects
    }

    /// Simulation-space x at which progress reaches 100%
    pub fn end_x(&self) -> f32 {
        self.end_x
    }
}

/// Advance the avatar by one frame
pub fn tick(state: &mut AvatarState, course: &Course, input: &TickInput) -> StepOutcome {
    // Death visuals keep animating while frozen
    state.effects.decay();
    if !state.active {
        return StepOutcome::Frozen;
    }
    state.frame += 1;

    let mut prev_pos = state.pos;
    let mut just_pressed = input.just_pressed;

    vehicle::apply_force(state, input);

    state.pos.y += state.vel.y;
    state.pos.x += state.vel.x * state.speed_factor;

    let mut grounded = false;
    match collision::resolve_lanes(state) {
        LaneContact::Lethal => return StepOutcome::Died,
        LaneContact::Grounded => grounded = true,
        LaneContact::Clear | LaneContact::Blocked => {}
    }

    // Spider: instant hop to the opposite lane
    if state.vehicle == Vehicle::Spider && just_pressed && state.on_ground {
        state.pos.y = collision::spider_target(state, course);
        state.vel.y = 0.0;
        state.gravity.flip();
        prev_pos = state.pos;
        grounded = true;
    }

    let mut launched = false;
    for obj in course.objects() {
        let policy = obj.kind.policy();
        let cell = cell_rect(obj.x, obj.y);
        let contact = policy.contact_rect(cell);
        let bounds = state.bounds();
        if !bounds.overlaps(&contact) {
            continue;
        }

        match policy {
            Policy::Lethal { margin } => {
                if collision::touches_lethal(&bounds, &cell, margin) {
                    return StepOutcome::Died;
                }
            }
            Policy::Solid { .. } => {
                if state.vehicle == Vehicle::Wave {
                    return StepOutcome::Died;
                }
                match collision::resolve_solid(state, prev_pos, &contact) {
                    SolidContact::Landed => grounded = true,
                    SolidContact::Side => {
                        if collision::side_hit_is_lethal(state) {
                            return StepOutcome::Died;
                        }
                    }
                }
            }
            Policy::Orb(impulse) => {
                if just_pressed && !state.used_triggers.contains(&obj.id) {
                    apply_impulse(state, impulse);
                    state.used_triggers.insert(obj.id.clone());
                    // One press buys one orb
                    just_pressed = false;
                    launched = true;
                }
            }
            Policy::Pad(impulse) => {
                if !state.used_triggers.contains(&obj.id) {
                    apply_impulse(state, impulse);
                    state.used_triggers.insert(obj.id.clone());
                    launched = true;
                }
            }
            Policy::Vehicle(v) => state.switch_vehicle(v),
            Policy::Gravity(g) => state.gravity = g,
            Policy::Speed(factor) => state.speed_factor = factor,
            Policy::Exit => return StepOutcome::Won,
            Policy::Inert => {}
        }
    }

    // A trigger that fired this frame wins over any ground contact
    state.on_ground = grounded && !launched;
    if state.on_ground {
        state.used_triggers.clear();
        state.ball_flip_lock = false;
    }

    if state.vehicle == Vehicle::Cube && (input.held || input.just_pressed) && state.on_ground {
        state.vel.y = JUMP_VELOCITY * state.gravity.sign();
        state.on_ground = false;
    }

    vehicle::update_rotation(state, input);

    state.camera_x += (state.pos.x - CAMERA_LEAD - state.camera_x) * CAMERA_SMOOTHING;

    let end = course.end_x();
    state.progress = (state.pos.x.clamp(0.0, end) / end * 100.0).min(100.0);
    if state.progress >= 100.0 {
        return StepOutcome::Won;
    }

    StepOutcome::Running
}

fn apply_impulse(state: &mut AvatarState, impulse: Impulse) {
    if impulse.flip_gravity {
        state.gravity.flip();
    }
    state.vel.y = impulse.vy * state.gravity.sign();
    state.on_ground = false;
}
