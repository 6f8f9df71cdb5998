//! Vehicle force laws and rotation presentation

use super::state::{AvatarState, Vehicle};
use super::tick::TickInput;
use crate::consts::*;

/// Apply the active vehicle's vertical law for this frame (before integration)
pub fn apply_force(state: &mut AvatarState, input: &TickInput) {
    let g = state.gravity.sign();
    match state.vehicle {
        Vehicle::Cube | Vehicle::Spider => {
            state.vel.y += GRAVITY * g;
        }
        Vehicle::Ship => {
            if input.held {
                state.vel.y += SHIP_THRUST * g;
            } else {
                state.vel.y += GRAVITY * SHIP_GRAVITY_SCALE * g;
            }
            state.vel.y = state.vel.y.clamp(-SHIP_MAX_SPEED, SHIP_MAX_SPEED);
        }
        Vehicle::Ball => {
            state.vel.y += GRAVITY * g;
            if input.just_pressed && state.on_ground && !state.ball_flip_lock {
                state.gravity.flip();
                state.on_ground = false;
                state.ball_flip_lock = true;
            }
        }
        Vehicle::Ufo => {
            state.vel.y += GRAVITY * g;
            if input.just_pressed {
                state.vel.y = JUMP_VELOCITY * UFO_ROBOT_JUMP_SCALE * g;
            }
        }
        Vehicle::Wave => {
            // Constant-angle diagonal: vertical speed mirrors forward speed
            let slope = state.vel.x * state.speed_factor;
            state.vel.y = if input.held { -slope * g } else { slope * g };
        }
        Vehicle::Robot => {
            state.vel.y += GRAVITY * g;
            let extending =
                state.robot_jump_frames > 0 && state.robot_jump_frames < ROBOT_JUMP_WINDOW;
            if input.held && (state.on_ground || extending) {
                state.vel.y = JUMP_VELOCITY * UFO_ROBOT_JUMP_SCALE * g;
                state.robot_jump_frames += 1;
                state.on_ground = false;
            } else {
                state.robot_jump_frames = 0;
            }
        }
        Vehicle::Swing => {
            state.vel.y += GRAVITY * SWING_GRAVITY_SCALE * g;
            if input.just_pressed {
                state.gravity.flip();
            }
        }
    }
}

/// Ease or spin the presentation rotation for this frame
pub fn update_rotation(state: &mut AvatarState, input: &TickInput) {
    let g = state.gravity.sign();
    match state.vehicle {
        Vehicle::Wave => {
            state.rotation = if input.held { -45.0 * g } else { 45.0 * g };
        }
        Vehicle::Ship | Vehicle::Ufo | Vehicle::Swing => {
            let target = state.vel.y * 3.0 * g;
            state.rotation += (target - state.rotation) * 0.2;
        }
        Vehicle::Ball | Vehicle::Spider => {
            state.rotation += 10.0 * g;
        }
        Vehicle::Robot => {
            state.rotation += (0.0 - state.rotation) * 0.3;
        }
        Vehicle::Cube => {
            if state.on_ground {
                let target = (state.rotation / 90.0).round() * 90.0;
                state.rotation += (target - state.rotation) * 0.4;
            } else {
                state.rotation += 9.0 * g;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GravityDir;

    fn avatar(vehicle: Vehicle) -> AvatarState {
        AvatarState {
            vehicle,
            ..AvatarState::new()
        }
    }

    const PRESS: TickInput = TickInput {
        held: true,
        just_pressed: true,
    };
    const HOLD: TickInput = TickInput {
        held: true,
        just_pressed: false,
    };
    const IDLE: TickInput = TickInput {
        held: false,
        just_pressed: false,
    };

    #[test]
    fn test_cube_falls_with_gravity() {
        let mut s = avatar(Vehicle::Cube);
        apply_force(&mut s, &PRESS);
        assert!((s.vel.y - GRAVITY).abs() < 1e-6);
    }

    #[test]
    fn test_ship_thrust_and_clamp() {
        let mut s = avatar(Vehicle::Ship);
        for _ in 0..100 {
            apply_force(&mut s, &HOLD);
        }
        assert_eq!(s.vel.y, -SHIP_MAX_SPEED);
        for _ in 0..100 {
            apply_force(&mut s, &IDLE);
        }
        assert_eq!(s.vel.y, SHIP_MAX_SPEED);
    }

    #[test]
    fn test_ball_flips_once_until_grounded() {
        let mut s = avatar(Vehicle::Ball);
        s.on_ground = true;
        apply_force(&mut s, &PRESS);
        assert_eq!(s.gravity, GravityDir::Flipped);
        assert!(s.ball_flip_lock);

        // Still locked even if a contact reports ground mid-frame
        s.on_ground = true;
        apply_force(&mut s, &PRESS);
        assert_eq!(s.gravity, GravityDir::Flipped);
    }

    #[test]
    fn test_ufo_taps_in_air() {
        let mut s = avatar(Vehicle::Ufo);
        s.on_ground = false;
        s.vel.y = 5.0;
        apply_force(&mut s, &PRESS);
        assert!((s.vel.y - JUMP_VELOCITY * 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_wave_velocity_is_diagonal() {
        let mut s = avatar(Vehicle::Wave);
        s.speed_factor = 1.3;
        apply_force(&mut s, &HOLD);
        assert!((s.vel.y + 9.0 * 1.3).abs() < 1e-5);
        s.gravity = GravityDir::Flipped;
        apply_force(&mut s, &HOLD);
        assert!((s.vel.y - 9.0 * 1.3).abs() < 1e-5);
        apply_force(&mut s, &IDLE);
        assert!((s.vel.y + 9.0 * 1.3).abs() < 1e-5);
    }

    #[test]
    fn test_robot_jump_window() {
        let mut s = avatar(Vehicle::Robot);
        s.on_ground = true;
        let mut boosted = 0;
        for _ in 0..30 {
            apply_force(&mut s, &HOLD);
            if s.robot_jump_frames > 0 {
                boosted += 1;
            }
        }
        assert_eq!(boosted as u32, ROBOT_JUMP_WINDOW);
        assert_eq!(s.robot_jump_frames, 0);
    }

    #[test]
    fn test_swing_flips_every_press() {
        let mut s = avatar(Vehicle::Swing);
        apply_force(&mut s, &PRESS);
        assert_eq!(s.gravity, GravityDir::Flipped);
        apply_force(&mut s, &PRESS);
        assert_eq!(s.gravity, GravityDir::Normal);
        apply_force(&mut s, &HOLD);
        assert_eq!(s.gravity, GravityDir::Normal);
    }

    #[test]
    fn test_cube_rotation_snaps_on_ground() {
        let mut s = avatar(Vehicle::Cube);
        s.rotation = 80.0;
        s.on_ground = true;
        for _ in 0..40 {
            update_rotation(&mut s, &IDLE);
        }
        assert!((s.rotation - 90.0).abs() < 0.01);

        s.on_ground = false;
        update_rotation(&mut s, &IDLE);
        assert!(s.rotation > 98.0);
    }

    #[test]
    fn test_wave_rotation_follows_input() {
        let mut s = avatar(Vehicle::Wave);
        update_rotation(&mut s, &HOLD);
        assert_eq!(s.rotation, -45.0);
        s.gravity = GravityDir::Flipped;
        update_rotation(&mut s, &HOLD);
        assert_eq!(s.rotation, 45.0);
    }

    #[test]
    fn test_ship_rotation_eases() {
        let mut s = avatar(Vehicle::Ship);
        s.vel.y = -10.0;
        update_rotation(&mut s, &IDLE);
        assert!((s.rotation + 6.0).abs() < 1e-5);
    }
}
