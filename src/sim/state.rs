//! Avatar state and core simulation types
//!
//! One [`AvatarState`] exists per attempt. It is replaced wholesale on reset,
//! never patched back to its starting values.

use std::collections::HashSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catalog::ObjectKind;
use super::grid::Rect;
use crate::consts::*;

/// A placed level object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelObject {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    /// Grid column (0 = level origin, grows forward)
    pub x: i32,
    /// Grid row (0 = ground, 11 = ceiling)
    pub y: i32,
    /// Presentation rotation in degrees (0, 90, 180 or 270)
    #[serde(default)]
    pub rotation: u16,
    /// Optional editor tint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl LevelObject {
    pub fn new(id: impl Into<String>, kind: ObjectKind, x: i32, y: i32) -> Self {
        Self {
            id: id.into(),
            kind,
            x,
            y,
            rotation: 0,
            color: None,
        }
    }

    /// Rotate clockwise by a quarter turn
    pub fn rotate_quarter(&mut self) {
        self.rotation = (self.rotation % 360 + 90) % 360;
    }
}

/// Avatar control/physics mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Vehicle {
    #[default]
    Cube,
    Ship,
    Ball,
    Ufo,
    Wave,
    Robot,
    Spider,
    Swing,
}

impl Vehicle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vehicle::Cube => "Cube",
            Vehicle::Ship => "Ship",
            Vehicle::Ball => "Ball",
            Vehicle::Ufo => "UFO",
            Vehicle::Wave => "Wave",
            Vehicle::Robot => "Robot",
            Vehicle::Spider => "Spider",
            Vehicle::Swing => "Swing",
        }
    }
}

/// Which lane is "down"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GravityDir {
    /// Pulls toward the floor lane
    #[default]
    Normal,
    /// Pulls toward the ceiling lane
    Flipped,
}

impl GravityDir {
    /// +1 for normal gravity, -1 when flipped
    #[inline]
    pub fn sign(&self) -> f32 {
        match self {
            GravityDir::Normal => 1.0,
            GravityDir::Flipped => -1.0,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            GravityDir::Normal => GravityDir::Flipped,
            GravityDir::Flipped => GravityDir::Normal,
        }
    }

    pub fn flip(&mut self) {
        *self = self.flipped();
    }
}

/// A death-burst particle (not gameplay-affecting)
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1 at spawn, removed at 0
    pub life: f32,
    pub size: f32,
    /// Alternates the two burst colours
    pub accent: bool,
}

/// Expanding ring spawned on death
#[derive(Debug, Clone, PartialEq)]
pub struct Shockwave {
    pub center: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub opacity: f32,
}

/// Particles per death burst at the default quality
pub const DEATH_PARTICLES: usize = 40;

/// Which death visuals to spawn (from settings)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectsConfig {
    pub particles: usize,
    pub shockwave: bool,
    pub flash: bool,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            particles: DEATH_PARTICLES,
            shockwave: true,
            flash: true,
        }
    }
}

/// Cosmetic state that keeps animating while the avatar is frozen
#[derive(Debug, Clone, Default)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub shockwave: Option<Shockwave>,
    /// Full-screen white flash opacity
    pub flash: f32,
}

impl Effects {
    /// Advance one frame of decay
    pub fn decay(&mut self) {
        for p in self.particles.iter_mut() {
            p.pos += p.vel;
            p.life -= 0.02;
            p.vel.y += 0.35;
        }
        self.particles.retain(|p| p.life > 0.0);

        if let Some(wave) = &mut self.shockwave {
            wave.radius += 10.0;
            wave.opacity -= 0.04;
            if wave.opacity <= 0.0 {
                self.shockwave = None;
            }
        }

        if self.flash > 0.0 {
            self.flash = (self.flash - 0.05).max(0.0);
        }
    }

    /// Spawn the death burst centred on `center`
    pub fn burst(&mut self, center: Vec2, seed: u64, config: EffectsConfig) {
        if config.flash {
            self.flash = 0.8;
        }
        if config.shockwave {
            self.shockwave = Some(Shockwave {
                center,
                radius: 5.0,
                max_radius: 180.0,
                opacity: 1.0,
            });
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        self.particles = (0..config.particles)
            .map(|i| Particle {
                pos: center,
                vel: Vec2::new(
                    (rng.random::<f32>() - 0.5) * 35.0,
                    (rng.random::<f32>() - 0.5) * 35.0,
                ),
                life: 1.0,
                size: rng.random::<f32>() * 8.0 + 3.0,
                accent: i % 2 == 0,
            })
            .collect();
    }

    pub fn is_idle(&self) -> bool {
        self.particles.is_empty() && self.shockwave.is_none() && self.flash <= 0.0
    }
}

/// The single mutable simulation entity of an attempt
#[derive(Debug, Clone)]
pub struct AvatarState {
    /// Top-left corner of the avatar box
    pub pos: Vec2,
    /// `vel.x` is the base scroll speed; speed zones scale it through `speed_factor`
    pub vel: Vec2,
    /// Presentation rotation in degrees
    pub rotation: f32,
    pub vehicle: Vehicle,
    pub gravity: GravityDir,
    pub speed_factor: f32,
    /// False while a death or win freezes the simulation
    pub active: bool,
    /// Recomputed every frame from that frame's contacts
    pub on_ground: bool,
    /// One-shot objects consumed since the last grounded frame
    pub used_triggers: HashSet<String>,
    /// Ball may not flip again until grounded
    pub ball_flip_lock: bool,
    /// Frames the current robot jump has been extended
    pub robot_jump_frames: u32,
    /// Frames simulated this attempt
    pub frame: u64,
    /// Horizontal view anchor (cosmetic)
    pub camera_x: f32,
    /// Progress toward the level end, 0..=100
    pub progress: f32,
    pub effects: Effects,
}

impl Default for AvatarState {
    fn default() -> Self {
        Self::new()
    }
}

impl AvatarState {
    /// Fresh attempt pose
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(START_X, START_Y),
            vel: Vec2::new(BASE_SPEED, 0.0),
            rotation: 0.0,
            vehicle: Vehicle::Cube,
            gravity: GravityDir::Normal,
            speed_factor: 1.0,
            active: true,
            on_ground: false,
            used_triggers: HashSet::new(),
            ball_flip_lock: false,
            robot_jump_frames: 0,
            frame: 0,
            camera_x: START_X,
            progress: 0.0,
            effects: Effects::default(),
        }
    }

    /// Axis-aligned bounding box
    pub fn bounds(&self) -> Rect {
        Rect::square(self.pos, AVATAR_SIZE)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(AVATAR_SIZE / 2.0)
    }

    /// Switch vehicle (portal contact). Wave starts level.
    pub fn switch_vehicle(&mut self, vehicle: Vehicle) {
        if self.vehicle != vehicle {
            log::debug!("vehicle {} -> {}", self.vehicle.as_str(), vehicle.as_str());
        }
        self.vehicle = vehicle;
        if vehicle == Vehicle::Wave {
            self.rotation = 0.0;
        }
    }

    /// Progress as the whole percentage shown in the HUD
    pub fn progress_percent(&self) -> u8 {
        self.progress.floor().clamp(0.0, 100.0) as u8
    }

    /// Freeze the avatar and spawn the death visuals. No-op when already frozen.
    ///
    /// Returns whether this call performed the transition.
    pub fn die(&mut self, seed: u64, config: EffectsConfig) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        let center = self.center();
        self.effects.burst(center, seed, config);
        true
    }

    /// Freeze the avatar in the win tableau. No-op when already frozen.
    pub fn finish(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        true
    }
}
