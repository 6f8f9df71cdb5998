//! Platform-independent draw list
//!
//! Everything is in view space: simulation space shifted left by the camera,
//! `VIEW_WIDTH` x `PLAYFIELD_HEIGHT`, y down. A backend only has to paint the
//! commands in order.

use std::f32::consts::TAU;

use glam::{Affine2, Vec2};

use crate::consts::*;
use crate::sim::grid::{CEILING_Y, FLOOR_Y, Rect, cell_rect};
use crate::sim::{AvatarState, Course, GravityDir, LevelObject, ObjectKind, Vehicle};

/// RGBA, 0..1
pub type Color = [f32; 4];

const fn hex(rgb: u32) -> Color {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        1.0,
    ]
}

fn with_alpha(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], alpha.clamp(0.0, 1.0)]
}

const BACKGROUND: Color = hex(0x0f172a);
const LANE: Color = hex(0x1e293b);
const ACCENT: Color = hex(0x22d3ee);
const WHITE: Color = hex(0xffffff);
const GRID_ALPHA: f32 = 0.08;

/// Objects this far outside the view are culled
const CULL_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Axis-aligned filled rectangle
    Rect { rect: Rect, color: Color },
    Polygon {
        points: Vec<Vec2>,
        fill: Option<Color>,
        outline: Option<Stroke>,
    },
    Circle {
        center: Vec2,
        radius: f32,
        fill: Option<Color>,
        outline: Option<Stroke>,
    },
    Line { from: Vec2, to: Vec2, stroke: Stroke },
    /// Centred label
    Text {
        pos: Vec2,
        text: &'static str,
        color: Color,
    },
}

/// Presentation switches (from settings)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneOptions {
    pub grid_lines: bool,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self { grid_lines: true }
    }
}

/// Build the frame's draw list
pub fn build_scene(avatar: &AvatarState, course: &Course, options: SceneOptions) -> Vec<DrawCmd> {
    let camera = avatar.camera_x;
    let mut cmds =
        Vec::with_capacity(course.objects().len() * 2 + avatar.effects.particles.len() + 16);

    cmds.push(DrawCmd::Rect {
        rect: view_rect(),
        color: BACKGROUND,
    });

    if options.grid_lines {
        push_grid(&mut cmds, camera);
    }

    for obj in course.objects() {
        let cell = cell_rect(obj.x, obj.y);
        let left = cell.left - camera;
        if left + CELL < -CULL_MARGIN || left > VIEW_WIDTH + CULL_MARGIN {
            continue;
        }
        push_object(&mut cmds, obj, Vec2::new(left, cell.top));
    }

    push_lanes(&mut cmds);
    push_effects(&mut cmds, avatar, camera);

    if avatar.active {
        push_avatar(&mut cmds, avatar, camera);
    }

    cmds
}

fn view_rect() -> Rect {
    Rect::new(0.0, 0.0, VIEW_WIDTH, PLAYFIELD_HEIGHT)
}

fn push_grid(cmds: &mut Vec<DrawCmd>, camera: f32) {
    let stroke = Stroke::new(with_alpha(ACCENT, GRID_ALPHA), 1.0);
    let mut x = (camera / CELL).floor() * CELL;
    while x < camera + VIEW_WIDTH + CELL {
        cmds.push(DrawCmd::Line {
            from: Vec2::new(x - camera, 0.0),
            to: Vec2::new(x - camera, PLAYFIELD_HEIGHT),
            stroke,
        });
        x += CELL;
    }
    for row in 0..ROWS {
        let y = row as f32 * CELL;
        cmds.push(DrawCmd::Line {
            from: Vec2::new(0.0, y),
            to: Vec2::new(VIEW_WIDTH, y),
            stroke,
        });
    }
}

fn push_lanes(cmds: &mut Vec<DrawCmd>) {
    cmds.push(DrawCmd::Rect {
        rect: Rect::new(0.0, FLOOR_Y, VIEW_WIDTH, PLAYFIELD_HEIGHT),
        color: LANE,
    });
    cmds.push(DrawCmd::Rect {
        rect: Rect::new(0.0, 0.0, VIEW_WIDTH, CEILING_Y),
        color: LANE,
    });
    let stroke = Stroke::new(ACCENT, 4.0);
    for y in [FLOOR_Y, CEILING_Y] {
        cmds.push(DrawCmd::Line {
            from: Vec2::new(0.0, y),
            to: Vec2::new(VIEW_WIDTH, y),
            stroke,
        });
    }
}

/// Local-to-view transform for an object: rotates about the cell centre
fn object_transform(top_left: Vec2, rotation: u16) -> Affine2 {
    let half = Vec2::splat(CELL / 2.0);
    Affine2::from_translation(top_left + half)
        * Affine2::from_angle((rotation as f32).to_radians())
        * Affine2::from_translation(-half)
}

/// Quad in local coordinates
fn quad(x: f32, y: f32, w: f32, h: f32) -> [Vec2; 4] {
    [
        Vec2::new(x, y),
        Vec2::new(x + w, y),
        Vec2::new(x + w, y + h),
        Vec2::new(x, y + h),
    ]
}

fn polygon(t: &Affine2, local: &[Vec2], fill: Option<Color>, outline: Option<Stroke>) -> DrawCmd {
    DrawCmd::Polygon {
        points: local.iter().map(|&p| t.transform_point2(p)).collect(),
        fill,
        outline,
    }
}

fn orb_color(kind: ObjectKind) -> Color {
    match kind {
        ObjectKind::PinkOrb => hex(0xf472b6),
        ObjectKind::RedOrb => hex(0xef4444),
        ObjectKind::BlueOrb => hex(0x3b82f6),
        ObjectKind::GreenOrb => hex(0x22c55e),
        _ => hex(0xfbbf24),
    }
}

fn pad_color(kind: ObjectKind) -> Color {
    match kind {
        ObjectKind::PinkPad => hex(0xf472b6),
        ObjectKind::RedPad => hex(0xef4444),
        ObjectKind::BluePad => hex(0x3b82f6),
        _ => hex(0xeab308),
    }
}

fn portal_color(kind: ObjectKind) -> Color {
    match kind {
        ObjectKind::ShipPortal => hex(0x22c55e),
        ObjectKind::CubePortal => hex(0xf97316),
        ObjectKind::BallPortal => hex(0xef4444),
        ObjectKind::UfoPortal => hex(0x38bdf8),
        ObjectKind::WavePortal => hex(0x22d3ee),
        ObjectKind::RobotPortal => hex(0xffffff),
        ObjectKind::SpiderPortal => hex(0xa855f7),
        ObjectKind::SwingPortal | ObjectKind::GravityUpPortal => hex(0xeab308),
        ObjectKind::GravityDownPortal => hex(0x3b82f6),
        _ => hex(0x7c3aed),
    }
}

fn speed_color(kind: ObjectKind) -> Color {
    match kind {
        ObjectKind::SpeedX05 => hex(0x475569),
        ObjectKind::SpeedX1 => hex(0x0891b2),
        ObjectKind::SpeedX2 => hex(0x16a34a),
        _ => hex(0xdb2777),
    }
}

fn push_object(cmds: &mut Vec<DrawCmd>, obj: &LevelObject, top_left: Vec2) {
    use ObjectKind::*;

    let t = object_transform(top_left, obj.rotation);
    let white = Some(Stroke::new(WHITE, 1.0));
    match obj.kind {
        Block => {
            cmds.push(polygon(&t, &quad(0.0, 0.0, CELL, CELL), Some(hex(0x1e40af)), None));
            cmds.push(polygon(
                &t,
                &quad(4.0, 4.0, CELL - 8.0, CELL - 8.0),
                None,
                Some(Stroke::new(hex(0x60a5fa), 1.0)),
            ));
        }
        Spike => {
            let tri = [
                Vec2::new(5.0, CELL),
                Vec2::new(CELL / 2.0, 5.0),
                Vec2::new(CELL - 5.0, CELL),
            ];
            cmds.push(polygon(&t, &tri, Some(hex(0xef4444)), white));
        }
        Orb | YellowOrb | PinkOrb | RedOrb | BlueOrb | GreenOrb => {
            cmds.push(DrawCmd::Circle {
                center: t.transform_point2(Vec2::splat(CELL / 2.0)),
                radius: CELL / 3.0,
                fill: Some(orb_color(obj.kind)),
                outline: white,
            });
        }
        Slab => {
            cmds.push(polygon(
                &t,
                &quad(0.0, CELL / 2.0, CELL, CELL / 2.0),
                Some(hex(0x065f46)),
                None,
            ));
        }
        YellowPad | PinkPad | RedPad | BluePad => {
            cmds.push(polygon(
                &t,
                &quad(4.0, CELL - 8.0, CELL - 8.0, 8.0),
                Some(pad_color(obj.kind)),
                white,
            ));
        }
        SpeedX05 | SpeedX1 | SpeedX2 | SpeedX3 => {
            cmds.push(polygon(&t, &quad(0.0, 0.0, CELL, CELL), Some(speed_color(obj.kind)), None));
            cmds.push(DrawCmd::Text {
                pos: t.transform_point2(Vec2::splat(CELL / 2.0)),
                text: ">>",
                color: WHITE,
            });
        }
        Portal | ShipPortal | CubePortal | BallPortal | UfoPortal | WavePortal | RobotPortal
        | SpiderPortal | SwingPortal | GravityDownPortal | GravityUpPortal => {
            // Tall gate overhanging the cell by half a cell each way
            cmds.push(polygon(
                &t,
                &quad(10.0, -20.0, CELL - 20.0, CELL + 40.0),
                Some(portal_color(obj.kind)),
                None,
            ));
        }
        Unknown => {}
    }
}

fn push_effects(cmds: &mut Vec<DrawCmd>, avatar: &AvatarState, camera: f32) {
    let offset = Vec2::new(camera, 0.0);
    let fx = &avatar.effects;

    if let Some(wave) = &fx.shockwave {
        let center = wave.center - offset;
        cmds.push(DrawCmd::Circle {
            center,
            radius: wave.radius,
            fill: None,
            outline: Some(Stroke::new(with_alpha(WHITE, wave.opacity), 5.0)),
        });
        cmds.push(DrawCmd::Circle {
            center,
            radius: wave.radius * 0.7,
            fill: None,
            outline: Some(Stroke::new(with_alpha(ACCENT, wave.opacity), 3.0)),
        });
    }

    for p in &fx.particles {
        let base = if p.accent { ACCENT } else { WHITE };
        cmds.push(DrawCmd::Circle {
            center: p.pos - offset,
            radius: p.size,
            fill: Some(with_alpha(base, p.life)),
            outline: None,
        });
    }

    if fx.flash > 0.0 {
        cmds.push(DrawCmd::Rect {
            rect: view_rect(),
            color: with_alpha(WHITE, fx.flash),
        });
    }
}

/// Points of an ellipse outline
fn ellipse(rx: f32, ry: f32, segments: u32) -> Vec<Vec2> {
    (0..segments)
        .map(|i| {
            let a = i as f32 / segments as f32 * TAU;
            Vec2::new(a.cos() * rx, a.sin() * ry)
        })
        .collect()
}

fn push_avatar(cmds: &mut Vec<DrawCmd>, avatar: &AvatarState, camera: f32) {
    let s = AVATAR_SIZE / 2.0;
    let center = avatar.center() - Vec2::new(camera, 0.0);
    let mirror = match avatar.gravity {
        GravityDir::Normal => 1.0,
        GravityDir::Flipped => -1.0,
    };
    let t = Affine2::from_translation(center)
        * Affine2::from_angle(avatar.rotation.to_radians())
        * Affine2::from_scale(Vec2::new(1.0, mirror));
    let white = Some(Stroke::new(WHITE, 4.0));

    match avatar.vehicle {
        Vehicle::Cube => {
            cmds.push(polygon(&t, &quad(-s, -s, AVATAR_SIZE, AVATAR_SIZE), Some(ACCENT), None));
            cmds.push(polygon(
                &t,
                &quad(-s + 6.0, -s + 6.0, AVATAR_SIZE - 12.0, AVATAR_SIZE - 12.0),
                None,
                white,
            ));
        }
        Vehicle::Ship => {
            let tri = [Vec2::new(-s, 0.0), Vec2::new(s, -s / 2.0), Vec2::new(s, s / 2.0)];
            cmds.push(polygon(&t, &tri, Some(ACCENT), None));
        }
        Vehicle::Ball => {
            cmds.push(DrawCmd::Circle {
                center,
                radius: s,
                fill: Some(ACCENT),
                outline: white,
            });
        }
        Vehicle::Ufo => {
            cmds.push(polygon(&t, &ellipse(s, s / 2.0, 24), Some(ACCENT), None));
            cmds.push(polygon(&t, &quad(-s / 2.0, -s, s, s / 2.0), Some(LANE), None));
        }
        Vehicle::Wave => {
            let tri = [Vec2::new(-s, -s / 2.0), Vec2::new(s, 0.0), Vec2::new(-s, s / 2.0)];
            cmds.push(polygon(&t, &tri, Some(ACCENT), None));
        }
        Vehicle::Robot => {
            cmds.push(polygon(
                &t,
                &quad(-s, -s, AVATAR_SIZE, AVATAR_SIZE * 0.7),
                Some(ACCENT),
                None,
            ));
            cmds.push(polygon(
                &t,
                &quad(-s / 2.0, AVATAR_SIZE * 0.2, s, AVATAR_SIZE * 0.3),
                Some(LANE),
                None,
            ));
        }
        Vehicle::Spider => {
            let diamond = [
                Vec2::new(-s, 0.0),
                Vec2::new(0.0, -s),
                Vec2::new(s, 0.0),
                Vec2::new(0.0, s),
            ];
            cmds.push(polygon(&t, &diamond, Some(ACCENT), Some(Stroke::new(WHITE, 1.0))));
        }
        Vehicle::Swing => {
            cmds.push(DrawCmd::Circle {
                center,
                radius: s,
                fill: Some(ACCENT),
                outline: None,
            });
            cmds.push(DrawCmd::Line {
                from: t.transform_point2(Vec2::new(-s, 0.0)),
                to: t.transform_point2(Vec2::new(s, 0.0)),
                stroke: Stroke::new(LANE, 1.0),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygons(cmds: &[DrawCmd]) -> Vec<&Vec<Vec2>> {
        cmds.iter()
            .filter_map(|c| match c {
                DrawCmd::Polygon { points, .. } => Some(points),
                _ => None,
            })
            .collect()
    }

    fn avatar_at_origin() -> AvatarState {
        let mut a = AvatarState::new();
        a.camera_x = 0.0;
        a
    }

    fn min_x(points: &[Vec2]) -> f32 {
        points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min)
    }

    #[test]
    fn test_objects_are_camera_relative() {
        let course = Course::new(vec![LevelObject::new("b", ObjectKind::Block, 10, 0)]);
        let mut avatar = avatar_at_origin();
        avatar.active = false;
        avatar.camera_x = 100.0;
        let cmds = build_scene(&avatar, &course, SceneOptions { grid_lines: false });
        let polys = polygons(&cmds);
        assert_eq!(polys.len(), 2);
        assert!((min_x(polys[0]) - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_offscreen_objects_culled() {
        let course = Course::new(vec![
            LevelObject::new("near", ObjectKind::Spike, 5, 0),
            LevelObject::new("far", ObjectKind::Spike, 200, 0),
        ]);
        let mut avatar = avatar_at_origin();
        avatar.active = false;
        let cmds = build_scene(&avatar, &course, SceneOptions { grid_lines: false });
        assert_eq!(polygons(&cmds).len(), 1);
    }

    #[test]
    fn test_rotation_turns_object_about_center() {
        let mut spike = LevelObject::new("s", ObjectKind::Spike, 0, 0);
        spike.rotation = 180;
        let course = Course::new(vec![spike]);
        let mut avatar = avatar_at_origin();
        avatar.active = false;
        let cmds = build_scene(&avatar, &course, SceneOptions { grid_lines: false });
        let tip = polygons(&cmds)[0][1];
        // Upright tip sits 5px below the cell top; flipped it sits 5px above the bottom
        assert!((tip.y - (PLAYFIELD_HEIGHT - 5.0)).abs() < 1e-3);
        assert!((tip.x - CELL / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_inactive_avatar_hidden() {
        let course = Course::new(Vec::new());
        let mut avatar = avatar_at_origin();
        let visible = build_scene(&avatar, &course, SceneOptions { grid_lines: false });
        avatar.active = false;
        let hidden = build_scene(&avatar, &course, SceneOptions { grid_lines: false });
        assert_eq!(polygons(&visible).len(), 2);
        assert!(polygons(&hidden).is_empty());
    }

    #[test]
    fn test_flipped_ship_is_mirrored() {
        let course = Course::new(Vec::new());
        let mut avatar = avatar_at_origin();
        avatar.vehicle = Vehicle::Ship;
        let upright = build_scene(&avatar, &course, SceneOptions { grid_lines: false });
        avatar.gravity = GravityDir::Flipped;
        let flipped = build_scene(&avatar, &course, SceneOptions { grid_lines: false });
        let c = avatar.center();
        let a = polygons(&upright)[0][1];
        let b = polygons(&flipped)[0][1];
        assert!((a.x - b.x).abs() < 1e-3);
        assert!(((a.y - c.y) + (b.y - c.y)).abs() < 1e-3);
    }

    #[test]
    fn test_death_effects_drawn() {
        let course = Course::new(Vec::new());
        let mut avatar = avatar_at_origin();
        avatar.die(9, Default::default());
        let cmds = build_scene(&avatar, &course, SceneOptions { grid_lines: false });
        let circles = cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::Circle { .. }))
            .count();
        assert_eq!(circles, 2 + avatar.effects.particles.len());
        match cmds.last() {
            Some(DrawCmd::Rect { color, .. }) => assert!((color[3] - 0.8).abs() < 1e-6),
            other => panic!("expected flash overlay last, got {other:?}"),
        }
    }

    #[test]
    fn test_grid_lines_toggle() {
        let course = Course::new(Vec::new());
        let avatar = avatar_at_origin();
        let lines = |opts| {
            build_scene(&avatar, &course, opts)
                .iter()
                .filter(|c| matches!(c, DrawCmd::Line { .. }))
                .count()
        };
        let without = lines(SceneOptions { grid_lines: false });
        let with = lines(SceneOptions::default());
        assert_eq!(without, 2);
        assert!(with > without + ROWS as usize);
    }

    #[test]
    fn test_unknown_objects_not_drawn() {
        let course = Course::new(vec![LevelObject::new("u", ObjectKind::Unknown, 1, 1)]);
        let mut avatar = avatar_at_origin();
        avatar.active = false;
        let cmds = build_scene(&avatar, &course, SceneOptions { grid_lines: false });
        assert!(polygons(&cmds).is_empty());
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(hex(0xffffff), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(hex(0xff0000)[1], 0.0);
    }
}
