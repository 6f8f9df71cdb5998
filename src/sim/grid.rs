//! Grid cells to simulation space
//!
//! Grid `y` grows upward from the ground row; simulation space is y-down
//! pixels with the playfield spanning `0..PLAYFIELD_HEIGHT`. Row 0 is the
//! floor lane and row 11 the ceiling lane; the avatar is clamped between
//! `CEILING_Y` and `FLOOR_Y`, so objects on those rows can only be touched
//! from the playfield side.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Top edge of the floor lane
pub const FLOOR_Y: f32 = PLAYFIELD_HEIGHT - CELL;
/// Bottom edge of the ceiling lane
pub const CEILING_Y: f32 = CELL;
/// Highest valid grid row
pub const MAX_ROW: i32 = ROWS - 1;

/// Axis-aligned rectangle in simulation space (y-down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Square box with its top-left corner at `pos`
    pub fn square(pos: Vec2, size: f32) -> Self {
        Self::new(pos.x, pos.y, pos.x + size, pos.y + size)
    }

    /// Inclusive overlap test: touching edges count as overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.right >= other.left
            && self.left <= other.right
            && self.bottom >= other.top
            && self.top <= other.bottom
    }

    /// Shrink by `margin` on every side
    pub fn inset(&self, margin: f32) -> Self {
        Self::new(
            self.left + margin,
            self.top + margin,
            self.right - margin,
            self.bottom - margin,
        )
    }

    /// Grow by `margin` on every side
    pub fn outset(&self, margin: f32) -> Self {
        self.inset(-margin)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }
}

/// Simulation-space rectangle of grid cell `(x, y)`
pub fn cell_rect(x: i32, y: i32) -> Rect {
    let left = x as f32 * CELL;
    let top = PLAYFIELD_HEIGHT - (y as f32 + 1.0) * CELL;
    Rect::new(left, top, left + CELL, top + CELL)
}

/// Grid cell containing a simulation-space point
pub fn cell_at(point: Vec2) -> (i32, i32) {
    let x = (point.x / CELL).floor() as i32;
    let y = MAX_ROW - (point.y / CELL).floor() as i32;
    (x, y)
}

/// Whether a cell lies inside the placeable area
pub fn in_bounds(x: i32, y: i32) -> bool {
    x >= 0 && (0..=MAX_ROW).contains(&y)
}

/// Level end in simulation space, derived from the right-most placed cell
pub fn level_end(max_x: Option<i32>) -> f32 {
    match max_x {
        Some(x) => x.saturating_add(LEVEL_END_MARGIN) as f32 * CELL,
        None => EMPTY_LEVEL_END,
    }
}

/// Editor sync cursor position for a music playback time
pub fn playhead_x(seconds: f32) -> f32 {
    seconds * BASE_SPEED * SIM_FPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_row_is_floor_lane() {
        let r = cell_rect(0, 0);
        assert_eq!(r.top, FLOOR_Y);
        assert_eq!(r.bottom, PLAYFIELD_HEIGHT);

        let top_row = cell_rect(3, MAX_ROW);
        assert_eq!(top_row.top, 0.0);
        assert_eq!(top_row.left, 120.0);
    }

    #[test]
    fn test_cell_at_inverts_cell_rect() {
        for (x, y) in [(0, 0), (5, 3), (17, 11), (2, 7)] {
            let center = cell_rect(x, y).center();
            assert_eq!(cell_at(center), (x, y));
        }
    }

    #[test]
    fn test_inclusive_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 10.0, 20.0, 20.0);
        let apart = Rect::new(10.5, 0.0, 20.0, 10.0);
        assert!(a.overlaps(&touching));
        assert!(!a.overlaps(&apart));
    }

    #[test]
    fn test_inset_and_outset() {
        let r = cell_rect(0, 0).inset(12.0);
        assert_eq!(r.width(), CELL - 24.0);
        let o = cell_rect(0, 0).outset(10.0);
        assert_eq!(o.height(), CELL + 20.0);
    }

    #[test]
    fn test_level_end() {
        assert_eq!(level_end(None), EMPTY_LEVEL_END);
        assert_eq!(level_end(Some(10)), 25.0 * CELL);
    }

    #[test]
    fn test_far_cells_do_not_overflow() {
        assert_eq!(level_end(Some(i32::MAX)), i32::MAX as f32 * CELL);
        let r = cell_rect(0, i32::MAX);
        assert!(r.top.is_finite() && r.top < 0.0);
    }

    #[test]
    fn test_bounds_and_playhead() {
        assert!(in_bounds(0, 0));
        assert!(in_bounds(400, 11));
        assert!(!in_bounds(-1, 0));
        assert!(!in_bounds(0, 12));
        assert_eq!(playhead_x(1.0), 540.0);
    }
}
