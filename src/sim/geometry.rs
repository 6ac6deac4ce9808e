//! Axis-aligned sprite boxes
//!
//! Screen space: origin top-left, y grows downward. A sprite's position is
//! its top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle as (left, top, right, bottom)
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

    /// Box covering a sprite at `pos` with extent `size`
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, pos.x + size.x, pos.y + size.y)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// True when the box has no area
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Pull the right and bottom edges in by `margin` (left/top stay put)
    pub fn shrink_far_edges(&self, margin: f32) -> Self {
        Self::new(
            self.left,
            self.top,
            self.right - margin,
            self.bottom - margin,
        )
    }

    /// Strict overlap test; touching edges do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

/// Playing field dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Largest top-left position that keeps a sprite of `size` on screen
    ///
    /// Components collapse to 0 when the sprite is larger than the arena.
    pub fn max_pos(&self, size: Vec2) -> Vec2 {
        Vec2::new(
            (self.width - size.x).max(0.0),
            (self.height - size.y).max(0.0),
        )
    }

    /// Top-left position that centres a sprite of `size`
    pub fn centered(&self, size: Vec2) -> Vec2 {
        self.max_pos(size) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_boxes_intersect() {
        let player = Rect::new(10.0, 10.0, 40.0, 40.0);
        let coral = Rect::new(20.0, 20.0, 60.0, 60.0);
        assert!(player.intersects(&coral));
        assert!(coral.intersects(&player));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_shrink_only_moves_far_edges() {
        let r = Rect::new(5.0, 5.0, 50.0, 40.0).shrink_far_edges(10.0);
        assert_eq!(r, Rect::new(5.0, 5.0, 40.0, 30.0));
    }

    #[test]
    fn test_collapsed_box_never_hits() {
        let tiny = Rect::new(0.0, 0.0, 15.0, 15.0).shrink_far_edges(20.0);
        assert!(tiny.is_empty());
        assert!(!tiny.intersects(&Rect::new(-100.0, -100.0, 100.0, 100.0)));
    }

    #[test]
    fn test_arena_max_pos_degenerate() {
        let arena = Arena::new(0.0, 0.0);
        assert_eq!(arena.max_pos(Vec2::new(30.0, 30.0)), Vec2::ZERO);
        let arena = Arena::new(100.0, 200.0);
        assert_eq!(arena.centered(Vec2::new(20.0, 40.0)), Vec2::new(40.0, 80.0));
    }
}
