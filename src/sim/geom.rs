//! Axis-aligned box geometry for tiles and vehicle bodies
//!
//! World space is y-up: row 0 of the tile grid sits at y = 0 and rows grow
//! upward. A box is described by its min (bottom-left) and max (top-right)
//! corners.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Box2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Box2 {
    /// Zero-area result of a query that found nothing
    pub const EMPTY: Box2 = Box2 {
        min: Vec2::ZERO,
        max: Vec2::ZERO,
    };

    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box with its bottom-left corner at `pos`
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        (self.max.x - self.min.x).max(0.0)
    }

    #[inline]
    pub fn height(&self) -> f32 {
        (self.max.y - self.min.y).max(0.0)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// True when the box covers no area (degenerate or inverted)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    pub fn translate(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Geometric intersection; `Box2::EMPTY` when the boxes do not overlap
    pub fn intersection(&self, other: &Box2) -> Box2 {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if max.x <= min.x || max.y <= min.y {
            return Box2::EMPTY;
        }
        Box2 { min, max }
    }

    pub fn overlaps(&self, other: &Box2) -> bool {
        !self.intersection(other).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection_overlap() {
        let a = Box2::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Box2::new(Vec2::new(5.0, 8.0), Vec2::new(15.0, 20.0));
        let i = a.intersection(&b);
        assert_eq!(i.min, Vec2::new(5.0, 8.0));
        assert_eq!(i.max, Vec2::new(10.0, 10.0));
        assert!((i.height() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_touching_boxes_do_not_intersect() {
        let a = Box2::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Box2::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 10.0));
        assert!(a.intersection(&b).is_empty());
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_zero_area_query_never_hits() {
        let tile = Box2::new(Vec2::ZERO, Vec2::new(48.0, 48.0));
        let flat = Box2::new(Vec2::new(4.0, 10.0), Vec2::new(30.0, 10.0));
        assert!(flat.is_empty());
        assert!(flat.intersection(&tile).is_empty());
    }

    #[test]
    fn test_translate() {
        let a = Box2::from_pos_size(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0));
        let t = a.translate(Vec2::new(-1.0, 1.0));
        assert_eq!(t.min, Vec2::new(0.0, 3.0));
        assert_eq!(t.max, Vec2::new(3.0, 7.0));
    }
}
