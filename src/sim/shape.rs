//! Planar collider geometry
//!
//! Colliders are either axis-aligned boxes (walls, channel blocks, sensor
//! volumes) or circles (enzymes, rotor hubs). Both are described by a center
//! so kinematic actors can move them by rewriting one field.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box given by center and half extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self {
            center,
            half: half.abs(),
        }
    }

    /// Box spanning `[min, max]`
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::new((min + max) * 0.5, (max - min) * 0.5)
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    /// Closest point on or inside the box
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }
}

/// Collider shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect(Aabb),
    Circle { center: Vec2, radius: f32 },
}

impl Shape {
    pub fn rect(center: Vec2, half: Vec2) -> Self {
        Shape::Rect(Aabb::new(center, half))
    }

    pub fn circle(center: Vec2, radius: f32) -> Self {
        Shape::Circle {
            center,
            radius: radius.abs(),
        }
    }

    pub fn center(&self) -> Vec2 {
        match self {
            Shape::Rect(b) => b.center,
            Shape::Circle { center, .. } => *center,
        }
    }

    /// Same shape moved to a new center
    pub fn with_center(&self, center: Vec2) -> Self {
        match *self {
            Shape::Rect(b) => Shape::Rect(Aabb { center, ..b }),
            Shape::Circle { radius, .. } => Shape::Circle { center, radius },
        }
    }
}
