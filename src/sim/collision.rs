//! Collision detection and response for circles against planar colliders
//!
//! Particles are circles. Each check returns the surface normal pointing
//! toward the particle center and the penetration depth so the caller can
//! push the particle out and bounce its velocity.

use glam::Vec2;

use super::shape::{Aabb, Shape};

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at collision (pointing toward particle center)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a circle against any collider shape
pub fn circle_shape_collision(pos: Vec2, radius: f32, shape: &Shape) -> CollisionResult {
    match shape {
        Shape::Rect(b) => circle_aabb_collision(pos, radius, b),
        Shape::Circle {
            center,
            radius: other,
        } => circle_circle_collision(pos, radius, *center, *other),
    }
}

/// Check a circle against another circle
pub fn circle_circle_collision(pos: Vec2, radius: f32, center: Vec2, other: f32) -> CollisionResult {
    let delta = pos - center;
    let dist = delta.length();
    let reach = radius + other;
    if dist >= reach {
        return CollisionResult::miss();
    }

    // Concentric circles have no preferred normal; push straight up.
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::Y };
    CollisionResult {
        hit: true,
        normal,
        penetration: reach - dist,
    }
}

/// Check a circle against an axis-aligned box
pub fn circle_aabb_collision(pos: Vec2, radius: f32, b: &Aabb) -> CollisionResult {
    let closest = b.closest_point(pos);
    let delta = pos - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > 1e-12 {
        if dist_sq >= radius * radius {
            return CollisionResult::miss();
        }
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            normal: delta / dist,
            penetration: radius - dist,
        };
    }

    // Center is inside the box (tunnelling case) - exit through the nearest face
    let local = pos - b.center;
    let gap = b.half - local.abs();
    let (normal, depth) = if gap.x < gap.y {
        (Vec2::new(local.x.signum(), 0.0), gap.x)
    } else {
        (Vec2::new(0.0, local.y.signum()), gap.y)
    };
    CollisionResult {
        hit: true,
        normal,
        penetration: depth + radius,
    }
}

/// Bounce with restitution: only the approaching normal component is
/// reversed and scaled; separating particles are left alone
pub fn bounce_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let vn = velocity.dot(normal);
    if vn >= 0.0 {
        return velocity;
    }
    velocity - (1.0 + restitution.clamp(0.0, 1.0)) * vn * normal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_aabb_collision_outside_face() {
        let wall = Aabb::new(Vec2::new(0.0, -6.0), Vec2::new(8.0, 1.0));

        // Particle resting just above the top face at y = -5
        let result = circle_aabb_collision(Vec2::new(0.0, -4.8), 0.3, &wall);
        assert!(result.hit);
        assert!((result.normal - Vec2::Y).length() < 1e-5);
        assert!((result.penetration - 0.1).abs() < 1e-5);

        let result = circle_aabb_collision(Vec2::new(0.0, -4.0), 0.3, &wall);
        assert!(!result.hit);
    }

    #[test]
    fn test_circle_aabb_collision_center_inside() {
        let plug = Aabb::new(Vec2::ZERO, Vec2::new(1.2, 1.6));

        // Slightly right of center: nearest exit is the right face
        let result = circle_aabb_collision(Vec2::new(0.9, 0.0), 0.15, &plug);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::X);
        assert!((result.penetration - (0.3 + 0.15)).abs() < 1e-5);
    }

    #[test]
    fn test_circle_circle_collision() {
        let result = circle_circle_collision(Vec2::new(1.4, 0.0), 0.3, Vec2::ZERO, 1.2);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::X);
        assert!((result.penetration - 0.1).abs() < 1e-5);

        let result = circle_circle_collision(Vec2::new(2.0, 0.0), 0.3, Vec2::ZERO, 1.2);
        assert!(!result.hit);
    }

    #[test]
    fn test_elastic_bounce_mirrors_velocity() {
        // Moving right, hits vertical wall (normal pointing left)
        let bounced = bounce_velocity(Vec2::new(10.0, 2.0), Vec2::NEG_X, 1.0);
        assert!((bounced.x + 10.0).abs() < 1e-5);
        assert!((bounced.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_bounce_velocity_restitution() {
        let v = bounce_velocity(Vec2::new(1.0, -4.0), Vec2::Y, 0.5);
        assert!((v.y - 2.0).abs() < 1e-5);
        assert!((v.x - 1.0).abs() < 1e-5);

        // Already separating - unchanged
        let v = bounce_velocity(Vec2::new(0.0, 3.0), Vec2::Y, 0.5);
        assert_eq!(v, Vec2::new(0.0, 3.0));
    }
}
