//! Physics collaborator
//!
//! The coupling layer only needs four things from a physics engine: create
//! a collider, move/enable it, step the particles and report overlaps. That
//! surface is the [`PhysicsWorld`] trait. [`PlanarWorld`] is a small fixed-step
//! implementation good enough for teaching scenes and deterministic tests.

use glam::Vec2;

use super::collision::{bounce_velocity, circle_circle_collision, circle_shape_collision};
use super::field::{ParticleField, ParticleId, ParticleKind};
use super::shape::Shape;
use crate::consts::MAX_PARTICLE_SPEED;

/// Stable collider handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderId(pub u32);

/// How a collider interacts with particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    /// Pushes particles out and bounces them; optionally reports contacts
    Solid { restitution: f32, report: bool },
    /// Detects overlap only
    Sensor,
}

impl Response {
    /// Silent solid wall
    pub fn wall(restitution: f32) -> Self {
        Response::Solid {
            restitution,
            report: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Collider {
    pub id: ColliderId,
    pub shape: Shape,
    pub response: Response,
    pub enabled: bool,
}

/// One particle overlapping one reporting collider during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub collider: ColliderId,
    pub particle: ParticleId,
    pub kind: ParticleKind,
    /// Particle velocity at the moment of contact (before any bounce)
    pub velocity: Vec2,
    /// Particle position relative to the collider center
    pub offset: Vec2,
}

/// Engine surface consumed by the simulations
pub trait PhysicsWorld {
    fn add_collider(&mut self, shape: Shape, response: Response) -> ColliderId;

    /// Replace a collider's shape (moving kinematic actors). False if unknown.
    fn set_collider_shape(&mut self, id: ColliderId, shape: Shape) -> bool;

    /// Enable or disable a collider. False if unknown.
    fn set_enabled(&mut self, id: ColliderId, enabled: bool) -> bool;

    fn collider(&self, id: ColliderId) -> Option<&Collider>;

    /// Advance every particle by `dt` and return the contacts observed
    fn step(&mut self, field: &mut ParticleField, dt: f32) -> Vec<Contact>;
}

/// Minimal 2-D engine: gravity, damping, walls, sensors, particle bumps
#[derive(Debug, Clone)]
pub struct PlanarWorld {
    pub gravity: Vec2,
    /// Resolve particle-particle overlaps
    pub particle_collisions: bool,
    colliders: Vec<Collider>,
    next_id: u32,
}

impl PlanarWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            particle_collisions: true,
            colliders: Vec::new(),
            next_id: 1,
        }
    }

    /// Four solid walls whose inner faces bound `[min, max]`
    pub fn add_box(&mut self, min: Vec2, max: Vec2, restitution: f32) -> [ColliderId; 4] {
        let t = 1.0;
        let size = max - min;
        let mid = (min + max) * 0.5;
        let half_w = size.x * 0.5 + 2.0 * t;
        let half_h = size.y * 0.5 + 2.0 * t;
        let wall = Response::wall(restitution);
        [
            self.add_collider(Shape::rect(Vec2::new(mid.x, max.y + t), Vec2::new(half_w, t)), wall),
            self.add_collider(Shape::rect(Vec2::new(mid.x, min.y - t), Vec2::new(half_w, t)), wall),
            self.add_collider(Shape::rect(Vec2::new(min.x - t, mid.y), Vec2::new(t, half_h)), wall),
            self.add_collider(Shape::rect(Vec2::new(max.x + t, mid.y), Vec2::new(t, half_h)), wall),
        ]
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    fn integrate(&self, field: &mut ParticleField, dt: f32) {
        for p in field.iter_mut() {
            p.vel += self.gravity * p.gravity_scale * dt;
            p.vel /= 1.0 + p.damping * dt;
            p.vel = p.vel.clamp_length_max(MAX_PARTICLE_SPEED);
            p.pos += p.vel * dt;
        }
    }

    fn resolve_colliders(&self, field: &mut ParticleField, contacts: &mut Vec<Contact>) {
        for collider in self.colliders.iter().filter(|c| c.enabled) {
            for p in field.iter_mut() {
                let result = circle_shape_collision(p.pos, p.radius, &collider.shape);
                if !result.hit {
                    continue;
                }
                let report = match collider.response {
                    Response::Sensor => true,
                    Response::Solid { report, .. } => report,
                };
                if report {
                    contacts.push(Contact {
                        collider: collider.id,
                        particle: p.id,
                        kind: p.kind,
                        velocity: p.vel,
                        offset: p.pos - collider.shape.center(),
                    });
                }
                if let Response::Solid { restitution, .. } = collider.response {
                    p.pos += result.normal * result.penetration;
                    let e = (restitution + p.restitution) * 0.5;
                    p.vel = bounce_velocity(p.vel, result.normal, e);
                }
            }
        }
    }

    fn resolve_pairs(field: &mut ParticleField) {
        let particles = field.as_mut_slice();
        for i in 0..particles.len() {
            let (head, tail) = particles.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                let result = circle_circle_collision(a.pos, a.radius, b.pos, b.radius);
                if !result.hit {
                    continue;
                }
                let n = result.normal;
                a.pos += n * (result.penetration * 0.5);
                b.pos -= n * (result.penetration * 0.5);

                // Equal masses: exchange the approaching normal component
                let approach = (a.vel - b.vel).dot(n);
                if approach < 0.0 {
                    let e = (a.restitution + b.restitution) * 0.5;
                    let j = -(1.0 + e) * approach * 0.5;
                    a.vel += n * j;
                    b.vel -= n * j;
                }
            }
        }
    }
}

impl PhysicsWorld for PlanarWorld {
    fn add_collider(&mut self, shape: Shape, response: Response) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        self.colliders.push(Collider {
            id,
            shape,
            response,
            enabled: true,
        });
        id
    }

    fn set_collider_shape(&mut self, id: ColliderId, shape: Shape) -> bool {
        match self.colliders.iter_mut().find(|c| c.id == id) {
            Some(c) => {
                c.shape = shape;
                true
            }
            None => false,
        }
    }

    fn set_enabled(&mut self, id: ColliderId, enabled: bool) -> bool {
        match self.colliders.iter_mut().find(|c| c.id == id) {
            Some(c) => {
                c.enabled = enabled;
                true
            }
            None => false,
        }
    }

    fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.iter().find(|c| c.id == id)
    }

    fn step(&mut self, field: &mut ParticleField, dt: f32) -> Vec<Contact> {
        let mut contacts = Vec::new();
        self.integrate(field, dt);
        if self.particle_collisions {
            Self::resolve_pairs(field);
        }
        self.resolve_colliders(field, &mut contacts);
        for p in field.iter_mut() {
            p.vel = p.vel.clamp_length_max(MAX_PARTICLE_SPEED);
        }
        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_gravity_and_floor() {
        let mut world = PlanarWorld::new(Vec2::new(0.0, -6.0));
        world.add_box(Vec2::new(-8.0, -5.0), Vec2::new(8.0, 10.0), 0.0);
        let mut field = ParticleField::new(4);
        let id = field.spawn(ParticleKind::Protein, Vec2::new(0.0, 3.0)).unwrap();

        for _ in 0..600 {
            world.step(&mut field, SIM_DT);
        }
        let p = field.get(id).unwrap();
        // Settled on the floor, never through it
        assert!(p.pos.y >= -5.0 + p.radius - 0.05, "y = {}", p.pos.y);
        assert!(p.pos.y < -5.0 + p.radius + 0.1);
    }

    #[test]
    fn test_sensor_reports_every_tick_without_pushing() {
        let mut world = PlanarWorld::new(Vec2::ZERO);
        let sensor = world.add_collider(Shape::rect(Vec2::ZERO, Vec2::new(1.0, 1.0)), Response::Sensor);
        let mut field = ParticleField::new(4);
        field.spawn(ParticleKind::Ion, Vec2::ZERO).unwrap();

        for _ in 0..3 {
            let contacts = world.step(&mut field, SIM_DT);
            assert_eq!(contacts.len(), 1);
            assert_eq!(contacts[0].collider, sensor);
        }
        assert_eq!(field.iter().next().unwrap().pos, Vec2::ZERO);
    }

    #[test]
    fn test_disabled_collider_is_ignored() {
        let mut world = PlanarWorld::new(Vec2::ZERO);
        let plug = world.add_collider(
            Shape::rect(Vec2::ZERO, Vec2::new(1.0, 1.0)),
            Response::Solid {
                restitution: 1.0,
                report: true,
            },
        );
        let mut field = ParticleField::new(4);
        field.spawn(ParticleKind::Ion, Vec2::ZERO).unwrap();

        assert!(world.set_enabled(plug, false));
        assert!(world.step(&mut field, SIM_DT).is_empty());
        assert!(!world.set_enabled(ColliderId(99), true));
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut world = PlanarWorld::new(Vec2::ZERO);
        let mut field = ParticleField::new(1);
        let id = field
            .spawn_moving(ParticleKind::Ion, Vec2::ZERO, Vec2::new(1000.0, 0.0))
            .unwrap();
        world.step(&mut field, SIM_DT);
        assert!(field.get(id).unwrap().vel.length() <= MAX_PARTICLE_SPEED + 1e-3);
    }

    #[test]
    fn test_particles_bounce_apart() {
        let mut world = PlanarWorld::new(Vec2::ZERO);
        let mut field = ParticleField::new(2);
        let a = field
            .spawn_moving(ParticleKind::Substrate, Vec2::new(-0.29, 0.0), Vec2::new(1.0, 0.0))
            .unwrap();
        let b = field
            .spawn_moving(ParticleKind::Substrate, Vec2::new(0.29, 0.0), Vec2::new(-1.0, 0.0))
            .unwrap();
        world.step(&mut field, SIM_DT);
        assert!(field.get(a).unwrap().vel.x < 0.0);
        assert!(field.get(b).unwrap().vel.x > 0.0);
    }
}
