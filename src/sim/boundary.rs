//! Recycling boundary
//!
//! One mechanism serves two jobs: steady flux (protons, radiation fall out of
//! the scene and re-enter at the top) and tunnelling correction (an ion that
//! slipped through a closed gate is put back where it belongs). Either way the
//! particle is teleported into a spawn region with reset kinematics.

use glam::Vec2;

use super::field::Particle;
use super::rng::SimRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    fn of(&self, v: Vec2) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }
}

/// A half-plane the particle must not enter: `axis < limit` or `axis > limit`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Face {
    Below { axis: Axis, limit: f32 },
    Above { axis: Axis, limit: f32 },
}

impl Face {
    pub fn crossed(&self, pos: Vec2) -> bool {
        match *self {
            Face::Below { axis, limit } => axis.of(pos) < limit,
            Face::Above { axis, limit } => axis.of(pos) > limit,
        }
    }

    /// How far past the face `pos` lies (0 when inside)
    pub fn overshoot(&self, pos: Vec2) -> f32 {
        match *self {
            Face::Below { axis, limit } => (limit - axis.of(pos)).max(0.0),
            Face::Above { axis, limit } => (axis.of(pos) - limit).max(0.0),
        }
    }
}

/// Where one coordinate lands after a teleport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisSpawn {
    /// Keep the particle's current coordinate
    Keep,
    Fixed(f32),
    Uniform(f32, f32),
}

impl AxisSpawn {
    fn sample(&self, current: f32, rng: &mut SimRng) -> f32 {
        match *self {
            AxisSpawn::Keep => current,
            AxisSpawn::Fixed(v) => v,
            AxisSpawn::Uniform(min, max) => rng.uniform(min, max),
        }
    }
}

/// Spawn position/velocity after a teleport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRule {
    pub x: AxisSpawn,
    pub y: AxisSpawn,
    pub vx: AxisSpawn,
    pub vy: AxisSpawn,
}

impl SpawnRule {
    pub fn apply(&self, p: &mut Particle, rng: &mut SimRng) {
        // Position first, then velocity, so the draw order is fixed.
        p.pos = Vec2::new(self.x.sample(p.pos.x, rng), self.y.sample(p.pos.y, rng));
        p.vel = Vec2::new(self.vx.sample(p.vel.x, rng), self.vy.sample(p.vel.y, rng));
    }
}

/// Exit and barrier faces plus the spawn rule that repairs violations
#[derive(Debug, Clone, PartialEq)]
pub struct RecycleBoundary {
    /// Faces that always recycle (steady flux)
    pub exits: Vec<Face>,
    /// Face that recycles only while the logical gate is closed
    pub barrier: Option<Face>,
    pub spawn: SpawnRule,
}

impl RecycleBoundary {
    pub fn new(spawn: SpawnRule) -> Self {
        Self {
            exits: Vec::new(),
            barrier: None,
            spawn,
        }
    }

    pub fn with_exit(mut self, face: Face) -> Self {
        self.exits.push(face);
        self
    }

    pub fn with_barrier(mut self, face: Face) -> Self {
        self.barrier = Some(face);
        self
    }

    /// True if the particle currently violates the boundary
    pub fn violated(&self, pos: Vec2, gate_closed: bool) -> bool {
        self.exits.iter().any(|f| f.crossed(pos))
            || (gate_closed && self.barrier.is_some_and(|f| f.crossed(pos)))
    }

    /// Teleport the particle if it violates the boundary. At most one
    /// teleport per call; returns whether one happened.
    pub fn apply(&self, p: &mut Particle, gate_closed: bool, rng: &mut SimRng) -> bool {
        if !self.violated(p.pos, gate_closed) {
            return false;
        }
        self.spawn.apply(p, rng);
        true
    }

    /// Apply to every particle yielded by `particles`; returns the recycle count
    pub fn apply_all<'a>(
        &self,
        particles: impl Iterator<Item = &'a mut Particle>,
        gate_closed: bool,
        rng: &mut SimRng,
    ) -> usize {
        let mut recycled = 0;
        for p in particles {
            if self.apply(p, gate_closed, rng) {
                log::trace!("recycled particle {:?} ({:?})", p.id, p.kind);
                recycled += 1;
            }
        }
        recycled
    }
}
