//! Particle arena
//!
//! The field exclusively owns every free-moving particle in one simulation.
//! Particles are addressed by stable ids and kept sorted by id so iteration
//! order (and therefore every RNG draw) is deterministic.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::rng::SimRng;
use crate::consts::PLANE_Z;
use crate::settings::RadiationType;

/// Stable particle handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticleId(pub u32);

/// Particle species with their physical defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleKind {
    Substrate,
    Inhibitor,
    Ion,
    Lactose,
    Proton,
    Mrna,
    Protein,
    Radiation(RadiationType),
}

impl ParticleKind {
    pub fn radius(&self) -> f32 {
        match self {
            ParticleKind::Substrate => 0.3,
            ParticleKind::Inhibitor => 0.4,
            ParticleKind::Ion => 0.15,
            ParticleKind::Lactose => 0.2,
            ParticleKind::Proton => 0.2,
            ParticleKind::Mrna => 0.35,
            ParticleKind::Protein => 0.3,
            ParticleKind::Radiation(r) => r.radius(),
        }
    }

    pub fn restitution(&self) -> f32 {
        match self {
            ParticleKind::Substrate => 1.0,
            ParticleKind::Inhibitor => 0.8,
            ParticleKind::Ion => 0.9,
            ParticleKind::Proton => 0.5,
            ParticleKind::Mrna | ParticleKind::Protein => 0.2,
            ParticleKind::Lactose | ParticleKind::Radiation(_) => 0.5,
        }
    }

    /// Linear damping (1/s)
    pub fn damping(&self) -> f32 {
        match self {
            ParticleKind::Substrate | ParticleKind::Inhibitor | ParticleKind::Proton => 0.5,
            ParticleKind::Lactose => 2.0,
            ParticleKind::Ion | ParticleKind::Mrna | ParticleKind::Protein => 0.0,
            ParticleKind::Radiation(_) => 0.0,
        }
    }

    /// Multiplier on world gravity
    pub fn gravity_scale(&self) -> f32 {
        match self {
            ParticleKind::Lactose => 0.1,
            ParticleKind::Radiation(_) => 0.0,
            _ => 1.0,
        }
    }

    /// Thermal jitter range (velocity units per tick, full width)
    pub fn jitter_scale(&self) -> f32 {
        match self {
            ParticleKind::Substrate => 0.15,
            ParticleKind::Inhibitor => 0.1,
            ParticleKind::Ion => 0.4,
            ParticleKind::Lactose => 0.01,
            _ => 0.0,
        }
    }
}

/// One simulated particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub restitution: f32,
    pub damping: f32,
    pub gravity_scale: f32,
}

impl Particle {
    pub fn new(id: ParticleId, kind: ParticleKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            radius: kind.radius(),
            restitution: kind.restitution(),
            damping: kind.damping(),
            gravity_scale: kind.gravity_scale(),
        }
    }

    /// Position on the simulation plane, for 3-D hosts
    pub fn position3(&self) -> Vec3 {
        self.pos.extend(PLANE_Z)
    }
}

/// Capacity-bounded particle arena
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    capacity: usize,
    next_id: u32,
}

impl ParticleField {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Create a particle at rest. Returns `None` once the field is full.
    pub fn spawn(&mut self, kind: ParticleKind, pos: Vec2) -> Option<ParticleId> {
        if self.particles.len() >= self.capacity {
            log::debug!("particle field full ({}), dropping {kind:?} spawn", self.capacity);
            return None;
        }
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        // Ids are monotonic, so pushing keeps the arena sorted.
        self.particles.push(Particle::new(id, kind, pos));
        Some(id)
    }

    /// Create a particle with an initial velocity
    pub fn spawn_moving(&mut self, kind: ParticleKind, pos: Vec2, vel: Vec2) -> Option<ParticleId> {
        let id = self.spawn(kind, pos)?;
        if let Some(p) = self.get_mut(id) {
            p.vel = vel;
        }
        Some(id)
    }

    pub fn despawn(&mut self, id: ParticleId) -> bool {
        match self.position_of(id) {
            Some(idx) => {
                self.particles.remove(idx);
                true
            }
            None => false,
        }
    }

    fn position_of(&self, id: ParticleId) -> Option<usize> {
        self.particles.binary_search_by_key(&id, |p| p.id).ok()
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.position_of(id).map(|idx| &self.particles[idx])
    }

    pub fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.position_of(id).map(|idx| &mut self.particles[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn count(&self, kind: ParticleKind) -> usize {
        self.particles.iter().filter(|p| p.kind == kind).count()
    }

    /// Ids of every particle of `kind`, in id order
    pub fn ids_of(&self, kind: ParticleKind) -> Vec<ParticleId> {
        self.particles
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| p.id)
            .collect()
    }

    /// Remove every particle matching `pred`
    pub fn remove_where(&mut self, mut pred: impl FnMut(&Particle) -> bool) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| !pred(p));
        before - self.particles.len()
    }

    /// Apply one tick of thermal jitter to every particle
    pub fn jitter(&mut self, rng: &mut SimRng) {
        for p in &mut self.particles {
            let scale = p.kind.jitter_scale();
            if scale > 0.0 {
                p.vel += Vec2::new(rng.centered(scale), rng.centered(scale));
            }
        }
    }

    /// Grow or shrink the population of `kind` to `target`.
    ///
    /// New particles take their start position from `layout` (slot = current
    /// population), so the same slider value always yields the same layout.
    /// Shrinking removes the newest particles first.
    pub fn set_population(&mut self, kind: ParticleKind, target: usize, layout: &[Vec2]) {
        let target = target.min(layout.len());
        let current = self.count(kind);
        if current > target {
            let mut ids = self.ids_of(kind);
            for id in ids.split_off(target) {
                self.despawn(id);
            }
        } else {
            for slot in current..target {
                if self.spawn(kind, layout[slot]).is_none() {
                    break;
                }
            }
        }
        if current != target {
            log::debug!("{kind:?} population {current} -> {}", self.count(kind));
        }
    }
}

/// Pre-generate `n` start positions uniformly inside a rectangle
pub fn scatter(rng: &mut SimRng, n: usize, min: Vec2, max: Vec2) -> Vec<Vec2> {
    (0..n)
        .map(|_| Vec2::new(rng.uniform(min.x, max.x), rng.uniform(min.y, max.y)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_ids_are_stable() {
        let mut field = ParticleField::new(8);
        let a = field.spawn(ParticleKind::Ion, Vec2::ZERO).unwrap();
        let b = field.spawn(ParticleKind::Ion, Vec2::ONE).unwrap();
        assert!(field.despawn(a));
        let c = field.spawn(ParticleKind::Ion, Vec2::X).unwrap();
        assert_ne!(c, a);
        assert_eq!(field.get(b).unwrap().pos, Vec2::ONE);
        assert!(!field.despawn(a));
    }

    #[test]
    fn test_capacity_bound() {
        let mut field = ParticleField::new(2);
        assert!(field.spawn(ParticleKind::Substrate, Vec2::ZERO).is_some());
        assert!(field.spawn(ParticleKind::Substrate, Vec2::ZERO).is_some());
        assert!(field.spawn(ParticleKind::Substrate, Vec2::ZERO).is_none());
        assert_eq!(field.len(), 2);
    }

    #[test]
    fn test_jitter_is_bounded_and_seeded() {
        let mut rng_a = SimRng::new(3);
        let mut rng_b = SimRng::new(3);
        let mut a = ParticleField::new(4);
        let mut b = ParticleField::new(4);
        for field in [&mut a, &mut b] {
            field.spawn(ParticleKind::Ion, Vec2::ZERO);
            field.spawn(ParticleKind::Protein, Vec2::ZERO);
        }

        a.jitter(&mut rng_a);
        b.jitter(&mut rng_b);

        let ion = a.iter().next().unwrap();
        let half = ParticleKind::Ion.jitter_scale() / 2.0;
        assert!(ion.vel.x.abs() <= half && ion.vel.y.abs() <= half);
        assert_eq!(ion.vel, b.iter().next().unwrap().vel);
        // Proteins have no thermal jitter
        assert_eq!(a.iter().nth(1).unwrap().vel, Vec2::ZERO);
    }

    #[test]
    fn test_set_population_grows_and_shrinks() {
        let mut rng = SimRng::new(5);
        let layout = scatter(&mut rng, 50, Vec2::new(-7.0, -4.0), Vec2::new(7.0, 4.0));
        let mut field = ParticleField::new(64);

        field.set_population(ParticleKind::Substrate, 15, &layout);
        assert_eq!(field.count(ParticleKind::Substrate), 15);
        field.set_population(ParticleKind::Substrate, 4, &layout);
        assert_eq!(field.count(ParticleKind::Substrate), 4);
        // Asking for more than the layout holds clamps to the layout size
        field.set_population(ParticleKind::Substrate, 500, &layout);
        assert_eq!(field.count(ParticleKind::Substrate), 50);
    }

    #[test]
    fn test_z_is_plane_constant() {
        let mut field = ParticleField::new(1);
        let id = field.spawn(ParticleKind::Proton, Vec2::new(1.0, 2.0)).unwrap();
        assert_eq!(field.get(id).unwrap().position3().z, PLANE_Z);
    }
}
