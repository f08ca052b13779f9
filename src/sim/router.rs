//! Contact-to-event routing with actor-scoped cooldown
//!
//! Physics reports an overlap every tick two bodies touch. The router turns
//! that stream into discrete domain events: an actor fires at most once per
//! cooldown window, no matter how many partners touch it or for how long.
//! The cooldown belongs to the actor ("enzyme busy"), not to the pair.

use std::collections::HashMap;

use serde::Serialize;

use super::field::{ParticleId, ParticleKind};
use super::physics::{ColliderId, Contact};

/// Simulation time in milliseconds
pub type Millis = u64;

/// Stable actor handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ActorId(pub u32);

/// Role of a fixed actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActorKind {
    Enzyme,
    Ribosome,
    Polymerase,
}

/// An immobile (or kinematically driven) body that reacts to contacts
#[derive(Debug, Clone, Serialize)]
pub struct FixedActor {
    pub id: ActorId,
    pub kind: ActorKind,
    #[serde(skip)]
    pub collider: ColliderId,
    /// Set when the actor fires; cleared once its cooldown has elapsed
    pub active: bool,
    pub active_until: Millis,
    pub cooldown_until: Millis,
}

/// One routed contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainEvent {
    pub actor: ActorId,
    pub actor_kind: ActorKind,
    pub other: ParticleId,
    pub other_kind: ParticleKind,
    pub at: Millis,
}

/// Owns the actors of one simulation and their cooldown state
#[derive(Debug, Clone)]
pub struct CollisionEventRouter {
    actors: Vec<FixedActor>,
    by_collider: HashMap<ColliderId, ActorId>,
    cooldown: Millis,
    next_id: u32,
}

impl CollisionEventRouter {
    pub fn new(cooldown: Millis) -> Self {
        Self {
            actors: Vec::new(),
            by_collider: HashMap::new(),
            cooldown,
            next_id: 1,
        }
    }

    /// Register an actor whose contacts arrive through `collider`
    pub fn add_actor(&mut self, kind: ActorKind, collider: ColliderId) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        self.actors.push(FixedActor {
            id,
            kind,
            collider,
            active: false,
            active_until: 0,
            cooldown_until: 0,
        });
        self.by_collider.insert(collider, id);
        id
    }

    pub fn actor(&self, id: ActorId) -> Option<&FixedActor> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn active_count(&self) -> usize {
        self.actors.iter().filter(|a| a.active).count()
    }

    /// Clear `active` flags whose window has passed. Call once per tick.
    pub fn refresh(&mut self, now: Millis) {
        for actor in &mut self.actors {
            if actor.active && now >= actor.active_until {
                actor.active = false;
            }
        }
    }

    /// Convert one contact into an event if the actor is off cooldown.
    /// Unknown actors are ignored.
    pub fn on_contact(
        &mut self,
        actor: ActorId,
        other: ParticleId,
        other_kind: ParticleKind,
        now: Millis,
    ) -> Option<DomainEvent> {
        let cooldown = self.cooldown;
        let a = self.actors.iter_mut().find(|a| a.id == actor)?;
        if now < a.cooldown_until {
            return None;
        }
        a.cooldown_until = now + cooldown;
        a.active = true;
        a.active_until = now + cooldown;
        Some(DomainEvent {
            actor,
            actor_kind: a.kind,
            other,
            other_kind,
            at: now,
        })
    }

    /// Route a step's contacts, in order. Contacts on colliders that belong
    /// to no actor are skipped.
    pub fn route(&mut self, contacts: &[Contact], now: Millis) -> Vec<DomainEvent> {
        self.refresh(now);
        contacts
            .iter()
            .filter_map(|c| {
                let actor = *self.by_collider.get(&c.collider)?;
                self.on_contact(actor, c.particle, c.kind, now)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn router_with_enzyme(cooldown: Millis) -> (CollisionEventRouter, ActorId) {
        let mut router = CollisionEventRouter::new(cooldown);
        let id = router.add_actor(ActorKind::Enzyme, ColliderId(1));
        (router, id)
    }

    #[test]
    fn test_cooldown_is_actor_scoped() {
        let (mut router, enzyme) = router_with_enzyme(200);
        let a = ParticleId(1);
        let b = ParticleId(2);

        assert!(router.on_contact(enzyme, a, ParticleKind::Substrate, 0).is_some());
        // Different partner inside the window: still busy
        assert!(router.on_contact(enzyme, b, ParticleKind::Substrate, 50).is_none());
        // Same pair separating and re-touching inside the window: busy
        assert!(router.on_contact(enzyme, a, ParticleKind::Substrate, 199).is_none());
        assert!(router.on_contact(enzyme, b, ParticleKind::Substrate, 200).is_some());
    }

    #[test]
    fn test_active_flag_clears_after_cooldown() {
        let (mut router, enzyme) = router_with_enzyme(200);
        router.on_contact(enzyme, ParticleId(1), ParticleKind::Substrate, 1000);
        assert!(router.actor(enzyme).unwrap().active);
        router.refresh(1199);
        assert!(router.actor(enzyme).unwrap().active);
        router.refresh(1200);
        assert!(!router.actor(enzyme).unwrap().active);
    }

    #[test]
    fn test_unknown_actor_is_noop() {
        let (mut router, _) = router_with_enzyme(200);
        assert!(router.on_contact(ActorId(42), ParticleId(1), ParticleKind::Ion, 0).is_none());
    }

    #[test]
    fn test_route_skips_unowned_colliders() {
        let (mut router, enzyme) = router_with_enzyme(200);
        let contact = |collider| Contact {
            collider,
            particle: ParticleId(7),
            kind: ParticleKind::Substrate,
            velocity: glam::Vec2::ZERO,
            offset: glam::Vec2::ZERO,
        };
        let events = router.route(&[contact(ColliderId(9)), contact(ColliderId(1))], 10);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].actor, enzyme);
        assert_eq!(events[0].at, 10);
    }

    proptest! {
        /// Continuous contact for `ticks` ticks fires floor(ticks / cooldown) + 1
        /// events, never two closer than the cooldown.
        #[test]
        fn prop_cooldown_bound(cooldown in 1u64..50, ticks in 0u64..500) {
            let (mut router, enzyme) = router_with_enzyme(cooldown);
            let mut fired = Vec::new();
            for t in 0..=ticks {
                let partner = ParticleId((t % 3) as u32);
                if let Some(e) = router.on_contact(enzyme, partner, ParticleKind::Substrate, t) {
                    fired.push(e.at);
                }
            }
            prop_assert_eq!(fired.len() as u64, ticks / cooldown + 1);
            for pair in fired.windows(2) {
                prop_assert!(pair[1] - pair[0] >= cooldown);
            }
        }
    }
}
