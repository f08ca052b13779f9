//! Enzyme kinetics
//!
//! Substrates drift around a dish holding two fixed enzymes. A substrate
//! touching an idle enzyme is one reaction; the enzyme is then busy for the
//! cooldown. The second stage adds competitive inhibitors, which occupy an
//! enzyme for the same cooldown without reacting.

use glam::Vec2;

use crate::settings::{Controls, EnzymeStage, SimulationKind};
use crate::sim::{
    ActorId, ActorKind, CollisionEventRouter, ParticleKind, PhysicsWorld, Readout, Response,
    Shape, SimCore, Simulation, StageController, StageScope, WindowedCounter, scatter,
};

const DISH_MIN: Vec2 = Vec2::new(-8.0, -5.0);
const DISH_MAX: Vec2 = Vec2::new(8.0, 5.0);
const ENZYME_RADIUS: f32 = 1.2;
const ENZYME_SITES: [Vec2; 2] = [Vec2::new(-3.0, 0.0), Vec2::new(3.0, 1.5)];
/// Busy time after each contact (ms)
const ENZYME_COOLDOWN: u64 = 200;
/// Reaction count resets every 5 s
const REACTION_WINDOW: u64 = 5000;
/// Inhibitor population when the inhibition stage starts
const INITIAL_INHIBITORS: u32 = 8;

/// Everything a stage change touches
struct Dish {
    core: SimCore,
    router: CollisionEventRouter,
    reactions: WindowedCounter,
    substrate_layout: Vec<Vec2>,
    inhibitor_layout: Vec<Vec2>,
    inhibitor_target: u32,
    /// Last slider value seen, to tell slider moves from stage re-seeding
    last_inhibitor_control: u32,
}

impl StageScope<EnzymeStage> for Dish {
    fn clear_stage(&mut self) {
        self.core
            .field
            .remove_where(|p| p.kind == ParticleKind::Inhibitor);
    }

    fn enter_stage(&mut self, stage: EnzymeStage) {
        if stage == EnzymeStage::Inhibition {
            self.inhibitor_target = INITIAL_INHIBITORS;
        }
    }
}

pub struct EnzymeKinetics {
    dish: Dish,
    stages: StageController<EnzymeStage>,
    enzymes: Vec<ActorId>,
}

impl EnzymeKinetics {
    pub fn new(seed: u64) -> Self {
        let mut core = SimCore::new(seed, Vec2::ZERO);
        core.world.add_box(DISH_MIN, DISH_MAX, 1.0);

        let mut router = CollisionEventRouter::new(ENZYME_COOLDOWN);
        let enzymes = ENZYME_SITES
            .iter()
            .map(|&site| {
                let collider = core.world.add_collider(
                    Shape::circle(site, ENZYME_RADIUS),
                    Response::Solid {
                        restitution: 1.0,
                        report: true,
                    },
                );
                router.add_actor(ActorKind::Enzyme, collider)
            })
            .collect();

        let spread = (Vec2::new(-7.0, -4.0), Vec2::new(7.0, 4.0));
        let substrate_layout =
            scatter(&mut core.rng, Controls::SUBSTRATE_RANGE.1 as usize, spread.0, spread.1);
        let inhibitor_layout =
            scatter(&mut core.rng, Controls::INHIBITOR_RANGE.1 as usize, spread.0, spread.1);

        Self {
            dish: Dish {
                core,
                router,
                reactions: WindowedCounter::periodic(REACTION_WINDOW),
                substrate_layout,
                inhibitor_layout,
                inhibitor_target: 0,
                last_inhibitor_control: 0,
            },
            stages: StageController::new(EnzymeStage::Substrate),
            enzymes,
        }
    }

    pub fn stage(&self) -> EnzymeStage {
        self.stages.current()
    }

    pub fn enzymes(&self) -> &[ActorId] {
        &self.enzymes
    }

    pub fn busy_enzymes(&self) -> usize {
        self.dish.router.active_count()
    }

    /// Reactions per second over the current 5 s window
    pub fn reaction_rate(&self) -> f32 {
        self.dish.reactions.rate(self.dish.core.now())
    }

    pub fn total_reactions(&self) -> u64 {
        self.dish.reactions.total()
    }

    fn apply_controls(&mut self, controls: &Controls) {
        let entered = self.stages.advance(controls.enzyme_stage, &mut self.dish);

        let dish = &mut self.dish;
        if !entered
            && self.stages.current() == EnzymeStage::Inhibition
            && controls.inhibitor_count != dish.last_inhibitor_control
        {
            dish.inhibitor_target = controls.inhibitor_count;
        }
        dish.last_inhibitor_control = controls.inhibitor_count;

        dish.core.field.set_population(
            ParticleKind::Substrate,
            controls.substrate_count as usize,
            &dish.substrate_layout,
        );
        dish.core.field.set_population(
            ParticleKind::Inhibitor,
            dish.inhibitor_target as usize,
            &dish.inhibitor_layout,
        );
    }
}

impl Simulation for EnzymeKinetics {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Enzyme
    }

    fn core(&self) -> &SimCore {
        &self.dish.core
    }

    fn core_mut(&mut self) -> &mut SimCore {
        &mut self.dish.core
    }

    fn update(&mut self, controls: &Controls, dt: f32) {
        self.apply_controls(controls);

        let dish = &mut self.dish;
        let contacts = dish.core.step(dt);
        let now = dish.core.now();
        for event in dish.router.route(&contacts, now) {
            // Inhibitor contacts already spent the enzyme's cooldown
            if event.other_kind == ParticleKind::Substrate {
                dish.reactions.record(now);
            }
        }
    }

    fn readout(&self) -> Readout {
        let field = &self.dish.core.field;
        Readout::new(self.kind(), &self.dish.core)
            .rate(self.reaction_rate())
            .cumulative(self.total_reactions())
            .stage(self.stage())
            .metric("busy_enzymes", self.busy_enzymes() as f32)
            .metric("substrates", field.count(ParticleKind::Substrate) as f32)
            .metric("inhibitors", field.count(ParticleKind::Inhibitor) as f32)
    }
}
