//! Per-simulation state and the simulation interface
//!
//! Each mounted simulation owns one `SimCore`: its particles, its physics
//! world, its RNG and its clock. Nothing is shared between simulations.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::Serialize;

use super::field::ParticleField;
use super::physics::{Contact, PhysicsWorld, PlanarWorld};
use super::rng::SimRng;
use super::router::Millis;
use crate::consts::FIELD_CAPACITY;
use crate::settings::{Controls, SimulationKind};

/// Simulation time, advanced only by ticks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimClock {
    elapsed_ms: f64,
    ticks: u64,
}

impl SimClock {
    pub fn advance(&mut self, dt: f32) {
        self.elapsed_ms += crate::secs_to_ms(dt);
        self.ticks += 1;
    }

    /// Whole milliseconds since mount
    pub fn now(&self) -> Millis {
        self.elapsed_ms as Millis
    }

    pub fn elapsed_secs(&self) -> f32 {
        (self.elapsed_ms / 1000.0) as f32
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// State every simulation carries
#[derive(Debug, Clone)]
pub struct SimCore {
    pub field: ParticleField,
    pub world: PlanarWorld,
    pub rng: SimRng,
    pub clock: SimClock,
    stopped: bool,
}

impl SimCore {
    pub fn new(seed: u64, gravity: Vec2) -> Self {
        Self {
            field: ParticleField::new(FIELD_CAPACITY),
            world: PlanarWorld::new(gravity),
            rng: SimRng::new(seed),
            clock: SimClock::default(),
            stopped: false,
        }
    }

    /// Advance the clock, jitter, then run physics. Returns this tick's contacts.
    pub fn step(&mut self, dt: f32) -> Vec<Contact> {
        self.clock.advance(dt);
        self.field.jitter(&mut self.rng);
        self.world.step(&mut self.field, dt)
    }

    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }
}

/// What a front end shows for one simulation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readout {
    pub simulation: SimulationKind,
    pub time_ms: Millis,
    /// Headline rate (events per second, or rpm for ATP synthase)
    pub rate: f32,
    /// Headline cumulative count
    pub cumulative: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actuator_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    pub particle_count: usize,
    /// Simulation-specific extras
    pub metrics: BTreeMap<&'static str, f32>,
}

impl Readout {
    pub fn new(simulation: SimulationKind, core: &SimCore) -> Self {
        Self {
            simulation,
            time_ms: core.now(),
            rate: 0.0,
            cumulative: 0,
            template: None,
            sequence: None,
            actuator_on: None,
            stage: None,
            particle_count: core.field.len(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    pub fn cumulative(mut self, cumulative: u64) -> Self {
        self.cumulative = cumulative;
        self
    }

    pub fn actuator(mut self, on: bool) -> Self {
        self.actuator_on = Some(on);
        self
    }

    pub fn stage(mut self, stage: impl std::fmt::Debug) -> Self {
        self.stage = Some(format!("{stage:?}"));
        self
    }

    pub fn sequences(mut self, template: String, sequence: String) -> Self {
        self.template = Some(template);
        self.sequence = Some(sequence);
        self
    }

    pub fn metric(mut self, name: &'static str, value: f32) -> Self {
        self.metrics.insert(name, value);
        self
    }
}

/// One mounted teaching simulation
pub trait Simulation {
    fn kind(&self) -> SimulationKind;

    fn core(&self) -> &SimCore;

    fn core_mut(&mut self) -> &mut SimCore;

    /// One fixed step with already sanitized controls
    fn update(&mut self, controls: &Controls, dt: f32);

    fn readout(&self) -> Readout;

    /// Run one fixed step unless stopped
    fn tick(&mut self, controls: &Controls, dt: f32) {
        if self.is_stopped() {
            return;
        }
        self.update(&controls.sanitized(), dt);
    }

    fn field(&self) -> &ParticleField {
        &self.core().field
    }

    /// Stop ticking; counters and timers inside stop with it
    fn stop(&mut self) {
        self.core_mut().stop();
    }

    fn is_stopped(&self) -> bool {
        self.core().is_stopped()
    }
}
