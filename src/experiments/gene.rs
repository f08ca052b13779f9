//! Gene regulation (lac operon)
//!
//! Without lactose the repressor sits on the operator and the polymerase
//! stalls in front of it. Enough lactose flips the repressor off the DNA;
//! the polymerase then runs the full gene and every pass yields one mRNA.

use glam::Vec2;

use crate::settings::{Controls, SimulationKind};
use crate::sim::{
    ParticleKind, Readout, SimCore, Simulation, ThresholdActuator, Traveler, WindowedCounter,
};

const WALL_MIN: Vec2 = Vec2::new(-8.0, -4.0);
const WALL_MAX: Vec2 = Vec2::new(8.0, 7.0);
const GRAVITY: Vec2 = Vec2::new(0.0, -1.0);

/// Lactose level at which the repressor lets go
const REPRESSOR_THRESHOLD: f32 = 50.0;
const REPRESSOR_SMOOTHING: f32 = 0.1;
const REPRESSOR_Y: (f32, f32) = (-1.0, 4.0);
const REPRESSOR_ROTATION: (f32, f32) = (0.0, 1.0);

const POLYMERASE_START: f32 = -8.0;
const POLYMERASE_END: f32 = 8.0;
const POLYMERASE_SPEED: f32 = 4.8;
/// Stretch the bound repressor covers
const OPERATOR: (f32, f32) = (-2.0, -1.0);

const MRNA_TARGET: u64 = 10;
const MRNA_WINDOW: u64 = 10_000;

/// Lactose particles appear from this level up, one per 1.5 units
const LACTOSE_VISIBLE_LEVEL: f32 = 10.0;
const LACTOSE_PER_PARTICLE: f32 = 1.5;

fn lactose_particles(level: f32) -> usize {
    if level < LACTOSE_VISIBLE_LEVEL {
        0
    } else {
        (level / LACTOSE_PER_PARTICLE).floor() as usize
    }
}

pub struct GeneRegulation {
    core: SimCore,
    repressor: ThresholdActuator,
    polymerase: Traveler,
    mrna: WindowedCounter,
    applied_lactose: Option<usize>,
}

impl GeneRegulation {
    pub fn new(seed: u64) -> Self {
        let mut core = SimCore::new(seed, GRAVITY);
        core.world.add_box(WALL_MIN, WALL_MAX, 0.5);
        Self {
            core,
            repressor: ThresholdActuator::new(REPRESSOR_THRESHOLD, REPRESSOR_SMOOTHING),
            polymerase: Traveler::new(POLYMERASE_START, POLYMERASE_END, POLYMERASE_SPEED)
                .with_blocked_range(OPERATOR.0, OPERATOR.1),
            mrna: WindowedCounter::sliding(MRNA_WINDOW),
            applied_lactose: None,
        }
    }

    /// True while the repressor blocks transcription
    pub fn repressed(&self) -> bool {
        !self.repressor.is_engaged()
    }

    pub fn repressor_pose(&self) -> (f32, f32) {
        (
            self.repressor.lerp(REPRESSOR_Y.0, REPRESSOR_Y.1),
            self.repressor.lerp(REPRESSOR_ROTATION.0, REPRESSOR_ROTATION.1),
        )
    }

    pub fn polymerase_x(&self) -> f32 {
        self.polymerase.pos
    }

    pub fn transcripts(&self) -> u64 {
        self.mrna.total()
    }

    pub fn is_complete(&self) -> bool {
        self.transcripts() >= MRNA_TARGET
    }

    fn apply_lactose(&mut self, level: f32) {
        let target = lactose_particles(level);
        if self.applied_lactose == Some(target) {
            return;
        }
        // A new level is a fresh batch of sugar
        let core = &mut self.core;
        core.field.remove_where(|p| p.kind == ParticleKind::Lactose);
        for _ in 0..target {
            let pos = Vec2::new(core.rng.uniform(-7.0, 7.0), core.rng.uniform(3.0, 6.8));
            if core.field.spawn(ParticleKind::Lactose, pos).is_none() {
                break;
            }
        }
        log::debug!("lactose particles -> {target}");
        self.applied_lactose = Some(target);
    }
}

impl Simulation for GeneRegulation {
    fn kind(&self) -> SimulationKind {
        SimulationKind::GeneRegulation
    }

    fn core(&self) -> &SimCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SimCore {
        &mut self.core
    }

    fn update(&mut self, controls: &Controls, dt: f32) {
        self.apply_lactose(controls.lactose_level);
        if self.repressor.update(controls.lactose_level, dt) {
            log::info!(
                "repressor {}",
                if self.repressed() { "bound" } else { "released" }
            );
        }

        self.core.step(dt);

        let blocked = self.repressed();
        if self.polymerase.step(dt, blocked, &mut self.core.rng) {
            self.mrna.record(self.core.now());
            if self.transcripts() == MRNA_TARGET {
                log::info!("mRNA target of {MRNA_TARGET} reached");
            }
        }
    }

    fn readout(&self) -> Readout {
        let (repressor_y, repressor_rotation) = self.repressor_pose();
        Readout::new(self.kind(), &self.core)
            .rate(self.mrna.rate(self.core.now()))
            .cumulative(self.transcripts())
            .actuator(!self.repressed())
            .metric("polymerase_x", self.polymerase_x())
            .metric("repressor_y", repressor_y)
            .metric("repressor_rotation", repressor_rotation)
            .metric("complete", if self.is_complete() { 1.0 } else { 0.0 })
            .metric("lactose", self.core.field.count(ParticleKind::Lactose) as f32)
    }
}
