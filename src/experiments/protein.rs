//! Protein synthesis
//!
//! Two stages share one slider. In the nucleus a polymerase runs along the
//! DNA and drops one mRNA per pass (slider = polymerase speed). In the
//! cytoplasm mRNA rains onto a ribosome (slider = mRNA concentration) and
//! every strand the ribosome catches becomes one protein. Switching stage
//! clears the scene.

use std::collections::BTreeSet;

use glam::Vec2;

use crate::settings::{Controls, ProteinStage, SimulationKind};
use crate::sim::{
    ActorKind, ColliderId, CollisionEventRouter, Contact, ParticleId, ParticleKind,
    PhysicsWorld, RateGatedProducer, Readout, Response, RingBuffer, Shape, SimCore, Simulation,
    StageController, StageScope, Traveler,
};

const GRAVITY: Vec2 = Vec2::new(0.0, -6.0);
const WALLS_MIN: Vec2 = Vec2::new(-7.0, -5.0);
const WALLS_MAX: Vec2 = Vec2::new(7.0, 20.0);

const POLYMERASE_START: f32 = -8.0;
const POLYMERASE_END: f32 = 8.0;
/// Polymerase speed per unit of slider
const POLYMERASE_GAIN: f32 = 2.0;
const TRANSCRIPT_SPREAD: f32 = 1.0;

const RIBOSOME_SITE: Vec2 = Vec2::new(0.0, 2.0);
const RIBOSOME_RADIUS: f32 = 1.5;
const RIBOSOME_SENSOR: Vec2 = Vec2::new(0.0, 4.0);
const RIBOSOME_SENSOR_HALF: Vec2 = Vec2::new(3.0, 1.0);
const RIBOSOME_COOLDOWN: u64 = 300;
/// One incoming mRNA every `INCOMING_K / slider` ms
const INCOMING_K: f64 = 2000.0;
const INCOMING_Y: f32 = 12.0;
const INCOMING_SPREAD: f32 = 6.0;
const PROTEIN_SPAWN: Vec2 = Vec2::new(0.0, -0.5);

/// On-screen limits per collection
const TRANSCRIPTION_MRNA: usize = 11;
const TRANSLATION_MRNA: usize = 16;
const PROTEINS: usize = 21;

/// Scene state a stage change tears down
struct Cell {
    core: SimCore,
    mrna: RingBuffer<ParticleId>,
    proteins: RingBuffer<ParticleId>,
    /// Strands the ribosome has already translated
    read: BTreeSet<ParticleId>,
    ribosome: [ColliderId; 2],
    incoming: RateGatedProducer,
}

impl Cell {
    fn push_mrna(&mut self, pos: Vec2) {
        let Some(id) = self.core.field.spawn(ParticleKind::Mrna, pos) else {
            return;
        };
        if let Some(old) = self.mrna.push(id) {
            self.core.field.despawn(old);
            self.read.remove(&old);
        }
    }

    fn push_protein(&mut self, pos: Vec2) {
        let Some(id) = self.core.field.spawn(ParticleKind::Protein, pos) else {
            return;
        };
        if let Some(old) = self.proteins.push(id) {
            self.core.field.despawn(old);
        }
    }
}

impl StageScope<ProteinStage> for Cell {
    fn clear_stage(&mut self) {
        for id in self.mrna.clear().into_iter().chain(self.proteins.clear()) {
            self.core.field.despawn(id);
        }
        self.read.clear();
    }

    fn enter_stage(&mut self, stage: ProteinStage) {
        let translating = stage == ProteinStage::Translation;
        self.mrna = RingBuffer::new(if translating {
            TRANSLATION_MRNA
        } else {
            TRANSCRIPTION_MRNA
        });
        for id in self.ribosome {
            self.core.world.set_enabled(id, translating);
        }
    }
}

pub struct ProteinSynthesis {
    cell: Cell,
    stages: StageController<ProteinStage>,
    polymerase: Traveler,
    router: CollisionEventRouter,
    ribosome_sensor: ColliderId,
    transcripts: u64,
    proteins_built: u64,
}

impl ProteinSynthesis {
    pub fn new(seed: u64) -> Self {
        let mut core = SimCore::new(seed, GRAVITY);
        core.world.add_box(WALLS_MIN, WALLS_MAX, 0.2);

        let body = core.world.add_collider(
            Shape::circle(RIBOSOME_SITE, RIBOSOME_RADIUS),
            Response::wall(0.2),
        );
        let sensor = core.world.add_collider(
            Shape::rect(RIBOSOME_SENSOR, RIBOSOME_SENSOR_HALF),
            Response::Sensor,
        );
        // The ribosome only exists in the cytoplasm
        core.world.set_enabled(body, false);
        core.world.set_enabled(sensor, false);

        let mut router = CollisionEventRouter::new(RIBOSOME_COOLDOWN);
        router.add_actor(ActorKind::Ribosome, sensor);

        Self {
            cell: Cell {
                core,
                mrna: RingBuffer::new(TRANSCRIPTION_MRNA),
                proteins: RingBuffer::new(PROTEINS),
                read: BTreeSet::new(),
                ribosome: [body, sensor],
                incoming: RateGatedProducer::new(0.0, INCOMING_K),
            },
            stages: StageController::new(ProteinStage::Transcription),
            polymerase: Traveler::new(POLYMERASE_START, POLYMERASE_END, POLYMERASE_GAIN),
            router,
            ribosome_sensor: sensor,
            transcripts: 0,
            proteins_built: 0,
        }
    }

    pub fn stage(&self) -> ProteinStage {
        self.stages.current()
    }

    pub fn transcripts(&self) -> u64 {
        self.transcripts
    }

    pub fn proteins_built(&self) -> u64 {
        self.proteins_built
    }

    pub fn mrna_on_screen(&self) -> usize {
        self.cell.mrna.len()
    }

    pub fn proteins_on_screen(&self) -> usize {
        self.cell.proteins.len()
    }

    fn transcribe(&mut self, rate: f32, dt: f32) {
        self.cell.core.step(dt);
        self.polymerase.speed = rate * POLYMERASE_GAIN;
        let cell = &mut self.cell;
        if self.polymerase.step(dt, false, &mut cell.core.rng) {
            let x = cell.core.rng.centered(TRANSCRIPT_SPREAD * 2.0);
            cell.push_mrna(Vec2::new(x, 0.0));
            self.transcripts += 1;
        }
    }

    fn translate(&mut self, rate: f32, dt: f32) {
        let cell = &mut self.cell;
        if cell.incoming.update(rate, crate::secs_to_ms(dt)) {
            let x = cell.core.rng.centered(INCOMING_SPREAD);
            cell.push_mrna(Vec2::new(x, INCOMING_Y));
        }

        let contacts = cell.core.step(dt);
        let fresh: Vec<Contact> = contacts
            .into_iter()
            .filter(|c| {
                c.collider == self.ribosome_sensor
                    && c.kind == ParticleKind::Mrna
                    && !cell.read.contains(&c.particle)
            })
            .collect();

        let now = cell.core.now();
        for event in self.router.route(&fresh, now) {
            cell.read.insert(event.other);
            let offset = Vec2::new(cell.core.rng.centered(1.0), 0.0);
            cell.push_protein(PROTEIN_SPAWN + offset);
            self.proteins_built += 1;
        }
    }
}

impl Simulation for ProteinSynthesis {
    fn kind(&self) -> SimulationKind {
        SimulationKind::ProteinSynthesis
    }

    fn core(&self) -> &SimCore {
        &self.cell.core
    }

    fn core_mut(&mut self) -> &mut SimCore {
        &mut self.cell.core
    }

    fn update(&mut self, controls: &Controls, dt: f32) {
        self.stages.advance(controls.protein_stage, &mut self.cell);
        match self.stages.current() {
            ProteinStage::Transcription => self.transcribe(controls.rate_level, dt),
            ProteinStage::Translation => self.translate(controls.rate_level, dt),
        }
    }

    fn readout(&self) -> Readout {
        Readout::new(self.kind(), &self.cell.core)
            .cumulative(self.proteins_built)
            .stage(self.stage())
            .metric("transcripts", self.transcripts as f32)
            .metric("mrna", self.mrna_on_screen() as f32)
            .metric("proteins", self.proteins_on_screen() as f32)
            .metric("polymerase_x", self.polymerase.pos)
    }
}
