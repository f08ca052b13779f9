//! DNA mutation
//!
//! A polymerase copies an 18-base template while radiation rains through the
//! scene. A radiation particle crossing the polymerase arms one error; the
//! next base the polymerase appends is then a wrong one.

use glam::Vec2;

use crate::settings::{Controls, RadiationType, SimulationKind};
use crate::sim::{
    ActorKind, Axis, AxisSpawn, ColliderId, CollisionEventRouter, Face, MapperEvent, Pairing,
    ParticleKind, PhysicsWorld, PositionToIndexMapper, Readout, RecycleBoundary, Response, Shape,
    SimCore, Simulation, SpawnRule, Strand, Traveler, WindowedCounter,
};

const TEMPLATE_LEN: usize = 18;
/// The polymerase enters before base 0 and leaves after base 17
const TRACK_START: f32 = -9.5;
const TRACK_END: f32 = 9.5;
const POLYMERASE_SPEED: f32 = 2.0;
/// Leading edge of base 0 and the width of one base
const TEMPLATE_ORIGIN: f32 = -9.0;
const BASE_WIDTH: f32 = 1.0;
const POLYMERASE_Y: f32 = 0.0;
const POLYMERASE_SENSOR_HALF: Vec2 = Vec2::new(1.3, 1.1);
const POLYMERASE_COOLDOWN: u64 = 250;

const RADIATION_HALF_WIDTH: f32 = 7.0;
const RADIATION_SPAWN_Y: (f32, f32) = (10.0, 15.0);
const RADIATION_EXIT_Y: f32 = -12.0;
/// Drift carries radiation sideways; past this it has left the scene
const RADIATION_EXIT_X: f32 = 10.0;
const RADIATION_RESPAWN_Y: f32 = 12.0;
const RADIATION_DRIFT: f32 = 0.5;

const MUTATION_WINDOW: u64 = 10_000;

fn radiation_recycler(kind: RadiationType) -> RecycleBoundary {
    RecycleBoundary::new(SpawnRule {
        x: AxisSpawn::Uniform(-RADIATION_HALF_WIDTH, RADIATION_HALF_WIDTH),
        y: AxisSpawn::Fixed(RADIATION_RESPAWN_Y),
        vx: AxisSpawn::Uniform(-RADIATION_DRIFT, RADIATION_DRIFT),
        vy: AxisSpawn::Fixed(kind.fall_speed()),
    })
    .with_exit(Face::Below {
        axis: Axis::Y,
        limit: RADIATION_EXIT_Y,
    })
    .with_exit(Face::Below {
        axis: Axis::X,
        limit: -RADIATION_EXIT_X,
    })
    .with_exit(Face::Above {
        axis: Axis::X,
        limit: RADIATION_EXIT_X,
    })
}

pub struct DnaMutation {
    core: SimCore,
    strand: Strand,
    mapper: PositionToIndexMapper,
    router: CollisionEventRouter,
    polymerase_sensor: ColliderId,
    error_pending: bool,
    mutations: WindowedCounter,
    hits: u64,
    cycles: u64,
    recycler: RecycleBoundary,
    applied_radiation: Option<(u32, RadiationType)>,
}

impl DnaMutation {
    pub fn new(seed: u64) -> Self {
        let mut core = SimCore::new(seed, Vec2::ZERO);
        // Radiation streams through itself
        core.world.particle_collisions = false;
        let strand = Strand::random(TEMPLATE_LEN, Pairing::Replication, &mut core.rng);
        let mapper = PositionToIndexMapper::new(
            TEMPLATE_ORIGIN,
            BASE_WIDTH,
            Traveler::new(TRACK_START, TRACK_END, POLYMERASE_SPEED),
        );

        let polymerase_sensor = core.world.add_collider(
            Shape::rect(Vec2::new(TRACK_START, POLYMERASE_Y), POLYMERASE_SENSOR_HALF),
            Response::Sensor,
        );
        let mut router = CollisionEventRouter::new(POLYMERASE_COOLDOWN);
        router.add_actor(ActorKind::Polymerase, polymerase_sensor);

        Self {
            core,
            strand,
            mapper,
            router,
            polymerase_sensor,
            error_pending: false,
            mutations: WindowedCounter::sliding(MUTATION_WINDOW),
            hits: 0,
            cycles: 0,
            recycler: radiation_recycler(RadiationType::default()),
            applied_radiation: None,
        }
    }

    pub fn strand(&self) -> &Strand {
        &self.strand
    }

    pub fn error_pending(&self) -> bool {
        self.error_pending
    }

    pub fn total_mutations(&self) -> u64 {
        self.mutations.total()
    }

    /// Radiation hits on the polymerase
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn polymerase_x(&self) -> f32 {
        self.mapper.traveler.pos
    }

    fn apply_radiation(&mut self, level: u32, kind: RadiationType) {
        if self.applied_radiation == Some((level, kind)) {
            return;
        }
        // New level or type: a fresh shower of the chosen particle
        let core = &mut self.core;
        core.field
            .remove_where(|p| matches!(p.kind, ParticleKind::Radiation(_)));
        for _ in 0..level {
            let pos = Vec2::new(
                core.rng.uniform(-RADIATION_HALF_WIDTH, RADIATION_HALF_WIDTH),
                core.rng.uniform(RADIATION_SPAWN_Y.0, RADIATION_SPAWN_Y.1),
            );
            let vel = Vec2::new(core.rng.centered(RADIATION_DRIFT * 2.0), kind.fall_speed());
            if core
                .field
                .spawn_moving(ParticleKind::Radiation(kind), pos, vel)
                .is_none()
            {
                break;
            }
        }
        self.recycler = radiation_recycler(kind);
        self.applied_radiation = Some((level, kind));
        log::debug!("radiation -> {level} x {}", kind.as_str());
    }
}

impl Simulation for DnaMutation {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Mutation
    }

    fn core(&self) -> &SimCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SimCore {
        &mut self.core
    }

    fn update(&mut self, controls: &Controls, dt: f32) {
        self.apply_radiation(controls.radiation_level, controls.radiation_type);

        let contacts = self.core.step(dt);
        let now = self.core.now();
        for event in self.router.route(&contacts, now) {
            if matches!(event.other_kind, ParticleKind::Radiation(_)) {
                self.error_pending = true;
                self.hits += 1;
            }
        }

        let events = self.mapper.tick(
            dt,
            false,
            &mut self.strand,
            &mut self.error_pending,
            &mut self.core.rng,
        );
        for event in events {
            match event {
                MapperEvent::Appended { base, .. } if base.mutated => self.mutations.record(now),
                MapperEvent::Appended { .. } => {}
                MapperEvent::CycleComplete { length } => {
                    self.cycles += 1;
                    log::debug!("replication pass {} done ({length} bases)", self.cycles);
                }
            }
        }

        let at = Vec2::new(self.mapper.traveler.pos, POLYMERASE_Y);
        let world = &mut self.core.world;
        if let Some(sensor) = world
            .collider(self.polymerase_sensor)
            .map(|c| c.shape.with_center(at))
        {
            world.set_collider_shape(self.polymerase_sensor, sensor);
        }

        let core = &mut self.core;
        self.recycler.apply_all(core.field.iter_mut(), false, &mut core.rng);
    }

    fn readout(&self) -> Readout {
        let now = self.core.now();
        Readout::new(self.kind(), &self.core)
            .rate(self.mutations.rate(now))
            .cumulative(self.total_mutations())
            .sequences(self.strand.template_string(), self.strand.built_string())
            .actuator(self.error_pending)
            .metric("hits", self.hits as f32)
            .metric("cycles", self.cycles as f32)
            .metric("polymerase_x", self.polymerase_x())
            .metric("strand_mutations", self.strand.mutations() as f32)
    }
}
