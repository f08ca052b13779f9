//! ATP synthase
//!
//! Protons fall through a stator funnel onto the right-hand side of a rotor.
//! Every tick a proton overlaps the rotor it hands over angular momentum, so
//! a steady flux spins the rotor up against its damping. Above 10 rpm the
//! head produces ATP, faster the faster it turns.

use glam::Vec2;

use crate::settings::{Controls, SimulationKind};
use crate::sim::{
    Aabb, Axis, AxisSpawn, ColliderId, Face, ParticleKind, PhysicsWorld, RateGatedProducer,
    Readout, RecycleBoundary, Response, Shape, SimCore, Simulation, SpawnRule,
};

const GRAVITY: Vec2 = Vec2::new(0.0, -7.0);
const WALL_X: f32 = 9.0;
/// Left and right stator guides (min, max)
const STATORS: [(Vec2, Vec2); 2] = [
    (Vec2::new(-1.0, 1.0), Vec2::new(0.0, 9.0)),
    (Vec2::new(3.0, 1.0), Vec2::new(4.0, 9.0)),
];
/// Reach of the rotor blades
const ROTOR_RADIUS: f32 = 2.2;
const HUB_RADIUS: f32 = 0.8;
/// Angular velocity gained per unit of `offset × velocity` per second of contact
const TORQUE_GAIN: f32 = 0.08;
/// Angular damping (1/s)
const ROTOR_DAMPING: f32 = 0.5;
const RPM_PER_RAD_S: f32 = 60.0 / std::f32::consts::TAU;

/// Production starts above this speed
const PRODUCTION_RPM: f32 = 10.0;
/// One ATP every `PRODUCTION_K / rpm` ms
const PRODUCTION_K: f64 = 5000.0;

const EXIT_Y: f32 = -10.0;
const RESPAWN_Y: f32 = 15.0;
const RESPAWN_VY: f32 = -5.0;

/// Rotating shaft driven by proton impacts
#[derive(Debug, Clone, Default)]
pub struct Rotor {
    /// rad/s, counter-clockwise positive
    pub omega: f32,
    pub angle: f32,
}

impl Rotor {
    pub fn rpm(&self) -> f32 {
        self.omega.abs() * RPM_PER_RAD_S
    }

    fn integrate(&mut self, torque: f32, dt: f32) {
        self.omega += torque * dt;
        self.omega /= 1.0 + ROTOR_DAMPING * dt;
        self.angle = (self.angle + self.omega * dt).rem_euclid(std::f32::consts::TAU);
    }
}

pub struct AtpSynthase {
    core: SimCore,
    rotor: Rotor,
    rotor_sensor: ColliderId,
    head: RateGatedProducer,
    recycler: RecycleBoundary,
    layout: Vec<Vec2>,
}

impl AtpSynthase {
    pub fn new(seed: u64) -> Self {
        let mut core = SimCore::new(seed, GRAVITY);
        let world = &mut core.world;
        for x in [-WALL_X - 1.0, WALL_X + 1.0] {
            let side = Shape::rect(Vec2::new(x, 5.0), Vec2::new(1.0, 40.0));
            world.add_collider(side, Response::wall(0.5));
        }
        for (min, max) in STATORS {
            world.add_collider(Shape::Rect(Aabb::from_min_max(min, max)), Response::wall(0.5));
        }
        let rotor_sensor =
            world.add_collider(Shape::circle(Vec2::ZERO, ROTOR_RADIUS), Response::Sensor);
        world.add_collider(Shape::circle(Vec2::ZERO, HUB_RADIUS), Response::wall(0.5));

        // Stacked column right of the axle, where impacts give the most torque
        let layout = (0..Controls::PROTON_RANGE.1)
            .map(|i| Vec2::new(core.rng.uniform(0.5, 2.5), 6.0 + i as f32 * 1.5))
            .collect();

        let recycler = RecycleBoundary::new(SpawnRule {
            x: AxisSpawn::Uniform(1.0, 2.0),
            y: AxisSpawn::Fixed(RESPAWN_Y),
            vx: AxisSpawn::Fixed(0.0),
            vy: AxisSpawn::Fixed(RESPAWN_VY),
        })
        .with_exit(Face::Below {
            axis: Axis::Y,
            limit: EXIT_Y,
        });

        Self {
            core,
            rotor: Rotor::default(),
            rotor_sensor,
            head: RateGatedProducer::new(PRODUCTION_RPM, PRODUCTION_K),
            recycler,
            layout,
        }
    }

    pub fn rotor(&self) -> &Rotor {
        &self.rotor
    }

    pub fn atp_produced(&self) -> u64 {
        self.head.produced()
    }
}

impl Simulation for AtpSynthase {
    fn kind(&self) -> SimulationKind {
        SimulationKind::AtpSynthase
    }

    fn core(&self) -> &SimCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SimCore {
        &mut self.core
    }

    fn update(&mut self, controls: &Controls, dt: f32) {
        self.core
            .field
            .set_population(ParticleKind::Proton, controls.proton_count as usize, &self.layout);

        let contacts = self.core.step(dt);
        let torque: f32 = contacts
            .iter()
            .filter(|c| c.collider == self.rotor_sensor)
            .map(|c| TORQUE_GAIN * c.offset.perp_dot(c.velocity))
            .sum();
        self.rotor.integrate(torque, dt);

        if self.head.update(self.rotor.rpm(), crate::secs_to_ms(dt)) {
            log::trace!("ATP #{} at {:.1} rpm", self.head.produced(), self.rotor.rpm());
        }

        let core = &mut self.core;
        self.recycler.apply_all(core.field.iter_mut(), false, &mut core.rng);
    }

    fn readout(&self) -> Readout {
        Readout::new(self.kind(), &self.core)
            .rate(self.rotor.rpm())
            .cumulative(self.atp_produced())
            .actuator(self.head.is_open(self.rotor.rpm()))
            .metric("omega", self.rotor.omega)
            .metric("angle", self.rotor.angle)
            .metric("protons", self.core.field.count(ParticleKind::Proton) as f32)
    }
}
