//! Membrane transport
//!
//! Ions start above a lipid membrane with one protein channel. Opening the
//! gate slides the two channel blocks apart and removes the plug so ions can
//! diffuse down their gradient. While the gate is closed, any ion found below
//! the membrane is put back on top: thin walls plus fast ions occasionally
//! tunnel, and the boundary repairs it.

use glam::Vec2;

use crate::settings::{Controls, SimulationKind};
use crate::sim::{
    Axis, AxisSpawn, ColliderId, Face, ParticleKind, PhysicsWorld, Readout, RecycleBoundary,
    Response, Shape, SimCore, Simulation, SpawnRule, ThresholdActuator, scatter,
};

const CONTAINER_MIN: Vec2 = Vec2::new(-9.0, -7.0);
const CONTAINER_MAX: Vec2 = Vec2::new(9.0, 7.0);
/// Lipid bilayer halves: x in [-13, -1] and [1, 13]
const WALL_HALF: Vec2 = Vec2::new(6.0, 1.4);
const WALL_X: f32 = 7.0;
const BLOCK_HALF: Vec2 = Vec2::new(0.6, 1.6);
const BLOCK_X_CLOSED: f32 = 0.7;
const BLOCK_X_OPEN: f32 = 1.6;
/// Fills the channel while closed, overlapping both wall halves
const PLUG_HALF: Vec2 = Vec2::new(1.2, 1.6);
const GATE_SMOOTHING: f32 = 0.1;
/// Ions below this line while the gate is closed have tunnelled
const BARRIER_Y: f32 = -1.0;
const RESPAWN_Y: f32 = 6.0;
/// Below the bilayer counts as inside the cell
const INTRACELLULAR_Y: f32 = -1.4;

pub struct MembraneTransport {
    core: SimCore,
    gate: ThresholdActuator,
    blocks: [ColliderId; 2],
    plug: ColliderId,
    tunnelling: RecycleBoundary,
    layout: Vec<Vec2>,
    applied_ion_count: Option<u32>,
    corrections: u64,
}

impl MembraneTransport {
    pub fn new(seed: u64) -> Self {
        let mut core = SimCore::new(seed, Vec2::ZERO);
        let world = &mut core.world;
        world.add_box(CONTAINER_MIN, CONTAINER_MAX, 1.0);
        for x in [-WALL_X, WALL_X] {
            world.add_collider(Shape::rect(Vec2::new(x, 0.0), WALL_HALF), Response::wall(1.0));
        }
        let blocks = [-BLOCK_X_CLOSED, BLOCK_X_CLOSED].map(|x| {
            world.add_collider(Shape::rect(Vec2::new(x, 0.0), BLOCK_HALF), Response::wall(1.0))
        });
        let plug = world.add_collider(Shape::rect(Vec2::ZERO, PLUG_HALF), Response::wall(1.0));

        let tunnelling = RecycleBoundary::new(SpawnRule {
            x: AxisSpawn::Keep,
            y: AxisSpawn::Fixed(RESPAWN_Y),
            vx: AxisSpawn::Fixed(0.0),
            vy: AxisSpawn::Fixed(0.0),
        })
        .with_barrier(Face::Below {
            axis: Axis::Y,
            limit: BARRIER_Y,
        });

        let layout = scatter(
            &mut core.rng,
            Controls::ION_RANGE.1 as usize,
            Vec2::new(-8.0, 4.0),
            Vec2::new(8.0, 7.0),
        );

        Self {
            core,
            gate: ThresholdActuator::new(0.5, GATE_SMOOTHING),
            blocks,
            plug,
            tunnelling,
            layout,
            applied_ion_count: None,
            corrections: 0,
        }
    }

    pub fn gate_open(&self) -> bool {
        self.gate.is_engaged()
    }

    /// Current x offset of each channel block from the channel center
    pub fn block_offset(&self) -> f32 {
        self.gate.lerp(BLOCK_X_CLOSED, BLOCK_X_OPEN)
    }

    pub fn intracellular(&self) -> usize {
        self.core
            .field
            .iter()
            .filter(|p| p.kind == ParticleKind::Ion && p.pos.y < INTRACELLULAR_Y)
            .count()
    }

    /// Ions teleported back after tunnelling
    pub fn corrections(&self) -> u64 {
        self.corrections
    }

    fn apply_ion_count(&mut self, count: u32) {
        if self.applied_ion_count == Some(count) {
            return;
        }
        // A new count restarts every ion from its start position
        let field = &mut self.core.field;
        field.remove_where(|p| p.kind == ParticleKind::Ion);
        field.set_population(ParticleKind::Ion, count as usize, &self.layout);
        self.applied_ion_count = Some(count);
    }

    fn drive_channel(&mut self, gate_open: bool, dt: f32) {
        if self.gate.update(if gate_open { 1.0 } else { 0.0 }, dt) {
            log::info!("channel {}", if gate_open { "opened" } else { "closed" });
        }
        let offset = self.block_offset();
        let world = &mut self.core.world;
        for (&id, sign) in self.blocks.iter().zip([-1.0, 1.0]) {
            let at = Vec2::new(sign * offset, 0.0);
            if let Some(block) = world.collider(id).map(|c| c.shape.with_center(at)) {
                world.set_collider_shape(id, block);
            }
        }
        world.set_enabled(self.plug, !self.gate.is_engaged());
    }
}

impl Simulation for MembraneTransport {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Membrane
    }

    fn core(&self) -> &SimCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SimCore {
        &mut self.core
    }

    fn update(&mut self, controls: &Controls, dt: f32) {
        self.apply_ion_count(controls.ion_count);
        self.drive_channel(controls.gate_open, dt);

        self.core.step(dt);

        let closed = !self.gate.is_engaged();
        let core = &mut self.core;
        let fixed = self.tunnelling.apply_all(core.field.iter_mut(), closed, &mut core.rng);
        self.corrections += fixed as u64;
    }

    fn readout(&self) -> Readout {
        let inside = self.intracellular();
        let ions = self.core.field.count(ParticleKind::Ion);
        Readout::new(self.kind(), &self.core)
            .cumulative(inside as u64)
            .actuator(self.gate_open())
            .metric("intracellular", inside as f32)
            .metric("extracellular", (ions - inside) as f32)
            .metric("block_offset", self.block_offset())
            .metric("corrections", self.corrections as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::experiments::testing::run;

    #[test]
    fn test_closed_membrane_keeps_ions_out() {
        let mut sim = MembraneTransport::new(21);
        let controls = Controls {
            ion_count: 50,
            ..Default::default()
        };
        for _ in 0..1200 {
            sim.tick(&controls, SIM_DT);
            for p in sim.field().iter() {
                assert!(p.pos.y >= BARRIER_Y, "ion {:?} at {}", p.id, p.pos);
            }
        }
        assert_eq!(sim.intracellular(), 0);
    }

    #[test]
    fn test_open_gate_lets_ions_diffuse() {
        let mut sim = MembraneTransport::new(21);
        let controls = Controls {
            ion_count: 50,
            gate_open: true,
            ..Default::default()
        };
        run(&mut sim, &controls, 120 * 30);
        assert!(sim.gate_open());
        assert!(sim.intracellular() > 0);
    }

    #[test]
    fn test_channel_blocks_slide_smoothly() {
        let mut sim = MembraneTransport::new(1);
        let open = Controls {
            gate_open: true,
            ..Default::default()
        };
        run(&mut sim, &open, 1);
        // Logical state flips at once, blocks lag behind
        assert!(sim.gate_open());
        assert!(sim.block_offset() < BLOCK_X_OPEN);
        let plug = sim.core.world.collider(sim.plug).unwrap();
        assert!(!plug.enabled);

        run(&mut sim, &open, 240);
        assert!((sim.block_offset() - BLOCK_X_OPEN).abs() < 1e-3);
        let right = sim.core.world.collider(sim.blocks[1]).unwrap().shape;
        assert_eq!(right, Shape::rect(Vec2::new(sim.block_offset(), 0.0), BLOCK_HALF));

        run(&mut sim, &Controls::default(), 1);
        assert!(!sim.gate_open());
        assert!(sim.core.world.collider(sim.plug).unwrap().enabled);
    }

    #[test]
    fn test_ion_count_change_resets_ions() {
        let mut sim = MembraneTransport::new(4);
        run(&mut sim, &Controls::default(), 240);
        assert_eq!(sim.field().count(ParticleKind::Ion), 20);
        let first = sim.field().ids_of(ParticleKind::Ion)[0];

        let more = Controls {
            ion_count: 30,
            ..Default::default()
        };
        run(&mut sim, &more, 1);
        assert_eq!(sim.field().count(ParticleKind::Ion), 30);
        // Every ion was respawned, so none of the old ids survive
        assert!(sim.field().get(first).is_none());
    }
}
