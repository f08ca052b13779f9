//! The six teaching simulations
//!
//! Each one wires the mechanisms in `sim` into a scene: colliders, actors,
//! boundaries, counters and the controls that drive them.

pub mod atp;
pub mod enzyme;
pub mod gene;
pub mod membrane;
pub mod mutation;
pub mod protein;

pub use atp::AtpSynthase;
pub use enzyme::EnzymeKinetics;
pub use gene::GeneRegulation;
pub use membrane::MembraneTransport;
pub use mutation::DnaMutation;
pub use protein::ProteinSynthesis;

use crate::settings::SimulationKind;
use crate::sim::Simulation;

/// Build a fresh simulation of `kind`
pub fn mount(kind: SimulationKind, seed: u64) -> Box<dyn Simulation> {
    log::info!("Mounting {} (seed {seed})", kind.title());
    match kind {
        SimulationKind::Enzyme => Box::new(EnzymeKinetics::new(seed)),
        SimulationKind::Membrane => Box::new(MembraneTransport::new(seed)),
        SimulationKind::GeneRegulation => Box::new(GeneRegulation::new(seed)),
        SimulationKind::AtpSynthase => Box::new(AtpSynthase::new(seed)),
        SimulationKind::ProteinSynthesis => Box::new(ProteinSynthesis::new(seed)),
        SimulationKind::Mutation => Box::new(DnaMutation::new(seed)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::consts::SIM_DT;
    use crate::settings::Controls;
    use crate::sim::Simulation;

    /// Run `ticks` fixed steps with constant controls
    pub fn run(sim: &mut dyn Simulation, controls: &Controls, ticks: u32) {
        for _ in 0..ticks {
            sim.tick(controls, SIM_DT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Controls;

    #[test]
    fn test_mount_every_kind() {
        for kind in SimulationKind::ALL {
            let mut sim = mount(kind, 5);
            assert_eq!(sim.kind(), kind);
            testing::run(sim.as_mut(), &Controls::default(), 10);
            assert_eq!(sim.readout().simulation, kind);
        }
    }

    #[test]
    fn test_stopped_simulation_ignores_ticks() {
        for kind in SimulationKind::ALL {
            let mut sim = mount(kind, 5);
            testing::run(sim.as_mut(), &Controls::default(), 5);
            sim.stop();
            let before = sim.readout();
            testing::run(sim.as_mut(), &Controls::default(), 50);
            assert!(sim.is_stopped());
            assert_eq!(sim.readout(), before);
        }
    }

    #[test]
    fn test_determinism() {
        // Same seed and controls give identical readouts
        let controls = Controls {
            substrate_count: 40,
            gate_open: true,
            lactose_level: 80.0,
            proton_count: 40,
            radiation_level: 6,
            ..Default::default()
        };
        for kind in SimulationKind::ALL {
            let mut a = mount(kind, 2024);
            let mut b = mount(kind, 2024);
            testing::run(a.as_mut(), &controls, 600);
            testing::run(b.as_mut(), &controls, 600);
            assert_eq!(a.readout(), b.readout(), "{kind:?} diverged");
        }
    }
}
