//! Fixed-timestep host
//!
//! The lab owns at most one mounted simulation and feeds it fixed ticks from
//! variable frame times. Control writes are staged and copied in at the start
//! of the next tick, so a tick always sees one consistent control block.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::experiments;
use crate::settings::{Controls, SimulationKind};
use crate::sim::{Readout, Simulation};

pub struct Lab {
    seed: u64,
    mounted: Option<Box<dyn Simulation>>,
    /// Latest UI write, not yet seen by a tick
    pending: Controls,
    /// Controls the current tick runs with
    applied: Controls,
    accumulator: f32,
}

impl Lab {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            mounted: None,
            pending: Controls::default(),
            applied: Controls::default(),
            accumulator: 0.0,
        }
    }

    /// Mount `kind`, unmounting whatever ran before
    pub fn mount(&mut self, kind: SimulationKind) {
        self.unmount();
        self.mounted = Some(experiments::mount(kind, self.seed));
    }

    /// Stop and drop the current simulation. Returns whether one was mounted.
    pub fn unmount(&mut self) -> bool {
        match self.mounted.take() {
            Some(mut sim) => {
                sim.stop();
                log::info!("Unmounted {}", sim.kind().title());
                self.accumulator = 0.0;
                true
            }
            None => false,
        }
    }

    pub fn mounted(&self) -> Option<SimulationKind> {
        self.mounted.as_ref().map(|sim| sim.kind())
    }

    /// Stage a control write; it takes effect at the next tick
    pub fn set_controls(&mut self, controls: Controls) {
        self.pending = controls.sanitized();
    }

    pub fn controls(&self) -> &Controls {
        &self.applied
    }

    /// Advance by one frame of wall time. Returns the number of ticks run.
    pub fn frame(&mut self, frame_dt: f32) -> u32 {
        let Some(sim) = self.mounted.as_mut() else {
            return 0;
        };
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt.min(MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.applied = self.pending.clone();
            sim.tick(&self.applied, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop the backlog rather than spiral
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Run exactly one fixed tick, bypassing the accumulator
    pub fn step(&mut self) -> bool {
        let Some(sim) = self.mounted.as_mut() else {
            return false;
        };
        self.applied = self.pending.clone();
        sim.tick(&self.applied, SIM_DT);
        true
    }

    pub fn readout(&self) -> Option<Readout> {
        self.mounted.as_ref().map(|sim| sim.readout())
    }
}
