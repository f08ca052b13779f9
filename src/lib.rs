//! Biolab - physics-to-biology coupling core for teaching simulations
//!
//! Core modules:
//! - `sim`: Deterministic mechanisms (particle field, contact routing, recycling,
//!   position-to-index mapping, rates, actuators, stages)
//! - `experiments`: The six teaching simulations built from those mechanisms
//! - `lab`: Fixed-timestep host that mounts one simulation at a time
//! - `settings`: UI control block and run configuration

pub mod error;
pub mod experiments;
pub mod lab;
pub mod settings;
pub mod sim;

pub use error::{LabError, LabResult};
pub use lab::Lab;
pub use settings::{Controls, RadiationType, Settings, SimulationKind};

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the host will try to catch up on (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Every particle lives on this z plane
    pub const PLANE_Z: f32 = 0.0;
    /// Hard cap on particle speed (units/s); bounds per-tick travel
    pub const MAX_PARTICLE_SPEED: f32 = 30.0;
    /// Upper bound on live particles in one simulation
    pub const FIELD_CAPACITY: usize = 256;
}

/// Exponential approach of `current` toward `target` by fraction `alpha`
#[inline]
pub fn approach(current: f32, target: f32, alpha: f32) -> f32 {
    current + (target - current) * alpha.clamp(0.0, 1.0)
}

/// Convert a timestep in seconds to milliseconds
#[inline]
pub fn secs_to_ms(secs: f32) -> f64 {
    f64::from(secs) * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approach_never_overshoots() {
        assert_eq!(approach(0.0, 10.0, 0.1), 1.0);
        assert_eq!(approach(0.0, 10.0, 5.0), 10.0);
        assert_eq!(approach(4.0, -4.0, 0.5), 0.0);
    }
}
