//! Threshold actuator
//!
//! A continuous input (lactose level, gate toggle) drives a discrete state
//! that flips the same tick the input crosses the threshold. The physical
//! body that represents the state follows with exponential smoothing.

use serde::Serialize;

use crate::consts::SIM_DT;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdActuator {
    pub threshold: f32,
    /// Logical state: `input >= threshold`
    engaged: bool,
    /// Smoothed blend from `off` (0.0) to `on` (1.0)
    position: f32,
    /// Fraction of the remaining distance covered per 1/120 s
    pub smoothing: f32,
}

impl ThresholdActuator {
    pub fn new(threshold: f32, smoothing: f32) -> Self {
        Self {
            threshold,
            engaged: false,
            position: 0.0,
            smoothing,
        }
    }

    /// Start already settled in the state `input` selects
    pub fn settled(mut self, input: f32) -> Self {
        self.engaged = input >= self.threshold;
        self.position = self.target();
        self
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    fn target(&self) -> f32 {
        if self.engaged { 1.0 } else { 0.0 }
    }

    /// Interpolate between the off and on poses at the current position
    pub fn lerp(&self, off: f32, on: f32) -> f32 {
        off + (on - off) * self.position
    }

    /// Returns true when the logical state flipped this tick
    pub fn update(&mut self, input: f32, dt: f32) -> bool {
        // NaN never engages
        let engaged = input >= self.threshold;
        let flipped = engaged != self.engaged;
        self.engaged = engaged;

        let alpha = (self.smoothing * dt / SIM_DT).clamp(0.0, 1.0);
        self.position = crate::approach(self.position, self.target(), alpha);
        flipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_flips_same_tick() {
        let mut repressor = ThresholdActuator::new(50.0, 0.1);
        assert!(!repressor.update(49.9, SIM_DT));
        assert!(!repressor.is_engaged());
        assert!(repressor.update(50.0, SIM_DT));
        assert!(repressor.is_engaged());
        // Body lags behind the logical state
        assert!(repressor.position() < 0.5);
    }

    #[test]
    fn test_step_is_bounded() {
        let mut gate = ThresholdActuator::new(0.5, 0.1);
        let mut prev = gate.position();
        for _ in 0..200 {
            gate.update(1.0, SIM_DT);
            let step = gate.position() - prev;
            assert!(step >= 0.0);
            assert!(step <= 0.1 * (1.0 - prev) + 1e-6);
            prev = gate.position();
        }
        assert!(gate.position() > 0.99);
    }

    #[test]
    fn test_large_dt_does_not_overshoot() {
        let mut gate = ThresholdActuator::new(0.5, 0.5);
        gate.update(1.0, 1.0);
        assert_eq!(gate.position(), 1.0);
        assert_eq!(gate.lerp(-1.0, 4.0), 4.0);
    }

    #[test]
    fn test_nan_input_disengages() {
        let mut gate = ThresholdActuator::new(0.5, 0.1).settled(1.0);
        assert!(gate.is_engaged());
        gate.update(f32::NAN, SIM_DT);
        assert!(!gate.is_engaged());
    }
}
