//! Forward-only stage machine
//!
//! Multi-stage experiments (enzyme inhibition, transcription → translation)
//! move one way. Every transition clears the previous stage's collections
//! before the next stage starts so nothing leaks across.

use std::fmt::Debug;

/// Hooks a simulation implements to react to a stage change
pub trait StageScope<S> {
    /// Tear down everything owned by the stage being left
    fn clear_stage(&mut self);
    /// Set up the stage being entered
    fn enter_stage(&mut self, stage: S);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageController<S> {
    current: S,
}

impl<S: Copy + Ord + Debug> StageController<S> {
    pub fn new(initial: S) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> S {
        self.current
    }

    /// Move to `next` if it is later than the current stage. Returns whether
    /// a transition happened; regression and repeats are no-ops.
    pub fn advance(&mut self, next: S, scope: &mut impl StageScope<S>) -> bool {
        if next <= self.current {
            return false;
        }
        log::info!("stage {:?} -> {:?}", self.current, next);
        scope.clear_stage();
        self.current = next;
        scope.enter_stage(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ProteinStage;

    #[derive(Default)]
    struct Scope {
        mrna: Vec<u32>,
        proteins: Vec<u32>,
        entered: Vec<ProteinStage>,
    }

    impl StageScope<ProteinStage> for Scope {
        fn clear_stage(&mut self) {
            self.mrna.clear();
            self.proteins.clear();
        }

        fn enter_stage(&mut self, stage: ProteinStage) {
            // Collections must already be empty when the new stage starts
            assert!(self.mrna.is_empty() && self.proteins.is_empty());
            self.entered.push(stage);
        }
    }

    #[test]
    fn test_advance_clears_then_enters() {
        let mut stages = StageController::new(ProteinStage::Transcription);
        let mut scope = Scope {
            mrna: vec![1, 2, 3],
            proteins: vec![4],
            ..Default::default()
        };

        assert!(stages.advance(ProteinStage::Translation, &mut scope));
        assert_eq!(stages.current(), ProteinStage::Translation);
        assert!(scope.mrna.is_empty());
        assert!(scope.proteins.is_empty());
        assert_eq!(scope.entered, vec![ProteinStage::Translation]);
    }

    #[test]
    fn test_no_regression() {
        let mut stages = StageController::new(ProteinStage::Translation);
        let mut scope = Scope {
            mrna: vec![7],
            ..Default::default()
        };

        assert!(!stages.advance(ProteinStage::Transcription, &mut scope));
        assert!(!stages.advance(ProteinStage::Translation, &mut scope));
        assert_eq!(stages.current(), ProteinStage::Translation);
        // A refused transition leaves the scope alone
        assert_eq!(scope.mrna, vec![7]);
        assert!(scope.entered.is_empty());
    }
}
