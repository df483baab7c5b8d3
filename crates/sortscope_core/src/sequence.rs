//! Sequence store.
//!
//! Holds the ordered, immutable list of steps for the current run together
//! with the playback cursor. Only one sequence is live at a time; loading a
//! new one replaces the old one wholesale.

use std::sync::Arc;

use crate::error::{EngineError, Result};
use crate::step::{Step, Totals};

/// A non-empty, immutable list of steps produced by one run.
///
/// Cloning is cheap; the steps are shared.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    steps: Arc<[Step]>,
}

impl Sequence {
    /// Adopt a list of steps, rejecting an empty one.
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        if steps.is_empty() {
            return Err(EngineError::EmptySequence);
        }
        Ok(Self {
            steps: steps.into(),
        })
    }

    /// Number of steps (always at least one).
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get the step at `index`.
    pub fn step_at(&self, index: usize) -> Result<&Step> {
        self.steps.get(index).ok_or(EngineError::IndexOutOfRange {
            index,
            len: self.steps.len(),
        })
    }

    /// The last step of the run.
    pub fn last(&self) -> &Step {
        // Non-empty by construction.
        &self.steps[self.steps.len() - 1]
    }

    /// Grand totals, read from the last step.
    pub fn final_totals(&self) -> Totals {
        self.last().totals()
    }
}

/// The live sequence plus the cursor into it.
#[derive(Debug, Default)]
pub struct SequenceStore {
    sequence: Option<Sequence>,
    cursor: usize,
}

impl SequenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the live sequence and reset the cursor to 0.
    ///
    /// Fails with [`EngineError::EmptySequence`] on zero steps, leaving the
    /// previous sequence and cursor untouched.
    pub fn load(&mut self, steps: Vec<Step>) -> Result<()> {
        let sequence = Sequence::new(steps)?;
        self.adopt(sequence);
        Ok(())
    }

    /// Replace the live sequence with an already validated one.
    pub fn adopt(&mut self, sequence: Sequence) {
        tracing::debug!(len = sequence.len(), "sequence adopted");
        self.sequence = Some(sequence);
        self.cursor = 0;
    }

    /// Discard the live sequence.
    pub fn clear(&mut self) {
        self.sequence = None;
        self.cursor = 0;
    }

    /// Check if a sequence is loaded.
    pub fn is_loaded(&self) -> bool {
        self.sequence.is_some()
    }

    /// The live sequence, if any.
    pub fn sequence(&self) -> Option<&Sequence> {
        self.sequence.as_ref()
    }

    /// Number of steps, 0 when nothing is loaded.
    pub fn len(&self) -> usize {
        self.sequence.as_ref().map_or(0, Sequence::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the step at `index`.
    pub fn step_at(&self, index: usize) -> Result<&Step> {
        match &self.sequence {
            Some(sequence) => sequence.step_at(index),
            None => Err(EngineError::IndexOutOfRange { index, len: 0 }),
        }
    }

    /// Grand totals of the live sequence.
    pub fn final_totals(&self) -> Option<Totals> {
        self.sequence.as_ref().map(Sequence::final_totals)
    }

    /// Current cursor, `None` when nothing is loaded.
    pub fn cursor(&self) -> Option<usize> {
        self.sequence.as_ref().map(|_| self.cursor)
    }

    /// Move the cursor forward by one. Returns false at the last step.
    pub fn advance(&mut self) -> bool {
        if self.cursor + 1 < self.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Move the cursor back by one. Returns false at the first step.
    pub fn retreat(&mut self) -> bool {
        if self.is_loaded() && self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Move the cursor to the first step.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Check if the cursor is on the last step.
    pub fn at_end(&self) -> bool {
        self.is_loaded() && self.cursor + 1 == self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepKind;

    fn steps(n: usize) -> Vec<Step> {
        (0..n)
            .map(|i| {
                Step::new(StepKind::Comparing, vec![i as i64], &[i], format!("step {i}"))
                    .with_totals(i as u64 * 2, i as u64)
            })
            .collect()
    }

    #[test]
    fn test_load_resets_cursor() {
        let mut store = SequenceStore::new();
        assert_eq!(store.cursor(), None);

        store.load(steps(4)).unwrap();
        assert!(store.advance());
        assert!(store.advance());
        assert_eq!(store.cursor(), Some(2));

        store.load(steps(2)).unwrap();
        assert_eq!(store.cursor(), Some(0));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_empty_keeps_previous() {
        let mut store = SequenceStore::new();
        store.load(steps(3)).unwrap();
        store.advance();

        assert_eq!(store.load(Vec::new()), Err(EngineError::EmptySequence));
        assert_eq!(store.len(), 3);
        assert_eq!(store.cursor(), Some(1));
    }

    #[test]
    fn test_step_at_bounds() {
        let mut store = SequenceStore::new();
        assert_eq!(
            store.step_at(0),
            Err(EngineError::IndexOutOfRange { index: 0, len: 0 })
        );

        store.load(steps(3)).unwrap();
        assert_eq!(store.step_at(2).unwrap().description, "step 2");
        assert_eq!(
            store.step_at(3),
            Err(EngineError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_final_totals_from_last_step() {
        let mut store = SequenceStore::new();
        assert_eq!(store.final_totals(), None);

        store.load(steps(5)).unwrap();
        assert_eq!(store.final_totals(), Some(Totals::new(8, 4)));
    }

    #[test]
    fn test_advance_and_retreat_are_bounded() {
        let mut store = SequenceStore::new();
        assert!(!store.advance());
        assert!(!store.retreat());

        store.load(steps(2)).unwrap();
        assert!(!store.retreat());
        assert!(store.advance());
        assert!(store.at_end());
        assert!(!store.advance());
        assert_eq!(store.cursor(), Some(1));
        assert!(store.retreat());
        assert_eq!(store.cursor(), Some(0));
    }

    #[test]
    fn test_clear() {
        let mut store = SequenceStore::new();
        store.load(steps(2)).unwrap();
        store.advance();
        store.clear();

        assert!(!store.is_loaded());
        assert_eq!(store.len(), 0);
        assert_eq!(store.cursor(), None);
    }
}
