//! The "step activated" event handed to rendering collaborators.

use serde::Serialize;
use smallvec::SmallVec;

use crate::error::Result;
use crate::sequence::Sequence;
use crate::step::StepKind;

/// Emitted each time the cursor settles on a step.
///
/// Totals are the run's grand totals, not the step's own running counters.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepActivated {
    /// Values to redraw.
    pub array: Vec<i64>,
    /// Highlight category.
    pub kind: StepKind,
    /// Positions to highlight.
    pub indices: SmallVec<[usize; 2]>,
    /// Caption text.
    pub description: String,
    /// 1-based position of the step.
    pub step_number: usize,
    /// `step_number / len`, in `(0, 1]`.
    pub progress_fraction: f64,
    pub total_comparisons: u64,
    pub total_swaps: u64,
}

impl StepActivated {
    /// Build the event for the step at `cursor`.
    ///
    /// Fails with `IndexOutOfRange` if `cursor` is outside the sequence.
    pub fn at(sequence: &Sequence, cursor: usize) -> Result<Self> {
        let step = sequence.step_at(cursor)?;
        let totals = sequence.final_totals();
        let step_number = cursor + 1;

        Ok(Self {
            array: step.array.clone(),
            kind: step.kind,
            indices: step.indices.clone(),
            description: step.description.clone(),
            step_number,
            progress_fraction: step_number as f64 / sequence.len() as f64,
            total_comparisons: totals.comparisons,
            total_swaps: totals.swaps,
        })
    }

    /// 0-based cursor this event was emitted for.
    pub fn cursor(&self) -> usize {
        self.step_number - 1
    }

    /// Progress as a percentage (0 to 100).
    pub fn percent(&self) -> f64 {
        self.progress_fraction * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Step;

    #[test]
    fn test_event_carries_grand_totals() {
        let sequence = Sequence::new(vec![
            Step::new(StepKind::Comparing, vec![2, 1], &[0, 1], "Comparing 2 and 1").with_totals(1, 0),
            Step::new(StepKind::Swapping, vec![1, 2], &[0, 1], "Swapped 2 and 1").with_totals(1, 1),
            Step::new(StepKind::Sorted, vec![1, 2], &[], "done").with_totals(4, 2),
        ])
        .unwrap();

        let first = StepActivated::at(&sequence, 0).unwrap();
        assert_eq!(first.step_number, 1);
        assert_eq!(first.kind, StepKind::Comparing);
        assert!((first.progress_fraction - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!((first.total_comparisons, first.total_swaps), (4, 2));

        let last = StepActivated::at(&sequence, 2).unwrap();
        assert_eq!(last.progress_fraction, 1.0);
        assert_eq!(last.cursor(), 2);

        assert_eq!(
            StepActivated::at(&sequence, 3),
            Err(crate::EngineError::IndexOutOfRange { index: 3, len: 3 })
        );
    }
}
