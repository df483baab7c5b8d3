//! Execution steps as produced by the algorithm-execution service.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Visual classification of a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Two or more positions are being compared.
    #[serde(alias = "compare")]
    Comparing,
    /// Positions were exchanged.
    #[serde(alias = "swap")]
    Swapping,
    /// Positions reached their final place. The service's terminal `done`
    /// step decodes here as well.
    #[serde(alias = "done")]
    Sorted,
    /// A partition pivot was selected.
    Pivot,
}

impl StepKind {
    /// Lowercase label used for highlight classes and captions.
    pub fn label(self) -> &'static str {
        match self {
            StepKind::Comparing => "comparing",
            StepKind::Swapping => "swapping",
            StepKind::Sorted => "sorted",
            StepKind::Pivot => "pivot",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Cumulative comparison and swap counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub comparisons: u64,
    pub swaps: u64,
}

impl Totals {
    pub fn new(comparisons: u64, swaps: u64) -> Self {
        Self { comparisons, swaps }
    }
}

/// One immutable snapshot of algorithm state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Full data snapshot at this point in execution.
    pub array: Vec<i64>,
    #[serde(rename = "type", alias = "kind")]
    pub kind: StepKind,
    /// Positions implicated by this step.
    #[serde(default)]
    pub indices: SmallVec<[usize; 2]>,
    #[serde(default)]
    pub description: String,
    /// Only guaranteed correct on the last step of a sequence.
    #[serde(default)]
    pub total_comparisons: u64,
    #[serde(default)]
    pub total_swaps: u64,
    /// Outer pass number, for iterative algorithms.
    #[serde(default, rename = "pass_number", skip_serializing_if = "Option::is_none")]
    pub pass: Option<u32>,
    /// Recursion depth, for divide-and-conquer algorithms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
}

impl Step {
    /// Create a step with no counters or metadata.
    pub fn new(kind: StepKind, array: Vec<i64>, indices: &[usize], description: impl Into<String>) -> Self {
        Self {
            array,
            kind,
            indices: SmallVec::from_slice(indices),
            description: description.into(),
            total_comparisons: 0,
            total_swaps: 0,
            pass: None,
            depth: None,
        }
    }

    /// Set the cumulative counters.
    pub fn with_totals(mut self, comparisons: u64, swaps: u64) -> Self {
        self.total_comparisons = comparisons;
        self.total_swaps = swaps;
        self
    }

    /// The cumulative counters recorded on this step.
    pub fn totals(&self) -> Totals {
        Totals::new(self.total_comparisons, self.total_swaps)
    }
}
