//! Sortscope Core
//!
//! Foundational types for the Sortscope step-playback engine:
//!
//! - **Steps**: immutable snapshots of an algorithm's state plus their visual kind
//! - **Sequence Store**: the single live sequence and its cursor
//! - **Step events**: what rendering collaborators receive when the cursor settles
//! - **Execution service**: the contract with the external service that produces steps
//!
//! # Example
//!
//! ```rust
//! use sortscope_core::{SequenceStore, Step, StepKind};
//!
//! let mut store = SequenceStore::new();
//! store
//!     .load(vec![
//!         Step::new(StepKind::Comparing, vec![2, 1], &[0, 1], "Comparing 2 and 1"),
//!         Step::new(StepKind::Sorted, vec![1, 2], &[], "done").with_totals(1, 1),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(store.cursor(), Some(0));
//! assert!(store.advance());
//! assert_eq!(store.final_totals().map(|t| t.swaps), Some(1));
//! ```

pub mod error;
pub mod event;
pub mod sequence;
pub mod service;
pub mod step;

pub use error::{EngineError, Result};
pub use event::StepActivated;
pub use sequence::{Sequence, SequenceStore};
pub use service::{
    Algorithm, ExecutionService, RunRequest, RunResponse, TrialRequest, TrialResponse,
    TrialResult,
};
pub use step::{Step, StepKind, Totals};
