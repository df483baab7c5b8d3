//! Contract with the external algorithm-execution service.
//!
//! The engine never computes steps itself; it asks a service for a full
//! sequence and plays it back. Two requests exist:
//!
//! - a **run**: one algorithm over one array, returning every step
//! - a **time trial**: every algorithm over one array, returning only
//!   aggregate measurements (no playback)

use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::step::Step;

/// Algorithm identifiers understood by the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Bubble,
    Selection,
    Insertion,
    Merge,
    Quick,
    Heap,
    Counting,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Algorithm::Bubble,
        Algorithm::Selection,
        Algorithm::Insertion,
        Algorithm::Merge,
        Algorithm::Quick,
        Algorithm::Heap,
        Algorithm::Counting,
    ];

    /// Identifier sent on the wire.
    pub fn id(self) -> &'static str {
        match self {
            Algorithm::Bubble => "bubble",
            Algorithm::Selection => "selection",
            Algorithm::Insertion => "insertion",
            Algorithm::Merge => "merge",
            Algorithm::Quick => "quick",
            Algorithm::Heap => "heap",
            Algorithm::Counting => "counting",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown algorithm '{s}'"))
    }
}

/// Body of a run request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub array: Vec<i64>,
    pub algorithm: Algorithm,
}

impl RunRequest {
    pub fn new(array: Vec<i64>, algorithm: Algorithm) -> Self {
        Self { array, algorithm }
    }
}

/// Body of a run response. Extra fields sent by the service are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    pub steps: Vec<Step>,
}

impl RunResponse {
    /// Decode a response body. Malformed bodies are run failures.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| EngineError::run_failed(format!("malformed run response: {e}")))
    }
}

/// Body of a time-trial request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRequest {
    pub array: Vec<i64>,
}

/// Measurements for one algorithm in a time trial.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub algorithm: String,
    #[serde(default)]
    pub execution_time_us: Option<f64>,
    #[serde(default)]
    pub space_complexity: Option<String>,
    #[serde(default)]
    pub comparisons: u64,
    #[serde(default)]
    pub swaps: u64,
    #[serde(default)]
    pub total_steps: u64,
    /// Set instead of the measurements when the algorithm failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrialResult {
    /// Execution time in milliseconds, if measured.
    pub fn execution_time_ms(&self) -> Option<f64> {
        self.execution_time_us.map(|us| us / 1000.0)
    }
}

/// Body of a time-trial response. Results arrive fastest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialResponse {
    pub array_size: usize,
    pub results: Vec<TrialResult>,
    #[serde(default)]
    pub fastest: Option<String>,
}

impl TrialResponse {
    /// Decode a response body. Malformed bodies are run failures.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| EngineError::run_failed(format!("malformed trial response: {e}")))
    }
}

/// The algorithm-execution collaborator.
///
/// Implementations report every transport, status or decoding failure as
/// [`EngineError::RunRequestFailed`] and never retry.
pub trait ExecutionService {
    /// Produce the full step sequence for one algorithm over one array.
    fn run(&self, request: &RunRequest) -> impl Future<Output = Result<Vec<Step>>> + Send;

    /// Measure every algorithm over one array.
    fn time_trial(&self, request: &TrialRequest)
        -> impl Future<Output = Result<TrialResponse>> + Send;
}
