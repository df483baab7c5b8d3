//! Plain-text rendering of step events and trial results

use sortscope_core::{StepActivated, TrialResponse};
use std::fmt::Write;

/// Output style for step events
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

/// Render one step event.
pub fn step_line(event: &StepActivated, style: Style) -> anyhow::Result<String> {
    match style {
        Style::Text => Ok(step_text(event)),
        Style::Json => Ok(serde_json::to_string(event)?),
    }
}

/// Header line plus the array with highlighted positions in brackets.
pub fn step_text(event: &StepActivated) -> String {
    let mut out = format!(
        "[{:>4}] {:>5.1}%  {:<9}  {}  (comparisons {}, swaps {})\n      ",
        event.step_number,
        event.percent(),
        event.kind.label(),
        event.description,
        event.total_comparisons,
        event.total_swaps,
    );

    for (index, value) in event.array.iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        if event.indices.contains(&index) {
            let _ = write!(out, "[{value}]");
        } else {
            let _ = write!(out, "{value}");
        }
    }
    out
}

/// Ranked table of a time trial.
pub fn trial_table(trial: &TrialResponse) -> String {
    let mut out = format!("Array size: {}\n", trial.array_size);
    let _ = writeln!(
        out,
        "{:<3} {:<10} {:>10} {:>9} {:>12} {:>8} {:>8}",
        "#", "algorithm", "time (ms)", "space", "comparisons", "swaps", "steps"
    );

    for (rank, result) in trial.results.iter().enumerate() {
        if let Some(error) = &result.error {
            let _ = writeln!(out, "{:<3} {:<10} error: {}", rank + 1, result.algorithm, error);
            continue;
        }
        let time = result
            .execution_time_ms()
            .map_or_else(|| "-".to_string(), |ms| format!("{ms:.3}"));
        let _ = writeln!(
            out,
            "{:<3} {:<10} {:>10} {:>9} {:>12} {:>8} {:>8}",
            rank + 1,
            result.algorithm,
            time,
            result.space_complexity.as_deref().unwrap_or("N/A"),
            result.comparisons,
            result.swaps,
            result.total_steps,
        );
    }

    if let Some(fastest) = &trial.fastest {
        let _ = writeln!(out, "Fastest algorithm: {fastest}");
    }
    out
}
