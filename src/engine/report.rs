// src/engine/report.rs

use super::RunOutcome;

/// Human-readable lines for stdout.
pub fn render_outcome(outcome: &RunOutcome) -> Vec<String> {
    let mut lines = Vec::new();

    match outcome {
        RunOutcome::NoOp(records) => {
            lines.extend(records.iter().map(ToString::to_string));
        }
        RunOutcome::Dispatched {
            executable,
            dispatch,
            poll,
        } => {
            lines.push(format!(
                "dispatched {} to {} target(s), {} failed",
                executable.display_name(),
                dispatch.tasks.len(),
                dispatch.failures.len()
            ));
            for failure in &dispatch.failures {
                lines.push(format!("  dispatch failed on {}: {}", failure.target, failure.error));
            }

            match poll {
                None => {
                    for task in &dispatch.tasks {
                        lines.push(format!("  {} -> {}", task.target(), task.location()));
                    }
                }
                Some(report) => {
                    for (location, summary) in &report.finished {
                        lines.push(format!("  {location}: {summary}"));
                    }
                    for unfinished in &report.unfinished {
                        let last = unfinished.last_summary.as_deref().unwrap_or("never checked");
                        lines.push(format!(
                            "  {}: {} (last summary: {})",
                            unfinished.location, unfinished.reason, last
                        ));
                    }
                }
            }
        }
    }

    lines
}
