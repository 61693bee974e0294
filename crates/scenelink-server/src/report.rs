//! Human-readable summaries returned in every response's `text` field.
//!
//! The consumer is an agent reading prose, so each summary says how many
//! steps completed, which ones, and what stopped progress.

use std::fmt::Write;

use scenelink_bridge::ConnectionReport;
use scenelink_core::{HistoryStatus, StepDirection};

use crate::batch::BatchReport;
use crate::checkpoint::{CheckpointCreated, RestoreReport};
use crate::schema::history::{CheckpointView, HistoryEntry};
use crate::tools::ToolReport;
use crate::undo::{ChainReport, StepEntry, StepFailure};

/// `Position: operation 3 of 5 (3 undoable, 2 redoable)`.
pub fn position_line(status: &HistoryStatus) -> String {
    format!(
        "Position: operation {} of {} ({} undoable, {} redoable)",
        status.current_index + 1,
        status.total_operations,
        status.undo_count(),
        status.redo_count()
    )
}

fn step_line(out: &mut String, mark: &str, step: &StepEntry) {
    let _ = writeln!(out, "{} {} ({})", mark, step.description, step.tool_name);
}

fn failure_line(out: &mut String, failure: &StepFailure) {
    let _ = writeln!(
        out,
        "✗ {} ({}): {}",
        failure.step.description, failure.step.tool_name, failure.error
    );
    if failure.bridge_offline {
        let _ = writeln!(out, "  The host process is unreachable; no further steps were attempted.");
    }
}

fn verbs(direction: StepDirection) -> (&'static str, &'static str, &'static str) {
    match direction {
        StepDirection::Undo => ("undo", "undone", "✓"),
        StepDirection::Redo => ("redo", "redone", "↷"),
    }
}

pub fn chain_text(report: &ChainReport) -> String {
    let (verb, past, mark) = verbs(report.direction);
    let mut out = String::new();

    if report.completed.is_empty() && report.failed.is_empty() {
        let _ = writeln!(out, "Nothing to {}.", verb);
    }
    if !report.completed.is_empty() {
        let _ = writeln!(
            out,
            "Successfully {} {} operation(s):",
            past,
            report.completed.len()
        );
        for step in &report.completed {
            step_line(&mut out, mark, step);
        }
    }
    if !report.failed.is_empty() {
        if !report.completed.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "Failed to {} {} operation(s):", verb, report.failed.len());
        for failure in &report.failed {
            failure_line(&mut out, failure);
        }
    }

    out.push('\n');
    out.push_str(&position_line(&report.status));
    out
}

pub fn checkpoint_created_text(created: &CheckpointCreated) -> String {
    format!(
        "Checkpoint \"{}\" created at operation {} of {}.\nTotal checkpoints: {}",
        created.name,
        created.index + 1,
        created.status.total_operations,
        created.checkpoint_count
    )
}

pub fn checkpoints_text(checkpoints: &[CheckpointView], status: &HistoryStatus) -> String {
    if checkpoints.is_empty() {
        return format!("No checkpoints exist.\n\n{}", position_line(status));
    }
    let mut out = format!("Checkpoints ({}):\n", checkpoints.len());
    for checkpoint in checkpoints {
        let here = if checkpoint.index == status.current_index {
            " <- current"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "• {} (operation {}){}",
            checkpoint.name,
            checkpoint.index + 1,
            here
        );
    }
    out.push('\n');
    out.push_str(&position_line(status));
    out
}

pub fn restore_text(report: &RestoreReport) -> String {
    if report.already_there() {
        return format!(
            "Already at checkpoint \"{}\" (operation {} of {}).",
            report.name,
            report.target_index + 1,
            report.status.total_operations
        );
    }

    let mut out = String::new();
    if report.reached() {
        let _ = writeln!(out, "Restored to checkpoint \"{}\".", report.name);
    } else {
        let _ = writeln!(
            out,
            "Stopped before reaching checkpoint \"{}\": {} of {} step(s) completed.",
            report.name,
            report.undone.len() + report.redone.len(),
            report.requested
        );
    }
    if !report.undone.is_empty() {
        let _ = writeln!(out, "Undone {} operation(s):", report.undone.len());
        for step in &report.undone {
            step_line(&mut out, "✓", step);
        }
    }
    if !report.redone.is_empty() {
        let _ = writeln!(out, "Redone {} operation(s):", report.redone.len());
        for step in &report.redone {
            step_line(&mut out, "↷", step);
        }
    }
    if let Some(failure) = &report.failed {
        let _ = writeln!(out, "Error:");
        failure_line(&mut out, failure);
    }

    out.push('\n');
    out.push_str(&position_line(&report.status));
    out
}

fn entry_line(out: &mut String, mark: &str, entry: &HistoryEntry) {
    let note = if entry.checkpoint_name.is_some() || entry.undoable {
        ""
    } else {
        " [not undoable]"
    };
    let _ = writeln!(
        out,
        "{} #{} {} ({}){}",
        mark,
        entry.index + 1,
        entry.description,
        entry.tool_name,
        note
    );
}

pub fn history_text(
    operations: &[HistoryEntry],
    redoable: Option<&[HistoryEntry]>,
    status: &HistoryStatus,
) -> String {
    let mut out = String::new();
    if status.total_operations == 0 {
        let _ = writeln!(out, "No operations in history.");
    } else if operations.is_empty() {
        let _ = writeln!(out, "No undoable operations.");
    } else {
        let _ = writeln!(
            out,
            "Recent operations (showing {} of {}):",
            operations.len(),
            status.undo_count()
        );
        for entry in operations {
            let mark = if entry.checkpoint_name.is_some() { "⚑" } else { "✓" };
            entry_line(&mut out, mark, entry);
        }
    }

    if let Some(redoable) = redoable.filter(|r| !r.is_empty()) {
        let _ = writeln!(
            out,
            "\nRedoable operations (showing {} of {}):",
            redoable.len(),
            status.redo_count()
        );
        for entry in redoable {
            entry_line(&mut out, "↷", entry);
        }
    }

    let checkpoints = if status.checkpoints.is_empty() {
        "none".to_string()
    } else {
        status.checkpoints.join(", ")
    };
    let _ = write!(
        out,
        "\nUndo available: {} | Redo available: {} | Checkpoints: {}",
        status.undo_count(),
        status.redo_count(),
        checkpoints
    );
    out
}

fn millis(ms: f64) -> String {
    format!("{:.1}ms", ms)
}

pub fn batch_text(report: &BatchReport) -> String {
    let mut out = format!("Batch executed: {} operation(s)\n", report.operations.len());
    for item in &report.operations {
        if item.success {
            let _ = writeln!(out, "✓ {} ({})", item.id, item.operation);
        } else {
            let _ = writeln!(
                out,
                "✗ {}: {}",
                item.id,
                item.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    let average = report
        .average_ms()
        .map(millis)
        .unwrap_or_else(|| "N/A".to_string());
    let _ = write!(
        out,
        "\nSucceeded: {}, Failed: {}\nTotal time: {} (avg: {})",
        report.success_count,
        report.failure_count,
        millis(report.execution_time_ms),
        average
    );
    out
}

pub fn tool_text(report: &ToolReport) -> String {
    if !report.success {
        return format!(
            "✗ {} failed: {}",
            report.tool,
            report.error.as_deref().unwrap_or("unknown error")
        );
    }
    match &report.recorded {
        Some(recorded) if recorded.undoable => {
            let mut out = format!(
                "✓ {} succeeded. Recorded \"{}\" as operation {} of {}.",
                report.tool,
                recorded.description,
                recorded.index + 1,
                report.status.total_operations
            );
            if let Some(note) = &recorded.undo_note {
                let _ = write!(out, "\nNote: {}.", note);
            }
            out
        }
        Some(recorded) => format!(
            "✓ {} succeeded. Recorded \"{}\" as operation {} of {} (not undoable).",
            report.tool,
            recorded.description,
            recorded.index + 1,
            report.status.total_operations
        ),
        None => format!("✓ {} succeeded.", report.tool),
    }
}

pub fn connection_text(report: &ConnectionReport) -> String {
    match (&report.host, &report.error) {
        (Some(host), _) if report.connected => {
            let mut out = format!("Connected to host at {}", report.url);
            let details: Vec<String> = [
                host.engine_version.as_ref().map(|v| format!("engine {}", v)),
                host.project.as_ref().map(|p| format!("project {}", p)),
                host.version.as_ref().map(|v| format!("listener {}", v)),
            ]
            .into_iter()
            .flatten()
            .collect();
            if !details.is_empty() {
                let _ = write!(out, " ({})", details.join(", "));
            }
            out
        }
        (_, Some(error)) => format!("Host at {} is unreachable: {}", report.url, error),
        _ => format!("Host at {} is {}", report.url, report.state),
    }
}
