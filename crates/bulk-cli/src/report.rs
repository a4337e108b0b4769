//! Plain-text rendering of engine state for the terminal.

use std::fmt::Write;

use bulk_core::{
    ActionDescriptor, ContentType, ExecutionResult, HistoryEntry, HistoryStats, ItemId,
    ItemOutcome,
};
use bulk_engine::Toggle;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Catalog
// =============================================================================

pub fn actions(content_type: ContentType, actions: &[ActionDescriptor]) -> String {
    let mut out = format!("Actions for {}:", content_type);
    for action in actions {
        let _ = write!(out, "\n  {:<18} {}", action.id, action.label);
        if !action.requires.is_empty() {
            let names: Vec<&str> = action.requires.iter().map(|r| r.name()).collect();
            let _ = write!(out, " (requires: {})", names.join(", "));
        }
        if action.destructive {
            out.push_str(" [destructive]");
        }
    }
    out
}

// =============================================================================
// Selection
// =============================================================================

pub fn selection(content_type: ContentType, ids: &[ItemId], max_selection: usize) -> String {
    if ids.is_empty() {
        return format!("No {} items selected", content_type);
    }
    let listed: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!(
        "{}/{} {} items selected: {}",
        ids.len(),
        max_selection,
        content_type,
        listed.join(", ")
    )
}

pub fn toggle(id: &ItemId, outcome: Toggle, selected: usize, max_selection: usize) -> String {
    match outcome {
        Toggle::Added => format!("Selected {} ({}/{})", id, selected, max_selection),
        Toggle::Removed => format!("Deselected {} ({}/{})", id, selected, max_selection),
        Toggle::Rejected => format!(
            "Cannot select {}: limit of {} items reached",
            id, max_selection
        ),
    }
}

// =============================================================================
// Runs
// =============================================================================

/// Summary of a (possibly partial) run.
pub fn result(result: &ExecutionResult) -> String {
    let mut out = format!(
        "Succeeded: {}\nFailed:    {}\nSkipped:   {}",
        result.successful.len(),
        result.failed.len(),
        result.skipped.len()
    );
    push_outcomes(&mut out, "failed", &result.failed);
    push_outcomes(&mut out, "skipped", &result.skipped);
    out
}

fn push_outcomes(out: &mut String, heading: &str, outcomes: &[ItemOutcome]) {
    if outcomes.is_empty() {
        return;
    }
    let _ = write!(out, "\n{}:", heading);
    for outcome in outcomes {
        let reason = outcome.error.as_deref().unwrap_or("unknown error");
        let _ = write!(out, "\n  {}: {}", outcome.item_id, reason);
    }
}

// =============================================================================
// History
// =============================================================================

pub fn history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No history".to_string();
    }
    let lines: Vec<String> = entries
        .iter()
        .map(|entry| {
            let mut line = format!(
                "{}  {:<20} {} items ({} ok, {} failed",
                entry.timestamp.format(TIMESTAMP_FORMAT),
                entry.action_label,
                entry.item_count,
                entry.success_count,
                entry.fail_count
            );
            if entry.skip_count > 0 {
                let _ = write!(line, ", {} skipped", entry.skip_count);
            }
            line.push(')');
            if entry.undo_of.is_some() {
                line.push_str(" [undo]");
            }
            line
        })
        .collect();
    lines.join("\n")
}

pub fn stats(stats: &HistoryStats) -> String {
    let mut out = format!(
        "Operations: {}\nItems:      {} ({} ok, {} failed, {} skipped)\nSuccess:    {:.1}%",
        stats.total_operations,
        stats.total_items,
        stats.total_successes,
        stats.total_failures,
        stats.total_skipped,
        stats.success_rate() * 100.0
    );
    for (action, totals) in &stats.by_action {
        let _ = write!(
            out,
            "\n  {:<18} {} runs, {} items ({} ok, {} failed)",
            action, totals.count, totals.items_processed, totals.successes, totals.failures
        );
    }
    out
}
