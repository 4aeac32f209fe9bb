//! Plain-text run summary printed after a batch.

use std::fmt::Write;

use placefill_core::RecordField;
use placefill_pipeline::{BatchReport, OutcomeStatus};

const NAME_WIDTH: usize = 28;

fn field_list(fields: &[RecordField]) -> String {
    fields
        .iter()
        .map(RecordField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn truncate(name: &str) -> String {
    if name.chars().count() <= NAME_WIDTH {
        return name.to_string();
    }
    let mut cut: String = name.chars().take(NAME_WIDTH - 1).collect();
    cut.push('…');
    cut
}

/// One line per record, then the totals.
pub fn render_report(report: &BatchReport) -> String {
    let mut out = String::new();
    for o in &report.outcomes {
        let (tag, detail) = match &o.status {
            OutcomeStatus::Updated(fields) => ("updated", field_list(fields)),
            OutcomeStatus::Planned(fields) => ("planned", field_list(fields)),
            OutcomeStatus::Unchanged => ("unchanged", String::new()),
            OutcomeStatus::Skipped => ("skipped", "no name".to_string()),
            OutcomeStatus::Failed(err) => ("FAILED", err.clone()),
        };
        let mut notes = Vec::new();
        if o.summary_fallback {
            notes.push("template summary".to_string());
        }
        if !o.provider_errors.is_empty() {
            notes.push(format!("provider errors: {}", o.provider_errors.join(", ")));
        }
        let notes = if notes.is_empty() {
            String::new()
        } else {
            format!("  ({})", notes.join("; "))
        };
        let _ = writeln!(
            out,
            "  {:<width$}  {:<9}  {detail}{notes}",
            truncate(&o.name),
            tag,
            width = NAME_WIDTH
        );
    }
    let _ = writeln!(
        out,
        "{} records processed: {} updated, {} unchanged, {} failed ({:.1}s)",
        report.processed(),
        report.updated(),
        report.unchanged(),
        report.failed(),
        report.elapsed_secs()
    );
    out
}
