use chrono::{DateTime, Utc};
use placefill_core::RecordField;

#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeStatus {
    /// Fields written to the store.
    Updated(Vec<RecordField>),
    /// Fields that would have been written (dry run).
    Planned(Vec<RecordField>),
    /// Nothing new resolved.
    Unchanged,
    /// Record had no usable name.
    Skipped,
    Failed(String),
}

impl OutcomeStatus {
    /// Whether the record counts against the per-run budget. Records that
    /// resolved nothing new do not.
    pub fn made_progress(&self) -> bool {
        matches!(self, Self::Updated(_) | Self::Planned(_) | Self::Failed(_))
    }
}

/// Result of processing one record.
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub id: String,
    pub name: String,
    pub status: OutcomeStatus,
    /// Summary came from the template rather than the generator.
    pub summary_fallback: bool,
    /// Providers whose contribution was skipped after an error.
    pub provider_errors: Vec<String>,
}

/// Summary of one batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<RecordOutcome>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status != OutcomeStatus::Skipped)
            .count()
    }

    pub fn updated(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Updated(_) | OutcomeStatus::Planned(_)))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|s| *s == OutcomeStatus::Unchanged)
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Failed(_)))
    }

    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    fn count(&self, pred: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}
