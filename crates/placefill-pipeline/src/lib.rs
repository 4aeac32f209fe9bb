//! Batch enrichment: fetch pending records, resolve each one through the
//! search, summary, tag, and rich-search stages, and write what changed.

mod config;
mod pipeline;
mod report;

pub use config::{DEFAULT_BIAS, DEFAULT_MAX_PAGES, EnrichConfig};
pub use pipeline::{Enricher, Resolution};
pub use report::{BatchReport, OutcomeStatus, RecordOutcome};

use placefill_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
