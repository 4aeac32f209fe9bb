//! Record store: the query/update seam the pipeline writes through.
//!
//! [`MemoryStore`] backs tests and dry runs; `NotionStore` (feature `notion`)
//! talks to a Notion database.

mod error;
mod memory;
#[cfg(feature = "notion")]
mod notion;

pub use error::StoreError;
pub use memory::MemoryStore;
#[cfg(feature = "notion")]
pub use notion::{NotionStore, PropertyNames};

use async_trait::async_trait;
use placefill_core::{Record, RecordField, RecordUpdate};

/// Default page size and per-run record budget.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Selects records still awaiting enrichment.
///
/// A record matches when its name is present, at least one of `any_empty`
/// is empty, and (if `include_flag` is set) its inclusion checkbox is ticked.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFilter {
    pub any_empty: Vec<RecordField>,
    pub include_flag: Option<String>,
    pub page_size: usize,
}

impl Default for PendingFilter {
    fn default() -> Self {
        Self {
            any_empty: RecordField::TRACKED.to_vec(),
            include_flag: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PendingFilter {
    /// Whether `record` satisfies the name and emptiness clauses.
    pub fn matches(&self, record: &Record) -> bool {
        record.has(RecordField::Name) && self.any_empty.iter().any(|f| !record.has(*f))
    }
}

/// One page of pending records.
#[derive(Debug, Clone, Default)]
pub struct PendingPage {
    pub records: Vec<Record>,
    /// Where the next page starts; `None` once the query is exhausted.
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch up to `filter.page_size` pending records, starting at `cursor`.
    async fn query_pending(
        &self,
        filter: &PendingFilter,
        cursor: Option<&str>,
    ) -> Result<PendingPage, StoreError>;

    /// Write the set slots of `update` to record `id`.
    async fn update_partial(&self, id: &str, update: &RecordUpdate) -> Result<(), StoreError>;
}
