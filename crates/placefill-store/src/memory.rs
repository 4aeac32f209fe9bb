//! In-memory record store.

use std::collections::HashSet;

use async_trait::async_trait;
use placefill_core::{Record, RecordUpdate};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{PendingFilter, PendingPage, RecordStore, StoreError};

#[derive(Default)]
struct State {
    records: Vec<Record>,
    excluded: HashSet<String>,
    failing: HashSet<String>,
    writes: Vec<(String, RecordUpdate)>,
}

/// Vec-backed store applying the same filter semantics as the database.
///
/// Every successful update is also appended to a write log so callers can
/// assert on exactly what was sent.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            state: Mutex::new(State {
                records,
                ..Default::default()
            }),
        }
    }

    /// Leave record `id` unticked for the inclusion checkbox.
    pub fn with_excluded(mut self, id: &str) -> Self {
        self.state.get_mut().excluded.insert(id.to_string());
        self
    }

    /// Make every update of record `id` fail with a server error.
    pub fn with_failing(mut self, id: &str) -> Self {
        self.state.get_mut().failing.insert(id.to_string());
        self
    }

    /// Current contents.
    pub async fn records(&self) -> Vec<Record> {
        self.state.lock().await.records.clone()
    }

    /// Successful writes, in order.
    pub async fn writes(&self) -> Vec<(String, RecordUpdate)> {
        self.state.lock().await.writes.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    /// The cursor is the position of the first matching record not yet returned.
    async fn query_pending(
        &self,
        filter: &PendingFilter,
        cursor: Option<&str>,
    ) -> Result<PendingPage, StoreError> {
        let start = match cursor {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| StoreError::InvalidCursor(c.to_string()))?,
            None => 0,
        };
        let state = self.state.lock().await;
        let mut page = PendingPage::default();
        let matching = state
            .records
            .iter()
            .enumerate()
            .skip(start)
            .filter(|(_, r)| filter.matches(r))
            .filter(|(_, r)| filter.include_flag.is_none() || !state.excluded.contains(&r.id));
        for (pos, record) in matching {
            if page.records.len() == filter.page_size {
                page.next_cursor = Some(pos.to_string());
                break;
            }
            page.records.push(record.clone());
        }
        debug!(
            count = page.records.len(),
            more = page.next_cursor.is_some(),
            "memory store pending query"
        );
        Ok(page)
    }

    async fn update_partial(&self, id: &str, update: &RecordUpdate) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.failing.contains(id) {
            return Err(StoreError::Server {
                status: 500,
                body: format!("update rejected for {id}"),
            });
        }
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        update.apply_to(record);
        state.writes.push((id.to_string(), update.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placefill_core::RecordField;

    fn filled(id: &str) -> Record {
        let mut r = Record::new(id, "Filled");
        r.mood = vec!["Cozy".into()];
        r.service = vec!["Takeout".into()];
        r.party_size = vec!["Solo".into()];
        let d = &mut r.derived;
        d.match_url = Some("u".into());
        d.category = Some("Korean".into());
        d.rating_score = Some(4.0);
        d.map_url = Some("m".into());
        d.external_id = Some("e".into());
        d.image_url = Some("i".into());
        d.attribution_text = Some("a".into());
        d.price_cap = Some(1.0);
        d.summary_text = Some("s".into());
        r
    }

    #[tokio::test]
    async fn pending_skips_complete_and_nameless_records() {
        let store = MemoryStore::new(vec![
            filled("done"),
            Record::new("blank", "  "),
            Record::new("todo", "Noodle House"),
        ]);
        let page = store
            .query_pending(&PendingFilter::default(), None)
            .await
            .unwrap();
        let ids: Vec<&str> = page.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["todo"]);
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn pending_respects_page_size_and_inclusion_flag() {
        let store = MemoryStore::new(vec![
            Record::new("a", "A"),
            Record::new("b", "B"),
            Record::new("c", "C"),
        ])
        .with_excluded("a");

        let filter = PendingFilter {
            include_flag: Some("Sync".into()),
            page_size: 1,
            ..Default::default()
        };
        let page = store.query_pending(&filter, None).await.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].id, "b");
    }

    #[tokio::test]
    async fn cursor_walks_matching_records_page_by_page() {
        let store = MemoryStore::new(vec![
            Record::new("a", "A"),
            filled("done"),
            Record::new("b", "B"),
            Record::new("c", "C"),
        ]);
        let filter = PendingFilter {
            page_size: 2,
            ..Default::default()
        };

        let first = store.query_pending(&filter, None).await.unwrap();
        let ids: Vec<&str> = first.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        let cursor = first.next_cursor.expect("a third record is pending");

        let second = store.query_pending(&filter, Some(&cursor)).await.unwrap();
        let ids: Vec<&str> = second.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
        assert_eq!(second.next_cursor, None);
    }

    #[tokio::test]
    async fn full_last_page_has_no_cursor() {
        let store = MemoryStore::new(vec![Record::new("a", "A"), Record::new("b", "B")]);
        let filter = PendingFilter {
            page_size: 2,
            ..Default::default()
        };
        let page = store.query_pending(&filter, None).await.unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn garbage_cursor_is_rejected() {
        let store = MemoryStore::new(vec![Record::new("a", "A")]);
        let err = store
            .query_pending(&PendingFilter::default(), Some("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidCursor(c) if c == "abc"));
    }

    #[tokio::test]
    async fn update_applies_and_logs() {
        let store = MemoryStore::new(vec![Record::new("a", "A")]);
        let update = RecordUpdate {
            category: Some("Other".into()),
            ..Default::default()
        };
        store.update_partial("a", &update).await.unwrap();

        let records = store.records().await;
        assert!(records[0].has(RecordField::Category));
        assert_eq!(store.writes().await.len(), 1);
    }

    #[tokio::test]
    async fn update_of_unknown_record_fails() {
        let store = MemoryStore::default();
        let err = store
            .update_partial("nope", &RecordUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn failing_record_rejects_updates() {
        let store = MemoryStore::new(vec![Record::new("a", "A")]).with_failing("a");
        let err = store
            .update_partial("a", &RecordUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Server { status: 500, .. }));
        assert!(store.writes().await.is_empty());
    }
}
